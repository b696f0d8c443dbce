// Copyright 2026 trove Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tests for views spanning several member caches under concurrent writers.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use itertools::Itertools;
use parking_lot::RwLock;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use rayon::iter::ParallelIterator;
use trove::{
    all_members, all_snowflakes, memory::view::all, Cache, CacheView, CacheViewExt, EvictionPolicyExt, KeyedCacheView,
    Store, StoreView, UnifiedView,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Member {
    guild: u64,
    user: u64,
    nickname: String,
    owner: bool,
}

fn member(guild: u64, user: u64, nickname: &str) -> Member {
    Member {
        guild,
        user,
        nickname: nickname.to_string(),
        owner: false,
    }
}

/// A member cache per guild, keyed by user id.
fn guild_caches() -> Vec<Cache<u64, Member>> {
    (0..3)
        .map(|guild| {
            let cache = Cache::with_lru(8, |user: &u64| *user == 0).unwrap();
            for user in 0..5 {
                cache.insert(user + guild, member(guild, user + guild, &format!("user-{}", user + guild)));
            }
            cache
        })
        .collect()
}

fn member_views(caches: &[Cache<u64, Member>]) -> Vec<Arc<dyn KeyedCacheView<Key = u64, Item = Member>>> {
    caches
        .iter()
        .map(|cache| {
            Arc::new(cache.view().with_name(|m: &Member| m.nickname.as_str()))
                as Arc<dyn KeyedCacheView<Key = u64, Item = Member>>
        })
        .collect()
}

#[test_log::test]
fn test_members_across_guilds() {
    let caches = guild_caches();
    let members = all_members(member_views(&caches));

    assert_eq!(members.len(), 15);
    assert!(!members.is_empty());
    // User 2 is a member of guilds 0, 1 and 2.
    assert_eq!(
        members.get_all(&2).into_iter().map(|m| m.guild).sorted().collect_vec(),
        vec![0, 1, 2]
    );
    assert_eq!(members.get_all(&6).into_iter().map(|m| m.guild).collect_vec(), vec![2]);

    let named = members.elements_by_name("USER-3", true).unwrap();
    assert_eq!(named.len(), 3);

    let users = all_snowflakes(member_views(&caches));
    assert_eq!(users.get(&0).map(|m| m.guild), Some(0));
    assert_eq!(users.to_set().len(), 15);
}

#[test_log::test]
fn test_lru_bound_with_retained_owner() {
    let cache = Cache::with_lru(4, |user: &u64| *user == 0).unwrap();
    cache.insert(0, Member {
        owner: true,
        ..member(1, 0, "owner")
    });
    for user in 1..=20 {
        cache.insert(user, member(1, user, "member"));
    }

    // The owner survives eviction beyond the bound, the rest is bounded.
    assert!(cache.contains_key(&0));
    assert_eq!(cache.len(), 5);
    assert_eq!(
        cache.view().to_vec().into_iter().map(|m| m.user).sorted().collect_vec(),
        vec![0, 17, 18, 19, 20]
    );
}

#[test_log::test]
fn test_policy_combinators_gate_inserts() {
    let cache = Cache::new((|user: &u64| *user < 100).and(|user: &u64| *user % 10 != 0));
    for user in [1u64, 10, 55, 100, 101] {
        cache.insert(user, member(1, user, "m"));
    }
    assert_eq!(cache.view().to_vec().into_iter().map(|m| m.user).sorted().collect_vec(), vec![1, 55]);
}

#[test_log::test]
fn test_unified_view_follows_shards() {
    let shards: Arc<RwLock<Vec<Store<u64, Member>>>> = Arc::new(RwLock::new(vec![]));
    let unified = {
        let shards = shards.clone();
        UnifiedView::<dyn CacheView<Item = Member>>::from_fn(move || {
            shards
                .read()
                .iter()
                .map(|store| Arc::new(StoreView::new(store.clone())) as Arc<dyn CacheView<Item = Member>>)
                .collect()
        })
    };
    assert!(unified.is_empty());

    for shard in 0..4 {
        let store = Store::new();
        for user in 0..10 {
            store.insert(user, member(shard, user, "m"));
        }
        shards.write().push(store);
        assert_eq!(unified.len(), (shard as usize + 1) * 10);
    }
    assert_eq!(unified.to_vec().len(), 40);
}

#[test_log::test]
fn test_locked_iteration_is_consistent_under_writers() {
    let store: Store<u64, Member> = Store::new();
    for user in 0..256 {
        store.insert(user, member(1, user, "m"));
    }
    let view = all(vec![Arc::new(StoreView::new(store.clone())) as Arc<dyn CacheView<Item = Member>>]);

    let stop = Arc::new(AtomicBool::new(false));
    let writer = {
        let store = store.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            let mut rng = SmallRng::seed_from_u64(42);
            while !stop.load(Ordering::Relaxed) {
                let user = rng.random_range(0..512u64);
                match rng.random_bool(0.5) {
                    true => store.insert(user, member(1, user, "m")),
                    false => store.remove(&user),
                };
                thread::sleep(Duration::from_micros(50));
            }
        })
    };

    let single = StoreView::new(store.clone());
    for _ in 0..32 {
        let iter = single.locked_iter();
        // The length is taken at acquisition; the writer is blocked until the iterator is dropped.
        let (len, _) = iter.size_hint();
        let seen = iter.map(|m| m.user).collect_vec();
        assert_eq!(seen.len(), len);
        assert!(seen.iter().all_unique());
    }

    stop.store(true, Ordering::Relaxed);
    writer.join().unwrap();

    let total: usize = view.par_iter().map(|_| 1).sum();
    assert_eq!(total, store.len());
}
