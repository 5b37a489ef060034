//! Shared use of one cache from several threads, and of one directory from
//! several cache instances.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::{Arc, Barrier};

use common::*;
use tokencache::{CacheConfig, RefreshResolution, SharedCacheAccessor, SharedTokenCache};
use tokencache_store::{FileStore, MemoryStore};

/// Two apps redeem the same family token and both store their rotated
/// result. Whichever write lands last is the winner, and both apps resolve
/// to it afterwards.
#[test]
fn rotation_race_resolves_to_the_winner() {
    let cache = Arc::new(cache());
    let original = refresh_token(&alice(), APP_A, Some("1"), "rt-0");
    cache.save_shared_refresh_token(&alice(), original.clone(), &ctx()).unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = [(APP_A, "rt-a"), (APP_B, "rt-b")]
        .into_iter()
        .map(|(client, secret)| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                let rotated = refresh_token(&alice(), client, Some("1"), secret);
                barrier.wait();
                cache.save_shared_refresh_token(&alice(), rotated.clone(), &ctx()).unwrap();
                rotated
            })
        })
        .collect();
    let rotated: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winner =
        cache.get_shared_refresh_token(&alice(), &params(APP_A, ""), &ctx()).unwrap().unwrap();
    assert!(rotated.contains(&winner), "stored token must be one of the racers");

    for mine in &rotated {
        let latest = cache.get_latest_refresh_token(mine, &alice(), &ctx()).unwrap();
        assert_eq!(latest.as_ref(), Some(&winner));
        let expected = if mine == &winner {
            RefreshResolution::Unchanged(winner.clone())
        } else {
            RefreshResolution::Rotated(winner.clone())
        };
        assert_eq!(cache.resolve_refresh_chain(mine, &alice(), &ctx()).unwrap(), expected);
    }
    assert_eq!(
        cache.get_latest_refresh_token(&original, &alice(), &ctx()).unwrap(),
        Some(winner)
    );
}

#[test]
fn parallel_saves_for_many_accounts_all_land() {
    const ACCOUNTS: usize = 16;
    let cache = cache();

    std::thread::scope(|scope| {
        for i in 0..ACCOUNTS {
            let cache = &cache;
            scope.spawn(move || {
                let who = account(&format!("user-{i:02}"));
                save_access(cache, &who, "at", "user.read", 0);
                save_refresh(cache, &who, APP_A, None, "rt");
            });
        }
    });

    let all = cache.get_all_shared_refresh_tokens(APP_A, &ctx()).unwrap();
    assert_eq!(all.count(), ACCOUNTS);
    assert_eq!(cache.metrics().snapshot().saves, ACCOUNTS as u64 * 2);
}

#[test]
fn accessor_is_shareable_behind_arc_dyn() {
    let cache: Arc<dyn SharedCacheAccessor> =
        Arc::new(SharedTokenCache::new(MemoryStore::new(), CacheConfig::default()).unwrap());
    let rt = refresh_token(&alice(), APP_A, None, "rt");
    cache.save_shared_refresh_token(&alice(), rt, &ctx()).unwrap();
    let shared = cache.get_shared_refresh_token(&alice(), &params(APP_A, ""), &ctx()).unwrap();
    assert!(shared.is_some());
}

/// Two applications open their own cache over the same directory, as
/// separate processes on one device would.
#[test]
fn file_store_shares_tokens_between_caches() {
    let dir = tempfile::tempdir().unwrap();
    let app_a = cache_with(FileStore::open(dir.path()).unwrap(), CacheConfig::default());
    let app_b = cache_with(FileStore::open(dir.path()).unwrap(), CacheConfig::default());

    let rt = refresh_token(&alice(), APP_A, Some("1"), "family-rt");
    app_a.save_shared_refresh_token(&alice(), rt.clone(), &ctx()).unwrap();
    let shared = app_b.get_shared_refresh_token(&alice(), &params(APP_B, ""), &ctx()).unwrap();
    assert_eq!(shared, Some(rt.clone()));

    let rotated = refresh_token(&alice(), APP_B, Some("1"), "family-rt-2");
    app_b.save_shared_refresh_token(&alice(), rotated.clone(), &ctx()).unwrap();
    assert_eq!(app_a.get_latest_refresh_token(&rt, &alice(), &ctx()).unwrap(), Some(rotated));
}

#[test]
fn file_store_tokens_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let p = params(APP_A, "user.read");
    {
        let cache = cache_with(FileStore::open(dir.path()).unwrap(), CacheConfig::default());
        save_access(&cache, &alice(), "durable", "user.read", 0);
        cache.save_account(&alice(), &p, &ctx()).unwrap();
    }

    let reopened = cache_with(FileStore::open(dir.path()).unwrap(), CacheConfig::default());
    let found = reopened.get_access_token(&alice(), &p, &ctx()).unwrap().unwrap();
    assert_eq!(found.secret.expose(), "durable");
    assert_eq!(reopened.get_all_accounts(&ctx()).unwrap(), vec![alice()]);
}
