use std::time::Duration;

use marketfeed_rs::ResponseCache;

#[tokio::test(start_paused = true)]
async fn entries_expire_after_their_ttl() {
    let cache: ResponseCache<String> = ResponseCache::new(Duration::from_secs(300));
    cache
        .set("quote?symbol=AAPL", "{}".to_string(), Duration::from_secs(120))
        .await;

    tokio::time::advance(Duration::from_secs(119)).await;
    assert_eq!(cache.get("quote?symbol=AAPL").await.as_deref(), Some("{}"));

    tokio::time::advance(Duration::from_secs(1)).await;
    assert_eq!(cache.get("quote?symbol=AAPL").await, None);
    // The expired entry was evicted by the read.
    assert!(cache.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn set_replaces_and_restarts_the_clock() {
    let cache: ResponseCache<u32> = ResponseCache::default();
    cache.set("k", 1, Duration::from_secs(10)).await;
    tokio::time::advance(Duration::from_secs(8)).await;
    cache.set("k", 2, Duration::from_secs(10)).await;
    tokio::time::advance(Duration::from_secs(8)).await;
    assert_eq!(cache.get("k").await, Some(2));
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn clear_drops_everything() {
    let cache: ResponseCache<u32> = ResponseCache::default();
    cache.set("a", 1, Duration::from_secs(60)).await;
    cache.set("b", 2, Duration::from_secs(60)).await;
    assert_eq!(cache.len().await, 2);
    cache.clear().await;
    assert_eq!(cache.get("a").await, None);
    assert!(cache.is_empty().await);
    assert_eq!(cache.default_ttl(), Duration::from_secs(300));
}
