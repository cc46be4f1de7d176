use std::sync::Arc;
use std::time::Duration;

use cim::{CacheState, EntityCache, EntityDocument};
use futures::future::join_all;

use crate::fixture::{name, MemoryServer};

fn starship() -> MemoryServer {
    MemoryServer::new(&[(
        "Vehicle/Rocket/Starship",
        serde_json::json!({
            "Metadata": {"Entity": "Vehicle/Rocket/Starship"},
            "Resources": {"Mass": {"Value": 120, "Unit": "tonne"}}
        }),
    )])
}

#[tokio::test]
async fn test_concurrent_resolves_share_one_fetch() {
    let server = starship().with_latency(Duration::from_millis(20));
    let cache = EntityCache::new(server.clone());
    let ship = name("Vehicle/Rocket/Starship");

    let documents = join_all((0..16).map(|_| cache.resolve(&ship))).await;

    assert_eq!(server.requests_for("Vehicle/Rocket/Starship"), 1);
    assert_eq!(cache.fetch_count(), 1);
    assert!(documents[0].is_valid());
    assert!(documents.iter().all(|d| Arc::ptr_eq(d, &documents[0])));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolves_across_threads() {
    let server = starship().with_latency(Duration::from_millis(20));
    let cache = EntityCache::new(server.clone());

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.resolve(&name("Vehicle/Rocket/Starship")).await })
        })
        .collect();

    let mut documents = Vec::new();
    for handle in handles {
        documents.push(handle.await.unwrap());
    }

    assert_eq!(server.total_requests(), 1);
    assert!(documents.iter().all(|d| Arc::ptr_eq(d, &documents[0])));
}

#[tokio::test]
async fn test_resolved_entity_never_refetched() {
    let server = starship();
    let cache = EntityCache::new(server.clone());
    let ship = name("Vehicle/Rocket/Starship");

    let first = cache.resolve(&ship).await;
    for _ in 0..5 {
        let again = cache.resolve(&ship).await;
        assert!(Arc::ptr_eq(&first, &again));
    }

    assert_eq!(server.total_requests(), 1);
    assert_eq!(cache.state(&ship), CacheState::Resolved { valid: true });
    assert_eq!(
        first.resources().unwrap()["Mass"].amount(),
        Some(120.0)
    );
}

#[tokio::test]
async fn test_distinct_names_fetch_separately() {
    let server = starship();
    let cache = EntityCache::new(server.clone());

    cache.resolve(&name("Vehicle/Rocket/Starship")).await;
    cache.resolve(&name("Vehicle/Rocket/Falcon")).await;
    cache.resolve(&name("Vehicle/Rocket/Starship ")).await;

    assert_eq!(server.total_requests(), 3);
    assert_eq!(cache.len(), 3);
}

#[tokio::test]
async fn test_missing_and_malformed_documents_are_invalid() {
    let server = MemoryServer::raw(&[
        ("Broken/Syntax", "{\"Resources\": {"),
        ("Broken/Shape", "{\"Components\": {\"Arm\": {}}}"),
        ("Broken/NotObject", "42"),
    ]);
    let cache = EntityCache::new(server.clone());

    for entity in ["Broken/Syntax", "Broken/Shape", "Broken/NotObject", "Not/There"] {
        let document = cache.resolve(&name(entity)).await;
        assert_eq!(*document, EntityDocument::Invalid, "{}", entity);
        assert_eq!(cache.state(&name(entity)), CacheState::Resolved { valid: false });
    }

    // Invalid results are cached like any other.
    cache.resolve(&name("Not/There")).await;
    assert_eq!(server.requests_for("Not/There"), 1);
}
