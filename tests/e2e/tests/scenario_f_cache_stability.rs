//! Scenario F — cache stability (spec §8): two consecutive builds at the
//! same threshold with no store change return the same cached object.

use std::sync::Arc;

use gce_core::{GceConfig, GraphCache};
use gce_e2e_tests::harness::StoreBuilder;

#[test]
fn unchanged_store_and_threshold_returns_the_same_cached_response() {
    let store = StoreBuilder::new().memory("m1", "hello", "fact", None, 1_700_000_000_000).build();
    let cache = GraphCache::new(&store.path);
    let config = GceConfig::default();

    let first = cache.get_or_build(&config).expect("first build");
    let second = cache.get_or_build(&config).expect("second build");
    assert!(Arc::ptr_eq(&first, &second), "cache hit should return the same Arc");
}

#[test]
fn changing_threshold_forces_a_rebuild() {
    let store = StoreBuilder::new().memory("m1", "hello", "fact", None, 1_700_000_000_000).build();
    let cache = GraphCache::new(&store.path);

    let mut config = GceConfig::default();
    let first = cache.get_or_build(&config).expect("first build");

    config.similarity_threshold = 0.9;
    let second = cache.get_or_build(&config).expect("second build");
    assert!(!Arc::ptr_eq(&first, &second), "different threshold should bust the cache");
}
