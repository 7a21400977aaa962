mod test_utils;

use map_analysis::crs::CrsDescriptor;
use map_analysis::geometry::{Feature, FeatureId, Geometry, LayerId};
use map_analysis::loader::{BatchLoader, BatchRequest, JoinPolicy};
use map_analysis::core::math::vec2;
use map_analysis::AnalysisError;
use std::time::Duration;
use test_utils::{ids, init_logging, MemoryStore};

fn poles(count: usize) -> Vec<Feature> {
    (0..count)
        .map(|i| Feature::new(i.to_string(), Geometry::Point(vec2(i as f64 * 0.01, 50.0))))
        .collect()
}

/// Later packages finish first.
fn reversed_delay(ids: &[FeatureId]) -> Duration {
    let first: u64 = ids[0].as_str().parse().unwrap();
    Duration::from_millis(30 - first / 10)
}

#[tokio::test]
async fn packages_of_one_hundred_reassembled_in_order() {
    init_logging();
    let store = MemoryStore::new()
        .with_layer("poles", CrsDescriptor::wgs84(), poles(250))
        .with_delay(reversed_delay);
    let loader = BatchLoader::new(&store);
    let request = BatchRequest::new("poles", ids(0..250));
    assert_eq!(request.package_count(), 3);

    let layer = loader.load(&request, JoinPolicy::Settled).await.unwrap();

    let sizes: Vec<usize> = store.requests().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![100, 100, 50]);
    assert_eq!(
        store.completions(),
        vec![FeatureId::new("200"), FeatureId::new("100"), FeatureId::new("0")]
    );
    let loaded: Vec<FeatureId> = layer.features.iter().map(|f| f.id.clone()).collect();
    assert_eq!(loaded, ids(0..250));
    assert_eq!(layer.info.id, LayerId::new("poles"));
}

#[tokio::test]
async fn strict_join_keeps_order_too() {
    init_logging();
    let store = MemoryStore::new()
        .with_layer("poles", CrsDescriptor::wgs84(), poles(250))
        .with_delay(reversed_delay);
    let loader = BatchLoader::new(&store);
    let request = BatchRequest::new("poles", ids(0..250)).with_package_size(100);
    let layer = loader.load(&request, JoinPolicy::Strict).await.unwrap();
    assert_eq!(layer.features.len(), 250);
    assert!(layer.features.windows(2).all(|w| {
        w[0].id.as_str().parse::<usize>().unwrap() < w[1].id.as_str().parse::<usize>().unwrap()
    }));
}

#[tokio::test]
async fn settled_join_reports_failed_packages() {
    init_logging();
    let store = MemoryStore::new()
        .with_layer("poles", CrsDescriptor::wgs84(), poles(250))
        .failing_on("150");
    let loader = BatchLoader::new(&store);
    let request = BatchRequest::new("poles", ids(0..250));

    let err = loader.load(&request, JoinPolicy::Settled).await.unwrap_err();
    match err {
        AnalysisError::BatchFetchFailed { failed, total } => {
            assert_eq!(total, 3);
            assert_eq!(failed.len(), 1);
            assert_eq!(failed[0].layer_id, LayerId::new("poles"));
            assert_eq!(failed[0].index, 1);
        }
        e => panic!("unexpected error: {e}"),
    }
    // every package was still issued
    assert_eq!(store.requests().len(), 3);
}

#[tokio::test]
async fn unknown_layer() {
    let store = MemoryStore::new();
    let loader = BatchLoader::new(&store);
    let request = BatchRequest::new("missing", ids(0..3));
    let err = loader.load(&request, JoinPolicy::Strict).await.unwrap_err();
    assert!(matches!(err, AnalysisError::LayerNotFound(id) if id == LayerId::new("missing")));
    assert!(store.requests().is_empty());
}

#[tokio::test]
async fn missing_ids_are_left_out() {
    let store = MemoryStore::new().with_layer("poles", CrsDescriptor::wgs84(), poles(5));
    let loader = BatchLoader::new(&store);
    let request = BatchRequest::new("poles", ids(3..8)).with_package_size(2);
    let layer = loader.load(&request, JoinPolicy::Settled).await.unwrap();
    assert_eq!(store.requests().len(), 3);
    let loaded: Vec<FeatureId> = layer.features.iter().map(|f| f.id.clone()).collect();
    assert_eq!(loaded, ids(3..5));
}
