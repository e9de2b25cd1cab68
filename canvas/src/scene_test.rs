use protocol::Point;

use super::*;

fn triangle(offset: f64) -> Ring {
    vec![
        Point::new(offset, offset),
        Point::new(offset + 1.0, offset),
        Point::new(offset + 1.0, offset + 1.0),
    ]
}

#[test]
fn new_store_is_empty() {
    let store = SceneStore::new();
    assert!(store.is_empty());
    assert_eq!(store.polygon_count(), 0);
    assert!(!store.scene().is_complete());
}

#[test]
fn set_polygons_replaces_wholesale() {
    let mut store = SceneStore::new();
    store.set_polygons(vec![triangle(0.0), triangle(10.0)]);
    assert_eq!(store.polygon_count(), 2);

    store.set_polygons(vec![triangle(20.0)]);
    assert_eq!(store.polygon_count(), 1);
    assert_eq!(store.scene().polygons[0][0], Point::new(20.0, 20.0));
}

#[test]
fn set_polygons_drops_stale_centroids() {
    let mut store = SceneStore::new();
    store.set_polygons(vec![triangle(0.0)]);
    store.set_centroids(vec![Point::new(0.5, 0.5)]).expect("counts match");

    store.set_polygons(vec![triangle(1.0), triangle(2.0)]);
    assert!(store.scene().centroids.is_empty());
}

#[test]
fn matching_centroids_complete_the_scene() {
    let mut store = SceneStore::new();
    store.set_polygons(vec![triangle(0.0), triangle(5.0)]);
    store
        .set_centroids(vec![Point::new(0.5, 0.5), Point::new(5.5, 5.5)])
        .expect("counts match");

    let scene = store.scene();
    assert!(scene.is_complete());
    assert_eq!(scene.polygons.len(), scene.centroids.len());
    assert_eq!(scene.centroids[1], Point::new(5.5, 5.5));
}

#[test]
fn mismatched_centroid_count_is_rejected() {
    let mut store = SceneStore::new();
    store.set_polygons(vec![triangle(0.0)]);

    let err = store
        .set_centroids(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)])
        .expect_err("counts differ");
    assert_eq!(err, SceneError::CountMismatch { polygons: 1, centroids: 2 });

    // The store is untouched by the rejected payload.
    assert!(store.scene().centroids.is_empty());
    assert_eq!(store.polygon_count(), 1);
}

#[test]
fn centroids_without_polygons_are_rejected() {
    let mut store = SceneStore::new();
    let err = store
        .set_centroids(vec![Point::new(0.0, 0.0)])
        .expect_err("no polygons stored");
    assert_eq!(err, SceneError::CountMismatch { polygons: 0, centroids: 1 });
}

#[test]
fn clear_resets_both_slots() {
    let mut store = SceneStore::new();
    store.set_polygons(vec![triangle(0.0)]);
    store.set_centroids(vec![Point::new(0.5, 0.5)]).expect("counts match");

    store.clear();
    assert!(store.is_empty());
    assert!(!store.scene().is_complete());
}

#[test]
fn empty_scene_is_not_complete() {
    let mut store = SceneStore::new();
    store.set_polygons(Vec::new());
    store.set_centroids(Vec::new()).expect("both empty");
    assert!(!store.scene().is_complete());
}
