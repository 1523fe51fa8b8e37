#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::layer::ShapeKind;

fn rect_at(x: f64, y: f64) -> LayerSpec {
    LayerSpec::shape(ShapeKind::Rect, "#D94B4B").at(x, y).sized(40.0, 20.0)
}

fn store_with(n: usize) -> (LayerStore, Vec<LayerId>) {
    let mut store = LayerStore::new();
    let ids = (0..n).map(|i| store.add_layer(rect_at(i as f64 * 10.0, 0.0)).id).collect();
    (store, ids)
}

fn order(store: &LayerStore) -> Vec<LayerId> {
    store.layers().iter().map(|l| l.id).collect()
}

// =============================================================
// add_layer
// =============================================================

#[test]
fn new_store_is_empty() {
    let store = LayerStore::new();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert!(store.active_id().is_none());
    assert_eq!(store.revision(), 0);
}

#[test]
fn add_assigns_unique_ids() {
    let (store, ids) = store_with(3);
    assert_eq!(store.len(), 3);
    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
    assert_ne!(ids[0], ids[2]);
}

#[test]
fn add_appends_on_top_and_activates() {
    let (store, ids) = store_with(2);
    assert_eq!(order(&store), ids);
    assert_eq!(store.active_id(), Some(ids[1]));
    assert!(store.layers()[1].position.z > store.layers()[0].position.z);
}

#[test]
fn add_ignores_requested_z() {
    let mut store = LayerStore::new();
    let mut spec = rect_at(0.0, 0.0);
    spec.position = Some(Position::new(0.0, 0.0, 500));
    let first = store.add_layer(spec);
    assert_eq!(first.position.z, 0);
}

#[test]
fn add_without_position_uses_origin() {
    let mut store = LayerStore::new();
    let layer = store.add_layer(LayerSpec::text("hi"));
    assert_eq!((layer.position.x, layer.position.y), (0.0, 0.0));
}

#[test]
fn add_caches_aspect_ratio() {
    let mut store = LayerStore::new();
    let layer = store.add_layer(rect_at(0.0, 0.0));
    assert_eq!(layer.aspect_ratio, Some(2.0));
}

#[test]
fn add_sanitizes_bad_values() {
    let mut store = LayerStore::new();
    let mut spec = rect_at(f64::NAN, 5.0);
    spec.size = Size::pixels(f64::INFINITY, 3.0);
    spec.opacity = 4.0;
    spec.rotation = f64::NAN;
    let layer = store.add_layer(spec);
    assert_eq!(layer.position.x, 0.0);
    assert_eq!(layer.position.y, 5.0);
    assert_eq!(layer.size.width, Dimension::Auto);
    assert_eq!(layer.size.height, Dimension::Pixels(20.0));
    assert_eq!(layer.opacity, 1.0);
    assert_eq!(layer.rotation, 0.0);
}

#[test]
fn add_bumps_revision() {
    let (store, _) = store_with(2);
    assert_eq!(store.revision(), 2);
}

// =============================================================
// update_layer
// =============================================================

#[test]
fn update_merges_present_fields_only() {
    let (mut store, ids) = store_with(1);
    let patch = LayerPatch { x: Some(55.0), rotation: Some(30.0), ..Default::default() };
    assert!(store.update_layer(&ids[0], &patch));
    let layer = store.get(&ids[0]).unwrap();
    assert_eq!(layer.position.x, 55.0);
    assert_eq!(layer.position.y, 0.0);
    assert_eq!(layer.rotation, 30.0);
    assert_eq!(layer.size, Size::pixels(40.0, 20.0));
}

#[test]
fn update_unknown_id_is_noop() {
    let (mut store, _) = store_with(2);
    let before = store.snapshot();
    let rev = store.revision();
    assert!(!store.update_layer(&Uuid::new_v4(), &LayerPatch { x: Some(1.0), ..Default::default() }));
    assert_eq!(store.snapshot(), before);
    assert_eq!(store.revision(), rev);
}

#[test]
fn update_discards_non_finite_values() {
    let (mut store, ids) = store_with(1);
    let patch = LayerPatch {
        x: Some(f64::NAN),
        y: Some(f64::INFINITY),
        width: Some(Dimension::Pixels(f64::NAN)),
        rotation: Some(f64::NEG_INFINITY),
        ..Default::default()
    };
    store.update_layer(&ids[0], &patch);
    let layer = store.get(&ids[0]).unwrap();
    assert_eq!(layer.position.x, 0.0);
    assert_eq!(layer.position.y, 0.0);
    assert_eq!(layer.size.width, Dimension::Pixels(40.0));
    assert_eq!(layer.rotation, 0.0);
}

#[test]
fn update_clamps_size_and_opacity() {
    let (mut store, ids) = store_with(1);
    let patch = LayerPatch {
        width: Some(Dimension::Pixels(-15.0)),
        height: Some(Dimension::Pixels(3.0)),
        opacity: Some(-0.5),
        ..Default::default()
    };
    store.update_layer(&ids[0], &patch);
    let layer = store.get(&ids[0]).unwrap();
    assert_eq!(layer.size, Size::pixels(20.0, 20.0));
    assert_eq!(layer.opacity, 0.0);
}

#[test]
fn update_size_refreshes_aspect_ratio() {
    let (mut store, ids) = store_with(1);
    store.update_layer(&ids[0], &LayerPatch::size(Size::pixels(90.0, 30.0)));
    assert_eq!(store.get(&ids[0]).unwrap().aspect_ratio, Some(3.0));
    store.update_layer(&ids[0], &LayerPatch { width: Some(Dimension::Auto), ..Default::default() });
    assert_eq!(store.get(&ids[0]).unwrap().aspect_ratio, None);
}

#[test]
fn update_rotation_is_not_normalized() {
    let (mut store, ids) = store_with(1);
    store.update_layer(&ids[0], &LayerPatch { rotation: Some(400.0), ..Default::default() });
    assert_eq!(store.get(&ids[0]).unwrap().rotation, 400.0);
}

#[test]
fn update_z_restacks_list() {
    let (mut store, ids) = store_with(3);
    store.update_layer(&ids[0], &LayerPatch { z: Some(99), ..Default::default() });
    assert_eq!(order(&store), vec![ids[1], ids[2], ids[0]]);
}

#[test]
fn update_kind_replaces_content() {
    let (mut store, ids) = store_with(1);
    let kind = LayerSpec::text("new").kind;
    store.update_layer(&ids[0], &LayerPatch { kind: Some(kind.clone()), ..Default::default() });
    assert_eq!(store.get(&ids[0]).unwrap().kind, kind);
}

// =============================================================
// delete_layer
// =============================================================

#[test]
fn delete_active_with_two_remaining_selects_other() {
    let (mut store, ids) = store_with(2);
    assert_eq!(store.active_id(), Some(ids[1]));
    assert!(store.delete_layer(&ids[1]));
    assert_eq!(store.active_id(), Some(ids[0]));
}

#[test]
fn delete_last_layer_clears_active() {
    let (mut store, ids) = store_with(1);
    store.delete_layer(&ids[0]);
    assert!(store.is_empty());
    assert_eq!(store.active_id(), None);
}

#[test]
fn delete_active_picks_first_in_list_order() {
    let (mut store, ids) = store_with(4);
    store.set_active_layer(Some(ids[2]));
    store.delete_layer(&ids[2]);
    assert_eq!(store.active_id(), Some(ids[0]));
}

#[test]
fn delete_inactive_keeps_selection() {
    let (mut store, ids) = store_with(3);
    store.delete_layer(&ids[0]);
    assert_eq!(store.active_id(), Some(ids[2]));
}

#[test]
fn delete_unknown_is_noop() {
    let (mut store, _) = store_with(2);
    let rev = store.revision();
    assert!(!store.delete_layer(&Uuid::new_v4()));
    assert_eq!(store.len(), 2);
    assert_eq!(store.revision(), rev);
}

// =============================================================
// Reordering
// =============================================================

#[test]
fn move_up_swaps_with_neighbor_above() {
    let (mut store, ids) = store_with(3);
    assert!(store.move_layer_up(&ids[0]));
    assert_eq!(order(&store), vec![ids[1], ids[0], ids[2]]);
}

#[test]
fn move_down_swaps_with_neighbor_below() {
    let (mut store, ids) = store_with(3);
    assert!(store.move_layer_down(&ids[2]));
    assert_eq!(order(&store), vec![ids[0], ids[2], ids[1]]);
}

#[test]
fn move_up_on_top_is_noop() {
    let (mut store, ids) = store_with(3);
    let before = store.snapshot();
    assert!(!store.move_layer_up(&ids[2]));
    assert_eq!(store.snapshot(), before);
}

#[test]
fn move_down_on_bottom_is_noop() {
    let (mut store, ids) = store_with(3);
    let before = store.snapshot();
    assert!(!store.move_layer_down(&ids[0]));
    assert_eq!(store.snapshot(), before);
}

#[test]
fn reorder_keeps_z_increasing_along_list() {
    let (mut store, ids) = store_with(4);
    store.move_layer_up(&ids[1]);
    store.move_layer_down(&ids[3]);
    store.move_layer_up(&ids[0]);
    let zs: Vec<i64> = store.layers().iter().map(|l| l.position.z).collect();
    assert!(zs.windows(2).all(|w| w[0] < w[1]), "z not increasing: {zs:?}");
}

#[test]
fn swap_of_equal_z_renumbers() {
    let (mut store, ids) = store_with(2);
    store.update_layer(&ids[1], &LayerPatch { z: Some(0), ..Default::default() });
    store.move_layer_up(&ids[0]);
    assert_eq!(order(&store), vec![ids[1], ids[0]]);
    assert_eq!(store.layers()[0].position.z, 0);
    assert_eq!(store.layers()[1].position.z, 1);
}

#[test]
fn move_unknown_is_noop() {
    let (mut store, _) = store_with(2);
    assert!(!store.move_layer_up(&Uuid::new_v4()));
    assert!(!store.move_layer_down(&Uuid::new_v4()));
}

// =============================================================
// Selection
// =============================================================

#[test]
fn set_active_changes_selection_only() {
    let (mut store, ids) = store_with(2);
    let before = store.snapshot();
    assert!(store.set_active_layer(Some(ids[0])));
    assert_eq!(store.active_id(), Some(ids[0]));
    assert_eq!(store.snapshot(), before);
}

#[test]
fn set_active_none_clears() {
    let (mut store, _) = store_with(1);
    assert!(store.set_active_layer(None));
    assert!(store.active().is_none());
}

#[test]
fn set_active_unknown_is_noop() {
    let (mut store, ids) = store_with(1);
    assert!(!store.set_active_layer(Some(Uuid::new_v4())));
    assert_eq!(store.active_id(), Some(ids[0]));
}

// =============================================================
// Snapshots
// =============================================================

#[test]
fn load_snapshot_sorts_by_z_and_drops_duplicates() {
    let (source, ids) = store_with(3);
    let mut layers = source.snapshot();
    layers.reverse();
    layers.push(layers[0].clone());
    let mut store = LayerStore::new();
    store.load_snapshot(layers);
    assert_eq!(order(&store), ids);
}

#[test]
fn load_snapshot_clears_stale_selection() {
    let (mut store, _) = store_with(1);
    let (other, _) = store_with(2);
    store.load_snapshot(other.snapshot());
    assert!(store.active_id().is_none());
}

#[test]
fn load_snapshot_sanitizes_bad_values() {
    let (source, ids) = store_with(1);
    let mut layers = source.snapshot();
    let layer = &mut layers[0];
    layer.position.x = f64::NAN;
    layer.position.y = f64::NEG_INFINITY;
    layer.size = Size::pixels(f64::NAN, 3.0);
    layer.rotation = f64::INFINITY;
    layer.opacity = 7.0;
    layer.aspect_ratio = Some(f64::NAN);

    let mut store = LayerStore::new();
    store.load_snapshot(layers);
    let loaded = store.get(&ids[0]).unwrap();
    assert_eq!((loaded.position.x, loaded.position.y), (0.0, 0.0));
    assert_eq!(loaded.size.width, Dimension::Auto);
    assert_eq!(loaded.size.height, Dimension::Pixels(MIN_LAYER_SIZE));
    assert_eq!(loaded.rotation, 0.0);
    assert_eq!(loaded.opacity, 1.0);
    assert_eq!(loaded.aspect_ratio, None);
}

#[test]
fn load_snapshot_clamps_negative_opacity() {
    let (source, ids) = store_with(1);
    let mut layers = source.snapshot();
    layers[0].opacity = -2.0;
    let mut store = LayerStore::new();
    store.load_snapshot(layers);
    assert_eq!(store.get(&ids[0]).unwrap().opacity, 0.0);
}
