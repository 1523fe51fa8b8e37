#![allow(clippy::float_cmp)]

use super::*;
use crate::layer::LayerSpec;
use crate::store::LayerStore;

fn store_with_three() -> LayerStore {
    let mut store = LayerStore::new();
    store.add_layer(LayerSpec::image("https://cdn.test/bg.png").at(400.0, 300.0).sized(800.0, 600.0));
    store.add_layer(LayerSpec::text("Happy birthday").at(400.0, 100.0).hidden());
    store.add_layer(LayerSpec::shape(ShapeKind::Star, "#FFD700").at(100.0, 100.0).sized(50.0, 50.0).rotated(20.0));
    store
}

// =============================================================
// DrawItem
// =============================================================

#[test]
fn draw_item_resolves_geometry() {
    let store = store_with_three();
    let star = &store.layers()[2];
    let item = DrawItem::from_layer(star);
    assert_eq!(item.id, star.id);
    assert_eq!(item.center, Point::new(100.0, 100.0));
    assert_eq!((item.width, item.height), (50.0, 50.0));
    assert_eq!(item.rotation, 20.0);
    assert_eq!(item.opacity, 1.0);
    assert!(matches!(item.paint, Paint::Shape { shape: ShapeKind::Star, .. }));
}

#[test]
fn draw_item_resolves_auto_text_size() {
    let mut store = LayerStore::new();
    let layer = store.add_layer(LayerSpec::text("abcd"));
    let item = DrawItem::from_layer(&layer);
    assert!((item.width - 4.0 * 24.0 * 0.6).abs() < 1e-9);
    match item.paint {
        Paint::Text { text, align, .. } => {
            assert_eq!(text, "abcd");
            assert_eq!(align, TextAlign::Center);
        }
        other => panic!("expected text paint, got {other:?}"),
    }
}

// =============================================================
// Scene
// =============================================================

#[test]
fn scene_skips_hidden_and_keeps_order() {
    let store = store_with_three();
    let scene = Scene::build(store.layers(), store.revision(), store.active_id(), &Guides::default());
    let ids: Vec<_> = scene.items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![store.layers()[0].id, store.layers()[2].id]);
    assert_eq!(scene.revision, store.revision());
    assert_eq!(scene.active, store.active_id());
}

#[test]
fn scene_carries_guides() {
    let guides = Guides { horizontal: vec![300.0], vertical: vec![] };
    let scene = Scene::build(&[], 0, None, &guides);
    assert!(scene.items.is_empty());
    assert_eq!(scene.guides, guides);
}

#[test]
fn scene_serializes_tagged_paint() {
    let store = store_with_three();
    let scene = Scene::build(store.layers(), store.revision(), None, &Guides::default());
    let json = serde_json::to_value(&scene).unwrap();
    assert_eq!(json["items"][0]["paint"]["type"], "image");
    assert_eq!(json["items"][1]["paint"]["type"], "shape");
}

// =============================================================
// RenderAdapter
// =============================================================

#[derive(Default)]
struct Recorder {
    frames: Vec<Scene>,
}

impl RenderAdapter for Recorder {
    fn canvas_rect(&self) -> CanvasRect {
        CanvasRect::sized(800.0, 600.0)
    }

    fn paint(&mut self, scene: &Scene) {
        self.frames.push(scene.clone());
    }
}

#[test]
fn adapter_receives_scene() {
    let store = store_with_three();
    let mut recorder = Recorder::default();
    recorder.paint(&Scene::build(store.layers(), store.revision(), None, &Guides::default()));
    assert_eq!(recorder.frames.len(), 1);
    assert_eq!(recorder.frames[0].items.len(), 2);
    assert_eq!(recorder.canvas_rect().width, 800.0);
}
