//! Layer placement and interaction engine for the card editor.
//!
//! The host UI owns the DOM (or whatever surface it paints on) and wires raw
//! pointer events into an [`engine::Editor`]. The editor owns everything
//! else: the ordered layer list and active selection, rotation-aware
//! hit-testing, drag and corner-resize sessions, grid and guide snapping. It
//! answers each event with [`engine::Action`]s and hands committed state to a
//! [`render::RenderAdapter`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Per-canvas [`engine::Editor`] and the pointer state machine |
//! | [`store`] | Ordered layer list, selection, revision counter |
//! | [`layer`] | Layer types, content variants, specs and patches |
//! | [`placement`] | Positioning, sizing, corner resize, alignment guides |
//! | [`hit`] | Rotation-aware hit-testing and resize handles |
//! | [`command`] | Layer intents and the reducer that applies them |
//! | [`viewport`] | Logical canvas space and screen↔logical scaling |
//! | [`input`] | Buttons, modifiers, interaction state |
//! | [`render`] | Scene building and the render adapter trait |
//! | [`canvas2d`] | Built-in render adapter for an HTML `<canvas>` element |
//! | [`config`] | Editor tunables, loadable from the environment |
//! | [`consts`] | Shared numeric constants (grid, minimum size, hit slop) |

pub mod canvas2d;
pub mod command;
pub mod config;
pub mod consts;
pub mod engine;
pub mod hit;
pub mod input;
pub mod layer;
pub mod placement;
pub mod render;
pub mod store;
pub mod viewport;

pub use config::{ConfigError, EditorConfig, SnapStrategy};
pub use engine::{Action, Editor};
pub use layer::{Dimension, Layer, LayerId, LayerKind, LayerPatch, LayerSpec, Position, Size};
pub use placement::PlacementError;
