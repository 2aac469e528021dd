//! Text layer for bio-image annotation.
//!
//! Shapes drawn over an image each carry one editable text label. The
//! [`controller::AnnotationController`] owns the shapes and turns pointer and
//! keyboard input into edits; the `text-layer` binary hosts it in an egui
//! image viewer.

pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod keymap;
pub mod layer;
pub mod model;
pub mod store;
pub mod transform;

pub use config::LayerConfig;
pub use controller::{AnnotationController, EditSession, Effect, Interaction};
pub use keymap::{Command, KeyChord, Keymap};
pub use layer::{TextLayer, Tool};
pub use model::{Anchor, Axis, Color4, Point, Shape, ShapeKind, TextStyle};
pub use transform::{Camera, Canvas, Viewport};

/// Initialize logging
///
/// Pretty console output filtered by `RUST_LOG`, `info` when unset.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
