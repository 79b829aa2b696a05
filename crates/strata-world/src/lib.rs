//! Reconstruction of a bounded voxel world over a replay window.
//!
//! # Layers
//!
//! The world inside a [`BoundingBox`](strata_core::geometry::BoundingBox) is stored as one
//! [`Layer`](crate::Layer) per horizontal plane. A layer is either *sparse* (a list of occupied
//! cells) or *dense* (a flat plane of palette codes), chosen once at decode time by occupancy
//! density. Empty space is assumed to be a constant void material.
//!
//! # Materials
//!
//! A voxel's [`PaletteId16`](crate::PaletteId16) looks up its material identifier via a
//! [`MaterialPalette`](crate::MaterialPalette). The palette is append-only and
//! insertion-ordered, so codes assigned during a reconstruction session never move, and a
//! consumer can pre-size fixed-width storage from the finished palette.
//!
//! # Replay
//!
//! Logged block mutations are filtered to the box, folded into the decoded base state up to the
//! window start, and projected to ordered [`BlockOp`](crate::BlockOp)s inside the window.
//! Player movement rows become per-entity state-change streams, and pairs of gaze-target
//! trajectories become a joint-attention signal. All of it assembles into a
//! [`SceneBundle`](crate::SceneBundle) for an external renderer.

mod anvil;
mod attention;
mod bundle;
mod coordinates;
mod error;
mod event;
mod layer;
mod palette;
mod snapshot;
mod trajectory;

pub use anvil::*;
pub use attention::*;
pub use bundle::*;
pub use coordinates::*;
pub use error::*;
pub use event::*;
pub use layer::*;
pub use palette::*;
pub use snapshot::*;
pub use trajectory::*;
