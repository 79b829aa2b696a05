//! Replay reconstruction for bounded voxel worlds.
//!
//! Given a directory of paged region storage and an already-tabulated event log, a
//! [`WorldView`] rebuilds the world inside one bounding box at a window start and emits the
//! ordered op streams (terrain mutations, entity movement, joint attention) that an external
//! renderer replays across the window.

mod config;
mod view;

pub use config::Config;
pub use view::{ReplayRequest, WorldView};

pub use strata_core;
pub use strata_world;
