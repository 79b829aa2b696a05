use crate::event::{BlockEvent, BlockEventPartition, MutationKind};
use crate::layer::{plane_shape, Layer, PlaneShape};
use crate::palette::{MaterialPalette, VOID_ID};

use chrono::NaiveDateTime;
use serde::Serialize;
use strata_core::geometry::BoundingBox;
use strata_core::glam::IVec3;

/// The material content of a bounding box at one instant: one [`Layer`] per y-plane plus the
/// palette those layers' codes index into.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorldState {
    pub layers: Vec<Layer>,
    pub palette: MaterialPalette,
}

impl WorldState {
    pub fn material_at(&self, bounds: &BoundingBox, shape: &PlaneShape, p: IVec3) -> &str {
        let rel = bounds.relative(p);
        let code = self.layers[rel.y as usize].get(rel.z as u32, rel.x as u32, shape);
        &self.palette[code]
    }
}

/// A block mutation projected into replay form. `before`/`after` are material identifiers; the
/// timestamp is ISO-8601 for the consuming renderer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BlockOp {
    pub timestamp: String,
    pub location: [i32; 3],
    pub before: String,
    pub after: String,
}

pub fn format_op_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// Projects a filtered event to op form. Breaks transition the removed material to void; places
/// transition void to the placed material.
pub fn project_op(event: &BlockEvent, void_material: &str) -> BlockOp {
    let (before, after) = match event.kind {
        MutationKind::Break => (event.material.clone(), void_material.to_owned()),
        MutationKind::Place => (void_material.to_owned(), event.material.clone()),
    };
    BlockOp {
        timestamp: format_op_timestamp(event.timestamp),
        location: event.location.to_array(),
        before,
        after,
    }
}

/// Writes one filtered event into the state, registering its material if new.
///
/// The event must lie inside `bounds` (the filter guarantees this). Applying the same event
/// again overwrites the same cell with the same code, so repeated application is idempotent.
pub fn apply_block_event(
    state: &mut WorldState,
    bounds: &BoundingBox,
    shape: &PlaneShape,
    event: &BlockEvent,
) {
    let code = match event.kind {
        MutationKind::Break => VOID_ID,
        MutationKind::Place => state.palette.get_or_insert(&event.material),
    };
    let rel = bounds.relative(event.location);
    state.layers[rel.y as usize].set(rel.z as u32, rel.x as u32, code, shape);
}

/// Replays an already-projected op onto the state.
///
/// The op's materials must already be registered; [`reconstruct`] guarantees that for every op
/// it emits. An unregistered material here is a programming error, not a runtime condition.
pub fn apply_block_op(
    state: &mut WorldState,
    bounds: &BoundingBox,
    shape: &PlaneShape,
    op: &BlockOp,
) {
    let code = state
        .palette
        .id_of(&op.after)
        .expect("op references a material the palette never registered");
    let [x, y, z] = op.location;
    let rel = bounds.relative(IVec3::new(x, y, z));
    state.layers[rel.y as usize].set(rel.z as u32, rel.x as u32, code, shape);
}

/// The output of one snapshot reconstruction: the state at window start plus the ordered op
/// stream to replay across the window.
#[derive(Clone, Debug)]
pub struct Reconstruction {
    pub initial: WorldState,
    pub window_ops: Vec<BlockOp>,
}

/// Folds every before-window event into the base decode and projects the in-window events to
/// ops.
///
/// Palette growth is append-only and ordered: base-decode materials first (already in `base`),
/// then materials first encountered while applying before-window events, then materials first
/// encountered while scanning in-window events. The scan of in-window events happens *before*
/// any op is returned, so the initial palette already names every material the op stream will
/// ever reference and consumers may pre-size fixed-width storage.
pub fn reconstruct(
    mut base: WorldState,
    partition: &BlockEventPartition,
    bounds: &BoundingBox,
) -> Reconstruction {
    let shape = plane_shape(bounds);
    for event in &partition.before {
        apply_block_event(&mut base, bounds, &shape, event);
    }
    for event in &partition.during {
        base.palette.get_or_insert(&event.material);
    }
    let void_material = base.palette.void_material().to_owned();
    let window_ops = partition
        .during
        .iter()
        .map(|event| project_op(event, &void_material))
        .collect();
    Reconstruction {
        initial: base,
        window_ops,
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
