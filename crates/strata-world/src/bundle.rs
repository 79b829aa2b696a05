use crate::attention::AttentionTrack;
use crate::error::EventWarning;
use crate::layer::Layer;
use crate::snapshot::BlockOp;
use crate::trajectory::EntityTrack;

use serde::Serialize;
use std::collections::BTreeMap;

/// The request a bundle answers, echoed back for the consumer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BundleParams {
    pub bounding_box: [[i32; 2]; 3],
    pub timespan: [String; 2],
}

/// The terrain portion of a replay: the palette and layers at window start, plus the ordered op
/// stream across the window.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TerrainBundle {
    /// Materials in code order; position is the [`PaletteId16`](crate::PaletteId16).
    pub palette: Vec<String>,
    /// One layer per y-plane, bottom up.
    pub layers: Vec<Layer>,
    pub ops: Vec<BlockOp>,
}

/// Everything an external renderer needs to play one reconstruction request back.
///
/// This is the logical structure only; the wire format is whatever the caller's serializer
/// makes of it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneBundle {
    pub params: BundleParams,
    pub terrain: TerrainBundle,
    pub players: BTreeMap<String, EntityTrack>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attention: Vec<AttentionTrack>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<EventWarning>,
}
