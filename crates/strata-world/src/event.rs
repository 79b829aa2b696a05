use crate::error::EventWarning;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strata_core::geometry::BoundingBox;
use strata_core::glam::IVec3;

/// The half-open `[start, end)` interval over which mutations are replayed as ops rather than
/// folded into the initial snapshot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn from_start_and_seconds(start: NaiveDateTime, duration_seconds: i64) -> Self {
        Self {
            start,
            end: start + Duration::seconds(duration_seconds),
        }
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts < self.end
    }
}

/// One already-tabulated row of the server event log.
///
/// Raw log parsing is an external collaborator's job; this struct is the contract for the
/// tabular form it produces. Columns that a given event kind does not populate are `None`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventRow {
    pub timestamp: NaiveDateTime,
    /// Raw event kind label, e.g. `BlockPlaceEvent`. Kinds this crate does not consume are
    /// carried through and ignored.
    pub event: String,
    pub player: Option<String>,
    /// Integer block coordinates of the event. Recorded as floats upstream; truncated here.
    pub location_x: Option<f64>,
    pub location_y: Option<f64>,
    pub location_z: Option<f64>,
    /// Sub-block eye position. Never used for spatial filtering.
    pub eye_location_x: Option<f64>,
    pub eye_location_y: Option<f64>,
    pub eye_location_z: Option<f64>,
    pub eye_direction_pitch: Option<f64>,
    pub eye_direction_yaw: Option<f64>,
    pub target_block_x: Option<f64>,
    pub target_block_y: Option<f64>,
    pub target_block_z: Option<f64>,
    /// Material placed or removed, for block events.
    pub block: Option<String>,
}

/// Event kinds this crate consumes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventKind {
    BlockPlace,
    BlockBreak,
    PlayerMove,
}

impl EventKind {
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "BlockPlaceEvent" => Some(Self::BlockPlace),
            "BlockBreakEvent" => Some(Self::BlockBreak),
            "PlayerMoveEvent" => Some(Self::PlayerMove),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MutationKind {
    Place,
    Break,
}

/// A block mutation extracted from the log: strictly typed, integer-located, clipped to a box.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlockEvent {
    pub timestamp: NaiveDateTime,
    pub location: IVec3,
    pub kind: MutationKind,
    /// The placed material for [`MutationKind::Place`], the removed material for
    /// [`MutationKind::Break`].
    pub material: String,
}

/// Block mutations relevant to one reconstruction request, split around the window start.
#[derive(Clone, Debug, Default)]
pub struct BlockEventPartition {
    /// Strictly before the window start, in timestamp order.
    pub before: Vec<BlockEvent>,
    /// Within `[start, end)`, in timestamp order.
    pub during: Vec<BlockEvent>,
    pub warnings: Vec<EventWarning>,
}

/// Extracts the place/break events whose block coordinates fall inside `bounds` and partitions
/// them around `window.start`.
///
/// Pure: the same `(rows, bounds, window)` always yields the same ordered output, and `rows` is
/// never mutated. Timestamp ties keep input order (stable sort). Rows of irrelevant kinds are
/// ignored; relevant rows missing their coordinates or material are skipped with a warning.
pub fn partition_block_events(
    rows: &[EventRow],
    bounds: &BoundingBox,
    window: TimeWindow,
) -> BlockEventPartition {
    let mut partition = BlockEventPartition::default();
    let mut relevant = Vec::new();

    for row in rows {
        let kind = match EventKind::parse(&row.event) {
            Some(EventKind::BlockPlace) => MutationKind::Place,
            Some(EventKind::BlockBreak) => MutationKind::Break,
            _ => continue,
        };
        if row.timestamp >= window.end {
            continue;
        }
        let location = match block_location(row) {
            Some(location) => location,
            None => {
                partition.warnings.push(EventWarning::MissingLocation {
                    timestamp: row.timestamp,
                    event: row.event.clone(),
                });
                continue;
            }
        };
        if !bounds.contains(location) {
            continue;
        }
        let material = match &row.block {
            Some(material) => material.clone(),
            None => {
                partition.warnings.push(EventWarning::MissingMaterial {
                    timestamp: row.timestamp,
                    event: row.event.clone(),
                });
                continue;
            }
        };
        relevant.push(BlockEvent {
            timestamp: row.timestamp,
            location,
            kind,
            material,
        });
    }

    relevant.sort_by_key(|ev| ev.timestamp);
    for event in relevant {
        if event.timestamp < window.start {
            partition.before.push(event);
        } else {
            partition.during.push(event);
        }
    }
    partition
}

/// The integer block coordinates of a row. This must come from the `location_*` columns;
/// the sub-block `eye_location_*` and `target_block_*` columns describe gaze, not the mutated
/// block.
pub fn block_location(row: &EventRow) -> Option<IVec3> {
    match (row.location_x, row.location_y, row.location_z) {
        (Some(x), Some(y), Some(z)) => Some(IVec3::new(x as i32, y as i32, z as i32)),
        _ => None,
    }
}
