use crate::error::EventWarning;
use crate::event::{block_location, EventKind, EventRow, TimeWindow};
use crate::snapshot::format_op_timestamp;

use chrono::NaiveDateTime;
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;
use strata_core::geometry::BoundingBox;

/// One entity's pose at an instant. Field names serialize to the renderer's contract.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityState {
    pub position: [f64; 3],
    #[serde(rename = "eyeDirection")]
    pub eye_direction: [f64; 2],
    #[serde(rename = "eyeTarget")]
    pub eye_target: [f64; 3],
}

/// A state change of one entity: the pose before and after, stamped with the later sample's
/// timestamp.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityOp {
    pub timestamp: String,
    pub before: EntityState,
    pub after: EntityState,
}

/// One entity's replayable stream: where it starts and every change it goes through.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityTrack {
    pub initial: EntityState,
    pub ops: Vec<EntityOp>,
}

#[derive(Clone, Debug, Default)]
pub struct TrajectoryExtraction {
    /// Keyed by player name. `BTreeMap` keeps output ordering deterministic.
    pub tracks: BTreeMap<String, EntityTrack>,
    pub warnings: Vec<EventWarning>,
}

/// Derives per-entity state-change streams from movement rows inside `bounds` and `window`.
///
/// Each entity is grouped independently; no cross-entity ordering is implied. Consecutive
/// samples with identical derived states emit nothing; a stationary entity logging movement
/// rows every tick would otherwise bloat the op stream with no-ops.
pub fn extract_entity_tracks(
    rows: &[EventRow],
    bounds: &BoundingBox,
    window: TimeWindow,
    players: Option<&[String]>,
) -> TrajectoryExtraction {
    let mut extraction = TrajectoryExtraction::default();
    let mut samples: BTreeMap<String, Vec<(NaiveDateTime, EntityState)>> = BTreeMap::new();

    let mut moves: Vec<&EventRow> = rows
        .iter()
        .filter(|row| {
            EventKind::parse(&row.event) == Some(EventKind::PlayerMove)
                && window.contains(row.timestamp)
        })
        .collect();
    moves.sort_by_key(|row| row.timestamp);

    for row in moves {
        let Some(player) = &row.player else {
            extraction.warnings.push(EventWarning::MissingPlayer {
                timestamp: row.timestamp,
                event: row.event.clone(),
            });
            continue;
        };
        if let Some(wanted) = players {
            if !wanted.contains(player) {
                continue;
            }
        }
        let Some(location) = block_location(row) else {
            extraction.warnings.push(EventWarning::MissingLocation {
                timestamp: row.timestamp,
                event: row.event.clone(),
            });
            continue;
        };
        if !bounds.contains(location) {
            continue;
        }
        let Some(state) = entity_state(row) else {
            extraction.warnings.push(EventWarning::MissingGaze {
                timestamp: row.timestamp,
                event: row.event.clone(),
                player: player.clone(),
            });
            continue;
        };
        samples
            .entry(player.clone())
            .or_default()
            .push((row.timestamp, state));
    }

    for (player, samples) in samples {
        let initial = samples[0].1.clone();
        let ops = samples
            .iter()
            .tuple_windows()
            .filter(|((_, before), (_, after))| before != after)
            .map(|((_, before), (ts, after))| EntityOp {
                timestamp: format_op_timestamp(*ts),
                before: before.clone(),
                after: after.clone(),
            })
            .collect();
        extraction.tracks.insert(player, EntityTrack { initial, ops });
    }
    extraction
}

/// Builds the pose a movement row describes. Positions snap to the integer block grid the same
/// way block events do; gaze stays sub-block.
fn entity_state(row: &EventRow) -> Option<EntityState> {
    let location = block_location(row)?;
    let (pitch, yaw) = (row.eye_direction_pitch?, row.eye_direction_yaw?);
    let target = [
        row.target_block_x?,
        row.target_block_y?,
        row.target_block_z?,
    ];
    Some(EntityState {
        position: [
            location.x as f64,
            location.y as f64,
            location.z as f64,
        ],
        eye_direction: [pitch, yaw],
        eye_target: target,
    })
}
