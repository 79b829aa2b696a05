use crate::event::{EventKind, EventRow, TimeWindow};
use crate::snapshot::format_op_timestamp;

use chrono::{Duration, NaiveDateTime};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tunables for the joint-attention signal.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct AttentionConfig {
    /// Pointwise test: two gaze targets whose squared distance is at or under this are "on the
    /// same thing".
    pub distance_sq_threshold: f64,
    /// Trailing window `(t - w, t]` for the rolling maximum, in seconds.
    pub window_seconds: i64,
    /// Step of the resampled series, in seconds.
    pub granularity_seconds: i64,
    /// How long forward-fill may carry a stale sample before the entity counts as absent.
    pub max_fill_seconds: i64,
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            distance_sq_threshold: 10.0,
            window_seconds: 2,
            granularity_seconds: 1,
            max_fill_seconds: 10,
        }
    }
}

pub type TargetSample = (NaiveDateTime, [f64; 3]);

/// Gaze-target samples per player, clipped to the window and sorted by time.
pub fn gaze_target_series(
    rows: &[EventRow],
    window: TimeWindow,
) -> BTreeMap<String, Vec<TargetSample>> {
    let mut series: BTreeMap<String, Vec<TargetSample>> = BTreeMap::new();
    let mut moves: Vec<&EventRow> = rows
        .iter()
        .filter(|row| {
            EventKind::parse(&row.event) == Some(EventKind::PlayerMove)
                && window.contains(row.timestamp)
        })
        .collect();
    moves.sort_by_key(|row| row.timestamp);

    for row in moves {
        let Some(player) = &row.player else { continue };
        let (Some(x), Some(y), Some(z)) =
            (row.target_block_x, row.target_block_y, row.target_block_z)
        else {
            continue;
        };
        series
            .entry(player.clone())
            .or_default()
            .push((row.timestamp, [x, y, z]));
    }
    series
}

/// The sustained co-attention series for one pair of entities, over the window at the
/// configured granularity.
///
/// True at `t` iff the two targets passed the pointwise distance test at some grid instant in
/// the trailing window `(t - w, t]`. An entity with no sample at a grid instant (nothing at or
/// before it within the fill bound) makes the pointwise test false there, never an error.
pub fn joint_attention_series(
    a: &[TargetSample],
    b: &[TargetSample],
    window: TimeWindow,
    config: &AttentionConfig,
) -> Vec<(NaiveDateTime, bool)> {
    let grid = sample_grid(window, config);
    let max_fill = Duration::seconds(config.max_fill_seconds);
    let pointwise: Vec<bool> = grid
        .iter()
        .map(|&t| match (sample_at(a, t, max_fill), sample_at(b, t, max_fill)) {
            (Some(ta), Some(tb)) => distance_sq(ta, tb) <= config.distance_sq_threshold,
            _ => false,
        })
        .collect();

    let trailing = Duration::seconds(config.window_seconds);
    grid.iter()
        .enumerate()
        .map(|(i, &t)| {
            let hit = (0..=i)
                .rev()
                .take_while(|&j| t - grid[j] < trailing)
                .any(|j| pointwise[j]);
            (t, hit)
        })
        .collect()
}

/// Engagement flag plus a marker position (the midpoint of the two targets while both are
/// sampled).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttentionState {
    pub visible: bool,
    pub position: [f64; 3],
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttentionOp {
    pub timestamp: String,
    pub before: AttentionState,
    pub after: AttentionState,
}

/// The joint-attention stream for one pair of entities.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttentionTrack {
    pub pair: [String; 2],
    pub initial: AttentionState,
    pub ops: Vec<AttentionOp>,
}

/// Computes a track per pair of entities that both have gaze samples in the window.
///
/// Ops are emitted at change points only, so a pair that never attends jointly contributes a
/// single invisible initial state and no ops.
pub fn extract_attention(
    rows: &[EventRow],
    window: TimeWindow,
    config: &AttentionConfig,
) -> Vec<AttentionTrack> {
    let series = gaze_target_series(rows, window);
    series
        .keys()
        .tuple_combinations()
        .filter_map(|(a, b)| {
            attention_track(a, b, &series[a], &series[b], window, config)
        })
        .collect()
}

fn attention_track(
    a_name: &str,
    b_name: &str,
    a: &[TargetSample],
    b: &[TargetSample],
    window: TimeWindow,
    config: &AttentionConfig,
) -> Option<AttentionTrack> {
    let engaged = joint_attention_series(a, b, window, config);
    let max_fill = Duration::seconds(config.max_fill_seconds);

    let mut states = Vec::with_capacity(engaged.len());
    let mut position = [0.0; 3];
    for &(t, visible) in &engaged {
        if let (Some(ta), Some(tb)) = (sample_at(a, t, max_fill), sample_at(b, t, max_fill)) {
            position = midpoint(ta, tb);
        }
        states.push((t, AttentionState { visible, position }));
    }

    let initial = states.first()?.1.clone();
    let ops = states
        .iter()
        .tuple_windows()
        .filter(|((_, before), (_, after))| before != after)
        .map(|((_, before), (ts, after))| AttentionOp {
            timestamp: format_op_timestamp(*ts),
            before: before.clone(),
            after: after.clone(),
        })
        .collect();
    Some(AttentionTrack {
        pair: [a_name.to_owned(), b_name.to_owned()],
        initial,
        ops,
    })
}

fn sample_grid(window: TimeWindow, config: &AttentionConfig) -> Vec<NaiveDateTime> {
    let step = Duration::seconds(config.granularity_seconds.max(1));
    let mut grid = Vec::new();
    let mut t = window.start;
    while t < window.end {
        grid.push(t);
        t = t + step;
    }
    grid
}

/// Forward-fill: the most recent sample at or before `t`, unless it is older than `max_fill`.
fn sample_at(series: &[TargetSample], t: NaiveDateTime, max_fill: Duration) -> Option<[f64; 3]> {
    let idx = series.partition_point(|&(ts, _)| ts <= t);
    let (ts, target) = series[..idx].last()?;
    (t - *ts <= max_fill).then_some(*target)
}

fn distance_sq(a: [f64; 3], b: [f64; 3]) -> f64 {
    (b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2) + (b[2] - a[2]).powi(2)
}

fn midpoint(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        (a[0] + b[0]) / 2.0,
        (a[1] + b[1]) / 2.0,
        (a[2] + b[2]) / 2.0,
    ]
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;

    use strata_core::approx::assert_relative_eq;

    fn ts(s: &str) -> NaiveDateTime {
        s.parse().unwrap()
    }

    fn window() -> TimeWindow {
        TimeWindow::from_start_and_seconds(ts("2022-03-01T10:00:00"), 20)
    }

    fn config() -> AttentionConfig {
        AttentionConfig {
            distance_sq_threshold: 6.0,
            window_seconds: 2,
            granularity_seconds: 1,
            max_fill_seconds: 10,
        }
    }

    /// Samples every second over `[from, to]`, at a constant target.
    fn steady(from: u32, to: u32, target: [f64; 3]) -> Vec<TargetSample> {
        (from..=to)
            .map(|s| (ts(&format!("2022-03-01T10:00:{s:02}")), target))
            .collect()
    }

    #[test]
    fn trailing_window_extends_past_the_last_proximity() {
        // Together for seconds 10..=14, far apart for 15..=20.
        let mut a = steady(10, 14, [0.0, 0.0, 0.0]);
        a.extend(steady(15, 20, [100.0, 0.0, 0.0]));
        let b = steady(10, 20, [1.0, 1.0, 1.0]);

        let series = joint_attention_series(&a, &b, window(), &config());
        for (t, engaged) in series {
            let second = t.format("%S").to_string().parse::<u32>().unwrap();
            let expected = (10..16).contains(&second);
            assert_eq!(engaged, expected, "at second {second}");
        }
    }

    #[test]
    fn absent_samples_read_as_false_not_error() {
        // b has no samples at all; a alone can never engage.
        let a = steady(0, 20, [0.0, 0.0, 0.0]);
        let series = joint_attention_series(&a, &[], window(), &config());
        assert!(series.iter().all(|&(_, engaged)| !engaged));
    }

    #[test]
    fn forward_fill_is_bounded() {
        // One early sample each; the fill bound expires 10 s later.
        let a = steady(0, 0, [0.0, 0.0, 0.0]);
        let b = steady(0, 0, [1.0, 1.0, 1.0]);
        let series = joint_attention_series(&a, &b, window(), &config());
        for (t, engaged) in series {
            let second = t.format("%S").to_string().parse::<u32>().unwrap();
            // The fill holds the pointwise test true through second 10, and the trailing
            // window keeps the signal up one grid step longer.
            assert_eq!(engaged, second < 12, "at second {second}");
        }
    }

    #[test]
    fn ops_are_emitted_at_change_points_only() {
        let mut a = steady(10, 14, [0.0, 0.0, 0.0]);
        a.extend(steady(15, 20, [100.0, 0.0, 0.0]));
        let rows: Vec<EventRow> = [("ada", a), ("grace", steady(0, 20, [1.0, 1.0, 1.0]))]
            .into_iter()
            .flat_map(|(name, samples)| {
                samples.into_iter().map(move |(timestamp, target)| EventRow {
                    timestamp,
                    event: "PlayerMoveEvent".to_owned(),
                    player: Some(name.to_owned()),
                    target_block_x: Some(target[0]),
                    target_block_y: Some(target[1]),
                    target_block_z: Some(target[2]),
                    ..EventRow::default()
                })
            })
            .collect();

        let tracks = extract_attention(&rows, window(), &config());
        assert_eq!(tracks.len(), 1);
        let track = &tracks[0];
        assert_eq!(track.pair, ["ada".to_owned(), "grace".to_owned()]);
        assert!(!track.initial.visible);

        // The marker sits at the midpoint of the two targets once both are sampled.
        let engage = track
            .ops
            .iter()
            .find(|op| op.after.visible && !op.before.visible)
            .unwrap();
        for (axis, expected) in engage.after.position.into_iter().zip([0.5, 0.5, 0.5]) {
            assert_relative_eq!(axis, expected);
        }

        // Engagement turns on at second 10 and off at 16; the marker midpoint is steady while
        // engaged, so those two transitions are the only visibility flips.
        let flips: Vec<_> = track
            .ops
            .iter()
            .filter(|op| op.before.visible != op.after.visible)
            .map(|op| op.timestamp.clone())
            .collect();
        assert_eq!(
            flips,
            vec![
                "2022-03-01T10:00:10".to_owned(),
                "2022-03-01T10:00:16".to_owned(),
            ]
        );
    }
}
