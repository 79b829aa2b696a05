use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::PathBuf;
use strata_core::geometry::InvalidBounds;
use thiserror::Error;

/// Fatal failure of a reconstruction request.
///
/// Anything recoverable (missing region files, malformed log rows) never surfaces here; those
/// produce void cells or [`EventWarning`]s instead.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    InvalidBounds(#[from] InvalidBounds),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Fatal failure while decoding region storage.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read region file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed region file: {0}")]
    Region(#[from] fastanvil::Error),
    #[error("malformed chunk payload: {0}")]
    ChunkNbt(#[from] fastnbt::error::Error),
}

/// A log row that was relevant to the request but could not be used. Reconstruction continues;
/// the caller receives the accumulated warnings alongside the bundle.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Error)]
pub enum EventWarning {
    #[error("{event} at {timestamp} has no usable block coordinates")]
    MissingLocation {
        timestamp: NaiveDateTime,
        event: String,
    },
    #[error("{event} at {timestamp} names no material")]
    MissingMaterial {
        timestamp: NaiveDateTime,
        event: String,
    },
    #[error("{event} at {timestamp} names no player")]
    MissingPlayer {
        timestamp: NaiveDateTime,
        event: String,
    },
    #[error("{event} for {player} at {timestamp} is missing gaze state")]
    MissingGaze {
        timestamp: NaiveDateTime,
        event: String,
        player: String,
    },
}
