//! Errors raised while loading the world file.

use thiserror::Error;

use super::world::MapId;

/// The world file is malformed. Raised once at start-up; a loaded
/// [`World`](super::world::World) is trusted from then on.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("world file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("map '{0:?}' is defined twice")]
    DuplicateMap(MapId),

    #[error("start map '{0:?}' is not defined")]
    MissingStart(MapId),

    #[error("map '{0:?}' has no tiles")]
    EmptyMap(MapId),

    #[error("map '{map:?}' row {row} is {actual} tiles wide, expected {expected}")]
    RaggedRow {
        map: MapId,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("map '{map:?}' has unknown tile '{glyph}' at ({x}, {y})")]
    UnknownGlyph { map: MapId, glyph: char, x: usize, y: usize },

    #[error("map '{map:?}': {what} at ({x}, {y}) is outside the map")]
    OutOfBounds {
        map: MapId,
        what: &'static str,
        x: i32,
        y: i32,
    },

    #[error("map '{map:?}' has an exit to undefined map '{to:?}'")]
    UnknownDestination { map: MapId, to: MapId },
}
