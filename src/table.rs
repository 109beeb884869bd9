use chrono::NaiveDateTime;
use serde::Serialize;

use crate::tcx_types::Position;

/// Column names of an assembled table, in schema order.
pub const COLUMNS: [&str; 8] = [
    "latitude",
    "longitude",
    "altitude",
    "time",
    "distance",
    "heart_rate",
    "speed",
    "cadence",
];

/// One table row. Every column is optional; `None` marks a field the
/// trackpoint did not carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Row {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub time: Option<NaiveDateTime>,
    pub distance: Option<f64>,
    pub heart_rate: Option<f64>,
    pub speed: Option<f64>,
    pub cadence: Option<f64>,
}

/// A flat, row-aligned view of one scope's trackpoints: row *i*
/// corresponds to trackpoint *i* in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityTable {
    rows: Vec<Row>,
}

impl ActivityTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

/// Zip the seven field sequences into a table.
///
/// The merge policy is strict zip-longest: the row count is the longest
/// sequence's length and shorter sequences pad with `None` at unmatched
/// positions. Truncating to the shortest would silently drop trailing
/// trackpoints. Sequences coming from [`crate::FieldExtractor`] are
/// already equal length, one slot per trackpoint.
pub fn assemble(
    positions: Vec<Option<Position>>,
    altitudes: Vec<Option<f64>>,
    times: Vec<Option<NaiveDateTime>>,
    distances: Vec<Option<f64>>,
    heart_rates: Vec<Option<f64>>,
    speeds: Vec<Option<f64>>,
    cadences: Vec<Option<f64>>,
) -> ActivityTable {
    let len = positions
        .len()
        .max(altitudes.len())
        .max(times.len())
        .max(distances.len())
        .max(heart_rates.len())
        .max(speeds.len())
        .max(cadences.len());

    let mut rows = Vec::with_capacity(len);
    for i in 0..len {
        let position = positions.get(i).copied().flatten();
        rows.push(Row {
            latitude: position.map(|p| p.latitude),
            longitude: position.map(|p| p.longitude),
            altitude: altitudes.get(i).copied().flatten(),
            time: times.get(i).copied().flatten(),
            distance: distances.get(i).copied().flatten(),
            heart_rate: heart_rates.get(i).copied().flatten(),
            speed: speeds.get(i).copied().flatten(),
            cadence: cadences.get(i).copied().flatten(),
        });
    }

    ActivityTable { rows }
}
