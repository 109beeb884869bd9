/// A parsed TCX activity: the document's single top-level data unit.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Activity {
    /// Content of the <Id> child, usually the activity start time.
    pub id: Option<String>,
    /// The Sport attribute (Running, Biking, ...).
    pub sport: Option<String>,
    pub laps: Vec<Lap>,
}

/// One lap: an ordered run of trackpoints, identified by its 0-based
/// position within the activity. Trackpoints from multiple <Track>
/// elements inside the same lap are flattened in document order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Lap {
    /// The StartTime attribute, kept as raw text.
    pub start_time: Option<String>,
    pub trackpoints: Vec<Trackpoint>,
}

/// One timestamped sample. Every field is independently optional; a
/// trackpoint that omits a field keeps `None` in that slot so samples
/// never lose their position in document order.
///
/// `time` is kept as the raw ISO-8601 text so that a malformed
/// timestamp surfaces from time extraction, not from document loading.
/// `speed` and `cadence` come from the trackpoint's own
/// Extensions/TPX block under the activity-extension namespace.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Trackpoint {
    pub time: Option<String>,
    pub position: Option<Position>,
    /// Meters above sea level.
    pub altitude: Option<f64>,
    /// Cumulative meters since the activity start.
    pub distance: Option<f64>,
    /// Beats per minute, from HeartRateBpm/Value.
    pub heart_rate: Option<f64>,
    /// Meters per second, from Extensions/TPX/Speed.
    pub speed: Option<f64>,
    /// Steps or revolutions per minute, from Extensions/TPX/RunCadence.
    pub cadence: Option<f64>,
}

/// A coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}
