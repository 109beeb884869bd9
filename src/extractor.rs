use chrono::NaiveDateTime;

use crate::error::{Result, TcxError};
use crate::tcx_types::{Activity, Position, Trackpoint};

/// Span over which field extraction runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every trackpoint of every lap, in document order.
    Activity,
    /// The trackpoints of one lap, by 0-based index.
    Lap(usize),
}

/// Produces one sequence per field kind for a scope, with exactly one
/// slot per trackpoint. A trackpoint that omits a field contributes
/// `None` at its position instead of being skipped, so index *i* of
/// every sequence refers to trackpoint *i* in document order.
pub struct FieldExtractor<'a> {
    activity: &'a Activity,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(activity: &'a Activity) -> Self {
        Self { activity }
    }

    fn scoped(&self, scope: Scope) -> Result<Vec<&'a Trackpoint>> {
        match scope {
            Scope::Activity => Ok(self
                .activity
                .laps
                .iter()
                .flat_map(|lap| lap.trackpoints.iter())
                .collect()),
            Scope::Lap(lap) => {
                let laps = self.activity.laps.len();
                self.activity
                    .laps
                    .get(lap)
                    .map(|l| l.trackpoints.iter().collect())
                    .ok_or(TcxError::LapOutOfRange { lap, laps })
            }
        }
    }

    pub fn positions(&self, scope: Scope) -> Result<Vec<Option<Position>>> {
        Ok(self.scoped(scope)?.into_iter().map(|tp| tp.position).collect())
    }

    pub fn altitudes(&self, scope: Scope) -> Result<Vec<Option<f64>>> {
        Ok(self.scoped(scope)?.into_iter().map(|tp| tp.altitude).collect())
    }

    pub fn distances(&self, scope: Scope) -> Result<Vec<Option<f64>>> {
        Ok(self.scoped(scope)?.into_iter().map(|tp| tp.distance).collect())
    }

    pub fn heart_rates(&self, scope: Scope) -> Result<Vec<Option<f64>>> {
        Ok(self
            .scoped(scope)?
            .into_iter()
            .map(|tp| tp.heart_rate)
            .collect())
    }

    /// Extension speeds, scoped to the requested laps' own trackpoints.
    pub fn speeds(&self, scope: Scope) -> Result<Vec<Option<f64>>> {
        Ok(self.scoped(scope)?.into_iter().map(|tp| tp.speed).collect())
    }

    /// Extension cadences, scoped to the requested laps' own trackpoints.
    pub fn cadences(&self, scope: Scope) -> Result<Vec<Option<f64>>> {
        Ok(self.scoped(scope)?.into_iter().map(|tp| tp.cadence).collect())
    }

    /// Trackpoint timestamps. A malformed timestamp fails the whole
    /// call with [`TcxError::InvalidTimestamp`], it is never dropped.
    pub fn times(&self, scope: Scope) -> Result<Vec<Option<NaiveDateTime>>> {
        self.scoped(scope)?
            .into_iter()
            .map(|tp| tp.time.as_deref().map(parse_timestamp).transpose())
            .collect()
    }
}

/// Parse an ISO-8601 trackpoint timestamp, stripping the trailing UTC
/// marker the way device logs write it (`2023-04-02T09:00:01Z`).
pub(crate) fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let text = raw.trim();
    let text = text.strip_suffix('Z').unwrap_or(text);
    text.parse::<NaiveDateTime>()
        .map_err(|_| TcxError::InvalidTimestamp {
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tcx_types::Lap;

    fn tp(altitude: Option<f64>, heart_rate: Option<f64>) -> Trackpoint {
        Trackpoint {
            altitude,
            heart_rate,
            ..Default::default()
        }
    }

    fn two_lap_activity() -> Activity {
        Activity {
            laps: vec![
                Lap {
                    trackpoints: vec![tp(Some(1.0), Some(100.0)), tp(Some(2.0), None)],
                    ..Default::default()
                },
                Lap {
                    trackpoints: vec![tp(None, Some(120.0))],
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_one_slot_per_trackpoint() {
        let activity = two_lap_activity();
        let ex = FieldExtractor::new(&activity);

        let hr = ex.heart_rates(Scope::Activity).unwrap();
        assert_eq!(hr, vec![Some(100.0), None, Some(120.0)]);

        let alt = ex.altitudes(Scope::Activity).unwrap();
        assert_eq!(alt, vec![Some(1.0), Some(2.0), None]);
    }

    #[test]
    fn test_lap_scope() {
        let activity = two_lap_activity();
        let ex = FieldExtractor::new(&activity);

        assert_eq!(
            ex.heart_rates(Scope::Lap(0)).unwrap(),
            vec![Some(100.0), None]
        );
        assert_eq!(ex.heart_rates(Scope::Lap(1)).unwrap(), vec![Some(120.0)]);
    }

    #[test]
    fn test_lap_out_of_range() {
        let activity = two_lap_activity();
        let ex = FieldExtractor::new(&activity);

        match ex.positions(Scope::Lap(2)) {
            Err(TcxError::LapOutOfRange { lap: 2, laps: 2 }) => {}
            other => panic!("expected LapOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_times_parse_and_strip_z() {
        let activity = Activity {
            laps: vec![Lap {
                trackpoints: vec![
                    Trackpoint {
                        time: Some("2023-04-02T09:00:01Z".to_string()),
                        ..Default::default()
                    },
                    Trackpoint::default(),
                ],
                ..Default::default()
            }],
            ..Default::default()
        };
        let ex = FieldExtractor::new(&activity);
        let times = ex.times(Scope::Activity).unwrap();
        assert_eq!(times.len(), 2);
        assert_eq!(
            times[0].unwrap().to_string(),
            "2023-04-02 09:00:01".to_string()
        );
        assert!(times[1].is_none());
    }

    #[test]
    fn test_malformed_time_propagates() {
        let activity = Activity {
            laps: vec![Lap {
                trackpoints: vec![Trackpoint {
                    time: Some("yesterday".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        let ex = FieldExtractor::new(&activity);
        match ex.times(Scope::Activity) {
            Err(TcxError::InvalidTimestamp { value }) => assert_eq!(value, "yesterday"),
            other => panic!("expected InvalidTimestamp, got {other:?}"),
        }
    }

    #[test]
    fn test_fractional_seconds() {
        let parsed = parse_timestamp("2023-04-02T09:00:01.250Z").unwrap();
        assert_eq!(parsed.to_string(), "2023-04-02 09:00:01.250");
    }
}
