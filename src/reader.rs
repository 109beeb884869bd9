use std::path::Path;

use log::{error, info};

use crate::error::{Result, TcxError};
use crate::extractor::{FieldExtractor, Scope};
use crate::parser;
use crate::table::{self, ActivityTable};
use crate::tcx_types::Activity;

/// Reader facade over one TCX file.
///
/// Construction loads and parses the document, counts the laps and
/// eagerly assembles the whole-activity table, which is cached for the
/// reader's lifetime. Per-lap tables are recomputed on each call. The
/// parsed document is immutable after load; for concurrent use, load
/// one reader per caller.
#[derive(Debug)]
pub struct TcxReader {
    activity: Activity,
    laps_number: usize,
    table: ActivityTable,
}

impl TcxReader {
    /// Load a TCX file from disk.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path).map_err(|source| TcxError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_xml(&xml)
    }

    /// Build a reader from an in-memory TCX document.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let activity = parser::parse_tcx(xml)?;
        let laps_number = activity.laps.len();
        let table = assemble_scope(&activity, Scope::Activity)?;
        info!(
            "parsed activity with {laps_number} laps and {} trackpoints",
            table.len()
        );
        Ok(Self {
            activity,
            laps_number,
            table,
        })
    }

    /// Number of laps in the activity.
    pub fn lap_count(&self) -> usize {
        self.laps_number
    }

    /// The cached whole-activity table.
    pub fn table(&self) -> &ActivityTable {
        &self.table
    }

    /// The parsed document.
    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    /// Assemble the table for one lap. Lap indices are 0-based and
    /// `lap >= lap_count()` fails with [`TcxError::LapOutOfRange`] so a
    /// caller can tell an invalid index from an empty lap.
    pub fn lap_table(&self, lap: usize) -> Result<ActivityTable> {
        if lap >= self.laps_number {
            error!(
                "lap index {lap} out of range for activity with {} laps",
                self.laps_number
            );
            return Err(TcxError::LapOutOfRange {
                lap,
                laps: self.laps_number,
            });
        }
        let table = assemble_scope(&self.activity, Scope::Lap(lap))?;
        info!("lap {lap}: {} rows", table.len());
        Ok(table)
    }
}

fn assemble_scope(activity: &Activity, scope: Scope) -> Result<ActivityTable> {
    let extractor = FieldExtractor::new(activity);
    Ok(table::assemble(
        extractor.positions(scope)?,
        extractor.altitudes(scope)?,
        extractor.times(scope)?,
        extractor.distances(scope)?,
        extractor.heart_rates(scope)?,
        extractor.speeds(scope)?,
        extractor.cadences(scope)?,
    ))
}
