//! Reader for Garmin Training Center XML (TCX) activity files.
//!
//! Parses the nested Activity → Lap → Track → Trackpoint tree and
//! flattens it into a row-aligned table with a fixed column schema
//! (`latitude, longitude, altitude, time, distance, heart_rate, speed,
//! cadence`). Every per-trackpoint field is independently optional;
//! a missing field keeps a `None` slot in its row so row *i* always
//! corresponds to trackpoint *i* in document order.
//!
//! ```
//! use tcx_table::TcxReader;
//!
//! let xml = r#"<?xml version="1.0"?>
//! <TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2">
//!   <Activities>
//!     <Activity Sport="Running">
//!       <Lap StartTime="2023-04-02T09:00:00Z">
//!         <Track>
//!           <Trackpoint>
//!             <Time>2023-04-02T09:00:01Z</Time>
//!             <AltitudeMeters>120.5</AltitudeMeters>
//!           </Trackpoint>
//!         </Track>
//!       </Lap>
//!     </Activity>
//!   </Activities>
//! </TrainingCenterDatabase>"#;
//!
//! let reader = TcxReader::from_xml(xml)?;
//! assert_eq!(reader.lap_count(), 1);
//! assert_eq!(reader.table().len(), 1);
//! assert_eq!(reader.table().rows()[0].altitude, Some(120.5));
//! # Ok::<(), tcx_table::TcxError>(())
//! ```

pub mod error;
pub mod extractor;
pub mod parser;
pub mod reader;
pub mod table;
pub mod tcx_types;

pub use error::{Result, TcxError};
pub use extractor::{FieldExtractor, Scope};
pub use parser::{EXTENSION_NS, TCX_NS, parse_tcx};
pub use reader::TcxReader;
pub use table::{ActivityTable, COLUMNS, Row};
pub use tcx_types::{Activity, Lap, Position, Trackpoint};
