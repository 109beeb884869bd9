use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, QName, ResolveResult};

use crate::error::{Result, TcxError};
use crate::tcx_types::*;

/// Training Center Database schema namespace.
pub const TCX_NS: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";
/// Activity extension namespace carrying the TPX speed/cadence block.
pub const EXTENSION_NS: &str = "http://www.garmin.com/xmlschemas/ActivityExtension/v2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementNs {
    Tcx,
    Extension,
    Other,
}

/// Resolve which schema an element belongs to. Documents without a
/// default namespace are treated as the base TCX schema; extension
/// elements are honored only under the extension namespace.
fn element_ns(reader: &NsReader<&[u8]>, name: QName<'_>) -> ElementNs {
    let (ns, _) = reader.resolve_element(name);
    match ns {
        ResolveResult::Bound(Namespace(uri)) if uri == TCX_NS.as_bytes() => ElementNs::Tcx,
        ResolveResult::Bound(Namespace(uri)) if uri == EXTENSION_NS.as_bytes() => {
            ElementNs::Extension
        }
        ResolveResult::Unbound => ElementNs::Tcx,
        _ => ElementNs::Other,
    }
}

/// Parse a TCX XML string into the single activity it carries.
///
/// The expected structural path is Activities/Activity/Lap; a document
/// missing any of it fails with [`TcxError::MissingElement`]. Only the
/// first Activity is read, later siblings are ignored.
pub fn parse_tcx(xml: &str) -> Result<Activity> {
    let mut reader = NsReader::from_str(xml);
    let mut saw_activities = false;
    let mut activity: Option<Activity> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let ns = element_ns(&reader, e.name());
                match e.local_name().as_ref() {
                    b"Activities" if ns == ElementNs::Tcx => saw_activities = true,
                    b"Activity" if ns == ElementNs::Tcx && saw_activities => {
                        if activity.is_none() {
                            activity = Some(parse_activity(&mut reader, &e)?);
                        } else {
                            reader.read_to_end(e.name()).map_err(TcxError::XmlParse)?;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(TcxError::XmlParse(e)),
            _ => {}
        }
    }

    if !saw_activities {
        return Err(TcxError::MissingElement("Activities"));
    }
    let activity = activity.ok_or(TcxError::MissingElement("Activity"))?;
    if activity.laps.is_empty() {
        return Err(TcxError::MissingElement("Lap"));
    }
    Ok(activity)
}

/// Parse an <Activity> element and its laps.
/// Called after receiving Event::Start for the element.
fn parse_activity<'a>(
    reader: &mut NsReader<&'a [u8]>,
    start: &BytesStart<'a>,
) -> Result<Activity> {
    let mut activity = Activity::default();

    for attr_result in start.attributes() {
        let attr = attr_result.map_err(|e| TcxError::XmlParse(e.into()))?;
        if attr.key.local_name().as_ref() == b"Sport" {
            let val = std::str::from_utf8(&attr.value).unwrap_or_default();
            activity.sport = Some(val.to_string());
        }
    }

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let ns = element_ns(reader, e.name());
                match e.local_name().as_ref() {
                    b"Id" if ns == ElementNs::Tcx => {
                        activity.id = Some(read_text_owned(reader, &e)?);
                    }
                    b"Lap" if ns == ElementNs::Tcx => {
                        activity.laps.push(parse_lap(reader, &e)?);
                    }
                    _ => {
                        reader.read_to_end(e.name()).map_err(TcxError::XmlParse)?;
                    }
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"Activity" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TcxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(activity)
}

/// Parse a <Lap> element. Lap summary children (TotalTimeSeconds,
/// Calories, ...) are skipped; only the StartTime attribute and the
/// trackpoints of its <Track> children are kept.
fn parse_lap<'a>(reader: &mut NsReader<&'a [u8]>, start: &BytesStart<'a>) -> Result<Lap> {
    let mut lap = Lap::default();

    for attr_result in start.attributes() {
        let attr = attr_result.map_err(|e| TcxError::XmlParse(e.into()))?;
        if attr.key.local_name().as_ref() == b"StartTime" {
            let val = std::str::from_utf8(&attr.value).unwrap_or_default();
            lap.start_time = Some(val.to_string());
        }
    }

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let ns = element_ns(reader, e.name());
                match e.local_name().as_ref() {
                    b"Track" if ns == ElementNs::Tcx => {
                        parse_track(reader, &mut lap.trackpoints)?;
                    }
                    _ => {
                        reader.read_to_end(e.name()).map_err(TcxError::XmlParse)?;
                    }
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"Lap" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TcxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(lap)
}

/// Parse a <Track> element, appending its trackpoints in document order.
fn parse_track<'a>(
    reader: &mut NsReader<&'a [u8]>,
    trackpoints: &mut Vec<Trackpoint>,
) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let ns = element_ns(reader, e.name());
                match e.local_name().as_ref() {
                    b"Trackpoint" if ns == ElementNs::Tcx => {
                        trackpoints.push(parse_trackpoint(reader)?);
                    }
                    _ => {
                        reader.read_to_end(e.name()).map_err(TcxError::XmlParse)?;
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                // A self-closing trackpoint still occupies one slot.
                if e.local_name().as_ref() == b"Trackpoint" {
                    trackpoints.push(Trackpoint::default());
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"Track" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TcxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(())
}

/// Parse a <Trackpoint> element. Every child is optional; absent
/// fields stay `None` so the sample keeps its document-order slot.
fn parse_trackpoint<'a>(reader: &mut NsReader<&'a [u8]>) -> Result<Trackpoint> {
    let mut tp = Trackpoint::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let ns = element_ns(reader, e.name());
                match e.local_name().as_ref() {
                    b"Time" if ns == ElementNs::Tcx => {
                        tp.time = Some(read_text_owned(reader, &e)?);
                    }
                    b"Position" if ns == ElementNs::Tcx => {
                        tp.position = Some(parse_position(reader)?);
                    }
                    b"AltitudeMeters" if ns == ElementNs::Tcx => {
                        let text = read_text_owned(reader, &e)?;
                        tp.altitude = Some(parse_f64("AltitudeMeters", &text)?);
                    }
                    b"DistanceMeters" if ns == ElementNs::Tcx => {
                        let text = read_text_owned(reader, &e)?;
                        tp.distance = Some(parse_f64("DistanceMeters", &text)?);
                    }
                    b"HeartRateBpm" if ns == ElementNs::Tcx => {
                        tp.heart_rate = parse_heart_rate(reader)?;
                    }
                    b"Extensions" if ns == ElementNs::Tcx => {
                        parse_extensions(reader, &mut tp)?;
                    }
                    _ => {
                        reader.read_to_end(e.name()).map_err(TcxError::XmlParse)?;
                    }
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"Trackpoint" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TcxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(tp)
}

/// Parse a <Position> element. Both coordinate children are required
/// once the element is present.
fn parse_position<'a>(reader: &mut NsReader<&'a [u8]>) -> Result<Position> {
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"LatitudeDegrees" => {
                    let text = read_text_owned(reader, &e)?;
                    latitude = Some(parse_f64("LatitudeDegrees", &text)?);
                }
                b"LongitudeDegrees" => {
                    let text = read_text_owned(reader, &e)?;
                    longitude = Some(parse_f64("LongitudeDegrees", &text)?);
                }
                _ => {
                    reader.read_to_end(e.name()).map_err(TcxError::XmlParse)?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"Position" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TcxError::XmlParse(e)),
            _ => {}
        }
    }

    let latitude = latitude.ok_or(TcxError::MissingElement("LatitudeDegrees"))?;
    let longitude = longitude.ok_or(TcxError::MissingElement("LongitudeDegrees"))?;
    Ok(Position::new(latitude, longitude))
}

/// Parse a <HeartRateBpm> element, reading the nested <Value> child.
fn parse_heart_rate<'a>(reader: &mut NsReader<&'a [u8]>) -> Result<Option<f64>> {
    let mut value: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"Value" => {
                    let text = read_text_owned(reader, &e)?;
                    value = Some(parse_f64("Value", &text)?);
                }
                _ => {
                    reader.read_to_end(e.name()).map_err(TcxError::XmlParse)?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"HeartRateBpm" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TcxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(value)
}

/// Parse an <Extensions> element, keeping extension values on the
/// owning trackpoint so later extraction is scoped to that sample.
fn parse_extensions<'a>(reader: &mut NsReader<&'a [u8]>, tp: &mut Trackpoint) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let ns = element_ns(reader, e.name());
                if ns == ElementNs::Extension && e.local_name().as_ref() == b"TPX" {
                    parse_tpx(reader, tp)?;
                } else {
                    reader.read_to_end(e.name()).map_err(TcxError::XmlParse)?;
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"Extensions" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TcxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(())
}

/// Parse a <TPX> extension block (Speed, RunCadence).
fn parse_tpx<'a>(reader: &mut NsReader<&'a [u8]>, tp: &mut Trackpoint) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let ns = element_ns(reader, e.name());
                match e.local_name().as_ref() {
                    b"Speed" if ns == ElementNs::Extension => {
                        let text = read_text_owned(reader, &e)?;
                        tp.speed = Some(parse_f64("Speed", &text)?);
                    }
                    b"RunCadence" if ns == ElementNs::Extension => {
                        let text = read_text_owned(reader, &e)?;
                        tp.cadence = Some(parse_f64("RunCadence", &text)?);
                    }
                    _ => {
                        reader.read_to_end(e.name()).map_err(TcxError::XmlParse)?;
                    }
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"TPX" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TcxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(())
}

fn parse_f64(element: &'static str, text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| TcxError::InvalidValue {
            element,
            value: text.trim().to_string(),
        })
}

/// Read text content of an element as an owned String.
/// Handles regular text, CDATA sections, and entity references.
fn read_text_owned<'a>(
    reader: &mut NsReader<&'a [u8]>,
    start: &BytesStart<'_>,
) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                let raw = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                text.push_str(raw);
            }
            Ok(Event::CData(e)) => {
                let s = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                text.push_str(s);
            }
            Ok(Event::GeneralRef(e)) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    // Predefined XML entities: amp, lt, gt, quot, apos
                    let name = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                    match name {
                        "amp" => text.push('&'),
                        "lt" => text.push('<'),
                        "gt" => text.push('>'),
                        "quot" => text.push('"'),
                        "apos" => text.push('\''),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TcxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(text)
}
