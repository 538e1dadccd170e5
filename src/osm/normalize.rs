// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Conversion of free-form OSM way tags into canonical [WayAttributes].
//!
//! OSM has no enforced schema, and numeric tags come in every imaginable shape:
//! plain numbers, `"50;70"` lists, `"30 mph"`, `"50 conditional ..."`, or nothing at all.
//! Every normalizer here accepts all of those and falls back to per-highway-type defaults
//! when a value is missing.

use super::classify::is_roundabout;
use super::tags::{get_str, get_text_or};
use super::{TagValue, Tags};

/// Number of kilometers in a mile.
pub const KMH_PER_MPH: f64 = 1.60934;

/// Tag value which is treated exactly like a missing tag.
const DEFAULT_SENTINEL: &str = "default";

/// Delimiters separating multiple values in a single OSM tag.
const OSM_LIST_DELIMITERS: [char; 5] = [';', ',', '|', '+', '-'];

/// Anything after this marker (lowercase) is ignored when parsing text values.
const CONDITIONAL_MARKER: &str = "conditional";

/// Default `maxspeed` (km/h) by `highway` value. Must contain an "other" entry.
pub const DEFAULT_MAXSPEEDS: &[(&str, u32)] = &[
    ("motorway", 100),
    ("trunk", 100),
    ("primary", 100),
    ("secondary", 100),
    ("tertiary", 50),
    ("unclassified", 50),
    ("residential", 50),
    ("other", 50),
];

/// Default `lanes` by `highway` value. Must contain an "other" entry.
pub const DEFAULT_LANES: &[(&str, u32)] = &[
    ("motorway", 3),
    ("trunk", 3),
    ("primary", 2),
    ("secondary", 2),
    ("tertiary", 1),
    ("unclassified", 1),
    ("residential", 1),
    ("other", 1),
];

/// Default `oneway` by `highway` value. Must contain an "other" entry.
pub const DEFAULT_ONEWAY: &[(&str, bool)] = &[
    ("motorway", true),
    ("motorway_link", true),
    ("other", false),
];

/// Number of tracks assumed for railways without a `tracks` tag.
const DEFAULT_TRACKS: u32 = 1;

/// Text used for missing railway attributes.
const UNKNOWN: &str = "unknown";

const ONEWAY_TRUE: &[&str] = &["yes", "true", "1", "-1"];
const ONEWAY_FALSE: &[&str] = &["no", "false", "0"];

/// Canonical attributes of a [Way](crate::Way), computed from its raw tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WayAttributes {
    /// Speed limit, in km/h.
    pub maxspeed: u32,

    /// Number of lanes (or tracks, for railways).
    pub lanes: u32,

    /// Whether the way can only be traversed in one direction.
    pub oneway: bool,

    /// Whether the allowed direction is opposite to the order of the way's nodes.
    /// Only meaningful if [WayAttributes::oneway] is set.
    pub reverseway: bool,

    pub kind: WayKind,
}

/// Mode-specific part of [WayAttributes].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WayKind {
    Highway {
        /// Value of the `highway` tag.
        highway: String,
    },
    Railway(RailAttributes),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RailAttributes {
    /// Value of the `railway` tag, e.g. "rail", "subway" or "tram".
    pub rail_type: String,
    pub electrified: String,
    pub gauge: Option<String>,
    pub usage: String,
    pub name: String,
}

/// A numeric tag which holds something that is neither a number nor text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{key} is neither a number nor text: {value}")]
pub struct InvalidTagValue {
    pub key: &'static str,
    pub value: TagValue,
}

/// Computes [WayAttributes] of a way with a `highway` tag.
pub fn highway_attributes(tags: &Tags) -> Result<WayAttributes, InvalidTagValue> {
    Ok(WayAttributes {
        maxspeed: maxspeed(tags)?,
        lanes: lanes(tags)?,
        oneway: is_oneway(tags),
        reverseway: is_reverseway(tags),
        kind: WayKind::Highway {
            highway: get_text_or(tags, "highway", "other"),
        },
    })
}

/// Computes [WayAttributes] of a way with a `railway` tag.
/// The number of lanes is taken from the `tracks` tag.
pub fn railway_attributes(tags: &Tags) -> Result<WayAttributes, InvalidTagValue> {
    Ok(WayAttributes {
        maxspeed: maxspeed(tags)?,
        lanes: parse_numeric(tags, "tracks", false)?.unwrap_or(DEFAULT_TRACKS),
        oneway: is_oneway(tags),
        reverseway: is_reverseway(tags),
        kind: WayKind::Railway(RailAttributes {
            rail_type: get_text_or(tags, "railway", UNKNOWN),
            electrified: get_text_or(tags, "electrified", UNKNOWN),
            gauge: tags.get("gauge").map(|v| v.to_string()),
            usage: get_text_or(tags, "usage", UNKNOWN),
            name: get_text_or(tags, "name", UNKNOWN),
        }),
    })
}

/// Returns the speed limit of a way in km/h.
///
/// Numbers are rounded; text is split into a list of numbers (mph values are converted),
/// which is then averaged. Missing values, and text without any numbers (like "none"
/// or "signals"), fall back to [DEFAULT_MAXSPEEDS].
pub fn maxspeed(tags: &Tags) -> Result<u32, InvalidTagValue> {
    Ok(parse_numeric(tags, "maxspeed", true)?
        .unwrap_or_else(|| highway_default(DEFAULT_MAXSPEEDS, tags)))
}

/// Returns the number of lanes of a way, parsed like [maxspeed] but without any unit
/// conversion, and with [DEFAULT_LANES] as the fallback.
pub fn lanes(tags: &Tags) -> Result<u32, InvalidTagValue> {
    Ok(parse_numeric(tags, "lanes", false)?
        .unwrap_or_else(|| highway_default(DEFAULT_LANES, tags)))
}

/// Checks if a way is one-way.
///
/// Roundabouts are always one-way. Otherwise, the `oneway` tag is consulted,
/// falling back to [DEFAULT_ONEWAY] if it's missing or has an unrecognized value
/// (like "reversible").
pub fn is_oneway(tags: &Tags) -> bool {
    if is_roundabout(tags) {
        return true;
    }

    match tags.get("oneway") {
        Some(v) if ONEWAY_FALSE.iter().any(|&t| v.is(t)) => false,
        Some(v) if ONEWAY_TRUE.iter().any(|&t| v.is(t)) => true,
        _ => highway_default(DEFAULT_ONEWAY, tags),
    }
}

/// Checks if a way is one-way against the order of its nodes, that is `oneway=-1`.
pub fn is_reverseway(tags: &Tags) -> bool {
    tags.get("oneway").is_some_and(|v| v.is("-1"))
}

/// Looks up the value for the way's `highway` in a default table,
/// using the "other" entry for unknown or missing highway types.
fn highway_default<T: Copy>(table: &[(&str, T)], tags: &Tags) -> T {
    let highway = get_str(tags, "highway").unwrap_or("other");
    table
        .iter()
        .find(|&&(k, _)| k == highway)
        .or_else(|| table.iter().find(|&&(k, _)| k == "other"))
        .map(|&(_, v)| v)
        .expect("default table must have an 'other' entry")
}

/// Parses a numeric tag. Returns `Ok(None)` if the tag is missing, set to "default",
/// or if it's text without any numbers.
fn parse_numeric(
    tags: &Tags,
    key: &'static str,
    convert_mph: bool,
) -> Result<Option<u32>, InvalidTagValue> {
    match tags.get(key) {
        None => Ok(None),
        Some(v) if v.is(DEFAULT_SENTINEL) => Ok(None),
        Some(&TagValue::Int(i)) => Ok(Some(i.clamp(0, u32::MAX as i64) as u32)),
        Some(&TagValue::Float(x)) => Ok(Some(round(x))),
        Some(TagValue::Text(s)) => Ok(average_of_text(s, convert_mph)),
        Some(other) => Err(InvalidTagValue {
            key,
            value: other.clone(),
        }),
    }
}

/// Averages all numbers from a delimited text value, like "50;70" or "30 mph".
fn average_of_text(s: &str, convert_mph: bool) -> Option<u32> {
    let s = s.to_lowercase();
    let s = match s.find(CONDITIONAL_MARKER) {
        Some(idx) => &s[..idx],
        None => s.as_str(),
    };

    let values: Vec<f64> = s
        .split(OSM_LIST_DELIMITERS)
        .filter_map(|token| {
            let digits: String = token
                .chars()
                .filter(|&c| c.is_ascii_digit() || c == '.')
                .collect();
            let value: f64 = digits.parse().ok()?;

            if convert_mph && token.contains("mph") {
                Some(value * KMH_PER_MPH)
            } else {
                Some(value)
            }
        })
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(round(values.iter().sum::<f64>() / values.len() as f64))
    }
}

/// Rounds to the nearest integer, with ties going to the even one;
/// negative and NaN values saturate to zero.
#[inline]
fn round(x: f64) -> u32 {
    x.round_ties_even() as u32
}
