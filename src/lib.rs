// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Typed road and rail networks from [OpenStreetMap](https://www.openstreetmap.org/) data.
//!
//! OSM XML (plain, gzip or bzip2 compressed) and Overpass JSON data is filtered
//! by a [network type](crate::osm::Network), and the retained ways get normalized
//! [attributes](crate::osm::WayAttributes): speed limit in km/h, lane count and direction.
//! Structurally invalid turn restrictions are dropped. The result is a read-only [Graph]
//! with directed, weighted [edges](Edge) between consecutive nodes of every way.
//!
//! # Example
//!
//! ```no_run
//! let options = osmnet::osm::Options {
//!     network: &osmnet::osm::DRIVE_NETWORK,
//!     weight_type: osmnet::WeightType::Time,
//!     file_format: osmnet::osm::FileFormat::Unknown,
//! };
//! let g = osmnet::osm::graph_from_file(&options, "path/to/monaco.osm")
//!     .expect("failed to load monaco.osm");
//!
//! for way in g.ways() {
//!     println!("way {}: {} km/h", way.id, way.attributes.maxspeed);
//! }
//! ```
//!
//! # Speed limit normalization
//!
//! The `maxspeed` tag is normalized to an integer number of km/h:
//! numeric values are taken as-is, text is split on the `; , | + -` delimiters
//! and averaged, with `mph` values converted using [KMH_PER_MPH](crate::osm::KMH_PER_MPH).
//! Missing, `default` or digit-less values fall back to a per-`highway` default.
//! The same rules, without the unit conversion, apply to `lanes`.

mod distance;
mod graph;
pub mod osm;

pub use distance::earth_distance;
pub use graph::{Edge, Graph, Restriction, RestrictionType, Via, Way, WeightType};

/// Position on Earth, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

/// Represents an OSM node referenced by at least one retained [Way] of the [Graph].
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: i64,
    pub location: Location,

    /// Raw tags, exactly as present in the OSM data.
    pub tags: osm::Tags,
}
