// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod classify;
mod error;
mod graph_builder;
mod network;
pub(crate) mod normalize;
mod reader;
mod restriction;
pub(crate) mod tags;

pub use classify::{is_highway, is_railway, is_restriction, is_roundabout};
pub use error::Error;
pub use graph_builder::build_graph;
pub use network::{
    Exclusion, Network, ALL_NETWORK, ALL_NETWORKS, ALL_PRIVATE_NETWORK, BIKE_NETWORK,
    DRIVE_MAINROADS_NETWORK, DRIVE_NETWORK, DRIVE_SERVICE_NETWORK, NONE_NETWORK, RAIL_NETWORK,
    WALK_NETWORK,
};
pub use normalize::{
    highway_attributes, is_oneway, is_reverseway, lanes, maxspeed, railway_attributes,
    InvalidTagValue, RailAttributes, WayAttributes, WayKind, DEFAULT_LANES, DEFAULT_MAXSPEEDS,
    DEFAULT_ONEWAY, KMH_PER_MPH,
};
pub use reader::{
    graph_from_buffer, graph_from_file, graph_from_io, read_elements_from_buffer,
    read_elements_from_file, read_elements_from_io, Elements, Feature, FeatureType, FileFormat,
    NodeRecord, Options, RelationMember, RelationRecord, WayRecord,
};
pub use restriction::{
    is_valid_restriction, join_on_trailing_elements, trailing_elements, validate_restriction,
    InvalidRestriction, JoinError,
};
pub use tags::{TagValue, Tags};
