// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;

use super::TagValue;

/// Error which can occur when loading OSM data into a [Graph](crate::Graph).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A numeric tag of a way has a value which is neither a number nor text.
    #[error("way {way_id}: {key} is neither a number nor text ({value}), check data quality")]
    DataQuality {
        way_id: i64,
        key: &'static str,
        value: TagValue,
    },

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("unable to detect the file format")]
    UnknownFormat,
}
