// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Reader for [Overpass JSON](https://wiki.openstreetmap.org/wiki/OSM_JSON) documents.

use std::io;

use super::model::{Elements, Feature, NodeRecord, RelationRecord, WayRecord};
use crate::osm::Error;

#[derive(Debug, serde::Deserialize)]
struct Document {
    elements: Vec<Element>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node(NodeRecord),
    Way(WayRecord),
    Relation(RelationRecord),

    /// Anything else Overpass may return, like "area" or "count".
    #[serde(other)]
    Other,
}

impl Document {
    fn into_elements(self) -> Elements {
        self.elements
            .into_iter()
            .filter_map(|e| match e {
                Element::Node(n) => Some(Feature::Node(n)),
                Element::Way(w) => Some(Feature::Way(w)),
                Element::Relation(r) => Some(Feature::Relation(r)),
                Element::Other => None,
            })
            .collect()
    }
}

pub(super) fn read_from_io<R: io::Read>(reader: R) -> Result<Elements, Error> {
    let doc: Document = serde_json::from_reader(reader)?;
    Ok(doc.into_elements())
}

pub(super) fn read_from_buffer(data: &[u8]) -> Result<Elements, Error> {
    let doc: Document = serde_json::from_slice(data)?;
    Ok(doc.into_elements())
}
