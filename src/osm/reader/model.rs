// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::osm::Tags;

/// Represents a raw [OSM node](https://wiki.openstreetmap.org/wiki/Node).
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct NodeRecord {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: Option<Tags>,
}

/// Represents a raw [OSM way](https://wiki.openstreetmap.org/wiki/Way).
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct WayRecord {
    pub id: i64,
    #[serde(default)]
    pub nodes: Option<Vec<i64>>,
    #[serde(default)]
    pub tags: Option<Tags>,
}

/// Type of an [OSM feature/element](https://wiki.openstreetmap.org/wiki/Elements).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    Node,
    Way,
    Relation,
}

impl std::fmt::Display for FeatureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Node => write!(f, "node"),
            Self::Way => write!(f, "way"),
            Self::Relation => write!(f, "relation"),
        }
    }
}

/// Represents a member of an [OSM relation](https://wiki.openstreetmap.org/wiki/Relation).
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct RelationMember {
    #[serde(rename = "type")]
    pub type_: FeatureType,
    #[serde(rename = "ref")]
    pub ref_: i64,
    pub role: String,
}

/// Represents a raw [OSM relation](https://wiki.openstreetmap.org/wiki/Relation).
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct RelationRecord {
    pub id: i64,
    #[serde(default)]
    pub members: Option<Vec<RelationMember>>,
    #[serde(default)]
    pub tags: Option<Tags>,
}

/// Union over all possible [OSM features/elements](https://wiki.openstreetmap.org/wiki/Elements).
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Node(NodeRecord),
    Way(WayRecord),
    Relation(RelationRecord),
}

/// All OSM elements of a dataset, grouped by their [FeatureType]
/// and kept in the order of appearance.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Elements {
    pub nodes: Vec<NodeRecord>,
    pub ways: Vec<WayRecord>,
    pub relations: Vec<RelationRecord>,
}

impl Elements {
    pub fn push(&mut self, f: Feature) {
        match f {
            Feature::Node(n) => self.nodes.push(n),
            Feature::Way(w) => self.ways.push(w),
            Feature::Relation(r) => self.relations.push(r),
        }
    }

    /// Returns the number of elements of the given type.
    pub fn count(&self, type_: FeatureType) -> usize {
        match type_ {
            FeatureType::Node => self.nodes.len(),
            FeatureType::Way => self.ways.len(),
            FeatureType::Relation => self.relations.len(),
        }
    }
}

impl FromIterator<Feature> for Elements {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        let mut e = Self::default();
        iter.into_iter().for_each(|f| e.push(f));
        e
    }
}
