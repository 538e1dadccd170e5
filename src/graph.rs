// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;

use crate::osm::{Tags, WayAttributes};
use crate::{earth_distance, Node};

/// Represents an OSM way retained in the [Graph], together with its
/// normalized [attributes](WayAttributes).
#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    pub id: i64,

    /// Ordered sequence of node ids. The order defines the direction of the way.
    ///
    /// Nodes missing from the input data are not removed from this list,
    /// users must silently ignore such references.
    pub nodes: Vec<i64>,

    /// Raw tags, exactly as present in the OSM data.
    pub tags: Tags,

    pub attributes: WayAttributes,
}

impl Way {
    /// Checks if the way is traversable forward (first return value) and
    /// backwards (second return value), relative to the order of its nodes.
    pub fn directions(&self) -> (bool, bool) {
        match (self.attributes.oneway, self.attributes.reverseway) {
            (false, _) => (true, true),
            (true, false) => (true, false),
            (true, true) => (false, true),
        }
    }
}

/// Kind of the element connecting the `from` and `to` ways of a [Restriction].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestrictionType {
    ViaNode,
    ViaWay,
}

impl fmt::Display for RestrictionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ViaNode => write!(f, "via_node"),
            Self::ViaWay => write!(f, "via_way"),
        }
    }
}

/// Element connecting the `from` and `to` ways of a [Restriction].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Via {
    /// A single node shared by both ways.
    Node(i64),

    /// A chain of ways, in the order of relation members.
    Ways(Vec<i64>),
}

/// Represents a structurally valid [turn restriction](https://wiki.openstreetmap.org/wiki/Relation:restriction).
#[derive(Debug, Clone, PartialEq)]
pub struct Restriction {
    pub id: i64,

    /// Raw tags of the restriction relation.
    pub tags: Tags,

    /// True for prohibitory restrictions ("no_left_turn").
    pub is_exclusion: bool,

    /// True for mandatory restrictions ("only_straight_on").
    pub is_exclusive: bool,

    pub from_way: i64,
    pub to_way: i64,
    pub via: Via,
}

impl Restriction {
    pub fn restriction_type(&self) -> RestrictionType {
        match self.via {
            Via::Node(_) => RestrictionType::ViaNode,
            Via::Ways(_) => RestrictionType::ViaWay,
        }
    }
}

/// Determines how the [Edge::weight] is computed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum WeightType {
    /// Great-circle distance between the nodes, in kilometers.
    #[default]
    Distance,

    /// Travel time at the way's `maxspeed`, in hours.
    Time,

    /// Travel time, penalized on ways with fewer lanes.
    LaneEfficiency,
}

impl WeightType {
    /// Computes the weight of a connection between two nodes of a way.
    /// Returns [f64::INFINITY] if the way has a `maxspeed` of 0 and the weight
    /// depends on travel time.
    pub fn weight(self, from: &Node, to: &Node, attributes: &WayAttributes) -> f64 {
        let distance = earth_distance(from.location, to.location);
        let time = || distance / attributes.maxspeed as f64;

        match self {
            Self::Distance => distance,
            Self::Time => time(),
            Self::LaneEfficiency => time() / lane_efficiency(attributes.lanes),
        }
    }
}

/// Relative throughput of a road with the given number of lanes.
fn lane_efficiency(lanes: u32) -> f64 {
    match lanes {
        0 | 1 => 0.7,
        2 => 0.8,
        3 => 0.9,
        _ => 1.0,
    }
}

/// Represents an outgoing (one-way) connection from a specific [Node].
///
/// Due to implementation details, `to` might not exist in the [Graph].
/// Users must silently ignore such edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: i64,

    /// The [Way] this connection was created from.
    pub way_id: i64,

    pub weight: f64,
}

/// Represents an OpenStreetMap network as a set of [Nodes](Node), [Ways](Way)
/// and [Restrictions](Restriction), with directed [Edges](Edge) derived from the ways.
///
/// The graph is built once and is read-only afterwards.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph {
    nodes: HashMap<i64, Node>,
    ways: HashMap<i64, Way>,
    restrictions: HashMap<i64, Restriction>,
    edges: HashMap<i64, Vec<Edge>>,
    weight_type: WeightType,
}

impl Graph {
    /// Assembles a graph from its elements, computing [Edges](Edge) between
    /// consecutive nodes of every way.
    pub fn new(
        nodes: HashMap<i64, Node>,
        ways: HashMap<i64, Way>,
        restrictions: HashMap<i64, Restriction>,
        weight_type: WeightType,
    ) -> Self {
        let edges = build_edges(&nodes, &ways, weight_type);
        Self {
            nodes,
            ways,
            restrictions,
            edges,
            weight_type,
        }
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns an iterator over all [Nodes](Node) in the graph, in arbitrary order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns an iterator over all [Ways](Way) in the graph, in arbitrary order.
    pub fn ways(&self) -> impl Iterator<Item = &Way> {
        self.ways.values()
    }

    /// Returns an iterator over all [Restrictions](Restriction) in the graph, in arbitrary order.
    pub fn restrictions(&self) -> impl Iterator<Item = &Restriction> {
        self.restrictions.values()
    }

    pub fn way_count(&self) -> usize {
        self.ways.len()
    }

    pub fn restriction_count(&self) -> usize {
        self.restrictions.len()
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Retrieves a [Way] with the provided id.
    pub fn get_way(&self, id: i64) -> Option<&Way> {
        self.ways.get(&id)
    }

    /// Retrieves a [Restriction] with the provided id.
    pub fn get_restriction(&self, id: i64) -> Option<&Restriction> {
        self.restrictions.get(&id)
    }

    /// Returns the [WeightType] used to compute edge weights.
    pub fn weight_type(&self) -> WeightType {
        self.weight_type
    }

    /// Gets all outgoing [Edges](Edge) from a node with a given id.
    pub fn get_edges(&self, from_id: i64) -> &[Edge] {
        self.edges
            .get(&from_id)
            .map(|e| e.as_slice())
            .unwrap_or_default()
    }

    /// Gets the weight of an [Edge] from one node to another.
    /// If such an edge doesn't exist, returns [f64::INFINITY].
    pub fn get_edge(&self, from_id: i64, to_id: i64) -> f64 {
        self.get_edges(from_id)
            .iter()
            .find(|e| e.to == to_id)
            .map(|e| e.weight)
            .unwrap_or(f64::INFINITY)
    }
}

fn build_edges(
    nodes: &HashMap<i64, Node>,
    ways: &HashMap<i64, Way>,
    weight_type: WeightType,
) -> HashMap<i64, Vec<Edge>> {
    let mut edges: HashMap<i64, Vec<Edge>> = HashMap::default();

    // Iterate in id order, so that ties between parallel ways are resolved deterministically
    let mut way_ids: Vec<i64> = ways.keys().copied().collect();
    way_ids.sort_unstable();

    for way in way_ids.iter().filter_map(|id| ways.get(id)) {
        let (forward, backward) = way.directions();

        for pair in way.nodes.windows(2) {
            if pair[0] == pair[1] {
                continue;
            }

            let (Some(left), Some(right)) = (nodes.get(&pair[0]), nodes.get(&pair[1])) else {
                continue;
            };

            let weight = weight_type.weight(left, right, &way.attributes);
            if !weight.is_finite() {
                continue;
            }

            if forward {
                set_edge(&mut edges, left.id, right.id, way.id, weight);
            }
            if backward {
                set_edge(&mut edges, right.id, left.id, way.id, weight);
            }
        }
    }

    edges
}

/// Creates an edge, or replaces an existing one between the same nodes
/// if the new weight is lower.
fn set_edge(edges: &mut HashMap<i64, Vec<Edge>>, from: i64, to: i64, way_id: i64, weight: f64) {
    let outgoing = edges.entry(from).or_default();
    match outgoing.iter_mut().find(|e| e.to == to) {
        Some(existing) => {
            if weight < existing.weight {
                *existing = Edge { to, way_id, weight };
            }
        }
        None => outgoing.push(Edge { to, way_id, weight }),
    }
}
