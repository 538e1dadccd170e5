// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use super::classify::{is_highway, is_railway, is_restriction};
use super::normalize::{highway_attributes, railway_attributes};
use super::reader::{Elements, FeatureType, NodeRecord, RelationMember, RelationRecord, WayRecord};
use super::restriction::validate_restriction;
use super::{Error, Options, Tags};
use crate::{Graph, Location, Node, Restriction, Via, Way};

/// Converts [Elements] into a [Graph] as per the provided [Options].
///
/// Ways are processed first, as they decide which nodes are retained
/// and are required to validate turn restrictions. A way with an uninterpretable
/// `maxspeed` or `lanes` value aborts the whole process with [Error::DataQuality];
/// invalid turn restrictions are skipped.
pub fn build_graph(elements: &Elements, options: &Options<'_>) -> Result<Graph, Error> {
    debug!(
        "building {} network from {} nodes, {} ways and {} relations",
        options.network.name,
        elements.count(FeatureType::Node),
        elements.count(FeatureType::Way),
        elements.count(FeatureType::Relation),
    );

    let mut b = GraphBuilder::new(options);
    for w in &elements.ways {
        b.add_way(w)?;
    }
    for n in &elements.nodes {
        b.add_node(n);
    }
    for r in &elements.relations {
        b.add_relation(r);
    }

    Ok(b.finish())
}

/// Helper object used for storing state related to converting [Elements] into a [Graph].
struct GraphBuilder<'a> {
    options: &'a Options<'a>,
    nodes: HashMap<i64, Node>,
    ways: HashMap<i64, Way>,
    restrictions: HashMap<i64, Restriction>,
    used_nodes: HashSet<i64>,
}

impl<'a> GraphBuilder<'a> {
    fn new(options: &'a Options<'a>) -> Self {
        Self {
            options,
            nodes: HashMap::default(),
            ways: HashMap::default(),
            restrictions: HashMap::default(),
            used_nodes: HashSet::default(),
        }
    }

    fn finish(self) -> Graph {
        info!(
            "built {} network: {} nodes, {} ways, {} restrictions",
            self.options.network.name,
            self.nodes.len(),
            self.ways.len(),
            self.restrictions.len(),
        );
        Graph::new(
            self.nodes,
            self.ways,
            self.restrictions,
            self.options.weight_type,
        )
    }

    fn add_way(&mut self, w: &WayRecord) -> Result<(), Error> {
        let (Some(tags), Some(nodes)) = (&w.tags, &w.nodes) else {
            return Ok(());
        };

        let network = self.options.network;
        let attributes = if is_highway(tags) && network.matches(tags) {
            highway_attributes(tags)
        } else if is_railway(tags) && network.matches(tags) {
            railway_attributes(tags)
        } else {
            return Ok(());
        }
        .map_err(|e| Error::DataQuality {
            way_id: w.id,
            key: e.key,
            value: e.value,
        })?;

        self.used_nodes.extend(nodes.iter().copied());
        self.ways.insert(
            w.id,
            Way {
                id: w.id,
                nodes: nodes.clone(),
                tags: tags.clone(),
                attributes,
            },
        );
        Ok(())
    }

    fn add_node(&mut self, n: &NodeRecord) {
        if self.used_nodes.contains(&n.id) {
            self.nodes.insert(
                n.id,
                Node {
                    id: n.id,
                    location: Location {
                        lat: n.lat,
                        lon: n.lon,
                    },
                    tags: n.tags.clone().unwrap_or_default(),
                },
            );
        }
    }

    fn add_relation(&mut self, r: &RelationRecord) {
        let (Some(tags), Some(members)) = (&r.tags, &r.members) else {
            return;
        };

        if !is_restriction(tags) {
            return;
        }

        if let Err(e) = validate_restriction(members, &self.ways) {
            debug!("skipping turn restriction {}: {}", r.id, e);
            return;
        }

        match restriction_from_members(r.id, tags, members) {
            Some(restriction) => {
                self.restrictions.insert(r.id, restriction);
            }
            None => debug!("skipping turn restriction {}: incomplete members", r.id),
        }
    }
}

/// Creates a [Restriction] from the members of a validated restriction relation.
fn restriction_from_members(
    id: i64,
    tags: &Tags,
    members: &[RelationMember],
) -> Option<Restriction> {
    let mut from = None;
    let mut to = None;
    let mut via_node = None;
    let mut via_ways = vec![];

    for m in members {
        match (m.role.as_str(), m.type_) {
            ("from", FeatureType::Way) => from = Some(m.ref_),
            ("to", FeatureType::Way) => to = Some(m.ref_),
            ("via", FeatureType::Node) => via_node = Some(m.ref_),
            ("via", FeatureType::Way) => via_ways.push(m.ref_),
            _ => {}
        }
    }

    let via = if via_ways.is_empty() {
        Via::Node(via_node?)
    } else {
        Via::Ways(via_ways)
    };

    let kind = tags
        .get("restriction")
        .map(|v| v.to_string())
        .unwrap_or_default();

    Some(Restriction {
        id,
        tags: tags.clone(),
        is_exclusion: kind.contains("no"),
        is_exclusive: kind.contains("only"),
        from_way: from?,
        to_way: to?,
        via,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osm::tags::tags;
    use crate::osm::{
        Exclusion, FileFormat, Network, TagValue, WayKind, DRIVE_NETWORK, RAIL_NETWORK,
    };
    use crate::{RestrictionType, WeightType};

    const DRIVE: Options = Options {
        network: &DRIVE_NETWORK,
        weight_type: WeightType::Distance,
        file_format: FileFormat::Unknown,
    };

    fn node(id: i64) -> NodeRecord {
        NodeRecord {
            id,
            lat: 52.0 + id as f64 * 0.001,
            lon: 21.0,
            tags: None,
        }
    }

    fn way(id: i64, nodes: &[i64], tags: Tags) -> WayRecord {
        WayRecord {
            id,
            nodes: Some(nodes.to_vec()),
            tags: Some(tags),
        }
    }

    fn member(type_: FeatureType, ref_: i64, role: &str) -> RelationMember {
        RelationMember {
            type_,
            ref_,
            role: role.to_string(),
        }
    }

    #[test]
    fn motorway_in_mph() -> Result<(), Error> {
        let elements = Elements {
            nodes: vec![node(1), node(2), node(3)],
            ways: vec![way(
                10,
                &[1, 2, 3],
                tags! {"highway": "motorway", "oneway": "yes", "maxspeed": "60 mph"},
            )],
            relations: vec![],
        };

        let g = build_graph(&elements, &DRIVE)?;
        assert_eq!(g.way_count(), 1);
        assert_eq!(g.len(), 3);

        let w = g.get_way(10).unwrap();
        assert!(w.attributes.oneway);
        assert!(!w.attributes.reverseway);
        assert_eq!(w.attributes.maxspeed, 97);
        assert_eq!(w.tags.get("maxspeed"), Some(&TagValue::from("60 mph")));

        for id in [1, 2, 3] {
            assert!(g.get_node(id).is_some());
        }
        Ok(())
    }

    #[test]
    fn unreferenced_nodes_are_dropped() -> Result<(), Error> {
        let elements = Elements {
            nodes: vec![node(1), node(2), node(3), node(4), node(5)],
            ways: vec![
                way(10, &[1, 2], tags! {"highway": "residential"}),
                way(11, &[2, 3, 4], tags! {"highway": "footway"}),
                way(12, &[4, 5], tags! {"building": "yes"}),
            ],
            relations: vec![],
        };

        let g = build_graph(&elements, &DRIVE)?;
        assert_eq!(g.way_count(), 1);
        let mut ids: Vec<i64> = g.nodes().map(|n| n.id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
        Ok(())
    }

    #[test]
    fn incomplete_records_are_skipped() -> Result<(), Error> {
        let elements = Elements {
            nodes: vec![node(1), node(2)],
            ways: vec![
                WayRecord {
                    id: 10,
                    nodes: None,
                    tags: Some(tags! {"highway": "residential"}),
                },
                WayRecord {
                    id: 11,
                    nodes: Some(vec![1, 2]),
                    tags: None,
                },
            ],
            relations: vec![RelationRecord {
                id: 20,
                members: None,
                tags: Some(tags! {"type": "restriction", "restriction": "no_u_turn"}),
            }],
        };

        let g = build_graph(&elements, &DRIVE)?;
        assert!(g.is_empty());
        assert_eq!(g.way_count(), 0);
        assert_eq!(g.restriction_count(), 0);
        Ok(())
    }

    #[test]
    fn data_quality_error() {
        let elements = Elements {
            nodes: vec![node(1), node(2)],
            ways: vec![way(
                10,
                &[1, 2],
                tags! {"highway": "primary", "lanes": TagValue::Other("[2,3]".to_string())},
            )],
            relations: vec![],
        };

        match build_graph(&elements, &DRIVE) {
            Err(Error::DataQuality { way_id, key, value }) => {
                assert_eq!(way_id, 10);
                assert_eq!(key, "lanes");
                assert_eq!(value, TagValue::Other("[2,3]".to_string()));
            }
            other => panic!("expected a data quality error, got {other:?}"),
        }
    }

    #[test]
    fn railways() -> Result<(), Error> {
        let elements = Elements {
            nodes: vec![node(1), node(2), node(3)],
            ways: vec![
                way(10, &[1, 2], tags! {"railway": "rail", "usage": "main"}),
                way(11, &[2, 3], tags! {"highway": "primary"}),
                way(12, &[1, 3], tags! {"railway": "abandoned"}),
            ],
            relations: vec![],
        };

        let options = Options {
            network: &RAIL_NETWORK,
            ..DRIVE
        };
        let g = build_graph(&elements, &options)?;
        assert_eq!(g.way_count(), 1);
        assert_eq!(g.len(), 2);

        let w = g.get_way(10).unwrap();
        assert_eq!(w.attributes.lanes, 1);
        match &w.attributes.kind {
            WayKind::Railway(r) => {
                assert_eq!(r.rail_type, "rail");
                assert_eq!(r.usage, "main");
                assert_eq!(r.electrified, "unknown");
            }
            kind => panic!("expected railway attributes, got {kind:?}"),
        }

        Ok(())
    }

    #[test]
    fn railways_in_road_networks() -> Result<(), Error> {
        let elements = Elements {
            nodes: vec![node(1), node(2), node(3)],
            ways: vec![
                way(10, &[1, 2], tags! {"railway": "rail"}),
                way(11, &[2, 3], tags! {"highway": "primary"}),
                way(12, &[1, 3], tags! {"railway": "tram", "access": "private"}),
            ],
            relations: vec![],
        };

        // drive exclusions don't mention railway=rail, so the way is kept
        let g = build_graph(&elements, &DRIVE)?;
        assert_eq!(g.way_count(), 2);
        assert!(matches!(
            g.get_way(10).unwrap().attributes.kind,
            WayKind::Railway(_),
        ));
        assert!(matches!(
            g.get_way(11).unwrap().attributes.kind,
            WayKind::Highway { .. },
        ));
        assert!(g.get_way(12).is_none());
        assert_eq!(g.len(), 3);

        const NO_RAIL: &[Exclusion] = &[Exclusion {
            key: "railway",
            values: &["rail", "tram"],
        }];
        let network = Network::custom(NO_RAIL);
        let g = build_graph(
            &elements,
            &Options {
                network: &network,
                ..DRIVE
            },
        )?;
        assert_eq!(g.way_count(), 1);
        assert!(g.get_way(11).is_some());
        Ok(())
    }

    #[test]
    fn restrictions() -> Result<(), Error> {
        //  1 ── 2 ── 3 ── 4
        let elements = Elements {
            nodes: vec![node(1), node(2), node(3), node(4)],
            ways: vec![
                way(10, &[1, 2], tags! {"highway": "residential"}),
                way(11, &[2, 3], tags! {"highway": "residential"}),
                way(12, &[3, 4], tags! {"highway": "residential"}),
            ],
            relations: vec![
                RelationRecord {
                    id: 20,
                    members: Some(vec![
                        member(FeatureType::Way, 10, "from"),
                        member(FeatureType::Node, 2, "via"),
                        member(FeatureType::Way, 11, "to"),
                    ]),
                    tags: Some(tags! {"type": "restriction", "restriction": "no_u_turn"}),
                },
                RelationRecord {
                    id: 21,
                    members: Some(vec![
                        member(FeatureType::Way, 10, "from"),
                        member(FeatureType::Way, 11, "via"),
                        member(FeatureType::Way, 12, "to"),
                    ]),
                    tags: Some(
                        tags! {"type": "restriction", "restriction": "only_straight_on"},
                    ),
                },
                RelationRecord {
                    id: 22,
                    members: Some(vec![
                        member(FeatureType::Way, 10, "from"),
                        member(FeatureType::Way, 11, "from"),
                        member(FeatureType::Node, 3, "via"),
                        member(FeatureType::Way, 12, "to"),
                    ]),
                    tags: Some(tags! {"type": "restriction", "restriction": "no_left_turn"}),
                },
                RelationRecord {
                    id: 23,
                    members: Some(vec![
                        member(FeatureType::Way, 10, "from"),
                        member(FeatureType::Node, 2, "via"),
                        member(FeatureType::Way, 11, "to"),
                    ]),
                    tags: Some(tags! {"type": "route", "route": "bus"}),
                },
            ],
        };

        let g = build_graph(&elements, &DRIVE)?;
        assert_eq!(g.restriction_count(), 2);

        let r = g.get_restriction(20).unwrap();
        assert_eq!(r.restriction_type(), RestrictionType::ViaNode);
        assert_eq!(r.via, Via::Node(2));
        assert_eq!((r.from_way, r.to_way), (10, 11));
        assert!(r.is_exclusion);
        assert!(!r.is_exclusive);

        let r = g.get_restriction(21).unwrap();
        assert_eq!(r.restriction_type(), RestrictionType::ViaWay);
        assert_eq!(r.via, Via::Ways(vec![11]));
        assert_eq!((r.from_way, r.to_way), (10, 12));
        assert!(!r.is_exclusion);
        assert!(r.is_exclusive);
        assert_eq!(r.tags.get("restriction"), Some(&TagValue::from("only_straight_on")));

        assert!(g.get_restriction(22).is_none());
        assert!(g.get_restriction(23).is_none());
        Ok(())
    }
}
