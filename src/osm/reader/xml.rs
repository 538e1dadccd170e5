// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;
use std::str::from_utf8;

use log::debug;

use super::model::{
    Feature, FeatureType, NodeRecord, RelationMember, RelationRecord, WayRecord,
};
use crate::osm::{Error, TagValue, Tags};

/// Parser is a trait for objects which can parse XML.
///
/// This trait only exists to fix the mismatch of
/// [quick_xml::Reader::read_event] when working on buffered data
/// and [quick_xml::Reader::read_event_into] when working on IO.
pub(super) trait Parser {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<quick_xml::events::Event<'a>>;
}

/// IoParser implements [Parser] over an [std::io::BufRead].
pub(super) struct IoParser<R: io::BufRead>(quick_xml::Reader<R>, Vec<u8>);

impl<R: io::BufRead> IoParser<R> {
    #[inline]
    fn new(reader: R) -> Self {
        Self(quick_xml::Reader::from_reader(reader), Vec::default())
    }
}

impl<R: io::BufRead> Parser for IoParser<R> {
    #[inline]
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<quick_xml::events::Event<'a>> {
        self.1.clear();
        self.0.read_event_into(&mut self.1)
    }
}

/// BufParser implements [Parser] over a slice of bytes (`&[u8]`).
pub(super) struct BufParser<'a>(quick_xml::Reader<&'a [u8]>);

impl<'a> BufParser<'a> {
    #[inline]
    fn new(data: &'a [u8]) -> Self {
        Self(quick_xml::Reader::from_reader(data))
    }
}

impl<'a> Parser for BufParser<'a> {
    #[inline]
    fn read_event<'b>(&'b mut self) -> quick_xml::Result<quick_xml::events::Event<'b>> {
        self.0.read_event()
    }
}

/// Reader streams [Features](Feature) from an [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML) file.
///
/// All tag values are read as [TagValue::Text]. Elements with missing or malformed
/// attributes are skipped.
pub(super) struct Reader<P: Parser> {
    parser: P,
    eof: bool,
}

impl<P: Parser> Reader<P> {
    #[inline]
    fn new(parser: P) -> Self {
        Self { parser, eof: false }
    }
}

impl<P: Parser> Iterator for Reader<P> {
    type Item = Result<Feature, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut f: Option<Feature> = None;

        while !self.eof {
            let event = match self.parser.read_event() {
                Ok(e) => e,
                Err(e) => {
                    self.eof = true;
                    return Some(Err(e.into()));
                }
            };

            match event {
                quick_xml::events::Event::Empty(start) => match start.local_name().as_ref() {
                    b"node" => {
                        if let Some(n) = parse_node(&start) {
                            return Some(Ok(Feature::Node(n)));
                        }
                    }
                    b"way" => {
                        if let Some(w) = parse_way(&start) {
                            return Some(Ok(Feature::Way(w)));
                        }
                    }
                    b"relation" => {
                        if let Some(r) = parse_relation(&start) {
                            return Some(Ok(Feature::Relation(r)));
                        }
                    }
                    b"tag" => {
                        if let (Some(tags), Some((k, v))) = (feature_tags(&mut f), parse_tag(&start)) {
                            tags.insert(k, TagValue::Text(v));
                        }
                    }
                    b"nd" => {
                        if let (Some(nodes), Some(ref_)) = (feature_nodes(&mut f), parse_nd(&start)) {
                            nodes.push(ref_);
                        }
                    }
                    b"member" => {
                        if let (Some(members), Some(member)) =
                            (feature_members(&mut f), parse_member(&start))
                        {
                            members.push(member);
                        }
                    }
                    _ => {}
                },

                quick_xml::events::Event::Start(start) => match start.local_name().as_ref() {
                    b"node" => f = parse_node(&start).map(Feature::Node),
                    b"way" => f = parse_way(&start).map(Feature::Way),
                    b"relation" => f = parse_relation(&start).map(Feature::Relation),
                    _ => {}
                },

                quick_xml::events::Event::End(end) => match end.local_name().as_ref() {
                    b"node" | b"way" | b"relation" => {
                        if let Some(f) = f.take() {
                            return Some(Ok(f));
                        }
                    }
                    _ => {}
                },

                quick_xml::events::Event::Eof => {
                    self.eof = true;
                }

                _ => {}
            }
        }

        f.map(Ok)
    }
}

impl<'a> Reader<BufParser<'a>> {
    #[inline]
    pub(super) fn from_buffer(data: &'a [u8]) -> Self {
        Self::new(BufParser::new(data))
    }
}

impl<R: io::BufRead> Reader<IoParser<R>> {
    #[inline]
    pub(super) fn from_io(reader: R) -> Self {
        Self::new(IoParser::new(reader))
    }
}

/// Parses an attribute value into any [FromStr](std::str::FromStr) type.
fn parse_attr<T: std::str::FromStr>(value: &[u8]) -> Option<T> {
    from_utf8(value).ok()?.parse().ok()
}

fn parse_id(start: &quick_xml::events::BytesStart<'_>) -> Option<i64> {
    start
        .attributes()
        .filter_map(Result::ok)
        .find(|attr| attr.key.as_ref() == b"id")
        .and_then(|attr| parse_attr(&attr.value))
}

fn parse_node(start: &quick_xml::events::BytesStart<'_>) -> Option<NodeRecord> {
    let mut id: Option<i64> = None;
    let mut lat = f64::NAN;
    let mut lon = f64::NAN;

    for attr in start.attributes().filter_map(Result::ok) {
        match attr.key.as_ref() {
            b"id" => id = parse_attr(&attr.value),
            b"lat" => lat = parse_attr(&attr.value).unwrap_or(f64::NAN),
            b"lon" => lon = parse_attr(&attr.value).unwrap_or(f64::NAN),
            _ => {}
        }
    }

    match id {
        Some(id) if lat.is_finite() && lon.is_finite() => Some(NodeRecord {
            id,
            lat,
            lon,
            tags: None,
        }),
        _ => {
            debug!("skipping node without a valid id or position: {id:?}");
            None
        }
    }
}

fn parse_way(start: &quick_xml::events::BytesStart<'_>) -> Option<WayRecord> {
    match parse_id(start) {
        Some(id) => Some(WayRecord {
            id,
            nodes: None,
            tags: None,
        }),
        None => {
            debug!("skipping way without a valid id");
            None
        }
    }
}

fn parse_relation(start: &quick_xml::events::BytesStart<'_>) -> Option<RelationRecord> {
    match parse_id(start) {
        Some(id) => Some(RelationRecord {
            id,
            members: None,
            tags: None,
        }),
        None => {
            debug!("skipping relation without a valid id");
            None
        }
    }
}

fn parse_tag(start: &quick_xml::events::BytesStart<'_>) -> Option<(String, String)> {
    let mut k = None;
    let mut v = None;

    for attr in start.attributes().filter_map(Result::ok) {
        match attr.key.as_ref() {
            b"k" => k = attr.unescape_value().ok().map(|s| s.into_owned()),
            b"v" => v = attr.unescape_value().ok().map(|s| s.into_owned()),
            _ => {}
        }
    }

    k.map(|k| (k, v.unwrap_or_default()))
}

fn parse_nd(start: &quick_xml::events::BytesStart<'_>) -> Option<i64> {
    start
        .attributes()
        .filter_map(Result::ok)
        .find(|attr| attr.key.as_ref() == b"ref")
        .and_then(|attr| parse_attr(&attr.value))
}

fn parse_member(start: &quick_xml::events::BytesStart<'_>) -> Option<RelationMember> {
    let mut ref_: Option<i64> = None;
    let mut type_ = None;
    let mut role = None;

    for attr in start.attributes().filter_map(Result::ok) {
        match attr.key.as_ref() {
            b"ref" => ref_ = parse_attr(&attr.value),
            b"type" => type_ = parse_feature_type(&attr.value),
            b"role" => role = attr.unescape_value().ok().map(|s| s.into_owned()),
            _ => {}
        }
    }

    match (ref_, type_) {
        (Some(ref_), Some(type_)) => Some(RelationMember {
            type_,
            ref_,
            role: role.unwrap_or_default(),
        }),
        _ => {
            debug!("skipping relation member without a valid ref or type: {ref_:?}");
            None
        }
    }
}

fn parse_feature_type(s: &[u8]) -> Option<FeatureType> {
    match s {
        b"node" => Some(FeatureType::Node),
        b"way" => Some(FeatureType::Way),
        b"relation" => Some(FeatureType::Relation),
        _ => None,
    }
}

fn feature_tags(f: &mut Option<Feature>) -> Option<&mut Tags> {
    match f {
        None => None,
        Some(Feature::Node(n)) => Some(n.tags.get_or_insert_with(Tags::default)),
        Some(Feature::Way(w)) => Some(w.tags.get_or_insert_with(Tags::default)),
        Some(Feature::Relation(r)) => Some(r.tags.get_or_insert_with(Tags::default)),
    }
}

fn feature_nodes(f: &mut Option<Feature>) -> Option<&mut Vec<i64>> {
    match f {
        Some(Feature::Way(w)) => Some(w.nodes.get_or_insert_with(Vec::default)),
        _ => None,
    }
}

fn feature_members(f: &mut Option<Feature>) -> Option<&mut Vec<RelationMember>> {
    match f {
        Some(Feature::Relation(r)) => Some(r.members.get_or_insert_with(Vec::default)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="1" lat="52.0" lon="21.0"/>
  <node id="2" lat="52.001" lon="21.0">
    <tag k="highway" v="traffic_signals"/>
  </node>
  <node id="3" lon="21.0"/>
  <way id="10">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="highway" v="primary"/>
    <tag k="name" v="Aleje &quot;Jerozolimskie&quot;"/>
  </way>
  <way id="11"/>
  <relation id="20">
    <member type="way" ref="10" role="from"/>
    <member type="node" ref="2" role="via"/>
    <member type="area" ref="5" role="to"/>
    <tag k="type" v="restriction"/>
  </relation>
</osm>
"#;

    fn expected() -> Vec<Feature> {
        vec![
            Feature::Node(NodeRecord {
                id: 1,
                lat: 52.0,
                lon: 21.0,
                tags: None,
            }),
            Feature::Node(NodeRecord {
                id: 2,
                lat: 52.001,
                lon: 21.0,
                tags: Some(Tags::from_iter([(
                    "highway".to_string(),
                    TagValue::from("traffic_signals"),
                )])),
            }),
            Feature::Way(WayRecord {
                id: 10,
                nodes: Some(vec![1, 2]),
                tags: Some(Tags::from_iter([
                    ("highway".to_string(), TagValue::from("primary")),
                    (
                        "name".to_string(),
                        TagValue::from("Aleje \"Jerozolimskie\""),
                    ),
                ])),
            }),
            Feature::Way(WayRecord {
                id: 11,
                nodes: None,
                tags: None,
            }),
            Feature::Relation(RelationRecord {
                id: 20,
                members: Some(vec![
                    RelationMember {
                        type_: FeatureType::Way,
                        ref_: 10,
                        role: "from".to_string(),
                    },
                    RelationMember {
                        type_: FeatureType::Node,
                        ref_: 2,
                        role: "via".to_string(),
                    },
                ]),
                tags: Some(Tags::from_iter([(
                    "type".to_string(),
                    TagValue::from("restriction"),
                )])),
            }),
        ]
    }

    #[test]
    fn parse_from_buf() -> Result<(), Error> {
        let features = Reader::from_buffer(DATA).collect::<Result<Vec<_>, _>>()?;
        assert_eq!(features, expected());
        Ok(())
    }

    #[test]
    fn parse_from_io() -> Result<(), Error> {
        let features =
            Reader::from_io(io::Cursor::new(DATA)).collect::<Result<Vec<_>, _>>()?;
        assert_eq!(features, expected());
        Ok(())
    }

    #[test]
    fn parse_error() {
        let data = b"<osm><node id=\"1\" lat=\"1\" lon=\"1\"></way></osm>";
        let result = Reader::from_buffer(data).collect::<Result<Vec<_>, _>>();
        assert!(matches!(result, Err(Error::Xml(_))));
    }
}
