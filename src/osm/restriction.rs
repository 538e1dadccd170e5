// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Structural validation of [turn restriction](https://wiki.openstreetmap.org/wiki/Relation:restriction)
//! relations.
//!
//! A restriction is valid if its `from`, `via` and `to` members form a connected sequence,
//! where connections only happen at way endpoints. This is checked by looking at the
//! [trailing elements](trailing_elements) of member ways only, without building any
//! adjacency structure.

use std::collections::{HashMap, HashSet};

use super::reader::{FeatureType, RelationMember};
use crate::Way;

/// Error returned when via-way node sequences can't be joined into a single chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    #[error("no sequences to join")]
    Empty,

    #[error("sequence {0} is empty")]
    EmptySequence(usize),

    #[error("{0} sequence(s) share no endpoint with the joined chain")]
    Disconnected(usize),
}

/// Reason for rejecting a turn restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidRestriction {
    MultipleFromMembers,
    MultipleToMembers,
    MissingFromMember,
    MissingToMember,
    MissingViaMember,
    MultipleViaNodes,
    MixedViaMembers,
    ReferenceToUnknownWay(i64),
    DuplicateWay(i64),
    InvalidMemberType(String, FeatureType),
    ViaNodeNotShared(i64),
    Disjoint,
    Unjoinable(JoinError),
}

impl std::fmt::Display for InvalidRestriction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MultipleFromMembers => write!(f, "multiple 'from' members"),
            Self::MultipleToMembers => write!(f, "multiple 'to' members"),
            Self::MissingFromMember => write!(f, "missing 'from' member"),
            Self::MissingToMember => write!(f, "missing 'to' member"),
            Self::MissingViaMember => write!(f, "missing 'via' member"),
            Self::MultipleViaNodes => write!(f, "multiple 'via' nodes"),
            Self::MixedViaMembers => write!(f, "both 'via' nodes and 'via' ways"),
            Self::ReferenceToUnknownWay(way_id) => {
                write!(f, "reference to unknown way {way_id}")
            }
            Self::DuplicateWay(way_id) => write!(f, "way {way_id} referenced multiple times"),
            Self::InvalidMemberType(role, type_) => {
                write!(f, "member with role {role} can't be of type {type_}")
            }
            Self::ViaNodeNotShared(node_id) => {
                write!(f, "via node {node_id} is not an endpoint of both 'from' and 'to'")
            }
            Self::Disjoint => write!(f, "disjoint turn restriction"),
            Self::Unjoinable(e) => write!(f, "via ways can't be joined: {e}"),
        }
    }
}

impl std::error::Error for InvalidRestriction {}

impl From<JoinError> for InvalidRestriction {
    fn from(e: JoinError) -> Self {
        Self::Unjoinable(e)
    }
}

/// Number of restriction members with specific roles and types.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct MemberCounts {
    from: usize,
    to: usize,
    via_node: usize,
    via_way: usize,
}

impl MemberCounts {
    fn add(&mut self, m: &RelationMember) {
        match (m.role.as_str(), m.type_) {
            ("from", _) => self.from += 1,
            ("to", _) => self.to += 1,
            ("via", FeatureType::Node) => self.via_node += 1,
            ("via", FeatureType::Way) => self.via_way += 1,
            _ => {}
        }
    }

    /// Ensures exactly one `from`, exactly one `to`, and either
    /// exactly one `via` node or at least one `via` way.
    fn check(&self) -> Result<(), InvalidRestriction> {
        match self.from {
            0 => return Err(InvalidRestriction::MissingFromMember),
            1 => {}
            _ => return Err(InvalidRestriction::MultipleFromMembers),
        }

        match self.to {
            0 => return Err(InvalidRestriction::MissingToMember),
            1 => {}
            _ => return Err(InvalidRestriction::MultipleToMembers),
        }

        match (self.via_node, self.via_way) {
            (0, 0) => Err(InvalidRestriction::MissingViaMember),
            (1, 0) | (0, _) => Ok(()),
            (_, 0) => Err(InvalidRestriction::MultipleViaNodes),
            (_, _) => Err(InvalidRestriction::MixedViaMembers),
        }
    }
}

/// Checks if a turn restriction with the provided members is structurally sound,
/// see [validate_restriction].
pub fn is_valid_restriction(members: &[RelationMember], ways: &HashMap<i64, Way>) -> bool {
    validate_restriction(members, ways).is_ok()
}

/// Checks if a turn restriction with the provided members is structurally sound:
///
/// - all way members are present in `ways` and are not repeated,
/// - there's exactly one `from` and one `to` way,
/// - there's exactly one `via` node, or at least one `via` way,
/// - the via node is an endpoint of both `from` and `to`, or
///   the `via` ways join into a chain whose ends touch both `from` and `to`.
pub fn validate_restriction(
    members: &[RelationMember],
    ways: &HashMap<i64, Way>,
) -> Result<(), InvalidRestriction> {
    let mut counts = MemberCounts::default();
    let mut seen_ways: HashSet<i64> = HashSet::default();
    let mut from: Option<i64> = None;
    let mut to: Option<i64> = None;
    let mut via_node: Option<i64> = None;
    let mut via_ways: Vec<i64> = vec![];

    for m in members {
        if m.type_ == FeatureType::Way {
            if !ways.contains_key(&m.ref_) {
                return Err(InvalidRestriction::ReferenceToUnknownWay(m.ref_));
            }
            if !seen_ways.insert(m.ref_) {
                return Err(InvalidRestriction::DuplicateWay(m.ref_));
            }
        }

        counts.add(m);

        match (m.role.as_str(), m.type_) {
            ("from", FeatureType::Way) => from = Some(m.ref_),
            ("to", FeatureType::Way) => to = Some(m.ref_),
            ("via", FeatureType::Node) => via_node = Some(m.ref_),
            ("via", FeatureType::Way) => via_ways.push(m.ref_),
            ("from", _) | ("to", _) | ("via", _) => {
                return Err(InvalidRestriction::InvalidMemberType(
                    m.role.clone(),
                    m.type_,
                ))
            }
            _ => {}
        }
    }

    counts.check()?;

    let from = get_way_nodes(ways, from.ok_or(InvalidRestriction::MissingFromMember)?)?;
    let to = get_way_nodes(ways, to.ok_or(InvalidRestriction::MissingToMember)?)?;
    let from_trailing = trailing_elements(from);
    let to_trailing = trailing_elements(to);

    if let Some(via) = via_node {
        if from_trailing.contains(&via) && to_trailing.contains(&via) {
            Ok(())
        } else {
            Err(InvalidRestriction::ViaNodeNotShared(via))
        }
    } else {
        let sequences = via_ways
            .iter()
            .map(|&id| get_way_nodes(ways, id))
            .collect::<Result<Vec<_>, _>>()?;
        let chain = join_on_trailing_elements(&sequences)?;
        let chain_trailing = trailing_elements(&chain);

        if intersects(&chain_trailing, &from_trailing) && intersects(&chain_trailing, &to_trailing)
        {
            Ok(())
        } else {
            Err(InvalidRestriction::Disjoint)
        }
    }
}

fn get_way_nodes(ways: &HashMap<i64, Way>, id: i64) -> Result<&[i64], InvalidRestriction> {
    ways.get(&id)
        .map(|w| w.nodes.as_slice())
        .ok_or(InvalidRestriction::ReferenceToUnknownWay(id))
}

fn intersects<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    a.iter().any(|x| b.contains(x))
}

/// Returns the first and the last element of a sequence (its endpoints).
pub fn trailing_elements<T: Copy>(seq: &[T]) -> Vec<T> {
    match seq {
        [] => vec![],
        [only] => vec![*only],
        [first, .., last] => vec![*first, *last],
    }
}

/// Joins sequences into a single chain, by repeatedly appending (or prepending)
/// a remaining sequence which shares an endpoint with the current chain.
/// Sequences are reversed as needed, and the shared endpoints are not duplicated.
///
/// ```
/// use osmnet::osm::join_on_trailing_elements;
/// let joined = join_on_trailing_elements(&[&[1, 2, 3][..], &[5, 4, 3][..], &[0, 1][..]]);
/// assert_eq!(joined, Ok(vec![0, 1, 2, 3, 4, 5]));
/// ```
pub fn join_on_trailing_elements<T: Copy + PartialEq>(
    sequences: &[&[T]],
) -> Result<Vec<T>, JoinError> {
    let (first, rest) = sequences.split_first().ok_or(JoinError::Empty)?;
    if let Some(idx) = sequences.iter().position(|s| s.is_empty()) {
        return Err(JoinError::EmptySequence(idx));
    }

    let mut chain = first.to_vec();
    let mut remaining: Vec<&[T]> = rest.to_vec();

    while !remaining.is_empty() {
        let (idx, joined) = remaining
            .iter()
            .enumerate()
            .find_map(|(idx, seq)| join_pair(&chain, seq).map(|joined| (idx, joined)))
            .ok_or(JoinError::Disconnected(remaining.len()))?;

        chain = joined;
        remaining.remove(idx);
    }

    Ok(chain)
}

/// Joins two non-empty sequences if they share an endpoint.
fn join_pair<T: Copy + PartialEq>(chain: &[T], seq: &[T]) -> Option<Vec<T>> {
    let (chain_first, chain_last) = (chain.first()?, chain.last()?);
    let (seq_first, seq_last) = (seq.first()?, seq.last()?);

    let mut joined = Vec::with_capacity(chain.len() + seq.len() - 1);

    if chain_last == seq_first {
        // A-B + B-C
        joined.extend_from_slice(chain);
        joined.extend_from_slice(&seq[1..]);
    } else if chain_last == seq_last {
        // A-B + C-B
        joined.extend_from_slice(chain);
        joined.extend(seq.iter().rev().skip(1));
    } else if chain_first == seq_last {
        // B-C + A-B
        joined.extend_from_slice(seq);
        joined.extend_from_slice(&chain[1..]);
    } else if chain_first == seq_first {
        // B-C + B-A
        joined.extend(seq.iter().rev());
        joined.extend_from_slice(&chain[1..]);
    } else {
        return None;
    }

    Some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osm::tags::tags;

    fn way(id: i64, nodes: &[i64]) -> (i64, Way) {
        let tags = tags! {"highway": "residential"};
        let attributes = crate::osm::normalize::highway_attributes(&tags).unwrap();
        (
            id,
            Way {
                id,
                nodes: nodes.to_vec(),
                tags,
                attributes,
            },
        )
    }

    fn member(type_: FeatureType, ref_: i64, role: &str) -> RelationMember {
        RelationMember {
            type_,
            ref_,
            role: role.to_string(),
        }
    }

    //  1───2───3───4───5
    //      │       │
    //      6       7
    fn ways() -> HashMap<i64, Way> {
        HashMap::from_iter([
            way(10, &[1, 2]),
            way(11, &[2, 3]),
            way(12, &[4, 3]),
            way(13, &[4, 5]),
            way(14, &[6, 2]),
            way(15, &[4, 7]),
            way(16, &[6, 7]),
            way(17, &[]),
        ])
    }

    #[test]
    fn via_node() {
        let w = ways();
        let members = [
            member(FeatureType::Way, 10, "from"),
            member(FeatureType::Node, 2, "via"),
            member(FeatureType::Way, 14, "to"),
        ];
        assert_eq!(validate_restriction(&members, &w), Ok(()));
        assert!(is_valid_restriction(&members, &w));
    }

    #[test]
    fn via_node_not_shared() {
        let members = [
            member(FeatureType::Way, 10, "from"),
            member(FeatureType::Node, 3, "via"),
            member(FeatureType::Way, 11, "to"),
        ];
        assert_eq!(
            validate_restriction(&members, &ways()),
            Err(InvalidRestriction::ViaNodeNotShared(3)),
        );
    }

    #[test]
    fn via_ways() {
        let w = ways();
        let members = [
            member(FeatureType::Way, 10, "from"),
            member(FeatureType::Way, 11, "via"),
            member(FeatureType::Way, 12, "via"),
            member(FeatureType::Way, 13, "to"),
        ];
        assert_eq!(validate_restriction(&members, &w), Ok(()));

        // order of via members doesn't matter
        let members = [
            member(FeatureType::Way, 15, "to"),
            member(FeatureType::Way, 12, "via"),
            member(FeatureType::Way, 11, "via"),
            member(FeatureType::Way, 14, "from"),
        ];
        assert_eq!(validate_restriction(&members, &w), Ok(()));
    }

    #[test]
    fn via_ways_disjoint() {
        // 11 (2-3) touches from (1-2), but not to (6-7)
        let members = [
            member(FeatureType::Way, 10, "from"),
            member(FeatureType::Way, 11, "via"),
            member(FeatureType::Way, 16, "to"),
        ];
        assert_eq!(
            validate_restriction(&members, &ways()),
            Err(InvalidRestriction::Disjoint),
        );
    }

    #[test]
    fn via_ways_unjoinable() {
        let members = [
            member(FeatureType::Way, 10, "from"),
            member(FeatureType::Way, 11, "via"),
            member(FeatureType::Way, 13, "via"),
            member(FeatureType::Way, 15, "to"),
        ];
        assert_eq!(
            validate_restriction(&members, &ways()),
            Err(InvalidRestriction::Unjoinable(JoinError::Disconnected(1))),
        );

        let members = [
            member(FeatureType::Way, 10, "from"),
            member(FeatureType::Way, 17, "via"),
            member(FeatureType::Way, 11, "to"),
        ];
        assert_eq!(
            validate_restriction(&members, &ways()),
            Err(InvalidRestriction::Unjoinable(JoinError::EmptySequence(0))),
        );
    }

    #[test]
    fn member_counts() {
        let w = ways();
        let members = [
            member(FeatureType::Way, 10, "from"),
            member(FeatureType::Way, 14, "from"),
            member(FeatureType::Node, 2, "via"),
            member(FeatureType::Way, 11, "to"),
        ];
        assert_eq!(
            validate_restriction(&members, &w),
            Err(InvalidRestriction::MultipleFromMembers),
        );

        let members = [
            member(FeatureType::Way, 10, "from"),
            member(FeatureType::Node, 2, "via"),
        ];
        assert_eq!(
            validate_restriction(&members, &w),
            Err(InvalidRestriction::MissingToMember),
        );

        let members = [
            member(FeatureType::Way, 10, "from"),
            member(FeatureType::Way, 11, "to"),
        ];
        assert_eq!(
            validate_restriction(&members, &w),
            Err(InvalidRestriction::MissingViaMember),
        );

        let members = [
            member(FeatureType::Way, 10, "from"),
            member(FeatureType::Node, 2, "via"),
            member(FeatureType::Node, 3, "via"),
            member(FeatureType::Way, 11, "to"),
        ];
        assert_eq!(
            validate_restriction(&members, &w),
            Err(InvalidRestriction::MultipleViaNodes),
        );

        let members = [
            member(FeatureType::Way, 10, "from"),
            member(FeatureType::Node, 2, "via"),
            member(FeatureType::Way, 11, "via"),
            member(FeatureType::Way, 12, "to"),
        ];
        assert_eq!(
            validate_restriction(&members, &w),
            Err(InvalidRestriction::MixedViaMembers),
        );
    }

    #[test]
    fn invalid_members() {
        let w = ways();
        let members = [
            member(FeatureType::Way, 99, "from"),
            member(FeatureType::Node, 2, "via"),
            member(FeatureType::Way, 11, "to"),
        ];
        assert_eq!(
            validate_restriction(&members, &w),
            Err(InvalidRestriction::ReferenceToUnknownWay(99)),
        );

        let members = [
            member(FeatureType::Way, 10, "from"),
            member(FeatureType::Node, 2, "via"),
            member(FeatureType::Way, 10, "to"),
        ];
        assert_eq!(
            validate_restriction(&members, &w),
            Err(InvalidRestriction::DuplicateWay(10)),
        );

        let members = [
            member(FeatureType::Node, 1, "from"),
            member(FeatureType::Node, 2, "via"),
            member(FeatureType::Way, 11, "to"),
        ];
        assert_eq!(
            validate_restriction(&members, &w),
            Err(InvalidRestriction::InvalidMemberType(
                "from".to_string(),
                FeatureType::Node
            )),
        );

        // unrelated roles are ignored
        let members = [
            member(FeatureType::Way, 10, "from"),
            member(FeatureType::Node, 2, "via"),
            member(FeatureType::Way, 11, "to"),
            member(FeatureType::Node, 1, "location_hint"),
        ];
        assert_eq!(validate_restriction(&members, &w), Ok(()));
    }

    #[test]
    fn trailing() {
        assert_eq!(trailing_elements::<i64>(&[]), Vec::<i64>::new());
        assert_eq!(trailing_elements(&[1]), vec![1]);
        assert_eq!(trailing_elements(&[1, 2]), vec![1, 2]);
        assert_eq!(trailing_elements(&[1, 2, 3, 4]), vec![1, 4]);
    }

    #[test]
    fn join() {
        assert_eq!(
            join_on_trailing_elements(&[&[1, 2][..], &[2, 3][..]]),
            Ok(vec![1, 2, 3]),
        );
        assert_eq!(
            join_on_trailing_elements(&[&[1, 2][..], &[3, 2][..]]),
            Ok(vec![1, 2, 3]),
        );
        assert_eq!(
            join_on_trailing_elements(&[&[2, 3][..], &[1, 2][..]]),
            Ok(vec![1, 2, 3]),
        );
        assert_eq!(
            join_on_trailing_elements(&[&[2, 3][..], &[2, 1][..]]),
            Ok(vec![1, 2, 3]),
        );
        assert_eq!(
            join_on_trailing_elements(&[&[1, 2][..], &[4, 5][..], &[2, 3, 4][..]]),
            Ok(vec![1, 2, 3, 4, 5]),
        );
        assert_eq!(join_on_trailing_elements::<i64>(&[]), Err(JoinError::Empty));
        assert_eq!(
            join_on_trailing_elements(&[&[1, 2][..], &[3, 4][..]]),
            Err(JoinError::Disconnected(1)),
        );
    }
}
