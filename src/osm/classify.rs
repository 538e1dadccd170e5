// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Predicates deciding what kind of OSM element a set of tags describes.

use super::Tags;

/// Checks if the tags describe a [highway](https://wiki.openstreetmap.org/wiki/Key:highway).
pub fn is_highway(tags: &Tags) -> bool {
    tags.contains_key("highway")
}

/// Checks if the tags describe a [railway](https://wiki.openstreetmap.org/wiki/Key:railway).
pub fn is_railway(tags: &Tags) -> bool {
    tags.contains_key("railway")
}

/// Checks if the tags describe a [roundabout](https://wiki.openstreetmap.org/wiki/Tag:junction%3Droundabout).
pub fn is_roundabout(tags: &Tags) -> bool {
    tags.get("junction").is_some_and(|v| v.is("roundabout"))
}

/// Checks if the tags describe a [turn restriction](https://wiki.openstreetmap.org/wiki/Relation:restriction)
/// relation, that is `type=restriction` with a `restriction` tag.
pub fn is_restriction(tags: &Tags) -> bool {
    tags.get("type").is_some_and(|v| v.is("restriction")) && tags.contains_key("restriction")
}
