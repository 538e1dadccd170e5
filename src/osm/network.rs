// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::Tags;

/// Describes which OSM ways belong to a network for a specific mode of travel.
///
/// A highway or railway is part of the network if none of its tags
/// are excluded by [Network::exclusions].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Network<'a> {
    /// Human readable name of the network type, e.g. "drive" or "walk".
    pub name: &'a str,

    /// Tags which remove a way from the network.
    ///
    /// A way is excluded if any of its tags has a key equal to [Exclusion::key]
    /// and a value present in [Exclusion::values]. Numeric tag values
    /// are compared by their text representation.
    pub exclusions: &'a [Exclusion<'a>],
}

/// Set of values of a single tag which exclude a way from a [Network].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exclusion<'a> {
    /// Key of an OSM tag, e.g. "highway" or "access".
    pub key: &'a str,

    /// Values of the [Exclusion::key] tag which exclude a way, e.g. "footway" or "private".
    pub values: &'a [&'a str],
}

impl<'a> Network<'a> {
    /// Creates a network with caller-provided exclusions.
    pub fn custom(exclusions: &'a [Exclusion<'a>]) -> Self {
        Self {
            name: "custom",
            exclusions,
        }
    }

    /// Checks if a way with the given tags is not excluded by any of the [Network::exclusions].
    pub fn matches(&self, tags: &Tags) -> bool {
        !self.exclusions.iter().any(|e| {
            tags.get(e.key)
                .is_some_and(|v| e.values.iter().any(|&excluded| v.is(excluded)))
        })
    }
}

impl Network<'static> {
    /// Looks up one of the built-in networks by its [name](Network::name).
    pub fn named(name: &str) -> Option<&'static Network<'static>> {
        ALL_NETWORKS.iter().copied().find(|n| n.name == name)
    }
}

/// All built-in networks, selectable with [Network::named].
pub const ALL_NETWORKS: &[&Network<'static>] = &[
    &DRIVE_NETWORK,
    &DRIVE_SERVICE_NETWORK,
    &DRIVE_MAINROADS_NETWORK,
    &WALK_NETWORK,
    &BIKE_NETWORK,
    &ALL_NETWORK,
    &ALL_PRIVATE_NETWORK,
    &NONE_NETWORK,
    &RAIL_NETWORK,
];

/// Public roads drivable by cars, without service roads.
pub const DRIVE_NETWORK: Network = Network {
    name: "drive",
    exclusions: &[
        Exclusion {
            key: "area",
            values: &["yes"],
        },
        Exclusion {
            key: "highway",
            values: &[
                "abandoned",
                "bridleway",
                "bus_guideway",
                "construction",
                "corridor",
                "cycleway",
                "elevator",
                "escalator",
                "footway",
                "path",
                "pedestrian",
                "planned",
                "platform",
                "proposed",
                "raceway",
                "service",
                "steps",
                "track",
            ],
        },
        Exclusion {
            key: "motor_vehicle",
            values: &["no"],
        },
        Exclusion {
            key: "motorcar",
            values: &["no"],
        },
        Exclusion {
            key: "service",
            values: &[
                "parking",
                "parking_aisle",
                "driveway",
                "private",
                "emergency_access",
            ],
        },
        Exclusion {
            key: "access",
            values: &["no", "private"],
        },
    ],
};

/// Public roads drivable by cars, including service roads.
pub const DRIVE_SERVICE_NETWORK: Network = Network {
    name: "drive_service",
    exclusions: &[
        Exclusion {
            key: "area",
            values: &["yes"],
        },
        Exclusion {
            key: "highway",
            values: &[
                "abandoned",
                "bridleway",
                "bus_guideway",
                "construction",
                "corridor",
                "cycleway",
                "elevator",
                "escalator",
                "footway",
                "path",
                "pedestrian",
                "planned",
                "platform",
                "proposed",
                "raceway",
                "steps",
                "track",
            ],
        },
        Exclusion {
            key: "motor_vehicle",
            values: &["no"],
        },
        Exclusion {
            key: "motorcar",
            values: &["no"],
        },
        Exclusion {
            key: "service",
            values: &["parking", "parking_aisle", "private", "emergency_access"],
        },
        Exclusion {
            key: "access",
            values: &["no", "private"],
        },
    ],
};

/// Only the main road classes (motorway down to tertiary) drivable by cars.
pub const DRIVE_MAINROADS_NETWORK: Network = Network {
    name: "drive_mainroads",
    exclusions: &[
        Exclusion {
            key: "area",
            values: &["yes"],
        },
        Exclusion {
            key: "highway",
            values: &[
                "abandoned",
                "bridleway",
                "bus_guideway",
                "construction",
                "corridor",
                "cycleway",
                "elevator",
                "escalator",
                "footway",
                "living_street",
                "path",
                "pedestrian",
                "planned",
                "platform",
                "proposed",
                "raceway",
                "residential",
                "road",
                "service",
                "steps",
                "track",
                "unclassified",
            ],
        },
        Exclusion {
            key: "motor_vehicle",
            values: &["no"],
        },
        Exclusion {
            key: "motorcar",
            values: &["no"],
        },
        Exclusion {
            key: "service",
            values: &[
                "parking",
                "parking_aisle",
                "driveway",
                "private",
                "emergency_access",
            ],
        },
        Exclusion {
            key: "access",
            values: &["no", "private"],
        },
    ],
};

/// Ways walkable by pedestrians.
pub const WALK_NETWORK: Network = Network {
    name: "walk",
    exclusions: &[
        Exclusion {
            key: "area",
            values: &["yes"],
        },
        Exclusion {
            key: "highway",
            values: &[
                "abandoned",
                "bus_guideway",
                "construction",
                "cycleway",
                "motor",
                "motorway",
                "motorway_link",
                "planned",
                "platform",
                "proposed",
                "raceway",
            ],
        },
        Exclusion {
            key: "foot",
            values: &["no"],
        },
        Exclusion {
            key: "service",
            values: &["private"],
        },
        Exclusion {
            key: "access",
            values: &["no", "private"],
        },
    ],
};

/// Ways rideable by bicycles.
pub const BIKE_NETWORK: Network = Network {
    name: "bike",
    exclusions: &[
        Exclusion {
            key: "area",
            values: &["yes"],
        },
        Exclusion {
            key: "highway",
            values: &[
                "abandoned",
                "bus_guideway",
                "construction",
                "corridor",
                "elevator",
                "escalator",
                "footway",
                "motor",
                "motorway",
                "motorway_link",
                "planned",
                "platform",
                "proposed",
                "raceway",
                "steps",
            ],
        },
        Exclusion {
            key: "bicycle",
            values: &["no"],
        },
        Exclusion {
            key: "service",
            values: &["private"],
        },
        Exclusion {
            key: "access",
            values: &["no", "private"],
        },
    ],
};

/// All public ways, regardless of the mode of travel.
pub const ALL_NETWORK: Network = Network {
    name: "all",
    exclusions: &[
        Exclusion {
            key: "area",
            values: &["yes"],
        },
        Exclusion {
            key: "highway",
            values: &[
                "abandoned",
                "construction",
                "planned",
                "platform",
                "proposed",
                "raceway",
            ],
        },
        Exclusion {
            key: "service",
            values: &["private"],
        },
        Exclusion {
            key: "access",
            values: &["private"],
        },
    ],
};

/// All ways, including private ones.
pub const ALL_PRIVATE_NETWORK: Network = Network {
    name: "all_private",
    exclusions: &[
        Exclusion {
            key: "area",
            values: &["yes"],
        },
        Exclusion {
            key: "highway",
            values: &[
                "abandoned",
                "construction",
                "planned",
                "platform",
                "proposed",
                "raceway",
            ],
        },
    ],
};

/// Every highway and railway, without any exclusions.
pub const NONE_NETWORK: Network = Network {
    name: "none",
    exclusions: &[],
};

/// Values of the `highway` tag, used to keep roads out of [RAIL_NETWORK].
const HIGHWAY_VALUES: &[&str] = &[
    "motorway",
    "motorway_link",
    "trunk",
    "trunk_link",
    "primary",
    "primary_link",
    "secondary",
    "secondary_link",
    "tertiary",
    "tertiary_link",
    "unclassified",
    "residential",
    "living_street",
    "service",
    "pedestrian",
    "track",
    "road",
    "busway",
    "bus_guideway",
    "escape",
    "raceway",
    "footway",
    "bridleway",
    "steps",
    "corridor",
    "path",
    "cycleway",
    "sidewalk",
    "crossing",
    "platform",
    "elevator",
    "construction",
    "proposed",
    "planned",
    "abandoned",
];

/// Railway tracks usable by trains, subways and trams.
pub const RAIL_NETWORK: Network = Network {
    name: "rail",
    exclusions: &[
        Exclusion {
            key: "highway",
            values: HIGHWAY_VALUES,
        },
        Exclusion {
            key: "railway",
            values: &[
                "abandoned",
                "construction",
                "disused",
                "miniature",
                "planned",
                "platform",
                "proposed",
                "razed",
            ],
        },
        Exclusion {
            key: "service",
            values: &["private"],
        },
    ],
};
