use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct GraphLoadError(PathBuf, #[source] osmnet::osm::Error);

#[derive(Debug, thiserror::Error)]
#[error("unknown network type: {0:?}")]
struct UnknownNetwork(String);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Xml,
    XmlGz,
    XmlBz2,
    Json,
}

impl From<Format> for osmnet::osm::FileFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Xml => Self::Xml,
            Format::XmlGz => Self::XmlGz,
            Format::XmlBz2 => Self::XmlBz2,
            Format::Json => Self::Json,
        }
    }
}

/// Prints ways of an OSM network as GeoJSON, with normalized speed limits, lanes and directions
#[derive(Parser)]
struct Cli {
    /// The path to the OSM file
    osm_file: PathBuf,

    /// Network type: drive, drive_service, drive_mainroads, walk, bike, all, all_private, none or rail
    #[arg(short, long, default_value = "drive")]
    network: String,

    /// How edge weights are computed
    #[arg(short, long, value_enum, default_value_t)]
    weight: osmnet::WeightType,

    /// Format of the OSM file, detected from its content if not provided
    #[arg(short, long, value_enum)]
    format: Option<Format>,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let network =
        osmnet::osm::Network::named(&cli.network).ok_or(UnknownNetwork(cli.network.clone()))?;
    let options = osmnet::osm::Options {
        network,
        weight_type: cli.weight,
        file_format: cli.format.map_or(osmnet::osm::FileFormat::Unknown, Into::into),
    };

    let g = load_graph(&options, &cli.osm_file)?;
    let edge_count: usize = g.nodes().map(|n| g.get_edges(n.id).len()).sum();
    log::info!(
        "{} network of {}: {} nodes, {} edges, {} ways, {} restrictions",
        network.name,
        cli.osm_file.display(),
        g.len(),
        edge_count,
        g.way_count(),
        g.restriction_count(),
    );

    let mut ways: Vec<&osmnet::Way> = g.ways().collect();
    ways.sort_by_key(|w| w.id);

    let features: Vec<serde_json::Value> = ways
        .into_iter()
        .map(|w| {
            let coordinates: Vec<[f64; 2]> = w
                .nodes
                .iter()
                .filter_map(|&id| g.get_node(id))
                .map(|n| [n.location.lon, n.location.lat])
                .collect();

            json!({
                "type": "Feature",
                "id": w.id,
                "properties": {
                    "maxspeed": w.attributes.maxspeed,
                    "lanes": w.attributes.lanes,
                    "oneway": w.attributes.oneway,
                    "reverseway": w.attributes.reverseway,
                },
                "geometry": {
                    "type": "LineString",
                    "coordinates": coordinates,
                },
            })
        })
        .collect();

    let collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    println!("{}", serde_json::to_string_pretty(&collection)?);

    Ok(())
}

fn load_graph<P: AsRef<Path>>(
    options: &osmnet::osm::Options<'_>,
    path: P,
) -> Result<osmnet::Graph, GraphLoadError> {
    osmnet::osm::graph_from_file(options, path.as_ref())
        .map_err(|e| GraphLoadError(PathBuf::from(path.as_ref()), e))
}
