// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use log::debug;

use crate::osm::{build_graph, Error, Network};
use crate::{Graph, WeightType};

mod json;
mod model;
mod xml;

pub use model::{
    Elements, Feature, FeatureType, NodeRecord, RelationMember, RelationRecord, WayRecord,
};

/// Format of the input OSM file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    Unknown,

    /// Force uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    Xml,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,

    /// Force [Overpass JSON](https://wiki.openstreetmap.org/wiki/OSM_JSON)
    Json,
}

/// Additional controls for interpreting OSM data as a [Graph].
#[derive(Debug, Clone, Copy)]
pub struct Options<'a> {
    /// Which OSM ways should be included in the [Graph].
    pub network: &'a Network<'a>,

    /// How the cost of [edges](crate::Edge) is computed.
    pub weight_type: WeightType,

    /// Format of the input data.
    pub file_format: FileFormat,
}

/// Guesses the [FileFormat] from the first bytes of the data.
fn detect_format(head: &[u8]) -> Result<FileFormat, Error> {
    const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

    if head.starts_with(&[0x1F, 0x8B]) {
        return Ok(FileFormat::XmlGz);
    } else if head.starts_with(b"BZh") {
        return Ok(FileFormat::XmlBz2);
    }

    let head = head.strip_prefix(UTF8_BOM).unwrap_or(head);
    let format = match head.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'<') => FileFormat::Xml,
        Some(b'{') => FileFormat::Json,
        _ => return Err(Error::UnknownFormat),
    };

    debug!("detected file format: {format:?}");
    Ok(format)
}

/// Parse all OSM elements from a reader.
///
/// The provided stream will be automatically wrapped in a buffered reader.
pub fn read_elements_from_io<R: io::Read>(format: FileFormat, reader: R) -> Result<Elements, Error> {
    let mut b = io::BufReader::new(reader);
    let format = match format {
        FileFormat::Unknown => detect_format(b.fill_buf()?)?,
        known => known,
    };
    read_elements_from_bufread(format, b)
}

/// Parse all OSM elements from a file at the provided path.
pub fn read_elements_from_file<P: AsRef<Path>>(
    format: FileFormat,
    path: P,
) -> Result<Elements, Error> {
    let f = File::open(path)?;
    read_elements_from_io(format, f)
}

/// Parse all OSM elements from a static buffer.
pub fn read_elements_from_buffer(format: FileFormat, data: &[u8]) -> Result<Elements, Error> {
    let format = match format {
        FileFormat::Unknown => detect_format(data)?,
        known => known,
    };

    match format {
        // Fast paths are available for in-memory uncompressed data
        FileFormat::Xml => xml::Reader::from_buffer(data).collect(),
        FileFormat::Json => json::read_from_buffer(data),
        _ => read_elements_from_bufread(format, data),
    }
}

fn read_elements_from_bufread<R: BufRead>(format: FileFormat, reader: R) -> Result<Elements, Error> {
    match format {
        FileFormat::Unknown => Err(Error::UnknownFormat),

        FileFormat::Xml => xml::Reader::from_io(reader).collect(),

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(reader);
            xml::Reader::from_io(io::BufReader::new(d)).collect()
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(reader);
            xml::Reader::from_io(io::BufReader::new(d)).collect()
        }

        FileFormat::Json => json::read_from_io(reader),
    }
}

/// Parse OSM data from a reader into a [Graph] as per the provided [Options].
pub fn graph_from_io<R: io::Read>(options: &Options<'_>, reader: R) -> Result<Graph, Error> {
    let elements = read_elements_from_io(options.file_format, reader)?;
    build_graph(&elements, options)
}

/// Parse OSM data from a file at the provided path into a [Graph] as per the provided [Options].
pub fn graph_from_file<P: AsRef<Path>>(options: &Options<'_>, path: P) -> Result<Graph, Error> {
    let elements = read_elements_from_file(options.file_format, path)?;
    build_graph(&elements, options)
}

/// Parse OSM data from a static buffer into a [Graph] as per the provided [Options].
pub fn graph_from_buffer(options: &Options<'_>, data: &[u8]) -> Result<Graph, Error> {
    let elements = read_elements_from_buffer(options.file_format, data)?;
    build_graph(&elements, options)
}
