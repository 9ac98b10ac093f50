/*
This code is part of the IWP trough network tools.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::geometry_conversion::{multipolygon_to_record, record_to_multipolygon};
use crate::tools::trough_network::{NetworkError, Result as NetworkResult};
use crate::tools::*;
use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon};
use iwp_common::utils::get_formatted_elapsed_time;
use iwp_vector::*;
use std::f64;
use std::f64::consts::PI;
use std::io::{Error, ErrorKind};
use std::time::Instant;
use tracing::warn;

/// Number of straight segments approximating a quarter circle.
const QUADRANT_SEGMENTS: usize = 8;

/// Areas below this are treated as empty.
const MIN_AREA: f64 = 1e-9;

/// This tool creates the outer buffer (annulus) of each polygon in a vector
/// file: the region within `--distance` of the polygon that lies outside of
/// it. Buffers use round joins, with each quarter circle approximated by
/// eight segments. The buffers of neighbouring polygons may overlap; they
/// are written as separate records, each with a `Value` attribute of 1 so
/// that the output can be burned into a raster.
///
/// Polygons with no area, and polygons whose annulus comes out empty, are
/// dropped with a warning.
///
/// # See Also
/// `VectorPolygonsToRaster`, `ExtractTroughNetwork`
pub struct PolygonAnnulusBuffer {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl PolygonAnnulusBuffer {
    pub fn new() -> PolygonAnnulusBuffer {
        // public constructor
        let name = "PolygonAnnulusBuffer".to_string();
        let toolbox = "GIS Analysis".to_string();
        let description =
            "Creates the outer buffer of each polygon, excluding the polygon itself.".to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input Vector Polygon File".to_owned(),
            flags: vec!["-i".to_owned(), "--input".to_owned()],
            description: "Input vector polygons file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Vector(
                VectorGeometryType::Polygon,
            )),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output Vector File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output vector polygons file.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Vector(
                VectorGeometryType::Polygon,
            )),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Buffer Distance".to_owned(),
            flags: vec!["--distance".to_owned()],
            description: "Buffer distance, in map units.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("5.0".to_owned()),
            optional: true,
        });

        let usage = example_usage(&name, "-i=iwp.shp -o=iwp_buffer.shp --distance=5.0");

        PolygonAnnulusBuffer {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl IwpTool for PolygonAnnulusBuffer {
    fn get_tool_name(&self) -> String {
        self.name.clone()
    }

    fn get_tool_description(&self) -> String {
        self.description.clone()
    }

    fn get_tool_parameters(&self) -> String {
        parameters_to_json(&self.parameters)
    }

    fn get_example_usage(&self) -> String {
        self.example_usage.clone()
    }

    fn get_toolbox(&self) -> String {
        self.toolbox.clone()
    }

    fn run<'a>(
        &self,
        args: Vec<String>,
        working_directory: &'a str,
        verbose: bool,
    ) -> Result<(), Error> {
        let args = ToolArgs::parse(&args)?;
        let input_file = args
            .get_file(&["-i", "-input"], working_directory)
            .ok_or_else(|| missing_parameter("input"))?;
        let output_file = args
            .get_file(&["-o", "-output"], working_directory)
            .ok_or_else(|| missing_parameter("output"))?;
        let distance = args.get_f64(&["-distance"])?.unwrap_or(5.0);

        if verbose {
            print_welcome(&self.get_tool_name());
            println!("Reading data...");
        }

        let input = Shapefile::read(&input_file)?;

        let start = Instant::now();

        let (buffers, num_dropped) = buffer_features(&input, distance)?;
        if buffers.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("No buffer could be created from {}.", input_file),
            ));
        }

        let mut output = buffer_layer(&output_file, &input, &buffers)?;

        let elapsed_time = get_formatted_elapsed_time(start);
        if verbose {
            if num_dropped > 0 {
                println!("{} features were dropped.", num_dropped);
            }
            println!("Saving data...")
        };
        output.write()?;
        if verbose {
            println!("Output file written");
            println!(
                "{}",
                &format!("Elapsed Time (excluding I/O): {}", elapsed_time)
            );
        }

        Ok(())
    }
}

/// A polygon approximating the set of points within `distance` of the
/// segment `a`-`b`: a rectangle along the segment capped by half discs.
fn capsule(a: Coord<f64>, b: Coord<f64>, distance: f64) -> Polygon<f64> {
    let theta = (b.y - a.y).atan2(b.x - a.x);
    let half_segments = 2 * QUADRANT_SEGMENTS;
    let step = PI / half_segments as f64;
    let mut coords = Vec::with_capacity(2 * (half_segments + 1) + 1);
    for (centre, start_angle) in [(b, theta - PI / 2.0), (a, theta + PI / 2.0)] {
        for i in 0..=half_segments {
            let angle = start_angle + i as f64 * step;
            coords.push(Coord {
                x: centre.x + distance * angle.cos(),
                y: centre.y + distance * angle.sin(),
            });
        }
    }
    Polygon::new(LineString::from(coords), vec![])
}

/// Unions a list of geometries by merging neighbouring pairs, which keeps
/// the intermediate results small.
fn union_all(mut pieces: Vec<MultiPolygon<f64>>) -> MultiPolygon<f64> {
    while pieces.len() > 1 {
        let mut merged = Vec::with_capacity(pieces.len() / 2 + 1);
        let mut iter = pieces.into_iter();
        while let Some(first) = iter.next() {
            match iter.next() {
                Some(second) => merged.push(first.union(&second)),
                None => merged.push(first),
            }
        }
        pieces = merged;
    }
    pieces.pop().unwrap_or_else(|| MultiPolygon::new(vec![]))
}

/// Returns the round-joined buffer of `feature` at `distance` with the
/// feature itself removed, or `None` if the feature has no area or the
/// annulus is empty. The buffer is the union of the feature with a capsule
/// around every edge of every ring, which equals the Minkowski sum of the
/// feature with a disc.
pub fn annulus_buffer(feature: &MultiPolygon<f64>, distance: f64) -> Option<MultiPolygon<f64>> {
    if !(distance > 0f64) || feature.unsigned_area() < MIN_AREA {
        return None;
    }
    let mut pieces = vec![feature.clone()];
    for poly in &feature.0 {
        for ring in std::iter::once(poly.exterior()).chain(poly.interiors().iter()) {
            for line in ring.lines() {
                if line.start == line.end {
                    continue;
                }
                pieces.push(MultiPolygon::new(vec![capsule(
                    line.start, line.end, distance,
                )]));
            }
        }
    }
    let buffer = union_all(pieces);
    let annulus = buffer.difference(feature);
    if annulus.unsigned_area() < MIN_AREA {
        return None;
    }
    Some(annulus)
}

/// Buffers every polygon record of `input`. Returns the annuli, in record
/// order, and the number of records dropped because they had no area or
/// produced an empty annulus.
pub fn buffer_features(
    input: &Shapefile,
    distance: f64,
) -> NetworkResult<(Vec<MultiPolygon<f64>>, usize)> {
    if input.header.shape_type.base_shape_type() != ShapeType::Polygon {
        return Err(NetworkError::InvalidInput(format!(
            "{} is a {} file; polygons are required.",
            input.get_short_filename(),
            input.header.shape_type
        )));
    }
    if !(distance > 0f64) {
        return Err(NetworkError::InvalidInput(format!(
            "The buffer distance must be greater than zero ({}).",
            distance
        )));
    }
    let mut buffers = Vec::with_capacity(input.num_records);
    let mut num_dropped = 0;
    for (record_num, record) in input.records.iter().enumerate() {
        match annulus_buffer(&record_to_multipolygon(record), distance) {
            Some(annulus) => buffers.push(annulus),
            None => {
                warn!(
                    "{}: feature {} has no area or an empty buffer and was dropped",
                    input.get_short_filename(),
                    record_num + 1
                );
                num_dropped += 1;
            }
        }
    }
    Ok((buffers, num_dropped))
}

/// Creates the in-memory buffer layer: one Polygon record per annulus, each
/// with `FID` and `Value` = 1, in the projection of `source`.
pub fn buffer_layer(
    file_name: &str,
    source: &Shapefile,
    buffers: &[MultiPolygon<f64>],
) -> std::result::Result<Shapefile, Error> {
    let mut output = Shapefile::initialize_using_file(file_name, source, ShapeType::Polygon, false)?;
    output
        .attributes
        .add_field(&AttributeField::new("FID", FieldDataType::Int, 7u8, 0u8));
    output
        .attributes
        .add_field(&AttributeField::new("Value", FieldDataType::Int, 3u8, 0u8));
    for (i, annulus) in buffers.iter().enumerate() {
        output.add_record(multipolygon_to_record(annulus))?;
        output
            .attributes
            .add_record(vec![FieldData::Int(i as i32 + 1), FieldData::Int(1)], false);
    }
    Ok(output)
}
