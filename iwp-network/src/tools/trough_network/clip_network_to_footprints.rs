/*
This code is part of the IWP trough network tools.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::config::{footprint_key_from_filename, DEFAULT_IMAGE_SUFFIX};
use super::error::{NetworkError, Result as NetworkResult};
use super::list_shapefiles;
use crate::tools::gis_analysis::geometry_conversion::{
    multilinestring_to_record, record_to_multilinestring, record_to_multipolygon,
};
use crate::tools::*;
use geo::{BooleanOps, MultiPolygon};
use iwp_common::utils::get_formatted_elapsed_time;
use iwp_vector::{FieldData, ShapeType, Shapefile};
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, warn};

/// This tool clips the trough networks in a directory of polyline shapefiles to the
/// footprints of the images the ice-wedge polygons were detected in. Each network is
/// paired with the footprint whose `Name` attribute equals the network's footprint key.
/// The key is read from the network's `TILE` attribute; files without one have it
/// derived from the file name, by removing `{image_suffix}_IWP_net`.
///
/// A network with exactly one matching footprint is clipped and written to
/// `{key}_clipped.shp` in the output directory, keeping its attributes. A network with
/// no matching footprint is skipped with a warning. When more than one footprint carries
/// the key, the network is not clipped and the tool reports an error for it. A network
/// lying wholly outside its footprint produces no output file.
///
/// # See Also
/// `ExtractTroughNetwork`, `TroughNetworkLength`
pub struct ClipNetworkToFootprints {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl ClipNetworkToFootprints {
    pub fn new() -> ClipNetworkToFootprints {
        // public constructor
        let name = "ClipNetworkToFootprints".to_string();
        let toolbox = "Trough Network Tools".to_string();
        let description =
            "Clips trough network polylines to their matching image footprint polygons."
                .to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input Network Directory".to_owned(),
            flags: vec!["--input_dir".to_owned()],
            description: "Directory of network polyline shapefiles.".to_owned(),
            parameter_type: ParameterType::Directory,
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Footprints File".to_owned(),
            flags: vec!["--footprints".to_owned()],
            description: "Footprint polygons with a Name attribute.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Vector(
                VectorGeometryType::Polygon,
            )),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output Directory".to_owned(),
            flags: vec!["--output_dir".to_owned()],
            description: "Directory receiving the clipped networks.".to_owned(),
            parameter_type: ParameterType::Directory,
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Image Suffix".to_owned(),
            flags: vec!["--image_suffix".to_owned()],
            description: "Suffix removed from file names to give the footprint key.".to_owned(),
            parameter_type: ParameterType::String,
            default_value: Some(DEFAULT_IMAGE_SUFFIX.to_owned()),
            optional: true,
        });

        let usage = example_usage(
            &name,
            "--input_dir=iwp_net --footprints=footprints.shp --output_dir=clipped",
        );

        ClipNetworkToFootprints {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl IwpTool for ClipNetworkToFootprints {
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
        let input_dir = args
            .get_file(&["-input_dir"], working_directory)
            .ok_or_else(|| missing_parameter("input_dir"))?;
        let footprint_file = args
            .get_file(&["-footprints"], working_directory)
            .ok_or_else(|| missing_parameter("footprints"))?;
        let output_dir = args
            .get_file(&["-output_dir"], working_directory)
            .ok_or_else(|| missing_parameter("output_dir"))?;
        let image_suffix = args
            .get(&["-image_suffix"])
            .unwrap_or_else(|| DEFAULT_IMAGE_SUFFIX.to_string());

        if verbose {
            print_welcome(&self.get_tool_name());
        }

        let start = Instant::now();

        let summary = clip_to_footprints(
            Path::new(&input_dir),
            Path::new(&footprint_file),
            Path::new(&output_dir),
            &image_suffix,
            verbose,
        )?;

        let elapsed_time = get_formatted_elapsed_time(start);
        if verbose {
            print_clip_summary(&summary);
            println!("{}", &format!("Elapsed Time (including I/O): {}", elapsed_time));
        }

        if !summary.failed.is_empty() {
            return Err(Error::new(
                ErrorKind::Other,
                format!("{} networks could not be clipped.", summary.failed.len()),
            ));
        }
        Ok(())
    }
}

/// The result of clipping one directory of networks.
#[derive(Debug, Default)]
pub struct ClipSummary {
    /// Footprint key and the clipped file written for it.
    pub clipped: Vec<(String, PathBuf)>,
    /// Networks whose key matched no footprint.
    pub unmatched: Vec<String>,
    /// Networks lying wholly outside their footprint.
    pub empty: Vec<String>,
    /// Network file and the reason it could not be clipped.
    pub failed: Vec<(String, String)>,
}

pub fn print_clip_summary(summary: &ClipSummary) {
    println!(
        "{} networks clipped, {} without a footprint, {} outside their footprint, {} failed",
        summary.clipped.len(),
        summary.unmatched.len(),
        summary.empty.len(),
        summary.failed.len()
    );
}

enum ClipOutcome {
    Written(String, PathBuf),
    Unmatched,
    Empty,
}

/// Footprint polygons indexed by their `Name`.
struct Footprints {
    names: Vec<String>,
    polygons: Vec<MultiPolygon<f64>>,
}

impl Footprints {
    fn read(footprint_file: &Path) -> NetworkResult<Footprints> {
        let layer = Shapefile::read(&footprint_file.to_string_lossy())?;
        if layer.header.shape_type.base_shape_type() != ShapeType::Polygon {
            return Err(NetworkError::InvalidInput(format!(
                "{} is a {} file; footprint polygons are required.",
                layer.get_short_filename(),
                layer.header.shape_type
            )));
        }
        if layer.attributes.get_field_num("Name").is_none() {
            return Err(NetworkError::InvalidInput(format!(
                "{} has no Name attribute.",
                layer.get_short_filename()
            )));
        }
        let names = (0..layer.num_records)
            .map(|i| layer.attributes.get_value(i, "Name").get_as_string().trim().to_string())
            .collect();
        let polygons = layer.records.iter().map(record_to_multipolygon).collect();
        Ok(Footprints { names, polygons })
    }

    fn matching(&self, key: &str) -> Vec<usize> {
        self.names
            .iter()
            .enumerate()
            .filter(|(_, name)| name.as_str() == key)
            .map(|(i, _)| i)
            .collect()
    }
}

/// The footprint key of a network: its `TILE` attribute when present,
/// otherwise derived from the file name.
fn network_key(network: &Shapefile, image_suffix: &str) -> String {
    match network.attributes.get_value(0, "TILE") {
        FieldData::Text(key) if !key.trim().is_empty() => key.trim().to_string(),
        _ => footprint_key_from_filename(&network.get_short_filename(), image_suffix),
    }
}

fn clip_file(
    network_file: &Path,
    footprints: &Footprints,
    output_dir: &Path,
    image_suffix: &str,
    verbose: bool,
) -> NetworkResult<ClipOutcome> {
    let network = Shapefile::read(&network_file.to_string_lossy())?;
    if network.header.shape_type.base_shape_type() != ShapeType::PolyLine {
        return Err(NetworkError::InvalidInput(format!(
            "{} is a {} file; polylines are required.",
            network.get_short_filename(),
            network.header.shape_type
        )));
    }

    let key = network_key(&network, image_suffix);
    if verbose {
        println!("Footprint key: {}", key);
    }

    let matches = footprints.matching(&key);
    let footprint = match matches.len() {
        0 => {
            warn!("{}: no footprint is named '{}'", network.get_short_filename(), key);
            return Ok(ClipOutcome::Unmatched);
        }
        1 => &footprints.polygons[matches[0]],
        count => return Err(NetworkError::AmbiguousFootprint { key, count }),
    };

    let output_file = output_dir.join(format!("{}_clipped.shp", key));
    let mut output = Shapefile::initialize_using_file(
        &output_file.to_string_lossy(),
        &network,
        ShapeType::PolyLine,
        true,
    )?;
    for (record_num, record) in network.records.iter().enumerate() {
        let clipped = footprint.clip(&record_to_multilinestring(record), false);
        let sfg = multilinestring_to_record(&clipped);
        if sfg.num_parts == 0 {
            continue;
        }
        output.add_record(sfg)?;
        let atts = network
            .attributes
            .get_record(record_num)
            .cloned()
            .unwrap_or_default();
        output.attributes.add_record(atts, false);
    }

    if output.records.is_empty() {
        warn!(
            "{}: no lines fall within footprint '{}'",
            network.get_short_filename(),
            key
        );
        return Ok(ClipOutcome::Empty);
    }

    output.write()?;
    if verbose {
        println!("Clipped polyline saved to {}", output_file.display());
    }
    Ok(ClipOutcome::Written(key, output_file))
}

/// Clips every network shapefile in `polyline_dir` to its footprint. A
/// network that cannot be clipped is logged and recorded in the summary
/// without stopping the run; only an unreadable footprint file or
/// directory is an error for the whole call.
pub fn clip_to_footprints(
    polyline_dir: &Path,
    footprint_file: &Path,
    output_dir: &Path,
    image_suffix: &str,
    verbose: bool,
) -> NetworkResult<ClipSummary> {
    let footprints = Footprints::read(footprint_file)?;
    let network_files = list_shapefiles(polyline_dir)?;
    fs::create_dir_all(output_dir)?;

    let mut summary = ClipSummary::default();
    for network_file in &network_files {
        let file_name = network_file
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        if verbose {
            println!("Clipping {}...", file_name);
        }
        match clip_file(network_file, &footprints, output_dir, image_suffix, verbose) {
            Ok(ClipOutcome::Written(key, path)) => summary.clipped.push((key, path)),
            Ok(ClipOutcome::Unmatched) => summary.unmatched.push(file_name),
            Ok(ClipOutcome::Empty) => summary.empty.push(file_name),
            Err(e) => {
                error!("{} could not be clipped: {}", file_name, e);
                summary.failed.push((file_name, e.to_string()));
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod test {
    use super::clip_to_footprints;
    use crate::tools::data_tools::lines_to_shapefile;
    use crate::tools::gis_analysis::geometry_conversion::multipolygon_to_record;
    use geo::{Coord, LineString, MultiPolygon, Polygon};
    use iwp_common::structures::Point2D;
    use iwp_vector::{AttributeField, FieldData, FieldDataType, ShapeType, Shapefile};
    use std::path::Path;

    const SUFFIX: &str = "_u16rf3413_pansh";

    fn square(x0: f64, y0: f64, side: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![Polygon::new(
            LineString::from(vec![
                Coord { x: x0, y: y0 },
                Coord { x: x0 + side, y: y0 },
                Coord { x: x0 + side, y: y0 + side },
                Coord { x: x0, y: y0 + side },
                Coord { x: x0, y: y0 },
            ]),
            vec![],
        )])
    }

    /// Writes 10 x 10 footprints at the origin, one per name.
    fn write_footprints(dir: &Path, names: &[&str]) -> std::path::PathBuf {
        let file = dir.join("footprints.shp");
        let mut sf = Shapefile::new(&file.to_string_lossy(), ShapeType::Polygon).unwrap();
        sf.attributes
            .add_field(&AttributeField::new("Name", FieldDataType::Text, 50u8, 0u8));
        for name in names {
            sf.add_record(multipolygon_to_record(&square(0.0, 0.0, 10.0))).unwrap();
            sf.attributes
                .add_record(vec![FieldData::Text(name.to_string())], false);
        }
        sf.write().unwrap();
        file
    }

    /// A horizontal line at y = 5 from x0 to x1.
    fn write_network(dir: &Path, stem: &str, tile: Option<&str>, x0: f64, x1: f64) {
        let file = dir.join(format!("{}.shp", stem));
        let lines = vec![vec![Point2D::new(x0, 5.0), Point2D::new(x1, 5.0)]];
        lines_to_shapefile(&lines, &file.to_string_lossy(), "", tile)
            .unwrap()
            .write()
            .unwrap();
    }

    #[test]
    fn test_lines_are_clipped_to_their_footprint() {
        let nets = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let footprints = write_footprints(nets.path(), &["tile_06", "tile_07"]);
        let net_dir = nets.path().join("networks");
        std::fs::create_dir(&net_dir).unwrap();
        write_network(&net_dir, "tile_07_IWP_net", Some("tile_07"), -5.0, 15.0);

        let summary = clip_to_footprints(&net_dir, &footprints, out.path(), SUFFIX, false).unwrap();
        assert_eq!(summary.clipped.len(), 1);
        assert_eq!(summary.clipped[0].0, "tile_07");
        let clipped = Shapefile::read(&out.path().join("tile_07_clipped.shp").to_string_lossy())
            .unwrap();
        assert_eq!(clipped.num_records, 1);
        assert!((clipped.records[0].get_line_length() - 10.0).abs() < 1e-9);
        assert_eq!(
            clipped.attributes.get_value(0, "TILE"),
            FieldData::Text("tile_07".to_string())
        );
    }

    #[test]
    fn test_key_falls_back_to_the_file_name() {
        let nets = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let footprints = write_footprints(nets.path(), &["tile_07"]);
        let net_dir = nets.path().join("networks");
        std::fs::create_dir(&net_dir).unwrap();
        write_network(&net_dir, "tile_07_u16rf3413_pansh_IWP_net", None, 2.0, 4.0);

        let summary = clip_to_footprints(&net_dir, &footprints, out.path(), SUFFIX, false).unwrap();
        assert_eq!(summary.clipped.len(), 1);
        assert!(out.path().join("tile_07_clipped.shp").exists());
    }

    #[test]
    fn test_unmatched_and_empty_networks_write_nothing() {
        let nets = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let footprints = write_footprints(nets.path(), &["tile_07"]);
        let net_dir = nets.path().join("networks");
        std::fs::create_dir(&net_dir).unwrap();
        write_network(&net_dir, "tile_99_IWP_net", Some("tile_99"), 2.0, 4.0);
        write_network(&net_dir, "tile_07_IWP_net", Some("tile_07"), 20.0, 30.0);

        let summary = clip_to_footprints(&net_dir, &footprints, out.path(), SUFFIX, false).unwrap();
        assert!(summary.clipped.is_empty());
        assert!(summary.failed.is_empty());
        assert_eq!(summary.unmatched, vec!["tile_99_IWP_net.shp".to_string()]);
        assert_eq!(summary.empty, vec!["tile_07_IWP_net.shp".to_string()]);
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_duplicate_footprint_names_fail_that_network_only() {
        let nets = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let footprints = write_footprints(nets.path(), &["tile_07", "tile_07", "tile_08"]);
        let net_dir = nets.path().join("networks");
        std::fs::create_dir(&net_dir).unwrap();
        write_network(&net_dir, "tile_07_IWP_net", Some("tile_07"), 2.0, 4.0);
        write_network(&net_dir, "tile_08_IWP_net", Some("tile_08"), 2.0, 4.0);

        let summary = clip_to_footprints(&net_dir, &footprints, out.path(), SUFFIX, false).unwrap();
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, "tile_07_IWP_net.shp");
        assert!(summary.failed[0].1.contains("2 footprints"));
        assert!(!out.path().join("tile_07_clipped.shp").exists());
        assert!(out.path().join("tile_08_clipped.shp").exists());
    }
}
