/*
This code is part of the IWP trough network tools.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::clip_network_to_footprints::{clip_to_footprints, print_clip_summary};
use super::config::{NetworkConfig, TileId};
use super::error::{NetworkError, Result as NetworkResult};
use super::intermediate_files::IntermediateFiles;
use super::list_shapefiles;
use super::trough_network_length::measure_directory;
use crate::tools::data_tools::{lines_to_shapefile, rasterize_polygons, trace_lines};
use crate::tools::gis_analysis::{buffer_features, buffer_layer};
use crate::tools::image_analysis::thin;
use crate::tools::*;
use iwp_common::utils::get_formatted_elapsed_time;
use iwp_raster::Raster;
use iwp_vector::Shapefile;
use std::collections::HashMap;
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{error, info, warn};

/// This tool extracts the network of troughs between ice-wedge polygons (IWPs). Each
/// polygon shapefile in `--input_dir` is one tile of IWP detections. For every tile the
/// polygons are buffered outward by `--distance` with the polygons themselves removed,
/// the buffers are burned into a raster of `--cell_size` cells, the raster is thinned to
/// a single-cell wide skeleton, and the skeleton is traced into polylines. The result is
/// written to `--output_dir` as `{tile}_IWP_net.shp`, with `FID` and `TILE` attributes and
/// the tile's coordinate reference system. Tile names have `-` and spaces replaced by `_`.
///
/// The buffer shapefile, buffer raster, and skeleton raster are scratch files; they are
/// deleted once the tile is finished, whether or not it succeeded, unless
/// `--keep_intermediates` is used. A tile that fails is reported and the remaining tiles
/// are still processed; the tool reports an error at the end if any tile failed.
///
/// Settings may also be read from a JSON file (`--config`); flags override its values.
/// With `--full_workflow`, the networks are then clipped to the footprint file and the
/// total length of the clipped networks is reported.
///
/// # See Also
/// `PolygonAnnulusBuffer`, `VectorPolygonsToRaster`, `LineThinning`, `RasterToVectorLines`,
/// `ClipNetworkToFootprints`, `TroughNetworkLength`
pub struct ExtractTroughNetwork {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl ExtractTroughNetwork {
    pub fn new() -> ExtractTroughNetwork {
        // public constructor
        let name = "ExtractTroughNetwork".to_string();
        let toolbox = "Trough Network Tools".to_string();
        let description =
            "Extracts the polyline network of troughs between ice-wedge polygons, tile by tile."
                .to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input Directory".to_owned(),
            flags: vec!["--input_dir".to_owned()],
            description: "Directory of IWP polygon shapefiles, one per tile.".to_owned(),
            parameter_type: ParameterType::Directory,
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Output Directory".to_owned(),
            flags: vec!["--output_dir".to_owned()],
            description: "Directory receiving the network shapefiles.".to_owned(),
            parameter_type: ParameterType::Directory,
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Settings File".to_owned(),
            flags: vec!["--config".to_owned()],
            description: "Optional JSON file of network settings.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Text),
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Buffer Distance".to_owned(),
            flags: vec!["--distance".to_owned()],
            description: "Buffer distance, in map units.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("5.0".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Cell Size".to_owned(),
            flags: vec!["--cell_size".to_owned()],
            description: "Cell size of the buffer and skeleton rasters.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("0.5".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Image Suffix".to_owned(),
            flags: vec!["--image_suffix".to_owned()],
            description: "Suffix removed from tile names to give the footprint key.".to_owned(),
            parameter_type: ParameterType::String,
            default_value: Some(super::config::DEFAULT_IMAGE_SUFFIX.to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Keep Intermediate Files?".to_owned(),
            flags: vec!["--keep_intermediates".to_owned()],
            description: "Keep the buffer and skeleton files of each tile.".to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("false".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Run Full Workflow?".to_owned(),
            flags: vec!["--full_workflow".to_owned()],
            description: "Also clip the networks and report their length.".to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("false".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Footprints File".to_owned(),
            flags: vec!["--footprints".to_owned()],
            description: "Image footprint polygons used by the full workflow.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Vector(
                VectorGeometryType::Polygon,
            )),
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Clipped Output Directory".to_owned(),
            flags: vec!["--clipped_dir".to_owned()],
            description: "Directory receiving the clipped networks in the full workflow.".to_owned(),
            parameter_type: ParameterType::Directory,
            default_value: None,
            optional: true,
        });

        let usage = example_usage(
            &name,
            "--input_dir=iwp --output_dir=iwp_net --distance=5.0 --cell_size=0.5",
        );

        ExtractTroughNetwork {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl IwpTool for ExtractTroughNetwork {
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
        let configs = network_config_from_args(&args, working_directory)?;
        if configs.input_dir.as_os_str().is_empty() {
            return Err(missing_parameter("input_dir"));
        }
        if configs.output_dir.as_os_str().is_empty() {
            return Err(missing_parameter("output_dir"));
        }
        let full_workflow = args.is_set(&["-full_workflow"]);
        if full_workflow
            && (configs.footprint_file.as_os_str().is_empty()
                || configs.clipped_dir.as_os_str().is_empty())
        {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The full workflow needs both --footprints and --clipped_dir.",
            ));
        }

        if verbose {
            print_welcome(&self.get_tool_name());
        }

        let start = Instant::now();

        let summary = extract_network(&configs, verbose)?;
        let mut num_failed = summary.failed.len();
        if verbose {
            println!(
                "{} of {} tiles processed successfully",
                summary.succeeded.len(),
                summary.tiles_processed
            );
            for (tile, reason) in &summary.failed {
                println!("Failed: {} ({})", tile, reason);
            }
        }

        if full_workflow {
            let clip_summary = clip_to_footprints(
                &configs.output_dir,
                &configs.footprint_file,
                &configs.clipped_dir,
                &configs.image_suffix,
                verbose,
            )?;
            if verbose {
                print_clip_summary(&clip_summary);
            }
            num_failed += clip_summary.failed.len();

            let report = measure_directory(&configs.clipped_dir, verbose)?;
            println!("{}", report);
            num_failed += report.failed.len();
        }

        let elapsed_time = get_formatted_elapsed_time(start);
        if verbose {
            println!("{}", &format!("Elapsed Time (including I/O): {}", elapsed_time));
        }

        if num_failed > 0 {
            return Err(Error::new(
                ErrorKind::Other,
                format!("{} tiles or files could not be processed.", num_failed),
            ));
        }
        Ok(())
    }
}

/// Builds the network settings from `--config`, if given, and then applies
/// any individual flags on top. Without a settings file the number of
/// processors comes from the global `--max_procs` setting.
pub fn network_config_from_args(args: &ToolArgs, working_directory: &str) -> Result<NetworkConfig, Error> {
    let mut configs = match args.get_file(&["-config"], working_directory) {
        Some(f) => NetworkConfig::from_file(Path::new(&f))?,
        None => {
            let mut c = NetworkConfig::default();
            c.max_procs = iwp_common::configs::get_configs()?.max_procs;
            c
        }
    };
    if let Some(d) = args.get_file(&["-input_dir"], working_directory) {
        configs.input_dir = PathBuf::from(d);
    }
    if let Some(d) = args.get_file(&["-output_dir"], working_directory) {
        configs.output_dir = PathBuf::from(d);
    }
    if let Some(f) = args.get_file(&["-footprints"], working_directory) {
        configs.footprint_file = PathBuf::from(f);
    }
    if let Some(d) = args.get_file(&["-clipped_dir"], working_directory) {
        configs.clipped_dir = PathBuf::from(d);
    }
    if let Some(d) = args.get_f64(&["-distance"])? {
        configs.buffer_distance = d;
    }
    if let Some(c) = args.get_f64(&["-cell_size"])? {
        configs.cell_size = c;
    }
    if let Some(s) = args.get(&["-image_suffix"]) {
        configs.image_suffix = s;
    }
    if args.is_set(&["-keep_intermediates"]) {
        configs.keep_intermediates = true;
    }
    configs.validate()?;
    Ok(configs)
}

/// What a successfully processed tile produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TileOutcome {
    pub tile: TileId,
    pub network_file: PathBuf,
    pub num_lines: usize,
    pub num_dropped_features: usize,
}

#[derive(Debug, Default)]
pub struct NetworkSummary {
    pub tiles_processed: usize,
    pub succeeded: Vec<TileOutcome>,
    /// Tile name and the reason it failed.
    pub failed: Vec<(String, String)>,
}

fn require(file: &Path) -> NetworkResult<String> {
    if file.exists() {
        Ok(file.to_string_lossy().to_string())
    } else {
        Err(NetworkError::MissingIntermediate(file.to_path_buf()))
    }
}

/// Runs the buffer, rasterize, thin, and trace stages for one tile and
/// writes its network shapefile. Each stage reads the previous stage's
/// file back from the output directory.
pub fn extract_tile(
    tile: &TileId,
    input_path: &Path,
    configs: &NetworkConfig,
    verbose: bool,
) -> NetworkResult<TileOutcome> {
    let out_dir = configs.output_dir.as_path();
    let buffer_file = tile.buffer_shapefile(out_dir);
    let buffer_raster_file = tile.buffer_raster(out_dir);
    let skeleton_file = tile.skeleton_raster(out_dir);
    let network_file = tile.network_shapefile(out_dir);

    let mut scratch = IntermediateFiles::new(configs.keep_intermediates);
    scratch.register(&buffer_file);
    scratch.register(&buffer_raster_file);
    scratch.register(&skeleton_file);

    if verbose {
        println!("Reading input shapefile of IWP features...");
    }
    let input = Shapefile::read(&input_path.to_string_lossy())?;

    if verbose {
        println!("Creating buffer of IWP features...");
    }
    let (buffers, num_dropped_features) = buffer_features(&input, configs.buffer_distance)?;
    if buffers.is_empty() {
        return Err(NetworkError::NoFeatures(tile.name.clone()));
    }
    if num_dropped_features > 0 {
        warn!("{}: {} features dropped", tile.name, num_dropped_features);
    }

    if verbose {
        println!("Saving buffer shapefile...");
    }
    buffer_layer(&buffer_file.to_string_lossy(), &input, &buffers)?.write()?;

    if verbose {
        println!("Converting IWP outer buffer to raster...");
    }
    let layer = Shapefile::read(&require(&buffer_file)?)?;
    let mut buffer_raster = rasterize_polygons(
        &layer,
        "Value",
        configs.cell_size,
        &buffer_raster_file.to_string_lossy(),
    )?;
    if buffer_raster.is_in_geographic_coordinates() {
        warn!(
            "{}: the data appear to be in geographic coordinates; distances are taken as map units",
            tile.name
        );
    }
    buffer_raster.write()?;

    if verbose {
        println!("Skeletonizing...");
    }
    let buffer_raster = Raster::new(&require(&buffer_raster_file)?, "r")?;
    thin(&buffer_raster, &skeleton_file.to_string_lossy()).write()?;

    if verbose {
        println!("Converting buffer skeleton raster to polyline shapefile...");
    }
    let skeleton = Raster::new(&require(&skeleton_file)?, "r")?;
    let lines = trace_lines(&skeleton)?;
    if lines.is_empty() {
        warn!("{}: the skeleton holds no lines", tile.name);
    }
    lines_to_shapefile(
        &lines,
        &network_file.to_string_lossy(),
        &input.projection,
        Some(&tile.footprint_key),
    )?
    .write()?;

    info!("{}: {} lines written to {}", tile.name, lines.len(), network_file.display());

    Ok(TileOutcome {
        tile: tile.clone(),
        network_file,
        num_lines: lines.len(),
        num_dropped_features,
    })
}

/// Extracts the network of every polygon shapefile in the input directory,
/// in file name order. A failed tile is logged and recorded in the summary
/// without stopping the run. Files whose tile names normalise to one already
/// taken by an earlier file are not processed; they are recorded as failures
/// after the processed tiles.
pub fn extract_network(configs: &NetworkConfig, verbose: bool) -> NetworkResult<NetworkSummary> {
    configs.validate()?;
    let input_files = list_shapefiles(&configs.input_dir)?;
    fs::create_dir_all(&configs.output_dir)?;

    // names that normalise alike would share output files
    let mut first_paths: HashMap<String, PathBuf> = HashMap::new();
    let mut tiles: Vec<(TileId, PathBuf)> = vec![];
    let mut duplicates = vec![];
    for file in input_files {
        let tile = TileId::from_path(&file, &configs.image_suffix);
        match first_paths.get(&tile.name) {
            Some(first) => duplicates.push(NetworkError::DuplicateTile {
                name: tile.name.clone(),
                first: first.clone(),
                second: file,
            }),
            None => {
                first_paths.insert(tile.name.clone(), file.clone());
                tiles.push((tile, file));
            }
        }
    }
    let num_tiles = tiles.len();
    if num_tiles == 0 && duplicates.is_empty() {
        warn!("no shapefiles found in {}", configs.input_dir.display());
    }

    let num_procs = configs.num_workers(num_tiles);
    let results: Vec<NetworkResult<TileOutcome>> = if num_procs <= 1 {
        let mut results = Vec::with_capacity(num_tiles);
        for (tile, path) in &tiles {
            if verbose {
                println!("Processing shapefile: {}", path.display());
            }
            results.push(extract_tile(tile, path, configs, verbose));
        }
        results
    } else {
        let tiles = Arc::new(tiles.clone());
        let shared_configs = Arc::new(configs.clone());
        let (tx, rx) = mpsc::channel();
        for tid in 0..num_procs {
            let tiles = tiles.clone();
            let configs = shared_configs.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                for i in (0..tiles.len()).filter(|i| i % num_procs == tid) {
                    let (tile, path) = &tiles[i];
                    let result = extract_tile(tile, path, &configs, false);
                    if tx.send((i, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let mut slots: Vec<Option<NetworkResult<TileOutcome>>> = (0..num_tiles).map(|_| None).collect();
        let mut num_done = 0;
        for (i, result) in rx.iter() {
            slots[i] = Some(result);
            num_done += 1;
            if verbose {
                println!("Processed {} of {} tiles ({})", num_done, num_tiles, tiles[i].0.name);
            }
        }
        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(NetworkError::Io(Error::new(
                        ErrorKind::Other,
                        "the worker processing this tile stopped",
                    )))
                })
            })
            .collect()
    };

    let mut summary = NetworkSummary {
        tiles_processed: num_tiles + duplicates.len(),
        ..Default::default()
    };
    for ((tile, _), result) in tiles.iter().zip(results) {
        match result {
            Ok(outcome) => summary.succeeded.push(outcome),
            Err(e) => {
                error!("tile {} failed: {}", tile.name, e);
                summary.failed.push((tile.name.clone(), e.to_string()));
            }
        }
    }
    for e in duplicates {
        if let NetworkError::DuplicateTile { name, .. } = &e {
            error!("tile {} skipped: {}", name, e);
            summary.failed.push((name.clone(), e.to_string()));
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod test {
    use super::{extract_network, extract_tile};
    use crate::tools::gis_analysis::geometry_conversion::multipolygon_to_record;
    use crate::tools::trough_network::{NetworkConfig, NetworkError, TileId};
    use geo::{Coord, LineString, MultiPolygon, Polygon};
    use iwp_common::structures::Point2D;
    use iwp_vector::{FieldData, ShapeType, Shapefile, ShapefileGeometry};
    use std::fs;
    use std::path::Path;

    const WKT: &str = "PROJCS[\"WGS 84 / NSIDC Sea Ice Polar Stereographic North\"]";

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

    /// Writes a tile of square IWPs with 6-unit gaps between them.
    fn write_tile(dir: &Path, stem: &str) {
        let file_name = dir.join(format!("{}.shp", stem)).to_string_lossy().to_string();
        let mut sf = Shapefile::new(&file_name, ShapeType::Polygon).unwrap();
        sf.projection = WKT.to_string();
        sf.attributes.add_field(&iwp_vector::AttributeField::new(
            "FID",
            iwp_vector::FieldDataType::Int,
            7u8,
            0u8,
        ));
        let mut fid = 1;
        for i in 0..2 {
            for j in 0..2 {
                let x0 = 1000.0 + i as f64 * 16.0;
                let y0 = -2000.0 + j as f64 * 16.0;
                sf.add_record(multipolygon_to_record(&square(x0, y0, 10.0))).unwrap();
                sf.attributes.add_record(vec![FieldData::Int(fid)], false);
                fid += 1;
            }
        }
        sf.write().unwrap();
    }

    fn configs(input_dir: &Path, output_dir: &Path) -> NetworkConfig {
        let mut configs = NetworkConfig::default();
        configs.input_dir = input_dir.to_path_buf();
        configs.output_dir = output_dir.to_path_buf();
        configs.cell_size = 1.0;
        configs
    }

    fn count_files(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_tile_network_and_cleanup() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        write_tile(input_dir.path(), "tile-07_u16rf3413_pansh");
        let configs = configs(input_dir.path(), output_dir.path());

        let tile = TileId::from_stem("tile-07_u16rf3413_pansh", &configs.image_suffix);
        let input = input_dir.path().join("tile-07_u16rf3413_pansh.shp");
        let outcome = extract_tile(&tile, &input, &configs, false).unwrap();
        assert!(outcome.num_lines > 0);
        assert_eq!(outcome.num_dropped_features, 0);

        let network = Shapefile::read(&outcome.network_file.to_string_lossy()).unwrap();
        assert_eq!(network.header.shape_type, ShapeType::PolyLine);
        assert_eq!(network.projection, WKT);
        assert_eq!(
            network.attributes.get_value(0, "TILE"),
            FieldData::Text("tile_07".to_string())
        );
        assert!(network.get_bounding_box().min_x >= 1000.0 - 5.0);

        // only the network's .shp, .shx, .dbf, and .prj remain
        assert_eq!(count_files(output_dir.path()), 4);
        assert!(!tile.buffer_shapefile(output_dir.path()).exists());
        assert!(!tile.buffer_raster(output_dir.path()).exists());
        assert!(!tile.skeleton_raster(output_dir.path()).exists());
    }

    #[test]
    fn test_intermediates_are_kept_on_request() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        write_tile(input_dir.path(), "tile_08");
        let mut configs = configs(input_dir.path(), output_dir.path());
        configs.keep_intermediates = true;
        let tile = TileId::from_stem("tile_08", &configs.image_suffix);
        extract_tile(&tile, &input_dir.path().join("tile_08.shp"), &configs, false).unwrap();
        assert!(tile.buffer_shapefile(output_dir.path()).exists());
        assert!(tile.skeleton_raster(output_dir.path()).exists());
    }

    #[test]
    fn test_intermediates_are_removed_after_failure() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        write_tile(input_dir.path(), "tile_09");
        let configs = configs(input_dir.path(), output_dir.path());
        let tile = TileId::from_stem("tile_09", &configs.image_suffix);
        // a directory in place of the network file makes the last stage fail
        fs::create_dir(tile.network_shapefile(output_dir.path())).unwrap();

        let result = extract_tile(&tile, &input_dir.path().join("tile_09.shp"), &configs, false);
        assert!(matches!(result, Err(NetworkError::Io(_))));
        assert!(!tile.buffer_shapefile(output_dir.path()).exists());
        assert!(!tile.buffer_raster(output_dir.path()).exists());
        assert!(!tile.skeleton_raster(output_dir.path()).exists());
    }

    #[test]
    fn test_failed_tile_does_not_stop_the_run() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        write_tile(input_dir.path(), "tile_01");
        write_tile(input_dir.path(), "tile_03");
        // a polyline file among the polygon tiles
        let bad = input_dir.path().join("tile_02.shp").to_string_lossy().to_string();
        let mut lines = Shapefile::new(&bad, ShapeType::PolyLine).unwrap();
        lines.attributes.add_field(&iwp_vector::AttributeField::new(
            "FID",
            iwp_vector::FieldDataType::Int,
            7u8,
            0u8,
        ));
        let mut line = ShapefileGeometry::new(ShapeType::PolyLine);
        line.add_part(&[Point2D::new(1000.0, -2000.0), Point2D::new(1010.0, -1990.0)]);
        lines.add_record(line).unwrap();
        lines.attributes.add_record(vec![FieldData::Int(1)], false);
        lines.write().unwrap();

        let mut configs = configs(input_dir.path(), output_dir.path());
        let summary = extract_network(&configs, false).unwrap();
        assert_eq!(summary.tiles_processed, 3);
        assert_eq!(summary.succeeded.len(), 2);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, "tile_02");
        assert_eq!(summary.succeeded[0].tile.name, "tile_01");
        assert_eq!(summary.succeeded[1].tile.name, "tile_03");

        // the same outcome, in the same order, from worker threads
        let threaded_dir = tempfile::tempdir().unwrap();
        configs.output_dir = threaded_dir.path().to_path_buf();
        configs.max_procs = 2;
        let threaded = extract_network(&configs, false).unwrap();
        assert_eq!(threaded.failed.len(), 1);
        let names: Vec<String> = threaded.succeeded.iter().map(|o| o.tile.name.clone()).collect();
        assert_eq!(names, vec!["tile_01".to_string(), "tile_03".to_string()]);
        assert_eq!(threaded.succeeded[0].num_lines, summary.succeeded[0].num_lines);
    }

    #[test]
    fn test_tiles_with_the_same_name_are_not_overwritten() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        write_tile(input_dir.path(), "tile-07");
        write_tile(input_dir.path(), "tile_07");
        let configs = configs(input_dir.path(), output_dir.path());

        let summary = extract_network(&configs, false).unwrap();
        assert_eq!(summary.tiles_processed, 2);
        assert_eq!(summary.succeeded.len(), 1);
        assert_eq!(summary.succeeded[0].tile.name, "tile_07");
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, "tile_07");
        assert!(summary.failed[0].1.contains("tile_07.shp"));
        assert!(summary.failed[0].1.contains("tile-07.shp"));
        // one network only
        assert_eq!(count_files(output_dir.path()), 4);
    }

    #[test]
    fn test_nearby_polygons_form_one_network() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        write_tile(input_dir.path(), "tile_10");
        let configs = configs(input_dir.path(), output_dir.path());
        let tile = TileId::from_stem("tile_10", &configs.image_suffix);
        let outcome = extract_tile(&tile, &input_dir.path().join("tile_10.shp"), &configs, false)
            .unwrap();
        let network = Shapefile::read(&outcome.network_file.to_string_lossy()).unwrap();

        // group lines sharing a vertex
        let keys: Vec<Vec<(i64, i64)>> = network
            .records
            .iter()
            .map(|r| {
                r.points
                    .iter()
                    .map(|p| ((p.x * 2.0).round() as i64, (p.y * 2.0).round() as i64))
                    .collect()
            })
            .collect();
        let mut group: Vec<usize> = (0..keys.len()).collect();
        let mut changed = true;
        while changed {
            changed = false;
            for i in 0..keys.len() {
                for j in 0..keys.len() {
                    if group[j] < group[i] && keys[i].iter().any(|k| keys[j].contains(k)) {
                        group[i] = group[j];
                        changed = true;
                    }
                }
            }
        }
        assert!(group.iter().all(|&g| g == 0));
    }
}
