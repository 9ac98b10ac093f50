/*
This code is part of the IWP trough network tools.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::error::Result as NetworkResult;
use super::list_shapefiles;
use crate::tools::*;
use iwp_common::utils::get_formatted_elapsed_time;
use iwp_vector::{ShapeType, Shapefile, ShapefileGeometry};
use std::fmt;
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::Path;
use std::time::Instant;
use tracing::{error, warn};

/// This tool measures the trough networks in a directory of polyline shapefiles. The
/// length of every part of every record is summed, in the map units of each file, and
/// reported in kilometres per file along with the total over all files. The report
/// can also be saved as JSON with `--report`.
///
/// # See Also
/// `ExtractTroughNetwork`, `ClipNetworkToFootprints`
pub struct TroughNetworkLength {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl TroughNetworkLength {
    pub fn new() -> TroughNetworkLength {
        // public constructor
        let name = "TroughNetworkLength".to_string();
        let toolbox = "Trough Network Tools".to_string();
        let description =
            "Reports the length, in kilometres, of the trough networks in a directory.".to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input Directory".to_owned(),
            flags: vec!["--input_dir".to_owned()],
            description: "Directory of polyline shapefiles.".to_owned(),
            parameter_type: ParameterType::Directory,
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output Report File".to_owned(),
            flags: vec!["--report".to_owned()],
            description: "Optional JSON file receiving the lengths.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Text),
            default_value: None,
            optional: true,
        });

        let usage = example_usage(&name, "--input_dir=clipped --report=lengths.json");

        TroughNetworkLength {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl IwpTool for TroughNetworkLength {
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
        let report_file = args.get_file(&["-report"], working_directory);

        if verbose {
            print_welcome(&self.get_tool_name());
        }

        let start = Instant::now();

        let report = measure_directory(Path::new(&input_dir), verbose)?;
        println!("{}", report);

        if let Some(f) = report_file {
            let json = serde_json::to_string_pretty(&report)?;
            fs::write(&f, json)?;
            if verbose {
                println!("Report written to {}", f);
            }
        }

        let elapsed_time = get_formatted_elapsed_time(start);
        if verbose {
            println!("{}", &format!("Elapsed Time (including I/O): {}", elapsed_time));
        }

        if !report.failed.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("{} files could not be measured.", report.failed.len()),
            ));
        }
        Ok(())
    }
}

/// Per-file network lengths, in kilometres, and their total.
#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct LengthReport {
    pub entries: Vec<(String, f64)>,
    pub total_km: f64,
    /// Files that could not be read, with the reason.
    pub failed: Vec<(String, String)>,
}

impl fmt::Display for LengthReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Summary:")?;
        for (i, (_, km)) in self.entries.iter().enumerate() {
            writeln!(f, "Polyline {}: {:.2} km", i + 1, km)?;
        }
        write!(f, "Total length of all polylines: {:.2} km", self.total_km)?;
        for (file_name, reason) in &self.failed {
            write!(f, "\nNot measured: {} ({})", file_name, reason)?;
        }
        Ok(())
    }
}

/// Length of a polyline record in map units, summed over its parts.
pub fn polyline_length(record: &ShapefileGeometry) -> f64 {
    record.get_line_length()
}

/// Measures every polyline shapefile in `dir`, in file name order. Files
/// of other shape types are skipped with a warning. A file that cannot be
/// read is logged and listed in `failed`; it adds nothing to the total.
pub fn measure_directory(dir: &Path, verbose: bool) -> NetworkResult<LengthReport> {
    let mut report = LengthReport::default();
    for file in list_shapefiles(dir)? {
        let file_name = file
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        let lines = match Shapefile::read(&file.to_string_lossy()) {
            Ok(lines) => lines,
            Err(e) => {
                error!("{} could not be read: {}", file_name, e);
                report.failed.push((file_name, e.to_string()));
                continue;
            }
        };
        if lines.header.shape_type.base_shape_type() != ShapeType::PolyLine {
            warn!(
                "{} is a {} file and was not measured",
                file_name, lines.header.shape_type
            );
            continue;
        }
        let km = lines.records.iter().map(polyline_length).sum::<f64>() / 1000f64;
        if verbose {
            println!("Length of {}: {:.2} km", file_name, km);
        }
        report.entries.push((file_name, km));
    }
    report.total_km = report.entries.iter().map(|(_, km)| km).sum();
    Ok(report)
}
