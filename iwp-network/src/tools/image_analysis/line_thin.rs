/*
This code is part of the IWP trough network tools.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT

NOTE: This algorithm can't easily be parallelized because the output raster must be read
and written to during the same loop.
*/

use crate::tools::*;
use iwp_common::utils::get_formatted_elapsed_time;
use iwp_raster::*;
use std::f64;
use std::io::Error;
use std::time::Instant;

/// This image processing tool reduces all polygons in a Boolean raster image to their single-cell wide skeletons.
/// This operation is sometimes called line thinning or skeletonization. The input image need not be truly
/// Boolean (i.e. contain only 1's and 0's). All non-zero, positive values are considered to be foreground pixels while
/// all other cells, including nodata, are considered background pixels.
///
/// The output is an 8-bit raster of 1's (skeleton) and 0's (background) on the input grid. Thinning never adds
/// foreground, never splits or removes a connected feature, and thinning an already thinned image changes nothing.
///
/// # See Also
/// `RasterToVectorLines`
pub struct LineThinning {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl LineThinning {
    pub fn new() -> LineThinning {
        // public constructor
        let name = "LineThinning".to_string();
        let toolbox = "Image Processing Tools".to_string();
        let description = "Performs line thinning a on Boolean raster image.".to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input File".to_owned(),
            flags: vec!["-i".to_owned(), "--input".to_owned()],
            description: "Input raster file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output raster file.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        let usage = example_usage(&name, "--input=buffer.asc -o=skeleton.asc");

        LineThinning {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl IwpTool for LineThinning {
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

        if verbose {
            print_welcome(&self.get_tool_name());
            println!("Reading data...");
        }

        let input = Raster::new(&input_file, "r")?;

        let start = Instant::now();

        let mut output = thin_with_progress(&input, &output_file, verbose);

        let elapsed_time = get_formatted_elapsed_time(start);

        if verbose {
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

/// Thins the foreground of `input` to a 1-cell-wide skeleton, returning a
/// new U8 raster named `file_name` on the same grid.
pub fn thin(input: &Raster, file_name: &str) -> Raster {
    thin_with_progress(input, file_name, false)
}

fn thin_with_progress(input: &Raster, file_name: &str, verbose: bool) -> Raster {
    let rows = input.configs.rows as isize;
    let columns = input.configs.columns as isize;
    let nodata = input.configs.nodata;

    let mut output = Raster::initialize_using_file(file_name, input);
    output.configs.data_type = DataType::U8;
    output.configs.nodata = 255f64;
    output.configs.photometric_interp = PhotometricInterpretation::Boolean;
    for row in 0..rows {
        for col in 0..columns {
            let z = input.get_value(row, col);
            let v = if z > 0.0 && z != nodata { 1.0 } else { 0.0 };
            output.set_value(row, col, v);
        }
    }

    let mut progress: usize;
    let mut old_progress: usize = 1;
    let mut did_something = true;
    let mut loop_num = 0;
    let dx = [1, 1, 1, 0, -1, -1, -1, 0];
    let dy = [-1, 0, 1, 1, 1, 0, -1, -1];

    let elements1 = [
        [6, 7, 0, 4, 3, 2],
        [0, 1, 2, 4, 5, 6],
        [2, 3, 4, 6, 7, 0],
        [4, 5, 6, 0, 1, 2],
    ];

    let elements2 = [
        [7, 0, 1, 3, 5],
        [1, 2, 3, 5, 7],
        [3, 4, 5, 7, 1],
        [5, 6, 7, 1, 3],
    ];

    let vals1 = [0f64, 0f64, 0f64, 1f64, 1f64, 1f64];
    let vals2 = [0f64, 0f64, 0f64, 1f64, 1f64];

    let mut neighbours = [0.0; 8];
    while did_something {
        loop_num += 1;
        did_something = false;
        for a in 0..4 {
            for row in 0..rows {
                for col in 0..columns {
                    if output.get_value(row, col) != 1.0 {
                        continue;
                    }
                    // fill the neighbours array; cells off the grid are background
                    for i in 0..8 {
                        neighbours[i] = if output.get_value(row + dy[i], col + dx[i]) == 1.0 {
                            1.0
                        } else {
                            0.0
                        };
                    }

                    let pattern_match = (0..6).all(|i| neighbours[elements1[a][i]] == vals1[i])
                        || (0..5).all(|i| neighbours[elements2[a][i]] == vals2[i]);
                    if pattern_match {
                        output.set_value(row, col, 0.0);
                        did_something = true;
                    }
                }
            }
            if verbose {
                progress = (100.0_f64 * (a + 1) as f64 / 4.0) as usize;
                if progress != old_progress {
                    println!("Loop Number {}: {}%", loop_num, progress);
                    old_progress = progress;
                }
            }
        }
    }

    output
}
