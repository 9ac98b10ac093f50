/*
This code is part of the IWP trough network tools.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use crate::tools::trough_network::{NetworkError, Result as NetworkResult};
use crate::tools::*;
use iwp_common::structures::Point2D;
use iwp_common::utils::get_formatted_elapsed_time;
use iwp_raster::*;
use iwp_vector::{FieldData, ShapeType, Shapefile};
use std::f64;
use std::io::Error;
use std::time::Instant;
use tracing::warn;

/// This tool burns the polygons of a vector file into a new raster. The grid
/// takes its north-west corner from the polygons' bounding box and covers
/// the box with square cells of `--cell_size`; a cell receives a polygon's
/// value when the cell centre lies inside the polygon, with holes honoured
/// (even-odd rule over all of the record's rings). Cells covered by no
/// polygon are set to zero. The value burned is read from `--field`; when
/// the field is not in the attribute table, the record number (FID) is
/// used instead. Later records overwrite earlier ones where they overlap.
///
/// The output raster carries the polygons' coordinate reference system.
///
/// # See Also
/// `PolygonAnnulusBuffer`, `LineThinning`
pub struct VectorPolygonsToRaster {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl VectorPolygonsToRaster {
    /// public constructor
    pub fn new() -> VectorPolygonsToRaster {
        let name = "VectorPolygonsToRaster".to_string();
        let toolbox = "Data Tools".to_string();
        let description = "Converts a vector containing polygons into a raster.".to_string();

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
            name: "Field Name".to_owned(),
            flags: vec!["--field".to_owned()],
            description: "Input field name in attribute table.".to_owned(),
            parameter_type: ParameterType::VectorAttributeField(
                AttributeType::Number,
                "--input".to_string(),
            ),
            default_value: Some("Value".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Output Raster File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output raster file.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Cell Size".to_owned(),
            flags: vec!["--cell_size".to_owned()],
            description: "Output raster cell size, in map units.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("0.5".to_owned()),
            optional: true,
        });

        let usage = example_usage(
            &name,
            "-i=iwp_buffer.shp --field=Value -o=iwp_buffer.asc --cell_size=0.5",
        );

        VectorPolygonsToRaster {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl IwpTool for VectorPolygonsToRaster {
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
        let field_name = args
            .get(&["-field"])
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| "Value".to_string());
        let cell_size = args.get_f64(&["-cell_size"])?.unwrap_or(0.5);

        if verbose {
            print_welcome(&self.get_tool_name());
            println!("Reading data...")
        };
        let vector_data = Shapefile::read(&input_file)?;

        let start = Instant::now();

        if verbose && vector_data.attributes.get_field_num(&field_name).is_none() {
            println!("Warning: Attribute not found in table. FID will be used instead.");
        }

        let mut output = rasterize_polygons(&vector_data, &field_name, cell_size, &output_file)?;

        let elapsed_time = get_formatted_elapsed_time(start);
        if verbose {
            println!(
                "Output grid: {} rows x {} columns",
                output.configs.rows, output.configs.columns
            );
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

/// Burns the polygon records of `vector_data` into a new in-memory raster
/// named `file_name`. See `VectorPolygonsToRaster` for the grid layout.
/// The data type is U8 when every burn value is a whole number below 255,
/// and I32 or F32 otherwise.
pub fn rasterize_polygons(
    vector_data: &Shapefile,
    field_name: &str,
    cell_size: f64,
    file_name: &str,
) -> NetworkResult<Raster> {
    if vector_data.header.shape_type.base_shape_type() != ShapeType::Polygon {
        return Err(NetworkError::InvalidInput(
            "The input vector data must be of polygon base shape type.".to_string(),
        ));
    }
    if !(cell_size > 0f64) {
        return Err(NetworkError::InvalidInput(format!(
            "The cell size must be greater than zero ({}).",
            cell_size
        )));
    }

    let extent = vector_data.get_bounding_box();
    if vector_data.num_records == 0 || extent.is_empty() {
        return Err(NetworkError::NoFeatures(vector_data.get_short_filename()));
    }

    // get the attribute data
    let use_fid = vector_data.attributes.get_field_num(field_name).is_none();
    let mut attribute_data: Vec<Option<f64>> = Vec::with_capacity(vector_data.num_records);
    for record_num in 0..vector_data.num_records {
        let value = if use_fid {
            Some((record_num + 1) as f64)
        } else {
            match vector_data.attributes.get_value(record_num, field_name) {
                FieldData::Int(val) => Some(val as f64),
                FieldData::Real(val) => Some(val),
                FieldData::Null => None,
                other => {
                    return Err(NetworkError::InvalidInput(format!(
                        "Field {} holds the non-numeric value '{}'.",
                        field_name,
                        other.get_as_string()
                    )))
                }
            }
        };
        if value.is_none() {
            warn!(
                "{}: feature {} has no {} value and was not burned",
                vector_data.get_short_filename(),
                record_num + 1,
                field_name
            );
        }
        attribute_data.push(value);
    }

    let burn_values = attribute_data.iter().flatten();
    let all_whole = burn_values.clone().all(|v| v.fract() == 0f64);
    let (data_type, nodata) = if all_whole && burn_values.clone().all(|&v| v >= 0f64 && v < 255f64)
    {
        (DataType::U8, 255f64)
    } else if all_whole {
        (DataType::I32, -32768f64)
    } else {
        (DataType::F32, -32768f64)
    };

    // base the output raster on the cell_size and the
    // extent of the input vector.
    let west = extent.min_x;
    let north = extent.max_y;
    let rows = (((north - extent.min_y) / cell_size).ceil() as usize).max(1);
    let columns = (((extent.max_x - west) / cell_size).ceil() as usize).max(1);

    let mut configs = RasterConfigs {
        ..Default::default()
    };
    configs.rows = rows;
    configs.columns = columns;
    configs.north = north;
    configs.south = north - rows as f64 * cell_size;
    configs.east = west + columns as f64 * cell_size;
    configs.west = west;
    configs.resolution_x = cell_size;
    configs.resolution_y = cell_size;
    configs.nodata = nodata;
    configs.data_type = data_type;
    configs.photometric_interp = if use_fid {
        PhotometricInterpretation::Categorical
    } else {
        PhotometricInterpretation::Continuous
    };
    if !vector_data.projection.trim().is_empty() {
        configs.projection = vector_data.projection.clone();
        configs.coordinate_ref_system_wkt = vector_data.projection.clone();
    }

    let mut output = Raster::initialize_using_config(file_name, &configs);
    output.reinitialize_values(0f64);

    let rows = rows as isize;
    let columns = columns as isize;
    let raster_bb = output.get_bounding_box();
    for (record, value) in vector_data.records.iter().zip(attribute_data.iter()) {
        let value = match value {
            Some(v) => *v,
            None => continue,
        };
        let rec_bb = record.get_bounding_box();
        if record.num_points == 0 || !rec_bb.overlaps(raster_bb) {
            continue;
        }
        let starting_row = output.get_row_from_y(rec_bb.max_y).clamp(0, rows - 1);
        let ending_row = output.get_row_from_y(rec_bb.min_y).clamp(0, rows - 1);
        let starting_col = output.get_column_from_x(rec_bb.min_x).clamp(0, columns - 1);
        let ending_col = output.get_column_from_x(rec_bb.max_x).clamp(0, columns - 1);
        for r in starting_row..=ending_row {
            let y = output.get_y_from_row(r);
            for c in starting_col..=ending_col {
                let x = output.get_x_from_column(c);
                if record.is_point_within_polygon(&Point2D::new(x, y)) {
                    output.set_value(r, c, value);
                }
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
mod test {
    use super::rasterize_polygons;
    use iwp_common::structures::Point2D;
    use iwp_raster::DataType;
    use iwp_vector::*;

    const WKT: &str = "PROJCS[\"WGS 84 / NSIDC Sea Ice Polar Stereographic North\"]";

    fn ring(x0: f64, y0: f64, side: f64, clockwise: bool) -> Vec<Point2D> {
        let mut r = vec![
            Point2D::new(x0, y0),
            Point2D::new(x0, y0 + side),
            Point2D::new(x0 + side, y0 + side),
            Point2D::new(x0 + side, y0),
            Point2D::new(x0, y0),
        ];
        if !clockwise {
            r.reverse();
        }
        r
    }

    fn layer(with_value: bool) -> Shapefile {
        let mut sf = Shapefile::new("layer.shp", ShapeType::Polygon).unwrap();
        sf.projection = WKT.to_string();
        let mut donut = ShapefileGeometry::new(ShapeType::Polygon);
        donut.add_part(&ring(0.0, 0.0, 10.0, true));
        donut.add_part(&ring(4.0, 4.0, 2.0, false));
        sf.add_record(donut).unwrap();
        let mut block = ShapefileGeometry::new(ShapeType::Polygon);
        block.add_part(&ring(12.0, 0.0, 3.2, true));
        sf.add_record(block).unwrap();
        if with_value {
            sf.attributes
                .add_field(&AttributeField::new("Value", FieldDataType::Int, 3u8, 0u8));
            sf.attributes.add_record(vec![FieldData::Int(1)], false);
            sf.attributes.add_record(vec![FieldData::Int(1)], false);
        }
        sf
    }

    #[test]
    fn test_grid_extent_and_burn() {
        let raster = rasterize_polygons(&layer(true), "Value", 0.5, "burn.asc").unwrap();
        assert_eq!(raster.configs.west, 0.0);
        assert_eq!(raster.configs.north, 10.0);
        assert_eq!(raster.configs.columns, 31); // ceil(15.2 / 0.5)
        assert_eq!(raster.configs.rows, 20);
        assert_eq!(raster.configs.east, 15.5);
        assert_eq!(raster.configs.data_type, DataType::U8);
        assert_eq!(raster.configs.coordinate_ref_system_wkt, WKT);

        // the donut burns 100 - 4 square map units, the block the cells whose
        // centres fall in [12, 15.2] x [0, 3.2]: 6 columns x 6 rows
        assert_eq!(raster.num_foreground_cells(), 384 + 36);
        assert_eq!(raster.get_value(0, 0), 1.0);
        assert_eq!(raster.get_value(10, 10), 0.0); // inside the hole
        assert_eq!(raster.get_value(19, 21), 0.0); // between the polygons
        assert_eq!(raster.get_value(19, 25), 1.0);
    }

    #[test]
    fn test_fid_when_field_is_missing() {
        let raster = rasterize_polygons(&layer(false), "Value", 1.0, "fid.asc").unwrap();
        assert_eq!(raster.get_value(0, 0), 1.0);
        assert_eq!(raster.get_value(8, 13), 2.0);
    }

    #[test]
    fn test_deterministic() {
        let a = rasterize_polygons(&layer(true), "Value", 0.5, "a.asc").unwrap();
        let b = rasterize_polygons(&layer(true), "Value", 0.5, "b.asc").unwrap();
        for row in 0..a.configs.rows as isize {
            assert_eq!(a.get_row_data(row), b.get_row_data(row));
        }
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(rasterize_polygons(&layer(true), "Value", 0.0, "x.asc").is_err());
        let lines = Shapefile::new("lines.shp", ShapeType::PolyLine).unwrap();
        assert!(rasterize_polygons(&lines, "Value", 0.5, "x.asc").is_err());
        let empty = Shapefile::new("empty.shp", ShapeType::Polygon).unwrap();
        assert!(rasterize_polygons(&empty, "Value", 0.5, "x.asc").is_err());
    }
}
