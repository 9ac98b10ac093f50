/*
This code is part of the IWP trough network tools.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

mod arcascii_raster;

use self::arcascii_raster::*;
use iwp_common::structures::BoundingBox;
use std::default::Default;
use std::f64;
use std::io::Error;
use std::io::ErrorKind;
use std::path::Path;

/// Raster is the grid data structure shared by the rasterizing, thinning,
/// and tracing tools. Data are held in memory as f64 values in row-major
/// order, north row first. Georeferencing is an axis-aligned affine
/// transform given by the grid edges and cell resolution; the cell at
/// (row, column) has its centre at
/// `(west + (column + 0.5) * res_x, north - (row + 0.5) * res_y)`.
///
/// Examples:
///
/// ```no_run
/// use iwp_raster::Raster;
/// # fn main() -> std::io::Result<()> {
/// // Read an existing raster file
/// let input = Raster::new("tile_07_buffer.asc", "r")?;
///
/// // Create a new raster file with the dimensions
/// // and location of an existing file.
/// let mut output = Raster::initialize_using_file("tile_07_skeleton.asc", &input);
/// output.write()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default, Clone, Debug)]
pub struct Raster {
    pub file_name: String,
    pub file_mode: String,
    pub raster_type: RasterType,
    pub configs: RasterConfigs,
    data: Vec<f64>,
}

impl Raster {
    /// Creates an in-memory `Raster` object. The data are either
    /// read from an existing file (`file_name`; `file_mode` is 'r') or
    /// prepared for new file creation (`file_mode` is 'w'). The raster format
    /// is determined by the file extension of `file_name`. The file handle is
    /// released before this function returns.
    pub fn new<'a>(file_name: &'a str, file_mode: &'a str) -> Result<Raster, Error> {
        let fm: String = file_mode.to_lowercase();
        let mut r = Raster {
            file_name: file_name.to_string(),
            file_mode: fm.clone(),
            raster_type: get_raster_type_from_file(file_name),
            ..Default::default()
        };
        if r.file_mode.contains('r') {
            match r.raster_type {
                RasterType::ArcAscii => {
                    read_arcascii(&r.file_name, &mut r.configs, &mut r.data)?;
                    if r.data.len() != r.configs.rows * r.configs.columns {
                        return Err(Error::new(
                            ErrorKind::InvalidData,
                            format!(
                                "{} holds {} values but its header declares {} rows and {} columns.",
                                r.file_name,
                                r.data.len(),
                                r.configs.rows,
                                r.configs.columns
                            ),
                        ));
                    }
                    r.update_min_max();
                    return Ok(r);
                }
                RasterType::Unknown => {
                    return Err(Error::new(
                        ErrorKind::InvalidInput,
                        format!("Unrecognized raster type: {}", file_name),
                    ));
                }
            }
        }
        r.data = vec![r.configs.nodata; r.configs.rows * r.configs.columns];
        Ok(r)
    }

    /// Creates a new in-memory `Raster` object with grid extent and location
    /// based on specified configurations contained within a `RasterConfigs`.
    /// Every cell starts out as nodata.
    pub fn initialize_using_config<'a>(file_name: &'a str, configs: &'a RasterConfigs) -> Raster {
        let new_file_name = if Path::new(file_name).extension().is_some() {
            file_name.to_string()
        } else {
            // no extension provided; default to .asc
            format!("{}.asc", file_name)
        };
        let mut output = Raster {
            file_name: new_file_name.clone(),
            file_mode: "w".to_string(),
            raster_type: get_raster_type_from_file(&new_file_name),
            configs: configs.clone(),
            ..Default::default()
        };
        output.configs.minimum = f64::INFINITY;
        output.configs.maximum = f64::NEG_INFINITY;
        output.data = vec![output.configs.nodata; output.configs.rows * output.configs.columns];
        output
    }

    /// Creates a new in-memory `Raster` sharing the grid, data type, and
    /// coordinate reference system of `input`.
    pub fn initialize_using_file<'a>(file_name: &'a str, input: &'a Raster) -> Raster {
        Raster::initialize_using_config(file_name, &input.configs)
    }

    pub fn get_short_filename(&self) -> String {
        match Path::new(&self.file_name).file_stem() {
            Some(stem) => stem.to_string_lossy().to_string(),
            None => self.file_name.clone(),
        }
    }

    /// Returns the value contained within a grid cell specified
    /// by `row` and `column`, or nodata for cells off the grid.
    pub fn get_value(&self, row: isize, column: isize) -> f64 {
        if column >= 0
            && row >= 0
            && column < self.configs.columns as isize
            && row < self.configs.rows as isize
        {
            return self.data[row as usize * self.configs.columns + column as usize];
        }
        self.configs.nodata
    }

    pub fn set_value(&mut self, row: isize, column: isize, value: f64) {
        if column >= 0 && row >= 0 {
            let c: usize = column as usize;
            let r: usize = row as usize;
            if c < self.configs.columns && r < self.configs.rows {
                self.data[r * self.configs.columns + c] = value;
            }
        }
    }

    pub fn get_row_data(&self, row: isize) -> Vec<f64> {
        if row < 0 || row as usize >= self.configs.rows {
            return vec![self.configs.nodata; self.configs.columns];
        }
        let start = row as usize * self.configs.columns;
        self.data[start..start + self.configs.columns].to_vec()
    }

    pub fn reinitialize_values(&mut self, value: f64) {
        self.data = vec![value; self.configs.rows * self.configs.columns];
    }

    pub fn get_x_from_column(&self, column: isize) -> f64 {
        self.configs.west
            + self.configs.resolution_x / 2f64
            + column as f64 * self.configs.resolution_x
    }

    pub fn get_y_from_row(&self, row: isize) -> f64 {
        self.configs.north
            - self.configs.resolution_y / 2f64
            - row as f64 * self.configs.resolution_y
    }

    pub fn get_column_from_x(&self, x: f64) -> isize {
        ((x - self.configs.west) / self.configs.resolution_x).floor() as isize
    }

    pub fn get_row_from_y(&self, y: f64) -> isize {
        ((self.configs.north - y) / self.configs.resolution_y).floor() as isize
    }

    pub fn update_min_max(&mut self) {
        self.configs.minimum = f64::INFINITY;
        self.configs.maximum = f64::NEG_INFINITY;
        let nodata = self.configs.nodata;
        for &val in self.data.iter().filter(|&&v| v != nodata) {
            if val < self.configs.minimum {
                self.configs.minimum = val;
            }
            if val > self.configs.maximum {
                self.configs.maximum = val;
            }
        }
    }

    pub fn num_cells(&self) -> usize {
        self.configs.rows * self.configs.columns
    }

    /// Counts cells holding a value greater than zero that is not nodata.
    pub fn num_foreground_cells(&self) -> usize {
        let nodata = self.configs.nodata;
        self.data.iter().filter(|&&v| v != nodata && v > 0f64).count()
    }

    /// Saves the raster, with a `.prj` sidecar when a coordinate reference
    /// system is known. The file handles are closed before returning,
    /// whether or not writing succeeded.
    pub fn write(&mut self) -> Result<(), Error> {
        if !self.file_mode.contains('w') {
            return Err(Error::new(
                ErrorKind::Other,
                "Cannot write raster that is not created in write mode ('w').",
            ));
        }
        match self.raster_type {
            RasterType::ArcAscii => {
                self.update_min_max();
                write_arcascii(self)
            }
            RasterType::Unknown => Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Unrecognized raster type: {}", self.file_name),
            )),
        }
    }

    pub fn get_bounding_box(&self) -> BoundingBox {
        BoundingBox::new(
            self.configs.west,
            self.configs.east,
            self.configs.south,
            self.configs.north,
        )
    }

    /// A heuristic check for unprojected (lat/long) grids: the extent fits
    /// within geographic bounds and the WKT, when present, is not projected.
    pub fn is_in_geographic_coordinates(&self) -> bool {
        if self.configs.west < -180f64
            || self.configs.east > 180f64
            || self.configs.north > 90f64
            || self.configs.south < -90f64
        {
            return false;
        }
        let wkt = self.configs.coordinate_ref_system_wkt.to_lowercase();
        if wkt.contains("not specified") {
            return false;
        }
        !wkt.contains("projcs[")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RasterConfigs {
    pub title: String,
    pub rows: usize,
    pub columns: usize,
    pub nodata: f64,
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub resolution_x: f64,
    pub resolution_y: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub projection: String,
    pub photometric_interp: PhotometricInterpretation,
    pub data_type: DataType,
    pub coordinate_ref_system_wkt: String,
}

impl Default for RasterConfigs {
    fn default() -> RasterConfigs {
        RasterConfigs {
            title: String::from(""),
            rows: 0,
            columns: 0,
            nodata: -32768.0,
            north: f64::NEG_INFINITY,
            south: f64::INFINITY,
            east: f64::NEG_INFINITY,
            west: f64::INFINITY,
            resolution_x: f64::NEG_INFINITY,
            resolution_y: f64::NEG_INFINITY,
            minimum: f64::INFINITY,
            maximum: f64::NEG_INFINITY,
            projection: "not specified".to_string(),
            photometric_interp: PhotometricInterpretation::Unknown,
            data_type: DataType::Unknown,
            coordinate_ref_system_wkt: "not specified".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RasterType {
    Unknown,
    ArcAscii,
}

impl Default for RasterType {
    fn default() -> RasterType {
        RasterType::Unknown
    }
}

fn get_raster_type_from_file(file_name: &str) -> RasterType {
    let extension: String = match Path::new(file_name).extension() {
        Some(n) => n.to_string_lossy().to_lowercase(),
        None => "".to_string(),
    };
    if extension == "asc" || extension == "txt" {
        return RasterType::ArcAscii;
    }
    RasterType::Unknown
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DataType {
    F64,
    F32,
    I32,
    I16,
    U16,
    U8,
    Unknown,
}

impl Default for DataType {
    fn default() -> DataType {
        DataType::Unknown
    }
}

impl DataType {
    pub fn is_integer(&self) -> bool {
        matches!(
            *self,
            DataType::I32 | DataType::I16 | DataType::U16 | DataType::U8
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PhotometricInterpretation {
    Continuous,
    Categorical,
    Boolean,
    Unknown,
}

impl Default for PhotometricInterpretation {
    fn default() -> PhotometricInterpretation {
        PhotometricInterpretation::Unknown
    }
}

#[cfg(test)]
mod test {
    use super::{DataType, Raster, RasterConfigs, RasterType};

    fn grid() -> RasterConfigs {
        let mut configs = RasterConfigs::default();
        configs.rows = 4;
        configs.columns = 6;
        configs.west = 100.0;
        configs.north = 50.0;
        configs.resolution_x = 0.5;
        configs.resolution_y = 0.5;
        configs.east = 103.0;
        configs.south = 48.0;
        configs.nodata = 255.0;
        configs.data_type = DataType::U8;
        configs
    }

    #[test]
    fn test_cell_centre_transform() {
        let r = Raster::initialize_using_config("grid.asc", &grid());
        assert_eq!(r.get_x_from_column(0), 100.25);
        assert_eq!(r.get_y_from_row(0), 49.75);
        assert_eq!(r.get_x_from_column(5), 102.75);
        assert_eq!(r.get_y_from_row(3), 48.25);
        assert_eq!(r.get_column_from_x(102.75), 5);
        assert_eq!(r.get_row_from_y(48.25), 3);
        assert_eq!(r.get_row_from_y(r.get_y_from_row(2)), 2);
    }

    #[test]
    fn test_off_grid_values_are_nodata() {
        let mut r = Raster::initialize_using_config("grid", &grid());
        assert_eq!(r.file_name, "grid.asc");
        assert_eq!(r.raster_type, RasterType::ArcAscii);
        assert_eq!(r.get_value(0, 0), 255.0);
        r.reinitialize_values(0.0);
        r.set_value(1, 2, 1.0);
        r.set_value(-1, 2, 1.0);
        r.set_value(1, 6, 1.0);
        assert_eq!(r.get_value(1, 2), 1.0);
        assert_eq!(r.get_value(4, 0), 255.0);
        assert_eq!(r.num_foreground_cells(), 1);
        assert_eq!(r.get_row_data(1), vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unsupported_format() {
        let mut r = Raster::initialize_using_config("grid.tif", &grid());
        assert_eq!(r.raster_type, RasterType::Unknown);
        assert!(r.write().is_err());
        assert!(Raster::new("grid.tif", "r").is_err());
    }
}
