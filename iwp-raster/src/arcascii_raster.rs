use super::*;
use std::f64;
use std::fs;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

fn parse_header_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, Error> {
    value.trim().parse::<T>().map_err(|_| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Could not parse ArcAscii header entry {} '{}'.", key, value),
        )
    })
}

/// The `.prj` sidecar shares the raster's file stem.
pub(crate) fn prj_file_name(file_name: &str) -> PathBuf {
    Path::new(file_name).with_extension("prj")
}

pub fn read_arcascii(
    file_name: &String,
    configs: &mut RasterConfigs,
    data: &mut Vec<f64>,
) -> Result<(), Error> {
    let f = File::open(file_name)?;
    let f = BufReader::new(f);

    let mut xllcenter: f64 = f64::NEG_INFINITY;
    let mut yllcenter: f64 = f64::NEG_INFINITY;
    let mut xllcorner: f64 = f64::NEG_INFINITY;
    let mut yllcorner: f64 = f64::NEG_INFINITY;
    for line in f.lines() {
        let line = line?;
        let vec: Vec<&str> = line.split_whitespace().collect();
        if vec.is_empty() {
            continue;
        }
        let key = vec[0].to_lowercase();
        let value = vec[vec.len() - 1];
        if key == "nrows" {
            configs.rows = parse_header_value::<f64>(&key, value)? as usize;
        } else if key == "ncols" {
            configs.columns = parse_header_value::<f64>(&key, value)? as usize;
        } else if key == "xllcorner" {
            xllcorner = parse_header_value(&key, value)?;
        } else if key == "yllcorner" {
            yllcorner = parse_header_value(&key, value)?;
        } else if key == "xllcenter" {
            xllcenter = parse_header_value(&key, value)?;
        } else if key == "yllcenter" {
            yllcenter = parse_header_value(&key, value)?;
        } else if key == "cellsize" {
            configs.resolution_x = parse_header_value(&key, value)?;
            configs.resolution_y = configs.resolution_x;
        } else if key == "nodata_value" {
            configs.data_type = if value.contains('.') {
                DataType::F32
            } else {
                DataType::I32
            };
            configs.nodata = parse_header_value(&key, value)?;
        } else {
            // it's a data line
            if data.is_empty() {
                data.reserve(configs.rows * configs.columns);
            }
            for val in vec {
                data.push(parse_header_value("data value", val)?);
            }
        }
    }

    if configs.rows == 0 || configs.columns == 0 || !(configs.resolution_x > 0f64) {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("{} is missing NROWS, NCOLS, or CELLSIZE.", file_name),
        ));
    }

    // set the North, East, South, and West coordinates
    if xllcorner != f64::NEG_INFINITY && yllcorner != f64::NEG_INFINITY {
        configs.west = xllcorner;
        configs.south = yllcorner;
    } else if xllcenter != f64::NEG_INFINITY && yllcenter != f64::NEG_INFINITY {
        configs.west = xllcenter - (0.5 * configs.resolution_x);
        configs.south = yllcenter - (0.5 * configs.resolution_y);
    } else {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("{} has no lower-left corner or centre coordinates.", file_name),
        ));
    }
    configs.east = configs.west + (configs.columns as f64) * configs.resolution_x;
    configs.north = configs.south + (configs.rows as f64) * configs.resolution_y;

    configs.photometric_interp = PhotometricInterpretation::Continuous;

    let prj_file = prj_file_name(file_name);
    if prj_file.exists() {
        let wkt = fs::read_to_string(&prj_file)?.trim().to_string();
        if !wkt.is_empty() {
            configs.projection = wkt.clone();
            configs.coordinate_ref_system_wkt = wkt;
        }
    }

    Ok(())
}

pub fn write_arcascii<'a>(r: &'a mut Raster) -> Result<(), Error> {
    {
        let f = File::create(&(r.file_name))?;
        let mut writer = BufWriter::new(f);

        writer.write_all(format!("NCOLS {}\n", r.configs.columns).as_bytes())?;
        writer.write_all(format!("NROWS {}\n", r.configs.rows).as_bytes())?;
        writer.write_all(format!("XLLCORNER {}\n", r.configs.west).as_bytes())?;
        writer.write_all(format!("YLLCORNER {}\n", r.configs.south).as_bytes())?;
        writer.write_all(
            format!(
                "CELLSIZE {}\n",
                (r.configs.resolution_x + r.configs.resolution_y) / 2.0
            )
            .as_bytes(),
        )?;

        // integer grids are written without decimals
        let precision = if r.configs.data_type.is_integer() { 0 } else { 2 };
        writer.write_all(
            format!("NODATA_VALUE {:.*}\n", precision, r.configs.nodata).as_bytes(),
        )?;

        let mut s2 = String::new();
        for row in 0..r.configs.rows {
            s2.clear();
            let start = row * r.configs.columns;
            for col in 0..r.configs.columns {
                if col > 0 {
                    s2.push(' ');
                }
                s2 += &format!("{:.*}", precision, r.data[start + col]);
            }
            s2.push('\n');
            writer.write_all(s2.as_bytes())?;
        }

        writer.flush()?;
    }

    let wkt = r.configs.coordinate_ref_system_wkt.trim();
    if !wkt.is_empty() && wkt != "not specified" {
        fs::write(prj_file_name(&r.file_name), wkt)?;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use crate::{DataType, Raster, RasterConfigs};
    use std::fs;

    const WKT: &str = "PROJCS[\"WGS 84 / NSIDC Sea Ice Polar Stereographic North\"]";

    #[test]
    fn test_write_then_read_binary_grid() {
        let dir = tempfile::tempdir().unwrap();
        let file_name = dir.path().join("tile_skeleton.asc").to_string_lossy().to_string();

        let mut configs = RasterConfigs::default();
        configs.rows = 2;
        configs.columns = 3;
        configs.west = 1000.0;
        configs.south = -2000.0;
        configs.east = 1001.5;
        configs.north = -1999.0;
        configs.resolution_x = 0.5;
        configs.resolution_y = 0.5;
        configs.nodata = 255.0;
        configs.data_type = DataType::U8;
        configs.coordinate_ref_system_wkt = WKT.to_string();

        let mut output = Raster::initialize_using_config(&file_name, &configs);
        output.reinitialize_values(0.0);
        output.set_value(0, 1, 1.0);
        output.set_value(1, 2, 1.0);
        output.write().unwrap();

        let text = fs::read_to_string(&file_name).unwrap();
        assert!(text.contains("NODATA_VALUE 255\n"));
        assert!(text.ends_with("0 1 0\n0 0 1\n"));

        let input = Raster::new(&file_name, "r").unwrap();
        assert_eq!(input.configs.rows, 2);
        assert_eq!(input.configs.columns, 3);
        assert_eq!(input.configs.north, -1999.0);
        assert_eq!(input.configs.east, 1001.5);
        assert_eq!(input.get_value(0, 1), 1.0);
        assert_eq!(input.get_value(1, 2), 1.0);
        assert_eq!(input.get_value(1, 0), 0.0);
        assert_eq!(input.configs.coordinate_ref_system_wkt, WKT);
    }

    #[test]
    fn test_read_cell_centre_header() {
        let dir = tempfile::tempdir().unwrap();
        let file_name = dir.path().join("centre.asc");
        fs::write(
            &file_name,
            "ncols 2\nnrows 1\nxllcenter 10.5\nyllcenter 20.5\ncellsize 1\nNODATA_value -9999\n3 -9999\n",
        )
        .unwrap();
        let input = Raster::new(&file_name.to_string_lossy(), "r").unwrap();
        assert_eq!(input.configs.west, 10.0);
        assert_eq!(input.configs.north, 21.0);
        assert_eq!(input.configs.coordinate_ref_system_wkt, "not specified");
        assert_eq!(input.configs.maximum, 3.0);
    }

    #[test]
    fn test_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let short = dir.path().join("short.asc");
        fs::write(
            &short,
            "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\nnodata_value -9999\n1 1\n",
        )
        .unwrap();
        assert!(Raster::new(&short.to_string_lossy(), "r").is_err());

        let garbage = dir.path().join("garbage.asc");
        fs::write(&garbage, "ncols two\n").unwrap();
        assert!(Raster::new(&garbage.to_string_lossy(), "r").is_err());

        let missing = dir.path().join("missing.asc");
        assert!(Raster::new(&missing.to_string_lossy(), "r").is_err());
    }
}
