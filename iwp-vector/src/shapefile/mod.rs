/*
This code is part of the IWP trough network tools.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT

Notes: The logic behind working with the ESRI Shapefile format.
*/

pub mod attributes;
pub mod geometry;

use self::attributes::*;
use self::geometry::*;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use chrono::prelude::*;
use iwp_common::structures::{BoundingBox, Point2D};
use iwp_common::utils::{ByteOrderReader, Endianness};
use std::f64;
use std::fmt;
use std::fs;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufWriter, Cursor, Error, ErrorKind};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone)]
pub struct ShapefileHeader {
    file_code: i32,            // BigEndian; value is 9994
    pub file_length: i32,      // BigEndian
    pub version: i32,          // LittleEndian
    pub shape_type: ShapeType, // LittleEndian
    pub x_min: f64,            // LittleEndian
    pub y_min: f64,            // LittleEndian
    pub x_max: f64,            // LittleEndian
    pub y_max: f64,            // LittleEndian
    pub z_min: f64,            // LittleEndian; set to 0f64 if shapeType not z or measured
    pub z_max: f64,            // LittleEndian; set to 0f64 if shapeType not z or measured
    pub m_min: f64,            // LittleEndian; set to 0f64 if shapeType not z or measured
    pub m_max: f64,            // LittleEndian; set to 0f64 if shapeType not z or measured
}

impl fmt::Display for ShapefileHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "file_code: {}\nfile_length: {}\nversion: {}\nshape_type: {}\nx_min: {}\nx_max: {}\ny_min: {}\ny_max: {}",
            self.file_code,
            self.file_length,
            self.version,
            self.shape_type,
            self.x_min,
            self.x_max,
            self.y_min,
            self.y_max
        )
    }
}

/// `Shapefile` is an in-memory ESRI Shapefile: the geometry records of the
/// .shp file, the attribute table of the .dbf file, and the coordinate
/// reference system (WKT) of the .prj file.
///
/// Examples:
///
/// ```no_run
/// use iwp_vector::*;
/// # fn main() -> std::io::Result<()> {
/// // Read a Shapefile from a file.
/// let input = Shapefile::read("tile_07_u16rf3413_pansh.shp")?;
///
/// // Create a new output Shapefile
/// let mut output = Shapefile::initialize_using_file("tile_07_IWP_net.shp", &input, ShapeType::PolyLine, false)?;
///
/// // add attributes
/// let fid = AttributeField::new("FID", FieldDataType::Int, 7u8, 0u8);
/// output.attributes.add_field(&fid);
/// # Ok(())
/// # }
/// ```
#[derive(Default, Clone, Debug)]
pub struct Shapefile {
    pub file_name: String,
    pub file_mode: String,
    pub header: ShapefileHeader,
    pub num_records: usize,
    pub records: Vec<ShapefileGeometry>,
    pub attributes: ShapefileAttributes,
    pub projection: String,
}

/// Returns the paths of the .shp file and its .shx, .dbf, and .prj sidecars.
pub fn shapefile_components(file_name: &str) -> Vec<PathBuf> {
    let path = Path::new(file_name);
    ["shp", "shx", "dbf", "prj"]
        .iter()
        .map(|ext| path.with_extension(ext))
        .collect()
}

fn with_shp_extension(file_name: &str) -> String {
    if Path::new(file_name).extension().is_some() {
        file_name.to_string()
    } else {
        // no extension provided; default to .shp
        format!("{}.shp", file_name)
    }
}

impl Shapefile {
    pub fn read<'a>(file_name: &'a str) -> Result<Shapefile, Error> {
        let mut sf = Shapefile {
            file_name: file_name.to_string(),
            file_mode: "r".to_string(),
            ..Default::default()
        };
        sf.read_file()?;
        Ok(sf)
    }

    pub fn new<'a>(file_name: &'a str, file_type: ShapeType) -> Result<Shapefile, Error> {
        let mut sf = Shapefile {
            file_name: with_shp_extension(file_name),
            file_mode: "w".to_string(),
            ..Default::default()
        };
        sf.header.shape_type = file_type;
        Ok(sf)
    }

    /// Creates a new, empty Shapefile sharing the projection of `other` and,
    /// optionally, its attribute fields.
    pub fn initialize_using_file<'a>(
        file_name: &'a str,
        other: &'a Shapefile,
        shape_type: ShapeType,
        copy_fields: bool,
    ) -> Result<Shapefile, Error> {
        let mut sf = Shapefile::new(file_name, shape_type)?;
        sf.projection = other.projection.clone();
        if copy_fields {
            for field in &other.attributes.fields {
                sf.attributes.add_field(field);
            }
        }
        Ok(sf)
    }

    /// Returns the file stem (e.g. `tile_07_IWP_net` for `/data/tile_07_IWP_net.shp`).
    pub fn get_short_filename(&self) -> String {
        match Path::new(&self.file_name).file_stem() {
            Some(stem) => stem.to_string_lossy().to_string(),
            None => self.file_name.clone(),
        }
    }

    /// Returns the ShapefileGeometry for a specified index, starting at zero.
    pub fn get_record<'a>(&'a self, index: usize) -> Option<&'a ShapefileGeometry> {
        self.records.get(index)
    }

    /// Adds a new ShapefileGeometry. Records must share the file's ShapeType.
    pub fn add_record(&mut self, geometry: ShapefileGeometry) -> Result<(), Error> {
        if self.file_mode == "r" {
            return Err(Error::new(
                ErrorKind::Other,
                "The file was opened in read-only mode.",
            ));
        }
        if geometry.shape_type != self.header.shape_type && geometry.shape_type != ShapeType::Null {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "Attempt to add a {} record to a {} Shapefile.",
                    geometry.shape_type, self.header.shape_type
                ),
            ));
        }
        self.records.push(geometry);
        self.num_records += 1;
        Ok(())
    }

    pub fn get_bounding_box(&self) -> BoundingBox {
        let mut bb = BoundingBox::default();
        for rec in self.records.iter().filter(|r| r.num_points > 0) {
            bb.expand_to(rec.get_bounding_box());
        }
        bb
    }

    fn calculate_extent(&mut self) {
        let bb = self.get_bounding_box();
        if bb.is_empty() {
            self.header.x_min = 0f64;
            self.header.y_min = 0f64;
            self.header.x_max = 0f64;
            self.header.y_max = 0f64;
        } else {
            self.header.x_min = bb.min_x;
            self.header.y_min = bb.min_y;
            self.header.x_max = bb.max_x;
            self.header.y_max = bb.max_y;
        }
    }

    fn read_file(&mut self) -> Result<(), Error> {
        ///////////////////////////////
        // First read the geometries //
        ///////////////////////////////
        let buffer = fs::read(&self.file_name)?;
        let file_size = buffer.len();
        if file_size < 100 {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("{} is too short to be a Shapefile.", self.file_name),
            ));
        }

        // Note: the shapefile format uses mixed endianness, so the reader
        // switches byte order frequently.
        let mut bor = ByteOrderReader::new(Cursor::new(buffer), Endianness::BigEndian)?;
        self.header.file_code = bor.read_i32()?;
        if self.header.file_code != 9994 {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("{} does not carry the Shapefile file code.", self.file_name),
            ));
        }
        bor.seek(24)?;
        self.header.file_length = bor.read_i32()?;

        // the rest of the header is in LittleEndian format
        bor.set_byte_order(Endianness::LittleEndian);
        self.header.version = bor.read_i32()?;
        self.header.shape_type = ShapeType::from_int(bor.read_i32()?)?;
        self.header.x_min = bor.read_f64()?;
        self.header.y_min = bor.read_f64()?;
        self.header.x_max = bor.read_f64()?;
        self.header.y_max = bor.read_f64()?;
        self.header.z_min = bor.read_f64()?;
        self.header.z_max = bor.read_f64()?;
        self.header.m_min = bor.read_f64()?;
        self.header.m_max = bor.read_f64()?;

        // Read the records. Z and M blocks sit at the end of each record's
        // content and are skipped by seeking to the next record header.
        while bor.pos() + 8 <= file_size {
            bor.set_byte_order(Endianness::BigEndian);
            bor.inc_pos(4)?; // record number
            let content_length = bor.read_i32()? as usize * 2; // in bytes
            let record_start = bor.pos();
            bor.set_byte_order(Endianness::LittleEndian);
            let shape_type = ShapeType::from_int(bor.read_i32()?)?;

            let mut sfg = ShapefileGeometry::new(shape_type);
            match shape_type.base_shape_type() {
                ShapeType::Null => {}
                ShapeType::Point => {
                    let p = Point2D::new(bor.read_f64()?, bor.read_f64()?);
                    sfg.add_point(p);
                }
                ShapeType::MultiPoint => {
                    bor.inc_pos(32)?; // bounding box, recalculated from the points
                    let num_points = bor.read_i32()?;
                    for _ in 0..num_points {
                        let p = Point2D::new(bor.read_f64()?, bor.read_f64()?);
                        sfg.add_point(p);
                    }
                }
                _ => {
                    // PolyLine and Polygon
                    bor.inc_pos(32)?;
                    let num_parts = bor.read_i32()?;
                    let num_points = bor.read_i32()?;
                    if num_parts < 0 || num_points < 0 {
                        return Err(Error::new(
                            ErrorKind::InvalidData,
                            format!("Corrupt record found in {}.", self.file_name),
                        ));
                    }
                    let mut parts = Vec::with_capacity(num_parts as usize);
                    for _ in 0..num_parts {
                        parts.push(bor.read_i32()?);
                    }
                    let mut points = Vec::with_capacity(num_points as usize);
                    for _ in 0..num_points {
                        points.push(Point2D::new(bor.read_f64()?, bor.read_f64()?));
                    }
                    for i in 0..parts.len() {
                        let st = (parts[i].max(0) as usize).min(points.len());
                        let end = if i < parts.len() - 1 {
                            (parts[i + 1].max(0) as usize).clamp(st, points.len())
                        } else {
                            points.len()
                        };
                        sfg.add_part(&points[st..end]);
                    }
                }
            }
            self.records.push(sfg);
            bor.seek(record_start + content_length)?;
        }

        self.num_records = self.records.len();

        //////////////////////////////
        // Read the projection file //
        //////////////////////////////
        let prj_file = Path::new(&self.file_name).with_extension("prj");
        if prj_file.exists() {
            self.projection = fs::read_to_string(prj_file)?.trim().to_string();
        }

        ///////////////////////////////
        // Read the attributes table //
        ///////////////////////////////
        let dbf_file = Path::new(&self.file_name).with_extension("dbf");
        if dbf_file.exists() {
            self.read_dbf(&dbf_file)?;
        }

        Ok(())
    }

    fn read_dbf(&mut self, dbf_file: &Path) -> Result<(), Error> {
        let buffer = fs::read(dbf_file)?;
        let mut bor = ByteOrderReader::new(Cursor::new(buffer), Endianness::LittleEndian)?;

        let version = bor.read_u8()?;
        let year = 1900u32 + bor.read_u8()? as u32;
        let month = bor.read_u8()?;
        let day = bor.read_u8()?;
        let num_records = bor.read_u32()?;
        let bytes_in_header = bor.read_u16()?;
        let bytes_in_record = bor.read_u16()?;

        // field descriptors start at byte 32 and end with 0x0D
        bor.seek(32)?;
        let mut fields = vec![];
        while bor.pos() + 32 <= bytes_in_header as usize {
            let first = bor.read_u8()?;
            if first == 0x0D {
                break;
            }
            let mut name = String::from(char::from(first));
            name.push_str(&bor.read_utf8(10)?);
            let name = name.replace(char::from(0), "").trim().to_string();
            let field_type = char::from(bor.read_u8()?);
            bor.inc_pos(4)?;
            let field_length = bor.read_u8()?;
            let decimal_count = bor.read_u8()?;
            bor.inc_pos(14)?; // reserved bytes, work area id, flags
            fields.push(AttributeField {
                name,
                field_type,
                field_length,
                decimal_count,
            });
        }

        self.attributes = ShapefileAttributes::default();
        for field in &fields {
            self.attributes.add_field(field);
        }

        bor.seek(bytes_in_header as usize)?;
        for i in 0..num_records as usize {
            bor.seek(bytes_in_header as usize + i * bytes_in_record as usize)?;
            let deleted = bor.read_u8()? == 0x2A;
            let mut rec: Vec<FieldData> = Vec::with_capacity(fields.len());
            for field in &fields {
                let str_rep = bor
                    .read_utf8(field.field_length as usize)?
                    .replace(char::from(0), "")
                    .trim()
                    .to_string();
                if str_rep.replace('?', "").is_empty() {
                    rec.push(FieldData::Null);
                    continue;
                }
                rec.push(match field.field_type {
                    'N' | 'F' | 'I' | 'O' => {
                        if field.decimal_count == 0 {
                            match str_rep.parse::<i32>() {
                                Ok(v) => FieldData::Int(v),
                                Err(_) => str_rep
                                    .parse::<f64>()
                                    .map(FieldData::Real)
                                    .unwrap_or(FieldData::Null),
                            }
                        } else {
                            str_rep
                                .parse::<f64>()
                                .map(FieldData::Real)
                                .unwrap_or(FieldData::Null)
                        }
                    }
                    'D' => {
                        if str_rep.len() == 8 && str_rep.is_ascii() {
                            FieldData::Date(DateData {
                                year: str_rep[0..4].parse::<u16>().unwrap_or(0),
                                month: str_rep[4..6].parse::<u8>().unwrap_or(0),
                                day: str_rep[6..8].parse::<u8>().unwrap_or(0),
                            })
                        } else {
                            FieldData::Null
                        }
                    }
                    'L' => FieldData::Bool(matches!(
                        str_rep.to_lowercase().as_str(),
                        "t" | "y" | "true" | "yes"
                    )),
                    _ => FieldData::Text(str_rep),
                });
            }
            self.attributes.add_record(rec, deleted);
        }

        self.attributes.header.version = version;
        self.attributes.header.year = year;
        self.attributes.header.month = month;
        self.attributes.header.day = day;
        self.attributes.header.bytes_in_header = bytes_in_header;
        self.attributes.header.bytes_in_record = bytes_in_record;

        Ok(())
    }

    /// Writes the .shp, .shx, and .dbf files, plus a .prj file when the
    /// projection is known. Every file handle is closed before returning.
    pub fn write(&mut self) -> Result<(), Error> {
        if self.file_mode == "r" {
            return Err(Error::new(
                ErrorKind::Other,
                "The file was opened in read-only mode.",
            ));
        }
        if !self.header.shape_type.is_xy() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Writing {} Shapefiles is not supported.", self.header.shape_type),
            ));
        }
        self.num_records = self.records.len(); // make sure they are the same.
        if self.attributes.get_num_records() != self.num_records {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "{} holds {} geometries but {} attribute records.",
                    self.file_name,
                    self.num_records,
                    self.attributes.get_num_records()
                ),
            ));
        }
        self.calculate_extent();

        let mut size = 100i32; // the size of the file header
        for rec in &self.records {
            size += 8 + rec.get_length();
        }
        self.header.file_length = size / 2i32; // in 16-bit words

        {
            let f = File::create(&self.file_name)?;
            let mut writer = BufWriter::new(f);
            self.write_file_header(&mut writer, self.header.file_length)?;

            for (i, rec) in self.records.iter().enumerate() {
                writer.write_i32::<BigEndian>(i as i32 + 1i32)?; // Record number
                writer.write_i32::<BigEndian>(rec.get_length() / 2)?; // Content length in 16-bit words
                writer.write_i32::<LittleEndian>(rec.shape_type.to_int())?;
                match rec.shape_type {
                    ShapeType::Null => {}
                    ShapeType::Point => {
                        let p = rec.points.first().copied().unwrap_or_default();
                        writer.write_f64::<LittleEndian>(p.x)?;
                        writer.write_f64::<LittleEndian>(p.y)?;
                    }
                    _ => {
                        writer.write_f64::<LittleEndian>(rec.x_min)?;
                        writer.write_f64::<LittleEndian>(rec.y_min)?;
                        writer.write_f64::<LittleEndian>(rec.x_max)?;
                        writer.write_f64::<LittleEndian>(rec.y_max)?;
                        if rec.shape_type != ShapeType::MultiPoint {
                            writer.write_i32::<LittleEndian>(rec.num_parts)?;
                        }
                        writer.write_i32::<LittleEndian>(rec.num_points)?;
                        if rec.shape_type != ShapeType::MultiPoint {
                            for part in &rec.parts {
                                writer.write_i32::<LittleEndian>(*part)?;
                            }
                        }
                        for pt in &rec.points {
                            writer.write_f64::<LittleEndian>(pt.x)?;
                            writer.write_f64::<LittleEndian>(pt.y)?;
                        }
                    }
                }
            }
            writer.flush()?;
        }

        {
            let index_file = Path::new(&self.file_name).with_extension("shx");
            let f = File::create(&index_file)?;
            let mut writer = BufWriter::new(f);
            let file_length = (100 + 8 * self.num_records) as i32 / 2i32; // in 16-bit words
            self.write_file_header(&mut writer, file_length)?;
            let mut pos = 100i32;
            for rec in &self.records {
                writer.write_i32::<BigEndian>(pos / 2)?; // Offset in 16-bit words
                writer.write_i32::<BigEndian>(rec.get_length() / 2)?; // Content length in 16-bit words
                pos += 8 + rec.get_length();
            }
            writer.flush()?;
        }

        if !self.projection.is_empty() {
            fs::write(Path::new(&self.file_name).with_extension("prj"), &self.projection)?;
        }

        self.write_dbf()
    }

    fn write_file_header<W: Write>(&self, writer: &mut W, file_length: i32) -> Result<(), Error> {
        writer.write_i32::<BigEndian>(9994i32)?;
        for _ in 0..5 {
            writer.write_i32::<BigEndian>(0i32)?;
        }
        writer.write_i32::<BigEndian>(file_length)?;
        writer.write_i32::<LittleEndian>(1000i32)?;
        writer.write_i32::<LittleEndian>(self.header.shape_type.to_int())?;
        writer.write_f64::<LittleEndian>(self.header.x_min)?;
        writer.write_f64::<LittleEndian>(self.header.y_min)?;
        writer.write_f64::<LittleEndian>(self.header.x_max)?;
        writer.write_f64::<LittleEndian>(self.header.y_max)?;
        for _ in 0..4 {
            writer.write_f64::<LittleEndian>(0f64)?; // z and m ranges
        }
        Ok(())
    }

    fn write_dbf(&mut self) -> Result<(), Error> {
        let dbf_file = Path::new(&self.file_name).with_extension("dbf");
        let f = File::create(&dbf_file)?;
        let mut writer = BufWriter::new(f);

        self.attributes.header.version = 3;
        writer.write_u8(3u8)?;

        let now = Local::now();
        writer.write_u8((now.year() - 1900) as u8)?;
        writer.write_u8(now.month() as u8)?;
        writer.write_u8(now.day() as u8)?;

        let num_records = self.attributes.get_num_records() as u32;
        writer.write_u32::<LittleEndian>(num_records)?;
        let header_size = 32u16 + self.attributes.fields.len() as u16 * 32u16 + 1u16;
        self.attributes.header.bytes_in_header = header_size;
        writer.write_u16::<LittleEndian>(header_size)?;

        let bytes_in_record = 1u16
            + self
                .attributes
                .fields
                .iter()
                .map(|f| f.field_length as u16)
                .sum::<u16>();
        self.attributes.header.bytes_in_record = bytes_in_record;
        writer.write_u16::<LittleEndian>(bytes_in_record)?;

        for _ in 0..20 {
            writer.write_u8(0u8)?;
        }

        for field in &self.attributes.fields {
            let mut name: Vec<u8> = field.name.bytes().take(10).collect();
            name.resize(11, 0u8);
            writer.write_all(&name)?;
            writer.write_u8(field.field_type as u8)?;
            for _ in 0..4 {
                writer.write_u8(0u8)?;
            }
            writer.write_u8(field.field_length)?;
            writer.write_u8(field.decimal_count)?;
            for _ in 0..14 {
                writer.write_u8(0u8)?;
            }
        }

        writer.write_u8(0x0D)?; // terminator byte

        for i in 0..num_records as usize {
            let deleted = self.attributes.is_deleted.get(i).copied().unwrap_or(false);
            writer.write_u8(if deleted { 0x2A } else { 0x20 })?;
            let rec = match self.attributes.get_record(i) {
                Some(rec) => rec,
                None => break,
            };
            for (j, field) in self.attributes.fields.iter().enumerate() {
                let fl = field.field_length as usize;
                let value = rec.get(j).cloned().unwrap_or(FieldData::Null);
                let formatted = match value {
                    FieldData::Null => String::new(),
                    FieldData::Int(v) => format!("{:>width$}", v, width = fl),
                    FieldData::Real(v) => {
                        format!("{:>width$.prec$}", v, width = fl, prec = field.decimal_count as usize)
                    }
                    FieldData::Date(d) => d.to_string(),
                    FieldData::Bool(b) => String::from(if b { "T" } else { "F" }),
                    FieldData::Text(s) => s,
                };
                writer.write_all(&fit_to_width(&formatted, fl))?;
            }
        }

        writer.write_u8(0x1A)?; // end of file marker
        writer.flush()?;
        Ok(())
    }
}

/// Pads (with trailing spaces) or truncates a value to a dBase field width.
/// Numbers wider than the field keep their least significant digits.
fn fit_to_width(value: &str, width: usize) -> Vec<u8> {
    let mut bytes: Vec<u8> = value.bytes().collect();
    if bytes.len() > width {
        if value.trim_start().starts_with(|c: char| c.is_ascii_digit() || c == '-') {
            bytes = bytes[bytes.len() - width..].to_vec();
        } else {
            bytes.truncate(width);
        }
    }
    bytes.resize(width, b' ');
    bytes
}
