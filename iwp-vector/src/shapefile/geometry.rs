/*
This file is part of the IWP trough network tools.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/
use iwp_common::algorithms::{is_clockwise_order, point_in_poly, polyline_length};
use iwp_common::structures::{BoundingBox, Point2D};
use std::f64;
use std::fmt;
use std::io::{Error, ErrorKind};

/// A single shapefile record. Multi-part records keep all of their
/// vertices in `points`; `parts` holds the index of each part's first
/// vertex. Z and M values of input files are read past and not retained.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapefileGeometry {
    pub shape_type: ShapeType,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub num_parts: i32,
    pub num_points: i32,
    pub parts: Vec<i32>,
    pub points: Vec<Point2D>,
}

impl ShapefileGeometry {
    /// ShapefileGeometry constructor method.
    pub fn new(shape_type: ShapeType) -> ShapefileGeometry {
        ShapefileGeometry {
            shape_type,
            ..Default::default()
        }
    }

    fn expand_extent(&mut self, p: &Point2D) {
        self.x_min = self.x_min.min(p.x);
        self.x_max = self.x_max.max(p.x);
        self.y_min = self.y_min.min(p.y);
        self.y_max = self.y_max.max(p.y);
    }

    /// Adds a single Point2D to the ShapefileGeometry's points array.
    pub fn add_point(&mut self, p: Point2D) {
        self.expand_extent(&p);
        self.points.push(p);
        self.num_points += 1;
    }

    /// Adds a part of Point2Ds to the ShapefileGeometry.
    pub fn add_part(&mut self, points: &[Point2D]) {
        self.parts.push(self.points.len() as i32);
        self.num_parts += 1i32;
        for p in points {
            self.expand_extent(p);
            self.points.push(*p);
        }
        self.num_points += points.len() as i32;
    }

    /// Returns the vertices of a part. Parts beyond the record are empty.
    pub fn get_part(&self, part_num: usize) -> &[Point2D] {
        if part_num >= self.parts.len() {
            return &[];
        }
        let st = (self.parts[part_num].max(0) as usize).min(self.points.len());
        let end = if part_num < self.parts.len() - 1 {
            self.parts[part_num + 1] as usize
        } else {
            self.points.len()
        };
        &self.points[st..end.clamp(st, self.points.len())]
    }

    /// Iterates over the vertex slices of each part.
    pub fn part_iter(&self) -> impl Iterator<Item = &[Point2D]> {
        (0..self.parts.len()).map(move |i| self.get_part(i))
    }

    pub fn get_bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.x_min, self.x_max, self.y_min, self.y_max)
    }

    /// Returns the length of the ShapefileGeometry's content, including the
    /// shape type but excluding the 8-byte record header, in bytes.
    pub fn get_length(&self) -> i32 {
        4i32 + match self.shape_type.base_shape_type() {
            ShapeType::Null => 0i32,
            ShapeType::Point => 16i32,
            ShapeType::MultiPoint => 36i32 + self.num_points * 16i32,
            _ => 40i32 + self.num_parts * 4i32 + self.num_points * 16i32,
        }
    }

    /// Sums the planar length of every part. Polygon rings are measured
    /// as stored, so a closed ring counts its closing segment.
    pub fn get_line_length(&self) -> f64 {
        self.part_iter().map(polyline_length).sum()
    }

    /// Checks whether a point is within the polygon, treating parts as
    /// rings under the even-odd rule. If the geometry is not of POLYGON base
    /// ShapeType, the function will return false.
    pub fn is_point_within_polygon(&self, point: &Point2D) -> bool {
        if self.shape_type.base_shape_type() != ShapeType::Polygon {
            return false;
        }
        let crossings = self
            .part_iter()
            .filter(|ring| point_in_poly(point, ring))
            .count();
        crossings % 2 == 1
    }

    /// Checks whether or not a part in a polygon is a hole. Holes are rings
    /// with vertices in counter-clockwise order.
    pub fn is_hole(&self, part_num: i32) -> bool {
        if self.shape_type.base_shape_type() != ShapeType::Polygon {
            return false;
        }
        if part_num < 0 || part_num > self.num_parts - 1 {
            return false;
        }
        let ring = self.get_part(part_num as usize);
        if ring.len() < 3 {
            return false;
        }
        !is_clockwise_order(ring)
    }
}

impl Default for ShapefileGeometry {
    fn default() -> ShapefileGeometry {
        ShapefileGeometry {
            shape_type: ShapeType::Null,
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
            num_parts: 0i32,
            num_points: 0i32,
            parts: vec![],
            points: vec![],
        }
    }
}

impl fmt::Display for ShapefileGeometry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "shape_type: {}, num_parts: {}, num_points: {}, x_min: {}, x_max: {}, y_min: {}, y_max: {}",
            self.shape_type,
            self.num_parts,
            self.num_points,
            self.x_min,
            self.x_max,
            self.y_min,
            self.y_max
        )
    }
}

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShapeType {
    Null = 0,
    Point = 1,
    PolyLine = 3,
    Polygon = 5,
    MultiPoint = 8,
    PointZ = 11,
    PolyLineZ = 13,
    PolygonZ = 15,
    MultiPointZ = 18,
    PointM = 21,
    PolyLineM = 23,
    PolygonM = 25,
    MultiPointM = 28,
}

impl ShapeType {
    pub fn from_int(value: i32) -> Result<ShapeType, Error> {
        Ok(match value {
            0 => ShapeType::Null,
            1 => ShapeType::Point,
            3 => ShapeType::PolyLine,
            5 => ShapeType::Polygon,
            8 => ShapeType::MultiPoint,
            11 => ShapeType::PointZ,
            13 => ShapeType::PolyLineZ,
            15 => ShapeType::PolygonZ,
            18 => ShapeType::MultiPointZ,
            21 => ShapeType::PointM,
            23 => ShapeType::PolyLineM,
            25 => ShapeType::PolygonM,
            28 => ShapeType::MultiPointM,
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("Unrecognized ShapeType: {}", value),
                ))
            }
        })
    }

    pub fn to_int(&self) -> i32 {
        *self as i32
    }

    pub fn base_shape_type(&self) -> ShapeType {
        match self {
            ShapeType::Null => ShapeType::Null,
            ShapeType::Point | ShapeType::PointZ | ShapeType::PointM => ShapeType::Point,
            ShapeType::PolyLine | ShapeType::PolyLineZ | ShapeType::PolyLineM => {
                ShapeType::PolyLine
            }
            ShapeType::Polygon | ShapeType::PolygonZ | ShapeType::PolygonM => ShapeType::Polygon,
            ShapeType::MultiPoint | ShapeType::MultiPointZ | ShapeType::MultiPointM => {
                ShapeType::MultiPoint
            }
        }
    }

    /// True for the plain XY variants, which are the only ones written.
    pub fn is_xy(&self) -> bool {
        *self == self.base_shape_type()
    }
}

impl Default for ShapeType {
    fn default() -> ShapeType {
        ShapeType::Null
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let printable = match *self {
            ShapeType::Null => "Null",
            ShapeType::Point => "Point",
            ShapeType::PolyLine => "PolyLine",
            ShapeType::Polygon => "Polygon",
            ShapeType::MultiPoint => "MultiPoint",
            ShapeType::PointZ => "PointZ",
            ShapeType::PolyLineZ => "PolyLineZ",
            ShapeType::PolygonZ => "PolygonZ",
            ShapeType::MultiPointZ => "MultiPointZ",
            ShapeType::PointM => "PointM",
            ShapeType::PolyLineM => "PolyLineM",
            ShapeType::PolygonM => "PolygonM",
            ShapeType::MultiPointM => "MultiPointM",
        };
        write!(f, "{}", printable)
    }
}
