// Conversions between shapefile records and `geo` geometries.

use geo::orient::{Direction, Orient};
use geo::{Coord, LineString, MultiLineString, MultiPolygon, Polygon};
use iwp_common::algorithms::point_in_poly;
use iwp_common::structures::Point2D;
use iwp_vector::{ShapeType, ShapefileGeometry};

fn to_line_string(points: &[Point2D]) -> LineString<f64> {
    LineString::from(
        points
            .iter()
            .map(|p| Coord { x: p.x, y: p.y })
            .collect::<Vec<Coord<f64>>>(),
    )
}

fn to_points(ls: &LineString<f64>) -> Vec<Point2D> {
    ls.coords().map(|c| Point2D::new(c.x, c.y)).collect()
}

/// Groups the rings of a polygon record into polygons. Each outer ring
/// starts a polygon; each hole is attached to the first outer ring that
/// contains its first vertex. When every ring is counter-clockwise, rings
/// nested in another ring are holes and the others are outer rings. Rings
/// with fewer than three vertices are skipped, as are holes lying outside
/// every outer ring.
pub fn record_to_multipolygon(record: &ShapefileGeometry) -> MultiPolygon<f64> {
    if record.shape_type.base_shape_type() != ShapeType::Polygon {
        return MultiPolygon::new(vec![]);
    }
    let mut outers: Vec<(&[Point2D], Vec<LineString<f64>>)> = vec![];
    let mut holes: Vec<&[Point2D]> = vec![];
    for (part_num, ring) in record.part_iter().enumerate() {
        if ring.len() < 3 {
            continue;
        }
        if record.is_hole(part_num as i32) {
            holes.push(ring);
        } else {
            outers.push((ring, vec![]));
        }
    }
    // Without a clockwise ring the winding carries no meaning; rings
    // inside another ring are its holes and the rest are shells.
    if outers.is_empty() {
        let rings = std::mem::take(&mut holes);
        for (i, &ring) in rings.iter().enumerate() {
            let nested = rings
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && point_in_poly(&ring[0], other));
            if nested {
                holes.push(ring);
            } else {
                outers.push((ring, vec![]));
            }
        }
    }
    for hole in holes {
        if let Some(outer) = outers
            .iter_mut()
            .find(|(ring, _)| point_in_poly(&hole[0], ring))
        {
            outer.1.push(to_line_string(hole));
        }
    }
    MultiPolygon::new(
        outers
            .into_iter()
            .map(|(ring, interiors)| Polygon::new(to_line_string(ring), interiors))
            .collect(),
    )
}

/// Builds a Polygon record from a `MultiPolygon`, with outer rings wound
/// clockwise and holes counter-clockwise as shapefiles require.
pub fn multipolygon_to_record(mp: &MultiPolygon<f64>) -> ShapefileGeometry {
    let mut sfg = ShapefileGeometry::new(ShapeType::Polygon);
    for poly in mp.0.iter().map(|p| p.orient(Direction::Reversed)) {
        sfg.add_part(&to_points(poly.exterior()));
        for interior in poly.interiors() {
            sfg.add_part(&to_points(interior));
        }
    }
    sfg
}

pub fn record_to_multilinestring(record: &ShapefileGeometry) -> MultiLineString<f64> {
    MultiLineString::new(
        record
            .part_iter()
            .filter(|part| part.len() > 1)
            .map(to_line_string)
            .collect(),
    )
}

pub fn multilinestring_to_record(mls: &MultiLineString<f64>) -> ShapefileGeometry {
    let mut sfg = ShapefileGeometry::new(ShapeType::PolyLine);
    for ls in mls.0.iter().filter(|ls| ls.0.len() > 1) {
        sfg.add_part(&to_points(ls));
    }
    sfg
}

#[cfg(test)]
mod test {
    use super::{multipolygon_to_record, record_to_multipolygon};
    use geo::Area;
    use iwp_common::structures::Point2D;
    use iwp_vector::{ShapeType, ShapefileGeometry};

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

    #[test]
    fn test_holes_are_attached_to_their_shell() {
        let mut sfg = ShapefileGeometry::new(ShapeType::Polygon);
        sfg.add_part(&ring(0.0, 0.0, 10.0, true));
        sfg.add_part(&ring(2.0, 2.0, 2.0, false));
        sfg.add_part(&ring(20.0, 0.0, 5.0, true));
        let mp = record_to_multipolygon(&sfg);
        assert_eq!(mp.0.len(), 2);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert!((mp.unsigned_area() - (100.0 - 4.0 + 25.0)).abs() < 1e-9);

        let back = multipolygon_to_record(&mp);
        assert_eq!(back.num_parts, 3);
        assert!(!back.is_hole(0));
        assert!(back.is_hole(1));
        assert!(back.is_point_within_polygon(&Point2D::new(1.0, 1.0)));
        assert!(!back.is_point_within_polygon(&Point2D::new(3.0, 3.0)));
    }

    #[test]
    fn test_counter_clockwise_single_ring() {
        let mut sfg = ShapefileGeometry::new(ShapeType::PolygonZ);
        sfg.add_part(&ring(0.0, 0.0, 4.0, false));
        let mp = record_to_multipolygon(&sfg);
        assert_eq!(mp.0.len(), 1);
        assert!((mp.unsigned_area() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_counter_clockwise_parts() {
        let mut sfg = ShapefileGeometry::new(ShapeType::Polygon);
        sfg.add_part(&ring(0.0, 0.0, 4.0, false));
        sfg.add_part(&ring(10.0, 0.0, 2.0, false));
        let mp = record_to_multipolygon(&sfg);
        assert_eq!(mp.0.len(), 2);
        assert!((mp.unsigned_area() - 20.0).abs() < 1e-9);

        sfg.add_part(&ring(1.0, 1.0, 1.0, false));
        let mp = record_to_multipolygon(&sfg);
        assert_eq!(mp.0.len(), 2);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert!((mp.unsigned_area() - 19.0).abs() < 1e-9);
    }
}
