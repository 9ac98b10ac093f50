use crate::structures::Point2D;

/// Checks whether a ring of Point2D is in clockwise order, using the sign
/// of its shoelace area (negative for clockwise). The closing vertex, if
/// present, is ignored. Rings with fewer than three distinct vertices are
/// reported as not clockwise.
pub fn is_clockwise_order(points: &[Point2D]) -> bool {
    if points.len() < 3 {
        return false;
    }
    let end_point = if points[0] == points[points.len() - 1] {
        points.len() - 1
    } else {
        points.len()
    };
    if end_point < 3 {
        return false;
    }

    let mut area = 0f64;
    for j in 0..end_point {
        let n2 = if j < end_point - 1 { j + 1 } else { 0 };
        area += (points[j].x * points[n2].y) - (points[n2].x * points[j].y);
    }
    area < 0f64
}

#[cfg(test)]
mod test {
    use super::is_clockwise_order;
    use crate::structures::Point2D;

    #[test]
    fn test_is_clockwise_order() {
        let mut points: Vec<Point2D> = Vec::new();
        points.push(Point2D::new(0f64, 0f64));
        points.push(Point2D::new(1f64, 0f64));
        points.push(Point2D::new(1f64, 1f64));
        points.push(Point2D::new(0f64, 1f64));
        points.push(Point2D::new(0f64, 0f64));

        assert_eq!(is_clockwise_order(&points), false);

        points.reverse();
        assert_eq!(is_clockwise_order(&points), true);
    }

    #[test]
    fn test_concave_ring() {
        // an L-shape traversed clockwise
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 2.0),
            Point2D::new(1.0, 2.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(2.0, 1.0),
            Point2D::new(2.0, 0.0),
        ];
        assert!(is_clockwise_order(&points));
    }
}
