/*
This code is part of the IWP trough network tools.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use crate::structures::Point2D;

/// Tests if a point is Left|On|Right of an infinite line,
/// based on http://geomalgorithms.com/a03-_inclusion.html.
///
/// Input:  three points p0, p1, and p2
///
/// Return: > 0 for p2 left of the line through p0 and p1
///         = 0 for p2 on the line through p0 and p1
///         < 0 for p2 right of the line through p0 and p1
fn is_left(p0: &Point2D, p1: &Point2D, p2: &Point2D) -> f64 {
    (p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y)
}

/// Tests whether a point is within a ring using the winding number (wn).
/// Self-overlapping rings follow the even-odd rule. Rings may be passed
/// either closed (`poly[n] == poly[0]`) or open; an open ring is closed
/// implicitly.
pub fn point_in_poly(p: &Point2D, poly: &[Point2D]) -> bool {
    winding_number(p, poly) % 2 != 0i32
}

/// Calculates the winding number of a ring around a point. The number is
/// zero only when the point is outside the ring.
pub fn winding_number(p: &Point2D, poly: &[Point2D]) -> i32 {
    let n = poly.len();
    if n < 3 {
        return 0i32;
    }
    let mut wn = 0i32;
    for i in 0..n {
        let v0 = &poly[i];
        let v1 = &poly[(i + 1) % n];
        if v0.y <= p.y {
            if v1.y > p.y {
                // an upward crossing
                if is_left(v0, v1, p) > 0f64 {
                    wn += 1i32;
                }
            }
        } else if v1.y <= p.y {
            // a downward crossing
            if is_left(v0, v1, p) < 0f64 {
                wn -= 1i32;
            }
        }
    }
    wn
}

#[cfg(test)]
mod test {
    use super::{point_in_poly, winding_number};
    use crate::structures::Point2D;

    #[test]
    fn test_point_in_poly() {
        let poly = [
            Point2D::new(0.0, 0.0),
            Point2D::new(5.0, 0.0),
            Point2D::new(5.0, 5.0),
            Point2D::new(0.0, 0.0),
        ];
        assert!(point_in_poly(&Point2D::new(4.0, 2.0), &poly));
        assert_eq!(point_in_poly(&Point2D::new(12.0, 12.0), &poly), false);
    }

    #[test]
    fn test_open_ring_is_closed_implicitly() {
        let open = [
            Point2D::new(0.0, 0.0),
            Point2D::new(5.0, 0.0),
            Point2D::new(5.0, 5.0),
            Point2D::new(0.0, 5.0),
        ];
        assert!(point_in_poly(&Point2D::new(1.0, 4.0), &open));
        assert_eq!(winding_number(&Point2D::new(1.0, 4.0), &open[..2]), 0);
    }
}
