use crate::structures::Point2D;

/// Sums the Euclidean lengths of the segments of an open vertex sequence.
pub fn polyline_length(points: &[Point2D]) -> f64 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

#[cfg(test)]
mod test {
    use super::polyline_length;
    use crate::structures::Point2D;

    #[test]
    fn test_polyline_length() {
        let line = [
            Point2D::new(0.0, 0.0),
            Point2D::new(3.0, 4.0),
            Point2D::new(3.0, 10.0),
        ];
        assert_eq!(polyline_length(&line), 11.0);
        assert_eq!(polyline_length(&line[..1]), 0.0);
    }
}
