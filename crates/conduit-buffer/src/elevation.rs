//! Invert elevation along a conduit centerline.

use crate::Point2;

/// Elevation at every vertex, linear in cumulative planar arc length.
///
/// `z(p) = z0 + (z1 - z0) * s(p) / L` where `s` is the length travelled from
/// the first vertex and `L` the total length. A zero-length line gets `z0`
/// everywhere.
pub fn interpolate_elevations(line: &[Point2], z0: f64, z1: f64) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(line.len());
    let mut travelled = 0.0;
    for (i, p) in line.iter().enumerate() {
        if i > 0 {
            travelled += (*p - line[i - 1]).norm();
        }
        cumulative.push(travelled);
    }

    if travelled <= 0.0 {
        return vec![z0; line.len()];
    }

    cumulative
        .into_iter()
        .map(|s| z0 + (z1 - z0) * (s / travelled))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_interpolates_by_arc_length() {
        // Cumulative lengths 0, 10, 30.
        let line = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 20.0),
        ];
        let z = interpolate_elevations(&line, 100.0, 70.0);
        assert_eq!(z.len(), 3);
        assert_relative_eq!(z[0], 100.0);
        assert_relative_eq!(z[1], 90.0);
        assert_relative_eq!(z[2], 70.0);
    }

    #[test]
    fn test_zero_length_line_is_flat() {
        let line = vec![Point2::new(1.0, 1.0), Point2::new(1.0, 1.0)];
        assert_eq!(interpolate_elevations(&line, 5.0, 9.0), vec![5.0, 5.0]);
    }

    #[test]
    fn test_coincident_vertex_keeps_elevation() {
        let line = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(8.0, 0.0),
        ];
        let z = interpolate_elevations(&line, 0.0, -8.0);
        assert_relative_eq!(z[1], -4.0);
        assert_relative_eq!(z[2], -4.0);
        assert_relative_eq!(z[3], -8.0);
    }

    #[test]
    fn test_empty_line() {
        assert!(interpolate_elevations(&[], 1.0, 2.0).is_empty());
    }
}
