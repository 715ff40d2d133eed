//! Small vector helpers on `[f64; 3]` points

/// A point in 3D cartesian space
pub type Point3 = [f64; 3];

/// euclidean length of `p`
pub fn norm(p: &[f64]) -> f64 {
    p.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// euclidean distance between two points of the same dimension
pub fn distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

pub fn midpoint(a: Point3, b: Point3) -> Point3 {
    [(a[0] + b[0]) / 2., (a[1] + b[1]) / 2., (a[2] + b[2]) / 2.]
}

/// centroid of a triangle
pub fn centroid(a: Point3, b: Point3, c: Point3) -> Point3 {
    [
        (a[0] + b[0] + c[0]) / 3.,
        (a[1] + b[1] + c[1]) / 3.,
        (a[2] + b[2] + c[2]) / 3.,
    ]
}

/// Radially project `p` onto the sphere of `radius` around the origin
///
/// The point is converted to spherical coordinates (azimuth `atan2(y, x)`, polar angle
/// `acos(z / |p|)`) and rebuilt at the new radius. `p` must not be the origin.
pub fn project_on_sphere(radius: f64, p: Point3) -> Point3 {
    let length = norm(&p);
    debug_assert!(length > 0., "cannot project the origin onto a sphere");

    let azimuth = p[1].atan2(p[0]);
    // rounding can push the ratio just outside of the domain of acos
    let polar = (p[2] / length).clamp(-1., 1.).acos();

    [
        radius * polar.sin() * azimuth.cos(),
        radius * polar.sin() * azimuth.sin(),
        radius * polar.cos(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn projection_keeps_direction() {
        let p = project_on_sphere(2., [1., 1., 1.]);
        let expected = 2. / 3f64.sqrt();

        assert_relative_eq!(norm(&p), 2., epsilon = 1e-14);
        for value in p {
            assert_relative_eq!(value, expected, epsilon = 1e-14);
        }
    }

    #[test]
    fn projection_of_poles() {
        let north = project_on_sphere(1., [0., 0., 5.]);
        assert_relative_eq!(north[2], 1.);
        assert_relative_eq!(north[0], 0.);

        let south = project_on_sphere(3., [0., 0., -0.5]);
        assert_relative_eq!(south[2], -3.);
    }

    #[test]
    fn midpoints_and_centroids() {
        assert_eq!(midpoint([0., 0., 0.], [2., 4., -2.]), [1., 2., -1.]);
        assert_eq!(centroid([3., 0., 0.], [0., 3., 0.], [0., 0., 3.]), [1., 1., 1.]);
        assert_relative_eq!(distance(&[0., 0.], &[3., 4.]), 5.);
    }
}
