use crate::*;

/// Oriented half-space: points with `normal·p >= d` are inside.
///
/// The normal points into the kept region and is not required to be unit
/// length; `height` scales with its magnitude, which is fine for the sign and
/// ratio tests the clip engine performs.
#[derive(Debug, Copy, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClipPlane {
    normal: Point3,
    d: f64,
}

impl ClipPlane {
    /// Plane through `origin` keeping the side `normal` points toward.
    pub fn new(origin: Point3, normal: Point3) -> Self {
        let d = dot_prod(normal, origin);
        Self { normal, d }
    }

    /// Raw `normal·p >= d` form.
    pub fn from_normal_and_distance(normal: Point3, d: f64) -> Self {
        Self { normal, d }
    }

    /// Plane through three points; the kept side is along `(b-a)×(c-a)`.
    /// Returns `None` for colinear/coincident points.
    pub fn from_points(a: Point3, b: Point3, c: Point3) -> Option<Self> {
        let n = xprod(b.sub(a), c.sub(a));
        (n.mag2() > EPS_LEN * EPS_LEN).then(|| Self::new(a, n))
    }

    pub fn normal(&self) -> Point3 {
        self.normal
    }

    pub fn distance(&self) -> f64 {
        self.d
    }

    /// Signed height of `p` above the plane. Positive is inside.
    pub fn height(&self, p: Point3) -> f64 {
        dot_prod(self.normal, p) - self.d
    }

    pub fn is_inside(&self, p: Point3, tolerance: f64) -> bool {
        self.height(p) >= -tolerance
    }

    /// Same boundary, opposite kept side.
    pub fn flipped(self) -> Self {
        Self {
            normal: self.normal.scale(-1.0),
            d: -self.d,
        }
    }
}

/// Right-handed orthonormal frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub origin: Point3,
    pub x_axis: Point3,
    pub y_axis: Point3,
    pub z_axis: Point3,
}

impl Frame {
    /// Frame with X along `origin -> x_point`, Y in the plane of the three
    /// points. `None` if the points are colinear or coincident.
    pub fn from_origin_and_points(origin: Point3, x_point: Point3, y_point: Point3) -> Option<Self> {
        let x_axis = unit_or_none(x_point.sub(origin))?;
        let z_axis = unit_or_none(xprod(x_axis, y_point.sub(origin)))?;
        let y_axis = xprod(z_axis, x_axis);
        Some(Self {
            origin,
            x_axis,
            y_axis,
            z_axis,
        })
    }

    /// Frame with X along `direction` and arbitrary perpendicular Y/Z.
    ///
    /// Used as the degenerate fallback when no off-line point exists to pin
    /// the plane.
    pub fn from_origin_and_direction(origin: Point3, direction: Point3) -> Option<Self> {
        let x_axis = unit_or_none(direction)?;
        // seed with the global axis least aligned with the direction
        let [ax, ay, az] = x_axis.map(f64::abs);
        let seed = if ax <= ay && ax <= az {
            [1.0, 0.0, 0.0]
        } else if ay <= az {
            [0.0, 1.0, 0.0]
        } else {
            [0.0, 0.0, 1.0]
        };
        let z_axis = unit_or_none(xprod(x_axis, seed))?;
        let y_axis = xprod(z_axis, x_axis);
        Some(Self {
            origin,
            x_axis,
            y_axis,
            z_axis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_space_heights() {
        // keep x <= 2: normal (-1,0,0), d = -2
        let p = ClipPlane::new([2.0, 0.0, 0.0], [-1.0, 0.0, 0.0]);
        assert_eq!(p.height([0.0, 5.0, 5.0]), 2.0);
        assert_eq!(p.height([2.0, 1.0, 0.0]), 0.0);
        assert_eq!(p.height([3.0, 0.0, 0.0]), -1.0);
        assert!(p.is_inside([1.0, 0.0, 0.0], 0.0));
        assert!(!p.is_inside([2.1, 0.0, 0.0], 1e-9));

        let q = p.flipped();
        assert_eq!(q.height([3.0, 0.0, 0.0]), 1.0);
    }

    #[test]
    fn plane_from_points() {
        let p = ClipPlane::from_points([0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]).unwrap();
        assert_eq!(p.normal(), [0.0, 0.0, 1.0]);
        assert_eq!(p.height([0.0, 0.0, 3.0]), 3.0);

        // colinear
        assert_eq!(
            ClipPlane::from_points([0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]),
            None
        );
    }

    #[test]
    fn frame_from_points() {
        let f =
            Frame::from_origin_and_points([1.0, 0.0, 0.0], [3.0, 0.0, 0.0], [1.0, 5.0, 0.0]).unwrap();
        assert_eq!(f.x_axis, [1.0, 0.0, 0.0]);
        assert_eq!(f.y_axis, [0.0, 1.0, 0.0]);
        assert_eq!(f.z_axis, [0.0, 0.0, 1.0]);

        assert_eq!(
            Frame::from_origin_and_points([0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]),
            None
        );
    }

    #[test]
    fn frame_from_direction_is_orthonormal() {
        for dir in [[1.0, 0.0, 0.0], [0.0, 0.0, 2.0], [1.0, 1.0, 1.0], [-3.0, 0.5, 0.1]] {
            let f = Frame::from_origin_and_direction([0.0; 3], dir).unwrap();
            assert!((f.x_axis.mag() - 1.0).abs() < 1e-12);
            assert!((f.y_axis.mag() - 1.0).abs() < 1e-12);
            assert!((f.z_axis.mag() - 1.0).abs() < 1e-12);
            assert!(dot_prod(f.x_axis, f.y_axis).abs() < 1e-12);
            assert!(dot_prod(f.x_axis, f.z_axis).abs() < 1e-12);
            assert!(dot_prod(f.y_axis, f.z_axis).abs() < 1e-12);
        }

        assert_eq!(Frame::from_origin_and_direction([0.0; 3], [0.0; 3]), None);
    }
}
