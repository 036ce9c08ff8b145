use std::ops;

pub trait Point: Copy + Sized + IntoIterator<Item = f64> {
    /// Set all the values to this value.
    fn all(v: f64) -> Self;

    /// Set all values to zero.
    fn zero() -> Self {
        Self::all(0.)
    }

    /// Set all values to one.
    fn one() -> Self {
        Self::all(1.)
    }

    /// Scale point by multiplying all dimensions by `scalar`.
    fn scale(self, scalar: f64) -> Self;

    /// Calculate the magnitude of the vector.
    fn mag(self) -> f64 {
        self.mag2().sqrt()
    }

    /// Squared magnitude.
    fn mag2(self) -> f64 {
        self.into_iter().zip(self).map(|(a, b)| a * b).sum::<f64>()
    }

    /// Normalise the vector by the magnitude.
    fn unit(self) -> Self {
        self.scale(self.mag().recip())
    }

    /// Return the minimum of each dimension.
    fn min_all(self, b: Self) -> Self {
        xfm(self, b, f64::min)
    }

    /// Return the maximum of each dimension.
    fn max_all(self, b: Self) -> Self {
        xfm(self, b, f64::max)
    }

    /// Perform a transformation on each pair of dimensions.
    fn xfm<F: Fn(f64, f64) -> f64>(self, b: Self, f: F) -> Self;
}

pub trait Add<Rhs = Self> {
    fn add(self, rhs: Rhs) -> Self;
    fn sub(self, rhs: Rhs) -> Self
    where
        Self: Sized + Copy,
        Rhs: Point,
    {
        self.add(rhs.scale(-1.0))
    }
}

/// 2D Point (X,Y).
pub type Point2 = [f64; 2];

/// 3D Point (X,Y,Z).
pub type Point3 = [f64; 3];

/// Sentinel point breaking an array into independent sub-chains.
pub const DISCONNECT: Point3 = [f64::MAX, f64::MAX, f64::MAX];

/// Test for the [`DISCONNECT`] sentinel.
pub fn is_disconnect(p: Point3) -> bool {
    p == DISCONNECT
}

impl Add for Point2 {
    fn add(self, rhs: Self) -> Self {
        xfm(self, rhs, ops::Add::add)
    }

    fn sub(self, rhs: Self) -> Self {
        xfm(self, rhs, ops::Sub::sub)
    }
}
impl Point for Point2 {
    fn all(v: f64) -> Self {
        [v; 2]
    }
    fn scale(self, scalar: f64) -> Self {
        self.map(|f| f * scalar)
    }
    fn xfm<F: Fn(f64, f64) -> f64>(self, b: Self, f: F) -> Self {
        let mut x = self.into_iter().zip(b).map(|(a, b)| f(a, b));
        [x.next().unwrap(), x.next().unwrap()]
    }
}

impl Add for Point3 {
    fn add(self, rhs: Self) -> Self {
        Self::xfm(self, rhs, ops::Add::add)
    }

    fn sub(self, rhs: Self) -> Self {
        Self::xfm(self, rhs, ops::Sub::sub)
    }
}
impl Point for Point3 {
    fn all(v: f64) -> Self {
        [v; 3]
    }
    fn scale(self, scalar: f64) -> Self {
        self.map(|f| f * scalar)
    }
    fn xfm<F: Fn(f64, f64) -> f64>(self, b: Self, f: F) -> Self {
        let mut x = self.into_iter().zip(b).map(|(a, b)| f(a, b));
        [x.next().unwrap(), x.next().unwrap(), x.next().unwrap()]
    }
}

pub trait ToPoint2 {
    fn to_p2(self) -> Point2;
}

impl ToPoint2 for Point2 {
    fn to_p2(self) -> Point2 {
        self
    }
}
impl ToPoint2 for Point3 {
    fn to_p2(self) -> Point2 {
        let [x, y, _] = self;
        [x, y]
    }
}
impl ToPoint2 for &Point3 {
    fn to_p2(self) -> Point2 {
        (*self).to_p2()
    }
}

pub fn dot_prod(a: Point3, b: Point3) -> f64 {
    a.into_iter().zip(b).map(|(a, b)| a * b).sum()
}

#[allow(clippy::many_single_char_names)]
pub fn xprod(a: Point3, b: Point3) -> Point3 {
    let [ax, ay, az] = a;
    let [bx, by, bz] = b;
    let x = ay * bz - az * by;
    let y = az * bx - ax * bz;
    let z = ax * by - ay * bx;
    [x, y, z]
}

/// Interpolate between `a` and `b` at `f` (`f` outside [0,1] extrapolates).
pub fn lerp<P: Point + Add>(a: P, b: P, f: f64) -> P {
    a.add(b.sub(a).scale(f))
}

pub fn dist<P: Point + Add>(a: P, b: P) -> f64 {
    b.sub(a).mag()
}

pub fn dist2<P: Point + Add>(a: P, b: P) -> f64 {
    b.sub(a).mag2()
}

/// Distance ignoring Z.
pub fn dist_xy(a: Point3, b: Point3) -> f64 {
    dist(a.to_p2(), b.to_p2())
}

/// Unit vector, or `None` when the magnitude is below [`EPS_LEN`](crate::EPS_LEN).
pub fn unit_or_none<P: Point>(v: P) -> Option<P> {
    let m = v.mag();
    (m > crate::EPS_LEN).then(|| v.scale(m.recip()))
}

/// Same point, with tolerance.
pub fn same_point<P: Point + Add>(a: P, b: P) -> bool {
    a.xfm(b, |a, b| (a - b).abs())
        .into_iter()
        .all(|f| f < crate::EPS_POINT)
}

/// Apply an ordering to points by testing each x,y,z.
pub fn ordpt<P: Point>(a: P, b: P) -> std::cmp::Ordering {
    use std::cmp::Ordering::Equal;

    a.into_iter().zip(b).fold(
        Equal,
        |o, (a, b)| {
            if o == Equal {
                a.total_cmp(&b)
            } else {
                o
            }
        },
    )
}

/// Helper function which effectively transforms to [`Point::xfm`].
#[inline(always)]
pub fn xfm<P: Point, F: Fn(f64, f64) -> f64>(a: P, b: P, f: F) -> P {
    P::xfm(a, b, f)
}

/// Row-major 4x4 homogeneous transform.
pub type Matrix4 = [[f64; 4]; 4];

/// Embed a row-major 3x3 linear transform as a [`Matrix4`] with no
/// translation and unit weight.
pub fn matrix4_from_3x3(m: &[[f64; 3]; 3]) -> Matrix4 {
    let r = |row: &[f64; 3]| [row[0], row[1], row[2], 0.0];
    [r(&m[0]), r(&m[1]), r(&m[2]), [0.0, 0.0, 0.0, 1.0]]
}

/// Map a point through `m` and divide out the weight.
///
/// Near-zero weights fall back to the unweighted product (the point is
/// treated as a direction at infinity).
pub fn transform_point(m: &Matrix4, p: Point3) -> Point3 {
    let [x, y, z] = p;
    let r = |row: &[f64; 4]| row[0] * x + row[1] * y + row[2] * z + row[3];
    let (tx, ty, tz, w) = (r(&m[0]), r(&m[1]), r(&m[2]), r(&m[3]));
    if w.abs() <= crate::EPS_WEIGHT {
        [tx, ty, tz]
    } else {
        [tx / w, ty / w, tz / w]
    }
}
