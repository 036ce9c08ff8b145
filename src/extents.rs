use crate::*;

pub type Extents2 = Extents<Point2>;
pub type Extents3 = Extents<Point3>;

#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Extents<P> {
    pub origin: P,
    pub size: P,
}

impl<P> Extents<P>
where
    P: Copy + Point + Add,
{
    pub fn zero() -> Self {
        Self {
            origin: P::zero(),
            size: P::zero(),
        }
    }

    pub fn from_min_max(min: P, max: P) -> Self {
        let size = max.sub(min);

        Self { origin: min, size }
    }

    pub fn max(&self) -> P {
        self.origin.add(self.size)
    }

    pub fn union(self, other: Self) -> Self {
        let origin = self.origin.min_all(other.origin);
        let max = self.max().max_all(other.max());
        let size = max.sub(origin);

        Self { origin, size }
    }
}

impl Extents3 {
    /// Return the 8 corners of this box.
    ///
    /// The clip engine classifies these against a region set to decide the
    /// whole-mesh trivial accept/reject fast path.
    pub fn corners(&self) -> [Point3; 8] {
        let [x0, y0, z0] = self.origin;
        let [x1, y1, z1] = self.max();
        [
            [x0, y0, z0],
            [x1, y0, z0],
            [x1, y1, z0],
            [x0, y1, z0],
            [x0, y0, z1],
            [x1, y0, z1],
            [x1, y1, z1],
            [x0, y1, z1],
        ]
    }
}

impl FromIterator<Point3> for Extents3 {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Point3>,
    {
        let mut iter = iter.into_iter().filter(|&p| !is_disconnect(p));
        let Some(init) = iter.next() else {
            return Self::zero();
        };

        let (min, max) = iter.fold((init, init), |(min, max), p| {
            (min.min_all(p), max.max_all(p))
        });

        Self::from_min_max(min, max)
    }
}

impl FromIterator<Point2> for Extents2 {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Point2>,
    {
        let mut iter = iter.into_iter();
        let Some(init) = iter.next() else {
            return Self::zero();
        };

        let (min, max) = iter.fold((init, init), |(min, max), p| {
            (min.min_all(p), max.max_all(p))
        });

        Self::from_min_max(min, max)
    }
}

impl Envelops<Point3> for Extents3 {
    fn envelops(&self, p: Point3) -> bool {
        let [x, y, z] = p;

        let [mx, my, mz] = self.origin;

        if x < mx || y < my || z < mz {
            return false;
        }

        let [mx, my, mz] = self.max();

        x <= mx && y <= my && z <= mz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;

    type P3 = (f64, f64, f64);
    type E = (P3, P3);

    fn to_p(p: P3) -> Point3 {
        [p.0, p.1, p.2]
    }

    fn to_e((a, b): E) -> Option<Extents3> {
        let a = to_p(a);
        let b = to_p(b);

        a.iter()
            .chain(&b)
            .all(|x| x.is_finite())
            .then(|| Extents3::from_iter([a, b]))
            .filter(|x| x.size.iter().all(|&x| x > 0.0))
    }

    #[quickcheck]
    fn union_envelops_both(a: E, b: E) -> TestResult {
        let Some(a) = to_e(a) else {
            return TestResult::discard();
        };
        let Some(b) = to_e(b) else {
            return TestResult::discard();
        };

        let u = a.union(b);
        TestResult::from_bool(
            u.envelops(a.origin) && u.envelops(a.max()) && u.envelops(b.origin) && u.envelops(b.max()),
        )
    }

    #[quickcheck]
    fn corners_are_enveloped(a: E) -> TestResult {
        let Some(a) = to_e(a) else {
            return TestResult::discard();
        };

        TestResult::from_bool(a.corners().into_iter().all(|c| a.envelops(c)))
    }

    #[test]
    fn from_iter_skips_disconnects() {
        let e = Extents3::from_iter([[0.0, 0.0, 0.0], DISCONNECT, [2.0, 3.0, 4.0]]);
        assert_eq!(e.origin, [0.0, 0.0, 0.0]);
        assert_eq!(e.max(), [2.0, 3.0, 4.0]);
    }

    #[test]
    fn envelops_boundaries() {
        let e = Extents3::from_min_max(Point3::zero(), Point3::one());
        assert!(e.envelops([0.0, 0.0, 0.0]));
        assert!(e.envelops([1.0, 1.0, 1.0]));
        assert!(e.envelops([0.5, 0.5, 0.5]));
        assert!(!e.envelops([1.5, 0.5, 0.5]));
        assert!(!e.envelops([0.5, -0.1, 0.5]));
    }
}
