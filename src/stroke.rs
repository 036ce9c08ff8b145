use crate::*;

/// Caller-supplied faceting density. Counts are clamped to at least 1 stroke.
pub trait FacetOptions {
    /// Strokes for one line segment.
    fn segment_stroke_count(&self, segment: [Point3; 2]) -> usize;
    /// Strokes for one full arc sweep.
    fn ellipse_stroke_count(&self, arc: &Arc3) -> usize;
}

/// Chord-length/angle driven [`FacetOptions`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ChordOptions {
    pub max_edge_length: f64,
    pub max_sweep_radians: f64,
}

impl FacetOptions for ChordOptions {
    fn segment_stroke_count(&self, [a, b]: [Point3; 2]) -> usize {
        (safe_div(dist(a, b), self.max_edge_length, 1.0).ceil() as usize).max(1)
    }

    fn ellipse_stroke_count(&self, arc: &Arc3) -> usize {
        (safe_div(arc.sweep_radians.abs(), self.max_sweep_radians, 1.0).ceil() as usize).max(1)
    }
}

/// Elliptic arc: `center + vector0·cos(θ) + vector90·sin(θ)` over
/// `θ ∈ [start, start + sweep]`.
#[derive(Debug, Copy, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Arc3 {
    pub center: Point3,
    pub vector0: Point3,
    pub vector90: Point3,
    pub start_radians: f64,
    pub sweep_radians: f64,
}

impl Arc3 {
    pub fn angle_at(&self, fraction: f64) -> f64 {
        self.start_radians + fraction * self.sweep_radians
    }

    pub fn point_at(&self, fraction: f64) -> Point3 {
        let a = self.angle_at(fraction);
        self.center
            .add(self.vector0.scale(a.cos()))
            .add(self.vector90.scale(a.sin()))
    }
}

/// A stroke point with the source-curve parameterization.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StrokePoint {
    pub point: Point3,
    /// Global fraction on the source polyline.
    pub fraction: f64,
    /// Curve derivative with respect to the global fraction.
    pub tangent: Point3,
}

/// Append stroked points for the polyline between two fractions.
///
/// Each segment is cut into `segment_stroke_count` equal pieces. The exact
/// `[0, 1]` range strokes the polyline directly; sub-ranges extract via
/// [`copy_between_fractions`] first. Coincident consecutive points are
/// skipped, so joining strokes of adjacent ranges never doubles the seam
/// point. `false` when fewer than 2 points.
pub fn add_strokes(
    points: &[Point3],
    dest: &mut Vec<Point3>,
    options: &impl FacetOptions,
    include_start: bool,
    f0: f64,
    f1: f64,
) -> bool {
    if points.len() < 2 {
        return false;
    }

    let sub;
    let points = if f0 == 0.0 && f1 == 1.0 {
        points
    } else {
        sub = copy_between_fractions(points, f0, f1);
        sub.as_slice()
    };

    if include_start {
        add_point_if_distinct_from_back(dest, points[0]);
    }
    for w in points.windows(2) {
        let count = options.segment_stroke_count([w[0], w[1]]).max(1);
        for k in 1..=count {
            add_point_if_distinct_from_back(dest, lerp(w[0], w[1], k as f64 / count as f64));
        }
    }
    true
}

/// Append stroked points for an arc between two sweep fractions.
///
/// The full-sweep stroke count is prorated to the fraction interval.
pub fn add_arc_strokes(
    arc: &Arc3,
    dest: &mut Vec<Point3>,
    options: &impl FacetOptions,
    include_start: bool,
    f0: f64,
    f1: f64,
) -> bool {
    let full = options.ellipse_stroke_count(arc).max(1);
    let count = ((full as f64 * (f1 - f0).abs()).ceil() as usize).max(1);

    if include_start {
        add_point_if_distinct_from_back(dest, arc.point_at(f0));
    }
    for k in 1..=count {
        let f = f0 + (f1 - f0) * k as f64 / count as f64;
        add_point_if_distinct_from_back(dest, arc.point_at(f));
    }
    true
}

/// Stroke the polyline between two fractions, recording the source fraction
/// and tangent per emitted point.
///
/// `f0 > f1` strokes in reverse with decreasing fractions; tangents always
/// point in the source polyline's forward direction.
pub fn add_strokes_with_tangents(
    points: &[Point3],
    dest: &mut Vec<StrokePoint>,
    options: &impl FacetOptions,
    f0: f64,
    f1: f64,
) -> bool {
    if points.len() < 2 {
        return false;
    }

    let locs = locations_between_fractions(points, f0, f1);
    let push = |dest: &mut Vec<StrokePoint>, sp: StrokePoint| match dest.last() {
        Some(back) if same_point(back.point, sp.point) => (),
        _ => dest.push(sp),
    };

    if locs.len() < 2 {
        // degenerate interval, tangent from the containing segment
        let l = locs[0];
        let tangent = points[l.component_index + 1]
            .sub(points[l.component_index])
            .scale((points.len() - 1) as f64);
        push(
            dest,
            StrokePoint {
                point: l.point,
                fraction: l.fraction,
                tangent,
            },
        );
        return true;
    }

    for w in locs.windows(2) {
        let df = w[1].fraction - w[0].fraction;
        // chord derivative equals the segment derivative inside one segment
        let tangent = if df.abs() > EPS_DENOM {
            w[1].point.sub(w[0].point).scale(df.recip())
        } else {
            Point3::zero()
        };

        push(
            dest,
            StrokePoint {
                point: w[0].point,
                fraction: w[0].fraction,
                tangent,
            },
        );
        let count = options.segment_stroke_count([w[0].point, w[1].point]).max(1);
        for k in 1..=count {
            let s = k as f64 / count as f64;
            push(
                dest,
                StrokePoint {
                    point: lerp(w[0].point, w[1].point, s),
                    fraction: w[0].fraction + df * s,
                    tangent,
                },
            );
        }
    }
    true
}

/// Number of points [`add_strokes`] emits for this range with
/// `include_start`, before coincident-point suppression.
pub fn get_stroke_count(
    points: &[Point3],
    options: &impl FacetOptions,
    f0: f64,
    f1: f64,
) -> usize {
    if points.len() < 2 {
        return 0;
    }
    let sub;
    let points = if f0 == 0.0 && f1 == 1.0 {
        points
    } else {
        sub = copy_between_fractions(points, f0, f1);
        sub.as_slice()
    };
    1 + points
        .windows(2)
        .map(|w| options.segment_stroke_count([w[0], w[1]]).max(1))
        .sum::<usize>()
}
