use crate::*;

/// A point on a polyline with its parameterization.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CurveLocation {
    pub point: Point3,
    /// Global fraction over the whole polyline.
    pub fraction: f64,
    /// Containing segment.
    pub component_index: usize,
    /// Fraction within the containing segment.
    pub component_fraction: f64,
}

/// Result of walking a signed distance from a start fraction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DistanceSearch {
    pub fraction: f64,
    pub segment_index: usize,
    pub segment_fraction: f64,
    /// Distance actually travelled. Smaller in magnitude than requested when
    /// the polyline is exhausted.
    pub actual_distance: f64,
}

/// Point at a global fraction, extrapolating outside `[0, 1]`.
pub fn fraction_to_point(points: &[Point3], fraction: f64) -> Option<Point3> {
    let d = polyline_fraction_to_segment_data(points.len(), fraction)?;
    Some(lerp(
        points[d.segment_index],
        points[d.segment_index + 1],
        d.segment_fraction,
    ))
}

/// Point at a local fraction of a segment; the index is clamped to the last
/// segment.
pub fn segment_fraction_to_point(
    points: &[Point3],
    segment_index: usize,
    segment_fraction: f64,
) -> Option<Point3> {
    if points.len() < 2 {
        return None;
    }
    let i = segment_index.min(points.len() - 2);
    Some(lerp(points[i], points[i + 1], segment_fraction))
}

/// Point and tangent at a global fraction. The tangent is the containing
/// segment's vector scaled by the segment count, the derivative with respect
/// to the global fraction.
pub fn polyline_fraction_to_ray(points: &[Point3], fraction: f64) -> Option<(Point3, Point3)> {
    let d = polyline_fraction_to_segment_data(points.len(), fraction)?;
    let a = points[d.segment_index];
    let b = points[d.segment_index + 1];
    Some((
        lerp(a, b, d.segment_fraction),
        b.sub(a).scale(d.num_segment as f64),
    ))
}

/// Append `p` unless it coincides with the current back point.
pub fn add_point_if_distinct_from_back(dest: &mut Vec<Point3>, p: Point3) {
    match dest.last() {
        Some(&back) if same_point(back, p) => (),
        _ => dest.push(p),
    }
}

/// Close a polyline exactly: a last point coincident with the first is
/// snapped onto it, otherwise the first point is appended.
pub fn enforce_closure(points: &mut Vec<Point3>) {
    let snapped = match points.as_mut_slice() {
        [] | [_] => return,
        [first, .., last] => {
            if same_point(*first, *last) {
                *last = *first;
                true
            } else {
                false
            }
        }
    };
    if !snapped {
        let first = points[0];
        points.push(first);
    }
}

/// Extract the sub-polyline between two fractions.
///
/// Walks forward or backward depending on which fraction is larger;
/// coincident consecutive points are skipped.
pub fn copy_between_fractions(points: &[Point3], f0: f64, f1: f64) -> Vec<Point3> {
    locations_between_fractions(points, f0, f1)
        .into_iter()
        .map(|l| l.point)
        .collect()
}

/// [`copy_between_fractions`] keeping the full parameterization per point.
pub fn locations_between_fractions(points: &[Point3], f0: f64, f1: f64) -> Vec<CurveLocation> {
    let n = points.len();
    if n == 0 {
        return vec![];
    }
    if n == 1 {
        return vec![CurveLocation {
            point: points[0],
            fraction: f0,
            component_index: 0,
            component_fraction: 0.0,
        }];
    }

    let num_segment = n - 1;
    let at = |f: f64| {
        let d = polyline_fraction_to_segment_data(n, f).expect("n >= 2");
        CurveLocation {
            point: lerp(
                points[d.segment_index],
                points[d.segment_index + 1],
                d.segment_fraction,
            ),
            fraction: f,
            component_index: d.segment_index,
            component_fraction: d.segment_fraction,
        }
    };
    let at_vertex = |k: usize| at(k as f64 / num_segment as f64);

    let d0 = polyline_fraction_to_segment_data(n, f0).expect("n >= 2");
    let d1 = polyline_fraction_to_segment_data(n, f1).expect("n >= 2");

    let mut out: Vec<CurveLocation> = vec![at(f0)];
    let push = |out: &mut Vec<CurveLocation>, l: CurveLocation| {
        match out.last() {
            Some(back) if same_point(back.point, l.point) => (),
            _ => out.push(l),
        }
    };

    if f1 >= f0 {
        // interior vertices strictly between the two fractions
        for k in d0.segment_index + 1..=d1.segment_index {
            if (k as f64 / num_segment as f64) > f0 {
                push(&mut out, at_vertex(k));
            }
        }
    } else {
        for k in (d1.segment_index + 1..=d0.segment_index).rev() {
            if (k as f64 / num_segment as f64) < f0 {
                push(&mut out, at_vertex(k));
            }
        }
    }

    push(&mut out, at(f1));
    out
}

/// Arc length between two fractions, negative when `f1 < f0`.
pub fn signed_distance_between_fractions(points: &[Point3], f0: f64, f1: f64) -> f64 {
    let n = points.len();
    let (Some(d0), Some(d1)) = (
        polyline_fraction_to_segment_data(n, f0.min(f1)),
        polyline_fraction_to_segment_data(n, f0.max(f1)),
    ) else {
        return 0.0;
    };
    let sign = if f1 >= f0 { 1.0 } else { -1.0 };

    let magnitude = if d0.segment_index == d1.segment_index {
        (d1.segment_fraction - d0.segment_fraction) * segment_length(points, d0.segment_index)
    } else {
        let head = (1.0 - d0.segment_fraction) * segment_length(points, d0.segment_index);
        let tail = d1.segment_fraction * segment_length(points, d1.segment_index);
        let middle: f64 = (d0.segment_index + 1..d1.segment_index)
            .map(|i| segment_length(points, i))
            .sum();
        head + middle + tail
    };

    sign * magnitude
}

/// Walk `signed_distance` along the polyline from `start_fraction`.
///
/// Travels forward for non-negative distances, backward otherwise, and stops
/// at the polyline end when the distance cannot be achieved; compare
/// `actual_distance` against the request to detect that.
pub fn fraction_at_signed_distance(
    points: &[Point3],
    start_fraction: f64,
    signed_distance: f64,
) -> Option<DistanceSearch> {
    let n = points.len();
    let d = polyline_fraction_to_segment_data(n, start_fraction)?;
    let num_segment = d.num_segment;

    let mut i = d.segment_index;
    let mut sf = d.segment_fraction;
    let mut remaining = signed_distance.abs();
    let forward = signed_distance >= 0.0;

    loop {
        let len = segment_length(points, i);
        let available = if forward { (1.0 - sf) * len } else { sf * len };

        if remaining <= available {
            let step = safe_div(remaining, len, 0.0);
            sf = if forward { sf + step } else { sf - step };
            return Some(DistanceSearch {
                fraction: segment_fraction_to_polyline_fraction(i, num_segment, sf),
                segment_index: i,
                segment_fraction: sf,
                actual_distance: signed_distance,
            });
        }

        remaining -= available;
        if forward {
            if i + 1 >= num_segment {
                return Some(DistanceSearch {
                    fraction: 1.0,
                    segment_index: num_segment - 1,
                    segment_fraction: 1.0,
                    actual_distance: signed_distance - remaining,
                });
            }
            i += 1;
            sf = 0.0;
        } else {
            if i == 0 {
                return Some(DistanceSearch {
                    fraction: 0.0,
                    segment_index: 0,
                    segment_fraction: 0.0,
                    actual_distance: signed_distance + remaining,
                });
            }
            i -= 1;
            sf = 1.0;
        }
    }
}

/// Frame at a fraction: origin on the polyline, X along the curve, Y toward
/// the nearest off-line vertex.
///
/// When every vertex is on the line, falls back to a frame pinned only by the
/// line direction; fails only when no direction exists at all.
pub fn fraction_to_frenet_frame(points: &[Point3], fraction: f64) -> Option<Frame> {
    let d = polyline_fraction_to_segment_data(points.len(), fraction)?;
    let origin = lerp(
        points[d.segment_index],
        points[d.segment_index + 1],
        d.segment_fraction,
    );

    // nearest distinct point establishes the tangent, searching outward from
    // the containing segment
    let ordered = outward(points.len(), d.segment_index);
    let x_point = ordered
        .iter()
        .map(|&k| points[k])
        .find(|&p| !same_point(p, origin))?;
    let dir = x_point.sub(origin);

    for &k in &ordered {
        let off = points[k].sub(origin);
        if xprod(dir, off).mag() > EPS_LEN * dir.mag().max(1.0) {
            return Frame::from_origin_and_points(origin, x_point, points[k]);
        }
    }

    Frame::from_origin_and_direction(origin, dir)
}

/// Vertex indices ordered by proximity to segment `i`: its far end, then
/// alternating outward.
fn outward(n: usize, i: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(n);
    let (mut fwd, mut back) = (i + 1, i as isize);
    while fwd < n || back >= 0 {
        if fwd < n {
            order.push(fwd);
            fwd += 1;
        }
        if back >= 0 {
            order.push(back as usize);
            back -= 1;
        }
    }
    order
}

/// Length and length-weighted centroid of the wire between two fractions.
///
/// A zero-length interval reports the point at `f0` with length 0.
pub fn wire_centroid(points: &[Point3], f0: f64, f1: f64) -> Option<(f64, Point3)> {
    let sub = copy_between_fractions(points, f0, f1);
    let first = *sub.first()?;

    let mut total = 0.0;
    let mut moment = Point3::zero();
    for w in sub.windows(2) {
        let len = dist(w[0], w[1]);
        total += len;
        moment = moment.add(lerp(w[0], w[1], 0.5).scale(len));
    }

    if total <= EPS_LEN {
        return Some((0.0, first));
    }
    Some((total, moment.scale(total.recip())))
}
