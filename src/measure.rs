use crate::*;

/// Total polyline length. [`DISCONNECT`] markers split the array into
/// independent runs; `add_closure` closes each run back to its own start.
pub fn length(xyz: &[Point3], add_closure: bool) -> f64 {
    split_runs(xyz).map(|run| run_length(run, add_closure)).sum()
}

fn run_length(run: &[Point3], add_closure: bool) -> f64 {
    let open: f64 = run.windows(2).map(|w| dist(w[0], w[1])).sum();
    if add_closure && run.len() > 1 {
        open + dist(run[run.len() - 1], run[0])
    } else {
        open
    }
}

/// Iterator over maximal disconnect-free runs.
fn split_runs(xyz: &[Point3]) -> impl Iterator<Item = &[Point3]> {
    xyz.split(|&p| is_disconnect(p)).filter(|run| !run.is_empty())
}

/// Total length of many polylines.
pub fn length_of_polylines(polylines: &[Vec<Point3>], add_closure: bool) -> f64 {
    use rayon::prelude::*;

    polylines
        .par_iter()
        .map(|p| length(p, add_closure))
        .sum()
}

/// Length of homogeneous points: each point is divided by its weight before
/// measuring, unless the weight is near zero (a direction at infinity, copied
/// unweighted).
pub fn length_weighted(xyz: &[Point3], weights: Option<&[f64]>, add_closure: bool) -> f64 {
    let Some(weights) = weights else {
        return length(xyz, add_closure);
    };

    let unweighted = xyz
        .iter()
        .zip(weights)
        .map(|(&p, &w)| {
            if is_disconnect(p) || w.abs() <= EPS_WEIGHT {
                p
            } else {
                p.scale(w.recip())
            }
        })
        .collect::<Vec<_>>();
    length(&unweighted, add_closure)
}

/// Length of the segment starting at `index`, or 0 for an invalid index.
pub fn segment_length(points: &[Point3], index: usize) -> f64 {
    match points.get(index).zip(points.get(index + 1)) {
        Some((&a, &b)) => dist(a, b),
        None => 0.0,
    }
}

/// Sum of unsigned turning angles at the vertices.
///
/// `add_closure` wraps so every vertex turns; otherwise only interior
/// vertices contribute. Vertices where either adjacent edge is shorter than
/// `min_edge_length` are skipped.
pub fn sum_absolute_angles(xyz: &[Point3], add_closure: bool, min_edge_length: f64) -> f64 {
    let n = xyz.len();
    if n < 3 {
        return 0.0;
    }

    let turn = |prev: Point3, at: Point3, next: Point3| {
        let u = at.sub(prev);
        let v = next.sub(at);
        if u.mag() < min_edge_length || v.mag() < min_edge_length {
            return 0.0;
        }
        xprod(u, v).mag().atan2(dot_prod(u, v)).abs()
    };

    if add_closure {
        (0..n)
            .map(|i| turn(xyz[(i + n - 1) % n], xyz[i], xyz[(i + 1) % n]))
            .sum()
    } else {
        xyz.windows(3).map(|w| turn(w[0], w[1], w[2])).sum()
    }
}

/// True when the 4 edges 01, 12, 23, 30 are mutually perpendicular at each
/// corner, within a small-angle tolerance.
pub fn are_4_edges_perpendicular(points: &[Point3; 4]) -> bool {
    let edges = [
        points[1].sub(points[0]),
        points[2].sub(points[1]),
        points[3].sub(points[2]),
        points[0].sub(points[3]),
    ];
    edges.iter().zip(edges.iter().cycle().skip(1)).all(|(&a, &b)| {
        let scale = a.mag() * b.mag();
        scale > 0.0 && dot_prod(a, b).abs() <= EPS_ANGLE * scale
    })
}

/// Test whether the points form a rectangle, returning its frame (origin at
/// the first point, X along the first edge, Y in the rectangle plane).
///
/// Accepts 4 points, or 5 where the last repeats the first. With
/// `require_closure_point` only the 5-point form passes.
pub fn is_rectangle(points: &[Point3], require_closure_point: bool) -> Option<Frame> {
    let quad: [Point3; 4] = match points.len() {
        4 if !require_closure_point => points.try_into().ok()?,
        5 if same_point(points[4], points[0]) => points[..4].try_into().ok()?,
        _ => return None,
    };

    if !are_4_edges_perpendicular(&quad) {
        return None;
    }

    Frame::from_origin_and_points(quad[0], quad[1], quad[2])
}

/// Eliminate points that lie on the line from the last accepted point through
/// the following point, within `abs_tol` (derived from the data scale when
/// `None`).
///
/// `closed` additionally merges the tail onto the head when the wrap is
/// colinear; `xy_only` ignores Z in all tests. A second pass at the same
/// tolerance is a no-op.
pub fn compress_colinear_points(
    points: &mut Vec<Point3>,
    abs_tol: Option<f64>,
    closed: bool,
    xy_only: bool,
) {
    if points.len() < 3 {
        return;
    }
    let tol2 = {
        let t = abs_tol.unwrap_or_else(|| scaled_tolerance(points));
        t * t
    };

    let off_line = |a: Point3, p: Point3, b: Point3| off_line2(a, p, b, xy_only) > tol2;

    let mut out: Vec<Point3> = Vec::with_capacity(points.len());
    out.push(points[0]);
    for i in 1..points.len() - 1 {
        let a = *out.last().expect("seeded with first point");
        if off_line(a, points[i], points[i + 1]) {
            out.push(points[i]);
        }
    }
    out.push(points[points.len() - 1]);

    if closed && out.len() > 2 {
        if dist2(out[0], out[out.len() - 1]) <= tol2 {
            out.pop();
        }
        if out.len() > 2 && !off_line(out[out.len() - 1], out[0], out[1]) {
            out.remove(0);
        }
    }

    *points = out;
}

/// Squared distance of `p` from the line through `a` and `b`.
fn off_line2(a: Point3, p: Point3, b: Point3, xy_only: bool) -> f64 {
    let flat = |q: Point3| if xy_only { [q[0], q[1], 0.0] } else { q };
    let (a, p, b) = (flat(a), flat(p), flat(b));
    let v = b.sub(a);
    let vv = v.mag2();
    if vv <= EPS_DENOM {
        return dist2(p, a);
    }
    xprod(p.sub(a), v).mag2() / vv
}
