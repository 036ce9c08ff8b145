use crate::*;

/// Result of a closest-point search along a polyline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClosestPointDetail {
    /// Closest point, on the original (unprojected) polyline.
    pub point: Point3,
    /// Global fraction over `num_edge` uniform segments.
    pub fraction: f64,
    pub edge_index: usize,
    pub num_edge: usize,
    pub edge_fraction: f64,
    /// Minimized distance: 3D for [`closest_point`], projected-XY for
    /// [`closest_point_xy`].
    pub distance: f64,
}

/// Closest point on a polyline, 3D distance.
pub fn closest_point(xyz: &[Point3], add_closure: bool, space_point: Point3) -> Option<ClosestPointDetail> {
    search(xyz, add_closure, space_point, None, false, false)
}

/// Closest point with optional unbounded extension of the terminal segments.
///
/// `extend0`/`extend1` only take effect when the best bounded candidate sits
/// exactly on the first/last vertex; a closure edge forces both off.
pub fn closest_point_extended(
    xyz: &[Point3],
    add_closure: bool,
    space_point: Point3,
    extend0: bool,
    extend1: bool,
) -> Option<ClosestPointDetail> {
    search(xyz, add_closure, space_point, None, extend0, extend1)
}

/// Closest point measured in XY after an optional homogeneous projection.
///
/// The projection applies to both the polyline and the space point; the
/// returned `point` is interpolated on the original polyline. A plain 3x3
/// transform embeds losslessly via [`matrix4_from_3x3`].
pub fn closest_point_xy(
    xyz: &[Point3],
    add_closure: bool,
    space_point: Point3,
    world_to_local: Option<&Matrix4>,
    extend0: bool,
    extend1: bool,
) -> Option<ClosestPointDetail> {
    search(xyz, add_closure, space_point, Some(world_to_local), extend0, extend1)
}

/// `projection`: `None` = 3D metric, `Some(m)` = XY metric after optional `m`.
fn search(
    xyz: &[Point3],
    add_closure: bool,
    space_point: Point3,
    projection: Option<Option<&Matrix4>>,
    extend0: bool,
    extend1: bool,
) -> Option<ClosestPointDetail> {
    let n = xyz.len();
    if n == 0 {
        return None;
    }

    // extension is meaningless once a synthetic closing edge exists
    let (extend0, extend1) = if add_closure {
        (false, false)
    } else {
        (extend0, extend1)
    };

    let local = |p: Point3| match projection {
        None => p,
        Some(None) => p,
        Some(Some(m)) => transform_point(m, p),
    };
    let metric2 = |a: Point3, b: Point3| match projection {
        None => dist2(a, b),
        Some(_) => dist2(a.to_p2(), b.to_p2()),
    };

    let sp = local(space_point);

    if n == 1 {
        return Some(ClosestPointDetail {
            point: xyz[0],
            fraction: 0.0,
            edge_index: 0,
            num_edge: 0,
            edge_fraction: 0.0,
            distance: metric2(local(xyz[0]), sp).sqrt(),
        });
    }

    let num_edge = if add_closure { n } else { n - 1 };

    let mut best: Option<(f64, usize, f64)> = None; // (d2, edge, edge fraction)
    for i in 0..num_edge {
        let p0 = local(xyz[i]);
        let p1 = local(xyz[(i + 1) % n]);
        let v = p1.sub(p0);
        let u = sp.sub(p0);
        let (vv, uv) = match projection {
            None => (v.mag2(), dot_prod(u, v)),
            Some(_) => (v.to_p2().mag2(), {
                let [ux, uy] = u.to_p2();
                let [vx, vy] = v.to_p2();
                ux * vx + uy * vy
            }),
        };
        let s = clamp01(safe_div(uv, vv, 0.0));
        let candidate = lerp(p0, p1, s);
        let d2 = metric2(candidate, sp);
        // strict comparison keeps the lowest-index candidate on ties
        if best.map_or(true, |(bd2, ..)| d2 < bd2) {
            best = Some((d2, i, s));
        }
    }

    let (mut d2, edge_index, mut edge_fraction) = best?;

    // unbounded projection onto a terminal segment, only from an exact
    // terminal-vertex hit
    if extend0 && edge_index == 0 && edge_fraction == 0.0 {
        if let Some((s, cd2)) = unbounded(local(xyz[0]), local(xyz[1]), sp, &metric2) {
            if s < 0.0 {
                (d2, edge_fraction) = (cd2, s);
            }
        }
    }
    if extend1 && edge_index == num_edge - 1 && edge_fraction == 1.0 {
        if let Some((s, cd2)) = unbounded(local(xyz[n - 2]), local(xyz[n - 1]), sp, &metric2) {
            if s > 1.0 {
                (d2, edge_fraction) = (cd2, s);
            }
        }
    }

    Some(ClosestPointDetail {
        point: lerp(xyz[edge_index], xyz[(edge_index + 1) % n], edge_fraction),
        fraction: segment_fraction_to_polyline_fraction(edge_index, num_edge, edge_fraction),
        edge_index,
        num_edge,
        edge_fraction,
        distance: d2.sqrt(),
    })
}

fn unbounded(
    p0: Point3,
    p1: Point3,
    sp: Point3,
    metric2: &impl Fn(Point3, Point3) -> f64,
) -> Option<(f64, f64)> {
    let v = p1.sub(p0);
    let vv = v.mag2();
    (vv > EPS_DENOM).then(|| {
        let s = dot_prod(sp.sub(p0), v) / vv;
        (s, metric2(lerp(p0, p1, s), sp))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn right_angle() -> Vec<Point3> {
        vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0]]
    }

    #[test]
    fn right_angle_query() {
        // equidistant from both legs; the vertical leg's interior point wins
        // over the horizontal leg only by distance, and the true optimum is
        // (10,5,0) on edge 1 at fraction 0.5
        let d = closest_point(&right_angle(), false, [5.0, 5.0, 0.0]).unwrap();
        assert_eq!(d.point, [10.0, 5.0, 0.0]);
        assert_eq!(d.edge_index, 1);
        assert_eq!(d.edge_fraction, 0.5);
        assert_eq!(d.num_edge, 2);
        assert!((d.fraction - 0.75).abs() < 1e-14);
        assert!((d.distance - 5.0).abs() < 1e-12);
    }

    #[test]
    fn tie_keeps_lowest_index() {
        // equidistant from the shared vertex via both edges
        let d = closest_point(&right_angle(), false, [11.0, -1.0, 0.0]).unwrap();
        assert_eq!(d.point, [10.0, 0.0, 0.0]);
        assert_eq!(d.edge_index, 0);
        assert_eq!(d.edge_fraction, 1.0);
    }

    #[test]
    fn empty_and_single() {
        assert_eq!(closest_point(&[], false, [0.0; 3]), None);

        let d = closest_point(&[[1.0, 2.0, 3.0]], false, [1.0, 2.0, 7.0]).unwrap();
        assert_eq!(d.point, [1.0, 2.0, 3.0]);
        assert_eq!(d.num_edge, 0);
        assert!((d.distance - 4.0).abs() < 1e-12);
    }

    #[test]
    fn closure_edge_participates() {
        let square = [
            [0.0, 0.0, 0.0],
            [10.0, 0.0, 0.0],
            [10.0, 10.0, 0.0],
            [0.0, 10.0, 0.0],
        ];
        // nearest to the synthetic closing edge x=0
        let d = closest_point(&square, true, [-2.0, 5.0, 0.0]).unwrap();
        assert_eq!(d.point, [0.0, 5.0, 0.0]);
        assert_eq!(d.edge_index, 3);
        assert_eq!(d.num_edge, 4);
        assert_eq!(d.edge_fraction, 0.5);

        let d = closest_point(&square, false, [-2.0, 5.0, 0.0]).unwrap();
        assert_ne!(d.point, [0.0, 5.0, 0.0]);
    }

    #[test]
    fn extension_before_start() {
        let line = [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]];
        let d = closest_point_extended(&line, false, [-3.0, 1.0, 0.0], true, false).unwrap();
        assert_eq!(d.point, [-3.0, 0.0, 0.0]);
        assert!(d.edge_fraction < 0.0);
        assert!((d.distance - 1.0).abs() < 1e-12);

        // without the flag the start vertex is the answer
        let d = closest_point_extended(&line, false, [-3.0, 1.0, 0.0], false, false).unwrap();
        assert_eq!(d.point, [0.0, 0.0, 0.0]);
        assert_eq!(d.edge_fraction, 0.0);
    }

    #[test]
    fn extension_past_end() {
        let line = [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [20.0, 0.0, 0.0]];
        let d = closest_point_extended(&line, false, [25.0, 2.0, 0.0], false, true).unwrap();
        assert_eq!(d.point, [25.0, 0.0, 0.0]);
        assert_eq!(d.edge_index, 1);
        assert!(d.edge_fraction > 1.0);
    }

    #[test]
    fn closure_disables_extension() {
        let tri = [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [5.0, 10.0, 0.0]];
        let d = closest_point_xy(&tri, true, [-5.0, -5.0, 0.0], None, true, true).unwrap();
        // stays on the polyline: no extrapolated edge fraction
        assert!((0.0..=1.0).contains(&d.edge_fraction));
        assert_eq!(d.point, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn xy_ignores_z() {
        let line = [[0.0, 0.0, 100.0], [10.0, 0.0, -50.0]];
        let d = closest_point_xy(&line, false, [5.0, 3.0, 0.0], None, false, false).unwrap();
        assert!((d.distance - 3.0).abs() < 1e-12);
        assert_eq!(d.edge_fraction, 0.5);
        // returned point is on the original 3D polyline
        assert_eq!(d.point, [5.0, 0.0, 25.0]);
    }

    #[test]
    fn xy_with_projection() {
        // rotate 90° about z: (x,y) -> (-y,x); queries measure against the
        // projected coordinates
        let m: Matrix4 = [
            [0.0, -1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let line = [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]];
        let d = closest_point_xy(&line, false, [5.0, 2.0, 0.0], Some(&m), false, false).unwrap();
        assert_eq!(d.edge_fraction, 0.5);
        assert!((d.distance - 2.0).abs() < 1e-12);

        // the same rotation given as a plain 3x3
        let m3 = matrix4_from_3x3(&[[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_eq!(m3, m);
        let d3 = closest_point_xy(&line, false, [5.0, 2.0, 0.0], Some(&m3), false, false).unwrap();
        assert_eq!(d3, d);
    }
}
