use crate::*;

pub type Tri = [Point3; 3];

/// Quality score favouring well-shaped triangles: area over the sum of
/// squared edge lengths. Degenerate triangles score 0.
fn aspect(t: &Tri) -> f64 {
    let u = t[1].sub(t[0]);
    let v = t[2].sub(t[0]);
    let w = t[2].sub(t[1]);
    let area = xprod(u, v).mag() * 0.5;
    safe_div(area, u.mag2() + v.mag2() + w.mag2(), 0.0)
}

fn normal(t: &Tri) -> Point3 {
    xprod(t[1].sub(t[0]), t[2].sub(t[0]))
}

/// Score reduction when a candidate's normal flips against the previous
/// triangle's.
const FLIP_PENALTY: f64 = 0.1;

struct Stepper<'a> {
    a: &'a [Point3],
    b: &'a [Point3],
    ia: usize,
    ib: usize,
    prev_normal: Option<Point3>,
}

#[derive(Copy, Clone)]
enum Advance {
    A,
    B,
}

/// Two-step continuations considered at each step: advance twice on one
/// side, or once on each (the "skip" pairing).
const CANDIDATE_PAIRS: [[Advance; 2]; 3] = [
    [Advance::A, Advance::A],
    [Advance::A, Advance::B],
    [Advance::B, Advance::B],
];

fn step_indices(ia: usize, ib: usize, adv: Advance) -> (usize, usize) {
    match adv {
        Advance::A => (ia + 1, ib),
        Advance::B => (ia, ib + 1),
    }
}

impl<'a> Stepper<'a> {
    fn triangle_at(&self, ia: usize, ib: usize, adv: Advance) -> Option<Tri> {
        match adv {
            Advance::A => {
                (ia + 1 < self.a.len()).then(|| [self.a[ia], self.a[ia + 1], self.b[ib]])
            }
            Advance::B => {
                (ib + 1 < self.b.len()).then(|| [self.a[ia], self.b[ib + 1], self.b[ib]])
            }
        }
    }

    fn candidate(&self, adv: Advance) -> Option<Tri> {
        self.triangle_at(self.ia, self.ib, adv)
    }

    fn score(&self, t: &Tri, base: Option<Point3>) -> f64 {
        let q = aspect(t);
        match base {
            Some(n) if dot_prod(n, normal(t)) < 0.0 => q * FLIP_PENALTY,
            _ => q,
        }
    }

    /// Minimax score of a two-step continuation: the pair is only as good as
    /// its worse triangle. `None` when the first step is off the end; a
    /// missing second step degrades the pair to its first triangle alone.
    fn pair_score(&self, steps: [Advance; 2]) -> Option<f64> {
        let first = self.triangle_at(self.ia, self.ib, steps[0])?;
        let mut score = self.score(&first, self.prev_normal);
        let (ia, ib) = step_indices(self.ia, self.ib, steps[0]);
        if let Some(second) = self.triangle_at(ia, ib, steps[1]) {
            let n = normal(&first);
            let base = (n.mag2() > EPS_DENOM).then_some(n).or(self.prev_normal);
            score = score.min(self.score(&second, base));
        }
        Some(score)
    }

    /// Pair with the largest minimax score; ties keep the A side.
    fn best_pair(&self) -> Option<[Advance; 2]> {
        let mut best: Option<([Advance; 2], f64)> = None;
        for steps in CANDIDATE_PAIRS {
            if let Some(s) = self.pair_score(steps) {
                if best.map_or(true, |(_, b)| s > b) {
                    best = Some((steps, s));
                }
            }
        }
        best.map(|(steps, _)| steps)
    }

    /// One-based source indices: positive from A, negative from B.
    fn indices(&self, adv: Advance) -> [i32; 3] {
        let (ia, ib) = (self.ia as i32 + 1, self.ib as i32 + 1);
        match adv {
            Advance::A => [ia, ia + 1, -ib],
            Advance::B => [ia, -(ib + 1), -ib],
        }
    }

    fn take(&mut self, adv: Advance, t: Tri) -> (Tri, [i32; 3]) {
        let idx = self.indices(adv);
        match adv {
            Advance::A => self.ia += 1,
            Advance::B => self.ib += 1,
        }
        let n = normal(&t);
        if n.mag2() > EPS_DENOM {
            self.prev_normal = Some(n);
        }
        (t, idx)
    }

    fn done(&self) -> bool {
        self.ia + 1 >= self.a.len() && self.ib + 1 >= self.b.len()
    }
}

/// Bridge two linestrings with a triangle strip. Each step scores up to
/// three two-triangle continuations (advance twice on A, twice on B, or once
/// on each) by the worse aspect ratio of the pair and commits the winner, so
/// a marginally fatter triangle never buys a sliver right behind it.
///
/// Normal flips against the previous triangle are penalized to discourage
/// self-intersecting strips. `one_based_ab_index` optionally receives three
/// entries per triangle: positive one-based indices into `a`, negative into
/// `b`. Equal-length inputs of `n` points yield exactly `2(n-1)` triangles.
pub fn greedy_triangulation_between_linestrings(
    a: &[Point3],
    b: &[Point3],
    triangles: &mut Vec<Tri>,
    mut one_based_ab_index: Option<&mut Vec<i32>>,
) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }

    let mut s = Stepper {
        a,
        b,
        ia: 0,
        ib: 0,
        prev_normal: None,
    };

    while !s.done() {
        let Some(steps) = s.best_pair() else { break };
        for adv in steps {
            let Some(t) = s.candidate(adv) else { continue };
            let (t, idx) = s.take(adv, t);
            triangles.push(t);
            if let Some(channel) = one_based_ab_index.as_mut() {
                channel.extend(idx);
            }
        }
    }
    true
}

/// [`greedy_triangulation_between_linestrings`] that first continues fans
/// within planar runs.
///
/// While a candidate's normal stays within `planar_continuation_radians` of
/// the previous triangle's plane the fan is extended on that side before the
/// aspect heuristic decides.
pub fn greedy_triangulation_with_planar_continuation(
    a: &[Point3],
    b: &[Point3],
    planar_continuation_radians: f64,
    triangles: &mut Vec<Tri>,
    mut one_based_ab_index: Option<&mut Vec<i32>>,
) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }

    let cos_tol = planar_continuation_radians.cos();
    let coplanar = |base: Point3, t: &Tri| {
        let n = normal(t);
        let denom = base.mag() * n.mag();
        denom > EPS_DENOM && dot_prod(base, n) >= cos_tol * denom
    };

    let mut s = Stepper {
        a,
        b,
        ia: 0,
        ib: 0,
        prev_normal: None,
    };

    while !s.done() {
        let planar_pick = s.prev_normal.and_then(|base| {
            match (s.candidate(Advance::A), s.candidate(Advance::B)) {
                (Some(ta), _) if coplanar(base, &ta) => Some((Advance::A, ta)),
                (_, Some(tb)) if coplanar(base, &tb) => Some((Advance::B, tb)),
                _ => None,
            }
        });

        if let Some((adv, t)) = planar_pick {
            let (t, idx) = s.take(adv, t);
            triangles.push(t);
            if let Some(channel) = one_based_ab_index.as_mut() {
                channel.extend(idx);
            }
            continue;
        }

        let Some(steps) = s.best_pair() else { break };
        for adv in steps {
            let Some(t) = s.candidate(adv) else { continue };
            let (t, idx) = s.take(adv, t);
            triangles.push(t);
            if let Some(channel) = one_based_ab_index.as_mut() {
                channel.extend(idx);
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;

    fn offset_line(n: usize, y: f64) -> Vec<Point3> {
        (0..n).map(|i| [i as f64, y, 0.0]).collect()
    }

    #[test]
    fn equal_length_strip_count() {
        for n in 2..8 {
            let a = offset_line(n, 0.0);
            let b = offset_line(n, 1.0);
            let mut tris = vec![];
            assert!(greedy_triangulation_between_linestrings(&a, &b, &mut tris, None));
            assert_eq!(tris.len(), 2 * (n - 1));
            for t in &tris {
                assert!(aspect(t) > 0.0);
            }
        }
    }

    #[quickcheck]
    fn strip_count_is_total_advance(na: usize, nb: usize) -> TestResult {
        let (na, nb) = (1 + na % 10, 1 + nb % 10);
        if na + nb < 3 {
            return TestResult::discard();
        }
        let a = offset_line(na, 0.0);
        let b = offset_line(nb, 2.0);
        let mut tris = vec![];
        greedy_triangulation_between_linestrings(&a, &b, &mut tris, None);
        TestResult::from_bool(tris.len() == (na - 1) + (nb - 1))
    }

    #[test]
    fn empty_input_fails() {
        let mut tris = vec![];
        assert!(!greedy_triangulation_between_linestrings(&[], &offset_line(3, 0.0), &mut tris, None));
        assert!(tris.is_empty());
    }

    #[test]
    fn fan_from_single_point() {
        let a = [[0.0, 5.0, 0.0]];
        let b = offset_line(4, 0.0);
        let mut tris = vec![];
        greedy_triangulation_between_linestrings(&a, &b, &mut tris, None);
        assert_eq!(tris.len(), 3);
        for t in &tris {
            assert_eq!(t[0], [0.0, 5.0, 0.0]);
        }
    }

    #[test]
    fn avoids_thin_triangles() {
        // b's second vertex is far along; advancing A first keeps the strip fat
        let a = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let b = [[0.0, 1.0, 0.0], [2.0, 1.0, 0.0]];
        let mut tris = vec![];
        greedy_triangulation_between_linestrings(&a, &b, &mut tris, None);
        assert_eq!(tris.len(), 3);
        assert_eq!(tris[0], [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    }

    #[test]
    fn lookahead_weighs_the_following_triangle() {
        // b's tail swings far out: advancing b first looks marginally fatter
        // in isolation but forces a sliver next, so the pair minimax starts
        // the strip on a
        let a = [[0.0, 0.0, 0.0], [1.2, 0.0, 0.0]];
        let b = [[0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [5.0, 1.0, 0.0]];
        let mut tris = vec![];
        greedy_triangulation_between_linestrings(&a, &b, &mut tris, None);
        assert_eq!(tris.len(), 3);
        assert_eq!(tris[0], [[0.0, 0.0, 0.0], [1.2, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    }

    #[test]
    fn index_channel_signs() {
        let a = offset_line(2, 0.0);
        let b = offset_line(2, 1.0);
        let mut tris = vec![];
        let mut idx = vec![];
        greedy_triangulation_between_linestrings(&a, &b, &mut tris, Some(&mut idx));
        assert_eq!(idx.len(), 3 * tris.len());
        // every entry is a valid one-based reference into its source
        for chunk in idx.chunks(3) {
            for &i in chunk {
                assert_ne!(i, 0);
                if i > 0 {
                    assert!((i as usize) <= a.len());
                } else {
                    assert!((-i as usize) <= b.len());
                }
            }
        }
    }

    #[test]
    fn planar_continuation_matches_count() {
        let a = offset_line(5, 0.0);
        let b = offset_line(5, 1.0);
        let mut tris = vec![];
        assert!(greedy_triangulation_with_planar_continuation(
            &a, &b, 0.1, &mut tris, None
        ));
        assert_eq!(tris.len(), 8);
        // coplanar input: every triangle shares the plane normal direction
        let n0 = normal(&tris[0]);
        for t in &tris {
            assert!(dot_prod(n0, normal(t)) > 0.0);
        }
    }
}
