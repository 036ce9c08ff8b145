use crate::*;

/// Portion of an original chain edge that survived clipping: signed
/// distances along the edge's ray, plus the one-based output point indices
/// at the two ends.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClippedSegment {
    pub d0: f64,
    pub d1: f64,
    pub i0: u32,
    pub i1: u32,
}

/// One original chain edge as a directed ray accumulating clipped
/// sub-segments.
#[derive(Debug)]
struct OutputChainEdge {
    origin: Point3,
    /// Unit direction, or zero for a degenerate edge.
    dir: Point3,
    length: f64,
    segments: Vec<ClippedSegment>,
}

impl OutputChainEdge {
    fn distance_along(&self, p: Point3) -> f64 {
        dot_prod(p.sub(self.origin), self.dir)
    }
}

/// Rebuilds the input polyface's edge chains from the edges surviving a
/// clip.
///
/// Each chain edge is keyed by its unordered input point-index pair; the
/// clip engine records every retained output edge that lies along one.
/// [`reconstruct`](Self::reconstruct) then sorts each edge's sub-segments by
/// distance, coalesces contiguous ones and splits at gaps, so a chain whose
/// middle was clipped away comes back as disjoint sub-chains.
pub struct ChainBuilder {
    edges: Vec<OutputChainEdge>,
    /// Normalized 0-based input point-index pair to arena index.
    index: HashMap<(u32, u32), usize>,
    /// Per input chain: id plus its edges in chain order.
    chains: Vec<(ChainId, Vec<usize>)>,
}

fn norm_pair(a: u32, b: u32) -> (u32, u32) {
    (a.min(b), a.max(b))
}

impl ChainBuilder {
    pub fn new(mesh: &Polyface) -> Self {
        let mut edges: Vec<OutputChainEdge> = vec![];
        let mut index: HashMap<(u32, u32), usize> = HashMap::default();
        let mut chains = vec![];

        for chain in &mesh.edge_chains {
            let mut edge_ids = vec![];
            for w in chain.indices.windows(2) {
                // indices are one-based; tolerate malformed entries
                let (Some(a), Some(b)) = (w[0].checked_sub(1), w[1].checked_sub(1)) else {
                    debug_assert!(false, "edge chain indices are one-based");
                    continue;
                };
                let (Some(&p0), Some(&p1)) =
                    (mesh.points.get(a as usize), mesh.points.get(b as usize))
                else {
                    debug_assert!(false, "edge chain index out of range");
                    continue;
                };

                let e = *index.entry(norm_pair(a, b)).or_insert_with(|| {
                    edges.push(OutputChainEdge {
                        origin: p0,
                        dir: unit_or_none(p1.sub(p0)).unwrap_or_else(Point3::zero),
                        length: dist(p0, p1),
                        segments: vec![],
                    });
                    edges.len() - 1
                });
                edge_ids.push(e);
            }
            if !edge_ids.is_empty() {
                chains.push((chain.id, edge_ids));
            }
        }

        Self {
            edges,
            index,
            chains,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Arena handle for the chain edge between two 0-based input point
    /// indices, if that pair belongs to a chain.
    pub fn edge_for(&self, a: u32, b: u32) -> Option<usize> {
        self.index.get(&norm_pair(a, b)).copied()
    }

    /// Record a retained output edge lying along chain edge `edge`, from
    /// `p0`/`p1` with one-based output point indices `i0`/`i1`. Stored
    /// oriented along the ray.
    pub fn record_segment(&mut self, edge: usize, p0: Point3, p1: Point3, i0: u32, i1: u32) {
        let e = &mut self.edges[edge];
        let (d0, d1) = (e.distance_along(p0), e.distance_along(p1));
        let seg = if d0 <= d1 {
            ClippedSegment { d0, d1, i0, i1 }
        } else {
            ClippedSegment {
                d0: d1,
                d1: d0,
                i0: i1,
                i1: i0,
            }
        };
        e.segments.push(seg);
    }

    /// Assemble the output chains. Sub-segments whose gap along the chain
    /// exceeds `tolerance` start a new sub-chain, numbered per parent.
    pub fn reconstruct(&self, tolerance: f64) -> Vec<EdgeChain> {
        let mut out = vec![];

        for (id, edge_ids) in &self.chains {
            // chain-global distances via cumulative edge offsets
            let mut segs: Vec<ClippedSegment> = vec![];
            let mut base = 0.0;
            for &e in edge_ids {
                let edge = &self.edges[e];
                segs.extend(edge.segments.iter().map(|s| ClippedSegment {
                    d0: base + s.d0,
                    d1: base + s.d1,
                    ..*s
                }));
                base += edge.length;
            }
            segs.sort_by(|x, y| x.d0.total_cmp(&y.d0));

            let mut sub = 0u32;
            let mut indices: Vec<u32> = vec![];
            let mut end_d = f64::NEG_INFINITY;
            for s in segs {
                if !indices.is_empty() && s.d0 - end_d > tolerance {
                    flush(&mut indices, id.parent, &mut sub, &mut out);
                }
                if indices.is_empty() {
                    indices.push(s.i0);
                } else if indices.last() != Some(&s.i0) && s.d0 > end_d {
                    indices.push(s.i0);
                }
                if indices.last() != Some(&s.i1) && s.d1 > end_d {
                    indices.push(s.i1);
                }
                end_d = end_d.max(s.d1);
            }
            flush(&mut indices, id.parent, &mut sub, &mut out);
        }

        out
    }
}

fn flush(indices: &mut Vec<u32>, parent: u64, sub: &mut u32, out: &mut Vec<EdgeChain>) {
    if indices.len() >= 2 {
        out.push(EdgeChain {
            id: ChainId {
                parent,
                sub: *sub,
            },
            indices: std::mem::take(indices),
        });
        *sub += 1;
    } else {
        indices.clear();
    }
}
