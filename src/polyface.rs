use crate::*;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Identifier of an edge chain: the source chain's ID plus a sub-chain index
/// assigned when clipping splits one chain into disjoint pieces.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ChainId {
    pub parent: u64,
    pub sub: u32,
}

impl ChainId {
    pub fn new(parent: u64) -> Self {
        Self { parent, sub: 0 }
    }
}

/// Named polyline feature embedded in the mesh, as one-based point indices.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EdgeChain {
    pub id: ChainId,
    pub indices: Vec<u32>,
}

/// One facet loop. Edge `k` runs from `points[k]` to the next index,
/// wrapping; `visible[k]` is that edge's visibility flag.
///
/// `normals`/`params` are empty or parallel to `points`, indexing the
/// polyface's normal/param arrays.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Facet {
    pub points: Vec<u32>,
    pub normals: Vec<u32>,
    pub params: Vec<u32>,
    pub visible: Vec<bool>,
    /// Index into the polyface's face data, grouping facets per face.
    pub face: Option<u32>,
}

impl Facet {
    /// Facet over point indices with every edge visible.
    pub fn from_points(points: Vec<u32>) -> Self {
        let visible = vec![true; points.len()];
        Self {
            points,
            visible,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Per-face attribute block carried across clipping.
#[derive(Debug, Copy, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FaceData {
    pub param_range: Extents2,
    pub param_distance_range: Extents2,
}

impl Default for FaceData {
    fn default() -> Self {
        Self {
            param_range: Extents2::zero(),
            param_distance_range: Extents2::zero(),
        }
    }
}

/// Indexed mesh: point/normal/param arrays, facet loops, edge-chain
/// annotations and per-face data.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Polyface {
    pub points: Vec<Point3>,
    pub normals: Vec<Point3>,
    pub params: Vec<Point2>,
    pub facets: Vec<Facet>,
    pub edge_chains: Vec<EdgeChain>,
    pub face_data: Vec<FaceData>,
}

impl Polyface {
    pub fn extents(&self) -> Extents3 {
        self.points.iter().copied().collect()
    }

    pub fn facet_points(&self, facet: &Facet) -> Vec<Point3> {
        facet
            .points
            .iter()
            .filter_map(|&i| self.points.get(i as usize).copied())
            .collect()
    }

    /// Chain geometry from its one-based indices. Malformed entries (zero or
    /// out of range) are skipped rather than failing the whole chain.
    pub fn chain_points(&self, chain: &EdgeChain) -> Vec<Point3> {
        chain
            .indices
            .iter()
            .filter_map(|&i| {
                debug_assert!(i > 0, "edge chain indices are one-based");
                i.checked_sub(1)
                    .and_then(|i| self.points.get(i as usize))
                    .copied()
            })
            .collect()
    }
}

// point wrapper handling ordering + equality with tolerance
struct Pt<P> {
    p: P,
    i: u32,
}
impl<P: Point + Add> PartialEq for Pt<P> {
    fn eq(&self, rhs: &Self) -> bool {
        same_point(self.p, rhs.p)
    }
}
impl<P: Point + Add> Eq for Pt<P> {}
impl<P: Point + Add> PartialOrd for Pt<P> {
    fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
        Some(self.cmp(rhs))
    }
}
impl<P: Point + Add> Ord for Pt<P> {
    fn cmp(&self, rhs: &Self) -> Ordering {
        if self.eq(rhs) {
            // expensive to check first, but handles equality with tolerance
            return Ordering::Equal;
        }

        ordpt(self.p, rhs.p)
    }
}

struct DedupSet<P>(BTreeSet<Pt<P>>);

impl<P> Default for DedupSet<P> {
    fn default() -> Self {
        Self(BTreeSet::new())
    }
}

impl<P: Point + Add> DedupSet<P> {
    fn find_or_add(&mut self, p: P, store: &mut Vec<P>) -> u32 {
        let pt = Pt {
            p,
            i: store.len() as u32,
        };
        match self.0.get(&pt) {
            Some(existing) => existing.i,
            None => {
                let i = pt.i;
                store.push(pt.p);
                self.0.insert(pt);
                i
            }
        }
    }
}

/// Accumulates a [`Polyface`] with coordinate deduplication.
///
/// Facets added between [`set_face_data`](Self::set_face_data) and
/// [`end_face`](Self::end_face) share one face-data block.
#[derive(Default)]
pub struct PolyfaceBuilder {
    mesh: Polyface,
    point_set: DedupSet<Point3>,
    normal_set: DedupSet<Point3>,
    param_set: DedupSet<Point2>,
    current_face: Option<u32>,
}

impl PolyfaceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 0-based index of `p`, inserting when no existing point coincides.
    pub fn find_or_add_point(&mut self, p: Point3) -> u32 {
        self.point_set.find_or_add(p, &mut self.mesh.points)
    }

    pub fn find_or_add_normal(&mut self, n: Point3) -> u32 {
        self.normal_set.find_or_add(n, &mut self.mesh.normals)
    }

    pub fn find_or_add_param(&mut self, uv: Point2) -> u32 {
        self.param_set.find_or_add(uv, &mut self.mesh.params)
    }

    /// Append a facet, tagging it with the open face-data block if any.
    pub fn add_facet(&mut self, mut facet: Facet) {
        facet.face = self.current_face;
        self.mesh.facets.push(facet);
    }

    /// Open a face grouping; facets added until [`end_face`](Self::end_face)
    /// reference this block.
    pub fn set_face_data(&mut self, data: FaceData) {
        self.current_face = Some(self.mesh.face_data.len() as u32);
        self.mesh.face_data.push(data);
    }

    pub fn end_face(&mut self) {
        self.current_face = None;
    }

    /// Append an edge chain. Zero (malformed) indices are dropped, asserted
    /// in debug builds only.
    pub fn add_edge_chain(&mut self, id: ChainId, one_based_indices: Vec<u32>) {
        let indices: Vec<u32> = one_based_indices
            .into_iter()
            .filter(|&i| {
                debug_assert!(i > 0, "edge chain indices are one-based");
                i > 0
            })
            .collect();
        if indices.len() >= 2 {
            self.mesh.edge_chains.push(EdgeChain { id, indices });
        }
    }

    pub fn point_count(&self) -> usize {
        self.mesh.points.len()
    }

    pub fn build(self) -> Polyface {
        self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_deduplicates_points() {
        let mut b = PolyfaceBuilder::new();
        let i0 = b.find_or_add_point([0.0, 0.0, 0.0]);
        let i1 = b.find_or_add_point([1.0, 0.0, 0.0]);
        // coincident within tolerance
        let i2 = b.find_or_add_point([0.0, 1e-9, 0.0]);
        assert_eq!(i0, 0);
        assert_eq!(i1, 1);
        assert_eq!(i2, 0);
        assert_eq!(b.build().points.len(), 2);
    }

    #[test]
    fn builder_separate_channels() {
        let mut b = PolyfaceBuilder::new();
        b.find_or_add_point([1.0, 2.0, 3.0]);
        let n = b.find_or_add_normal([0.0, 0.0, 1.0]);
        let uv = b.find_or_add_param([0.5, 0.5]);
        assert_eq!((n, uv), (0, 0));

        let m = b.build();
        assert_eq!(m.points.len(), 1);
        assert_eq!(m.normals, vec![[0.0, 0.0, 1.0]]);
        assert_eq!(m.params, vec![[0.5, 0.5]]);
    }

    #[test]
    fn face_grouping() {
        let mut b = PolyfaceBuilder::new();
        b.add_facet(Facet::from_points(vec![0, 1, 2]));

        b.set_face_data(FaceData::default());
        b.add_facet(Facet::from_points(vec![0, 1, 3]));
        b.add_facet(Facet::from_points(vec![1, 2, 3]));
        b.end_face();

        b.add_facet(Facet::from_points(vec![2, 3, 4]));

        let m = b.build();
        assert_eq!(m.face_data.len(), 1);
        assert_eq!(m.facets[0].face, None);
        assert_eq!(m.facets[1].face, Some(0));
        assert_eq!(m.facets[2].face, Some(0));
        assert_eq!(m.facets[3].face, None);
    }

    #[test]
    fn malformed_chain_indices_dropped() {
        let mut b = PolyfaceBuilder::new();
        if cfg!(debug_assertions) {
            return; // the zero index asserts in debug builds
        }
        b.add_edge_chain(ChainId::new(7), vec![1, 0, 2]);
        let m = b.build();
        assert_eq!(m.edge_chains.len(), 1);
        assert_eq!(m.edge_chains[0].indices, vec![1, 2]);
    }

    #[test]
    fn short_chain_discarded() {
        let mut b = PolyfaceBuilder::new();
        b.add_edge_chain(ChainId::new(1), vec![3]);
        assert!(b.build().edge_chains.is_empty());
    }

    #[test]
    fn chain_points_one_based() {
        let mesh = Polyface {
            points: vec![[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
            edge_chains: vec![EdgeChain {
                id: ChainId::new(1),
                indices: vec![1, 3],
            }],
            ..Polyface::default()
        };
        let pts = mesh.chain_points(&mesh.edge_chains[0]);
        assert_eq!(pts, vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
    }

    #[test]
    fn facet_geometry_lookup() {
        let mesh = Polyface {
            points: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            facets: vec![Facet::from_points(vec![0, 1, 2])],
            ..Polyface::default()
        };
        assert_eq!(mesh.facet_points(&mesh.facets[0]).len(), 3);
        assert_eq!(mesh.extents().max(), [1.0, 1.0, 0.0]);
    }
}
