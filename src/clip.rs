use crate::*;

/// Conjunction (AND) of half-spaces.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct ConvexRegion(pub Vec<ClipPlane>);

/// Disjunction (OR) of convex regions: a facet survives if it is inside at
/// least one.
pub type RegionSet = Vec<ConvexRegion>;

impl ConvexRegion {
    pub fn planes(&self) -> &[ClipPlane] {
        &self.0
    }

    /// The box interior as a 6-plane region.
    pub fn from_extents(e: &Extents3) -> Self {
        let min = e.origin;
        let max = e.max();
        Self(vec![
            ClipPlane::new(min, [1.0, 0.0, 0.0]),
            ClipPlane::new(min, [0.0, 1.0, 0.0]),
            ClipPlane::new(min, [0.0, 0.0, 1.0]),
            ClipPlane::new(max, [-1.0, 0.0, 0.0]),
            ClipPlane::new(max, [0.0, -1.0, 0.0]),
            ClipPlane::new(max, [0.0, 0.0, -1.0]),
        ])
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClipStatus {
    TrivialAccept,
    TrivialReject,
    ClipRequired,
}

/// Classify a point set against one convex region.
///
/// All points outside any single plane rejects the whole set; no point
/// outside any plane accepts it; anything else needs a real clip.
pub fn point_set_single_clip_status(
    points: &[Point3],
    region: &ConvexRegion,
    tolerance: f64,
) -> ClipStatus {
    let mut any_outside = false;
    for plane in region.planes() {
        let mut all_outside = !points.is_empty();
        for &p in points {
            if plane.is_inside(p, tolerance) {
                all_outside = false;
            } else {
                any_outside = true;
            }
        }
        if all_outside {
            return ClipStatus::TrivialReject;
        }
    }
    if any_outside {
        ClipStatus::ClipRequired
    } else {
        ClipStatus::TrivialAccept
    }
}

/// Classify against the whole region set with union semantics: the first
/// full accept wins, rejection requires every region to reject.
pub fn point_set_region_status(
    points: &[Point3],
    regions: &[ConvexRegion],
    tolerance: f64,
) -> ClipStatus {
    let mut all_reject = true;
    for region in regions {
        match point_set_single_clip_status(points, region, tolerance) {
            ClipStatus::TrivialAccept => return ClipStatus::TrivialAccept,
            ClipStatus::TrivialReject => (),
            ClipStatus::ClipRequired => all_reject = false,
        }
    }
    if all_reject {
        ClipStatus::TrivialReject
    } else {
        ClipStatus::ClipRequired
    }
}

/// Receives the engine's result. Exactly one of the two methods is invoked
/// per driver call.
pub trait ClipOutput {
    /// The whole input was accepted; it is handed back borrowed, unchanged.
    fn process_unclipped_polyface(&mut self, mesh: &Polyface) -> Result<(), &'static str>;

    /// A freshly built clipped polyface (possibly empty).
    fn process_clipped_polyface(&mut self, mesh: Polyface) -> Result<(), &'static str>;
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClipOptions {
    pub distance_tolerance: f64,
    /// Mark edges created by the cut invisible instead of visible.
    pub hide_cut_geometry: bool,
    /// Fan-triangulate output facets with more than 3 points.
    pub triangulate_output: bool,
}

impl Default for ClipOptions {
    fn default() -> Self {
        Self {
            distance_tolerance: DEFAULT_CLIP_TOLERANCE,
            hide_cut_geometry: false,
            triangulate_output: false,
        }
    }
}

/// Per-facet buffer flowing through the plane cascade.
///
/// `visible[k]` and `chain_edge[k]` describe the edge leaving vertex `k`;
/// `normals`/`params` are empty or parallel to `points`.
#[derive(Debug, Clone, Default)]
struct ClipFacet {
    points: Vec<Point3>,
    normals: Vec<Point3>,
    params: Vec<Point2>,
    visible: Vec<bool>,
    chain_edge: Vec<Option<usize>>,
}

impl ClipFacet {
    fn from_facet(mesh: &Polyface, facet: &Facet, chains: &ChainBuilder) -> Self {
        let n = facet.points.len();
        let points = mesh.facet_points(facet);
        let normals = if facet.normals.len() == n {
            facet
                .normals
                .iter()
                .filter_map(|&i| mesh.normals.get(i as usize).copied())
                .collect()
        } else {
            vec![]
        };
        let params = if facet.params.len() == n {
            facet
                .params
                .iter()
                .filter_map(|&i| mesh.params.get(i as usize).copied())
                .collect()
        } else {
            vec![]
        };
        let visible = if facet.visible.len() == n {
            facet.visible.clone()
        } else {
            vec![true; n]
        };
        let chain_edge = (0..n)
            .map(|k| chains.edge_for(facet.points[k], facet.points[(k + 1) % n]))
            .collect();

        Self {
            points,
            normals,
            params,
            visible,
            chain_edge,
        }
    }

    fn push(
        &mut self,
        p: Point3,
        n: Option<Point3>,
        uv: Option<Point2>,
        visible: bool,
        chain: Option<usize>,
    ) {
        self.points.push(p);
        if let Some(n) = n {
            self.normals.push(n);
        }
        if let Some(uv) = uv {
            self.params.push(uv);
        }
        self.visible.push(visible);
        self.chain_edge.push(chain);
    }

    fn normal_at(&self, i: usize) -> Option<Point3> {
        self.normals.get(i).copied()
    }

    fn param_at(&self, i: usize) -> Option<Point2> {
        self.params.get(i).copied()
    }

    /// Sutherland-Hodgman walk against one plane.
    ///
    /// Inside vertices keep their outgoing edge's attributes. An exit
    /// crossing opens a cut edge (visibility `!hide_cut_geometry`, no chain
    /// reference); an entry crossing resumes the source edge's attributes.
    fn clipped_to_plane(&self, plane: &ClipPlane, options: &ClipOptions) -> ClipFacet {
        let tol = options.distance_tolerance;
        let n = self.points.len();
        let mut out = ClipFacet::default();

        for i in 0..n {
            let j = (i + 1) % n;
            let h0 = plane.height(self.points[i]);
            let h1 = plane.height(self.points[j]);
            let in0 = h0 >= -tol;
            let in1 = h1 >= -tol;

            if in0 {
                out.push(
                    self.points[i],
                    self.normal_at(i),
                    self.param_at(i),
                    self.visible[i],
                    self.chain_edge[i],
                );
            }
            if in0 != in1 {
                let s = safe_div(h0, h0 - h1, 0.0);
                let p = lerp(self.points[i], self.points[j], s);
                let nrm = self
                    .normal_at(i)
                    .zip(self.normal_at(j))
                    .map(|(a, b)| lerp(a, b, s));
                let uv = self
                    .param_at(i)
                    .zip(self.param_at(j))
                    .map(|(a, b)| lerp(a, b, s));
                if in0 {
                    out.push(p, nrm, uv, !options.hide_cut_geometry, None);
                } else {
                    out.push(p, nrm, uv, self.visible[i], self.chain_edge[i]);
                }
            }
        }
        out
    }

    /// Degenerate after clipping: fewer than 3 distinct points once an
    /// accidental closure duplicate is dropped, or area below tolerance.
    fn is_degenerate(&self, area_tolerance: f64) -> bool {
        let mut pts = self.points.as_slice();
        if pts.len() >= 2 && same_point(pts[0], pts[pts.len() - 1]) {
            pts = &pts[..pts.len() - 1];
        }
        if pts.len() < 3 {
            return true;
        }

        // Newell area vector, valid for non-planar loops too
        let mut area = Point3::zero();
        for i in 0..pts.len() {
            area = area.add(xprod(pts[i], pts[(i + 1) % pts.len()]));
        }
        area.mag() * 0.5 < area_tolerance
    }
}

/// Recursive cascade over the region's remaining planes.
fn clip_to_planes(
    facet: ClipFacet,
    planes: &[ClipPlane],
    options: &ClipOptions,
    survivors: &mut Vec<ClipFacet>,
) {
    let area_tol = options.distance_tolerance * options.distance_tolerance;
    if facet.is_degenerate(area_tol) {
        return;
    }
    let Some((plane, rest)) = planes.split_first() else {
        survivors.push(facet);
        return;
    };

    let tol = options.distance_tolerance;
    let mut all_in = true;
    let mut all_out = true;
    for &p in &facet.points {
        if plane.is_inside(p, tol) {
            all_out = false;
        } else {
            all_in = false;
        }
    }

    if all_out {
        return;
    }
    if all_in {
        return clip_to_planes(facet, rest, options, survivors);
    }
    clip_to_planes(facet.clipped_to_plane(plane, options), rest, options, survivors)
}

/// Append a surviving facet to the output builder, recording chain-edge
/// segments for every retained edge that lies along an input chain.
fn emit(
    cf: &ClipFacet,
    builder: &mut PolyfaceBuilder,
    chains: &mut ChainBuilder,
    options: &ClipOptions,
) {
    let n = cf.points.len();
    let idx: Vec<u32> = cf.points.iter().map(|&p| builder.find_or_add_point(p)).collect();
    let nidx: Vec<u32> = cf.normals.iter().map(|&v| builder.find_or_add_normal(v)).collect();
    let pidx: Vec<u32> = cf.params.iter().map(|&uv| builder.find_or_add_param(uv)).collect();

    for k in 0..n {
        if let Some(e) = cf.chain_edge[k] {
            let j = (k + 1) % n;
            chains.record_segment(e, cf.points[k], cf.points[j], idx[k] + 1, idx[j] + 1);
        }
    }

    if options.triangulate_output && n > 3 {
        // fan from vertex 0; interior spokes are invisible
        for k in 1..n - 1 {
            let tri = [0, k, k + 1];
            let facet = Facet {
                points: tri.map(|v| idx[v]).to_vec(),
                normals: if nidx.is_empty() {
                    vec![]
                } else {
                    tri.map(|v| nidx[v]).to_vec()
                },
                params: if pidx.is_empty() {
                    vec![]
                } else {
                    tri.map(|v| pidx[v]).to_vec()
                },
                visible: vec![
                    if k == 1 { cf.visible[0] } else { false },
                    cf.visible[k],
                    if k + 1 == n - 1 { cf.visible[n - 1] } else { false },
                ],
                face: None,
            };
            builder.add_facet(facet);
        }
    } else {
        builder.add_facet(Facet {
            points: idx,
            normals: nidx,
            params: pidx,
            visible: cf.visible.clone(),
            face: None,
        });
    }
}

/// Clip a polyface against a union of convex regions.
///
/// A mesh wholly inside some region is forwarded borrowed through
/// [`ClipOutput::process_unclipped_polyface`] without allocating; otherwise
/// every facet runs the per-region cascade, face groupings are preserved and
/// edge chains are rebuilt from the surviving edges before
/// [`ClipOutput::process_clipped_polyface`] receives the new mesh.
pub fn clip_to_plane_set_intersection(
    mesh: &Polyface,
    regions: &RegionSet,
    options: &ClipOptions,
    output: &mut impl ClipOutput,
) -> Result<(), &'static str> {
    let tol = options.distance_tolerance;

    // whole-mesh fast path: the box hull stands in for every point
    if !mesh.points.is_empty() {
        match point_set_region_status(&mesh.extents().corners(), regions, tol) {
            ClipStatus::TrivialAccept => return output.process_unclipped_polyface(mesh),
            ClipStatus::TrivialReject => {
                return output.process_clipped_polyface(Polyface::default())
            }
            ClipStatus::ClipRequired => (),
        }
    }

    let mut builder = PolyfaceBuilder::new();
    let mut chains = ChainBuilder::new(mesh);
    let mut current_face: Option<u32> = None;
    let mut survivors: Vec<ClipFacet> = vec![];

    for facet in &mesh.facets {
        if facet.len() < 3 {
            continue;
        }
        if facet.face != current_face {
            match facet.face.and_then(|f| mesh.face_data.get(f as usize)) {
                Some(&fd) => builder.set_face_data(fd),
                None => builder.end_face(),
            }
            current_face = facet.face;
        }

        let pts = mesh.facet_points(facet);
        survivors.clear();
        match point_set_region_status(&pts, regions, tol) {
            ClipStatus::TrivialReject => continue,
            ClipStatus::TrivialAccept => {
                survivors.push(ClipFacet::from_facet(mesh, facet, &chains));
            }
            ClipStatus::ClipRequired => {
                let cf = ClipFacet::from_facet(mesh, facet, &chains);
                for region in regions {
                    match point_set_single_clip_status(&pts, region, tol) {
                        ClipStatus::TrivialAccept => {
                            // union semantics: wholly inside, no further regions
                            survivors.clear();
                            survivors.push(cf.clone());
                            break;
                        }
                        ClipStatus::TrivialReject => (),
                        ClipStatus::ClipRequired => {
                            clip_to_planes(cf.clone(), region.planes(), options, &mut survivors);
                        }
                    }
                }
            }
        }

        for cf in &survivors {
            emit(cf, &mut builder, &mut chains, options);
        }
    }

    for chain in chains.reconstruct(tol) {
        builder.add_edge_chain(chain.id, chain.indices);
    }

    output.process_clipped_polyface(builder.build())
}

/// Clip to an axis-aligned box.
pub fn clip_to_range(
    mesh: &Polyface,
    range: &Extents3,
    options: &ClipOptions,
    output: &mut impl ClipOutput,
) -> Result<(), &'static str> {
    let regions = vec![ConvexRegion::from_extents(range)];
    clip_to_plane_set_intersection(mesh, &regions, options, output)
}
