//! Polyline parameterization/measurement and convex-region polyface clipping.
//!
//! Two clusters share this crate:
//!
//! - polyline math: fraction↔segment mapping, closest-point search, length and
//!   turning-angle accumulation, sub-range extraction, stroking and greedy
//!   triangulation between linestrings;
//! - the polyface clip engine: recursive plane-set clipping of a facet mesh
//!   against a union of convex regions, with edge-chain reconstruction.
//!
//! All operations are pure, synchronous functions over caller-owned point
//! arrays or meshes; failures are `Option`/`Result` values, never panics.
use rustc_hash::FxHashMap as HashMap;

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

mod chain;
mod clip;
mod closest;
mod extents;
mod fraction;
mod measure;
mod plane;
mod point;
mod polyface;
mod stroke;
mod subrange;
mod tolerance;
mod triangulate;

pub use chain::*;
pub use clip::*;
pub use closest::*;
pub use extents::*;
pub use fraction::*;
pub use measure::*;
pub use plane::*;
pub use point::*;
pub use polyface::*;
pub use stroke::*;
pub use subrange::*;
pub use tolerance::*;
pub use triangulate::*;

pub trait Envelops<O> {
    fn envelops(&self, object: O) -> bool;
}
