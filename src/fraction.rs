use crate::*;

/// Where a global polyline fraction lands: a segment plus a local fraction.
///
/// Every segment spans the same global fraction step `1/num_segment`
/// regardless of physical length, so `fraction = (segment_index +
/// segment_fraction) / num_segment` always holds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SegmentData {
    pub segment_index: usize,
    pub num_segment: usize,
    pub segment_fraction: f64,
    /// True when the input fraction was outside `[0, 1]`.
    pub extrapolated: bool,
}

/// Convert a segment index and local fraction to a global polyline fraction.
///
/// With zero segments the local fraction is returned unchanged.
pub fn segment_fraction_to_polyline_fraction(
    segment_index: usize,
    num_segment: usize,
    segment_fraction: f64,
) -> f64 {
    if num_segment == 0 {
        segment_fraction
    } else {
        (segment_index as f64 + segment_fraction) / num_segment as f64
    }
}

/// Convert a global polyline fraction to segment data.
///
/// `None` when fewer than 2 vertices (no segment exists). Fractions below
/// `1/num_segment` land in segment 0, fractions at or above `1 -
/// 1/num_segment` in the last segment; both extrapolate beyond `[0, 1]`
/// rather than clamping. Interior fractions whose local fraction rounds to
/// exactly 1.0 roll into the next segment with local fraction 0, except at
/// the final segment.
pub fn polyline_fraction_to_segment_data(num_vertex: usize, fraction: f64) -> Option<SegmentData> {
    if num_vertex < 2 {
        return None;
    }

    let num_segment = num_vertex - 1;
    let n = num_segment as f64;
    let df = 1.0 / n;
    let extrapolated = fraction < 0.0 || fraction > 1.0;

    if fraction < df {
        return Some(SegmentData {
            segment_index: 0,
            num_segment,
            segment_fraction: fraction * n,
            extrapolated,
        });
    }

    if fraction >= 1.0 - df {
        return Some(SegmentData {
            segment_index: num_segment - 1,
            num_segment,
            segment_fraction: (fraction - 1.0) * n + 1.0,
            extrapolated,
        });
    }

    let mut segment_index = (fraction * n).floor() as usize;
    let mut segment_fraction = fraction * n - segment_index as f64;
    // boundary snap: rounding can push the local fraction to exactly 1.0
    if segment_fraction >= 1.0 && segment_index + 1 < num_segment {
        segment_index += 1;
        segment_fraction = 0.0;
    }

    Some(SegmentData {
        segment_index,
        num_segment,
        segment_fraction,
        extrapolated,
    })
}

/// Test if two global fractions map to the same segment.
///
/// Trivially true with at most one segment. Both fractions inside the first
/// (or last) `1/num_segment` band count as the same segment, mirroring the
/// banding of [`polyline_fraction_to_segment_data`].
pub fn fractions_on_same_segment(f0: f64, f1: f64, num_vertex: usize) -> bool {
    if num_vertex <= 2 {
        return true;
    }

    let n = (num_vertex - 1) as f64;
    let df = 1.0 / n;
    if f0 < df && f1 < df {
        return true;
    }
    if f0 >= 1.0 - df && f1 >= 1.0 - df {
        return true;
    }

    match (
        polyline_fraction_to_segment_data(num_vertex, f0),
        polyline_fraction_to_segment_data(num_vertex, f1),
    ) {
        (Some(a), Some(b)) => a.segment_index == b.segment_index,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;

    #[test]
    fn too_few_vertices() {
        assert_eq!(polyline_fraction_to_segment_data(0, 0.5), None);
        assert_eq!(polyline_fraction_to_segment_data(1, 0.5), None);
        assert!(polyline_fraction_to_segment_data(2, 0.5).is_some());
    }

    #[test]
    fn zero_segments_passes_fraction_through() {
        assert_eq!(segment_fraction_to_polyline_fraction(0, 0, 0.25), 0.25);
        assert_eq!(segment_fraction_to_polyline_fraction(3, 4, 0.5), 0.875);
    }

    #[test]
    fn interior_mapping() {
        // 5 vertices, 4 segments
        let d = polyline_fraction_to_segment_data(5, 0.5).unwrap();
        assert_eq!(d.segment_index, 2);
        assert_eq!(d.num_segment, 4);
        assert_eq!(d.segment_fraction, 0.0);
        assert!(!d.extrapolated);

        let d = polyline_fraction_to_segment_data(5, 0.375).unwrap();
        assert_eq!(d.segment_index, 1);
        assert!((d.segment_fraction - 0.5).abs() < 1e-14);
    }

    #[test]
    fn head_and_tail_bands_extrapolate() {
        let d = polyline_fraction_to_segment_data(5, -0.25).unwrap();
        assert_eq!(d.segment_index, 0);
        assert_eq!(d.segment_fraction, -1.0);
        assert!(d.extrapolated);

        let d = polyline_fraction_to_segment_data(5, 1.25).unwrap();
        assert_eq!(d.segment_index, 3);
        assert!((d.segment_fraction - 2.0).abs() < 1e-14);
        assert!(d.extrapolated);

        // in-domain band fractions are not extrapolated
        let d = polyline_fraction_to_segment_data(5, 0.1).unwrap();
        assert_eq!(d.segment_index, 0);
        assert!(!d.extrapolated);
        let d = polyline_fraction_to_segment_data(5, 0.9).unwrap();
        assert_eq!(d.segment_index, 3);
        assert!(!d.extrapolated);
    }

    #[test]
    fn endpoint_fractions() {
        let d = polyline_fraction_to_segment_data(4, 0.0).unwrap();
        assert_eq!((d.segment_index, d.segment_fraction), (0, 0.0));

        let d = polyline_fraction_to_segment_data(4, 1.0).unwrap();
        assert_eq!((d.segment_index, d.segment_fraction), (2, 1.0));
        assert!(!d.extrapolated);
    }

    #[test]
    fn same_segment_banding() {
        assert!(fractions_on_same_segment(0.0, 1.0, 2));
        assert!(fractions_on_same_segment(-5.0, 5.0, 1));

        // 5 segments, df = 0.2
        assert!(fractions_on_same_segment(0.05, 0.15, 6));
        assert!(fractions_on_same_segment(0.85, 0.95, 6));
        assert!(fractions_on_same_segment(0.45, 0.5, 6));
        assert!(!fractions_on_same_segment(0.1, 0.3, 6));
        assert!(!fractions_on_same_segment(0.3, 0.9, 6));
    }

    #[quickcheck]
    fn fraction_round_trip(num_vertex: usize, segment_index: usize, segment_fraction: f64) -> TestResult {
        let num_vertex = 2 + num_vertex % 12;
        let num_segment = num_vertex - 1;
        let segment_index = segment_index % num_segment;
        if !segment_fraction.is_finite() {
            return TestResult::discard();
        }
        let segment_fraction = segment_fraction.abs().fract();

        let f = segment_fraction_to_polyline_fraction(segment_index, num_segment, segment_fraction);
        let d = polyline_fraction_to_segment_data(num_vertex, f).unwrap();

        let back = segment_fraction_to_polyline_fraction(d.segment_index, d.num_segment, d.segment_fraction);
        TestResult::from_bool(
            d.num_segment == num_segment && !d.extrapolated && (back - f).abs() < 1e-12 && {
                // the recovered pair is the same position, allowing for the
                // boundary snap rolling (i, 1.0) to (i+1, 0.0)
                let same = d.segment_index == segment_index
                    && (d.segment_fraction - segment_fraction).abs() < 1e-9;
                let snapped = d.segment_index + 1 == segment_index
                    && (d.segment_fraction - 1.0).abs() < 1e-9
                    && segment_fraction < 1e-9;
                same || snapped
            },
        )
    }

    #[quickcheck]
    fn mapping_invariant_holds(num_vertex: usize, fraction: f64) -> TestResult {
        let num_vertex = 2 + num_vertex % 12;
        if !fraction.is_finite() || fraction.abs() > 1e6 {
            return TestResult::discard();
        }

        let d = polyline_fraction_to_segment_data(num_vertex, fraction).unwrap();
        let back = segment_fraction_to_polyline_fraction(d.segment_index, d.num_segment, d.segment_fraction);
        TestResult::from_bool((back - fraction).abs() <= 1e-9 * fraction.abs().max(1.0))
    }
}
