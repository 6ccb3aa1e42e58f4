//! Build diagnostics for generated tracks.
//!
//! Diagnostics are returned next to every [`TrackLayout`](super::TrackLayout)
//! and are meant for logs and tooling: per-edge segment counts, how many
//! waypoints came from edges versus corner blends, whether the forward axis
//! had to be replaced, and the total path length.

use std::fmt;

/// How the builder obtained its forward axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForwardFallback {
    /// The supplied forward projected onto the track plane was usable.
    #[default]
    None,
    /// `up × world X` replaced a forward parallel to up.
    CrossWorldX,
    /// `up × world Z` replaced a forward parallel to up and to world X.
    CrossWorldZ,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackDiagnostics {
    /// `segmentCount` per edge, in traversal order.
    pub edge_segment_counts: [usize; 4],
    /// Usable length per edge after removing both corner gaps.
    pub edge_usable_lengths: [f64; 4],
    pub edge_waypoint_count: usize,
    pub corner_blend_waypoint_count: usize,
    pub road_segment_count: usize,
    pub corner_piece_count: usize,
    /// Closed path length through every waypoint, back to the first.
    pub path_length: f64,
    pub forward_fallback: ForwardFallback,
    pub warnings: Vec<String>,
}

impl TrackDiagnostics {
    #[must_use]
    pub fn waypoint_count(&self) -> usize {
        self.edge_waypoint_count + self.corner_blend_waypoint_count
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.forward_fallback == ForwardFallback::None
    }

    /// One-line summary for logs.
    #[must_use]
    pub fn summary(&self) -> String {
        let counts = self.edge_segment_counts;
        let mut parts = vec![
            format!("WP:{}", self.waypoint_count()),
            format!("road:{}", self.road_segment_count),
            format!("edges:{}/{}/{}/{}", counts[0], counts[1], counts[2], counts[3]),
            format!("len:{:.3}", self.path_length),
        ];
        if self.corner_blend_waypoint_count > 0 {
            parts.push(format!("blend:{}", self.corner_blend_waypoint_count));
        }
        if self.forward_fallback != ForwardFallback::None {
            parts.push(format!("forward:{:?}", self.forward_fallback));
        }
        if !self.warnings.is_empty() {
            parts.push(format!("warnings:{}", self.warnings.len()));
        }
        parts.join(" ")
    }
}

impl fmt::Display for TrackDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Track Diagnostics:")?;
        writeln!(
            f,
            "  Waypoints: {} ({} edge, {} corner blend)",
            self.waypoint_count(),
            self.edge_waypoint_count,
            self.corner_blend_waypoint_count
        )?;
        writeln!(f, "  Road segments: {}", self.road_segment_count)?;
        writeln!(f, "  Corner pieces: {}", self.corner_piece_count)?;
        for (edge, (count, usable)) in self
            .edge_segment_counts
            .iter()
            .zip(self.edge_usable_lengths.iter())
            .enumerate()
        {
            writeln!(f, "  Edge {edge}: {count} segments over {usable:.4}")?;
        }
        writeln!(f, "  Path length: {:.4}", self.path_length)?;
        if self.forward_fallback != ForwardFallback::None {
            writeln!(f, "  Forward fallback: {:?}", self.forward_fallback)?;
        }
        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }
        Ok(())
    }
}
