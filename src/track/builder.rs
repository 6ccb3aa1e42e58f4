//! Rectangular loop geometry: corners, edge waypoints, rounded corner blends,
//! road-segment and corner-piece placements.
//!
//! [`build_track`] is a pure function of its inputs. It either returns a
//! complete [`TrackLayout`] or an error; nothing is half-built.
//!
//! Waypoints are ordered edge 0, blend at corner 1, edge 1, blend at corner 2,
//! edge 2, blend at corner 3, edge 3, blend at corner 0, and the last waypoint
//! connects back to the first. Road segments only bridge waypoints of the same
//! edge; corner blends are path-only and covered by corner pieces.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::diagnostics::{ForwardFallback, TrackDiagnostics};
use super::fit::{SurfaceFrame, TrackExtent};
use crate::geom::{
    Curve3, Frame, Line3, Point3, QuadraticBezier3, Quaternion, Tolerance, Vec3,
    has_duplicate_neighbors, polyline_length,
};

/// Upper bound on `segmentCount` for a single edge.
const MAX_SEGMENTS_PER_EDGE: usize = 10_000;

/// Upper bound on [`TrackOptions::corner_subdivisions`].
pub const MAX_CORNER_SUBDIVISIONS: usize = 64;

/// Options for [`build_track`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackOptions {
    /// Nominal distance between consecutive edge waypoints.
    pub segment_length: f64,
    /// Visual shrink of each road segment, in `[0.5, 1]`.
    pub segment_length_factor: f64,
    /// Distance kept free of edge waypoints at both ends of an edge.
    pub corner_gap: f64,
    /// Extra waypoints inserted on each rounded corner, at most
    /// [`MAX_CORNER_SUBDIVISIONS`].
    pub corner_subdivisions: usize,
    /// Bezier control offset in the track placement frame
    /// (X = -forward, Y = up, Z = right).
    pub corner_bezier_offset_local: Vec3,
    /// Additional shrink of the loop inside the track extent, in `(0, 1]`.
    pub visual_margin_factor: f64,
    /// Lift of the whole track along up above the supplied center.
    pub road_height_offset: f64,
    pub road_width: f64,
    pub road_thickness: f64,
    pub corner_scale: Vec3,
    /// Yaw applied to each corner piece after facing the next corner.
    pub corner_extra_rotation_deg: f64,
    /// Yaw applied to the final track frame after placement.
    pub frame_yaw_offset_deg: f64,
}

impl Default for TrackOptions {
    fn default() -> Self {
        Self {
            segment_length: 0.2,
            segment_length_factor: 0.9,
            corner_gap: 0.05,
            corner_subdivisions: 3,
            corner_bezier_offset_local: Vec3::new(0.0, 0.0, 0.05),
            visual_margin_factor: 0.8,
            road_height_offset: 0.03,
            road_width: 0.2,
            road_thickness: 0.02,
            corner_scale: Vec3::new(1.0, 1.0, 1.0),
            corner_extra_rotation_deg: 90.0,
            frame_yaw_offset_deg: 90.0,
        }
    }
}

impl TrackOptions {
    /// Checks every option for range and finiteness.
    ///
    /// # Errors
    /// Returns the first offending option.
    pub fn validate(&self) -> Result<(), TrackError> {
        let positive = |value: f64| value.is_finite() && value > 0.0;
        let unit_factor = |value: f64| positive(value) && value <= 1.0;

        if !positive(self.segment_length) {
            return Err(TrackError::InvalidSegmentLength(self.segment_length));
        }
        if !(0.5..=1.0).contains(&self.segment_length_factor) {
            return Err(TrackError::InvalidFactor {
                name: "segment_length_factor",
                min: 0.5,
                value: self.segment_length_factor,
            });
        }
        if !unit_factor(self.visual_margin_factor) {
            return Err(TrackError::InvalidFactor {
                name: "visual_margin_factor",
                min: 0.0,
                value: self.visual_margin_factor,
            });
        }
        if !self.corner_gap.is_finite() || self.corner_gap < 0.0 {
            return Err(TrackError::InvalidCornerGap(self.corner_gap));
        }
        if self.corner_subdivisions > MAX_CORNER_SUBDIVISIONS {
            return Err(TrackError::InvalidCornerSubdivisions(self.corner_subdivisions));
        }
        if !positive(self.road_width) || !positive(self.road_thickness) {
            return Err(TrackError::InvalidRoadSize {
                width: self.road_width,
                thickness: self.road_thickness,
            });
        }
        if !self.road_height_offset.is_finite()
            || !self.corner_extra_rotation_deg.is_finite()
            || !self.frame_yaw_offset_deg.is_finite()
            || !self.corner_bezier_offset_local.is_finite()
            || !self.corner_scale.is_finite()
        {
            return Err(TrackError::NonFiniteOption);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("track extent must be finite and > 0, got {width} x {length}")]
    DegenerateExtent { width: f64, length: f64 },
    #[error("segment length must be finite and > 0, got {0}")]
    InvalidSegmentLength(f64),
    #[error("{name} must be between {min} and 1, got {value}")]
    InvalidFactor {
        name: &'static str,
        min: f64,
        value: f64,
    },
    #[error("corner gap must be finite and >= 0, got {0}")]
    InvalidCornerGap(f64),
    #[error("corner subdivisions must be at most {MAX_CORNER_SUBDIVISIONS}, got {0}")]
    InvalidCornerSubdivisions(usize),
    #[error("road width and thickness must be finite and > 0, got {width} x {thickness}")]
    InvalidRoadSize { width: f64, thickness: f64 },
    #[error("track options must be finite")]
    NonFiniteOption,
    #[error("surface frame must be finite with a non-zero up axis")]
    InvalidFrame,
    #[error("edge {edge} needs {count} segments, more than the limit of {MAX_SEGMENTS_PER_EDGE}")]
    TooManySegments { edge: usize, count: usize },
    #[error("no road segment template is configured")]
    MissingRoadTemplate,
}

/// Where a waypoint came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WaypointKind {
    /// `slot` counts from the start corner of `edge`.
    Edge { edge: usize, slot: usize },
    /// `step` runs from 1 to `corner_subdivisions` around `corner`.
    CornerBlend { corner: usize, step: usize },
}

/// One point on the closed driving path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waypoint {
    /// Position in traversal order.
    pub index: usize,
    pub position: Point3,
    pub kind: WaypointKind,
}

impl Waypoint {
    /// Stable display name, e.g. `WP_2_0` or `CornerCurveWP_3_1`.
    #[must_use]
    pub fn label(&self) -> String {
        match self.kind {
            WaypointKind::Edge { edge, slot } => format!("WP_{edge}_{slot}"),
            WaypointKind::CornerBlend { corner, step } => format!("CornerCurveWP_{corner}_{step}"),
        }
    }

    #[must_use]
    pub const fn is_corner_blend(&self) -> bool {
        matches!(self.kind, WaypointKind::CornerBlend { .. })
    }
}

/// Pose and size of one road tile between two waypoints of the same edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoadSegmentPlacement {
    pub edge: usize,
    pub midpoint: Point3,
    /// Local Z along the road, local Y up; origin at `midpoint`.
    pub orientation: Frame,
    /// Visual length, already shrunk by `segment_length_factor`.
    pub length: f64,
    pub width: f64,
    pub thickness: f64,
}

impl RoadSegmentPlacement {
    #[must_use]
    pub fn rotation(&self) -> Quaternion {
        self.orientation.to_quaternion()
    }

    /// Local scale as `(width, thickness, length)`.
    #[must_use]
    pub const fn scale(&self) -> Vec3 {
        Vec3::new(self.width, self.thickness, self.length)
    }
}

/// Pose and scale of the visual piece at one loop corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CornerPlacement {
    pub corner: usize,
    pub position: Point3,
    pub orientation: Frame,
    pub scale: Vec3,
}

impl CornerPlacement {
    #[must_use]
    pub fn rotation(&self) -> Quaternion {
        self.orientation.to_quaternion()
    }
}

/// Complete result of one build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackLayout {
    /// Track frame after the final yaw offset.
    pub frame: Frame,
    pub corners: [Point3; 4],
    pub waypoints: Vec<Waypoint>,
    pub road_segments: Vec<RoadSegmentPlacement>,
    pub corner_pieces: Vec<CornerPlacement>,
}

impl TrackLayout {
    /// Waypoint positions in traversal order.
    #[must_use]
    pub fn path(&self) -> Vec<Point3> {
        self.waypoints.iter().map(|wp| wp.position).collect()
    }

    /// Waypoint that follows `index`, wrapping to the first.
    #[must_use]
    pub fn next_waypoint(&self, index: usize) -> Option<&Waypoint> {
        if self.waypoints.is_empty() {
            return None;
        }
        self.waypoints.get((index + 1) % self.waypoints.len())
    }
}

/// Waypoints of one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSubdivision {
    pub points: Vec<Point3>,
    pub segment_count: usize,
    pub usable_length: f64,
}

/// `max(1, round_half_up(usable_length / segment_length))`.
///
/// `segment_length` must be positive.
#[must_use]
pub fn segment_count(usable_length: f64, segment_length: f64) -> usize {
    let ratio = (usable_length.max(0.0) / segment_length).max(0.0);
    let rounded = Tolerance::ROUNDING.round_half_up(ratio);
    if rounded.is_finite() && rounded >= 1.0 {
        rounded as usize
    } else {
        1
    }
}

/// Corners of the loop, ordered so consecutive corners differ in one sign.
///
/// `c0 = -right -forward`, `c1 = +right -forward`, `c2 = +right +forward`,
/// `c3 = -right +forward`.
#[must_use]
pub fn loop_corners(center: Point3, right: Vec3, forward: Vec3, half_x: f64, half_z: f64) -> [Point3; 4] {
    let rx = right * half_x;
    let fz = forward * half_z;
    [
        center - rx - fz,
        center + rx - fz,
        center + rx + fz,
        center - rx + fz,
    ]
}

/// Evenly spaced waypoints on `start → end`, `corner_gap` away from both ends.
#[must_use]
pub fn subdivide_edge(start: Point3, end: Point3, corner_gap: f64, segment_length: f64) -> EdgeSubdivision {
    let line = Line3::new(start, end);
    let usable_length = (line.length() - 2.0 * corner_gap).max(0.0);
    let count = segment_count(usable_length, segment_length);

    let points = (0..=count)
        .map(|j| {
            let t = j as f64 / count as f64;
            line.point_at_distance(corner_gap + t * usable_length)
        })
        .collect();

    EdgeSubdivision {
        points,
        segment_count: count,
        usable_length,
    }
}

/// `subdivisions` points on the quadratic Bezier `a → control → b`,
/// excluding both endpoints.
#[must_use]
pub fn corner_blend(a: Point3, control: Point3, b: Point3, subdivisions: usize) -> Vec<Point3> {
    QuadraticBezier3::new(a, control, b).interior_points(subdivisions)
}

/// Builds the full track layout on `frame` within `extent`.
///
/// # Errors
/// Returns an error for a non-positive extent, invalid options, or a frame
/// whose up axis is zero or non-finite.
pub fn build_track(
    frame: &SurfaceFrame,
    extent: TrackExtent,
    options: &TrackOptions,
) -> Result<(TrackLayout, TrackDiagnostics), TrackError> {
    if !extent.is_valid() {
        return Err(TrackError::DegenerateExtent {
            width: extent.width,
            length: extent.length,
        });
    }
    options.validate()?;
    if !frame.center.is_finite() || !frame.forward.is_finite() {
        return Err(TrackError::InvalidFrame);
    }
    let up = frame.up.normalized().ok_or(TrackError::InvalidFrame)?;

    let mut diagnostics = TrackDiagnostics::default();

    let (forward, fallback) = flatten_forward(frame.forward, up);
    if fallback != ForwardFallback::None {
        let msg = format!("forward axis is parallel to up, using {fallback:?}");
        warn!("{msg}");
        diagnostics.warnings.push(msg);
    }
    diagnostics.forward_fallback = fallback;

    let right = up.cross(forward).normalized().ok_or(TrackError::InvalidFrame)?;
    let center = frame.center + up * options.road_height_offset;
    let placement = Frame::look_rotation(center, right, up).ok_or(TrackError::InvalidFrame)?;

    let half_x = extent.width * 0.5 * options.visual_margin_factor;
    let half_z = extent.length * 0.5 * options.visual_margin_factor;
    let corners = loop_corners(center, right, forward, half_x, half_z);
    // A finite extent can still overflow once squared into edge lengths.
    let measurable = corners.iter().enumerate().all(|(edge, start)| {
        start.is_finite() && start.distance_to(corners[(edge + 1) % 4]).is_finite()
    });
    if !measurable {
        return Err(TrackError::DegenerateExtent {
            width: extent.width,
            length: extent.length,
        });
    }

    let mut edges = Vec::with_capacity(4);
    for (edge, start) in corners.iter().copied().enumerate() {
        let end = corners[(edge + 1) % 4];
        let count = segment_count(
            start.distance_to(end) - 2.0 * options.corner_gap,
            options.segment_length,
        );
        if count > MAX_SEGMENTS_PER_EDGE {
            return Err(TrackError::TooManySegments { edge, count });
        }
        let sub = subdivide_edge(start, end, options.corner_gap, options.segment_length);
        if sub.usable_length <= 0.0 {
            let msg = format!("edge {edge} has no usable length between its corner gaps");
            warn!("{msg}");
            diagnostics.warnings.push(msg);
        }
        diagnostics.edge_segment_counts[edge] = sub.segment_count;
        diagnostics.edge_usable_lengths[edge] = sub.usable_length;
        edges.push(sub);
    }

    let bezier_offset = placement.transform_direction(options.corner_bezier_offset_local);
    let mut waypoints = Vec::new();
    let mut push = |position: Point3, kind: WaypointKind| {
        let index = waypoints.len();
        waypoints.push(Waypoint {
            index,
            position,
            kind,
        });
    };

    for (edge, sub) in edges.iter().enumerate() {
        for (slot, point) in sub.points.iter().copied().enumerate() {
            push(point, WaypointKind::Edge { edge, slot });
        }

        let corner = (edge + 1) % 4;
        let next = &edges[corner];
        if let (Some(a), Some(b)) = (sub.points.last(), next.points.first()) {
            let control = corners[corner] + bezier_offset;
            let blend = corner_blend(*a, control, *b, options.corner_subdivisions);
            for (k, point) in blend.into_iter().enumerate() {
                push(point, WaypointKind::CornerBlend { corner, step: k + 1 });
            }
        }
    }

    let mut road_segments = Vec::new();
    for (edge, sub) in edges.iter().enumerate() {
        let edge_dir = corners[(edge + 1) % 4] - corners[edge];
        road_segments.extend(road_segments_for_edge(edge, &sub.points, edge_dir, up, options)?);
    }

    let corner_pieces = corner_placements(&corners, up, options)?;
    let track_frame = placement.rotated_about_local_y(options.frame_yaw_offset_deg);

    let path: Vec<Point3> = waypoints.iter().map(|wp| wp.position).collect();
    diagnostics.edge_waypoint_count = waypoints.iter().filter(|wp| !wp.is_corner_blend()).count();
    diagnostics.corner_blend_waypoint_count = waypoints.len() - diagnostics.edge_waypoint_count;
    diagnostics.road_segment_count = road_segments.len();
    diagnostics.corner_piece_count = corner_pieces.len();
    diagnostics.path_length = polyline_length(&path)
        + match (path.first(), path.last()) {
            (Some(first), Some(last)) => last.distance_to(*first),
            _ => 0.0,
        };
    if has_duplicate_neighbors(&path, Tolerance::DEFAULT) {
        let msg = "path contains coincident consecutive waypoints".to_owned();
        warn!("{msg}");
        diagnostics.warnings.push(msg);
    }

    debug!("built track {:.3} x {:.3}: {}", extent.width, extent.length, diagnostics.summary());

    Ok((
        TrackLayout {
            frame: track_frame,
            corners,
            waypoints,
            road_segments,
            corner_pieces,
        },
        diagnostics,
    ))
}

fn flatten_forward(forward: Vec3, up: Vec3) -> (Vec3, ForwardFallback) {
    if let Some(forward) = forward.flattened_on(up) {
        return (forward, ForwardFallback::None);
    }
    if let Some(forward) = up.cross(Vec3::X).flattened_on(up) {
        return (forward, ForwardFallback::CrossWorldX);
    }
    // `up` is unit length; if it is parallel to X it is perpendicular to Z.
    let forward = up.cross(Vec3::Z).normalized().unwrap_or(Vec3::Z);
    (forward, ForwardFallback::CrossWorldZ)
}

fn road_segments_for_edge(
    edge: usize,
    points: &[Point3],
    edge_dir: Vec3,
    up: Vec3,
    options: &TrackOptions,
) -> Result<Vec<RoadSegmentPlacement>, TrackError> {
    points
        .windows(2)
        .map(|pair| {
            let (p0, p1) = (pair[0], pair[1]);
            let midpoint = p0.midpoint(p1);
            // Coincident pairs (no usable length) still face along the edge.
            let dir = (p1 - p0).normalized().unwrap_or(edge_dir);
            let orientation =
                Frame::look_rotation(midpoint, dir, up).ok_or(TrackError::InvalidFrame)?;
            Ok(RoadSegmentPlacement {
                edge,
                midpoint,
                orientation,
                length: p0.distance_to(p1) * options.segment_length_factor,
                width: options.road_width,
                thickness: options.road_thickness,
            })
        })
        .collect()
}

fn corner_placements(
    corners: &[Point3; 4],
    up: Vec3,
    options: &TrackOptions,
) -> Result<Vec<CornerPlacement>, TrackError> {
    corners
        .iter()
        .copied()
        .enumerate()
        .map(|(corner, position)| {
            let next = corners[(corner + 1) % corners.len()];
            let orientation = Frame::look_rotation(position, next - position, up)
                .ok_or(TrackError::InvalidFrame)?
                .rotated_about_local_y(options.corner_extra_rotation_deg);
            Ok(CornerPlacement {
                corner,
                position,
                orientation,
                scale: options.corner_scale,
            })
        })
        .collect()
}
