//! Fitting a track frame and extent to the nearest detected surface.
//!
//! The fitter never fails because a surface is missing: with no room, no
//! labelled candidate or no candidate with a plane rectangle it returns the
//! caller's reference frame and the configured default extent, and records
//! why in [`SurfaceFitDiagnostics::warnings`].
//!
//! # Example
//!
//! ```ignore
//! use table_track::track::{SurfaceFitOptions, fit_to_nearest_surface};
//!
//! let (fit, diag) = fit_to_nearest_surface(
//!     reference_position,
//!     reference_forward,
//!     &surfaces,
//!     &SurfaceFitOptions::default(),
//! )?;
//! if diag.used_fallback() {
//!     log::warn!("track placed without a surface: {}", diag.summary());
//! }
//! ```

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::surface::{SurfaceCandidate, SurfaceLabels, SurfaceSource};
use crate::geom::{Point3, Vec3};

/// `|dot(normal, world_up)|` above this counts as a horizontal surface.
const HORIZONTAL_DOT_THRESHOLD: f64 = 0.5;

/// Track center, up axis and forward axis in world space.
///
/// `right` is always derived from `up × forward`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceFrame {
    pub center: Point3,
    pub up: Vec3,
    pub forward: Vec3,
}

impl SurfaceFrame {
    #[must_use]
    pub const fn new(center: Point3, up: Vec3, forward: Vec3) -> Self {
        Self {
            center,
            up,
            forward,
        }
    }

    #[must_use]
    pub fn right(self) -> Vec3 {
        self.up.cross(self.forward)
    }
}

/// Width (along right) and length (along forward) available to the track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackExtent {
    pub width: f64,
    pub length: f64,
}

impl TrackExtent {
    #[must_use]
    pub const fn new(width: f64, length: f64) -> Self {
        Self { width, length }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.length.is_finite() && self.width > 0.0 && self.length > 0.0
    }
}

impl Default for TrackExtent {
    fn default() -> Self {
        Self::new(0.4, 0.8)
    }
}

/// Options for [`fit_to_nearest_surface`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceFitOptions {
    /// Fraction of the surface extent the track may use, in `(0, 1]`.
    pub margin_factor: f64,
    /// A candidate must carry at least one of these labels.
    pub labels: SurfaceLabels,
    /// Extent used when no surface qualifies.
    pub default_extent: TrackExtent,
    pub world_up: Vec3,
}

impl Default for SurfaceFitOptions {
    fn default() -> Self {
        Self {
            margin_factor: 0.85,
            labels: SurfaceLabels::TABLE,
            default_extent: TrackExtent::default(),
            world_up: Vec3::Y,
        }
    }
}

impl SurfaceFitOptions {
    /// # Errors
    /// Returns an error for a margin outside `(0, 1]`, a zero world up or an
    /// invalid default extent.
    pub fn validate(&self) -> Result<(), SurfaceFitError> {
        let margin = self.margin_factor;
        if !margin.is_finite() || margin <= 0.0 || margin > 1.0 {
            return Err(SurfaceFitError::InvalidMarginFactor(margin));
        }
        if !self.world_up.is_finite() || self.world_up.normalized().is_none() {
            return Err(SurfaceFitError::InvalidWorldUp);
        }
        if !self.default_extent.is_valid() {
            return Err(SurfaceFitError::InvalidDefaultExtent {
                width: self.default_extent.width,
                length: self.default_extent.length,
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SurfaceFitError {
    #[error("margin factor must be finite and in (0, 1], got {0}")]
    InvalidMarginFactor(f64),
    #[error("world up must be a finite non-zero vector")]
    InvalidWorldUp,
    #[error("reference position and forward must be finite")]
    NonFiniteReference,
    #[error("default extent must be finite and > 0, got {width} x {length}")]
    InvalidDefaultExtent { width: f64, length: f64 },
}

/// Result of a fit: frame, extent and the index of the chosen surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceFit {
    pub frame: SurfaceFrame,
    pub extent: TrackExtent,
    pub surface: Option<usize>,
}

/// Which axis of the chosen surface produced the forward direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForwardSource {
    #[default]
    Reference,
    SurfaceForward,
    SurfaceRight,
    Orthogonal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceFitDiagnostics {
    /// Candidates offered by the source (0 when there was no scene).
    pub candidate_count: usize,
    /// Candidates that had an extent and a matching label.
    pub qualifying_count: usize,
    pub surface_name: Option<String>,
    pub surface_width: f64,
    pub surface_length: f64,
    pub distance: f64,
    /// `dot(surface normal, world up)` of the chosen surface.
    pub dot_up: f64,
    pub forward_source: ForwardSource,
    pub warnings: Vec<String>,
}

impl SurfaceFitDiagnostics {
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.surface_name.is_none()
    }

    #[must_use]
    pub fn summary(&self) -> String {
        match self.surface_name.as_deref() {
            Some(name) => format!(
                "surface `{name}` {:.2} x {:.2} at {:.2} m, dotUp={:.2}",
                self.surface_width, self.surface_length, self.distance, self.dot_up
            ),
            None => format!(
                "no surface ({} candidates, {} qualifying)",
                self.candidate_count, self.qualifying_count
            ),
        }
    }
}

/// Picks the nearest labelled surface and derives the track frame and extent.
///
/// # Errors
/// Returns an error for invalid options or non-finite reference inputs.
/// A missing surface is not an error.
pub fn fit_to_nearest_surface<S: SurfaceSource + ?Sized>(
    reference_position: Point3,
    reference_forward: Vec3,
    source: &S,
    options: &SurfaceFitOptions,
) -> Result<(SurfaceFit, SurfaceFitDiagnostics), SurfaceFitError> {
    options.validate()?;
    let margin = options.margin_factor;
    let world_up = options
        .world_up
        .normalized()
        .ok_or(SurfaceFitError::InvalidWorldUp)?;
    if !reference_position.is_finite() || !reference_forward.is_finite() {
        return Err(SurfaceFitError::NonFiniteReference);
    }

    let mut diagnostics = SurfaceFitDiagnostics::default();
    let fallback = SurfaceFit {
        frame: SurfaceFrame::new(reference_position, world_up, reference_forward),
        extent: options.default_extent,
        surface: None,
    };

    let Some(candidates) = source.candidate_surfaces() else {
        let msg = "no scene available, using default track size".to_owned();
        warn!("{msg}");
        diagnostics.warnings.push(msg);
        return Ok((fallback, diagnostics));
    };
    diagnostics.candidate_count = candidates.len();

    let mut best: Option<(usize, &SurfaceCandidate, f64)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        if candidate.extent.is_none() || !candidate.labels.intersects(options.labels) {
            continue;
        }
        if !candidate.center.is_finite() {
            continue;
        }
        diagnostics.qualifying_count += 1;

        let dist = reference_position.distance_to(candidate.center);
        if best.is_none_or(|(_, _, best_dist)| dist < best_dist) {
            best = Some((index, candidate, dist));
        }
    }

    let Some((index, surface, distance)) = best else {
        let msg = format!(
            "no surface labelled {} near the track, using default track size",
            options.labels
        );
        warn!("{msg}");
        diagnostics.warnings.push(msg);
        return Ok((fallback, diagnostics));
    };

    // Filtered above: every qualifying candidate has an extent.
    let Some(rect) = surface.extent else {
        return Ok((fallback, diagnostics));
    };

    let extent = TrackExtent::new(rect.width * margin, rect.height * margin);

    let dot_up = surface
        .plane_normal
        .normalized()
        .map_or(0.0, |normal| normal.dot(world_up));
    // Steep and vertical surfaces still get a flat track.
    let up = if dot_up.abs() > HORIZONTAL_DOT_THRESHOLD && dot_up < 0.0 {
        -world_up
    } else {
        world_up
    };

    let (forward, forward_source) = flatten_forward(surface, up);
    if forward_source != ForwardSource::SurfaceForward {
        let msg = format!(
            "surface `{}` forward axis is parallel to up, using {forward_source:?}",
            surface.name
        );
        warn!("{msg}");
        diagnostics.warnings.push(msg);
    }

    diagnostics.surface_name = Some(surface.name.clone());
    diagnostics.surface_width = rect.width;
    diagnostics.surface_length = rect.height;
    diagnostics.distance = distance;
    diagnostics.dot_up = dot_up;
    diagnostics.forward_source = forward_source;

    info!(
        "fitted to surface `{}` {:.2} x {:.2}, track {:.2} x {:.2}, dotUp={:.2}",
        surface.name, rect.width, rect.height, extent.width, extent.length, dot_up
    );

    Ok((
        SurfaceFit {
            frame: SurfaceFrame::new(surface.center, up, forward),
            extent,
            surface: Some(index),
        },
        diagnostics,
    ))
}

fn flatten_forward(surface: &SurfaceCandidate, up: Vec3) -> (Vec3, ForwardSource) {
    if let Some(forward) = surface.forward_axis.flattened_on(up) {
        return (forward, ForwardSource::SurfaceForward);
    }
    if let Some(forward) = surface.right_axis.flattened_on(up) {
        return (forward, ForwardSource::SurfaceRight);
    }
    // `up` is a normalized world up, so an orthogonal always exists.
    (up.any_orthogonal().unwrap_or(Vec3::Z), ForwardSource::Orthogonal)
}
