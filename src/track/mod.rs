//! Closed-loop track generation on detected surfaces.
//!
//! The pipeline is one-way: [`fit_to_nearest_surface`] picks a frame and
//! extent, [`build_track`] turns them into a [`TrackLayout`], and
//! [`TrackOwner`] mirrors the layout into a [`TrackRenderer`].

mod builder;
mod diagnostics;
mod fit;
mod owner;
mod snapshot;
mod spawner;
mod surface;

pub use builder::{
    CornerPlacement, EdgeSubdivision, MAX_CORNER_SUBDIVISIONS, RoadSegmentPlacement, TrackError,
    TrackLayout, TrackOptions, Waypoint, WaypointKind, build_track, corner_blend, loop_corners, segment_count, subdivide_edge,
};
pub use diagnostics::{ForwardFallback, TrackDiagnostics};
pub use fit::{
    ForwardSource, SurfaceFit, SurfaceFitDiagnostics, SurfaceFitError, SurfaceFitOptions,
    SurfaceFrame, TrackExtent, fit_to_nearest_surface,
};
pub use owner::{GenerateError, RecordingRenderer, Spawned, TrackOwner, TrackRenderer};
pub use snapshot::{SNAPSHOT_HEADER, layout_obj, layout_snapshot};
pub use spawner::{ContactEvent, SpawnOutcome, TouchSpawner, TouchSpawnerOptions};
pub use surface::{PlaneExtent, SurfaceCandidate, SurfaceLabel, SurfaceLabels, SurfaceSource};

#[cfg(test)]
mod tests;
