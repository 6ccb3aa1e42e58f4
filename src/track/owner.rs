//! Holds the live track and mirrors it into a renderer.
//!
//! A [`TrackOwner`] owns the current [`TrackLayout`] by value together with
//! the renderer handles spawned for it. Regeneration builds the new layout
//! first and only touches the renderer once the build succeeded, so a failed
//! regeneration leaves the previous track in place.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, info};

use super::builder::{
    CornerPlacement, RoadSegmentPlacement, TrackError, TrackLayout, TrackOptions, Waypoint,
    build_track,
};
use super::diagnostics::TrackDiagnostics;
use super::fit::{SurfaceFitError, SurfaceFitOptions, SurfaceFrame, TrackExtent, fit_to_nearest_surface};
use super::surface::SurfaceSource;
use crate::geom::{Point3, Vec3};

/// Visual instantiation seam.
///
/// Implementations create and destroy whatever represents a placement in the
/// host (scene objects, draw calls, meshes). The owner never inspects handles.
pub trait TrackRenderer {
    type Handle: Copy + fmt::Debug;

    fn has_road_template(&self) -> bool;
    fn has_corner_template(&self) -> bool;
    fn spawn_road_segment(&mut self, placement: &RoadSegmentPlacement) -> Self::Handle;
    fn spawn_corner(&mut self, placement: &CornerPlacement) -> Self::Handle;
    fn despawn(&mut self, handle: Self::Handle);
    /// Shows or hides the given road segments. Corner pieces are never passed.
    fn set_road_group_visible(&mut self, handles: &[Self::Handle], visible: bool);
}

/// One spawned item in a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Spawned {
    Road {
        placement: RoadSegmentPlacement,
        visible: bool,
    },
    Corner(CornerPlacement),
}

/// In-memory renderer that records every live placement.
#[derive(Debug, Clone)]
pub struct RecordingRenderer {
    pub road_template: bool,
    pub corner_template: bool,
    live: BTreeMap<usize, Spawned>,
    next_handle: usize,
    despawned: usize,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl RecordingRenderer {
    #[must_use]
    pub fn new(road_template: bool, corner_template: bool) -> Self {
        Self {
            road_template,
            corner_template,
            live: BTreeMap::new(),
            next_handle: 0,
            despawned: 0,
        }
    }

    #[must_use]
    pub fn live(&self) -> &BTreeMap<usize, Spawned> {
        &self.live
    }

    #[must_use]
    pub fn live_roads(&self) -> usize {
        self.live
            .values()
            .filter(|item| matches!(item, Spawned::Road { .. }))
            .count()
    }

    #[must_use]
    pub fn live_corners(&self) -> usize {
        self.live
            .values()
            .filter(|item| matches!(item, Spawned::Corner(_)))
            .count()
    }

    #[must_use]
    pub fn visible_roads(&self) -> usize {
        self.live
            .values()
            .filter(|item| matches!(item, Spawned::Road { visible: true, .. }))
            .count()
    }

    /// Total number of despawn calls so far.
    #[must_use]
    pub const fn despawned(&self) -> usize {
        self.despawned
    }

    fn insert(&mut self, item: Spawned) -> usize {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.live.insert(handle, item);
        handle
    }
}

impl TrackRenderer for RecordingRenderer {
    type Handle = usize;

    fn has_road_template(&self) -> bool {
        self.road_template
    }

    fn has_corner_template(&self) -> bool {
        self.corner_template
    }

    fn spawn_road_segment(&mut self, placement: &RoadSegmentPlacement) -> usize {
        self.insert(Spawned::Road {
            placement: *placement,
            visible: true,
        })
    }

    fn spawn_corner(&mut self, placement: &CornerPlacement) -> usize {
        self.insert(Spawned::Corner(*placement))
    }

    fn despawn(&mut self, handle: usize) {
        if self.live.remove(&handle).is_some() {
            self.despawned += 1;
        }
    }

    fn set_road_group_visible(&mut self, handles: &[usize], visible: bool) {
        for handle in handles {
            if let Some(Spawned::Road { visible: flag, .. }) = self.live.get_mut(handle) {
                *flag = visible;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Fit(#[from] SurfaceFitError),
    #[error(transparent)]
    Track(#[from] TrackError),
}

pub struct TrackOwner<R: TrackRenderer> {
    renderer: R,
    fit_options: SurfaceFitOptions,
    options: TrackOptions,
    extent: TrackExtent,
    layout: Option<TrackLayout>,
    diagnostics: Option<TrackDiagnostics>,
    road_handles: Vec<R::Handle>,
    corner_handles: Vec<R::Handle>,
    road_visible: bool,
}

impl<R: TrackRenderer> TrackOwner<R> {
    #[must_use]
    pub fn new(renderer: R, fit_options: SurfaceFitOptions, options: TrackOptions) -> Self {
        Self {
            renderer,
            extent: fit_options.default_extent,
            fit_options,
            options,
            layout: None,
            diagnostics: None,
            road_handles: Vec::new(),
            corner_handles: Vec::new(),
            road_visible: true,
        }
    }

    /// Fits to the nearest qualifying surface and regenerates on it.
    ///
    /// The fitted extent is kept only if the build succeeds.
    ///
    /// # Errors
    /// Returns fitter option errors and any [`TrackError`] from the build.
    pub fn fit_and_generate<S: SurfaceSource + ?Sized>(
        &mut self,
        reference_position: Point3,
        reference_forward: Vec3,
        source: &S,
    ) -> Result<&TrackLayout, GenerateError> {
        let (fit, fit_diag) =
            fit_to_nearest_surface(reference_position, reference_forward, source, &self.fit_options)?;
        debug!("surface fit: {}", fit_diag.summary());
        Ok(self.regenerate(&fit.frame, fit.extent)?)
    }

    /// Regenerates on an arbitrary contact surface using the current extent.
    ///
    /// # Errors
    /// Returns any [`TrackError`] from the build.
    pub fn generate_on_surface(
        &mut self,
        point: Point3,
        normal: Vec3,
        view_forward: Vec3,
    ) -> Result<&TrackLayout, GenerateError> {
        let frame = SurfaceFrame::new(point, normal, view_forward);
        Ok(self.regenerate(&frame, self.extent)?)
    }

    /// Shows or hides every road segment. Corner pieces stay visible.
    pub fn set_road_visible(&mut self, visible: bool) {
        self.road_visible = visible;
        self.renderer
            .set_road_group_visible(&self.road_handles, visible);
    }

    /// Waypoints of the current track; empty before the first build.
    #[must_use]
    pub fn waypoints(&self) -> &[Waypoint] {
        self.layout
            .as_ref()
            .map_or(&[], |layout| layout.waypoints.as_slice())
    }

    #[must_use]
    pub fn layout(&self) -> Option<&TrackLayout> {
        self.layout.as_ref()
    }

    #[must_use]
    pub fn diagnostics(&self) -> Option<&TrackDiagnostics> {
        self.diagnostics.as_ref()
    }

    #[must_use]
    pub const fn extent(&self) -> TrackExtent {
        self.extent
    }

    #[must_use]
    pub const fn road_visible(&self) -> bool {
        self.road_visible
    }

    #[must_use]
    pub const fn options(&self) -> &TrackOptions {
        &self.options
    }

    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Despawns everything and forgets the current track.
    pub fn clear(&mut self) {
        self.despawn_all();
        self.layout = None;
        self.diagnostics = None;
    }

    fn regenerate(
        &mut self,
        frame: &SurfaceFrame,
        extent: TrackExtent,
    ) -> Result<&TrackLayout, TrackError> {
        if !self.renderer.has_road_template() {
            return Err(TrackError::MissingRoadTemplate);
        }
        let (layout, diagnostics) = build_track(frame, extent, &self.options)?;

        self.despawn_all();
        self.road_handles = layout
            .road_segments
            .iter()
            .map(|segment| self.renderer.spawn_road_segment(segment))
            .collect();
        if self.renderer.has_corner_template() {
            self.corner_handles = layout
                .corner_pieces
                .iter()
                .map(|piece| self.renderer.spawn_corner(piece))
                .collect();
        }
        self.renderer
            .set_road_group_visible(&self.road_handles, self.road_visible);

        info!("track regenerated: {}", diagnostics.summary());
        self.extent = extent;
        self.diagnostics = Some(diagnostics);
        Ok(self.layout.insert(layout))
    }

    fn despawn_all(&mut self) {
        for handle in self.road_handles.drain(..).chain(self.corner_handles.drain(..)) {
            self.renderer.despawn(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> TrackOwner<RecordingRenderer> {
        TrackOwner::new(
            RecordingRenderer::default(),
            SurfaceFitOptions::default(),
            TrackOptions::default(),
        )
    }

    #[test]
    fn generate_spawns_roads_and_corners() {
        let mut owner = owner();
        let layout = owner
            .generate_on_surface(Point3::ORIGIN, Vec3::Y, Vec3::Z)
            .unwrap();
        let roads = layout.road_segments.len();
        assert!(roads > 0);
        assert_eq!(owner.renderer().live_roads(), roads);
        assert_eq!(owner.renderer().live_corners(), 4);
        assert_eq!(owner.waypoints().len(), owner.diagnostics().unwrap().waypoint_count());
    }

    #[test]
    fn regenerate_replaces_previous_track() {
        let mut owner = owner();
        owner
            .generate_on_surface(Point3::ORIGIN, Vec3::Y, Vec3::Z)
            .unwrap();
        let first = owner.renderer().live().len();
        owner
            .generate_on_surface(Point3::new(1.0, 0.0, 0.0), Vec3::Y, Vec3::X)
            .unwrap();
        assert_eq!(owner.renderer().live().len(), first);
        assert_eq!(owner.renderer().despawned(), first);
    }

    #[test]
    fn missing_road_template_keeps_nothing_spawned() {
        let mut owner = TrackOwner::new(
            RecordingRenderer::new(false, true),
            SurfaceFitOptions::default(),
            TrackOptions::default(),
        );
        let err = owner
            .generate_on_surface(Point3::ORIGIN, Vec3::Y, Vec3::Z)
            .unwrap_err();
        assert!(matches!(err, GenerateError::Track(TrackError::MissingRoadTemplate)));
        assert!(owner.layout().is_none());
        assert!(owner.renderer().live().is_empty());
    }

    #[test]
    fn missing_corner_template_skips_corners() {
        let mut owner = TrackOwner::new(
            RecordingRenderer::new(true, false),
            SurfaceFitOptions::default(),
            TrackOptions::default(),
        );
        owner
            .generate_on_surface(Point3::ORIGIN, Vec3::Y, Vec3::Z)
            .unwrap();
        assert_eq!(owner.renderer().live_corners(), 0);
        assert!(owner.renderer().live_roads() > 0);
    }

    #[test]
    fn failed_build_keeps_previous_track() {
        let mut owner = owner();
        owner
            .generate_on_surface(Point3::ORIGIN, Vec3::Y, Vec3::Z)
            .unwrap();
        let before = owner.layout().cloned();
        let live = owner.renderer().live().len();

        assert!(owner.generate_on_surface(Point3::ORIGIN, Vec3::ZERO, Vec3::Z).is_err());
        assert_eq!(owner.layout().cloned(), before);
        assert_eq!(owner.renderer().live().len(), live);
        assert_eq!(owner.renderer().despawned(), 0);
    }

    #[test]
    fn road_visibility_is_idempotent_and_survives_regeneration() {
        let mut owner = owner();
        owner
            .generate_on_surface(Point3::ORIGIN, Vec3::Y, Vec3::Z)
            .unwrap();

        owner.set_road_visible(false);
        owner.set_road_visible(false);
        assert_eq!(owner.renderer().visible_roads(), 0);
        assert_eq!(owner.renderer().live_corners(), 4);

        owner
            .generate_on_surface(Point3::ORIGIN, Vec3::Y, Vec3::X)
            .unwrap();
        assert!(!owner.road_visible());
        assert_eq!(owner.renderer().visible_roads(), 0);

        owner.set_road_visible(true);
        assert_eq!(owner.renderer().visible_roads(), owner.renderer().live_roads());
    }

    #[test]
    fn clear_releases_everything() {
        let mut owner = owner();
        owner
            .generate_on_surface(Point3::ORIGIN, Vec3::Y, Vec3::Z)
            .unwrap();
        owner.clear();
        assert!(owner.layout().is_none());
        assert!(owner.waypoints().is_empty());
        assert!(owner.renderer().live().is_empty());
    }
}
