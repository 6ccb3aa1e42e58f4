//! Turns surface contacts into track builds.

use log::debug;
use serde::{Deserialize, Serialize};

use super::builder::TrackLayout;
use super::owner::{GenerateError, TrackOwner, TrackRenderer};
use crate::geom::{Point3, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchSpawnerOptions {
    /// Minimum time between two accepted contacts.
    pub cooldown_seconds: f64,
    /// Lift of the spawn point along the contact normal.
    pub spawn_height_offset: f64,
}

impl Default for TouchSpawnerOptions {
    fn default() -> Self {
        Self {
            cooldown_seconds: 0.3,
            spawn_height_offset: 0.01,
        }
    }
}

/// A touch or collision against a surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactEvent {
    pub point: Point3,
    pub normal: Vec3,
    /// Usually the viewer's camera forward.
    pub viewer_forward: Vec3,
    /// Used when `viewer_forward` is parallel to the normal.
    pub fallback_forward: Vec3,
    pub time_seconds: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpawnOutcome {
    CoolingDown { remaining_seconds: f64 },
    Spawned(Box<TrackLayout>),
}

#[derive(Debug, Clone, Default)]
pub struct TouchSpawner {
    options: TouchSpawnerOptions,
    last_accepted: Option<f64>,
}

impl TouchSpawner {
    #[must_use]
    pub const fn new(options: TouchSpawnerOptions) -> Self {
        Self {
            options,
            last_accepted: None,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &TouchSpawnerOptions {
        &self.options
    }

    /// Handles one contact. The cooldown starts even if the build fails.
    ///
    /// # Errors
    /// Returns the owner's build error.
    pub fn on_contact<R: TrackRenderer>(
        &mut self,
        event: &ContactEvent,
        owner: &mut TrackOwner<R>,
    ) -> Result<SpawnOutcome, GenerateError> {
        if let Some(last) = self.last_accepted {
            let elapsed = event.time_seconds - last;
            if elapsed < self.options.cooldown_seconds {
                debug!("contact ignored, {elapsed:.3}s since last spawn");
                return Ok(SpawnOutcome::CoolingDown {
                    remaining_seconds: self.options.cooldown_seconds - elapsed,
                });
            }
        }
        self.last_accepted = Some(event.time_seconds);

        // A zero normal is passed through so the builder reports it.
        let up = event.normal.normalized().unwrap_or(event.normal);
        let point = event.point + up * self.options.spawn_height_offset;
        let forward = event
            .viewer_forward
            .flattened_on(up)
            .or_else(|| event.fallback_forward.flattened_on(up))
            .unwrap_or(event.viewer_forward);

        let layout = owner.generate_on_surface(point, up, forward)?;
        Ok(SpawnOutcome::Spawned(Box::new(layout.clone())))
    }
}
