#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod geom;
pub mod spawn;
pub mod track;

use std::collections::BTreeSet;
use std::fmt;

use config::TrackConfig;
use geom::{Point3, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use spawn::SpawnGrid;
use track::{
    ContactEvent, RecordingRenderer, SpawnOutcome, SurfaceCandidate, TouchSpawner, TrackLayout,
    TrackOwner,
};
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    // A second initialize() finds the logger already set.
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

#[derive(Debug, Serialize, Clone, PartialEq)]
struct PoseExport {
    position: [f64; 3],
    rotation: [f64; 4],
    scale: [f64; 3],
}

#[derive(Debug, Serialize, Clone, PartialEq)]
struct WaypointExport {
    label: String,
    position: [f64; 3],
    corner_blend: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
struct LayoutExport {
    frame: PoseExport,
    corners: [[f64; 3]; 4],
    waypoints: Vec<WaypointExport>,
    road_segments: Vec<PoseExport>,
    corner_pieces: Vec<PoseExport>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContactExport {
    CoolingDown { remaining_seconds: f64 },
    Spawned { layout: LayoutExport },
}

#[derive(Debug, Default, Serialize)]
struct SpawnCellsExport {
    car: Option<[f64; 3]>,
    objects: Vec<[f64; 3]>,
}

#[derive(Debug, Deserialize)]
struct FitRequest {
    reference_position: Point3,
    reference_forward: Vec3,
    /// `None` when the host has no scene loaded.
    #[serde(default)]
    surfaces: Option<Vec<SurfaceCandidate>>,
}

fn export_layout(layout: &TrackLayout) -> LayoutExport {
    LayoutExport {
        frame: PoseExport {
            position: layout.frame.origin.to_array(),
            rotation: layout.frame.to_quaternion().to_array(),
            scale: [1.0, 1.0, 1.0],
        },
        corners: layout.corners.map(Point3::to_array),
        waypoints: layout
            .waypoints
            .iter()
            .map(|wp| WaypointExport {
                label: wp.label(),
                position: wp.position.to_array(),
                corner_blend: wp.is_corner_blend(),
            })
            .collect(),
        road_segments: layout
            .road_segments
            .iter()
            .map(|seg| PoseExport {
                position: seg.midpoint.to_array(),
                rotation: seg.rotation().to_array(),
                scale: seg.scale().to_array(),
            })
            .collect(),
        corner_pieces: layout
            .corner_pieces
            .iter()
            .map(|piece| PoseExport {
                position: piece.position.to_array(),
                rotation: piece.rotation().to_array(),
                scale: piece.scale.to_array(),
            })
            .collect(),
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsError::new(&err.to_string()).into())
}

fn from_js<T: for<'de> Deserialize<'de>>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(to_js_error)
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct TrackEngine {
    config: TrackConfig,
    owner: TrackOwner<RecordingRenderer>,
    spawner: TouchSpawner,
}

#[wasm_bindgen]
impl TrackEngine {
    /// Creates an engine from a configuration object; `undefined` or `null`
    /// selects the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<TrackEngine, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            TrackConfig::default()
        } else {
            from_js::<TrackConfig>(config)?
        };
        config.validate().map_err(to_js_error)?;
        Ok(Self::with_config(config))
    }

    /// Fits to the nearest table in `request` and regenerates the track.
    ///
    /// `request` is `{reference_position, reference_forward, surfaces?}`.
    #[wasm_bindgen]
    pub fn fit_and_generate(&mut self, request: JsValue) -> Result<JsValue, JsValue> {
        let request: FitRequest = from_js(request)?;
        let layout = self
            .owner
            .fit_and_generate(
                request.reference_position,
                request.reference_forward,
                &request.surfaces,
            )
            .map_err(to_js_error)?;
        debug_log!("fit_and_generate: {} waypoints", layout.waypoints.len());
        to_js(&export_layout(layout))
    }

    /// Handles a surface contact; see [`ContactEvent`] for the fields.
    #[wasm_bindgen]
    pub fn on_contact(&mut self, event: JsValue) -> Result<JsValue, JsValue> {
        let event: ContactEvent = from_js(event)?;
        let outcome = self
            .spawner
            .on_contact(&event, &mut self.owner)
            .map_err(to_js_error)?;
        let export = match outcome {
            SpawnOutcome::CoolingDown { remaining_seconds } => {
                ContactExport::CoolingDown { remaining_seconds }
            }
            SpawnOutcome::Spawned(layout) => ContactExport::Spawned {
                layout: export_layout(&layout),
            },
        };
        to_js(&export)
    }

    #[wasm_bindgen]
    pub fn set_road_visible(&mut self, visible: bool) {
        self.owner.set_road_visible(visible);
    }

    #[wasm_bindgen]
    pub fn road_visible(&self) -> bool {
        self.owner.road_visible()
    }

    /// Current layout, or `null` before the first build.
    #[wasm_bindgen]
    pub fn layout(&self) -> Result<JsValue, JsValue> {
        match self.owner.layout() {
            Some(layout) => to_js(&export_layout(layout)),
            None => Ok(JsValue::NULL),
        }
    }

    /// Waypoint positions in traversal order.
    #[wasm_bindgen]
    pub fn waypoints(&self) -> Result<JsValue, JsValue> {
        let points: Vec<[f64; 3]> = self
            .owner
            .waypoints()
            .iter()
            .map(|wp| wp.position.to_array())
            .collect();
        to_js(&points)
    }

    #[wasm_bindgen]
    pub fn diagnostics(&self) -> Option<String> {
        self.owner.diagnostics().map(ToString::to_string)
    }

    /// Picks a car cell and `object_count` object cells on `surface`.
    #[wasm_bindgen]
    pub fn spawn_cells(&self, surface: JsValue, object_count: usize, seed: u64) -> Result<JsValue, JsValue> {
        let surface: SurfaceCandidate = from_js(surface)?;
        let grid = SpawnGrid::new(&surface, &self.config.grid).map_err(to_js_error)?;
        to_js(&pick_spawn_cells(&grid, object_count, seed))
    }

    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.owner.clear();
    }
}

impl TrackEngine {
    #[must_use]
    pub fn with_config(config: TrackConfig) -> Self {
        Self {
            owner: TrackOwner::new(RecordingRenderer::default(), config.fit, config.track),
            spawner: TouchSpawner::new(config.spawner),
            config,
        }
    }

    #[must_use]
    pub fn owner(&self) -> &TrackOwner<RecordingRenderer> {
        &self.owner
    }
}

fn pick_spawn_cells(grid: &SpawnGrid, object_count: usize, seed: u64) -> SpawnCellsExport {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut occupied = BTreeSet::new();
    let center = |index: usize| grid.cell(index).map(|cell| cell.center.to_array());
    SpawnCellsExport {
        car: grid.pick_car_cell(&mut rng).and_then(center),
        objects: grid
            .pick_object_cells(object_count, &mut occupied, &mut rng)
            .into_iter()
            .filter_map(center)
            .collect(),
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
