#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("track_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::path::{Path, PathBuf};

    use table_track::config::TrackConfig;
    use table_track::geom::{Point3, Vec3};
    use table_track::track::{
        ContactEvent, RecordingRenderer, SpawnOutcome, SurfaceCandidate, SurfaceFrame,
        SurfaceLabels, TouchSpawner, TrackDiagnostics, TrackExtent, TrackLayout, TrackOwner,
        build_track, fit_to_nearest_surface, layout_obj, layout_snapshot,
    };

    const USAGE: &str = r"track_cli (table-track)

USAGE:
  track_cli list
  track_cli run <scenario|all> [options]

SCENARIOS:
  flat_table
  default_extent
  tilted_surface
  short_edges
  room_fit
  no_corner_blend
  contact_spawn

OPTIONS (run):
  --config <path>    JSON configuration applied to every scenario
  --out-dir <dir>    Write <scenario>.obj and <scenario>.snap to this dir (required for `all`)
  --obj <path>       Write OBJ (single scenario only)
  --snap <path>      Write snapshot (single scenario only)
  --overwrite        Overwrite existing output files
  -h, --help         Show this help
";

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                for scenario in Scenario::ALL {
                    println!("{}", scenario.name());
                }
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let scenario_name = args.next().ok_or("missing scenario name")?;

        let mut config_path: Option<PathBuf> = None;
        let mut out_dir: Option<PathBuf> = None;
        let mut obj_path: Option<PathBuf> = None;
        let mut snap_path: Option<PathBuf> = None;
        let mut overwrite = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config_path = Some(PathBuf::from(args.value("--config")?)),
                "--out-dir" => out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
                "--obj" => obj_path = Some(PathBuf::from(args.value("--obj")?)),
                "--snap" => snap_path = Some(PathBuf::from(args.value("--snap")?)),
                "--overwrite" => overwrite = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let config = match config_path.as_deref() {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .map_err(|e| format!("read config {}: {e}", path.display()))?;
                TrackConfig::from_json_str(&json).map_err(|e| format!("{}: {e}", path.display()))?
            }
            None => TrackConfig::default(),
        };

        if let Some(dir) = out_dir.as_ref() {
            if obj_path.is_some() || snap_path.is_some() {
                return Err("use either --out-dir or --obj/--snap (not both)".to_string());
            }
            fs::create_dir_all(dir).map_err(|e| format!("create out dir: {e}"))?;

            if scenario_name == "all" {
                for scenario in Scenario::ALL {
                    run_one_scenario_to_dir(*scenario, &config, dir, overwrite)?;
                }
                return Ok(());
            }

            let scenario = Scenario::from_name(&scenario_name)
                .ok_or_else(|| unknown_scenario(&scenario_name))?;
            return run_one_scenario_to_dir(scenario, &config, dir, overwrite);
        }

        if scenario_name == "all" {
            return Err("`run all` requires --out-dir".to_string());
        }

        let scenario =
            Scenario::from_name(&scenario_name).ok_or_else(|| unknown_scenario(&scenario_name))?;
        let output = run_scenario(scenario, &config)?;

        if let Some(path) = snap_path.as_deref() {
            write_text_file(path, &output.snapshot, overwrite)?;
            eprintln!("wrote {}", path.display());
        } else {
            print!("{}", output.snapshot);
        }

        if let Some(path) = obj_path.as_deref() {
            write_text_file(path, &layout_obj(output.name, &output.layout), overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        eprintln!("{}: {}", output.name, output.diagnostics.summary());
        Ok(())
    }

    fn run_one_scenario_to_dir(
        scenario: Scenario,
        config: &TrackConfig,
        dir: &Path,
        overwrite: bool,
    ) -> Result<(), String> {
        let output = run_scenario(scenario, config)?;

        let path = dir.join(format!("{}.snap", output.name));
        write_text_file(&path, &output.snapshot, overwrite)?;
        eprintln!("wrote {}", path.display());

        let path = dir.join(format!("{}.obj", output.name));
        write_text_file(&path, &layout_obj(output.name, &output.layout), overwrite)?;
        eprintln!("wrote {}", path.display());

        eprintln!("{}: {}", output.name, output.diagnostics.summary());
        Ok(())
    }

    fn unknown_scenario(name: &str) -> String {
        let mut msg = format!("unknown scenario `{name}`\n\navailable scenarios:\n");
        for scenario in Scenario::ALL {
            msg.push_str("  ");
            msg.push_str(scenario.name());
            msg.push('\n');
        }
        msg
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        fs::write(path, normalize_text(text)).map_err(|e| format!("write {}: {e}", path.display()))
    }

    fn normalize_text(text: &str) -> String {
        let normalized = text.replace("\r\n", "\n");
        if normalized.ends_with('\n') {
            normalized
        } else {
            format!("{normalized}\n")
        }
    }

    struct ScenarioOutput {
        name: &'static str,
        layout: TrackLayout,
        diagnostics: TrackDiagnostics,
        snapshot: String,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Scenario {
        FlatTable,
        DefaultExtent,
        TiltedSurface,
        ShortEdges,
        RoomFit,
        NoCornerBlend,
        ContactSpawn,
    }

    impl Scenario {
        const ALL: &'static [Scenario] = &[
            Scenario::FlatTable,
            Scenario::DefaultExtent,
            Scenario::TiltedSurface,
            Scenario::ShortEdges,
            Scenario::RoomFit,
            Scenario::NoCornerBlend,
            Scenario::ContactSpawn,
        ];

        fn name(self) -> &'static str {
            match self {
                Scenario::FlatTable => "flat_table",
                Scenario::DefaultExtent => "default_extent",
                Scenario::TiltedSurface => "tilted_surface",
                Scenario::ShortEdges => "short_edges",
                Scenario::RoomFit => "room_fit",
                Scenario::NoCornerBlend => "no_corner_blend",
                Scenario::ContactSpawn => "contact_spawn",
            }
        }

        fn from_name(name: &str) -> Option<Self> {
            Self::ALL.iter().copied().find(|scenario| scenario.name() == name)
        }
    }

    fn sample_room() -> Vec<SurfaceCandidate> {
        vec![
            SurfaceCandidate::horizontal("floor", Point3::ORIGIN, 4.0, 5.0, SurfaceLabels::FLOOR),
            SurfaceCandidate::horizontal(
                "desk",
                Point3::new(1.5, 0.72, -0.8),
                1.4,
                0.7,
                SurfaceLabels::TABLE,
            ),
            SurfaceCandidate::horizontal(
                "coffee_table",
                Point3::new(-0.4, 0.45, 0.6),
                1.0,
                0.6,
                SurfaceLabels::TABLE,
            ),
        ]
    }

    fn run_scenario(scenario: Scenario, config: &TrackConfig) -> Result<ScenarioOutput, String> {
        let flat = SurfaceFrame::new(Point3::new(0.0, 0.75, 0.0), Vec3::Y, Vec3::Z);
        let mut options = config.track;

        let (layout, diagnostics) = match scenario {
            Scenario::FlatTable => build_track(&flat, TrackExtent::new(1.0, 0.6), &options),
            Scenario::DefaultExtent => build_track(&flat, config.fit.default_extent, &options),
            Scenario::TiltedSurface => {
                let frame = SurfaceFrame::new(
                    Point3::new(0.2, 0.8, -0.3),
                    Vec3::new(0.15, 1.0, -0.1),
                    Vec3::new(0.3, 0.0, 1.0),
                );
                build_track(&frame, TrackExtent::new(0.9, 1.2), &options)
            }
            Scenario::ShortEdges => build_track(&flat, TrackExtent::new(0.1, 0.12), &options),
            Scenario::NoCornerBlend => {
                options.corner_subdivisions = 0;
                build_track(&flat, TrackExtent::new(1.0, 0.6), &options)
            }
            Scenario::RoomFit => {
                let room = sample_room();
                let (fit, fit_diag) =
                    fit_to_nearest_surface(Point3::new(0.0, 1.5, 0.0), Vec3::Z, &room, &config.fit)
                        .map_err(|e| e.to_string())?;
                eprintln!("{}: {}", scenario.name(), fit_diag.summary());
                build_track(&fit.frame, fit.extent, &options)
            }
            Scenario::ContactSpawn => return run_contact_spawn(config),
        }
        .map_err(|e| e.to_string())?;

        Ok(ScenarioOutput {
            name: scenario.name(),
            snapshot: layout_snapshot(scenario.name(), &layout, &diagnostics),
            layout,
            diagnostics,
        })
    }

    fn run_contact_spawn(config: &TrackConfig) -> Result<ScenarioOutput, String> {
        let name = Scenario::ContactSpawn.name();
        let mut owner = TrackOwner::new(RecordingRenderer::default(), config.fit, config.track);
        let mut spawner = TouchSpawner::new(config.spawner);
        let event = ContactEvent {
            point: Point3::new(0.3, 0.74, 0.1),
            normal: Vec3::Y,
            viewer_forward: Vec3::new(0.4, -0.6, 0.7),
            fallback_forward: Vec3::Z,
            time_seconds: 0.0,
        };
        let outcome = spawner.on_contact(&event, &mut owner).map_err(|e| e.to_string())?;
        let SpawnOutcome::Spawned(layout) = outcome else {
            return Err("first contact unexpectedly cooling down".to_string());
        };
        let diagnostics = owner
            .diagnostics()
            .cloned()
            .ok_or("contact spawn produced no diagnostics")?;
        Ok(ScenarioOutput {
            name,
            snapshot: layout_snapshot(name, &layout, &diagnostics),
            layout: *layout,
            diagnostics,
        })
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next().ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
