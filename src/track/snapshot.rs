//! Text snapshots and OBJ export of track layouts.
//!
//! Snapshots quantize every number to `1e-6` so they are stable across
//! platforms and can be diffed or stored as golden files.

use std::fmt::Write as _;

use super::builder::TrackLayout;
use super::diagnostics::TrackDiagnostics;
use crate::geom::Point3;

pub const SNAPSHOT_HEADER: &str = "# table-track snapshot v1";
const SNAPSHOT_QUANTIZE: f64 = 1e-6;
const SNAPSHOT_DECIMALS: usize = 6;

fn quantize_f64(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let q = (value / SNAPSHOT_QUANTIZE).round() * SNAPSHOT_QUANTIZE;
    // Collapse -0.0 so mirrored layouts print identically.
    if q == 0.0 { 0.0 } else { q }
}

fn write_values(out: &mut String, values: &[f64]) {
    for value in values {
        let value = quantize_f64(*value);
        let _ = write!(out, " {value:.SNAPSHOT_DECIMALS$}");
    }
}

fn write_line(out: &mut String, prefix: &str, values: &[f64]) {
    out.push_str(prefix);
    write_values(out, values);
    out.push('\n');
}

/// Line-oriented snapshot of `layout`, ending with the diagnostics summary.
#[must_use]
pub fn layout_snapshot(name: &str, layout: &TrackLayout, diagnostics: &TrackDiagnostics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{SNAPSHOT_HEADER}");
    let _ = writeln!(out, "scenario {name}");
    let _ = writeln!(out, "quantize {SNAPSHOT_QUANTIZE:.1e}");

    write_line(&mut out, "frame origin", &layout.frame.origin.to_array());
    write_line(&mut out, "frame rotation", &layout.frame.to_quaternion().to_array());

    for (i, corner) in layout.corners.iter().enumerate() {
        write_line(&mut out, &format!("corner {i}"), &corner.to_array());
    }

    let _ = writeln!(out, "waypoints {}", layout.waypoints.len());
    for wp in &layout.waypoints {
        write_line(&mut out, &format!("wp {}", wp.label()), &wp.position.to_array());
    }

    let _ = writeln!(out, "road_segments {}", layout.road_segments.len());
    for seg in &layout.road_segments {
        let mut prefix = format!("road {} pos", seg.edge);
        write_values(&mut prefix, &seg.midpoint.to_array());
        prefix.push_str(" rot");
        write_values(&mut prefix, &seg.rotation().to_array());
        write_line(&mut out, &format!("{prefix} scale"), &seg.scale().to_array());
    }

    let _ = writeln!(out, "corner_pieces {}", layout.corner_pieces.len());
    for piece in &layout.corner_pieces {
        let mut prefix = format!("corner_piece {} pos", piece.corner);
        write_values(&mut prefix, &piece.position.to_array());
        write_line(&mut out, &format!("{prefix} rot"), &piece.rotation().to_array());
    }

    let _ = writeln!(out, "summary {}", diagnostics.summary());
    out
}

/// Wavefront OBJ with the closed waypoint path and the corner loop as
/// polylines.
#[must_use]
pub fn layout_obj(name: &str, layout: &TrackLayout) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# table-track track_cli");

    let path = layout.path();
    write_obj_loop(&mut out, &format!("{name}_path"), &path, 0);
    write_obj_loop(&mut out, &format!("{name}_corners"), &layout.corners, path.len());
    out
}

fn write_obj_loop(out: &mut String, object: &str, points: &[Point3], base: usize) {
    let _ = writeln!(out, "o {object}");
    for p in points {
        let _ = writeln!(out, "v {} {} {}", p.x, p.y, p.z);
    }
    if points.is_empty() {
        return;
    }
    out.push('l');
    for i in 0..points.len() {
        let _ = write!(out, " {}", base + i + 1);
    }
    let _ = writeln!(out, " {}", base + 1);
}
