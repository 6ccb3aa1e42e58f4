use crate::geom::{Point3, Tolerance, Vec3};
use crate::track::{
    ForwardFallback, RecordingRenderer, SurfaceCandidate, SurfaceFitOptions, SurfaceLabels,
    TrackExtent, TrackOptions, TrackOwner, build_track, fit_to_nearest_surface,
};

fn room() -> Vec<SurfaceCandidate> {
    vec![
        SurfaceCandidate::horizontal("floor", Point3::ORIGIN, 4.0, 5.0, SurfaceLabels::FLOOR),
        SurfaceCandidate::horizontal(
            "desk",
            Point3::new(2.0, 0.72, 0.0),
            1.4,
            0.7,
            SurfaceLabels::TABLE,
        ),
        SurfaceCandidate::horizontal(
            "dining",
            Point3::new(-0.5, 0.75, 0.4),
            1.0,
            0.6,
            SurfaceLabels::TABLE,
        ),
    ]
}

#[test]
fn fitted_track_sits_on_nearest_table() {
    let surfaces = room();
    let (fit, diag) = fit_to_nearest_surface(
        Point3::new(0.0, 1.5, 0.0),
        Vec3::Z,
        &surfaces,
        &SurfaceFitOptions::default(),
    )
    .unwrap();
    assert_eq!(fit.surface, Some(2));
    assert_eq!(diag.surface_name.as_deref(), Some("dining"));

    let (layout, _) = build_track(&fit.frame, fit.extent, &TrackOptions::default()).unwrap();
    let tol = Tolerance::new(1e-9);
    assert!(tol.approx_eq_point3(layout.frame.origin, Point3::new(-0.5, 0.78, 0.4)));
    for wp in &layout.waypoints {
        assert!(tol.approx_eq_f64(wp.position.y, 0.78));
        assert!((wp.position.x + 0.5).abs() <= 0.5 * 0.85);
        assert!((wp.position.z - 0.4).abs() <= 0.3 * 0.85);
    }
}

#[test]
fn owner_keeps_fitted_extent_for_later_contacts() {
    let surfaces = room();
    let mut owner = TrackOwner::new(
        RecordingRenderer::default(),
        SurfaceFitOptions::default(),
        TrackOptions::default(),
    );
    assert_eq!(owner.extent(), TrackExtent::new(0.4, 0.8));

    owner
        .fit_and_generate(Point3::new(2.0, 1.2, 0.1), Vec3::Z, &surfaces)
        .unwrap();
    let tol = Tolerance::new(1e-12);
    assert!(tol.approx_eq_f64(owner.extent().width, 1.4 * 0.85));
    assert!(tol.approx_eq_f64(owner.extent().length, 0.7 * 0.85));

    let layout = owner
        .generate_on_surface(Point3::new(5.0, 0.0, 5.0), Vec3::Y, Vec3::X)
        .unwrap();
    let c = layout.corners;
    let tol = Tolerance::new(1e-9);
    assert!(tol.approx_eq_f64(c[0].distance_to(c[1]), 1.4 * 0.85 * 0.8));
}

#[test]
fn no_scene_uses_default_extent() {
    let mut owner = TrackOwner::new(
        RecordingRenderer::default(),
        SurfaceFitOptions::default(),
        TrackOptions::default(),
    );
    let none: Option<Vec<SurfaceCandidate>> = None;
    let layout = owner
        .fit_and_generate(Point3::new(0.0, 1.0, 0.0), Vec3::Z, &none)
        .unwrap();
    let c = layout.corners;
    let tol = Tolerance::new(1e-9);
    assert!(tol.approx_eq_f64(c[0].distance_to(c[1]), 0.4 * 0.8));
    assert!(tol.approx_eq_f64(c[1].distance_to(c[2]), 0.8 * 0.8));
    assert_eq!(owner.extent(), TrackExtent::new(0.4, 0.8));
}

#[test]
fn short_reference_forward_survives_fit_fallback() {
    let none: Option<Vec<SurfaceCandidate>> = None;
    let (fit, _) = fit_to_nearest_surface(
        Point3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 0.005),
        &none,
        &SurfaceFitOptions::default(),
    )
    .unwrap();
    let (layout, diag) = build_track(&fit.frame, fit.extent, &TrackOptions::default()).unwrap();
    assert_eq!(diag.forward_fallback, ForwardFallback::None);
    assert!(layout.corners[1].x > layout.corners[0].x);

    let mut owner = TrackOwner::new(
        RecordingRenderer::default(),
        SurfaceFitOptions::default(),
        TrackOptions::default(),
    );
    owner
        .generate_on_surface(Point3::ORIGIN, Vec3::Y, Vec3::new(0.0, 0.0, 0.009))
        .unwrap();
    let diag = owner.diagnostics().unwrap();
    assert_eq!(diag.forward_fallback, ForwardFallback::None);
    assert!(diag.warnings.is_empty());
}
