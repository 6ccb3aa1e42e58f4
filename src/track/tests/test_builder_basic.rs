use crate::geom::{Point3, Tolerance, Vec3};
use crate::track::{
    ForwardFallback, SurfaceFrame, TrackExtent, TrackOptions, WaypointKind, build_track,
};

fn tol() -> Tolerance {
    Tolerance::new(1e-9)
}

fn flat_frame() -> SurfaceFrame {
    SurfaceFrame::new(Point3::ORIGIN, Vec3::Y, Vec3::Z)
}

#[test]
fn one_by_point_six_table_layout() {
    let (layout, diag) =
        build_track(&flat_frame(), TrackExtent::new(1.0, 0.6), &TrackOptions::default()).unwrap();

    assert_eq!(diag.edge_segment_counts, [4, 2, 4, 2]);
    assert!(tol().approx_eq_f64(diag.edge_usable_lengths[0], 0.7));
    assert!(tol().approx_eq_f64(diag.edge_usable_lengths[1], 0.38));
    assert_eq!(diag.edge_waypoint_count, 16);
    assert_eq!(diag.corner_blend_waypoint_count, 12);
    assert_eq!(layout.waypoints.len(), 28);
    assert_eq!(layout.road_segments.len(), 12);
    assert_eq!(layout.corner_pieces.len(), 4);
    assert!(diag.is_clean());

    let first_edge: Vec<_> = layout
        .waypoints
        .iter()
        .filter(|wp| matches!(wp.kind, WaypointKind::Edge { edge: 0, .. }))
        .collect();
    assert_eq!(first_edge.len(), 5);
    assert!(tol().approx_eq_point3(first_edge[0].position, Point3::new(-0.35, 0.03, -0.24)));
    assert!(tol().approx_eq_point3(first_edge[4].position, Point3::new(0.35, 0.03, -0.24)));
}

#[test]
fn corners_form_a_rectangle_on_tilted_surfaces() {
    let frame = SurfaceFrame::new(
        Point3::new(1.0, 0.5, -2.0),
        Vec3::new(0.2, 1.0, 0.3),
        Vec3::new(0.4, 0.0, 1.0),
    );
    let (layout, _) = build_track(&frame, TrackExtent::new(0.9, 1.3), &TrackOptions::default()).unwrap();
    let c = layout.corners;
    let e0 = c[1] - c[0];
    let e1 = c[2] - c[1];
    let e2 = c[3] - c[2];
    let e3 = c[0] - c[3];

    assert!(tol().approx_eq_f64(e0.length(), e2.length()));
    assert!(tol().approx_eq_f64(e1.length(), e3.length()));
    assert!(tol().approx_eq_f64(e0.dot(e1), 0.0));
    assert!(tol().approx_eq_f64(e1.dot(e2), 0.0));
    assert!(tol().approx_eq_f64(e0.length(), 0.9 * 0.8));
    assert!(tol().approx_eq_f64(e1.length(), 1.3 * 0.8));
}

#[test]
fn waypoints_follow_traversal_order() {
    let (layout, _) = build_track(&flat_frame(), TrackExtent::new(1.0, 0.6), &TrackOptions::default()).unwrap();
    let mut expected = Vec::new();
    for (edge, count) in [4usize, 2, 4, 2].into_iter().enumerate() {
        for slot in 0..=count {
            expected.push(WaypointKind::Edge { edge, slot });
        }
        for step in 1..=3 {
            expected.push(WaypointKind::CornerBlend {
                corner: (edge + 1) % 4,
                step,
            });
        }
    }
    let kinds: Vec<_> = layout.waypoints.iter().map(|wp| wp.kind).collect();
    assert_eq!(kinds, expected);
    for (i, wp) in layout.waypoints.iter().enumerate() {
        assert_eq!(wp.index, i);
    }
    assert_eq!(layout.waypoints.last().map(|wp| wp.label()).as_deref(), Some("CornerCurveWP_0_3"));
    assert_eq!(layout.next_waypoint(27).map(|wp| wp.index), Some(0));
}

#[test]
fn corner_blend_bends_toward_offset_control_point() {
    let (layout, _) = build_track(&flat_frame(), TrackExtent::new(1.0, 0.6), &TrackOptions::default()).unwrap();
    let mid = layout
        .waypoints
        .iter()
        .find(|wp| wp.kind == WaypointKind::CornerBlend { corner: 1, step: 2 })
        .unwrap();
    // A = (0.35, _, -0.24), P = c1 + right * 0.05 = (0.45, _, -0.24), B = (0.4, _, -0.19)
    assert!(tol().approx_eq_point3(mid.position, Point3::new(0.4125, 0.03, -0.2275)));
}

#[test]
fn zero_corner_subdivisions_concatenates_edges() {
    let options = TrackOptions {
        corner_subdivisions: 0,
        ..TrackOptions::default()
    };
    let (layout, diag) = build_track(&flat_frame(), TrackExtent::new(1.0, 0.6), &options).unwrap();
    assert_eq!(diag.corner_blend_waypoint_count, 0);
    assert!(layout.waypoints.iter().all(|wp| !wp.is_corner_blend()));
    assert_eq!(layout.waypoints.len(), 16);
}

#[test]
fn waypoint_count_grows_with_edge_length() {
    let options = TrackOptions::default();
    let mut last = 0;
    for step in 1..=30 {
        let width = f64::from(step) * 0.1;
        let (layout, _) = build_track(&flat_frame(), TrackExtent::new(width, 0.6), &options).unwrap();
        let count = layout.waypoints.len();
        assert!(count >= last, "width {width}: {count} < {last}");
        last = count;
    }
}

#[test]
fn every_edge_has_at_least_one_segment() {
    let (layout, diag) = build_track(&flat_frame(), TrackExtent::new(0.1, 0.1), &TrackOptions::default()).unwrap();
    assert_eq!(diag.edge_segment_counts, [1, 1, 1, 1]);
    assert_eq!(diag.edge_usable_lengths, [0.0; 4]);
    assert_eq!(layout.road_segments.len(), 4);
    assert!(layout.road_segments.iter().all(|seg| seg.length == 0.0));
    assert!(!diag.warnings.is_empty());
}

#[test]
fn road_segments_stay_on_their_edge() {
    let (layout, _) = build_track(&flat_frame(), TrackExtent::new(1.0, 0.6), &TrackOptions::default()).unwrap();
    let first = layout.road_segments[0];
    assert_eq!(first.edge, 0);
    assert!(tol().approx_eq_f64(first.length, 0.175 * 0.9));
    assert!(tol().approx_eq_vec3(first.orientation.z_axis, Vec3::X));
    assert!(tol().approx_eq_vec3(first.orientation.y_axis, Vec3::Y));
    assert_eq!(first.scale(), Vec3::new(0.2, 0.02, first.length));

    let per_edge: Vec<usize> = (0..4)
        .map(|edge| layout.road_segments.iter().filter(|seg| seg.edge == edge).count())
        .collect();
    assert_eq!(per_edge, vec![4, 2, 4, 2]);
}

#[test]
fn corner_pieces_face_next_corner_plus_yaw() {
    let (layout, _) = build_track(&flat_frame(), TrackExtent::new(1.0, 0.6), &TrackOptions::default()).unwrap();
    let piece = layout.corner_pieces[0];
    assert_eq!(piece.position, layout.corners[0]);
    assert!(tol().approx_eq_vec3(piece.orientation.z_axis, Vec3::new(0.0, 0.0, -1.0)));
    assert_eq!(piece.scale, Vec3::new(1.0, 1.0, 1.0));
}

#[test]
fn final_frame_is_yawed_placement_frame() {
    let (layout, _) = build_track(&flat_frame(), TrackExtent::new(1.0, 0.6), &TrackOptions::default()).unwrap();
    assert!(tol().approx_eq_point3(layout.frame.origin, Point3::new(0.0, 0.03, 0.0)));
    assert!(tol().approx_eq_vec3(layout.frame.z_axis, Vec3::new(0.0, 0.0, -1.0)));
    assert!(tol().approx_eq_vec3(layout.frame.y_axis, Vec3::Y));
}

#[test]
fn forward_parallel_to_up_falls_back() {
    let frame = SurfaceFrame::new(Point3::ORIGIN, Vec3::Y, Vec3::Y);
    let (layout, diag) = build_track(&frame, TrackExtent::default(), &TrackOptions::default()).unwrap();
    assert_eq!(diag.forward_fallback, ForwardFallback::CrossWorldX);
    assert!(!diag.is_clean());
    // forward = Y × X = -Z, so edge 1 runs toward -Z.
    let c = layout.corners;
    assert!(c[2].z < c[1].z);

    let frame = SurfaceFrame::new(Point3::ORIGIN, Vec3::X, Vec3::X);
    let (_, diag) = build_track(&frame, TrackExtent::default(), &TrackOptions::default()).unwrap();
    assert_eq!(diag.forward_fallback, ForwardFallback::CrossWorldZ);
}

#[test]
fn identical_inputs_give_identical_layouts() {
    let frame = SurfaceFrame::new(
        Point3::new(0.3, 0.72, -1.1),
        Vec3::new(0.0, 1.0, 0.05),
        Vec3::new(0.7, 0.0, 0.7),
    );
    let extent = TrackExtent::new(1.2, 0.7);
    let options = TrackOptions::default();
    let (a, da) = build_track(&frame, extent, &options).unwrap();
    let (b, db) = build_track(&frame, extent, &options).unwrap();
    assert_eq!(a, b);
    assert_eq!(da, db);
}
