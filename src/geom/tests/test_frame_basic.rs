use crate::geom::{Frame, Point3, Tolerance, Vec3};

fn close(a: Vec3, b: Vec3) -> bool {
    Tolerance::new(1e-9).approx_eq_vec3(a, b)
}

#[test]
fn looking_along_right_puts_backward_on_local_x() {
    // forward +Z, right +X: local X becomes -forward.
    let frame = Frame::look_rotation(Point3::ORIGIN, Vec3::X, Vec3::Y).unwrap();
    assert!(close(frame.x_axis, Vec3::new(0.0, 0.0, -1.0)));
    assert!(close(frame.y_axis, Vec3::Y));
    assert!(close(frame.z_axis, Vec3::X));
    assert!(frame.is_orthonormal(Tolerance::new(1e-12)));
}

#[test]
fn yaw_of_ninety_turns_right_facing_frame_back_to_forward() {
    let frame = Frame::look_rotation(Point3::ORIGIN, Vec3::X, Vec3::Y)
        .unwrap()
        .rotated_about_local_y(90.0);
    assert!(close(frame.z_axis, Vec3::new(0.0, 0.0, -1.0)));
    assert!(close(frame.x_axis, Vec3::new(-1.0, 0.0, 0.0)));
    assert!(close(frame.y_axis, Vec3::Y));
}

#[test]
fn tilted_up_stays_orthonormal() {
    let up = Vec3::new(0.2, 1.0, -0.1);
    let frame = Frame::look_rotation(Point3::new(1.0, 2.0, 3.0), Vec3::new(0.3, 0.1, 1.0), up).unwrap();
    assert!(frame.is_orthonormal(Tolerance::new(1e-9)));
    assert!(frame.y_axis.dot(up.normalized().unwrap()) > 0.9);
}

#[test]
fn quaternion_matches_matrix_on_arbitrary_frame() {
    let frame = Frame::look_rotation(
        Point3::new(0.5, 0.0, -0.25),
        Vec3::new(-0.6, 0.2, 0.7),
        Vec3::new(0.1, 1.0, 0.3),
    )
    .unwrap()
    .rotated_about_local_y(37.0);
    let q = frame.to_quaternion();
    assert!(close(q.rotate(Vec3::X), frame.x_axis));
    assert!(close(q.rotate(Vec3::Y), frame.y_axis));
    assert!(close(q.rotate(Vec3::Z), frame.z_axis));

    let m = frame.to_matrix();
    let local = Vec3::new(0.3, -0.2, 1.1);
    let world = frame.transform_point(Point3::from_array(local.to_array()));
    let by_matrix = [
        m[0][0] * local.x + m[0][1] * local.y + m[0][2] * local.z + m[0][3],
        m[1][0] * local.x + m[1][1] * local.y + m[1][2] * local.z + m[1][3],
        m[2][0] * local.x + m[2][1] * local.y + m[2][2] * local.z + m[2][3],
    ];
    assert!(Tolerance::new(1e-12).approx_eq_point3(world, Point3::from_array(by_matrix)));
}
