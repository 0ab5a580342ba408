use super::*;

#[test]
fn lerp_endpoints() {
    assert_eq!(lerp_f64(2.0, 6.0, 0.0), 2.0);
    assert_eq!(lerp_f64(2.0, 6.0, 1.0), 6.0);
    assert_eq!(lerp_f64(2.0, 6.0, 0.5), 4.0);
}

#[test]
fn yaw_rotates_forward_axis_towards_left() {
    let q = rotation_from_euler_deg(90.0, 0.0, 0.0);
    let fwd = q * DVec3::X;
    assert!((fwd - DVec3::Y).length() < 1e-9);
}

#[test]
fn transform_lerp_midpoint() {
    let a = (DVec3::ZERO, DQuat::IDENTITY);
    let b = (DVec3::new(10.0, 0.0, 0.0), rotation_from_euler_deg(90.0, 0.0, 0.0));
    let (p, q) = lerp_transform(a, b, 0.5);
    assert!((p.x - 5.0).abs() < 1e-9);
    let expected = rotation_from_euler_deg(45.0, 0.0, 0.0);
    assert!(q.angle_between(expected) < 1e-9);
}

#[test]
fn flip_threshold() {
    assert!(!flips_at(0.49));
    assert!(flips_at(0.5));
}
