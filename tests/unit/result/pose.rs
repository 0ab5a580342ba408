use super::*;

#[test]
fn setters_mark_changed_fields() {
    let mut pose = CameraPose::default();
    assert!(pose.changed().is_empty());
    pose.set_position(DVec3::new(1.0, 2.0, 3.0));
    pose.set_field_of_view(60.0);
    assert!(pose.changed().contains(PoseFields::POSITION));
    assert!(pose.changed().contains(PoseFields::FIELD_OF_VIEW));
    assert!(!pose.changed().contains(PoseFields::ROTATION));

    pose.clear_changed();
    assert!(pose.changed().is_empty());
    assert_eq!(pose.position(), DVec3::new(1.0, 2.0, 3.0));
}

#[test]
fn override_changed_skips_untouched_fields() {
    let mut base = CameraPose::default();
    base.set_field_of_view(50.0);
    base.set_position(DVec3::X);

    let mut over = CameraPose::default();
    over.set_position(DVec3::new(0.0, 5.0, 0.0));

    base.override_changed(&over);
    assert_eq!(base.position(), DVec3::new(0.0, 5.0, 0.0));
    assert_eq!(base.field_of_view(), 50.0);
}

#[test]
fn lerp_halfway() {
    let mut a = CameraPose::default();
    a.set_field_of_view(60.0);
    let mut b = CameraPose::default();
    b.set_field_of_view(90.0);
    b.set_position(DVec3::new(10.0, 0.0, 0.0));

    a.lerp(&b, 0.5);
    assert!((a.field_of_view() - 75.0).abs() < 1e-9);
    assert!((a.position().x - 5.0).abs() < 1e-9);
    assert!(a.changed().contains(PoseFields::POSITION | PoseFields::FIELD_OF_VIEW));
}

#[test]
fn lerp_at_zero_is_a_no_op() {
    let mut a = CameraPose::default();
    let mut b = CameraPose::default();
    b.set_position(DVec3::ONE);
    a.lerp(&b, 0.0);
    assert_eq!(a.position(), DVec3::ZERO);
    assert!(a.changed().is_empty());
}

#[test]
fn changed_fields_travel_with_the_serialized_pose() {
    let mut pose = CameraPose::default();
    pose.set_rotation(DQuat::from_rotation_y(0.5));
    pose.set_near_clip_plane(2.0);

    let json = serde_json::to_string(&pose).unwrap();
    let back: CameraPose = serde_json::from_str(&json).unwrap();
    assert_eq!(back.changed(), PoseFields::ROTATION | PoseFields::NEAR_CLIP);
    assert_eq!(back.near_clip_plane(), 2.0);
}
