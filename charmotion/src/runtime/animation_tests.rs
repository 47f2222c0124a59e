use crate::{
    BoneTrack, BoneTransform, Keyframe, sample_bone, sample_position, sample_rotation,
    sample_scale,
};
use glam::{Quat, Vec3};

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-5,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

fn assert_vec_approx(actual: Vec3, expected: Vec3) {
    assert_approx(actual.x, expected.x);
    assert_approx(actual.y, expected.y);
    assert_approx(actual.z, expected.z);
}

#[test]
fn empty_track_falls_back_to_setup() {
    let fallback = Vec3::new(1.0, 2.0, 3.0);
    assert_eq!(sample_position(&[], 4.0, fallback), fallback);
    assert_eq!(sample_rotation(&[], 4.0, Quat::IDENTITY), Quat::IDENTITY);
}

#[test]
fn single_key_is_constant() {
    let keys = [Keyframe::new(5.0, Vec3::new(1.0, -2.0, 0.5))];
    for frame in [-3.0, 0.0, 5.0, 7.5, 100.0] {
        assert_eq!(sample_position(&keys, frame, Vec3::ZERO), keys[0].value);
    }

    let rotation = Quat::from_rotation_x(0.7);
    let keys = [Keyframe::new(2.0, rotation)];
    for frame in [0.0, 2.0, 9.0] {
        assert_eq!(sample_rotation(&keys, frame, Quat::IDENTITY), rotation);
    }
}

#[test]
fn two_keys_interpolate_at_midpoint() {
    let keys = [
        Keyframe::new(0.0, Vec3::ZERO),
        Keyframe::new(10.0, Vec3::new(2.0, 4.0, -6.0)),
    ];
    assert_vec_approx(
        sample_position(&keys, 5.0, Vec3::ZERO),
        Vec3::new(1.0, 2.0, -3.0),
    );

    let scales = [
        Keyframe::new(0.0, Vec3::ONE),
        Keyframe::new(10.0, Vec3::splat(3.0)),
    ];
    assert_vec_approx(sample_scale(&scales, 5.0, Vec3::ONE), Vec3::splat(2.0));

    let rotations = [
        Keyframe::new(0.0, Quat::IDENTITY),
        Keyframe::new(10.0, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
    ];
    let mid = sample_rotation(&rotations, 5.0, Quat::IDENTITY);
    let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
    assert!(mid.angle_between(expected) < 1.0e-4, "{mid:?}");
}

#[test]
fn frames_outside_the_keys_clamp() {
    let keys = [
        Keyframe::new(2.0, Vec3::X),
        Keyframe::new(4.0, Vec3::Y),
        Keyframe::new(6.0, Vec3::Z),
    ];
    assert_vec_approx(sample_position(&keys, 0.0, Vec3::ZERO), Vec3::X);
    assert_vec_approx(sample_position(&keys, 9.0, Vec3::ZERO), Vec3::Z);
    assert_vec_approx(sample_position(&keys, 4.0, Vec3::ZERO), Vec3::Y);
    assert_vec_approx(
        sample_position(&keys, 5.0, Vec3::ZERO),
        Vec3::new(0.0, 0.5, 0.5),
    );
}

#[test]
fn coincident_keys_do_not_divide_by_zero() {
    let keys = [
        Keyframe::new(0.0, Vec3::ZERO),
        Keyframe::new(3.0, Vec3::X),
        Keyframe::new(3.0, Vec3::Y),
        Keyframe::new(6.0, Vec3::Z),
    ];
    let sampled = sample_position(&keys, 3.0, Vec3::ZERO);
    assert!(sampled.is_finite());
}

#[test]
fn bone_sampling_mixes_tracks_and_setup() {
    let setup = BoneTransform {
        position: Vec3::new(0.0, 1.0, 0.0),
        rotation: Quat::from_rotation_z(0.3),
        scale: Vec3::splat(2.0),
    };
    let track = BoneTrack {
        positions: vec![
            Keyframe::new(0.0, Vec3::ZERO),
            Keyframe::new(4.0, Vec3::new(4.0, 0.0, 0.0)),
        ],
        rotations: Vec::new(),
        scales: Vec::new(),
    };

    let sampled = sample_bone(&track, 1.0, &setup);
    assert_vec_approx(sampled.position, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(sampled.rotation, setup.rotation);
    assert_eq!(sampled.scale, setup.scale);
}
