use crate::{BoneData, BoneTransform, Pose, SkeletonData, local_matrix};
use glam::{Mat4, Quat, Vec3};
use std::sync::Arc;

fn assert_mat_approx(actual: &Mat4, expected: &Mat4) {
    for (a, e) in actual.to_cols_array().iter().zip(expected.to_cols_array()) {
        assert!((a - e).abs() <= 1.0e-5, "expected {expected}, got {actual}");
    }
}

fn chain() -> Arc<SkeletonData> {
    let mut root = BoneData::new("root", None);
    root.position = Vec3::new(0.0, 1.0, 0.0);
    root.rotation = Quat::from_rotation_y(0.5);

    let mut mid = BoneData::new("mid", Some(0));
    mid.position = Vec3::new(0.0, 2.0, 0.0);
    mid.rotation = Quat::from_rotation_z(0.25);
    mid.scale = Vec3::splat(1.5);

    let mut tip = BoneData::new("tip", Some(1));
    tip.position = Vec3::new(1.0, 0.0, 0.0);

    SkeletonData::new("chain", vec![root, mid, tip]).expect("skeleton")
}

#[test]
fn local_matrix_is_translate_rotate_scale() {
    let transform = BoneTransform {
        position: Vec3::new(1.0, 2.0, 3.0),
        rotation: Quat::from_rotation_x(0.4),
        scale: Vec3::new(2.0, 1.0, 0.5),
    };
    let expected = Mat4::from_scale_rotation_translation(
        transform.scale,
        transform.rotation,
        transform.position,
    );
    assert_mat_approx(&local_matrix(&transform), &expected);
}

#[test]
fn tip_world_matrix_composes_the_chain() {
    let skeleton = chain();
    let pose = Pose::bind(&skeleton);
    let bones = skeleton.bones();

    let root = bones[0].local_matrix();
    let mid = bones[1].local_matrix();
    let tip = bones[2].local_matrix();

    let world = pose.world_matrices();
    assert_mat_approx(&world[0], &root);
    assert_mat_approx(&world[2], &(root * mid * tip));
}

#[test]
fn bind_pose_skinning_is_identity_with_matching_inverse_bind() {
    let skeleton = chain();
    let world = Pose::bind(&skeleton).world_matrices().to_vec();

    let bones = skeleton
        .bones()
        .iter()
        .zip(&world)
        .map(|(bone, world)| {
            let mut bone = bone.clone();
            bone.inverse_bind = world.inverse();
            bone
        })
        .collect();
    let skinned = SkeletonData::new("skinned", bones).expect("skeleton");

    for matrix in Pose::bind(&skinned).skinning_matrices() {
        assert_mat_approx(matrix, &Mat4::IDENTITY);
    }
}

#[test]
fn moving_a_parent_moves_its_children() {
    let skeleton = chain();
    let mut pose = Pose::bind(&skeleton);
    let before = pose.world_matrices()[2].w_axis;

    pose.locals[0].position += Vec3::new(5.0, 0.0, 0.0);
    pose.update_world_transforms(&skeleton);

    let after = pose.world_matrices()[2].w_axis;
    assert!((after.x - before.x - 5.0).abs() < 1.0e-5);
    assert!((after.y - before.y).abs() < 1.0e-5);
}
