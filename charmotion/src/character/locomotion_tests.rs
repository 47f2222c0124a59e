use super::test_world::{TestWorld, character, single_bone_skeleton, still_animations};
use crate::{
    AnimationClip, BoneTrack, CharacterAnim, CharacterData, CharacterStateKind,
    CharacterStateMachine, Controller, InputSnapshot, Keyframe, RootMotionMode,
};
use glam::{Vec2, Vec3};
use std::sync::Arc;

const DT: f32 = 1.0 / 30.0;

fn assert_approx(a: f32, b: f32, eps: f32, ctx: &str) {
    if (a - b).abs() > eps {
        panic!("{ctx}: expected {b}, got {a} (diff {})", (a - b).abs());
    }
}

fn grounded() -> (CharacterStateMachine, CharacterData, TestWorld) {
    let mut data = character(30.0);
    let mut world = TestWorld::new().with_floor(0.0);
    let mut machine = CharacterStateMachine::new();
    machine.start(&mut data, &mut world);
    (machine, data, world)
}

fn forward_input(magnitude: f32) -> InputSnapshot {
    InputSnapshot::moving(Vec2::new(0.0, magnitude))
}

#[test]
fn small_input_keeps_idling() {
    let (mut machine, mut data, mut world) = grounded();
    machine.update(&mut data, &mut world, &forward_input(0.05), DT);
    assert_eq!(data.current_anim, CharacterAnim::Idle);
    assert_eq!(machine.kind(), CharacterStateKind::Locomotion);
}

#[test]
fn medium_input_starts_walking() {
    let (mut machine, mut data, mut world) = grounded();
    machine.update(&mut data, &mut world, &forward_input(0.5), DT);
    assert_eq!(data.current_anim, CharacterAnim::WalkStart);
}

#[test]
fn large_input_starts_running() {
    let (mut machine, mut data, mut world) = grounded();
    machine.update(&mut data, &mut world, &forward_input(0.9), DT);
    assert_eq!(data.current_anim, CharacterAnim::RunStart);
}

#[test]
fn walk_modifier_caps_input_below_run() {
    let (mut machine, mut data, mut world) = grounded();
    let input = InputSnapshot {
        walk: true,
        ..forward_input(1.0)
    };
    machine.update(&mut data, &mut world, &input, DT);
    assert_eq!(data.current_anim, CharacterAnim::WalkStart);
}

#[test]
fn run_start_settles_into_run() {
    let (mut machine, mut data, mut world) = grounded();
    for _ in 0..40 {
        machine.update(&mut data, &mut world, &forward_input(1.0), DT);
    }
    assert_eq!(data.current_anim, CharacterAnim::Run);
    assert!(data.player.is_looping());
}

#[test]
fn input_velocity_is_used_without_root_motion() {
    let (mut machine, mut data, mut world) = grounded();
    data.player.set_root_motion_mode(RootMotionMode::Off);

    let input = InputSnapshot::moving(Vec2::new(1.0, 0.0));
    machine.update(&mut data, &mut world, &input, DT);

    assert_approx(world.last_velocity.x, 3.5, 1e-4, "velocity.x");
    assert_approx(world.last_velocity.y, -9.8 * DT, 1e-4, "velocity.y");

    // One frame at the default turn rate is a full turn toward the input.
    let forward = data.rotation * Vec3::NEG_Z;
    assert_approx(forward.x, 1.0, 1e-3, "forward.x");
    assert_approx(forward.z, 0.0, 1e-3, "forward.z");
}

#[test]
fn clips_without_root_motion_use_input_velocity() {
    let (mut machine, mut data, mut world) = grounded();
    assert_eq!(data.player.root_motion_mode(), RootMotionMode::PositionOnly);

    machine.update(&mut data, &mut world, &forward_input(1.0), DT);
    assert_approx(world.last_velocity.z, -3.5, 1e-4, "velocity.z");
}

#[test]
fn root_motion_clips_drive_velocity() {
    // Run start carries the root 3 units along clip-space +Y over one second.
    let track = BoneTrack {
        positions: vec![
            Keyframe::new(0.0, Vec3::ZERO),
            Keyframe::new(30.0, Vec3::new(0.0, 3.0, 0.0)),
        ],
        ..BoneTrack::default()
    };
    let mut clip = AnimationClip::new("RunStart", 30.0, vec![track]);
    clip.root_motion = true;
    let mut animations = still_animations(30.0);
    animations.bind(CharacterAnim::RunStart, Arc::new(clip));

    let mut data = CharacterData::new(single_bone_skeleton(), animations);
    let mut world = TestWorld::new().with_floor(0.0);
    let mut machine = CharacterStateMachine::new();
    machine.start(&mut data, &mut world);

    machine.update(&mut data, &mut world, &forward_input(1.0), DT);
    assert_eq!(data.current_anim, CharacterAnim::RunStart);
    assert_approx(world.last_velocity.z, -3.0, 1e-3, "velocity.z");
    assert_approx(world.last_velocity.x, 0.0, 1e-4, "velocity.x");
    assert_approx(world.last_velocity.y, -9.8 * DT, 1e-4, "velocity.y");
}

#[test]
fn camera_yaw_rotates_input() {
    let (mut machine, mut data, mut world) = grounded();
    data.player.set_root_motion_mode(RootMotionMode::Off);
    data.camera_yaw = std::f32::consts::FRAC_PI_2;

    machine.update(&mut data, &mut world, &forward_input(1.0), DT);

    // Forward is -Z; a quarter turn about +Y maps it to -X.
    assert_approx(world.last_velocity.x, -3.5, 1e-3, "velocity.x");
    assert_approx(world.last_velocity.z, 0.0, 1e-3, "velocity.z");
}

#[test]
fn jump_takes_off_into_air() {
    let (mut machine, mut data, mut world) = grounded();
    Controller::new(&mut data, &mut world)
        .set_animation(CharacterAnim::Run, 0.0, true)
        .expect("run");

    let input = InputSnapshot {
        jump: true,
        ..forward_input(1.0)
    };
    machine.update(&mut data, &mut world, &input, DT);
    assert_eq!(data.current_anim, CharacterAnim::RunToJumpL);

    let mut frames = 0;
    while machine.kind() == CharacterStateKind::Locomotion && frames < 60 {
        machine.update(&mut data, &mut world, &input, DT);
        frames += 1;
    }
    assert_eq!(machine.kind(), CharacterStateKind::Air);
    assert_approx(world.last_velocity.y, 6.0 - 9.8 * DT, 1e-4, "take-off velocity");
}

#[test]
fn walking_off_an_edge_falls() {
    let mut data = character(30.0);
    let mut world = TestWorld::new();
    let mut machine = CharacterStateMachine::new();

    machine.update(&mut data, &mut world, &InputSnapshot::default(), DT);

    assert_eq!(machine.kind(), CharacterStateKind::Air);
    assert_eq!(data.current_anim, CharacterAnim::Fall);
}
