use super::test_world::{LedgeBlock, TestWorld, character};
use crate::{
    AirState, CharacterAnim, CharacterStateKind, CharacterStateMachine, ClimbState, Controller,
    GroundState, InputSnapshot, LocomotionState, RootMotionMode, StateEvent,
};
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;

const DT: f32 = 1.0 / 30.0;

fn assert_vec_approx(a: Vec3, b: Vec3, ctx: &str) {
    if (a - b).length() > 1e-3 {
        panic!("{ctx}: expected {b}, got {a}");
    }
}

#[test]
fn states_do_not_transition_by_default() {
    let mut data = character(30.0);
    let mut world = TestWorld::new().with_floor(0.0);
    let mut controller = Controller::new(&mut data, &mut world);
    controller
        .set_animation(CharacterAnim::Idle, 0.0, true)
        .expect("idle");
    assert_eq!(
        LocomotionState::default().should_transition(&mut controller),
        None
    );

    controller
        .set_animation(CharacterAnim::HangLoop, 0.0, true)
        .expect("hang");
    assert_eq!(ClimbState::default().should_transition(&mut controller), None);

    controller.set_velocity(Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(AirState::default().should_transition(&mut controller), None);
}

#[test]
fn begin_and_exit_fire_once_per_activation() {
    let mut data = character(30.0);
    let mut world = TestWorld::new();
    let mut machine = CharacterStateMachine::new();

    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    machine.set_listener(move |state: CharacterStateKind, event: StateEvent| {
        sink.borrow_mut().push((state, event))
    });

    // No ground: locomotion hands over to air on the first frame.
    machine.update(&mut data, &mut world, &InputSnapshot::default(), DT);
    machine.update(&mut data, &mut world, &InputSnapshot::default(), DT);
    assert_eq!(machine.kind(), CharacterStateKind::Air);

    // Land.
    world.floor = Some(0.0);
    world.ground_state = GroundState::OnGround;
    machine.update(&mut data, &mut world, &InputSnapshot::default(), DT);
    assert_eq!(machine.kind(), CharacterStateKind::Locomotion);
    assert_eq!(data.current_anim, CharacterAnim::Idle);

    use CharacterStateKind::{Air, Locomotion};
    assert_eq!(
        *log.borrow(),
        vec![
            (Locomotion, StateEvent::Begin),
            (Locomotion, StateEvent::Exit),
            (Air, StateEvent::Begin),
            (Air, StateEvent::Exit),
            (Locomotion, StateEvent::Begin),
        ]
    );
}

#[test]
fn reaching_grabs_ledge_and_climbs_up() {
    let mut data = character(30.0);
    data.position = Vec3::new(0.0, 0.1, 0.0);
    let mut world = TestWorld::new().with_block(LedgeBlock::flat(-1.0, 2.0));
    world.position = data.position;
    let mut machine = CharacterStateMachine::new();

    let reach = InputSnapshot {
        reach: true,
        ..InputSnapshot::default()
    };
    machine.update(&mut data, &mut world, &reach, DT);
    assert_eq!(machine.kind(), CharacterStateKind::Air);
    assert_vec_approx(world.shape_offset, Vec3::new(0.0, 0.0, -0.25), "reach offset");

    machine.update(&mut data, &mut world, &reach, DT);
    assert_eq!(machine.kind(), CharacterStateKind::Climb);
    assert_eq!(data.current_anim, CharacterAnim::GrabWall);
    assert!(!world.collides_with_world);
    assert_vec_approx(world.shape_offset, Vec3::ZERO, "collider offset");
    assert_vec_approx(data.position, Vec3::new(0.0, -0.1, -0.875), "hang position");
    assert_eq!(data.player.root_motion_mode(), RootMotionMode::On);

    let climb = InputSnapshot {
        climb_up: true,
        ..InputSnapshot::default()
    };
    let mut saw_climb_up = false;
    let mut frames = 0;
    while machine.kind() == CharacterStateKind::Climb && frames < 200 {
        machine.update(&mut data, &mut world, &climb, DT);
        saw_climb_up |= data.current_anim == CharacterAnim::ClimbUp;
        frames += 1;
    }
    assert!(saw_climb_up);
    assert_eq!(machine.kind(), CharacterStateKind::Locomotion);
    assert!(world.collides_with_world);
    assert_eq!(data.player.root_motion_mode(), RootMotionMode::PositionOnly);
}

#[test]
fn reaching_sweeps_for_ledges_above_the_fixed_reach_height() {
    // The lip is too high for a single ray pair cast from 1.9 m but inside the height sweep.
    for sweep in [true, false] {
        let mut data = character(30.0);
        data.config.air.sweep_reach = sweep;
        data.position = Vec3::new(0.0, 0.1, 0.0);
        let mut world = TestWorld::new().with_block(LedgeBlock::flat(-0.5, 2.6));
        world.position = data.position;
        let mut machine = CharacterStateMachine::new();

        let reach = InputSnapshot {
            reach: true,
            ..InputSnapshot::default()
        };
        machine.update(&mut data, &mut world, &reach, DT);
        machine.update(&mut data, &mut world, &reach, DT);

        if sweep {
            assert_eq!(machine.kind(), CharacterStateKind::Climb);
            assert_vec_approx(data.position, Vec3::new(0.0, 0.5, -0.375), "hang position");
        } else {
            assert_eq!(machine.kind(), CharacterStateKind::Air);
            assert!(world.collides_with_world);
        }
    }
}

#[test]
fn missing_clip_keeps_current_animation() {
    let mut data = character(30.0);
    data.animations = crate::AnimationSet::new();
    let mut world = TestWorld::new().with_floor(0.0);
    let mut controller = Controller::new(&mut data, &mut world);

    let err = controller
        .set_animation(CharacterAnim::Run, 3.0, true)
        .unwrap_err();
    assert!(matches!(err, crate::Error::MissingAnimation { .. }));
    assert_eq!(controller.current_anim(), CharacterAnim::Idle);
}

#[test]
fn collision_events_toggle_world_collision() {
    use crate::{AnimEvent, AnimationClip, BoneTrack, EventKey};
    use std::sync::Arc;

    let mut data = character(30.0);
    let mut clip = AnimationClip::new("vault", 30.0, vec![BoneTrack::default()]);
    clip.events = vec![
        EventKey {
            time: 2.0,
            event: AnimEvent::CollisionOff,
        },
        EventKey {
            time: 10.0,
            event: AnimEvent::CollisionOn,
        },
    ];
    data.animations.bind(CharacterAnim::Idle, Arc::new(clip));

    let mut world = TestWorld::new().with_floor(0.0);
    let mut machine = CharacterStateMachine::new();
    for _ in 0..5 {
        machine.update(&mut data, &mut world, &InputSnapshot::default(), DT);
    }
    assert!(!world.collides_with_world);
    for _ in 0..10 {
        machine.update(&mut data, &mut world, &InputSnapshot::default(), DT);
    }
    assert!(world.collides_with_world);
}
