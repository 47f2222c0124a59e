use crate::{
    CharacterAnim as A, CharacterStateKind, ClipChange, ClipRule, ClipTable, Condition as C,
    Controller, InputSnapshot, LedgeHit, RootMotionMode, RuleInputs, find_ledge,
};
use glam::{Quat, Vec3};

pub const LOCOMOTION_CLIPS: ClipTable = ClipTable {
    rules: &[
        ClipRule::new(A::Idle, C::Run, ClipChange::cut(A::RunStart, false)),
        ClipRule::new(A::Idle, C::Walk, ClipChange::cut(A::WalkStart, false)),
        ClipRule::new(A::WalkStart, C::Ending, ClipChange::fade(A::Walk, 3.0, true)),
        ClipRule::new(A::WalkStart, C::Idle, ClipChange::fade(A::Idle, 3.0, true)),
        ClipRule::new(A::WalkStart, C::Run, ClipChange::fade(A::RunStart, 3.0, false)),
        ClipRule::new(A::Walk, C::Idle, ClipChange::fade(A::Idle, 3.0, true)),
        ClipRule::new(A::Walk, C::Jump, ClipChange::fade(A::RunToJumpL, 3.0, false)),
        ClipRule::new(A::RunStart, C::Ending, ClipChange::fade(A::Run, 3.0, true)),
        ClipRule::new(A::RunStart, C::Idle, ClipChange::fade(A::Idle, 3.0, true)),
        ClipRule::new(A::Run, C::Idle, ClipChange::fade(A::Idle, 3.0, true)),
        ClipRule::new(A::Run, C::Jump, ClipChange::fade(A::RunToJumpL, 3.0, false)),
        // Landing.
        ClipRule::new(A::RunJumpL, C::Run, ClipChange::fade(A::FallToRun, 1.0, false)),
        ClipRule::new(A::RunJumpL, C::Always, ClipChange::cut(A::Idle, true)),
        ClipRule::new(A::RunJumpR, C::Run, ClipChange::fade(A::FallToRun, 1.0, false)),
        ClipRule::new(A::RunJumpR, C::Always, ClipChange::cut(A::Idle, true)),
        ClipRule::new(A::JumpToFall, C::Run, ClipChange::fade(A::FallToRun, 1.0, false)),
        ClipRule::new(A::JumpToFall, C::Always, ClipChange::cut(A::Idle, true)),
        ClipRule::new(A::Fall, C::Run, ClipChange::fade(A::FallToRun, 1.0, false)),
        ClipRule::new(A::Fall, C::Always, ClipChange::cut(A::Idle, true)),
        ClipRule::new(A::FallToRun, C::Ending, ClipChange::fade(A::Run, 3.0, true)),
        ClipRule::new(A::ClimbUp, C::TimeLeftBelow(1.0), ClipChange::cut(A::Idle, true)),
    ],
    holds: &[A::RunToJumpL, A::RunToJumpR],
    fallback: ClipChange::cut(A::Idle, true),
};

/// Standing, walking and running on the ground.
#[derive(Clone, Debug, Default)]
pub struct LocomotionState {
    move_input: Vec3,
    desired_velocity: Vec3,
    wants_jump: bool,
    jump_ledge: Option<LedgeHit>,
}

impl LocomotionState {
    pub fn begin(&mut self, _controller: &mut Controller<'_>) {
        *self = Self::default();
    }

    pub fn exit(&mut self, _controller: &mut Controller<'_>) {}

    pub fn pre_physics(&mut self, _controller: &mut Controller<'_>, _delta_time: f32) {}

    pub fn pre_animation(
        &mut self,
        controller: &mut Controller<'_>,
        input: &InputSnapshot,
        _delta_time: f32,
    ) {
        let config = &controller.config().locomotion;

        let mut move_input = Vec3::new(input.movement.x, 0.0, -input.movement.y);
        if input.walk {
            move_input *= 0.5 * (config.walk_threshold + config.run_threshold);
        }

        let mut target = move_input;
        if target.length() > 1.0 {
            target = target.normalize();
        }
        target *= if input.walk {
            config.walk_speed
        } else {
            config.run_speed
        };

        self.move_input = move_input;
        self.desired_velocity = Quat::from_rotation_y(controller.camera_yaw()) * target;
        self.wants_jump = input.jump;
    }

    pub fn update_animation(&mut self, controller: &mut Controller<'_>, _delta_time: f32) {
        let inputs = self.rule_inputs(controller);
        LOCOMOTION_CLIPS.apply(controller, &inputs);
    }

    pub(crate) fn rule_inputs(&self, controller: &Controller<'_>) -> RuleInputs {
        let config = &controller.config().locomotion;
        let speed = self.move_input.length();
        let run = speed > config.run_threshold;
        RuleInputs {
            time_left: controller.anim_time_left(),
            ending_frames: config.ending_frames,
            run,
            walk: !run && speed > config.walk_threshold,
            jump: self.wants_jump,
            ..RuleInputs::default()
        }
    }

    pub fn post_animation(&mut self, controller: &mut Controller<'_>, delta_time: f32) {
        let turning = matches!(controller.current_anim(), A::RunTurnL | A::RunTurnR);
        if !turning && self.desired_velocity.length() > 0.01 {
            let direction = self.desired_velocity;
            let target = Quat::from_rotation_y((-direction.x).atan2(-direction.z));
            let rate = (delta_time * controller.config().locomotion.turn_rate).min(1.0);
            let rotation = controller.rotation().slerp(target, rate);
            controller.set_rotation(rotation);
        }

        let mut velocity = self.desired_velocity;
        let root_driven = controller.root_motion_mode() != RootMotionMode::Off
            && controller.clip_has_root_motion();
        if root_driven && delta_time > 0.0 {
            // Clip space is Z-up with +Y forward.
            let root = controller.root_delta() / delta_time;
            velocity = controller.rotation() * Vec3::new(root.x, 0.0, -root.y);
        }
        velocity.y = -controller.config().gravity * delta_time;
        controller.set_velocity(velocity);
    }

    pub fn post_physics(&mut self, controller: &mut Controller<'_>, _delta_time: f32) {
        if !self.taking_off(controller) {
            return;
        }
        let hit = find_ledge(
            controller.physics(),
            controller.position(),
            controller.forward(),
            &controller.config().ledge_probe,
        );
        if hit.is_some() {
            self.jump_ledge = hit;
        }
    }

    pub fn should_transition(
        &mut self,
        controller: &mut Controller<'_>,
    ) -> Option<CharacterStateKind> {
        if self.taking_off(controller) {
            let mut velocity = controller.velocity();
            velocity.y = controller.config().locomotion.jump_velocity;
            controller.set_velocity(velocity);
            return Some(CharacterStateKind::Air);
        }
        if !controller.is_grounded() && controller.current_anim() != A::ClimbUp {
            let _ = controller.set_animation(A::Fall, 3.0, true);
            return Some(CharacterStateKind::Air);
        }
        None
    }

    fn taking_off(&self, controller: &Controller<'_>) -> bool {
        controller.current_anim() == A::RunToJumpL
            && controller.anim_time_left() < controller.config().locomotion.ending_frames
    }

    pub fn desired_velocity(&self) -> Vec3 {
        self.desired_velocity
    }

    /// Ledge found ahead during the jump take-off, if any.
    pub fn jump_ledge(&self) -> Option<LedgeHit> {
        self.jump_ledge
    }
}
