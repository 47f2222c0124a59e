use crate::{
    CharacterAnim as A, CharacterStateKind, ClipChange, ClipRule, ClipTable, Condition as C,
    Controller, InputSnapshot, RootMotionMode, RuleInputs,
};
use glam::Vec3;

pub const CLIMB_CLIPS: ClipTable = ClipTable {
    rules: &[
        ClipRule::new(A::GrabWall, C::TimeLeftBelow(1.0), ClipChange::cut(A::HangLoop, true)),
        ClipRule::new(A::HangLoop, C::ShimmyRight, ClipChange::cut(A::ShimmyRight, true)),
        ClipRule::new(A::HangLoop, C::ShimmyLeft, ClipChange::cut(A::ShimmyLeft, true)),
        ClipRule::new(A::HangLoop, C::ClimbUp, ClipChange::cut(A::ClimbUp, false)),
        ClipRule::new(A::ShimmyLeft, C::NoLateral, ClipChange::fade(A::HangLoop, 3.0, true)),
        ClipRule::new(A::ShimmyRight, C::NoLateral, ClipChange::fade(A::HangLoop, 3.0, true)),
        ClipRule::new(A::ClimbUp, C::Ending, ClipChange::fade(A::Idle, 3.0, true)),
    ],
    holds: &[],
    fallback: ClipChange::cut(A::HangLoop, true),
};

/// Hanging from a ledge, shimmying and climbing up. Movement comes entirely from root motion.
#[derive(Clone, Debug, Default)]
pub struct ClimbState {
    lateral: f32,
    wants_climb_up: bool,
}

impl ClimbState {
    pub fn begin(&mut self, controller: &mut Controller<'_>) {
        controller.set_root_motion(RootMotionMode::On);
        self.lateral = 0.0;
        self.wants_climb_up = false;
    }

    pub fn exit(&mut self, controller: &mut Controller<'_>) {
        controller.set_root_motion(RootMotionMode::default());
    }

    pub fn pre_physics(&mut self, _controller: &mut Controller<'_>, _delta_time: f32) {}

    pub fn pre_animation(
        &mut self,
        _controller: &mut Controller<'_>,
        input: &InputSnapshot,
        _delta_time: f32,
    ) {
        self.lateral = input.movement.x;
        if input.climb_up {
            self.wants_climb_up = true;
        }
    }

    pub fn update_animation(&mut self, controller: &mut Controller<'_>, _delta_time: f32) {
        let threshold = controller.config().climb.shimmy_threshold;
        let inputs = RuleInputs {
            time_left: controller.anim_time_left(),
            ending_frames: controller.config().locomotion.ending_frames,
            shimmy_right: self.lateral > threshold,
            shimmy_left: self.lateral < -threshold,
            climb_up: self.wants_climb_up,
            ..RuleInputs::default()
        };
        CLIMB_CLIPS.apply(controller, &inputs);
    }

    pub fn post_animation(&mut self, controller: &mut Controller<'_>, delta_time: f32) {
        if delta_time <= 0.0 {
            return;
        }
        // Clip space is Z-up with +Y forward.
        let root = controller.root_delta() / delta_time;
        let velocity = controller.rotation() * Vec3::new(root.x, root.z, -root.y);
        controller.set_velocity(velocity);
    }

    pub fn post_physics(&mut self, _controller: &mut Controller<'_>, _delta_time: f32) {}

    pub fn should_transition(
        &mut self,
        controller: &mut Controller<'_>,
    ) -> Option<CharacterStateKind> {
        let finished = match controller.current_anim() {
            A::ClimbUp => controller.anim_time_left() < controller.config().climb.exit_frames,
            A::Idle => true,
            _ => false,
        };
        if !finished {
            return None;
        }
        controller.set_collides_with_world(true);
        Some(CharacterStateKind::Locomotion)
    }

    pub fn wants_climb_up(&self) -> bool {
        self.wants_climb_up
    }
}
