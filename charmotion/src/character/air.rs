use crate::{
    CharacterAnim as A, CharacterStateKind, ClipChange, ClipRule, ClipTable, Condition as C,
    Controller, InputSnapshot, LedgeHit, RuleInputs, find_ledge, probe_ledge,
};
use glam::Vec3;

pub const AIR_CLIPS: ClipTable = ClipTable {
    rules: &[
        ClipRule::new(A::RunToJumpL, C::Always, ClipChange::fade(A::RunJumpL, 3.0, false)),
        ClipRule::new(A::RunToJumpR, C::Always, ClipChange::fade(A::RunJumpL, 3.0, false)),
        ClipRule::new(A::RunJumpL, C::Ending, ClipChange::fade(A::JumpToFall, 3.0, false)),
        ClipRule::new(A::RunJumpL, C::Reaching, ClipChange::cut(A::JumpToReach, false)),
        ClipRule::new(A::JumpToFall, C::Ending, ClipChange::fade(A::Fall, 3.0, true)),
        ClipRule::new(A::JumpToFall, C::Reaching, ClipChange::cut(A::JumpToReach, false)),
        ClipRule::new(A::JumpToReach, C::TimeLeftBelow(1.0), ClipChange::cut(A::Reach, true)),
    ],
    holds: &[A::GrabLedge, A::Reach, A::Fall],
    fallback: ClipChange::cut(A::Fall, true),
};

/// Where the character will hang once the grab is confirmed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HangPoint {
    pub position: Vec3,
    /// Direction into the wall.
    pub forward: Vec3,
}

/// Jumping and falling, including reaching for a ledge.
#[derive(Clone, Debug, Default)]
pub struct AirState {
    reaching: bool,
    hang: Option<HangPoint>,
    jump_ledge: Option<LedgeHit>,
}

impl AirState {
    /// An air state entered from a jump that already spotted `ledge` ahead.
    pub fn with_jump_ledge(ledge: Option<LedgeHit>) -> Self {
        Self {
            jump_ledge: ledge,
            ..Self::default()
        }
    }

    pub fn begin(&mut self, _controller: &mut Controller<'_>) {
        self.reaching = false;
        self.hang = None;
    }

    pub fn exit(&mut self, controller: &mut Controller<'_>) {
        controller.set_collider_offset(Vec3::ZERO);
    }

    pub fn pre_physics(&mut self, controller: &mut Controller<'_>, _delta_time: f32) {
        if !self.reaching || self.hang.is_some() {
            return;
        }
        let config = controller.config();
        let hit = if config.air.sweep_reach {
            find_ledge(
                controller.physics(),
                controller.position(),
                controller.forward(),
                &config.ledge_probe,
            )
        } else {
            probe_ledge(
                controller.physics(),
                controller.position(),
                config.air.reach_height,
                controller.forward() * config.air.reach_distance,
                &config.ledge_probe,
            )
        };
        let Some(hit) = hit else {
            return;
        };

        let hang = HangPoint {
            position: hit.position
                + Vec3::NEG_Y * config.air.hang_drop
                + hit.normal * config.air.hang_wall_offset,
            forward: hit.forward,
        };
        log::debug!("ledge grab confirmed at {}", hit.position);
        self.hang = Some(hang);
        controller.set_collides_with_world(false);
    }

    pub fn pre_animation(
        &mut self,
        controller: &mut Controller<'_>,
        input: &InputSnapshot,
        delta_time: f32,
    ) {
        let mut velocity = controller.velocity();
        velocity.y -= controller.config().gravity * delta_time;
        controller.set_velocity(velocity);

        if input.reach {
            self.reaching = true;
            let offset = controller.forward() * controller.config().air.reach_collider_offset;
            controller.set_collider_offset(offset);
        }
    }

    pub fn update_animation(&mut self, controller: &mut Controller<'_>, _delta_time: f32) {
        let inputs = RuleInputs {
            time_left: controller.anim_time_left(),
            ending_frames: controller.config().locomotion.ending_frames,
            reaching: self.reaching,
            ..RuleInputs::default()
        };
        AIR_CLIPS.apply(controller, &inputs);
    }

    pub fn post_animation(&mut self, _controller: &mut Controller<'_>, _delta_time: f32) {}

    pub fn post_physics(&mut self, _controller: &mut Controller<'_>, _delta_time: f32) {}

    pub fn should_transition(
        &mut self,
        controller: &mut Controller<'_>,
    ) -> Option<CharacterStateKind> {
        if let Some(hang) = self.hang {
            let _ = controller.set_animation(A::GrabWall, 0.0, false);
            controller.set_velocity(Vec3::ZERO);
            controller.set_collider_offset(Vec3::ZERO);
            controller.set_position(hang.position);
            return Some(CharacterStateKind::Climb);
        }
        if controller.velocity().y < 0.0 && controller.is_grounded() {
            return Some(CharacterStateKind::Locomotion);
        }
        None
    }

    pub fn is_reaching(&self) -> bool {
        self.reaching
    }

    pub fn hang_point(&self) -> Option<HangPoint> {
        self.hang
    }

    pub fn jump_ledge(&self) -> Option<LedgeHit> {
        self.jump_ledge
    }
}
