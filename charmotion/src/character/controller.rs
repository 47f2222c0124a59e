use crate::{
    AnimEvent, AnimPlayer, AnimationSet, CharacterAnim, CharacterConfig, CharacterPhysics, Error,
    GroundState, HitResult, Ray, RootMotionMode, SkeletonData,
};
use glam::{EulerRot, Quat, Vec3};
use std::sync::Arc;

/// Everything the engine stores about one player character. Gameplay code reaches it only
/// through a [`Controller`].
#[derive(Debug)]
pub struct CharacterData {
    pub player: AnimPlayer,
    pub animations: AnimationSet,
    pub current_anim: CharacterAnim,

    pub position: Vec3,
    pub rotation: Quat,
    /// Velocity handed to the capsule controller this frame.
    pub velocity: Vec3,
    pub ground_state: GroundState,

    pub camera_yaw: f32,
    pub camera_pitch: f32,

    pub config: CharacterConfig,
}

impl CharacterData {
    pub fn new(skeleton: Arc<SkeletonData>, animations: AnimationSet) -> Self {
        let mut player = AnimPlayer::new();
        player.set_skeleton(skeleton);
        Self {
            player,
            animations,
            current_anim: CharacterAnim::Idle,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            ground_state: GroundState::default(),
            camera_yaw: 0.0,
            camera_pitch: 0.0,
            config: CharacterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CharacterConfig) -> Self {
        self.config = config;
        self
    }
}

/// Borrowed view over a character and its physics body. This is the only surface state logic
/// uses to read or change the character.
pub struct Controller<'a> {
    data: &'a mut CharacterData,
    physics: &'a mut dyn CharacterPhysics,
}

impl<'a> Controller<'a> {
    pub fn new(data: &'a mut CharacterData, physics: &'a mut dyn CharacterPhysics) -> Self {
        Self { data, physics }
    }

    pub fn config(&self) -> &CharacterConfig {
        &self.data.config
    }

    /// Plays `anim`, cross-fading over `fade_frames` when positive. A missing clip is refused and
    /// the current clip keeps playing.
    pub fn set_animation(
        &mut self,
        anim: CharacterAnim,
        fade_frames: f32,
        looped: bool,
    ) -> Result<(), Error> {
        let Some(clip) = self.data.animations.get(anim).cloned() else {
            let err = Error::MissingAnimation {
                name: anim.name().to_string(),
            };
            log::error!("{err}");
            return Err(err);
        };

        if fade_frames > 0.0 {
            self.data.player.blend_to(clip, fade_frames, looped);
        } else {
            self.data.player.play(clip, looped);
        }
        self.data.current_anim = anim;
        Ok(())
    }

    pub fn set_root_motion(&mut self, mode: RootMotionMode) {
        self.data.player.set_root_motion_mode(mode);
    }

    pub fn root_motion_mode(&self) -> RootMotionMode {
        self.data.player.root_motion_mode()
    }

    /// Whether the playing clip is authored to move the character through its root bone.
    pub fn clip_has_root_motion(&self) -> bool {
        self.data.player.clip_has_root_motion()
    }

    pub fn anim_time_left(&self) -> f32 {
        self.data.player.time_left()
    }

    pub fn root_delta(&self) -> Vec3 {
        self.data.player.root_delta()
    }

    pub fn root_rotation_delta(&self) -> Quat {
        self.data.player.root_rotation_delta()
    }

    pub fn current_anim(&self) -> CharacterAnim {
        self.data.current_anim
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.data.velocity = velocity;
    }

    pub fn velocity(&self) -> Vec3 {
        self.data.velocity
    }

    /// Moves the character and teleports its capsule.
    pub fn set_position(&mut self, position: Vec3) {
        self.data.position = position;
        self.physics.set_position(position);
    }

    pub fn position(&self) -> Vec3 {
        self.data.position
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.data.rotation = rotation.normalize();
    }

    /// Sets the rotation from XYZ euler angles in radians.
    pub fn set_rotation_euler(&mut self, eulers: Vec3) {
        self.set_rotation(Quat::from_euler(EulerRot::XYZ, eulers.x, eulers.y, eulers.z));
    }

    pub fn rotation(&self) -> Quat {
        self.data.rotation
    }

    /// Direction the character faces (`-Z` in character space).
    pub fn forward(&self) -> Vec3 {
        self.data.rotation * Vec3::NEG_Z
    }

    pub fn set_collider_offset(&mut self, offset: Vec3) {
        self.physics.set_shape_offset(offset);
    }

    pub fn set_collides_with_world(&mut self, collides: bool) {
        self.physics.set_collides_with_world(collides);
    }

    pub fn is_grounded(&self) -> bool {
        self.physics.ground_state() == GroundState::OnGround
    }

    pub fn raycast(&self, ray: &Ray) -> Option<HitResult> {
        self.physics.raycast(ray)
    }

    pub fn camera_yaw(&self) -> f32 {
        self.data.camera_yaw
    }

    pub fn camera_pitch(&self) -> f32 {
        self.data.camera_pitch
    }

    pub(crate) fn physics(&self) -> &dyn CharacterPhysics {
        &*self.physics
    }

    /// Advances the animation player and applies the events it fired.
    pub(crate) fn process_animation(&mut self, delta_time: f32) {
        self.data.player.process(delta_time);
        for &event in self.data.player.fired_events() {
            match event {
                AnimEvent::CollisionOn => self.physics.set_collides_with_world(true),
                AnimEvent::CollisionOff => self.physics.set_collides_with_world(false),
                _ => {}
            }
        }
    }

    /// Runs the capsule controller with this frame's velocity and stores the result.
    pub(crate) fn step_physics(&mut self, delta_time: f32) {
        let gravity = Vec3::new(0.0, -self.data.config.gravity, 0.0);
        let update = self
            .physics
            .extended_update(delta_time, self.data.velocity, gravity);
        self.data.position = update.position;
        self.data.ground_state = update.ground_state;
    }
}
