use glam::Vec3;

/// A ray whose length is the length of `direction`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitResult {
    pub point: Vec3,
    pub normal: Vec3,
    pub object_id: u64,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum GroundState {
    OnGround,
    OnSteepGround,
    NotSupported,
    #[default]
    InAir,
}

/// Result of a capsule controller step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CharacterUpdate {
    pub position: Vec3,
    pub ground_state: GroundState,
}

/// The parts of a physics engine the character layer talks to: ray queries and a kinematic
/// capsule controller.
pub trait CharacterPhysics {
    fn raycast(&self, ray: &Ray) -> Option<HitResult>;

    /// Turns collision between the character capsule and static world geometry on or off.
    fn set_collides_with_world(&mut self, collides: bool);

    fn set_shape_offset(&mut self, offset: Vec3);

    /// Teleports the capsule.
    fn set_position(&mut self, position: Vec3);

    fn ground_state(&self) -> GroundState;

    /// Moves the capsule by `velocity * delta_time`, sliding along contacts, and reports where it
    /// ended up. `gravity` is used to keep the capsule stuck to the ground while walking down
    /// slopes and stairs.
    fn extended_update(&mut self, delta_time: f32, velocity: Vec3, gravity: Vec3)
    -> CharacterUpdate;
}
