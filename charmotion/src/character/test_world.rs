use crate::{
    AnimationClip, AnimationSet, BoneData, BoneTrack, CharacterAnim, CharacterData,
    CharacterPhysics, CharacterUpdate, GroundState, HitResult, Ray, SkeletonData,
};
use glam::Vec3;
use std::sync::Arc;

const EPS: f32 = 1e-4;

/// A solid block filling `z <= face_z`, `y <= top_y`, facing a character standing at `z > face_z`.
#[derive(Copy, Clone, Debug)]
pub(crate) struct LedgeBlock {
    pub face_z: f32,
    pub top_y: f32,
    /// Reported normal of the top face; tilt it to model an overhang.
    pub top_normal: Vec3,
}

impl LedgeBlock {
    pub fn flat(face_z: f32, top_y: f32) -> Self {
        Self {
            face_z,
            top_y,
            top_normal: Vec3::Y,
        }
    }
}

/// Scripted physics: an optional ledge block, an optional infinite floor, and a capsule that
/// moves exactly by `velocity * dt`.
#[derive(Debug)]
pub(crate) struct TestWorld {
    pub block: Option<LedgeBlock>,
    pub floor: Option<f32>,
    pub ground_state: GroundState,
    pub collides_with_world: bool,
    pub shape_offset: Vec3,
    pub position: Vec3,
    pub last_velocity: Vec3,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            block: None,
            floor: None,
            ground_state: GroundState::InAir,
            collides_with_world: true,
            shape_offset: Vec3::ZERO,
            position: Vec3::ZERO,
            last_velocity: Vec3::ZERO,
        }
    }

    pub fn with_floor(mut self, height: f32) -> Self {
        self.floor = Some(height);
        self.ground_state = GroundState::OnGround;
        self
    }

    pub fn with_block(mut self, block: LedgeBlock) -> Self {
        self.block = Some(block);
        self
    }
}

fn plane_t(origin: f32, direction: f32, plane: f32) -> Option<f32> {
    if direction.abs() < f32::EPSILON {
        return None;
    }
    let t = (plane - origin) / direction;
    (0.0..=1.0).contains(&t).then_some(t)
}

impl CharacterPhysics for TestWorld {
    fn raycast(&self, ray: &Ray) -> Option<HitResult> {
        let mut best: Option<(f32, HitResult)> = None;
        let mut consider = |t: f32, normal: Vec3, object_id: u64| {
            if best.is_none_or(|(best_t, _)| t < best_t) {
                let hit = HitResult {
                    point: ray.at(t),
                    normal,
                    object_id,
                };
                best = Some((t, hit));
            }
        };

        if let Some(block) = self.block {
            if let Some(t) = plane_t(ray.origin.z, ray.direction.z, block.face_z) {
                if ray.at(t).y <= block.top_y + EPS {
                    consider(t, Vec3::Z, 1);
                }
            }
            if let Some(t) = plane_t(ray.origin.y, ray.direction.y, block.top_y) {
                if ray.at(t).z <= block.face_z + EPS {
                    consider(t, block.top_normal, 1);
                }
            }
        }
        if let Some(floor) = self.floor {
            if let Some(t) = plane_t(ray.origin.y, ray.direction.y, floor) {
                consider(t, Vec3::Y, 0);
            }
        }
        best.map(|(_, hit)| hit)
    }

    fn set_collides_with_world(&mut self, collides: bool) {
        self.collides_with_world = collides;
    }

    fn set_shape_offset(&mut self, offset: Vec3) {
        self.shape_offset = offset;
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn ground_state(&self) -> GroundState {
        self.ground_state
    }

    fn extended_update(
        &mut self,
        delta_time: f32,
        velocity: Vec3,
        _gravity: Vec3,
    ) -> CharacterUpdate {
        self.last_velocity = velocity;
        self.position += velocity * delta_time;
        self.ground_state = match self.floor {
            Some(floor) if self.position.y <= floor + EPS => {
                self.position.y = floor;
                GroundState::OnGround
            }
            _ => GroundState::InAir,
        };
        CharacterUpdate {
            position: self.position,
            ground_state: self.ground_state,
        }
    }
}

pub(crate) fn single_bone_skeleton() -> Arc<SkeletonData> {
    SkeletonData::new("rig", vec![BoneData::new("root", None)]).expect("skeleton")
}

/// A motionless clip per character animation, `length` frames at 30 fps.
pub(crate) fn still_animations(length: f32) -> AnimationSet {
    let mut set = AnimationSet::new();
    for anim in CharacterAnim::ALL {
        let clip = AnimationClip::new(anim.name(), length, vec![BoneTrack::default()]);
        set.bind(anim, Arc::new(clip));
    }
    set
}

pub(crate) fn character(length: f32) -> CharacterData {
    CharacterData::new(single_bone_skeleton(), still_animations(length))
}
