use crate::{BoneTrack, Keyframe, PositionKey, RotationKey, ScaleKey};
use glam::{Quat, Vec3};

/// Locates the keys bracketing `frame` and returns `(left, right, alpha)`.
///
/// Frames before the first key resolve to the first key and frames after the last key resolve
/// to the last key. Returns `None` for an empty list.
fn bracket<T: Copy>(keys: &[Keyframe<T>], frame: f32) -> Option<(T, T, f32)> {
    let (first, last) = (keys.first()?, keys.last()?);
    if keys.len() == 1 || frame <= first.time {
        return Some((first.value, first.value, 0.0));
    }
    if frame >= last.time {
        return Some((last.value, last.value, 0.0));
    }

    // First key strictly after `frame`; the loop above guarantees 1 <= next < len.
    let next = keys.partition_point(|k| k.time <= frame);
    let (a, b) = (&keys[next - 1], &keys[next]);
    let span = b.time - a.time;
    let alpha = if span > 0.0 {
        ((frame - a.time) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Some((a.value, b.value, alpha))
}

pub fn sample_position(keys: &[PositionKey], frame: f32, fallback: Vec3) -> Vec3 {
    match bracket(keys, frame) {
        Some((a, b, alpha)) => a.lerp(b, alpha),
        None => fallback,
    }
}

pub fn sample_scale(keys: &[ScaleKey], frame: f32, fallback: Vec3) -> Vec3 {
    match bracket(keys, frame) {
        Some((a, b, alpha)) => a.lerp(b, alpha),
        None => fallback,
    }
}

pub fn sample_rotation(keys: &[RotationKey], frame: f32, fallback: Quat) -> Quat {
    match bracket(keys, frame) {
        Some((a, b, alpha)) if alpha > 0.0 => a.slerp(b, alpha),
        Some((a, _, _)) => a,
        None => fallback,
    }
}

/// A sampled local bone transform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoneTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl BoneTransform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn lerp(&self, other: &Self, alpha: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, alpha),
            rotation: self.rotation.slerp(other.rotation, alpha),
            scale: self.scale.lerp(other.scale, alpha),
        }
    }
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

pub fn sample_bone(track: &BoneTrack, frame: f32, setup: &BoneTransform) -> BoneTransform {
    BoneTransform {
        position: sample_position(&track.positions, frame, setup.position),
        rotation: sample_rotation(&track.rotations, frame, setup.rotation),
        scale: sample_scale(&track.scales, frame, setup.scale),
    }
}
