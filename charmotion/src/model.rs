use crate::Error;
use glam::{Mat4, Quat, Vec3};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct BoneData {
    pub name: String,
    pub parent: Option<usize>,

    /// Bind-pose transform relative to the parent bone.
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    /// Transforms model-space vertices into bone space.
    pub inverse_bind: Mat4,
}

impl BoneData {
    pub fn new(name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            parent,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            inverse_bind: Mat4::IDENTITY,
        }
    }

    /// Builds a bone from a bind-pose matrix; skew and perspective are discarded.
    pub fn from_matrix(
        name: impl Into<String>,
        parent: Option<usize>,
        transform: Mat4,
        inverse_bind: Mat4,
    ) -> Self {
        let (scale, rotation, position) = transform.to_scale_rotation_translation();
        Self {
            name: name.into(),
            parent,
            position,
            rotation,
            scale,
            inverse_bind,
        }
    }

    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[derive(Clone, Debug)]
pub struct SkeletonData {
    pub name: String,
    bones: Vec<BoneData>,
}

impl SkeletonData {
    /// Validates the hierarchy ordering: bone 0 is the only root and every other bone's parent
    /// precedes it, so world transforms resolve in a single forward pass.
    pub fn new(name: impl Into<String>, bones: Vec<BoneData>) -> Result<Arc<Self>, Error> {
        if bones.is_empty() {
            return Err(Error::EmptySkeleton);
        }
        for (index, bone) in bones.iter().enumerate() {
            let valid = match (index, bone.parent) {
                (0, None) => true,
                (0, Some(_)) | (_, None) => false,
                (i, Some(parent)) => parent < i,
            };
            if !valid {
                return Err(Error::InvalidBoneParent {
                    bone: bone.name.clone(),
                    index,
                    parent: bone.parent,
                });
            }
        }
        Ok(Arc::new(Self {
            name: name.into(),
            bones,
        }))
    }

    pub fn bones(&self) -> &[BoneData] {
        &self.bones
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Keyframe<T> {
    /// Time in frames.
    pub time: f32,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

pub type PositionKey = Keyframe<Vec3>;
pub type RotationKey = Keyframe<Quat>;
pub type ScaleKey = Keyframe<Vec3>;

#[derive(Clone, Debug, Default)]
pub struct BoneTrack {
    pub positions: Vec<PositionKey>,
    pub rotations: Vec<RotationKey>,
    pub scales: Vec<ScaleKey>,
}

impl BoneTrack {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.rotations.is_empty() && self.scales.is_empty()
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AnimEvent {
    Generic = 0,
    LeftFoot,
    RightFoot,
    LeftHand,
    RightHand,
    GroundContact,
    LeftGround,
    StateTransition,
    RootMoveOff,
    RootMoveOn,
    CollisionOn,
    CollisionOff,
}

impl AnimEvent {
    pub const ALL: [AnimEvent; 12] = [
        Self::Generic,
        Self::LeftFoot,
        Self::RightFoot,
        Self::LeftHand,
        Self::RightHand,
        Self::GroundContact,
        Self::LeftGround,
        Self::StateTransition,
        Self::RootMoveOff,
        Self::RootMoveOn,
        Self::CollisionOn,
        Self::CollisionOff,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Generic => "Generic Event",
            Self::LeftFoot => "Left Foot",
            Self::RightFoot => "Right Foot",
            Self::LeftHand => "Left Hand",
            Self::RightHand => "Right Hand",
            Self::GroundContact => "Ground Contact",
            Self::LeftGround => "Left Ground",
            Self::StateTransition => "State Transition",
            Self::RootMoveOff => "Root Motion Off",
            Self::RootMoveOn => "Root Motion On",
            Self::CollisionOn => "Collision On",
            Self::CollisionOff => "Collision Off",
        }
    }

    #[cfg(feature = "json")]
    pub(crate) fn from_json_name(name: &str) -> Option<Self> {
        match name {
            "generic" => Some(Self::Generic),
            "leftFoot" => Some(Self::LeftFoot),
            "rightFoot" => Some(Self::RightFoot),
            "leftHand" => Some(Self::LeftHand),
            "rightHand" => Some(Self::RightHand),
            "groundContact" => Some(Self::GroundContact),
            "leftGround" => Some(Self::LeftGround),
            "stateTransition" => Some(Self::StateTransition),
            "rootMoveOff" => Some(Self::RootMoveOff),
            "rootMoveOn" => Some(Self::RootMoveOn),
            "collisionOn" => Some(Self::CollisionOn),
            "collisionOff" => Some(Self::CollisionOff),
            _ => None,
        }
    }
}

impl fmt::Display for AnimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EventKey {
    pub time: f32,
    pub event: AnimEvent,
}

#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    pub frame_rate: f32,
    /// Total length in frames.
    pub length: f32,
    /// Indexed by bone id.
    pub tracks: Vec<BoneTrack>,
    pub events: Vec<EventKey>,
    /// Extract root bone movement instead of applying it to the skeleton.
    pub root_motion: bool,
}

impl AnimationClip {
    pub const DEFAULT_FRAME_RATE: f32 = 30.0;

    pub fn new(name: impl Into<String>, length: f32, tracks: Vec<BoneTrack>) -> Self {
        Self {
            name: name.into(),
            frame_rate: Self::DEFAULT_FRAME_RATE,
            length,
            tracks,
            events: Vec::new(),
            root_motion: false,
        }
    }

    /// Length in seconds at the clip's frame rate.
    pub fn duration(&self) -> f32 {
        if self.frame_rate > 0.0 {
            self.length / self.frame_rate
        } else {
            0.0
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(Error::InvalidValue {
                message: format!("animation '{}' frame rate must be > 0", self.name),
            });
        }
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(Error::InvalidValue {
                message: format!("animation '{}' length must be > 0", self.name),
            });
        }

        fn ordered<T>(keys: &[Keyframe<T>]) -> bool {
            keys.windows(2).all(|w| w[0].time <= w[1].time)
        }

        for (bone, track) in self.tracks.iter().enumerate() {
            let unordered = if !ordered(&track.positions) {
                Some("position")
            } else if !ordered(&track.rotations) {
                Some("rotation")
            } else if !ordered(&track.scales) {
                Some("scale")
            } else {
                None
            };
            if let Some(track) = unordered {
                return Err(Error::UnorderedKeys {
                    clip: self.name.clone(),
                    bone,
                    track,
                });
            }
        }

        if !self.events.windows(2).all(|w| w[0].time <= w[1].time) {
            return Err(Error::InvalidValue {
                message: format!("animation '{}' events are not ordered by time", self.name),
            });
        }
        Ok(())
    }
}
