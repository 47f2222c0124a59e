//! JSON loaders for skeletons and animation clips.
//!
//! The loaders are IO-free: they parse an in-memory string. Bones reference their parent by name
//! and must be listed after it; clip tracks are listed in bone order.

use crate::{
    AnimEvent, AnimationClip, BoneData, BoneTrack, Error, EventKey, Keyframe, SkeletonData,
};
use glam::{Mat4, Quat, Vec3};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct SkeletonDef {
    #[serde(default)]
    name: String,
    bones: Vec<BoneDef>,
}

fn default_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoneDef {
    name: String,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    position: [f32; 3],
    /// Quaternion as `[x, y, z, w]`.
    #[serde(default = "default_rotation")]
    rotation: [f32; 4],
    #[serde(default = "default_scale")]
    scale: [f32; 3],
    /// Column-major.
    #[serde(default)]
    inverse_bind: Option<[f32; 16]>,
}

#[derive(Debug, Deserialize)]
struct KeyDef<T> {
    time: f32,
    value: T,
}

#[derive(Debug, Default, Deserialize)]
struct TrackDef {
    #[serde(default)]
    positions: Vec<KeyDef<[f32; 3]>>,
    #[serde(default)]
    rotations: Vec<KeyDef<[f32; 4]>>,
    #[serde(default)]
    scales: Vec<KeyDef<[f32; 3]>>,
}

#[derive(Debug, Deserialize)]
struct EventDef {
    #[serde(default)]
    time: f32,
    name: String,
}

fn default_frame_rate() -> f32 {
    AnimationClip::DEFAULT_FRAME_RATE
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClipDef {
    #[serde(default)]
    name: String,
    #[serde(default = "default_frame_rate")]
    frame_rate: f32,
    length: f32,
    #[serde(default)]
    root_motion: bool,
    #[serde(default)]
    tracks: Vec<TrackDef>,
    #[serde(default)]
    events: Vec<EventDef>,
}

fn parse<'a, T: Deserialize<'a>>(input: &'a str) -> Result<T, Error> {
    serde_json::from_str(input).map_err(|e| Error::JsonParse {
        message: e.to_string(),
    })
}

impl SkeletonData {
    pub fn from_json_str(input: &str) -> Result<Arc<Self>, Error> {
        let root: SkeletonDef = parse(input)?;

        let mut bones = Vec::with_capacity(root.bones.len());
        let mut bone_index = HashMap::<String, usize>::new();
        for bone in root.bones {
            let parent = match bone.parent.as_deref() {
                None => None,
                Some(parent_name) => {
                    Some(bone_index.get(parent_name).copied().ok_or_else(|| {
                        Error::JsonUnknownBoneParent {
                            bone: bone.name.clone(),
                            parent: parent_name.to_string(),
                        }
                    })?)
                }
            };

            bone_index.insert(bone.name.clone(), bones.len());
            bones.push(BoneData {
                name: bone.name,
                parent,
                position: Vec3::from_array(bone.position),
                rotation: Quat::from_array(bone.rotation),
                scale: Vec3::from_array(bone.scale),
                inverse_bind: bone
                    .inverse_bind
                    .map_or(Mat4::IDENTITY, |m| Mat4::from_cols_array(&m)),
            });
        }

        Self::new(root.name, bones)
    }
}

impl AnimationClip {
    /// Parses and validates a clip. Events sharing a time keep their file order.
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let root: ClipDef = parse(input)?;

        let tracks = root
            .tracks
            .into_iter()
            .map(|track| BoneTrack {
                positions: track
                    .positions
                    .into_iter()
                    .map(|k| Keyframe::new(k.time, Vec3::from_array(k.value)))
                    .collect(),
                rotations: track
                    .rotations
                    .into_iter()
                    .map(|k| Keyframe::new(k.time, Quat::from_array(k.value)))
                    .collect(),
                scales: track
                    .scales
                    .into_iter()
                    .map(|k| Keyframe::new(k.time, Vec3::from_array(k.value)))
                    .collect(),
            })
            .collect();

        let mut events = root
            .events
            .into_iter()
            .map(|e| {
                let event =
                    AnimEvent::from_json_name(&e.name).ok_or_else(|| Error::JsonUnknownEvent {
                        animation: root.name.clone(),
                        event: e.name.clone(),
                    })?;
                Ok(EventKey {
                    time: e.time,
                    event,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        events.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut clip = AnimationClip::new(root.name, root.length, tracks);
        clip.frame_rate = root.frame_rate;
        clip.events = events;
        clip.root_motion = root.root_motion;
        clip.validate()?;
        Ok(clip)
    }
}
