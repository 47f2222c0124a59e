//! Compact binary codec for skeletons and animation clips.
//!
//! The codec is IO-free: readers take an in-memory byte slice and writers return a `Vec<u8>`.
//! Scalars are big-endian; counts and string lengths are varints.
//!
//! Clip layout: magic, version, name, then the bone tracks (positions, rotations and scales per
//! bone), the events, the root-motion flag, the length and the frame rate.

use crate::{
    AnimEvent, AnimationClip, BoneData, BoneTrack, Error, EventKey, Keyframe, SkeletonData,
};
use byteorder::{BigEndian, ByteOrder};
use glam::{Mat4, Quat, Vec3};
use std::sync::Arc;

const SKELETON_MAGIC: &[u8; 4] = b"CMSK";
const CLIP_MAGIC: &[u8; 4] = b"CMCL";
const VERSION: u8 = 1;

const NO_PARENT: i32 = -1;

fn eof() -> Error {
    Error::BinaryParse {
        message: "unexpected EOF".to_string(),
    }
}

#[derive(Clone, Debug)]
struct BinaryInput<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> BinaryInput<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.cursor)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.remaining() < len {
            return Err(eof());
        }
        let bytes = &self.bytes[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(bytes)
    }

    fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    fn read_bool(&mut self) -> Result<bool, Error> {
        Ok(self.read_u8()? != 0)
    }

    fn read_i32_be(&mut self) -> Result<i32, Error> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    fn read_f32_be(&mut self) -> Result<f32, Error> {
        Ok(BigEndian::read_f32(self.take(4)?))
    }

    fn read_varint(&mut self) -> Result<u32, Error> {
        let mut value = 0u32;
        for shift in (0..35).step_by(7) {
            let b = self.read_u8()?;
            value |= u32::from(b & 0x7F) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(Error::BinaryParse {
            message: format!("varint too long at offset {}", self.cursor),
        })
    }

    /// Reads an element count, rejecting counts that cannot fit in the remaining input.
    fn read_count(&mut self, min_element_size: usize) -> Result<usize, Error> {
        let offset = self.cursor;
        let count = self.read_varint()? as usize;
        if count.saturating_mul(min_element_size) > self.remaining() {
            return Err(Error::BinaryParse {
                message: format!("count {count} at offset {offset} exceeds the input"),
            });
        }
        Ok(count)
    }

    fn read_string(&mut self) -> Result<String, Error> {
        let offset = self.cursor;
        let len = self.read_count(1)?;
        let bytes = self.take(len)?;
        let s = std::str::from_utf8(bytes).map_err(|e| Error::BinaryParse {
            message: format!("invalid utf-8 in string at offset {offset}: {e}"),
        })?;
        Ok(s.to_string())
    }

    fn read_vec3(&mut self) -> Result<Vec3, Error> {
        Ok(Vec3::new(
            self.read_f32_be()?,
            self.read_f32_be()?,
            self.read_f32_be()?,
        ))
    }

    fn read_quat(&mut self) -> Result<Quat, Error> {
        Ok(Quat::from_xyzw(
            self.read_f32_be()?,
            self.read_f32_be()?,
            self.read_f32_be()?,
            self.read_f32_be()?,
        ))
    }

    fn read_mat4(&mut self) -> Result<Mat4, Error> {
        let mut cols = [0.0; 16];
        for v in &mut cols {
            *v = self.read_f32_be()?;
        }
        Ok(Mat4::from_cols_array(&cols))
    }

    fn read_keys<T>(
        &mut self,
        key_size: usize,
        mut read_value: impl FnMut(&mut Self) -> Result<T, Error>,
    ) -> Result<Vec<Keyframe<T>>, Error> {
        let count = self.read_count(key_size)?;
        let mut keys = Vec::with_capacity(count);
        for _ in 0..count {
            let time = self.read_f32_be()?;
            keys.push(Keyframe::new(time, read_value(self)?));
        }
        Ok(keys)
    }

    fn expect_header(&mut self, magic: &[u8; 4], what: &str) -> Result<(), Error> {
        if self.take(4)? != magic {
            return Err(Error::BinaryParse {
                message: format!("not a {what} file"),
            });
        }
        let version = self.read_u8()?;
        if version != VERSION {
            return Err(Error::BinaryParse {
                message: format!("unsupported {what} version {version}"),
            });
        }
        Ok(())
    }

    fn finish(&self) -> Result<(), Error> {
        if self.remaining() > 0 {
            return Err(Error::BinaryParse {
                message: format!("{} trailing bytes", self.remaining()),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct BinaryOutput {
    bytes: Vec<u8>,
}

impl BinaryOutput {
    fn write_u8(&mut self, v: u8) {
        self.bytes.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_i32_be(&mut self, v: i32) {
        let mut buf = [0; 4];
        BigEndian::write_i32(&mut buf, v);
        self.bytes.extend_from_slice(&buf);
    }

    fn write_f32_be(&mut self, v: f32) {
        let mut buf = [0; 4];
        BigEndian::write_f32(&mut buf, v);
        self.bytes.extend_from_slice(&buf);
    }

    fn write_varint(&mut self, mut v: u32) {
        while v >= 0x80 {
            self.write_u8((v as u8 & 0x7F) | 0x80);
            v >>= 7;
        }
        self.write_u8(v as u8);
    }

    fn write_count(&mut self, count: usize) {
        self.write_varint(u32::try_from(count).unwrap_or(u32::MAX));
    }

    fn write_string(&mut self, s: &str) {
        self.write_count(s.len());
        self.bytes.extend_from_slice(s.as_bytes());
    }

    fn write_floats(&mut self, values: &[f32]) {
        for &v in values {
            self.write_f32_be(v);
        }
    }

    fn write_keys<T>(&mut self, keys: &[Keyframe<T>], write_value: impl Fn(&mut Self, &T)) {
        self.write_count(keys.len());
        for key in keys {
            self.write_f32_be(key.time);
            write_value(self, &key.value);
        }
    }

    fn write_header(&mut self, magic: &[u8; 4]) {
        self.bytes.extend_from_slice(magic);
        self.write_u8(VERSION);
    }
}

impl SkeletonData {
    pub fn from_binary(bytes: &[u8]) -> Result<Arc<Self>, Error> {
        let mut input = BinaryInput::new(bytes);
        input.expect_header(SKELETON_MAGIC, "skeleton")?;
        let name = input.read_string()?;

        // name length + parent + position + rotation + scale + inverse bind
        let bone_count = input.read_count(1 + 4 + 12 + 16 + 12 + 64)?;
        let mut bones = Vec::with_capacity(bone_count);
        for _ in 0..bone_count {
            let name = input.read_string()?;
            let parent = match input.read_i32_be()? {
                NO_PARENT => None,
                index => Some(usize::try_from(index).map_err(|_| Error::BinaryParse {
                    message: format!("bone '{name}' has invalid parent {index}"),
                })?),
            };
            bones.push(BoneData {
                name,
                parent,
                position: input.read_vec3()?,
                rotation: input.read_quat()?,
                scale: input.read_vec3()?,
                inverse_bind: input.read_mat4()?,
            });
        }
        input.finish()?;

        Self::new(name, bones)
    }

    pub fn to_binary(&self) -> Vec<u8> {
        let mut out = BinaryOutput::default();
        out.write_header(SKELETON_MAGIC);
        out.write_string(&self.name);
        out.write_count(self.bones().len());
        for bone in self.bones() {
            out.write_string(&bone.name);
            let parent = bone
                .parent
                .and_then(|p| i32::try_from(p).ok())
                .unwrap_or(NO_PARENT);
            out.write_i32_be(parent);
            out.write_floats(&bone.position.to_array());
            out.write_floats(&bone.rotation.to_array());
            out.write_floats(&bone.scale.to_array());
            out.write_floats(&bone.inverse_bind.to_cols_array());
        }
        out.bytes
    }
}

impl AnimationClip {
    /// Decodes and validates a clip.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, Error> {
        let mut input = BinaryInput::new(bytes);
        input.expect_header(CLIP_MAGIC, "clip")?;
        let name = input.read_string()?;

        let track_count = input.read_count(3)?;
        let mut tracks = Vec::with_capacity(track_count);
        for _ in 0..track_count {
            tracks.push(BoneTrack {
                positions: input.read_keys(16, BinaryInput::read_vec3)?,
                rotations: input.read_keys(20, BinaryInput::read_quat)?,
                scales: input.read_keys(16, BinaryInput::read_vec3)?,
            });
        }

        let event_count = input.read_count(5)?;
        let mut events = Vec::with_capacity(event_count);
        for _ in 0..event_count {
            let time = input.read_f32_be()?;
            let code = input.read_u8()?;
            let event = AnimEvent::from_u8(code).ok_or_else(|| Error::BinaryParse {
                message: format!("unknown event id {code} in animation '{name}'"),
            })?;
            events.push(EventKey { time, event });
        }

        let root_motion = input.read_bool()?;
        let length = input.read_f32_be()?;
        let frame_rate = input.read_f32_be()?;
        input.finish()?;

        let mut clip = AnimationClip::new(name, length, tracks);
        clip.frame_rate = frame_rate;
        clip.events = events;
        clip.root_motion = root_motion;
        clip.validate()?;
        Ok(clip)
    }

    pub fn to_binary(&self) -> Vec<u8> {
        let mut out = BinaryOutput::default();
        out.write_header(CLIP_MAGIC);
        out.write_string(&self.name);

        out.write_count(self.tracks.len());
        for track in &self.tracks {
            out.write_keys(&track.positions, |o, v| o.write_floats(&v.to_array()));
            out.write_keys(&track.rotations, |o, v| o.write_floats(&v.to_array()));
            out.write_keys(&track.scales, |o, v| o.write_floats(&v.to_array()));
        }

        out.write_count(self.events.len());
        for key in &self.events {
            out.write_f32_be(key.time);
            out.write_u8(key.event.as_u8());
        }

        out.write_bool(self.root_motion);
        out.write_f32_be(self.length);
        out.write_f32_be(self.frame_rate);
        out.bytes
    }
}
