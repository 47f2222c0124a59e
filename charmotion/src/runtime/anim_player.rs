use crate::{
    AnimEvent, AnimationClip, BoneTransform, Pose, SkeletonData, sample_bone, sample_position,
    sample_rotation,
};
use glam::{Mat4, Quat, Vec3};
use std::sync::Arc;

/// Local forward axis of the root bone, used to measure root rotation deltas.
const ROOT_FORWARD: Vec3 = Vec3::NEG_Z;

/// How movement authored on the root bone is treated.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum RootMotionMode {
    /// The root bone is animated like any other bone.
    Off,
    /// Root translation is extracted into [`AnimPlayer::root_delta`]; rotation stays on the bone.
    #[default]
    PositionOnly,
    /// Root translation and rotation are both extracted.
    On,
}

/// Receives animation events as they are crossed during [`AnimPlayer::process`].
pub trait AnimEventListener {
    fn on_event(&mut self, event: AnimEvent);
}

impl<F: FnMut(AnimEvent)> AnimEventListener for F {
    fn on_event(&mut self, event: AnimEvent) {
        self(event)
    }
}

#[derive(Clone, Debug)]
struct PlaybackCursor {
    clip: Arc<AnimationClip>,
    frame: f32,
    previous_frame: f32,
    looped: bool,
    loop_count: u32,
    /// Clip periods crossed by the last `advance`.
    wraps: u32,

    previous_root_position: Vec3,
    previous_root_rotation: Quat,

    next_event: usize,
    awaiting_wrap: bool,
}

impl PlaybackCursor {
    fn new(clip: Arc<AnimationClip>, looped: bool, root_setup: &BoneTransform) -> Self {
        // Prime the root cache with frame 0 so the first delta only contains motion.
        let (position, rotation) = match clip.tracks.first() {
            Some(track) => (
                sample_position(&track.positions, 0.0, root_setup.position),
                sample_rotation(&track.rotations, 0.0, root_setup.rotation),
            ),
            None => (root_setup.position, root_setup.rotation),
        };
        Self {
            clip,
            frame: 0.0,
            previous_frame: 0.0,
            looped,
            loop_count: 0,
            wraps: 0,
            previous_root_position: position,
            previous_root_rotation: rotation,
            next_event: 0,
            awaiting_wrap: false,
        }
    }

    fn advance(&mut self, delta_time: f32) {
        self.previous_frame = self.frame;
        self.frame += delta_time * self.clip.frame_rate;
        self.wraps = 0;
        if self.looped && self.clip.length > 0.0 {
            // A long step can cross the end more than once.
            self.wraps = (self.frame / self.clip.length).floor().max(0.0) as u32;
            self.frame = self.frame.rem_euclid(self.clip.length);
        }
        self.loop_count = self.loop_count.saturating_add(self.wraps);
    }

    fn wrapped(&self) -> bool {
        self.wraps > 0
    }

    fn time_left(&self) -> f32 {
        self.clip.length - self.frame
    }

    fn root_position_delta(&mut self, position: Vec3) -> Vec3 {
        let mut delta = position - self.previous_root_position;
        if self.wrapped() {
            // The pose restarted from the first key: add the segment that was skipped so the
            // character does not snap back to the loop origin.
            let keys = self.clip.tracks.first().map(|t| t.positions.as_slice());
            if let Some([first, .., last]) = keys {
                delta += (last.value - first.value) * self.wraps as f32;
            }
        }
        self.previous_root_position = position;
        delta
    }

    fn root_rotation_delta(&mut self, rotation: Quat) -> Quat {
        let from = (self.previous_root_rotation * ROOT_FORWARD).normalize();
        let to = (rotation * ROOT_FORWARD).normalize();

        let keys = self.clip.tracks.first().map(|t| t.rotations.as_slice());
        let delta = match keys {
            Some([first, .., last]) if self.wrapped() => {
                let first = (first.value * ROOT_FORWARD).normalize();
                let last = (last.value * ROOT_FORWARD).normalize();
                let period = Quat::from_rotation_arc(first, last);
                let mut delta = Quat::from_rotation_arc(from, last);
                for _ in 1..self.wraps {
                    delta = period * delta;
                }
                Quat::from_rotation_arc(first, to) * delta
            }
            _ => Quat::from_rotation_arc(from, to),
        };
        self.previous_root_rotation = rotation;
        delta
    }

    /// Single-event tracks fire on the rising edge and re-arm once the frame drops back below
    /// the event. Multi-event tracks walk the events in order, once per traversal of the clip.
    fn collect_events(&mut self, out: &mut Vec<AnimEvent>) {
        let events = &self.clip.events;
        let Some(first) = events.first() else {
            return;
        };

        if self.wrapped() {
            if !self.awaiting_wrap {
                // Events between the previous frame and the end of the clip.
                out.extend(events[self.next_event..].iter().map(|e| e.event));
            }
            for _ in 1..self.wraps {
                out.extend(events.iter().map(|e| e.event));
            }
            self.next_event = 0;
            self.awaiting_wrap = false;
        } else if self.awaiting_wrap {
            if self.frame < first.time {
                self.next_event = 0;
                self.awaiting_wrap = false;
            } else {
                return;
            }
        }

        while let Some(key) = events.get(self.next_event) {
            if self.frame <= key.time {
                break;
            }
            out.push(key.event);
            self.next_event += 1;
        }
        if self.next_event == events.len() {
            self.next_event = 0;
            self.awaiting_wrap = true;
        }
    }
}

/// Samples clips on a skeleton and produces skinning matrices.
///
/// Two cursors are kept: the current clip and, while cross-fading, a target clip that fades in
/// over a number of its own frames and then replaces the current one.
pub struct AnimPlayer {
    skeleton: Option<Arc<SkeletonData>>,
    setup: Vec<BoneTransform>,
    pose: Pose,

    current: Option<PlaybackCursor>,
    target: Option<PlaybackCursor>,
    blend_frames: f32,

    root_motion_mode: RootMotionMode,
    root_delta: Vec3,
    root_rotation_delta: Quat,

    listener: Option<Box<dyn AnimEventListener>>,
    fired_events: Vec<AnimEvent>,
    invalid_reported: bool,
}

impl Default for AnimPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnimPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimPlayer")
            .field("skeleton", &self.skeleton.as_ref().map(|s| s.name.as_str()))
            .field("current", &self.current.as_ref().map(|c| c.clip.name.as_str()))
            .field("target", &self.target.as_ref().map(|c| c.clip.name.as_str()))
            .field("blend_frames", &self.blend_frames)
            .field("root_motion_mode", &self.root_motion_mode)
            .finish_non_exhaustive()
    }
}

impl AnimPlayer {
    pub fn new() -> Self {
        Self {
            skeleton: None,
            setup: Vec::new(),
            pose: Pose::default(),
            current: None,
            target: None,
            blend_frames: 0.0,
            root_motion_mode: RootMotionMode::default(),
            root_delta: Vec3::ZERO,
            root_rotation_delta: Quat::IDENTITY,
            listener: None,
            fired_events: Vec::new(),
            invalid_reported: false,
        }
    }

    pub fn set_skeleton(&mut self, skeleton: Arc<SkeletonData>) {
        self.pose = Pose::bind(&skeleton);
        self.setup = self.pose.locals.clone();
        self.skeleton = Some(skeleton);
        self.invalid_reported = false;
    }

    pub fn skeleton(&self) -> Option<&Arc<SkeletonData>> {
        self.skeleton.as_ref()
    }

    pub fn set_listener<L: AnimEventListener + 'static>(&mut self, listener: L) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Starts `clip` from frame 0, cancelling any cross-fade.
    pub fn play(&mut self, clip: Arc<AnimationClip>, looped: bool) {
        let cursor = PlaybackCursor::new(clip, looped, &self.root_setup());
        self.current = Some(cursor);
        self.target = None;
        self.blend_frames = 0.0;
        self.root_delta = Vec3::ZERO;
        self.root_rotation_delta = Quat::IDENTITY;
        self.invalid_reported = false;

        if self.is_valid() {
            self.evaluate();
        } else {
            self.report_invalid();
        }
    }

    /// Cross-fades to `clip` over `frames` of the new clip. The current clip keeps advancing
    /// underneath until the fade completes.
    pub fn blend_to(&mut self, clip: Arc<AnimationClip>, frames: f32, looped: bool) {
        if self.current.is_none() || frames.is_nan() || frames <= 0.0 {
            self.play(clip, looped);
            return;
        }
        self.target = Some(PlaybackCursor::new(clip, looped, &self.root_setup()));
        self.blend_frames = frames;
        self.invalid_reported = false;
    }

    pub fn process(&mut self, delta_time: f32) {
        self.fired_events.clear();
        if !self.is_valid() {
            self.report_invalid();
            return;
        }

        if let Some(current) = self.current.as_mut() {
            current.advance(delta_time);
        }
        if let Some(target) = self.target.as_mut() {
            target.advance(delta_time);
            if target.frame > self.blend_frames {
                self.current = self.target.take();
                self.blend_frames = 0.0;
            }
        }

        self.evaluate();
        self.fire_events();
    }

    fn evaluate(&mut self) {
        let Some(skeleton) = self.skeleton.clone() else {
            return;
        };
        let extract_position = self.root_motion_mode != RootMotionMode::Off;
        let extract_rotation = self.root_motion_mode == RootMotionMode::On;

        let Self {
            current,
            target,
            setup,
            pose,
            blend_frames,
            root_delta,
            root_rotation_delta,
            ..
        } = self;
        let Some(current) = current.as_mut() else {
            return;
        };
        let blend_alpha = (*blend_frames > 0.0)
            .then(|| target.as_ref().map(|t| (t.frame / *blend_frames).clamp(0.0, 1.0)))
            .flatten();

        for (bone, setup) in setup.iter().enumerate() {
            let mut local = sample_bone(&current.clip.tracks[bone], current.frame, setup);
            let is_root = bone == 0;

            if is_root && extract_position {
                *root_delta = current.root_position_delta(local.position);
                local.position = setup.position;
            }
            if is_root && extract_rotation {
                *root_rotation_delta = current.root_rotation_delta(local.rotation);
                local.rotation = setup.rotation;
            }

            if let (Some(target), Some(alpha)) = (target.as_mut(), blend_alpha) {
                let mut target_local = sample_bone(&target.clip.tracks[bone], target.frame, setup);

                if is_root && extract_position {
                    let target_delta = target.root_position_delta(target_local.position);
                    *root_delta = root_delta.lerp(target_delta, alpha);
                    target_local.position = setup.position;
                }
                if is_root && extract_rotation {
                    let target_delta = target.root_rotation_delta(target_local.rotation);
                    *root_rotation_delta = root_rotation_delta.slerp(target_delta, alpha);
                    target_local.rotation = setup.rotation;
                }

                local = local.lerp(&target_local, alpha);
            }

            pose.locals[bone] = local;
        }

        if !extract_position {
            *root_delta = Vec3::ZERO;
        }
        if !extract_rotation {
            *root_rotation_delta = Quat::IDENTITY;
        }

        pose.update_world_transforms(&skeleton);
    }

    fn fire_events(&mut self) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        current.collect_events(&mut self.fired_events);
        if let Some(listener) = self.listener.as_mut() {
            for &event in &self.fired_events {
                log::trace!("animation event: {event}");
                listener.on_event(event);
            }
        }
    }

    fn root_setup(&self) -> BoneTransform {
        self.setup.first().copied().unwrap_or_default()
    }

    fn report_invalid(&mut self) {
        if self.invalid_reported {
            return;
        }
        self.invalid_reported = true;

        let Some(skeleton) = self.skeleton.as_ref() else {
            log::debug!("animation player has no skeleton");
            return;
        };
        let bones = skeleton.bone_count();
        for cursor in self.current.iter().chain(self.target.iter()) {
            if cursor.clip.tracks.len() != bones {
                let err = crate::Error::TrackCountMismatch {
                    clip: cursor.clip.name.clone(),
                    tracks: cursor.clip.tracks.len(),
                    bones,
                };
                log::error!("{err}");
            }
        }
    }

    /// Playback only runs with a skeleton and clips whose track count matches its bone count.
    pub fn is_valid(&self) -> bool {
        let Some(skeleton) = self.skeleton.as_ref() else {
            return false;
        };
        let Some(current) = self.current.as_ref() else {
            return false;
        };
        let bones = skeleton.bone_count();
        current.clip.tracks.len() == bones
            && self
                .target
                .as_ref()
                .is_none_or(|t| t.clip.tracks.len() == bones)
    }

    /// The cursor gameplay reasons about: the fade target while blending, else the current one.
    fn active(&self) -> Option<&PlaybackCursor> {
        self.target.as_ref().or(self.current.as_ref())
    }

    /// Translation of the root bone since the previous `process`, in the clip's local space.
    pub fn root_delta(&self) -> Vec3 {
        self.root_delta
    }

    pub fn root_rotation_delta(&self) -> Quat {
        self.root_rotation_delta
    }

    /// Skinning matrices indexed by bone id.
    pub fn final_bone_matrices(&self) -> &[Mat4] {
        self.pose.skinning_matrices()
    }

    pub fn world_matrices(&self) -> &[Mat4] {
        self.pose.world_matrices()
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn root_motion_mode(&self) -> RootMotionMode {
        self.root_motion_mode
    }

    pub fn set_root_motion_mode(&mut self, mode: RootMotionMode) {
        self.root_motion_mode = mode;
    }

    pub fn current_clip(&self) -> Option<&Arc<AnimationClip>> {
        self.active().map(|c| &c.clip)
    }

    pub fn is_animation(&self, name: &str) -> bool {
        self.active().is_some_and(|c| c.clip.name == name)
    }

    pub fn current_frame(&self) -> f32 {
        self.active().map_or(0.0, |c| c.frame)
    }

    /// Frames remaining until the end of the active clip.
    pub fn time_left(&self) -> f32 {
        self.active().map_or(0.0, PlaybackCursor::time_left)
    }

    pub fn is_looping(&self) -> bool {
        self.active().is_some_and(|c| c.looped)
    }

    pub fn set_looping(&mut self, looped: bool) {
        for cursor in self.current.iter_mut().chain(self.target.iter_mut()) {
            cursor.looped = looped;
        }
    }

    pub fn loop_count(&self) -> u32 {
        self.active().map_or(0, |c| c.loop_count)
    }

    pub fn is_blending(&self) -> bool {
        self.target.is_some()
    }

    /// Progress through the current cross-fade in `[0, 1]`.
    pub fn blend_factor(&self) -> Option<f32> {
        let target = self.target.as_ref()?;
        (self.blend_frames > 0.0).then(|| (target.frame / self.blend_frames).clamp(0.0, 1.0))
    }

    pub fn clip_has_root_motion(&self) -> bool {
        self.current.as_ref().is_some_and(|c| c.clip.root_motion)
    }

    /// Events fired by the most recent `process` call.
    pub fn fired_events(&self) -> &[AnimEvent] {
        &self.fired_events
    }
}
