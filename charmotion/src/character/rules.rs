//! Table-driven clip selection.
//!
//! Each character state owns a [`ClipTable`]: rules keyed on the clip currently playing, checked
//! in order every frame. The first rule whose condition holds switches the clip.

use crate::{CharacterAnim, Controller};

/// Per-frame facts a rule condition can test, gathered by the owning state.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RuleInputs {
    /// Frames left on the current clip.
    pub time_left: f32,
    /// Threshold below which `time_left` counts as ending.
    pub ending_frames: f32,
    pub run: bool,
    pub walk: bool,
    pub jump: bool,
    pub reaching: bool,
    pub shimmy_left: bool,
    pub shimmy_right: bool,
    pub climb_up: bool,
}

impl RuleInputs {
    pub fn idle(&self) -> bool {
        !self.run && !self.walk
    }

    pub fn lateral(&self) -> bool {
        self.shimmy_left || self.shimmy_right
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Condition {
    Always,
    /// Fewer than `ending_frames` frames left.
    Ending,
    /// Fewer than this many frames left.
    TimeLeftBelow(f32),
    Run,
    Walk,
    Idle,
    Jump,
    Reaching,
    ShimmyLeft,
    ShimmyRight,
    NoLateral,
    ClimbUp,
}

impl Condition {
    pub fn holds(self, inputs: &RuleInputs) -> bool {
        match self {
            Self::Always => true,
            Self::Ending => inputs.time_left < inputs.ending_frames,
            Self::TimeLeftBelow(frames) => inputs.time_left < frames,
            Self::Run => inputs.run,
            Self::Walk => inputs.walk,
            Self::Idle => inputs.idle(),
            Self::Jump => inputs.jump,
            Self::Reaching => inputs.reaching,
            Self::ShimmyLeft => inputs.shimmy_left,
            Self::ShimmyRight => inputs.shimmy_right,
            Self::NoLateral => !inputs.lateral(),
            Self::ClimbUp => inputs.climb_up,
        }
    }
}

/// Where a table sends the character and how.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClipChange {
    pub to: CharacterAnim,
    pub fade_frames: f32,
    pub looped: bool,
}

impl ClipChange {
    pub const fn cut(to: CharacterAnim, looped: bool) -> Self {
        Self {
            to,
            fade_frames: 0.0,
            looped,
        }
    }

    pub const fn fade(to: CharacterAnim, fade_frames: f32, looped: bool) -> Self {
        Self {
            to,
            fade_frames,
            looped,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClipRule {
    pub from: CharacterAnim,
    pub when: Condition,
    pub change: ClipChange,
}

impl ClipRule {
    pub const fn new(from: CharacterAnim, when: Condition, change: ClipChange) -> Self {
        Self { from, when, change }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct ClipTable {
    pub rules: &'static [ClipRule],
    /// Clips that stay put until the state itself moves on.
    pub holds: &'static [CharacterAnim],
    /// Applied to any clip the table has no entry for.
    pub fallback: ClipChange,
}

impl ClipTable {
    /// Whether the table has rules or a hold entry for `anim`.
    pub fn knows(&self, anim: CharacterAnim) -> bool {
        self.holds.contains(&anim) || self.rules.iter().any(|r| r.from == anim)
    }

    /// The change to make this frame, if any.
    pub fn select(&self, current: CharacterAnim, inputs: &RuleInputs) -> Option<ClipChange> {
        if !self.knows(current) {
            return (self.fallback.to != current).then_some(self.fallback);
        }
        self.rules
            .iter()
            .filter(|r| r.from == current)
            .find(|r| r.when.holds(inputs))
            .map(|r| r.change)
    }

    /// Selects and applies a change. A refused change leaves the current clip playing.
    pub fn apply(&self, controller: &mut Controller<'_>, inputs: &RuleInputs) {
        let current = controller.current_anim();
        if let Some(change) = self.select(current, inputs) {
            log::debug!("clip {current} -> {}", change.to);
            // Errors are already logged by the controller.
            let _ = controller.set_animation(change.to, change.fade_frames, change.looped);
        }
    }
}
