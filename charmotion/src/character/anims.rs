use crate::{AnimationClip, AssetHandle, AssetSource, ClipCache, Error};
use std::sync::Arc;

/// Every clip the character state machine knows how to play.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CharacterAnim {
    // Locomotion
    Idle,
    RunStart,
    Run,
    RunStopL,
    RunStopR,
    WalkStart,
    Walk,
    RunToJumpL,
    RunToJumpR,
    RunTurnL,
    RunTurnR,
    FallToRun,

    // Air
    RunJumpL,
    RunJumpR,
    JumpToFall,
    Fall,
    JumpToReach,
    Reach,

    // Climb
    /// Grab with open air below the hands.
    GrabLedge,
    /// Grab with a wall in front of the legs.
    GrabWall,
    HangLoop,
    ShimmyLeft,
    ShimmyRight,
    ClimbUp,
}

impl CharacterAnim {
    pub const COUNT: usize = 24;

    pub const ALL: [CharacterAnim; Self::COUNT] = [
        Self::Idle,
        Self::RunStart,
        Self::Run,
        Self::RunStopL,
        Self::RunStopR,
        Self::WalkStart,
        Self::Walk,
        Self::RunToJumpL,
        Self::RunToJumpR,
        Self::RunTurnL,
        Self::RunTurnR,
        Self::FallToRun,
        Self::RunJumpL,
        Self::RunJumpR,
        Self::JumpToFall,
        Self::Fall,
        Self::JumpToReach,
        Self::Reach,
        Self::GrabLedge,
        Self::GrabWall,
        Self::HangLoop,
        Self::ShimmyLeft,
        Self::ShimmyRight,
        Self::ClimbUp,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::RunStart => "runStart",
            Self::Run => "run",
            Self::RunStopL => "runStopL",
            Self::RunStopR => "runStopR",
            Self::WalkStart => "walkStart",
            Self::Walk => "walk",
            Self::RunToJumpL => "runToJumpL",
            Self::RunToJumpR => "runToJumpR",
            Self::RunTurnL => "runTurnL",
            Self::RunTurnR => "runTurnR",
            Self::FallToRun => "fallToRun",
            Self::RunJumpL => "runJumpL",
            Self::RunJumpR => "runJumpR",
            Self::JumpToFall => "jumpToFall",
            Self::Fall => "fall",
            Self::JumpToReach => "jumpToReach",
            Self::Reach => "reach",
            Self::GrabLedge => "grabLedge",
            Self::GrabWall => "grabWall",
            Self::HangLoop => "hangLoop",
            Self::ShimmyLeft => "shimmyLeft",
            Self::ShimmyRight => "shimmyRight",
            Self::ClimbUp => "climbUp",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }
}

impl std::fmt::Display for CharacterAnim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The clips bound to each [`CharacterAnim`] for one character. Several ids may share a clip.
#[derive(Clone, Debug, Default)]
pub struct AnimationSet {
    clips: [Option<Arc<AnimationClip>>; CharacterAnim::COUNT],
    handles: Vec<AssetHandle<AnimationClip>>,
}

impl AnimationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, anim: CharacterAnim, clip: Arc<AnimationClip>) {
        self.clips[anim.index()] = Some(clip);
    }

    pub fn get(&self, anim: CharacterAnim) -> Option<&Arc<AnimationClip>> {
        self.clips[anim.index()].as_ref()
    }

    /// Ids with no clip bound.
    pub fn missing(&self) -> impl Iterator<Item = CharacterAnim> + '_ {
        CharacterAnim::ALL
            .into_iter()
            .filter(|a| self.clips[a.index()].is_none())
    }

    /// Loads `name` through the cache and binds it to `anim`. The cache reference is held until
    /// [`AnimationSet::release`].
    pub fn load<S>(
        &mut self,
        anim: CharacterAnim,
        name: &str,
        cache: &mut ClipCache,
        source: &mut S,
    ) -> Result<(), Error>
    where
        S: AssetSource<AnimationClip> + ?Sized,
    {
        let handle = cache.load(name, source)?;
        let clip = cache.get(handle).ok_or(Error::StaleHandle)?;
        self.handles.push(handle);
        self.bind(anim, clip);
        Ok(())
    }

    /// Unbinds every clip and returns the cache references taken by [`AnimationSet::load`].
    pub fn release(&mut self, cache: &mut ClipCache) {
        for handle in self.handles.drain(..) {
            if let Err(err) = cache.release(handle) {
                log::warn!("releasing animation: {err}");
            }
        }
        self.clips = Default::default();
    }
}
