use crate::{AnimPlayer, AnimationClip, Error};
use std::sync::Arc;

/// How a transition hands over to the next state's clip.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Fade {
    Cut,
    /// Cross-fade over the given number of frames of the incoming clip.
    Blend(f32),
}

pub type TransitionCondition = Box<dyn Fn(&AnimPlayer) -> bool>;

pub struct GraphTransition {
    pub next_state: usize,
    pub condition: TransitionCondition,
    pub fade: Fade,
}

impl GraphTransition {
    pub fn new<F>(next_state: usize, fade: Fade, condition: F) -> Self
    where
        F: Fn(&AnimPlayer) -> bool + 'static,
    {
        Self {
            next_state,
            condition: Box::new(condition),
            fade,
        }
    }
}

impl std::fmt::Debug for GraphTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphTransition")
            .field("next_state", &self.next_state)
            .field("fade", &self.fade)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct GraphState {
    pub name: String,
    pub clip: Arc<AnimationClip>,
    pub looped: bool,
    pub transitions: Vec<GraphTransition>,
}

impl GraphState {
    pub fn new(name: impl Into<String>, clip: Arc<AnimationClip>, looped: bool) -> Self {
        Self {
            name: name.into(),
            clip,
            looped,
            transitions: Vec::new(),
        }
    }

    pub fn with_transition(mut self, transition: GraphTransition) -> Self {
        self.transitions.push(transition);
        self
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StateEvent {
    Begin,
    Exit,
}

pub trait StateGraphListener {
    fn on_event(&mut self, state: usize, name: &str, event: StateEvent);
}

impl<F: FnMut(usize, &str, StateEvent)> StateGraphListener for F {
    fn on_event(&mut self, state: usize, name: &str, event: StateEvent) {
        self(state, name, event)
    }
}

/// Data-driven state graph over an [`AnimPlayer`].
///
/// Each state plays one clip and owns an ordered list of guarded transitions. At most one
/// transition is taken per [`AnimStateGraph::update`].
pub struct AnimStateGraph {
    player: AnimPlayer,
    states: Vec<GraphState>,
    current: usize,
    listener: Option<Box<dyn StateGraphListener>>,
}

impl AnimStateGraph {
    pub fn new(player: AnimPlayer) -> Self {
        Self {
            player,
            states: Vec::new(),
            current: 0,
            listener: None,
        }
    }

    pub fn add_state(&mut self, state: GraphState) -> usize {
        self.states.push(state);
        self.states.len() - 1
    }

    pub fn states(&self) -> &[GraphState] {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut [GraphState] {
        &mut self.states
    }

    pub fn find_state(&self, name: &str) -> Option<usize> {
        self.states.iter().position(|s| s.name == name)
    }

    pub fn current_state(&self) -> usize {
        self.current
    }

    pub fn current_state_name(&self) -> Option<&str> {
        self.states.get(self.current).map(|s| s.name.as_str())
    }

    pub fn player(&self) -> &AnimPlayer {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut AnimPlayer {
        &mut self.player
    }

    pub fn set_listener<L: StateGraphListener + 'static>(&mut self, listener: L) {
        self.listener = Some(Box::new(listener));
    }

    /// Enters state 0. Does nothing on an empty graph.
    pub fn begin(&mut self) {
        let Some(state) = self.states.first() else {
            return;
        };
        self.current = 0;
        self.player.play(state.clip.clone(), state.looped);
        self.notify(0, StateEvent::Begin);
    }

    pub fn update(&mut self, delta_time: f32) {
        let taken = self.states.get(self.current).and_then(|state| {
            state
                .transitions
                .iter()
                .find(|t| (t.condition)(&self.player))
                .map(|t| (t.next_state, t.fade))
        });
        if let Some((next, fade)) = taken {
            if let Err(err) = self.go_to(next, fade) {
                log::error!("state graph transition refused: {err}");
            }
        }
        self.player.process(delta_time);
    }

    /// Switches to `index`, firing exit on the current state and begin on the new one.
    pub fn go_to(&mut self, index: usize, fade: Fade) -> Result<(), Error> {
        let count = self.states.len();
        let Some(next) = self.states.get(index) else {
            return Err(Error::InvalidStateIndex { index, count });
        };
        let (clip, looped) = (next.clip.clone(), next.looped);

        let previous = self.current;
        self.notify(previous, StateEvent::Exit);
        self.current = index;
        log::debug!(
            "state graph: {} -> {}",
            self.states[previous].name,
            self.states[index].name
        );

        match fade {
            Fade::Blend(frames) => self.player.blend_to(clip, frames, looped),
            Fade::Cut => self.player.play(clip, looped),
        }
        self.notify(index, StateEvent::Begin);
        Ok(())
    }

    fn notify(&mut self, index: usize, event: StateEvent) {
        let (Some(listener), Some(state)) = (self.listener.as_mut(), self.states.get(index)) else {
            return;
        };
        listener.on_event(index, &state.name, event);
    }
}
