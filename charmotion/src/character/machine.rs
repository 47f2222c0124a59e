use crate::{
    AirState, CharacterAnim, CharacterData, CharacterPhysics, ClimbState, Controller,
    InputSnapshot, LocomotionState, StateEvent,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CharacterStateKind {
    Locomotion,
    Air,
    Climb,
}

/// The active character state and its transient data.
#[derive(Clone, Debug)]
pub enum CharacterState {
    Locomotion(LocomotionState),
    Air(AirState),
    Climb(ClimbState),
}

impl CharacterState {
    pub fn kind(&self) -> CharacterStateKind {
        match self {
            Self::Locomotion(_) => CharacterStateKind::Locomotion,
            Self::Air(_) => CharacterStateKind::Air,
            Self::Climb(_) => CharacterStateKind::Climb,
        }
    }

    fn begin(&mut self, c: &mut Controller<'_>) {
        match self {
            Self::Locomotion(s) => s.begin(c),
            Self::Air(s) => s.begin(c),
            Self::Climb(s) => s.begin(c),
        }
    }

    fn exit(&mut self, c: &mut Controller<'_>) {
        match self {
            Self::Locomotion(s) => s.exit(c),
            Self::Air(s) => s.exit(c),
            Self::Climb(s) => s.exit(c),
        }
    }

    fn pre_physics(&mut self, c: &mut Controller<'_>, dt: f32) {
        match self {
            Self::Locomotion(s) => s.pre_physics(c, dt),
            Self::Air(s) => s.pre_physics(c, dt),
            Self::Climb(s) => s.pre_physics(c, dt),
        }
    }

    fn pre_animation(&mut self, c: &mut Controller<'_>, input: &InputSnapshot, dt: f32) {
        match self {
            Self::Locomotion(s) => s.pre_animation(c, input, dt),
            Self::Air(s) => s.pre_animation(c, input, dt),
            Self::Climb(s) => s.pre_animation(c, input, dt),
        }
    }

    fn update_animation(&mut self, c: &mut Controller<'_>, dt: f32) {
        match self {
            Self::Locomotion(s) => s.update_animation(c, dt),
            Self::Air(s) => s.update_animation(c, dt),
            Self::Climb(s) => s.update_animation(c, dt),
        }
    }

    fn post_animation(&mut self, c: &mut Controller<'_>, dt: f32) {
        match self {
            Self::Locomotion(s) => s.post_animation(c, dt),
            Self::Air(s) => s.post_animation(c, dt),
            Self::Climb(s) => s.post_animation(c, dt),
        }
    }

    fn post_physics(&mut self, c: &mut Controller<'_>, dt: f32) {
        match self {
            Self::Locomotion(s) => s.post_physics(c, dt),
            Self::Air(s) => s.post_physics(c, dt),
            Self::Climb(s) => s.post_physics(c, dt),
        }
    }

    /// `None` keeps the current state.
    fn should_transition(&mut self, c: &mut Controller<'_>) -> Option<CharacterStateKind> {
        match self {
            Self::Locomotion(s) => s.should_transition(c),
            Self::Air(s) => s.should_transition(c),
            Self::Climb(s) => s.should_transition(c),
        }
    }
}

pub trait CharacterStateListener {
    fn on_event(&mut self, state: CharacterStateKind, event: StateEvent);
}

impl<F: FnMut(CharacterStateKind, StateEvent)> CharacterStateListener for F {
    fn on_event(&mut self, state: CharacterStateKind, event: StateEvent) {
        self(state, event)
    }
}

/// Drives one character through the per-frame protocol:
///
/// 1. pre-physics queries
/// 2. state transition check (exit old, begin new)
/// 3. input and intent
/// 4. clip selection, then the animation player advances and its events are applied
/// 5. final velocity from root motion or input
/// 6. the capsule controller step
/// 7. post-physics queries
pub struct CharacterStateMachine {
    state: CharacterState,
    started: bool,
    listener: Option<Box<dyn CharacterStateListener>>,
}

impl Default for CharacterStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CharacterStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterStateMachine")
            .field("state", &self.state)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl CharacterStateMachine {
    pub fn new() -> Self {
        Self {
            state: CharacterState::Locomotion(LocomotionState::default()),
            started: false,
            listener: None,
        }
    }

    pub fn set_listener<L: CharacterStateListener + 'static>(&mut self, listener: L) {
        self.listener = Some(Box::new(listener));
    }

    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    pub fn kind(&self) -> CharacterStateKind {
        self.state.kind()
    }

    /// Puts the character in locomotion, idling. Called by the first [`update`] if needed.
    ///
    /// [`update`]: CharacterStateMachine::update
    pub fn start(&mut self, data: &mut CharacterData, physics: &mut dyn CharacterPhysics) {
        let mut controller = Controller::new(data, physics);
        let _ = controller.set_animation(CharacterAnim::Idle, 0.0, true);
        self.state = CharacterState::Locomotion(LocomotionState::default());
        self.state.begin(&mut controller);
        self.notify(StateEvent::Begin);
        self.started = true;
    }

    pub fn update(
        &mut self,
        data: &mut CharacterData,
        physics: &mut dyn CharacterPhysics,
        input: &InputSnapshot,
        delta_time: f32,
    ) {
        if !self.started {
            self.start(data, physics);
        }
        let mut controller = Controller::new(data, physics);

        self.state.pre_physics(&mut controller, delta_time);
        if let Some(next) = self.state.should_transition(&mut controller) {
            self.transition(next, &mut controller);
        }

        self.state.pre_animation(&mut controller, input, delta_time);
        self.state.update_animation(&mut controller, delta_time);
        controller.process_animation(delta_time);
        self.state.post_animation(&mut controller, delta_time);

        controller.step_physics(delta_time);
        self.state.post_physics(&mut controller, delta_time);
    }

    fn transition(&mut self, next: CharacterStateKind, controller: &mut Controller<'_>) {
        log::debug!("character state {:?} -> {next:?}", self.state.kind());

        let jump_ledge = match &self.state {
            CharacterState::Locomotion(s) => s.jump_ledge(),
            _ => None,
        };

        self.state.exit(controller);
        self.notify(StateEvent::Exit);

        self.state = match next {
            CharacterStateKind::Locomotion => {
                CharacterState::Locomotion(LocomotionState::default())
            }
            CharacterStateKind::Air => CharacterState::Air(AirState::with_jump_ledge(jump_ledge)),
            CharacterStateKind::Climb => CharacterState::Climb(ClimbState::default()),
        };
        self.state.begin(controller);
        self.notify(StateEvent::Begin);
    }

    fn notify(&mut self, event: StateEvent) {
        let kind = self.state.kind();
        if let Some(listener) = self.listener.as_mut() {
            listener.on_event(kind, event);
        }
    }
}
