use glam::Vec2;

/// Gameplay input for one frame, already mapped from devices.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    /// Movement stick: `x` is right, `y` is forward. Values may exceed unit length for keyboards.
    pub movement: Vec2,
    pub walk: bool,
    pub jump: bool,
    pub reach: bool,
    pub climb_up: bool,
}

impl InputSnapshot {
    pub fn moving(movement: Vec2) -> Self {
        Self {
            movement,
            ..Self::default()
        }
    }
}
