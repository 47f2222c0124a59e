//! Tuning values for the character states and the ledge probe.
//!
//! Every struct implements `Default` with the shipped tuning. With the `json` feature each one
//! also deserializes with missing fields falling back to those defaults.

use crate::Error;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default, rename_all = "camelCase"))]
pub struct LocomotionConfig {
    pub run_speed: f32,
    pub walk_speed: f32,
    /// Facing slerp rate, multiplied by the frame delta.
    pub turn_rate: f32,
    /// Input magnitude above which the character walks.
    pub walk_threshold: f32,
    /// Input magnitude above which the character runs.
    pub run_threshold: f32,
    /// Vertical velocity applied on jump take-off.
    pub jump_velocity: f32,
    /// Frames remaining below which a transitional clip counts as ending.
    pub ending_frames: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            run_speed: 3.5,
            walk_speed: 1.355,
            turn_rate: 30.0,
            walk_threshold: 0.1,
            run_threshold: 0.75,
            jump_velocity: 6.0,
            ending_frames: 3.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default, rename_all = "camelCase"))]
pub struct AirConfig {
    /// Search for a ledge with the full height sweep while reaching. When off, a single probe
    /// at `reach_height` and `reach_distance` is used instead.
    pub sweep_reach: bool,
    /// Height above the character origin of the single reach probe.
    pub reach_height: f32,
    /// Length of the single reach probe.
    pub reach_distance: f32,
    /// Forward collider offset while reaching.
    pub reach_collider_offset: f32,
    /// Hang point below the ledge lip.
    pub hang_drop: f32,
    /// Hang point distance out from the wall.
    pub hang_wall_offset: f32,
}

impl Default for AirConfig {
    fn default() -> Self {
        Self {
            sweep_reach: true,
            reach_height: 1.9,
            reach_distance: 1.0,
            reach_collider_offset: 0.25,
            hang_drop: 2.1,
            hang_wall_offset: 0.125,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default, rename_all = "camelCase"))]
pub struct ClimbConfig {
    /// Lateral input magnitude needed to start shimmying.
    pub shimmy_threshold: f32,
    /// Frames left on the climb-up clip at which control returns to locomotion.
    pub exit_frames: f32,
}

impl Default for ClimbConfig {
    fn default() -> Self {
        Self {
            shimmy_threshold: 0.1,
            exit_frames: 5.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default, rename_all = "camelCase"))]
pub struct LedgeProbeConfig {
    pub min_height: f32,
    pub max_height: f32,
    pub height_step: f32,
    /// Length of each forward probe.
    pub reach: f32,
    /// How far past the wall hit the downward probe starts.
    pub down_inset: f32,
    /// How far above the wall hit the downward probe starts.
    pub down_lift: f32,
    pub down_length: f32,
    /// Steepest surface, in degrees from world up, that still counts as a ledge.
    pub max_surface_angle: f32,
}

impl Default for LedgeProbeConfig {
    fn default() -> Self {
        Self {
            min_height: 1.0,
            max_height: 4.0,
            height_step: 0.25,
            reach: 6.0,
            down_inset: 0.1,
            down_lift: 0.2,
            down_length: 0.4,
            max_surface_angle: 10.0,
        }
    }
}

impl LedgeProbeConfig {
    /// Probe heights from `min_height` to `max_height` inclusive. Heights are derived from an
    /// integer step index so the last height is not lost to accumulated rounding.
    pub fn heights(&self) -> impl Iterator<Item = f32> + '_ {
        let steps = if self.height_step > 0.0 && self.max_height >= self.min_height {
            ((self.max_height - self.min_height) / self.height_step + 1e-3).floor() as u32
        } else {
            0
        };
        (0..=steps).map(move |i| self.min_height + i as f32 * self.height_step)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default, rename_all = "camelCase"))]
pub struct CharacterConfig {
    pub locomotion: LocomotionConfig,
    pub air: AirConfig,
    pub climb: ClimbConfig,
    pub ledge_probe: LedgeProbeConfig,
    /// Downward acceleration in m/s^2.
    pub gravity: f32,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            locomotion: LocomotionConfig::default(),
            air: AirConfig::default(),
            climb: ClimbConfig::default(),
            ledge_probe: LedgeProbeConfig::default(),
            gravity: 9.8,
        }
    }
}

impl CharacterConfig {
    #[cfg(feature = "json")]
    pub fn from_json_str(s: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(s).map_err(|e| Error::JsonParse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |message: &str| {
            Err(Error::InvalidValue {
                message: message.to_string(),
            })
        };

        let locomotion = &self.locomotion;
        if !(0.0..=locomotion.run_threshold).contains(&locomotion.walk_threshold) {
            return invalid("walk threshold must be between 0 and the run threshold");
        }
        if locomotion.run_speed < 0.0 || locomotion.walk_speed < 0.0 {
            return invalid("movement speeds must not be negative");
        }
        if self.ledge_probe.height_step <= 0.0 {
            return invalid("ledge probe height step must be > 0");
        }
        if self.ledge_probe.max_height < self.ledge_probe.min_height {
            return invalid("ledge probe max height must not be below min height");
        }
        if !self.gravity.is_finite() {
            return invalid("gravity must be finite");
        }
        Ok(())
    }
}
