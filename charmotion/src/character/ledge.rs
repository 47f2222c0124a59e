//! Raycast search for a climbable ledge lip in front of the character.
//!
//! A forward ray finds a wall, then a short downward ray just past the wall hit checks that the
//! top surface is flat enough to hang from.

use crate::{CharacterPhysics, LedgeProbeConfig, Ray};
use glam::Vec3;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LedgeHit {
    /// Point on the lip: the wall hit horizontally, the top surface vertically.
    pub position: Vec3,
    /// Direction into the wall.
    pub forward: Vec3,
    /// Wall normal at the forward hit.
    pub normal: Vec3,
    /// Probe height, relative to the character origin, that found the ledge.
    pub probe_height: f32,
}

/// Probes once from `height` above `position` along `direction`, whose length is the reach.
pub fn probe_ledge(
    physics: &dyn CharacterPhysics,
    position: Vec3,
    height: f32,
    direction: Vec3,
    config: &LedgeProbeConfig,
) -> Option<LedgeHit> {
    let origin = position + Vec3::Y * height;
    let wall = physics.raycast(&Ray::new(origin, direction))?;

    let inward = direction.normalize_or_zero();
    let down_origin = wall.point + inward * config.down_inset + Vec3::Y * config.down_lift;
    let down = Ray::new(down_origin, Vec3::NEG_Y * config.down_length);
    let Some(top) = physics.raycast(&down) else {
        log::trace!("ledge probe: wall at {} has no top surface", wall.point);
        return None;
    };

    let angle = Vec3::Y.angle_between(top.normal).to_degrees();
    if angle >= config.max_surface_angle {
        log::trace!("ledge probe: surface at {} too steep ({angle:.1} deg)", top.point);
        return None;
    }

    Some(LedgeHit {
        position: Vec3::new(wall.point.x, top.point.y, wall.point.z),
        forward: -wall.normal,
        normal: wall.normal,
        probe_height: height,
    })
}

/// Sweeps [`probe_ledge`] upward over the configured heights from `position`, facing
/// `direction`. The lowest qualifying height wins.
pub fn find_ledge(
    physics: &dyn CharacterPhysics,
    position: Vec3,
    direction: Vec3,
    config: &LedgeProbeConfig,
) -> Option<LedgeHit> {
    let reach = direction.normalize_or_zero() * config.reach;
    let found = config
        .heights()
        .find_map(|height| probe_ledge(physics, position, height, reach, config));
    if found.is_none() {
        log::trace!("ledge probe: nothing found from {position}");
    }
    found
}
