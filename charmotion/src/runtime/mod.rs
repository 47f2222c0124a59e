mod anim_player;
mod animation;
mod pose;
mod state_graph;

pub use anim_player::*;
pub use animation::*;
pub use pose::*;
pub use state_graph::*;

#[cfg(test)]
mod animation_tests;

#[cfg(test)]
mod pose_tests;
