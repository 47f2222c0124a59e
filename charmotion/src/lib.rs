//! Skeletal animation playback and a gameplay character controller built on top of it.
//!
//! The crate is renderer- and physics-agnostic. Skinning matrices are handed to the renderer as a
//! slice, and the physics engine is reached through the [`CharacterPhysics`] trait.

#![forbid(unsafe_code)]

mod assets;
mod character;
mod config;
mod error;
mod model;
mod runtime;

#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "binary")]
pub mod binary;

pub use assets::*;
pub use character::*;
pub use config::*;
pub use error::*;
pub use model::*;
pub use runtime::*;


#[cfg(test)]
mod config_tests;
