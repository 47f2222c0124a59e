mod air;
mod anims;
mod climb;
mod controller;
mod input;
mod ledge;
mod locomotion;
mod machine;
mod physics;
mod rules;

pub use air::*;
pub use anims::*;
pub use climb::*;
pub use controller::*;
pub use input::*;
pub use ledge::*;
pub use locomotion::*;
pub use machine::*;
pub use physics::*;
pub use rules::*;

#[cfg(test)]
mod test_world;




#[cfg(test)]
mod locomotion_tests;

#[cfg(test)]
mod machine_tests;
