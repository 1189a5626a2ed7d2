//! Systems - logic that runs once per tick over the world state

mod behavior;
mod cleanup;
mod day;
mod employment;
mod happiness;
mod harvest;
mod mill;
mod movement;
mod player;
mod reproduction;
mod sheep;

pub use behavior::*;
pub use cleanup::*;
pub use day::*;
pub use employment::*;
pub use happiness::*;
pub use harvest::*;
pub use mill::*;
pub use movement::*;
pub use player::*;
pub use reproduction::*;
pub use sheep::*;
