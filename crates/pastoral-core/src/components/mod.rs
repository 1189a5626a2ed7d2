//! ECS components: pure data attached to entities.

mod agents;
mod resources;
mod structures;

pub use agents::*;
pub use resources::*;
pub use structures::*;
