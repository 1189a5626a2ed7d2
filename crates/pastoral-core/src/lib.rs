//! Pastoral Core - Sandbox Simulation Engine
//!
//! A 2D pastoral economy: the player herds sheep, employs villagers at town
//! halls and lays out yards, farms, mills and roads. Workers gather, shear,
//! farm and mill on their own, sleep at night and idle at the town hall when
//! there is nothing to do.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Sheep, humans, structures and natural resources
//! - **Components**: Pure data attached to entities (Sheep, Human, Structure, NaturalResource)
//! - **Systems**: Free functions run in a fixed order by [`engine::Simulation::tick`]
//!
//! Entities refer to each other by `hecs::Entity`; a failed lookup means the
//! target was removed and is handled as "target vanished".
//!
//! # Example
//!
//! ```rust,no_run
//! use pastoral_core::prelude::*;
//!
//! let mut sim = Simulation::with_seed(SimConfig::default(), &WorldSeed::demo())
//!     .expect("demo seed is valid");
//!
//! loop {
//!     sim.tick(1.0 / 60.0); // 60 FPS
//!     let _frame = sim.snapshot();
//! }
//! ```

pub mod collision;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod ledger;
pub mod messages;
pub mod seed;
pub mod snapshot;
pub mod systems;
pub mod world;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::SimConfig;
    pub use crate::engine::{Simulation, TickSummary};
    pub use crate::input::{Command, KeyCode, MenuAction, MenuRequest, MouseButton};
    pub use crate::seed::WorldSeed;
    pub use crate::snapshot::WorldSnapshot;
}
