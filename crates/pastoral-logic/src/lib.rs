//! Pure simulation logic for the pastoral sandbox.
//!
//! This crate contains the parts of the simulation that do not need an
//! entity store: geometry, the road-biased pathfinder, the day clock,
//! placement rules and a few layout helpers. Functions take plain data and
//! return results, which keeps them unit-testable and lets the engine crate
//! feed them from whatever storage it uses.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Screen layout, speeds, sizes, timers, capacities |
//! | [`day_cycle`] | Day clock, dusk/dawn transition, darkness overlay, time of day |
//! | [`geometry`] | Points, rectangles, circles, segment sampling |
//! | [`grazing`] | Pen-side tests used to validate graze targets |
//! | [`happiness`] | Per-tick happiness update formula |
//! | [`layout`] | Harvest ring positions and millstone grain slots |
//! | [`pathfinding`] | Greedy next-waypoint selection biased toward roads |
//! | [`placement`] | Build-mode placement validity |

pub mod constants;
pub mod day_cycle;
pub mod geometry;
pub mod grazing;
pub mod happiness;
pub mod layout;
pub mod pathfinding;
pub mod placement;
