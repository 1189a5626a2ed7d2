//! Mill system - grinds barley and reports new flour and malt to the ledger

use crate::components::{MillOutput, Structure};
use crate::ledger::Commodity;
use crate::world::WorldState;

/// Run every millstone for `dt`. Returns this tick's total output.
pub fn mill_system(state: &mut WorldState, dt: f32) -> MillOutput {
    let mut total = MillOutput::default();
    for (_, structure) in state.ecs.query_mut::<&mut Structure>() {
        if let Structure::Mill(mill) = structure {
            mill.update(dt);
            let fresh = mill.take_unreported();
            total.flour += fresh.flour;
            total.malt += fresh.malt;
        }
    }
    state.ledger.credit(Commodity::Flour, total.flour);
    state.ledger.credit(Commodity::Malt, total.malt);
    total
}
