//! Cleanup system - removes resources that have been harvested to nothing

use hecs::Entity;

use crate::components::NaturalResource;
use crate::world::WorldState;

/// Despawn every depleted resource. Returns how many were removed.
pub fn cleanup_system(state: &mut WorldState) -> usize {
    let depleted: Vec<Entity> = state
        .ecs
        .query::<&NaturalResource>()
        .iter()
        .filter(|(_, r)| r.is_depleted())
        .map(|(e, _)| e)
        .collect();
    for id in &depleted {
        let _ = state.ecs.despawn(*id);
    }
    if !depleted.is_empty() {
        log::debug!("removed {} depleted resources", depleted.len());
    }
    depleted.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::NodeKind;
    use crate::config::SimConfig;
    use pastoral_logic::geometry::Vec2;

    #[test]
    fn test_only_depleted_resources_removed() {
        let mut state = WorldState::new(SimConfig::default());
        let live =
            state.spawn_resource(NaturalResource::new(NodeKind::Rock, Vec2::new(300.0, 300.0)));
        let mut dead = NaturalResource::new(NodeKind::Tree, Vec2::new(500.0, 300.0));
        dead.health = 0;
        let dead = state.spawn_resource(dead);
        assert_eq!(cleanup_system(&mut state), 1);
        assert!(state.ecs.contains(live));
        assert!(!state.ecs.contains(dead));
    }
}
