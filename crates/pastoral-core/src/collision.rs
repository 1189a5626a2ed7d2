//! Per-tick collision view of the world.
//!
//! Solid structure shapes and agent positions are gathered once at the start
//! of a tick. Systems test proposed moves against this snapshot and keep the
//! crowd positions current as agents move.

use hecs::{Entity, World};
use pastoral_logic::constants::{sizes, speeds::ROAD_SPEED_MULTIPLIER, FPS};
use pastoral_logic::geometry::{Rect, Shape, Vec2};
use pastoral_logic::pathfinding::{road_under, RoadSegment};

use crate::components::{Human, Sheep, Structure};

/// Solid shapes of every colliding structure.
#[derive(Debug, Clone, Default)]
pub struct Colliders {
    shapes: Vec<(Entity, Shape)>,
}

fn shape_overlaps_rect(shape: &Shape, rect: &Rect) -> bool {
    match shape {
        Shape::Rect(r) => r.overlaps(rect),
        Shape::Circle(c) => rect.distance_to_point(c.center) < c.radius,
    }
}

impl Colliders {
    pub fn gather(world: &World) -> Self {
        let mut shapes: Vec<(Entity, Shape)> = world
            .query::<&Structure>()
            .iter()
            .flat_map(|(e, s)| s.solid_shapes().into_iter().map(move |shape| (e, shape)))
            .collect();
        shapes.sort_by_key(|(e, _)| e.to_bits());
        Self { shapes }
    }

    /// Structures whose solid shapes contain `p`.
    pub fn containing(&self, p: Vec2) -> Vec<Entity> {
        let mut found: Vec<Entity> = self
            .shapes
            .iter()
            .filter(|(_, s)| s.contains_point(p))
            .map(|(e, _)| *e)
            .collect();
        found.dedup();
        found
    }

    /// Structures whose solid shapes overlap `rect`.
    pub fn overlapping(&self, rect: &Rect) -> Vec<Entity> {
        let mut found: Vec<Entity> = self
            .shapes
            .iter()
            .filter(|(_, s)| shape_overlaps_rect(s, rect))
            .map(|(e, _)| *e)
            .collect();
        found.dedup();
        found
    }

    pub fn point_blocked(&self, p: Vec2, ignore: &[Entity]) -> bool {
        self.shapes
            .iter()
            .any(|(e, s)| !ignore.contains(e) && s.contains_point(p))
    }

    /// Whether moving a body from `from` to `to` runs into a structure.
    ///
    /// Structures the body already overlaps at `from` are skipped so agents
    /// can walk out of buildings they stand in.
    pub fn move_blocked(&self, from: &Rect, to: &Rect, ignore: &[Entity]) -> bool {
        self.shapes.iter().any(|(e, s)| {
            !ignore.contains(e) && shape_overlaps_rect(s, to) && !shape_overlaps_rect(s, from)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Agent centers of one kind with their separation radius.
#[derive(Debug, Clone)]
pub struct Crowd {
    radius: f32,
    members: Vec<(Entity, Vec2)>,
}

impl Crowd {
    pub fn new(radius: f32, mut members: Vec<(Entity, Vec2)>) -> Self {
        members.sort_by_key(|(e, _)| e.to_bits());
        Self { radius, members }
    }

    pub fn humans(world: &World) -> Self {
        Self::new(
            sizes::HUMAN_COLLISION_RADIUS,
            world
                .query::<&Human>()
                .iter()
                .map(|(e, h)| (e, h.center()))
                .collect(),
        )
    }

    pub fn sheep(world: &World) -> Self {
        Self::new(
            sizes::SHEEP_COLLISION_RADIUS,
            world
                .query::<&Sheep>()
                .iter()
                .map(|(e, s)| (e, s.center()))
                .collect(),
        )
    }

    /// A move is refused when it ends inside another member's radius and
    /// closer to that member than before.
    pub fn conflicts(&self, id: Entity, from: Vec2, to: Vec2) -> bool {
        self.members.iter().any(|(other, p)| {
            *other != id && to.distance(p) < self.radius && to.distance(p) < from.distance(p)
        })
    }

    /// Nearest other member within the radius of `at`.
    pub fn nearest_neighbor(&self, id: Entity, at: Vec2) -> Option<Vec2> {
        self.members
            .iter()
            .filter(|(other, p)| *other != id && at.distance(p) < self.radius)
            .map(|(_, p)| *p)
            .min_by(|a, b| a.distance(&at).total_cmp(&b.distance(&at)))
    }

    pub fn update(&mut self, id: Entity, pos: Vec2) {
        match self.members.iter_mut().find(|(e, _)| *e == id) {
            Some(member) => member.1 = pos,
            None => self.members.push((id, pos)),
        }
    }

    pub fn remove(&mut self, id: Entity) {
        self.members.retain(|(e, _)| *e != id);
    }
}

/// Everything the movement helpers need during one tick.
pub struct Frame {
    pub dt: f32,
    pub colliders: Colliders,
    pub roads: Vec<RoadSegment>,
    pub humans: Crowd,
    pub sheep: Crowd,
}

impl Frame {
    pub fn new(world: &World, roads: Vec<RoadSegment>, dt: f32) -> Self {
        Self {
            dt,
            colliders: Colliders::gather(world),
            roads,
            humans: Crowd::humans(world),
            sheep: Crowd::sheep(world),
        }
    }

    /// Pixels covered this frame at `speed` (px per 60 Hz frame).
    pub fn step_length(&self, speed: f32) -> f32 {
        speed * self.dt * FPS
    }

    /// Human step length, boosted on roads.
    pub fn human_step(&self, speed: f32, at: Vec2) -> f32 {
        let base = self.step_length(speed);
        if road_under(at, &self.roads, None).is_some() {
            base * ROAD_SPEED_MULTIPLIER
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Hut, StorageYard, YardKind};

    #[test]
    fn test_gather_skips_salt_yard() {
        let mut world = World::new();
        let salt = StorageYard::new(YardKind::Salt, Vec2::new(100.0, 100.0), 0);
        world.spawn((Structure::Storage(salt),));
        let hut = world.spawn((Structure::Hut(Hut::new(Vec2::new(400.0, 400.0))),));
        let colliders = Colliders::gather(&world);
        assert!(!colliders.point_blocked(Vec2::new(140.0, 130.0), &[]));
        assert!(colliders.point_blocked(Vec2::new(400.0, 400.0), &[]));
        assert!(!colliders.point_blocked(Vec2::new(400.0, 400.0), &[hut]));
    }

    #[test]
    fn test_agents_can_leave_a_building_they_stand_in() {
        let mut world = World::new();
        world.spawn((Structure::Hut(Hut::new(Vec2::new(400.0, 400.0))),));
        let colliders = Colliders::gather(&world);
        let inside = Rect::from_center(Vec2::new(400.0, 400.0), 20.0, 20.0);
        let out = Rect::from_center(Vec2::new(405.0, 400.0), 20.0, 20.0);
        let outside = Rect::from_center(Vec2::new(440.0, 400.0), 20.0, 20.0);
        let touching = Rect::from_center(Vec2::new(420.0, 400.0), 20.0, 20.0);
        assert!(!colliders.move_blocked(&inside, &out, &[]));
        assert!(colliders.move_blocked(&outside, &touching, &[]));
    }

    #[test]
    fn test_crowd_allows_moving_apart() {
        let a = Entity::from_bits(1 << 32 | 1).unwrap();
        let b = Entity::from_bits(1 << 32 | 2).unwrap();
        let crowd = Crowd::new(
            22.0,
            vec![(a, Vec2::new(100.0, 100.0)), (b, Vec2::new(110.0, 100.0))],
        );
        assert!(!crowd.conflicts(a, Vec2::new(100.0, 100.0), Vec2::new(95.0, 100.0)));
        assert!(crowd.conflicts(a, Vec2::new(100.0, 100.0), Vec2::new(104.0, 100.0)));
        assert_eq!(
            crowd.nearest_neighbor(a, Vec2::new(100.0, 100.0)),
            Some(Vec2::new(110.0, 100.0))
        );
    }
}
