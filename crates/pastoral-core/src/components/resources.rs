//! Natural resource nodes: trees, rocks, iron mines and salt deposits.

use pastoral_logic::constants::{health, sizes};
use pastoral_logic::geometry::{Circle, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::agents::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Tree,
    Rock,
    IronMine,
    Salt,
}

impl NodeKind {
    pub fn initial_health(&self) -> u32 {
        match self {
            NodeKind::Tree => health::TREE,
            NodeKind::Rock => health::ROCK,
            NodeKind::IronMine => health::IRON_MINE,
            NodeKind::Salt => health::SALT,
        }
    }

    pub fn yields(&self) -> ResourceKind {
        match self {
            NodeKind::Tree => ResourceKind::Log,
            NodeKind::Rock => ResourceKind::Stone,
            NodeKind::IronMine => ResourceKind::Iron,
            NodeKind::Salt => ResourceKind::Salt,
        }
    }

    pub fn for_resource(kind: ResourceKind) -> Option<NodeKind> {
        match kind {
            ResourceKind::Log => Some(NodeKind::Tree),
            ResourceKind::Stone => Some(NodeKind::Rock),
            ResourceKind::Iron => Some(NodeKind::IronMine),
            ResourceKind::Salt => Some(NodeKind::Salt),
            _ => None,
        }
    }
}

/// A harvestable node, anchored at its center.
#[derive(Debug, Clone, PartialEq)]
pub struct NaturalResource {
    pub kind: NodeKind,
    pub center: Vec2,
    pub health: u32,
}

impl NaturalResource {
    pub fn new(kind: NodeKind, center: Vec2) -> Self {
        Self {
            kind,
            center,
            health: kind.initial_health(),
        }
    }

    fn tree_parts(&self) -> (Rect, Circle) {
        let c = self.center;
        let trunk = Rect::from_center(
            Vec2::new(c.x, c.y + sizes::TREE_TRUNK_HEIGHT / 2.0),
            sizes::TREE_TRUNK_WIDTH,
            sizes::TREE_TRUNK_HEIGHT,
        );
        let crown = Circle::new(
            Vec2::new(c.x, c.y - sizes::TREE_CROWN_RADIUS / 2.0),
            sizes::TREE_CROWN_RADIUS,
        );
        (trunk, crown)
    }

    pub fn bounds(&self) -> Rect {
        match self.kind {
            NodeKind::Tree => {
                let (trunk, crown) = self.tree_parts();
                let cb = crown.bounds();
                let left = trunk.left().min(cb.left());
                let top = trunk.top().min(cb.top());
                let right = trunk.right().max(cb.right());
                let bottom = trunk.bottom().max(cb.bottom());
                Rect::new(left, top, right - left, bottom - top)
            }
            NodeKind::Rock => Circle::new(self.center, sizes::ROCK_RADIUS).bounds(),
            NodeKind::IronMine => {
                Rect::from_center(self.center, sizes::IRON_MINE_WIDTH, sizes::IRON_MINE_HEIGHT)
            }
            NodeKind::Salt => Circle::new(self.center, sizes::SALT_RADIUS).bounds(),
        }
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        match self.kind {
            NodeKind::Tree => {
                let (trunk, crown) = self.tree_parts();
                trunk.contains_point(p) || crown.contains_point(p)
            }
            NodeKind::Rock => Circle::new(self.center, sizes::ROCK_RADIUS).contains_point(p),
            NodeKind::IronMine => self.bounds().contains_point(p),
            NodeKind::Salt => Circle::new(self.center, sizes::SALT_RADIUS).contains_point(p),
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.health == 0
    }

    /// Take one unit. Returns what was taken, or `None` when already depleted.
    pub fn harvest(&mut self) -> Option<ResourceKind> {
        if self.is_depleted() {
            return None;
        }
        self.health -= 1;
        Some(self.kind.yields())
    }
}
