//! Agent components: sheep, humans and the per-human activity state.

use hecs::Entity;
use pastoral_logic::constants::sizes;
use pastoral_logic::geometry::{Rect, Vec2};
use pastoral_logic::pathfinding::RoadId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheepState {
    Follow,
    Stay,
    GenderSeparate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HumanState {
    Follow,
    Stay,
    Harvest,
    Employed,
    Wander,
    Sleep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Job {
    Lumberjack,
    Miner,
    Stoneworker,
    Saltworker,
    Shearer,
    BarleyFarmer,
    Miller,
}

impl Job {
    pub const ALL: [Job; 7] = [
        Job::Lumberjack,
        Job::Miner,
        Job::Stoneworker,
        Job::Saltworker,
        Job::Shearer,
        Job::BarleyFarmer,
        Job::Miller,
    ];

    /// Resource a gathering job produces, for the four yard-backed jobs.
    pub fn gathered_resource(&self) -> Option<ResourceKind> {
        match self {
            Job::Lumberjack => Some(ResourceKind::Log),
            Job::Miner => Some(ResourceKind::Iron),
            Job::Stoneworker => Some(ResourceKind::Stone),
            Job::Saltworker => Some(ResourceKind::Salt),
            _ => None,
        }
    }
}

/// A unit of something a human can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Log,
    Stone,
    Iron,
    Salt,
    Wool,
    Barley,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheep {
    /// Top-left corner of the body oval.
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub gender: Gender,
    pub state: SheepState,
    pub selected: bool,
    pub graze_timer: f32,
    pub graze_target: Option<Vec2>,
    pub has_wool: bool,
    pub wool_sheared_on_day: Option<u32>,
}

impl Sheep {
    pub fn new(pos: Vec2, gender: Gender, graze_timer: f32) -> Self {
        Self {
            pos,
            width: sizes::SHEEP_WIDTH,
            height: sizes::SHEEP_HEIGHT,
            gender,
            state: SheepState::Stay,
            selected: false,
            graze_timer,
            graze_target: None,
            has_wool: true,
            wool_sheared_on_day: None,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.width / 2.0, self.pos.y + self.height / 2.0)
    }

    pub fn set_center(&mut self, c: Vec2) {
        self.pos = Vec2::new(c.x - self.width / 2.0, c.y - self.height / 2.0);
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    pub fn body_at(&self, center: Vec2) -> Rect {
        Rect::from_center(center, self.width, self.height)
    }
}

// ── Human activities ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WanderPhase {
    Resting { remaining: f32 },
    Moving { target: Vec2, elapsed: f32, duration: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SleepTask {
    /// Home hut or nearest town hall; `None` sleeps on the spot.
    pub target: Option<Entity>,
    pub asleep: bool,
    /// Work interrupted by nightfall, picked up again at dawn.
    pub resume: Option<Box<Activity>>,
}

/// Gather-and-deliver task shared by manual harvest, the four yard jobs
/// and shearing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkTask {
    /// Resource node or sheep; `None` once only the delivery is left.
    pub target: Option<Entity>,
    pub building: Option<Entity>,
    pub resource: ResourceKind,
    pub stand: Vec2,
    pub timer: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FarmTask {
    pub farm: Entity,
    pub plot: Option<usize>,
    pub silo: Option<Entity>,
    pub timer: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MillWander {
    pub target: Vec2,
    pub remaining: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MillTask {
    pub mill: Entity,
    pub silo: Option<Entity>,
    pub wander: Option<MillWander>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DowntimeTask {
    pub hall: Option<Entity>,
    pub arrived: bool,
    pub target: Option<Vec2>,
}

/// What a human is doing right now. Only the scratch data of the current
/// activity exists at any time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Activity {
    #[default]
    Idle,
    Wander(WanderPhase),
    Sleep(SleepTask),
    Gather(WorkTask),
    Farm(FarmTask),
    Mill(MillTask),
    Downtime(DowntimeTask),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Human {
    /// Top-left corner of the body square.
    pub pos: Vec2,
    pub size: f32,
    pub gender: Gender,
    pub name: String,
    pub state: HumanState,
    pub selected: bool,
    pub job: Option<Job>,
    /// Town hall that employs this human.
    pub employer: Option<Entity>,
    pub happiness: f32,
    pub is_employed: bool,
    pub is_hungry: bool,
    pub carrying: Option<ResourceKind>,
    pub home_hut: Option<Entity>,
    pub activity: Activity,
    /// Seconds until the next work search is allowed.
    pub search_cooldown: f32,
    pub road_hint: Option<RoadId>,
}

impl Human {
    pub fn new(name: impl Into<String>, gender: Gender, pos: Vec2) -> Self {
        Self {
            pos,
            size: sizes::HUMAN_SIZE,
            gender,
            name: name.into(),
            state: HumanState::Wander,
            selected: false,
            job: None,
            employer: None,
            happiness: 100.0,
            is_employed: false,
            is_hungry: false,
            carrying: None,
            home_hut: None,
            activity: Activity::Idle,
            search_cooldown: 0.0,
            road_hint: None,
        }
    }

    pub fn is_male(&self) -> bool {
        self.gender == Gender::Male
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size / 2.0, self.pos.y + self.size / 2.0)
    }

    pub fn set_center(&mut self, c: Vec2) {
        self.pos = Vec2::new(c.x - self.size / 2.0, c.y - self.size / 2.0);
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size, self.size)
    }

    pub fn body_at(&self, center: Vec2) -> Rect {
        Rect::from_center(center, self.size, self.size)
    }

    pub fn in_downtime(&self) -> bool {
        matches!(self.activity, Activity::Downtime(_))
    }

    pub fn is_asleep(&self) -> bool {
        matches!(&self.activity, Activity::Sleep(task) if task.asleep)
    }

    /// Drop the current task and start the next one from scratch.
    pub fn reset_worker(&mut self) {
        self.activity = Activity::Idle;
        self.road_hint = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_round_trip() {
        let mut h = Human::new("Ada", Gender::Female, Vec2::new(100.0, 100.0));
        assert_eq!(h.center(), Vec2::new(110.0, 110.0));
        h.set_center(Vec2::new(50.0, 60.0));
        assert_eq!(h.pos, Vec2::new(40.0, 50.0));
    }

    #[test]
    fn test_new_sheep_has_wool() {
        let s = Sheep::new(Vec2::new(0.0, 50.0), Gender::Male, 5.0);
        assert!(s.has_wool);
        assert_eq!(s.center(), Vec2::new(10.0, 57.0));
    }

    #[test]
    fn test_gathered_resource() {
        assert_eq!(Job::Lumberjack.gathered_resource(), Some(ResourceKind::Log));
        assert_eq!(Job::Miner.gathered_resource(), Some(ResourceKind::Iron));
        assert_eq!(Job::Shearer.gathered_resource(), None);
    }
}
