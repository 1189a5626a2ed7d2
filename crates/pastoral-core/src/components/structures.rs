//! Placeable structures.
//!
//! Every building is one [`Structure`] component. The variants carry their
//! own geometry and state; the shared interface (bounds, hit-test, solid
//! shapes) lives on the enum.

use std::collections::{BTreeMap, VecDeque};
use std::f32::consts::TAU;

use hecs::Entity;
use pastoral_logic::constants::{capacities, mill as mill_consts, sizes, timing};
use pastoral_logic::geometry::{Circle, Rect, Shape, Vec2};
use pastoral_logic::layout;
use serde::{Deserialize, Serialize};

use super::agents::{Job, ResourceKind};
use crate::error::{DepositError, HireError};

/// Width and height after applying a quarter-turn `rotation`.
pub fn oriented(w: f32, h: f32, rotation: u8) -> (f32, f32) {
    if rotation % 2 == 1 {
        (h, w)
    } else {
        (w, h)
    }
}

/// Rotate an offset by `rotation` quarter turns (clockwise on screen).
pub fn rotate_offset(v: Vec2, rotation: u8) -> Vec2 {
    (0..rotation % 4).fold(v, |p, _| Vec2::new(-p.y, p.x))
}

// ── Pen ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    pub rect: Rect,
    pub rotation: u8,
    /// When false the front wall (the gate) is open.
    pub collision_enabled: bool,
}

impl Pen {
    pub fn new(top_left: Vec2, rotation: u8) -> Self {
        Self {
            rect: Rect::new(top_left.x, top_left.y, sizes::PEN_SIZE, sizes::PEN_SIZE),
            rotation: rotation % 4,
            collision_enabled: true,
        }
    }

    /// Walls in order bottom, left, top, right.
    pub fn walls(&self) -> [Rect; 4] {
        let r = self.rect;
        let t = sizes::PEN_WALL_THICKNESS;
        [
            Rect::new(r.x, r.bottom() - t, r.w, t),
            Rect::new(r.x, r.y, t, r.h),
            Rect::new(r.x, r.y, r.w, t),
            Rect::new(r.right() - t, r.y, t, r.h),
        ]
    }

    /// Index into [`Pen::walls`] of the wall carrying the gate.
    pub fn front_wall(&self) -> usize {
        self.rotation as usize % 4
    }

    pub fn button_position(&self) -> Vec2 {
        self.walls()[self.front_wall()].center()
    }

    pub fn button_hit(&self, p: Vec2) -> bool {
        self.button_position().distance(&p) <= sizes::PEN_BUTTON_RADIUS
    }

    pub fn toggle_gate(&mut self) {
        self.collision_enabled = !self.collision_enabled;
    }

    /// Walls that currently block movement.
    pub fn solid_walls(&self) -> Vec<Rect> {
        let front = self.front_wall();
        self.walls()
            .into_iter()
            .enumerate()
            .filter(|(i, _)| self.collision_enabled || *i != front)
            .map(|(_, w)| w)
            .collect()
    }
}

// ── Town hall ─────────────────────────────────────────────────────

/// Default openings per job at a new town hall.
pub const DEFAULT_JOB_SLOTS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobSlot {
    pub filled: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TownHall {
    pub rect: Rect,
    pub rotation: u8,
    pub slots: BTreeMap<Job, JobSlot>,
    pub employees: Vec<Entity>,
}

impl TownHall {
    pub fn new(top_left: Vec2, rotation: u8) -> Self {
        let (w, h) = oriented(sizes::TOWN_HALL_WIDTH, sizes::TOWN_HALL_HEIGHT, rotation);
        let slots = Job::ALL
            .iter()
            .map(|job| {
                (
                    *job,
                    JobSlot {
                        filled: 0,
                        max: DEFAULT_JOB_SLOTS,
                    },
                )
            })
            .collect();
        Self {
            rect: Rect::new(top_left.x, top_left.y, w, h),
            rotation: rotation % 4,
            slots,
            employees: Vec::new(),
        }
    }

    pub fn slot(&self, job: Job) -> JobSlot {
        self.slots
            .get(&job)
            .copied()
            .unwrap_or(JobSlot { filled: 0, max: 0 })
    }

    pub fn has_opening(&self, job: Job) -> bool {
        let slot = self.slot(job);
        slot.filled < slot.max
    }

    pub fn set_max(&mut self, job: Job, max: u32) {
        let slot = self.slots.entry(job).or_insert(JobSlot { filled: 0, max });
        slot.max = max.max(slot.filled);
    }

    pub(crate) fn take_slot(&mut self, job: Job, human: Entity) -> Result<(), HireError> {
        if self.employees.contains(&human) {
            return Err(HireError::AlreadyEmployed);
        }
        let slot = self
            .slots
            .get_mut(&job)
            .filter(|s| s.filled < s.max)
            .ok_or(HireError::NoSlot { job })?;
        slot.filled += 1;
        self.employees.push(human);
        Ok(())
    }

    pub(crate) fn release_slot(&mut self, job: Job, human: Entity) {
        let before = self.employees.len();
        self.employees.retain(|e| *e != human);
        if self.employees.len() < before {
            if let Some(slot) = self.slots.get_mut(&job) {
                slot.filled = slot.filled.saturating_sub(1);
            }
        }
    }

    pub fn total_filled(&self) -> u32 {
        self.slots.values().map(|s| s.filled).sum()
    }
}

// ── Storage yards ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YardKind {
    Lumber,
    Stone,
    Iron,
    Salt,
    Wool,
}

impl YardKind {
    pub fn accepts(&self) -> ResourceKind {
        match self {
            YardKind::Lumber => ResourceKind::Log,
            YardKind::Stone => ResourceKind::Stone,
            YardKind::Iron => ResourceKind::Iron,
            YardKind::Salt => ResourceKind::Salt,
            YardKind::Wool => ResourceKind::Wool,
        }
    }

    pub fn for_resource(kind: ResourceKind) -> Option<YardKind> {
        match kind {
            ResourceKind::Log => Some(YardKind::Lumber),
            ResourceKind::Stone => Some(YardKind::Stone),
            ResourceKind::Iron => Some(YardKind::Iron),
            ResourceKind::Salt => Some(YardKind::Salt),
            ResourceKind::Wool => Some(YardKind::Wool),
            ResourceKind::Barley => None,
        }
    }

    pub fn capacity(&self) -> u32 {
        match self {
            YardKind::Lumber => capacities::LUMBER_YARD,
            YardKind::Stone => capacities::STONE_YARD,
            YardKind::Iron => capacities::IRON_YARD,
            YardKind::Salt => capacities::SALT_YARD,
            YardKind::Wool => capacities::WOOL_SHED,
        }
    }

    /// The salt yard is an open stockpile and never blocks movement.
    pub fn collides(&self) -> bool {
        !matches!(self, YardKind::Salt)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageYard {
    pub kind: YardKind,
    pub rect: Rect,
    pub rotation: u8,
    pub inventory: u32,
    pub capacity: u32,
}

impl StorageYard {
    pub fn new(kind: YardKind, top_left: Vec2, rotation: u8) -> Self {
        let (w, h) = oriented(sizes::YARD_WIDTH, sizes::YARD_HEIGHT, rotation);
        Self {
            kind,
            rect: Rect::new(top_left.x, top_left.y, w, h),
            rotation: rotation % 4,
            inventory: 0,
            capacity: kind.capacity(),
        }
    }

    pub fn has_space(&self) -> bool {
        self.inventory < self.capacity
    }

    /// Store one unit; returns the new inventory.
    pub fn deposit(&mut self, resource: ResourceKind) -> Result<u32, DepositError> {
        if resource != self.kind.accepts() {
            return Err(DepositError::WrongResource(resource));
        }
        if !self.has_space() {
            return Err(DepositError::BuildingFull);
        }
        self.inventory += 1;
        Ok(self.inventory)
    }

    /// How full the yard is, for drawing stockpiles.
    pub fn fill_fraction(&self) -> f32 {
        if self.capacity == 0 {
            1.0
        } else {
            self.inventory as f32 / self.capacity as f32
        }
    }
}

// ── Silo and hut ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Silo {
    pub circle: Circle,
    pub barley: u32,
}

impl Silo {
    pub fn new(center: Vec2) -> Self {
        Self {
            circle: Circle::new(center, sizes::SILO_RADIUS),
            barley: 0,
        }
    }

    pub fn take_barley(&mut self) -> bool {
        if self.barley == 0 {
            return false;
        }
        self.barley -= 1;
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hut {
    pub circle: Circle,
    pub owner: Option<Entity>,
}

impl Hut {
    pub fn new(center: Vec2) -> Self {
        Self {
            circle: Circle::new(center, sizes::HUT_RADIUS),
            owner: None,
        }
    }
}

// ── Barley farm ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Plot {
    pub worked: bool,
    pub has_barley: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarleyFarm {
    pub rect: Rect,
    pub rotation: u8,
    pub plots: Vec<Plot>,
    pub planted_day: Option<u32>,
    pub has_crops: bool,
    /// The one barley farmer allowed to work here.
    pub farmer: Option<Entity>,
}

impl BarleyFarm {
    pub fn new(top_left: Vec2, rotation: u8) -> Self {
        let (w, h) = oriented(
            sizes::FARM_COLUMNS as f32 * sizes::FARM_PLOT_SIZE,
            sizes::FARM_ROWS as f32 * sizes::FARM_PLOT_SIZE,
            rotation,
        );
        Self {
            rect: Rect::new(top_left.x, top_left.y, w, h),
            rotation: rotation % 4,
            plots: vec![Plot::default(); sizes::FARM_COLUMNS * sizes::FARM_ROWS],
            planted_day: None,
            has_crops: false,
            farmer: None,
        }
    }

    fn columns(&self) -> usize {
        if self.rotation % 2 == 1 {
            sizes::FARM_ROWS
        } else {
            sizes::FARM_COLUMNS
        }
    }

    pub fn plot_center(&self, index: usize) -> Vec2 {
        let cols = self.columns();
        let (col, row) = (index % cols, index / cols);
        let s = sizes::FARM_PLOT_SIZE;
        Vec2::new(
            self.rect.x + col as f32 * s + s / 2.0,
            self.rect.y + row as f32 * s + s / 2.0,
        )
    }

    pub fn all_worked(&self) -> bool {
        self.plots.iter().all(|p| p.worked)
    }

    pub fn is_planted(&self) -> bool {
        self.planted_day.is_some()
    }

    /// Tilling is possible until every plot is worked and the crop is in.
    pub fn needs_tilling(&self) -> bool {
        !self.is_planted() && !self.all_worked()
    }

    pub fn ready_to_harvest(&self) -> bool {
        self.has_crops && self.plots.iter().any(|p| p.has_barley)
    }

    pub fn has_work(&self) -> bool {
        self.needs_tilling() || self.ready_to_harvest()
    }

    pub fn next_unworked(&self, from: Vec2) -> Option<usize> {
        self.nearest_plot(from, |p| !p.worked)
    }

    pub fn next_barley(&self, from: Vec2) -> Option<usize> {
        self.nearest_plot(from, |p| p.has_barley)
    }

    fn nearest_plot(&self, from: Vec2, pred: impl Fn(&Plot) -> bool) -> Option<usize> {
        self.plots
            .iter()
            .enumerate()
            .filter(|(_, p)| pred(p))
            .min_by(|(a, _), (b, _)| {
                self.plot_center(*a)
                    .distance_squared(&from)
                    .total_cmp(&self.plot_center(*b).distance_squared(&from))
            })
            .map(|(i, _)| i)
    }

    /// Mark a plot tilled; it shows barley straight away.
    pub fn work_plot(&mut self, index: usize) {
        if let Some(plot) = self.plots.get_mut(index) {
            plot.worked = true;
            plot.has_barley = true;
        }
    }

    pub fn plant_crops(&mut self, day: u32) {
        self.planted_day = Some(day);
        self.has_crops = false;
    }

    /// Crops ripen one day after planting.
    pub fn update_crops(&mut self, current_day: u32) {
        if let Some(planted) = self.planted_day {
            if !self.has_crops && current_day > planted {
                self.has_crops = true;
            }
        }
    }

    /// Take the barley from a plot. Returns false when there was none.
    pub fn harvest_plot(&mut self, index: usize) -> bool {
        match self.plots.get_mut(index) {
            Some(plot) if plot.has_barley && self.has_crops => {
                plot.has_barley = false;
                true
            }
            _ => false,
        }
    }

    pub fn reset_after_harvest(&mut self) {
        for plot in &mut self.plots {
            *plot = Plot::default();
        }
        self.planted_day = None;
        self.has_crops = false;
    }
}

// ── Mill ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Mill {
    pub rect: Rect,
    pub rotation: u8,
    /// Flour store and malt store.
    pub outbuildings: [Rect; 2],
    pub millstone: Circle,
    pub millstone_rotation: f32,
    /// Grain positions on the millstone, oldest first.
    pub grains: VecDeque<Vec2>,
    next_slot: usize,
    pub processing_timer: f32,
    pub flour: u32,
    pub malt: u32,
    /// Grains processed since the last malt.
    pub processed_since_malt: u32,
    pub reported_flour: u32,
    pub reported_malt: u32,
}

/// Produce of one mill step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MillOutput {
    pub flour: u32,
    pub malt: u32,
}

impl Mill {
    pub fn new(center: Vec2, rotation: u8) -> Self {
        let rotation = rotation % 4;
        let rect = Rect::from_center(center, sizes::MILL_SIZE, sizes::MILL_SIZE);
        let gap = (sizes::MILL_SIZE + sizes::MILL_OUTBUILDING_SIZE) / 2.0;
        let out = sizes::MILL_OUTBUILDING_SIZE;
        let outbuildings = [Vec2::new(-gap, 0.0), Vec2::new(gap, 0.0)]
            .map(|off| Rect::from_center(center + rotate_offset(off, rotation), out, out));
        Self {
            rect,
            rotation,
            outbuildings,
            millstone: Circle::new(center, sizes::MILLSTONE_RADIUS),
            millstone_rotation: 0.0,
            grains: VecDeque::new(),
            next_slot: 0,
            processing_timer: 0.0,
            flour: 0,
            malt: 0,
            processed_since_malt: 0,
            reported_flour: 0,
            reported_malt: 0,
        }
    }

    pub fn parts(&self) -> [Rect; 3] {
        [self.rect, self.outbuildings[0], self.outbuildings[1]]
    }

    pub fn processing_barley(&self) -> usize {
        self.grains.len()
    }

    pub fn is_at_capacity(&self) -> bool {
        self.flour >= capacities::MILL_FLOUR && self.malt >= capacities::MILL_MALT
    }

    /// Put one grain on the millstone at the next free slot.
    pub fn add_barley(&mut self) {
        let offset = layout::millstone_slot(self.next_slot);
        self.next_slot = (self.next_slot + 1) % layout::millstone_capacity();
        self.grains.push_back(self.millstone.center + offset);
    }

    /// Rotate the stone and mill grain. Output over the caps is discarded.
    pub fn update(&mut self, dt: f32) -> MillOutput {
        let mut output = MillOutput::default();
        if dt <= 0.0 {
            return output;
        }
        self.millstone_rotation =
            (self.millstone_rotation + mill_consts::MILLSTONE_ROTATION_SPEED * dt) % TAU;

        if self.grains.is_empty() {
            self.processing_timer = 0.0;
            return output;
        }
        self.processing_timer += dt;
        if self.processing_timer < timing::MILL_PROCESSING_TIME {
            return output;
        }
        self.processing_timer = 0.0;
        self.grains.pop_front();
        if self.grains.is_empty() {
            self.next_slot = 0;
        }

        let flour = capacities::MILL_FLOUR
            .saturating_sub(self.flour)
            .min(capacities::FLOUR_PER_GRAIN);
        self.flour += flour;
        output.flour = flour;

        self.processed_since_malt += 1;
        if self.processed_since_malt >= capacities::GRAINS_PER_MALT {
            self.processed_since_malt -= capacities::GRAINS_PER_MALT;
            if self.malt < capacities::MILL_MALT {
                self.malt += 1;
                output.malt = 1;
            }
        }
        output
    }

    /// Flour and malt produced since the last call.
    pub fn take_unreported(&mut self) -> MillOutput {
        let out = MillOutput {
            flour: self.flour.saturating_sub(self.reported_flour),
            malt: self.malt.saturating_sub(self.reported_malt),
        };
        self.reported_flour = self.flour;
        self.reported_malt = self.malt;
        out
    }
}

// ── Road ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Road {
    pub rect: Rect,
    pub rotation: u8,
}

impl Road {
    /// Even rotations lie horizontally.
    pub fn new(top_left: Vec2, rotation: u8) -> Self {
        let (w, h) = oriented(sizes::ROAD_LONG, sizes::ROAD_SHORT, rotation);
        Self {
            rect: Rect::new(top_left.x, top_left.y, w, h),
            rotation: rotation % 4,
        }
    }
}

// ── Structure ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Structure {
    Pen(Pen),
    TownHall(TownHall),
    Storage(StorageYard),
    Silo(Silo),
    Hut(Hut),
    Farm(BarleyFarm),
    Mill(Mill),
    Road(Road),
}

impl Structure {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Structure::Pen(_) => "pen",
            Structure::TownHall(_) => "town_hall",
            Structure::Storage(y) => match y.kind {
                YardKind::Lumber => "lumber_yard",
                YardKind::Stone => "stone_yard",
                YardKind::Iron => "iron_yard",
                YardKind::Salt => "salt_yard",
                YardKind::Wool => "wool_shed",
            },
            Structure::Silo(_) => "silo",
            Structure::Hut(_) => "hut",
            Structure::Farm(_) => "barley_farm",
            Structure::Mill(_) => "mill",
            Structure::Road(_) => "road",
        }
    }

    /// Bounding rectangle (circles as their bounding square, mills without outbuildings).
    pub fn bounds(&self) -> Rect {
        match self {
            Structure::Pen(p) => p.rect,
            Structure::TownHall(t) => t.rect,
            Structure::Storage(y) => y.rect,
            Structure::Silo(s) => s.circle.bounds(),
            Structure::Hut(h) => h.circle.bounds(),
            Structure::Farm(f) => f.rect,
            Structure::Mill(m) => m.rect,
            Structure::Road(r) => r.rect,
        }
    }

    /// Rectangles other buildings may not be placed on.
    pub fn footprint(&self) -> Vec<Rect> {
        match self {
            Structure::Mill(m) => m.parts().to_vec(),
            other => vec![other.bounds()],
        }
    }

    pub fn center(&self) -> Vec2 {
        match self {
            Structure::Silo(s) => s.circle.center,
            Structure::Hut(h) => h.circle.center,
            Structure::Mill(m) => m.millstone.center,
            other => other.bounds().center(),
        }
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        match self {
            Structure::Silo(s) => s.circle.contains_point(p),
            Structure::Hut(h) => h.circle.contains_point(p),
            Structure::Mill(m) => m.parts().iter().any(|r| r.contains_point(p)),
            other => other.bounds().contains_point(p),
        }
    }

    pub fn collision_enabled(&self) -> bool {
        match self {
            Structure::Pen(p) => p.collision_enabled,
            Structure::Storage(y) => y.kind.collides(),
            Structure::Farm(_) | Structure::Road(_) => false,
            _ => true,
        }
    }

    /// Shapes that block movement. Pens keep their side walls even with the gate open.
    pub fn solid_shapes(&self) -> Vec<Shape> {
        match self {
            Structure::Pen(p) => p.solid_walls().into_iter().map(Shape::Rect).collect(),
            Structure::TownHall(t) => vec![Shape::Rect(t.rect)],
            Structure::Storage(y) if y.kind.collides() => vec![Shape::Rect(y.rect)],
            Structure::Silo(s) => vec![Shape::Circle(s.circle)],
            Structure::Hut(h) => vec![Shape::Circle(h.circle)],
            Structure::Mill(m) => m.parts().into_iter().map(Shape::Rect).collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_road(&self) -> bool {
        matches!(self, Structure::Road(_))
    }
}

// ── Build kinds ───────────────────────────────────────────────────

/// Everything the player can place in build mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildKind {
    Pen,
    TownHall,
    LumberYard,
    StoneYard,
    IronYard,
    SaltYard,
    WoolShed,
    Silo,
    Hut,
    BarleyFarm,
    Mill,
    Road,
}

impl BuildKind {
    /// Build the structure centered on `center`.
    pub fn build(&self, center: Vec2, rotation: u8) -> Structure {
        let top_left = |w: f32, h: f32| {
            let (w, h) = oriented(w, h, rotation);
            Vec2::new(center.x - w / 2.0, center.y - h / 2.0)
        };
        let yard = |kind: YardKind| {
            Structure::Storage(StorageYard::new(
                kind,
                top_left(sizes::YARD_WIDTH, sizes::YARD_HEIGHT),
                rotation,
            ))
        };
        match self {
            BuildKind::Pen => Structure::Pen(Pen::new(
                top_left(sizes::PEN_SIZE, sizes::PEN_SIZE),
                rotation,
            )),
            BuildKind::TownHall => Structure::TownHall(TownHall::new(
                top_left(sizes::TOWN_HALL_WIDTH, sizes::TOWN_HALL_HEIGHT),
                rotation,
            )),
            BuildKind::LumberYard => yard(YardKind::Lumber),
            BuildKind::StoneYard => yard(YardKind::Stone),
            BuildKind::IronYard => yard(YardKind::Iron),
            BuildKind::SaltYard => yard(YardKind::Salt),
            BuildKind::WoolShed => yard(YardKind::Wool),
            BuildKind::Silo => Structure::Silo(Silo::new(center)),
            BuildKind::Hut => Structure::Hut(Hut::new(center)),
            BuildKind::BarleyFarm => Structure::Farm(BarleyFarm::new(
                top_left(
                    sizes::FARM_COLUMNS as f32 * sizes::FARM_PLOT_SIZE,
                    sizes::FARM_ROWS as f32 * sizes::FARM_PLOT_SIZE,
                ),
                rotation,
            )),
            BuildKind::Mill => Structure::Mill(Mill::new(center, rotation)),
            BuildKind::Road => Structure::Road(Road::new(
                top_left(sizes::ROAD_LONG, sizes::ROAD_SHORT),
                rotation,
            )),
        }
    }

    pub fn is_road(&self) -> bool {
        matches!(self, BuildKind::Road)
    }
}
