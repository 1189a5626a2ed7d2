//! Game constants: screen layout, speeds, sizes, timers and capacities.
//!
//! Speeds are expressed in pixels per frame at [`FPS`]; movement code scales
//! them by `dt * FPS` so a zero-length tick never moves anything.

/// Target frame rate the per-frame speeds are tuned for.
pub const FPS: f32 = 60.0;

pub mod screen {
    pub const WIDTH: f32 = 1280.0;
    pub const HEIGHT: f32 = 800.0;
    pub const TOP_HUD_HEIGHT: f32 = 40.0;
    pub const BOTTOM_HUD_HEIGHT: f32 = 60.0;
    /// First playable row.
    pub const PLAY_TOP: f32 = TOP_HUD_HEIGHT;
    /// First row below the playable area.
    pub const PLAY_BOTTOM: f32 = HEIGHT - BOTTOM_HUD_HEIGHT;
}

pub mod speeds {
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const HUMAN_SPEED: f32 = 5.0;
    pub const HUMAN_WANDER_SPEED: f32 = 2.0;
    pub const SHEEP_SPEED: f32 = 3.0;
    pub const SHEEP_GRAZE_SPEED: f32 = 1.0;
    /// Multiplier applied while an agent stands on a road.
    pub const ROAD_SPEED_MULTIPLIER: f32 = 1.5;
}

pub mod sizes {
    pub const PLAYER_SIZE: f32 = 20.0;
    pub const HUMAN_SIZE: f32 = PLAYER_SIZE;
    pub const SHEEP_WIDTH: f32 = 20.0;
    pub const SHEEP_HEIGHT: f32 = 14.0;
    pub const HUMAN_COLLISION_RADIUS: f32 = PLAYER_SIZE + 2.0;
    pub const SHEEP_COLLISION_RADIUS: f32 = 6.0;

    pub const PEN_SIZE: f32 = 150.0;
    pub const PEN_WALL_THICKNESS: f32 = 4.0;
    pub const PEN_BUTTON_RADIUS: f32 = 8.0;
    pub const TOWN_HALL_WIDTH: f32 = 120.0;
    pub const TOWN_HALL_HEIGHT: f32 = 80.0;
    pub const YARD_WIDTH: f32 = 80.0;
    pub const YARD_HEIGHT: f32 = 60.0;
    pub const SILO_RADIUS: f32 = 25.0;
    pub const HUT_RADIUS: f32 = 15.0;
    pub const FARM_PLOT_SIZE: f32 = 20.0;
    pub const FARM_COLUMNS: usize = 6;
    pub const FARM_ROWS: usize = 4;
    pub const MILL_SIZE: f32 = 60.0;
    pub const MILL_OUTBUILDING_SIZE: f32 = 30.0;
    pub const MILLSTONE_RADIUS: f32 = 20.0;
    pub const ROAD_SHORT: f32 = 30.0;
    pub const ROAD_LONG: f32 = 60.0;

    pub const TREE_TRUNK_WIDTH: f32 = 10.0;
    pub const TREE_TRUNK_HEIGHT: f32 = 20.0;
    pub const TREE_CROWN_RADIUS: f32 = 18.0;
    pub const ROCK_RADIUS: f32 = 15.0;
    pub const IRON_MINE_WIDTH: f32 = 50.0;
    pub const IRON_MINE_HEIGHT: f32 = 40.0;
    pub const SALT_RADIUS: f32 = 12.0;
}

pub mod timing {
    pub const HARVEST_TIME: f32 = 3.0;
    pub const SHEAR_TIME: f32 = 1.5;
    pub const BARLEY_HARVEST_TIME: f32 = 1.0;
    pub const TILL_TIME: f32 = 3.0;
    pub const AUTO_WORK_INTERVAL: f32 = 1.0;
    pub const DAY_DURATION: f32 = 180.0;
    pub const DUSK_FADE_DURATION: f32 = 30.0;
    /// Hour shown when a day's elapsed time is zero.
    pub const START_HOUR: f32 = 6.0;
    pub const MILL_PROCESSING_TIME: f32 = 5.0;
    pub const MESSAGE_DURATION: f32 = 3.0;
    pub const GRAZE_TIMER_MIN: f32 = 5.0;
    pub const GRAZE_TIMER_MAX: f32 = 10.0;
    pub const WANDER_MOVE_MIN: f32 = 2.0;
    pub const WANDER_MOVE_MAX: f32 = 5.0;
    pub const WANDER_REST_MIN: f32 = 1.0;
    pub const WANDER_REST_MAX: f32 = 4.0;
    pub const MILL_WANDER_MIN: f32 = 2.0;
    pub const MILL_WANDER_MAX: f32 = 4.0;
}

pub mod capacities {
    pub const LUMBER_YARD: u32 = 89;
    pub const STONE_YARD: u32 = 70;
    pub const IRON_YARD: u32 = 90;
    pub const SALT_YARD: u32 = 35;
    pub const WOOL_SHED: u32 = 50;
    pub const MILL_FLOUR: u32 = 64;
    pub const MILL_MALT: u32 = 25;
    /// Flour produced per processed grain.
    pub const FLOUR_PER_GRAIN: u32 = 2;
    /// Processed grains needed for one unit of malt.
    pub const GRAINS_PER_MALT: u32 = 2;
}

pub mod health {
    pub const TREE: u32 = 20;
    pub const ROCK: u32 = 100;
    pub const IRON_MINE: u32 = 500;
    pub const SALT: u32 = 80;
}

pub mod distances {
    pub const AUTO_WORK_SEARCH_RADIUS: f32 = 300.0;
    /// Radius of the ring of standing spots around a resource.
    pub const HARVEST_RING_RADIUS: f32 = 30.0;
    pub const HARVEST_ARRIVAL: f32 = 5.0;
    pub const SHEAR_REACH: f32 = 12.0;
    pub const DELIVERY_ARRIVAL: f32 = 20.0;
    pub const SILO_ARRIVAL: f32 = 30.0;
    pub const MILL_ARRIVAL: f32 = 10.0;
    pub const WANDER_ARRIVAL: f32 = 5.0;
    pub const HUT_ARRIVAL: f32 = 5.0;
    pub const TOWN_HALL_ARRIVAL: f32 = 30.0;
    pub const HUT_CLAIM_DISTANCE: f32 = 50.0;
    pub const GENDER_SEPARATION_DISTANCE: f32 = 30.0;
    pub const HERD_BOUNDARY_SIZE: f32 = 100.0;
    pub const SHEEP_MIN_FOLLOW_DISTANCE: f32 = 40.0;
    pub const HUMAN_FOLLOW_DISTANCE: f32 = 40.0;
    pub const REPRODUCTION_SPAWN_OFFSET: f32 = 50.0;
    pub const TOWN_HALL_CARVE_MARGIN: f32 = 20.0;
    /// Drag boxes smaller than this on both axes count as a click.
    pub const BOX_SELECT_MIN: f32 = 5.0;
}

pub mod darkness {
    /// Overlay alpha reached at the end of dusk (8-bit scale).
    pub const MAX_ALPHA: f32 = 200.0;
    /// Alpha above which humans consider it night.
    pub const DARK_THRESHOLD: f32 = 50.0;
}

pub mod happiness {
    pub const BASE: f32 = 100.0;
    pub const UNEMPLOYED_PENALTY: f32 = 20.0;
    pub const HOMELESS_PENALTY: f32 = 20.0;
    pub const NO_TOWN_HALL_PENALTY: f32 = 20.0;
    pub const HUNGER_PENALTY: f32 = 2.0;
    pub const GAIN_RATE: f32 = 1.0;
}

pub mod reproduction {
    pub const CHANCE: f64 = 0.5;
    pub const GRASS_REGROWTH_MIN: f32 = 0.10;
    pub const GRASS_REGROWTH_MAX: f32 = 0.20;
}

pub mod grazing {
    pub const MAX_TARGET_ATTEMPTS: usize = 100;
    /// Interpolated samples along a graze line checked for pen crossings.
    pub const LINE_CHECKS: usize = 8;
    /// Collision probes per pixel of graze movement.
    pub const PROBES_PER_PIXEL: f32 = 1.0;
}

pub mod mill {
    /// Radians per second; purely visual.
    pub const MILLSTONE_ROTATION_SPEED: f32 = 1.5;
    /// Spacing between grain slots on the millstone.
    pub const GRAIN_SPACING: f32 = 5.0;
}
