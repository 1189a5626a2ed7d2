//! Walk agents across small road networks frame by frame and check the
//! pathfinder keeps them on the roads and never doubles back.

use pastoral_logic::geometry::{Rect, Vec2};
use pastoral_logic::pathfinding::{
    next_waypoint, refine_road_hint, PathQuery, PathStep, RoadId, RoadSegment, StepKind,
};

const STEP: f32 = 5.0;
const MAX_FRAMES: usize = 300;

struct Walk {
    steps: Vec<(Vec2, PathStep)>,
    roads_visited: Vec<RoadId>,
    arrived: bool,
}

/// Walk from `start` to `goal`, treating everything off the road network as blocked.
fn walk(start: Vec2, goal: Vec2, roads: &[RoadSegment]) -> Walk {
    let rects: Vec<Rect> = roads.iter().map(|r| r.rect).collect();
    let off_road = move |p: Vec2| !rects.iter().any(|r| r.contains_point(p));

    let mut pos = start;
    let mut hint = None;
    let mut steps = Vec::new();
    let mut roads_visited: Vec<RoadId> = Vec::new();

    for _ in 0..MAX_FRAMES {
        if pos.distance(&goal) < 1.0 {
            return Walk {
                steps,
                roads_visited,
                arrived: true,
            };
        }
        let query = PathQuery {
            position: pos,
            goal,
            previous_road: hint,
        };
        let step = next_waypoint(&query, roads, &off_road);
        if let Some(id) = step.on_road {
            if roads_visited.last() != Some(&id) {
                roads_visited.push(id);
            }
        }
        hint = refine_road_hint(hint, &step, roads, goal);
        steps.push((pos, step));
        if step.is_stalled() {
            break;
        }
        pos = pos.step_toward(&step.target, STEP);
    }
    Walk {
        steps,
        roads_visited,
        arrived: false,
    }
}

fn l_network() -> Vec<RoadSegment> {
    vec![
        RoadSegment::new(1, Rect::new(100.0, 100.0, 60.0, 30.0)),
        RoadSegment::new(2, Rect::new(130.0, 130.0, 30.0, 60.0)),
    ]
}

#[test]
fn test_l_intersection_transitions_once() {
    let roads = l_network();
    let result = walk(Vec2::new(110.0, 115.0), Vec2::new(145.0, 180.0), &roads);

    assert!(result.arrived, "agent never reached the target");
    assert_eq!(result.roads_visited, vec![1, 2]);

    // The switch to the vertical road happens near the horizontal road's right end.
    let (switch_pos, _) = result
        .steps
        .iter()
        .find(|(_, s)| s.kind == StepKind::ToRoad(2))
        .copied()
        .expect("never headed for the vertical road");
    assert!(160.0 - switch_pos.x <= 20.0 + 1e-3);

    // Everything before the switch stays on the horizontal road.
    for (pos, step) in result.steps.iter() {
        if step.kind == StepKind::ToRoad(2) {
            break;
        }
        assert_eq!(step.on_road, Some(1));
        assert!(roads[0].rect.inflate(5.0).contains_point(*pos));
    }

    // Once heading for road 2 the agent never aims back at road 1.
    let after: Vec<_> = result
        .steps
        .iter()
        .skip_while(|(_, s)| s.kind != StepKind::ToRoad(2))
        .collect();
    assert!(after.iter().all(|(_, s)| s.kind != StepKind::ToRoad(1)));
}

#[test]
fn test_straight_chain_visits_roads_in_order() {
    let roads = vec![
        RoadSegment::new(1, Rect::new(0.0, 100.0, 60.0, 30.0)),
        RoadSegment::new(2, Rect::new(60.0, 100.0, 60.0, 30.0)),
        RoadSegment::new(3, Rect::new(120.0, 100.0, 60.0, 30.0)),
    ];
    let result = walk(Vec2::new(10.0, 115.0), Vec2::new(170.0, 115.0), &roads);
    assert!(result.arrived);
    assert_eq!(result.roads_visited, vec![1, 2, 3]);
}

#[test]
fn test_never_targets_hinted_road() {
    let roads = l_network();
    for &(x, y) in &[(145.0, 115.0), (150.0, 175.0), (140.0, 140.0), (105.0, 120.0)] {
        for hint in [Some(1), Some(2)] {
            let q = PathQuery {
                position: Vec2::new(x, y),
                goal: Vec2::new(600.0, 600.0),
                previous_road: hint,
            };
            let step = next_waypoint(&q, &roads, &|_| true);
            if let (StepKind::ToRoad(id), Some(_)) = (step.kind, step.on_road) {
                assert_ne!(Some(id), hint);
            }
        }
    }
}
