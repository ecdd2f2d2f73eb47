use animgraph::{
    AnimationGraph, AnimationHandle, AnimationLibrary, AnimationSource, AnimationTrack, Channel,
    CompareOp, EntityHandle, Interpolation, Keyframe, SceneGraph,
};
use glam::{Quat, Vec3};
use serde_json::json;
use std::collections::BTreeMap;

struct World {
    library: AnimationLibrary,
    positions: BTreeMap<u32, Vec3>,
}

impl AnimationSource for World {
    fn animation(&self, handle: AnimationHandle) -> Option<&AnimationTrack> {
        self.library.animation(handle)
    }
}

impl SceneGraph for World {
    fn set_entity_position(&mut self, entity: EntityHandle, position: Vec3) {
        self.positions.insert(entity.index(), position);
    }

    fn set_entity_rotation(&mut self, _entity: EntityHandle, _rotation: Quat) {}

    fn set_entity_scale(&mut self, _entity: EntityHandle, _scale: Vec3) {}
}

fn bounce(name: &str, height: f32) -> AnimationTrack {
    AnimationTrack::new(name, 1.0).with_channel(Channel::position(
        0,
        Interpolation::Linear,
        vec![
            Keyframe::new(0.0, Vec3::ZERO),
            Keyframe::new(0.5, Vec3::new(0.0, height, 0.0)),
            Keyframe::new(1.0, Vec3::ZERO),
        ],
    ))
}

fn main() {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut dt = 0.1f32;
    let mut fade = 0.5f32;
    let mut frames = 12usize;

    let mut i = 0usize;
    while i < args.len() {
        let value = args.get(i + 1).and_then(|v| v.parse::<f32>().ok());
        match (args[i].as_str(), value) {
            ("--dt", Some(v)) => dt = v,
            ("--fade", Some(v)) => fade = v,
            ("--frames", Some(v)) => frames = v.max(0.0) as usize,
            (other, _) => {
                eprintln!("unknown or incomplete argument: {other}");
                std::process::exit(2);
            }
        }
        i += 2;
    }

    let mut world = World {
        library: AnimationLibrary::new(4),
        positions: BTreeMap::new(),
    };
    let walk = world.library.add(bounce("walk", 1.0)).expect("add walk");
    let jump = world.library.add(bounce("jump", 4.0)).expect("add jump");

    let mut graph = AnimationGraph::new();
    let machine = graph.add_state_machine().expect("machine");
    let trigger = graph.add_parameter(machine).expect("parameter");
    let walking = graph.add_state(machine).expect("state");
    let jumping = graph.add_state(machine).expect("state");
    for (state, animation) in [(walking, walk), (jumping, jump)] {
        graph.set_state_duration(state, 1.0).expect("duration");
        graph.set_state_looping(state, true).expect("looping");
        let sample = graph.add_state_sample(state).expect("sample");
        graph.set_sample_animation(sample, animation).expect("animation");
    }
    let t = graph.add_transition_from_state(walking).expect("transition");
    graph.set_transition_target(t, jumping).expect("target");
    graph
        .set_transition_condition(t, trigger, CompareOp::GreaterOrEqual, 1.0)
        .expect("condition");
    graph.set_transition_duration(t, fade).expect("fade");
    graph
        .set_machine_joint_entities(machine, &[EntityHandle::from_raw_parts(0, 1)])
        .expect("joint map");
    graph
        .set_machine_active_state(machine, walking)
        .expect("active state");

    for frame in 0..frames {
        if frame == frames / 3 {
            graph.set_parameter_value(trigger, 1.0).expect("trigger");
        }
        graph.tick(&mut world, dt);
        let root = world.positions.get(&0).copied().unwrap_or(Vec3::ZERO);
        let line = json!({
            "frame": frame,
            "active_state": graph.machine_active_state(machine).map(|s| s.to_string()),
            "active_transition": graph.machine_active_transition(machine).map(|t| t.to_string()),
            "root": [root.x, root.y, root.z],
        });
        println!("{line}");
    }
}
