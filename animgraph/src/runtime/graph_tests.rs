use super::testing::{TestWorld, entity, hold_position};
use crate::{
    AnimationGraph, AnimationHandle, BlendMode, CompareOp, Error, GraphLimits, Joint,
    ParameterHandle, Skin, name_hash,
};
use glam::{Vec2, Vec3};

fn small_limits() -> GraphLimits {
    GraphLimits {
        state_machines: 2,
        states: 4,
        transitions: 4,
        parameters: 4,
        samples: 4,
        masks: 2,
        joint_map_entries: 8,
    }
}

#[test]
fn limits_must_be_positive() {
    let limits = GraphLimits {
        masks: 0,
        ..GraphLimits::default()
    };
    assert!(matches!(
        AnimationGraph::with_limits(limits),
        Err(Error::InvalidValue { .. })
    ));
    let graph = AnimationGraph::with_limits(small_limits()).unwrap();
    assert_eq!(graph.limits().states, 4);
}

#[test]
fn authoring_links_objects_in_insertion_order() {
    let mut graph = AnimationGraph::new();
    let machine = graph.add_state_machine().unwrap();
    let idle = graph.add_state(machine).unwrap();
    let walk = graph.add_state(machine).unwrap();
    let speed = graph.add_parameter(machine).unwrap();
    let turn = graph.add_parameter(machine).unwrap();

    assert_eq!(graph.machine_states(machine).collect::<Vec<_>>(), vec![idle, walk]);
    assert_eq!(
        graph.machine_parameters(machine).collect::<Vec<_>>(),
        vec![speed, turn]
    );
    assert_eq!(graph.machine_active_state(machine), None);

    let a = graph.add_state_sample(walk).unwrap();
    let b = graph.add_state_sample(walk).unwrap();
    graph.set_sample_blend_point(b, Vec2::new(1.0, 0.0)).unwrap();
    assert_eq!(graph.state_samples(walk).collect::<Vec<_>>(), vec![a, b]);
    assert_eq!(graph.sample(b).unwrap().blend_point, Vec2::new(1.0, 0.0));
    assert!(graph.sample(a).unwrap().animation.is_null());

    let t = graph.add_transition_from_state(idle).unwrap();
    graph.set_transition_target(t, walk).unwrap();
    graph
        .set_transition_condition(t, speed, CompareOp::Greater, 0.5)
        .unwrap();
    graph.set_transition_duration(t, 0.25).unwrap();
    graph.set_transition_priority(t, 3).unwrap();
    assert_eq!(graph.state_transitions(idle).collect::<Vec<_>>(), vec![t]);

    let transition = graph.transition(t).unwrap();
    assert_eq!(transition.to_state, walk);
    assert_eq!(transition.parameter, speed);
    assert_eq!(transition.compare, CompareOp::Greater);
    assert_eq!(transition.duration, 0.25);
    assert_eq!(transition.priority, 3);
}

#[test]
fn setters_validate_values_and_handles() {
    let mut graph = AnimationGraph::new();
    let machine = graph.add_state_machine().unwrap();
    let state = graph.add_state(machine).unwrap();
    let t = graph.add_transition_from_state(state).unwrap();

    assert!(matches!(
        graph.set_state_duration(state, -1.0),
        Err(Error::InvalidValue { .. })
    ));
    assert!(graph.set_state_duration(state, f32::NAN).is_err());
    assert!(graph.set_transition_duration(t, f32::INFINITY).is_err());
    assert!(matches!(
        graph.set_state_blend_mode(
            state,
            BlendMode::Blend1D {
                x: ParameterHandle::NULL
            }
        ),
        Err(Error::InvalidHandle { kind: "parameter" })
    ));

    graph.set_state_duration(state, 2.0).unwrap();
    graph.set_state_time(state, 5.0).unwrap();
    assert_eq!(graph.state_time(state), Some(2.0));
    graph.set_state_looping(state, true).unwrap();
    assert!(graph.state(state).unwrap().is_looping);
}

#[test]
fn pools_report_exhaustion() {
    let mut graph = AnimationGraph::with_limits(small_limits()).unwrap();
    graph.add_state_machine().unwrap();
    graph.add_state_machine().unwrap();
    assert!(matches!(
        graph.add_state_machine(),
        Err(Error::PoolExhausted {
            pool: "state machine",
            capacity: 2
        })
    ));
}

#[test]
fn removing_a_machine_frees_everything_it_owns() {
    let mut graph = AnimationGraph::with_limits(small_limits()).unwrap();
    let machine = graph.add_state_machine().unwrap();
    let speed = graph.add_parameter(machine).unwrap();
    let idle = graph.add_state(machine).unwrap();
    let walk = graph.add_state(machine).unwrap();
    let sample = graph.add_state_sample(walk).unwrap();
    let t = graph.add_transition_from_state(idle).unwrap();
    graph
        .set_machine_joint_entities(machine, &[entity(1), entity(2)])
        .unwrap();

    graph.remove_state_machine(machine).unwrap();
    assert_eq!(graph.machine_count(), 0);
    assert!(graph.state_machine(machine).is_none());
    assert!(graph.parameter(speed).is_none());
    assert!(graph.state(idle).is_none());
    assert!(graph.state(walk).is_none());
    assert!(graph.sample(sample).is_none());
    assert!(graph.transition(t).is_none());
    assert!(graph.machine_joint_entities(machine).is_empty());
    assert!(matches!(
        graph.remove_state_machine(machine),
        Err(Error::InvalidHandle { .. })
    ));

    // Every pool has room again and reused slots carry a new generation.
    let again = graph.add_state_machine().unwrap();
    assert_eq!(again.index(), machine.index());
    assert_ne!(again, machine);
    let state = graph.add_state(again).unwrap();
    assert_ne!(state, idle);
    assert!(graph.state(idle).is_none());
    for _ in 0..3 {
        graph.add_state(again).unwrap();
    }
    graph
        .set_machine_joint_entities(again, &[entity(0); 8])
        .unwrap();
}

#[test]
fn active_state_must_belong_to_the_machine() {
    let mut graph = AnimationGraph::new();
    let first = graph.add_state_machine().unwrap();
    let second = graph.add_state_machine().unwrap();
    let mine = graph.add_state(first).unwrap();
    let theirs = graph.add_state(second).unwrap();

    assert!(matches!(
        graph.set_machine_active_state(first, theirs),
        Err(Error::ForeignState { .. })
    ));
    graph.set_machine_active_state(first, mine).unwrap();
    assert_eq!(graph.machine_active_state(first), Some(mine));
    assert_eq!(graph.state_machine(first).unwrap().active_state, mine);
}

#[test]
fn transition_target_must_belong_to_the_same_machine() {
    let mut world = TestWorld::new();
    let animation = world.add(hold_position(0, Vec3::ONE, 1.0));
    let mut graph = AnimationGraph::new();
    let first = graph.add_state_machine().unwrap();
    let second = graph.add_state_machine().unwrap();
    let idle = graph.add_state(first).unwrap();
    let walk = graph.add_state(first).unwrap();
    let foreign = graph.add_state(second).unwrap();
    let sample = graph.add_state_sample(idle).unwrap();
    graph.set_sample_animation(sample, animation).unwrap();
    let trigger = graph.add_parameter(first).unwrap();
    graph.set_parameter_value(trigger, 1.0).unwrap();

    let t = graph.add_transition_from_state(idle).unwrap();
    graph
        .set_transition_condition(t, trigger, CompareOp::Greater, 0.5)
        .unwrap();
    assert!(matches!(
        graph.set_transition_target(t, foreign),
        Err(Error::ForeignState { .. })
    ));
    assert!(graph.transition(t).unwrap().to_state.is_null());

    graph
        .set_machine_joint_entities(first, &[entity(1)])
        .unwrap();
    graph.set_machine_active_state(first, idle).unwrap();
    graph.tick(&mut world, 0.1);
    graph.remove_state_machine(second).unwrap();
    graph.tick(&mut world, 0.1);
    assert_eq!(graph.machine_active_state(first), Some(idle));

    graph.set_transition_target(t, walk).unwrap();
    assert_eq!(graph.transition(t).unwrap().to_state, walk);
}

#[test]
fn joint_map_replacement_releases_the_old_map() {
    let mut graph = AnimationGraph::with_limits(small_limits()).unwrap();
    let machine = graph.add_state_machine().unwrap();
    graph
        .set_machine_joint_entities(machine, &[entity(1); 6])
        .unwrap();
    graph
        .set_machine_joint_entities(machine, &[entity(2), entity(3), entity(4)])
        .unwrap();
    assert_eq!(
        graph.machine_joint_entities(machine),
        &[entity(2), entity(3), entity(4)]
    );

    assert!(matches!(
        graph.set_machine_joint_entities(machine, &[entity(5); 9]),
        Err(Error::PoolExhausted { .. })
    ));
    assert!(graph.machine_joint_entities(machine).is_empty());

    graph.set_machine_joint_entities(machine, &[]).unwrap();
    assert!(graph.machine_joint_entities(machine).is_empty());
}

#[test]
fn masks_resolve_joints_through_the_skin() {
    let skin = Skin::new(vec![
        Joint::new(0, "hips", None),
        Joint::new(1, "spine", Some(0)),
        Joint::new(2, "arm", Some(1)),
        Joint::new(3, "hand", Some(2)),
        Joint::new(4, "leg", Some(0)),
    ]);
    let mut graph = AnimationGraph::new();
    let mask = graph.add_mask().unwrap();

    graph.mask_joint(mask, &skin, name_hash("leg")).unwrap();
    assert!(graph.is_joint_masked(mask, 4));
    assert!(!graph.is_joint_masked(mask, 0));

    let err = graph
        .mask_joints(mask, &skin, &[name_hash("hips"), name_hash("tail")])
        .unwrap_err();
    assert!(matches!(err, Error::UnknownJoint { name_hash: h } if h == name_hash("tail")));
    assert!(!graph.is_joint_masked(mask, 0));

    graph.clear_mask(mask).unwrap();
    graph.mask_joint_hierarchy(mask, &skin, name_hash("spine")).unwrap();
    assert_eq!(graph.mask(mask).unwrap().iter().collect::<Vec<_>>(), vec![1, 2, 3]);

    graph.unmask_joint_index(mask, 2).unwrap();
    assert!(!graph.is_joint_masked(mask, 2));
    assert!(graph.mask_joint_index(mask, 1000).is_err());

    let machine = graph.add_state_machine().unwrap();
    let state = graph.add_state(machine).unwrap();
    graph.set_state_mask(state, mask).unwrap();
    assert_eq!(graph.state(state).unwrap().mask, mask);

    graph.remove_mask(mask).unwrap();
    assert!(graph.mask(mask).is_none());
    assert!(!graph.is_joint_masked(mask, 1));
    assert!(graph.set_state_mask(state, mask).is_err());
}

#[test]
fn sample_animation_handles_are_stored_verbatim() {
    let mut graph = AnimationGraph::new();
    let machine = graph.add_state_machine().unwrap();
    let state = graph.add_state(machine).unwrap();
    let sample = graph.add_state_sample(state).unwrap();
    let animation = AnimationHandle::from_raw_parts(7, 3);
    graph.set_sample_animation(sample, animation).unwrap();
    assert_eq!(graph.sample(sample).unwrap().animation, animation);
}
