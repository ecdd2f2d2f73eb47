use super::pose::Pose;
use crate::list;
use crate::{
    AnimationGraph, AnimationHandle, AnimationSource, AnimationTrack, BlendInput, BlendMode,
    EntityHandle, Mask, Parameter, ParameterHandle, Pool, Sample, SceneGraph, State,
    StateHandle, StateMachineHandle, Transition, TransitionHandle, compute_blend_weights,
};
use glam::{Quat, Vec2, Vec3};

impl AnimationGraph {
    /// Advances every state machine by `dt` seconds and writes the resulting joint transforms to
    /// `world`.
    ///
    /// Machines without an active state or without a joint map are skipped. Negative or
    /// non-finite deltas are ignored.
    pub fn tick<W>(&mut self, world: &mut W, dt: f32)
    where
        W: AnimationSource + SceneGraph,
    {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("ignoring tick with invalid delta {dt}");
            return;
        }

        self.frame.reset();
        for index in 0..self.machines.slot_count() {
            if let Some(machine) = self.machines.handle_at(index) {
                self.tick_machine(machine, world, dt);
            }
        }
    }

    /// [`AnimationGraph::tick`] for callers keeping tracks and scene graph apart.
    pub fn tick_with<A, S>(&mut self, animations: &A, scene: &mut S, dt: f32)
    where
        A: AnimationSource + ?Sized,
        S: SceneGraph + ?Sized,
    {
        let mut world = SplitWorld { animations, scene };
        self.tick(&mut world, dt);
    }

    fn tick_machine<W>(&mut self, machine: StateMachineHandle, world: &mut W, dt: f32)
    where
        W: AnimationSource + SceneGraph,
    {
        let Some(m) = self.machines.get(machine) else {
            return;
        };
        let (active_state, active_transition, joint_map) =
            (m.active_state, m.active_transition, m.joint_entities);
        if active_state.is_null()
            || self
                .joint_maps
                .get(joint_map)
                .is_none_or(|joints| joints.is_empty())
        {
            return;
        }

        let frame = &mut self.frame;
        let evaluated = evaluate_state(
            &mut self.states,
            &self.samples,
            &self.masks,
            &self.parameters,
            &*world,
            active_state,
            dt,
            &mut frame.source,
            &mut frame.scratch,
        );
        debug_assert!(
            evaluated,
            "state machine {machine} has stale active state {active_state}"
        );
        if !evaluated {
            log::warn!("state machine {machine} has stale active state {active_state}, skipping");
            return;
        }

        let head = self
            .states
            .get(active_state)
            .map(|s| s.transitions)
            .unwrap_or_default();
        let mut next_transition = arbitrate(
            &mut self.transitions,
            &self.parameters,
            &self.states,
            head,
            active_transition,
        );
        if next_transition != active_transition && !next_transition.is_null() {
            log::debug!("state machine {machine}: transition {next_transition} started");
        }

        let mut next_state = active_state;
        let to_state = self
            .transitions
            .get(next_transition)
            .map(|t| t.to_state)
            .unwrap_or_default();
        if !next_transition.is_null()
            && evaluate_state(
                &mut self.states,
                &self.samples,
                &self.masks,
                &self.parameters,
                &*world,
                to_state,
                dt,
                &mut frame.target,
                &mut frame.scratch,
            )
        {
            let ratio = self
                .transitions
                .get_mut(next_transition)
                .map_or(1.0, |t| t.progress(dt));
            // The source pose takes `1 - ratio` of the target.
            frame.source.blend_from(&frame.target, 1.0 - ratio);

            if Transition::is_complete(ratio) {
                if let Some(t) = self.transitions.get_mut(next_transition) {
                    t.reset();
                }
                log::debug!(
                    "state machine {machine}: transition {next_transition} completed, \
                     active state {active_state} -> {to_state}"
                );
                next_state = to_state;
                next_transition = TransitionHandle::NULL;
            }
        }

        if let Some(m) = self.machines.get_mut(machine) {
            m.active_state = next_state;
            m.active_transition = next_transition;
        }

        if let Some(joints) = self.joint_maps.get(joint_map) {
            apply_pose(&self.frame.source, joints, world);
        }
    }
}

/// Samples `state` into `out` through its blend tree, then advances the state's playhead.
///
/// Returns `false` when `state` does not resolve.
#[allow(clippy::too_many_arguments)]
fn evaluate_state<A: AnimationSource + ?Sized>(
    states: &mut Pool<State>,
    samples: &Pool<Sample>,
    masks: &Pool<Mask>,
    parameters: &Pool<Parameter>,
    animations: &A,
    state: StateHandle,
    dt: f32,
    out: &mut Pose,
    scratch: &mut Pose,
) -> bool {
    let Some(s) = states.get(state) else {
        return false;
    };
    let time = s.current_time;
    let mask = masks.get(s.mask);
    let weights = compute_blend_weights(
        s.blend_mode.space(),
        blend_point(s.blend_mode, parameters),
        list::iter(samples, s.samples).map(|(handle, sample)| BlendInput {
            sample: handle,
            animation: sample.animation,
            blend_point: sample.blend_point,
        }),
    );

    out.reset();
    let mut total = 0.0;
    for weight in weights.iter().filter(|w| w.weight > 0.0) {
        let Some(track) = resolve_track(animations, weight.animation) else {
            continue;
        };
        if total <= 0.0 {
            out.sample_from_animation(track, time, mask);
            total = weight.weight;
        } else {
            scratch.reset();
            scratch.sample_from_animation(track, time, mask);
            total += weight.weight;
            out.blend_from(scratch, weight.weight / total);
        }
    }

    if let Some(s) = states.get_mut(state) {
        s.progress(dt);
    }
    true
}

fn resolve_track<A: AnimationSource + ?Sized>(
    animations: &A,
    animation: AnimationHandle,
) -> Option<&AnimationTrack> {
    let track = animations.animation(animation);
    if track.is_none() {
        log::trace!("sample references missing animation {animation}");
    }
    track
}

fn blend_point(mode: BlendMode, parameters: &Pool<Parameter>) -> Vec2 {
    let value = |p: ParameterHandle| parameters.get(p).map_or(0.0, |p| p.value);
    match mode {
        BlendMode::None => Vec2::ZERO,
        BlendMode::Blend1D { x } => Vec2::new(value(x), 0.0),
        BlendMode::Blend2D { x, y } => Vec2::new(value(x), value(y)),
    }
}

fn condition_holds(t: &Transition, parameters: &Pool<Parameter>, states: &Pool<State>) -> bool {
    states.contains(t.to_state)
        && parameters
            .get(t.parameter)
            .is_some_and(|p| t.compare.evaluate(p.value, t.target_value))
}

/// Picks the active transition among the outgoing transitions starting at `head`.
///
/// The winner is the satisfied transition with the highest priority, the later one in list
/// order on equal priority. It replaces the current transition unless its priority is lower.
/// The current transition keeps its progress while it stays selected.
fn arbitrate(
    transitions: &mut Pool<Transition>,
    parameters: &Pool<Parameter>,
    states: &Pool<State>,
    head: TransitionHandle,
    active: TransitionHandle,
) -> TransitionHandle {
    let mut winner: Option<(TransitionHandle, u8)> = None;
    for (handle, t) in list::iter(transitions, head) {
        if !condition_holds(t, parameters, states) {
            continue;
        }
        if winner.is_none_or(|(_, priority)| t.priority >= priority) {
            winner = Some((handle, t.priority));
        }
    }

    let Some((candidate, priority)) = winner else {
        return if transitions.contains(active) {
            active
        } else {
            TransitionHandle::NULL
        };
    };
    if candidate == active {
        return active;
    }
    match transitions.get_mut(active) {
        None => candidate,
        Some(existing) if priority < existing.priority => active,
        Some(existing) => {
            existing.reset();
            candidate
        }
    }
}

fn apply_pose<S: SceneGraph + ?Sized>(pose: &Pose, joints: &[EntityHandle], scene: &mut S) {
    for (node_index, joint) in pose.joints() {
        if joint.channels.is_empty() {
            continue;
        }
        let Some(&entity) = joints.get(node_index as usize).filter(|e| !e.is_null()) else {
            log::trace!("no entity mapped to joint {node_index}");
            continue;
        };
        if joint.has_position() {
            scene.set_entity_position(entity, joint.position);
        }
        if joint.has_rotation() {
            scene.set_entity_rotation(entity, joint.rotation);
        }
        if joint.has_scale() {
            scene.set_entity_scale(entity, joint.scale);
        }
    }
}

struct SplitWorld<'a, A: ?Sized, S: ?Sized> {
    animations: &'a A,
    scene: &'a mut S,
}

impl<A: AnimationSource + ?Sized, S: ?Sized> AnimationSource for SplitWorld<'_, A, S> {
    fn animation(&self, handle: AnimationHandle) -> Option<&AnimationTrack> {
        self.animations.animation(handle)
    }
}

impl<A: ?Sized, S: SceneGraph + ?Sized> SceneGraph for SplitWorld<'_, A, S> {
    fn set_entity_position(&mut self, entity: EntityHandle, position: Vec3) {
        self.scene.set_entity_position(entity, position);
    }

    fn set_entity_rotation(&mut self, entity: EntityHandle, rotation: Quat) {
        self.scene.set_entity_rotation(entity, rotation);
    }

    fn set_entity_scale(&mut self, entity: EntityHandle, scale: Vec3) {
        self.scene.set_entity_scale(entity, scale);
    }
}
