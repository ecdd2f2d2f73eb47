use super::pose::PoseFrame;
use crate::list::{self, Linked};
use crate::{
    AnimationHandle, Arena, BlendMode, CompareOp, EntityHandle, Error, GraphLimits, Mask,
    MaskHandle, Parameter, ParameterHandle, Pool, Sample, SampleHandle, Skin, State,
    StateHandle, StateMachine, StateMachineHandle, Transition, TransitionHandle,
};
use glam::Vec2;

/// Owner of every state machine, state, transition, parameter, sample and mask.
///
/// Objects are only created through the `add_*` calls and live until their state machine is
/// removed (masks until [`AnimationGraph::remove_mask`]). Capacities are fixed by the
/// [`GraphLimits`] the graph was built with.
#[derive(Debug)]
pub struct AnimationGraph {
    limits: GraphLimits,
    pub(crate) machines: Pool<StateMachine>,
    pub(crate) states: Pool<State>,
    pub(crate) transitions: Pool<Transition>,
    pub(crate) parameters: Pool<Parameter>,
    pub(crate) samples: Pool<Sample>,
    pub(crate) masks: Pool<Mask>,
    pub(crate) joint_maps: Arena<EntityHandle>,
    pub(crate) frame: PoseFrame,
}

impl Default for AnimationGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationGraph {
    pub fn new() -> Self {
        Self::build(GraphLimits::default())
    }

    pub fn with_limits(limits: GraphLimits) -> Result<Self, Error> {
        limits.validate()?;
        Ok(Self::build(limits))
    }

    fn build(limits: GraphLimits) -> Self {
        Self {
            limits,
            machines: Pool::new("state machine", limits.state_machines),
            states: Pool::new("state", limits.states),
            transitions: Pool::new("transition", limits.transitions),
            parameters: Pool::new("parameter", limits.parameters),
            samples: Pool::new("sample", limits.samples),
            masks: Pool::new("mask", limits.masks),
            joint_maps: Arena::new(
                "joint map",
                limits.state_machines,
                limits.joint_map_entries,
            ),
            frame: PoseFrame::default(),
        }
    }

    pub fn limits(&self) -> &GraphLimits {
        &self.limits
    }

    // State machines.

    pub fn add_state_machine(&mut self) -> Result<StateMachineHandle, Error> {
        let handle = self.machines.add(StateMachine::default())?;
        log::debug!("added state machine {handle}");
        Ok(handle)
    }

    /// Removes the machine together with its parameters, states, their transitions and samples,
    /// and its joint map. Masks referenced by its states are left alone.
    pub fn remove_state_machine(&mut self, machine: StateMachineHandle) -> Result<(), Error> {
        let owned = self.machines.try_get(machine)?.clone();

        let parameters = list::remove_all(&mut self.parameters, owned.parameters);

        let mut states = 0;
        let mut transitions = 0;
        let mut samples = 0;
        let mut cur = owned.states;
        while let Some(state) = self.states.get(cur) {
            let (next, state_transitions, state_samples) =
                (state.next(), state.transitions, state.samples);
            transitions += list::remove_all(&mut self.transitions, state_transitions);
            samples += list::remove_all(&mut self.samples, state_samples);
            self.states.remove(cur);
            states += 1;
            cur = next;
        }

        self.joint_maps.free(owned.joint_entities);
        self.machines.remove(machine);

        log::debug!(
            "removed state machine {machine}: {states} states, {transitions} transitions, \
             {parameters} parameters, {samples} samples"
        );
        Ok(())
    }

    pub fn machine_count(&self) -> usize {
        self.machines.len()
    }

    pub fn state_machine(&self, machine: StateMachineHandle) -> Option<&StateMachine> {
        self.machines.get(machine)
    }

    pub fn machine_active_state(&self, machine: StateMachineHandle) -> Option<StateHandle> {
        self.machines
            .get(machine)
            .and_then(|m| m.active_state.non_null())
    }

    pub fn machine_active_transition(
        &self,
        machine: StateMachineHandle,
    ) -> Option<TransitionHandle> {
        self.machines
            .get(machine)
            .and_then(|m| m.active_transition.non_null())
    }

    /// Switches the active state. Outgoing transitions of the previous state lose their
    /// progress and any running cross-fade is dropped.
    pub fn set_machine_active_state(
        &mut self,
        machine: StateMachineHandle,
        state: StateHandle,
    ) -> Result<(), Error> {
        let owner = self.machines.try_get(machine)?;
        self.states.try_get(state)?;
        if !list::iter(&self.states, owner.states).any(|(h, _)| h == state) {
            return Err(Error::ForeignState {
                machine: machine.to_string(),
                state: state.to_string(),
            });
        }
        let previous = owner.active_state;

        self.reset_state_transitions(previous);
        let owner = self.machines.try_get_mut(machine)?;
        owner.active_state = state;
        owner.active_transition = TransitionHandle::NULL;
        log::debug!("state machine {machine}: active state {previous} -> {state}");
        Ok(())
    }

    pub(crate) fn reset_state_transitions(&mut self, state: StateHandle) {
        let head = match self.states.get(state) {
            Some(s) => s.transitions,
            None => return,
        };
        let mut cur = head;
        while let Some(transition) = self.transitions.get_mut(cur) {
            transition.reset();
            cur = transition.next();
        }
    }

    /// Maps local joint indices to scene entities. An empty map disables the machine.
    ///
    /// The previous map is released first; if the new one does not fit, the machine is left
    /// without a map.
    pub fn set_machine_joint_entities(
        &mut self,
        machine: StateMachineHandle,
        entities: &[EntityHandle],
    ) -> Result<(), Error> {
        let owner = self.machines.try_get_mut(machine)?;
        self.joint_maps.free(owner.joint_entities);
        owner.joint_entities = Default::default();
        if !entities.is_empty() {
            owner.joint_entities = self.joint_maps.allocate(entities)?;
        }
        Ok(())
    }

    pub fn machine_joint_entities(&self, machine: StateMachineHandle) -> &[EntityHandle] {
        self.machines
            .get(machine)
            .and_then(|m| self.joint_maps.get(m.joint_entities))
            .unwrap_or(&[])
    }

    pub fn machine_states(
        &self,
        machine: StateMachineHandle,
    ) -> impl Iterator<Item = StateHandle> + '_ {
        let head = self
            .machines
            .get(machine)
            .map(|m| m.states)
            .unwrap_or_default();
        list::iter(&self.states, head).map(|(h, _)| h)
    }

    pub fn machine_parameters(
        &self,
        machine: StateMachineHandle,
    ) -> impl Iterator<Item = ParameterHandle> + '_ {
        let head = self
            .machines
            .get(machine)
            .map(|m| m.parameters)
            .unwrap_or_default();
        list::iter(&self.parameters, head).map(|(h, _)| h)
    }

    // Parameters.

    pub fn add_parameter(&mut self, machine: StateMachineHandle) -> Result<ParameterHandle, Error> {
        self.machines.try_get(machine)?;
        let handle = self.parameters.add(Parameter::default())?;
        let owner = self.machines.try_get_mut(machine)?;
        list::append(&mut self.parameters, &mut owner.parameters, handle);
        Ok(handle)
    }

    pub fn parameter(&self, parameter: ParameterHandle) -> Option<&Parameter> {
        self.parameters.get(parameter)
    }

    pub fn parameter_value(&self, parameter: ParameterHandle) -> Option<f32> {
        self.parameters.get(parameter).map(|p| p.value)
    }

    pub fn set_parameter_value(
        &mut self,
        parameter: ParameterHandle,
        value: f32,
    ) -> Result<(), Error> {
        self.parameters.try_get_mut(parameter)?.value = value;
        Ok(())
    }

    // States.

    pub fn add_state(&mut self, machine: StateMachineHandle) -> Result<StateHandle, Error> {
        self.machines.try_get(machine)?;
        let handle = self.states.add(State::default())?;
        let owner = self.machines.try_get_mut(machine)?;
        list::append(&mut self.states, &mut owner.states, handle);
        Ok(handle)
    }

    pub fn state(&self, state: StateHandle) -> Option<&State> {
        self.states.get(state)
    }

    pub fn state_time(&self, state: StateHandle) -> Option<f32> {
        self.states.get(state).map(|s| s.current_time)
    }

    pub fn set_state_duration(&mut self, state: StateHandle, duration: f32) -> Result<(), Error> {
        check_duration(duration, "state duration")?;
        self.states.try_get_mut(state)?.duration = duration;
        Ok(())
    }

    pub fn set_state_looping(&mut self, state: StateHandle, is_looping: bool) -> Result<(), Error> {
        self.states.try_get_mut(state)?.is_looping = is_looping;
        Ok(())
    }

    pub fn set_state_time(&mut self, state: StateHandle, time: f32) -> Result<(), Error> {
        let state = self.states.try_get_mut(state)?;
        if !time.is_finite() {
            return Err(Error::InvalidValue {
                message: "state time must be finite".to_string(),
            });
        }
        state.current_time = time.clamp(0.0, state.duration);
        Ok(())
    }

    pub fn set_state_blend_mode(
        &mut self,
        state: StateHandle,
        blend_mode: BlendMode,
    ) -> Result<(), Error> {
        match blend_mode {
            BlendMode::None => {}
            BlendMode::Blend1D { x } => {
                self.parameters.try_get(x)?;
            }
            BlendMode::Blend2D { x, y } => {
                self.parameters.try_get(x)?;
                self.parameters.try_get(y)?;
            }
        }
        self.states.try_get_mut(state)?.blend_mode = blend_mode;
        Ok(())
    }

    /// Attaches `mask` to the state; the null handle detaches it.
    pub fn set_state_mask(&mut self, state: StateHandle, mask: MaskHandle) -> Result<(), Error> {
        if !mask.is_null() {
            self.masks.try_get(mask)?;
        }
        self.states.try_get_mut(state)?.mask = mask;
        Ok(())
    }

    pub fn state_samples(&self, state: StateHandle) -> impl Iterator<Item = SampleHandle> + '_ {
        let head = self
            .states
            .get(state)
            .map(|s| s.samples)
            .unwrap_or_default();
        list::iter(&self.samples, head).map(|(h, _)| h)
    }

    pub fn state_transitions(
        &self,
        state: StateHandle,
    ) -> impl Iterator<Item = TransitionHandle> + '_ {
        let head = self
            .states
            .get(state)
            .map(|s| s.transitions)
            .unwrap_or_default();
        list::iter(&self.transitions, head).map(|(h, _)| h)
    }

    // Samples.

    pub fn add_state_sample(&mut self, state: StateHandle) -> Result<SampleHandle, Error> {
        self.states.try_get(state)?;
        let handle = self.samples.add(Sample::default())?;
        let owner = self.states.try_get_mut(state)?;
        list::append(&mut self.samples, &mut owner.samples, handle);
        Ok(handle)
    }

    pub fn sample(&self, sample: SampleHandle) -> Option<&Sample> {
        self.samples.get(sample)
    }

    pub fn set_sample_animation(
        &mut self,
        sample: SampleHandle,
        animation: AnimationHandle,
    ) -> Result<(), Error> {
        self.samples.try_get_mut(sample)?.animation = animation;
        Ok(())
    }

    pub fn set_sample_blend_point(
        &mut self,
        sample: SampleHandle,
        blend_point: Vec2,
    ) -> Result<(), Error> {
        if !blend_point.is_finite() {
            return Err(Error::InvalidValue {
                message: "blend point must be finite".to_string(),
            });
        }
        self.samples.try_get_mut(sample)?.blend_point = blend_point;
        Ok(())
    }

    // Transitions.

    pub fn add_transition_from_state(
        &mut self,
        state: StateHandle,
    ) -> Result<TransitionHandle, Error> {
        self.states.try_get(state)?;
        let handle = self.transitions.add(Transition::default())?;
        let owner = self.states.try_get_mut(state)?;
        list::append(&mut self.transitions, &mut owner.transitions, handle);
        Ok(handle)
    }

    pub fn transition(&self, transition: TransitionHandle) -> Option<&Transition> {
        self.transitions.get(transition)
    }

    pub fn transition_time(&self, transition: TransitionHandle) -> Option<f32> {
        self.transitions.get(transition).map(|t| t.current_time)
    }

    /// The target must belong to the machine owning the transition's source state.
    pub fn set_transition_target(
        &mut self,
        transition: TransitionHandle,
        to_state: StateHandle,
    ) -> Result<(), Error> {
        self.transitions.try_get(transition)?;
        self.states.try_get(to_state)?;
        let source_owner = self.transition_owner(transition);
        if source_owner != self.state_owner(to_state) {
            return Err(Error::ForeignState {
                machine: source_owner.unwrap_or_default().to_string(),
                state: to_state.to_string(),
            });
        }
        self.transitions.try_get_mut(transition)?.to_state = to_state;
        Ok(())
    }

    fn state_owner(&self, state: StateHandle) -> Option<StateMachineHandle> {
        self.machines
            .iter()
            .find(|(_, m)| list::iter(&self.states, m.states).any(|(h, _)| h == state))
            .map(|(h, _)| h)
    }

    fn transition_owner(&self, transition: TransitionHandle) -> Option<StateMachineHandle> {
        self.machines
            .iter()
            .find(|(_, m)| {
                list::iter(&self.states, m.states).any(|(_, s)| {
                    list::iter(&self.transitions, s.transitions).any(|(h, _)| h == transition)
                })
            })
            .map(|(h, _)| h)
    }

    /// The transition fires while `parameter <compare> target_value` holds.
    pub fn set_transition_condition(
        &mut self,
        transition: TransitionHandle,
        parameter: ParameterHandle,
        compare: CompareOp,
        target_value: f32,
    ) -> Result<(), Error> {
        self.parameters.try_get(parameter)?;
        let t = self.transitions.try_get_mut(transition)?;
        t.parameter = parameter;
        t.compare = compare;
        t.target_value = target_value;
        Ok(())
    }

    pub fn set_transition_duration(
        &mut self,
        transition: TransitionHandle,
        duration: f32,
    ) -> Result<(), Error> {
        check_duration(duration, "transition duration")?;
        self.transitions.try_get_mut(transition)?.duration = duration;
        Ok(())
    }

    pub fn set_transition_priority(
        &mut self,
        transition: TransitionHandle,
        priority: u8,
    ) -> Result<(), Error> {
        self.transitions.try_get_mut(transition)?.priority = priority;
        Ok(())
    }

    // Masks.

    pub fn add_mask(&mut self) -> Result<MaskHandle, Error> {
        self.masks.add(Mask::new())
    }

    /// States still pointing at the mask sample unmasked from now on.
    pub fn remove_mask(&mut self, mask: MaskHandle) -> Result<(), Error> {
        self.masks.remove(mask).ok_or(Error::InvalidHandle { kind: "mask" })?;
        Ok(())
    }

    pub fn mask(&self, mask: MaskHandle) -> Option<&Mask> {
        self.masks.get(mask)
    }

    pub fn is_joint_masked(&self, mask: MaskHandle, joint_index: u16) -> bool {
        self.masks.get(mask).is_some_and(|m| m.contains(joint_index))
    }

    pub fn mask_joint_index(&mut self, mask: MaskHandle, joint_index: u16) -> Result<(), Error> {
        self.masks.try_get_mut(mask)?.insert(joint_index)?;
        Ok(())
    }

    pub fn unmask_joint_index(&mut self, mask: MaskHandle, joint_index: u16) -> Result<(), Error> {
        self.masks.try_get_mut(mask)?.remove(joint_index);
        Ok(())
    }

    pub fn clear_mask(&mut self, mask: MaskHandle) -> Result<(), Error> {
        self.masks.try_get_mut(mask)?.clear();
        Ok(())
    }

    /// Masks the joint of `skin` whose name hashes to `name_hash`.
    pub fn mask_joint(&mut self, mask: MaskHandle, skin: &Skin, name_hash: u32) -> Result<(), Error> {
        let node_index = skin
            .node_index(name_hash)
            .ok_or(Error::UnknownJoint { name_hash })?;
        self.mask_joint_index(mask, node_index)
    }

    /// Masks several joints by name hash. Nothing is masked if any hash is unknown.
    pub fn mask_joints(
        &mut self,
        mask: MaskHandle,
        skin: &Skin,
        name_hashes: &[u32],
    ) -> Result<(), Error> {
        self.masks.try_get(mask)?;
        if let Some(&name_hash) = name_hashes.iter().find(|h| skin.node_index(**h).is_none()) {
            return Err(Error::UnknownJoint { name_hash });
        }
        let target = self.masks.try_get_mut(mask)?;
        let mut staged = target.clone();
        for &name_hash in name_hashes {
            if let Some(node_index) = skin.node_index(name_hash) {
                staged.insert(node_index)?;
            }
        }
        *target = staged;
        Ok(())
    }

    /// Masks the named joint and every joint below it in the skin hierarchy.
    pub fn mask_joint_hierarchy(
        &mut self,
        mask: MaskHandle,
        skin: &Skin,
        name_hash: u32,
    ) -> Result<(), Error> {
        let root = skin
            .node_index(name_hash)
            .ok_or(Error::UnknownJoint { name_hash })?;
        let target = self.masks.try_get_mut(mask)?;
        let mut staged = target.clone();
        for node_index in skin.descendants(root) {
            staged.insert(node_index)?;
        }
        *target = staged;
        Ok(())
    }
}

fn check_duration(duration: f32, what: &str) -> Result<(), Error> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(Error::InvalidValue {
            message: format!("{what} must be finite and >= 0"),
        });
    }
    Ok(())
}
