use crate::list::Linked;
use crate::{AnimationHandle, ArenaHandle, BlendMode, EntityHandle, Handle, Mask};
use glam::Vec2;

pub type StateMachineHandle = Handle<StateMachine>;
pub type StateHandle = Handle<State>;
pub type TransitionHandle = Handle<Transition>;
pub type ParameterHandle = Handle<Parameter>;
pub type SampleHandle = Handle<Sample>;
pub type MaskHandle = Handle<Mask>;

/// Tolerance used when deciding that a transition has reached its end.
pub const TIME_EPSILON: f32 = 1.0e-6;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameter {
    pub value: f32,
    next: ParameterHandle,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sample {
    pub animation: AnimationHandle,
    pub blend_point: Vec2,
    next: SampleHandle,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct State {
    pub duration: f32,
    pub is_looping: bool,
    pub blend_mode: BlendMode,
    pub mask: MaskHandle,
    pub current_time: f32,
    pub(crate) samples: SampleHandle,
    pub(crate) transitions: TransitionHandle,
    next: StateHandle,
}

impl State {
    /// Advances the playhead by `dt`, wrapping when looping and clamping otherwise.
    pub fn progress(&mut self, dt: f32) {
        self.current_time = if self.is_looping && self.duration > 0.0 {
            (self.current_time + dt).rem_euclid(self.duration)
        } else {
            (self.current_time + dt).clamp(0.0, self.duration.max(0.0))
        };
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareOp {
    #[default]
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
}

impl CompareOp {
    /// `value <op> target`.
    pub fn evaluate(self, value: f32, target: f32) -> bool {
        match self {
            CompareOp::Equal => value == target,
            CompareOp::NotEqual => value != target,
            CompareOp::Greater => value > target,
            CompareOp::Less => value < target,
            CompareOp::GreaterOrEqual => value >= target,
            CompareOp::LessOrEqual => value <= target,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Transition {
    pub to_state: StateHandle,
    pub parameter: ParameterHandle,
    pub compare: CompareOp,
    pub target_value: f32,
    pub duration: f32,
    pub priority: u8,
    pub current_time: f32,
    next: TransitionHandle,
}

impl Transition {
    /// Advances the cross-fade by `dt` and returns the progress ratio in `[0, 1]`.
    ///
    /// A transition without duration completes immediately.
    pub fn progress(&mut self, dt: f32) -> f32 {
        if self.duration <= 0.0 {
            self.current_time = 0.0;
            return 1.0;
        }
        self.current_time = (self.current_time + dt).clamp(0.0, self.duration);
        self.current_time / self.duration
    }

    pub fn reset(&mut self) {
        self.current_time = 0.0;
    }

    pub(crate) fn is_complete(ratio: f32) -> bool {
        ratio >= 1.0 - TIME_EPSILON
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct StateMachine {
    pub active_state: StateHandle,
    pub active_transition: TransitionHandle,
    pub(crate) states: StateHandle,
    pub(crate) parameters: ParameterHandle,
    pub(crate) joint_entities: ArenaHandle<EntityHandle>,
}

macro_rules! impl_linked {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Linked for $ty {
                fn next(&self) -> Handle<Self> {
                    self.next
                }

                fn set_next(&mut self, next: Handle<Self>) {
                    self.next = next;
                }
            }
        )*
    };
}

impl_linked!(Parameter, Sample, State, Transition);
