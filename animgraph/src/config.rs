//! Capacity limits for an [`AnimationGraph`](crate::AnimationGraph).

use crate::Error;

pub const MAX_STATE_MACHINES: usize = 256;
pub const MAX_STATES: usize = 1024;
pub const MAX_TRANSITIONS: usize = 2048;
pub const MAX_PARAMETERS: usize = 1024;
pub const MAX_SAMPLES: usize = 2048;
pub const MAX_MASKS: usize = 64;
/// Total joint-to-entity entries shared by all state machines.
pub const MAX_JOINT_MAP_ENTRIES: usize = 16384;

/// Joints addressable by a single pose.
pub const MAX_JOINTS: usize = 256;
/// Samples considered by one blend-weight evaluation. Extra samples are ignored.
pub const MAX_BLEND_STATE_ANIMS: usize = 16;

/// Pool capacities of a graph. Every pool is sized once, when the graph is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GraphLimits {
    pub state_machines: usize,
    pub states: usize,
    pub transitions: usize,
    pub parameters: usize,
    pub samples: usize,
    pub masks: usize,
    pub joint_map_entries: usize,
}

impl Default for GraphLimits {
    fn default() -> Self {
        Self {
            state_machines: MAX_STATE_MACHINES,
            states: MAX_STATES,
            transitions: MAX_TRANSITIONS,
            parameters: MAX_PARAMETERS,
            samples: MAX_SAMPLES,
            masks: MAX_MASKS,
            joint_map_entries: MAX_JOINT_MAP_ENTRIES,
        }
    }
}

impl GraphLimits {
    pub fn validate(&self) -> Result<(), Error> {
        let fields = [
            ("state_machines", self.state_machines),
            ("states", self.states),
            ("transitions", self.transitions),
            ("parameters", self.parameters),
            ("samples", self.samples),
            ("masks", self.masks),
            ("joint_map_entries", self.joint_map_entries),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(Error::InvalidValue {
                    message: format!("graph limit '{name}' must be > 0"),
                });
            }
            if value > u32::MAX as usize {
                return Err(Error::InvalidValue {
                    message: format!("graph limit '{name}' exceeds the handle index range"),
                });
            }
        }
        Ok(())
    }
}
