use crate::{AnimationTrack, ChannelValue, MAX_JOINTS, Mask};
use bitflags::bitflags;
use glam::{Quat, Vec3};

bitflags! {
    /// Channels holding a valid value in a [`JointPose`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Channels: u8 {
        const POSITION = 0x1;
        const ROTATION = 0x2;
        const SCALE = 0x4;
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JointPose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub channels: Channels,
}

impl JointPose {
    pub const EMPTY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
        channels: Channels::empty(),
    };

    pub fn has_position(&self) -> bool {
        self.channels.contains(Channels::POSITION)
    }

    pub fn has_rotation(&self) -> bool {
        self.channels.contains(Channels::ROTATION)
    }

    pub fn has_scale(&self) -> bool {
        self.channels.contains(Channels::SCALE)
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.channels |= Channels::POSITION;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.channels |= Channels::ROTATION;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.channels |= Channels::SCALE;
    }
}

impl Default for JointPose {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Per-joint local transforms with per-channel presence flags.
///
/// Joints at or beyond `joint_count` never carry presence flags.
#[derive(Clone, Debug, PartialEq)]
pub struct Pose {
    joints: Box<[JointPose]>,
    joint_count: u16,
}

impl Pose {
    pub fn new() -> Self {
        Self {
            joints: vec![JointPose::EMPTY; MAX_JOINTS].into_boxed_slice(),
            joint_count: 0,
        }
    }

    pub fn joint_count(&self) -> u16 {
        self.joint_count
    }

    pub fn joint(&self, index: u16) -> Option<&JointPose> {
        self.joints.get(index as usize)
    }

    pub fn joint_mut(&mut self, index: u16) -> Option<&mut JointPose> {
        let joint = self.joints.get_mut(index as usize)?;
        self.joint_count = self.joint_count.max(index + 1);
        Some(joint)
    }

    /// Joints below `joint_count`, with their node index.
    pub fn joints(&self) -> impl Iterator<Item = (u16, &JointPose)> + '_ {
        self.joints[..self.joint_count as usize]
            .iter()
            .enumerate()
            .map(|(i, joint)| (i as u16, joint))
    }

    /// Empties the pose: every joint that was in use loses its presence flags.
    pub fn reset(&mut self) {
        for joint in &mut self.joints[..self.joint_count as usize] {
            joint.channels = Channels::empty();
        }
        self.joint_count = 0;
    }

    /// Writes every channel of `track` at `time` whose joint is not in `mask`.
    pub fn sample_from_animation(&mut self, track: &AnimationTrack, time: f32, mask: Option<&Mask>) {
        for (node_index, value) in track.sample(time) {
            if mask.is_some_and(|m| m.contains(node_index)) {
                continue;
            }
            let Some(joint) = self.joint_mut(node_index) else {
                log::trace!(
                    "track '{}' keys node {node_index} beyond the pose capacity",
                    track.name
                );
                continue;
            };
            match value {
                ChannelValue::Position(position) => joint.set_position(position),
                ChannelValue::Rotation(rotation) => joint.set_rotation(rotation),
                ChannelValue::Scale(scale) => joint.set_scale(scale),
            }
        }
    }

    /// Mixes `other` into this pose, `other_ratio` being `other`'s share.
    ///
    /// Channels present on both sides are interpolated (slerp for rotations), channels present
    /// only on `other` are copied, channels present only here are kept.
    pub fn blend_from(&mut self, other: &Pose, other_ratio: f32) {
        let count = self.joint_count.max(other.joint_count);
        for (joint, theirs) in self.joints[..count as usize]
            .iter_mut()
            .zip(&other.joints[..count as usize])
        {
            if joint.channels.is_empty() && theirs.channels.is_empty() {
                continue;
            }

            if theirs.has_position() {
                joint.position = if joint.has_position() {
                    joint.position.lerp(theirs.position, other_ratio)
                } else {
                    theirs.position
                };
            }
            if theirs.has_rotation() {
                joint.rotation = if joint.has_rotation() {
                    joint.rotation.slerp(theirs.rotation, other_ratio)
                } else {
                    theirs.rotation
                };
            }
            if theirs.has_scale() {
                joint.scale = if joint.has_scale() {
                    joint.scale.lerp(theirs.scale, other_ratio)
                } else {
                    theirs.scale
                };
            }
            joint.channels |= theirs.channels;
        }
        self.joint_count = count;
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new()
    }
}

/// Scratch poses shared by every machine evaluated during one tick.
#[derive(Debug, Default)]
pub(crate) struct PoseFrame {
    pub(crate) source: Pose,
    pub(crate) target: Pose,
    pub(crate) scratch: Pose,
}

impl PoseFrame {
    pub(crate) fn reset(&mut self) {
        self.source.reset();
        self.target.reset();
        self.scratch.reset();
    }
}
