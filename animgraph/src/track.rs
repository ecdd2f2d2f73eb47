//! Keyframe animation tracks and their sampler.

use crate::{Error, Handle, Pool};
use glam::{Quat, Vec3, Vec4};

pub type AnimationHandle = Handle<AnimationTrack>;

const SEGMENT_EPSILON: f32 = 1.0e-12;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interpolation {
    Step,
    #[default]
    Linear,
    /// Cubic Hermite spline with explicit in/out tangents per keyframe.
    CubicSpline,
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
    pub in_tangent: T,
    pub out_tangent: T,
}

impl<T: TrackValue> Keyframe<T> {
    pub fn new(time: f32, value: T) -> Self {
        Self {
            time,
            value,
            in_tangent: T::ZERO_TANGENT,
            out_tangent: T::ZERO_TANGENT,
        }
    }

    pub fn with_tangents(time: f32, value: T, in_tangent: T, out_tangent: T) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }
}

/// Values a channel can be keyed with.
pub trait TrackValue: Copy {
    const ZERO_TANGENT: Self;

    fn interpolate_linear(self, to: Self, t: f32) -> Self;

    /// Hermite segment between `(self, out_tangent)` and `(to, in_tangent)` spanning `duration`
    /// seconds.
    fn interpolate_hermite(
        self,
        out_tangent: Self,
        to: Self,
        in_tangent: Self,
        t: f32,
        duration: f32,
    ) -> Self;
}

fn hermite_basis(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        2.0 * t3 - 3.0 * t2 + 1.0,
        t3 - 2.0 * t2 + t,
        -2.0 * t3 + 3.0 * t2,
        t3 - t2,
    ]
}

impl TrackValue for Vec3 {
    const ZERO_TANGENT: Self = Vec3::ZERO;

    fn interpolate_linear(self, to: Self, t: f32) -> Self {
        self.lerp(to, t)
    }

    fn interpolate_hermite(
        self,
        out_tangent: Self,
        to: Self,
        in_tangent: Self,
        t: f32,
        duration: f32,
    ) -> Self {
        let [h00, h10, h01, h11] = hermite_basis(t);
        self * h00 + out_tangent * (h10 * duration) + to * h01 + in_tangent * (h11 * duration)
    }
}

impl TrackValue for Quat {
    const ZERO_TANGENT: Self = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);

    fn interpolate_linear(self, to: Self, t: f32) -> Self {
        self.slerp(to, t)
    }

    fn interpolate_hermite(
        self,
        out_tangent: Self,
        to: Self,
        in_tangent: Self,
        t: f32,
        duration: f32,
    ) -> Self {
        let [h00, h10, h01, h11] = hermite_basis(t);
        let v = Vec4::from(self) * h00
            + Vec4::from(out_tangent) * (h10 * duration)
            + Vec4::from(to) * h01
            + Vec4::from(in_tangent) * (h11 * duration);
        Quat::from_vec4(v).normalize()
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelKeys {
    Position(Vec<Keyframe<Vec3>>),
    Rotation(Vec<Keyframe<Quat>>),
    Scale(Vec<Keyframe<Vec3>>),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ChannelValue {
    Position(Vec3),
    Rotation(Quat),
    Scale(Vec3),
}

/// One animated property of one joint.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel {
    pub node_index: u16,
    pub interpolation: Interpolation,
    pub keys: ChannelKeys,
}

impl Channel {
    pub fn position(
        node_index: u16,
        interpolation: Interpolation,
        keys: Vec<Keyframe<Vec3>>,
    ) -> Self {
        Self {
            node_index,
            interpolation,
            keys: ChannelKeys::Position(keys),
        }
    }

    pub fn rotation(
        node_index: u16,
        interpolation: Interpolation,
        keys: Vec<Keyframe<Quat>>,
    ) -> Self {
        Self {
            node_index,
            interpolation,
            keys: ChannelKeys::Rotation(keys),
        }
    }

    pub fn scale(node_index: u16, interpolation: Interpolation, keys: Vec<Keyframe<Vec3>>) -> Self {
        Self {
            node_index,
            interpolation,
            keys: ChannelKeys::Scale(keys),
        }
    }

    /// `None` when the channel has no keyframes.
    pub fn sample(&self, time: f32) -> Option<ChannelValue> {
        match &self.keys {
            ChannelKeys::Position(keys) => {
                sample_keys(keys, self.interpolation, time).map(ChannelValue::Position)
            }
            ChannelKeys::Rotation(keys) => {
                sample_keys(keys, self.interpolation, time).map(ChannelValue::Rotation)
            }
            ChannelKeys::Scale(keys) => {
                sample_keys(keys, self.interpolation, time).map(ChannelValue::Scale)
            }
        }
    }

    fn validate(&self) -> Result<(), Error> {
        let times: Vec<f32> = match &self.keys {
            ChannelKeys::Position(keys) | ChannelKeys::Scale(keys) => {
                keys.iter().map(|k| k.time).collect()
            }
            ChannelKeys::Rotation(keys) => keys.iter().map(|k| k.time).collect(),
        };
        if times.iter().any(|t| !t.is_finite()) {
            return Err(Error::InvalidValue {
                message: format!("non-finite keyframe time on node {}", self.node_index),
            });
        }
        if times.windows(2).any(|w| w[1] < w[0]) {
            return Err(Error::InvalidValue {
                message: format!("keyframe times on node {} are not sorted", self.node_index),
            });
        }
        Ok(())
    }
}

/// Samples a keyframe list, clamping to the first/last key outside of the keyed range.
pub fn sample_keys<T: TrackValue>(
    keys: &[Keyframe<T>],
    interpolation: Interpolation,
    time: f32,
) -> Option<T> {
    let first = keys.first()?;
    let index = keys.partition_point(|k| k.time <= time);
    if index == 0 {
        return Some(first.value);
    }
    if index >= keys.len() {
        return Some(keys[keys.len() - 1].value);
    }

    let prev = &keys[index - 1];
    let next = &keys[index];
    let duration = next.time - prev.time;
    if duration.abs() <= SEGMENT_EPSILON {
        return Some(next.value);
    }
    let t = ((time - prev.time) / duration).clamp(0.0, 1.0);

    Some(match interpolation {
        Interpolation::Step => prev.value,
        Interpolation::Linear => prev.value.interpolate_linear(next.value, t),
        Interpolation::CubicSpline => prev.value.interpolate_hermite(
            prev.out_tangent,
            next.value,
            next.in_tangent,
            t,
            duration,
        ),
    })
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationTrack {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl AnimationTrack {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
            channels: Vec::new(),
        }
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channels.push(channel);
        self
    }

    /// Sampled value of every non-empty channel, in channel order.
    pub fn sample(&self, time: f32) -> impl Iterator<Item = (u16, ChannelValue)> + '_ {
        self.channels
            .iter()
            .filter_map(move |channel| channel.sample(time).map(|v| (channel.node_index, v)))
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(Error::InvalidValue {
                message: format!("track '{}' duration must be finite and >= 0", self.name),
            });
        }
        self.channels.iter().try_for_each(Channel::validate)
    }
}

/// Resolves animation handles to tracks during a graph tick.
pub trait AnimationSource {
    fn animation(&self, handle: AnimationHandle) -> Option<&AnimationTrack>;
}

/// Pool-backed track store.
#[derive(Debug)]
pub struct AnimationLibrary {
    tracks: Pool<AnimationTrack>,
}

impl AnimationLibrary {
    pub fn new(capacity: usize) -> Self {
        Self {
            tracks: Pool::new("animation track", capacity),
        }
    }

    pub fn add(&mut self, track: AnimationTrack) -> Result<AnimationHandle, Error> {
        track.validate()?;
        let name = track.name.clone();
        let handle = self.tracks.add(track)?;
        log::debug!("registered animation track '{name}' as {handle}");
        Ok(handle)
    }

    pub fn remove(&mut self, handle: AnimationHandle) -> Option<AnimationTrack> {
        self.tracks.remove(handle)
    }

    pub fn get(&self, handle: AnimationHandle) -> Option<&AnimationTrack> {
        self.tracks.get(handle)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl AnimationSource for AnimationLibrary {
    fn animation(&self, handle: AnimationHandle) -> Option<&AnimationTrack> {
        self.tracks.get(handle)
    }
}
