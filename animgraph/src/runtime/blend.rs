use crate::{AnimationHandle, MAX_BLEND_STATE_ANIMS, ParameterHandle, SampleHandle};
use glam::Vec2;

/// Offset added to every distance before weighting.
pub const BLEND_DISTANCE_EPSILON: f32 = 1.0e-10;
/// Squared distance under which a sample is treated as an exact match.
pub const BLEND_EXACT_MATCH_DISTANCE_SQ: f32 = 1.0e-10;

/// How a state picks and weights its samples.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Only the first sample plays.
    #[default]
    None,
    /// Samples are weighted by their distance to the parameter value along x.
    Blend1D { x: ParameterHandle },
    /// Samples are weighted by their planar distance to `(x, y)`.
    Blend2D {
        x: ParameterHandle,
        y: ParameterHandle,
    },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlendWeight {
    pub sample: SampleHandle,
    pub animation: AnimationHandle,
    pub weight: f32,
}

impl BlendWeight {
    const EMPTY: Self = Self {
        sample: SampleHandle::NULL,
        animation: AnimationHandle::NULL,
        weight: 0.0,
    };
}

/// Fixed-capacity list of sample weights.
#[derive(Clone, Debug)]
pub struct BlendWeights {
    entries: [BlendWeight; MAX_BLEND_STATE_ANIMS],
    len: usize,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            entries: [BlendWeight::EMPTY; MAX_BLEND_STATE_ANIMS],
            len: 0,
        }
    }
}

impl BlendWeights {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[BlendWeight] {
        &self.entries[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlendWeight> + '_ {
        self.as_slice().iter()
    }

    pub fn total(&self) -> f32 {
        self.iter().map(|w| w.weight).sum()
    }

    fn is_full(&self) -> bool {
        self.len == MAX_BLEND_STATE_ANIMS
    }

    fn push(&mut self, weight: BlendWeight) {
        self.entries[self.len] = weight;
        self.len += 1;
    }

    fn clear(&mut self) {
        self.len = 0;
    }
}

/// A sample as seen by the weighting: its handle, animation and blend point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlendInput {
    pub sample: SampleHandle,
    pub animation: AnimationHandle,
    pub blend_point: Vec2,
}

/// Dimensionality of the space samples are weighted in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlendSpace {
    Single,
    OneD,
    TwoD,
}

impl BlendMode {
    pub fn space(&self) -> BlendSpace {
        match self {
            BlendMode::None => BlendSpace::Single,
            BlendMode::Blend1D { .. } => BlendSpace::OneD,
            BlendMode::Blend2D { .. } => BlendSpace::TwoD,
        }
    }
}

/// Inverse-squared-distance weights of `samples` around `point`, normalized to sum to 1.
///
/// A sample closer than [`BLEND_EXACT_MATCH_DISTANCE_SQ`] wins outright. At most
/// [`MAX_BLEND_STATE_ANIMS`] samples are considered.
pub fn compute_blend_weights(
    space: BlendSpace,
    point: Vec2,
    samples: impl IntoIterator<Item = BlendInput>,
) -> BlendWeights {
    let mut out = BlendWeights::default();
    let mut samples = samples.into_iter();

    if space == BlendSpace::Single {
        if let Some(first) = samples.next() {
            out.push(BlendWeight {
                sample: first.sample,
                animation: first.animation,
                weight: 1.0,
            });
        }
        return out;
    }

    for input in samples {
        if out.is_full() {
            break;
        }
        let delta = input.blend_point - point;
        let d2 = match space {
            BlendSpace::OneD => delta.x * delta.x,
            _ => delta.length_squared(),
        };
        if d2 < BLEND_EXACT_MATCH_DISTANCE_SQ {
            out.clear();
            out.push(BlendWeight {
                sample: input.sample,
                animation: input.animation,
                weight: 1.0,
            });
            return out;
        }
        let distance = d2.sqrt() + BLEND_DISTANCE_EPSILON;
        out.push(BlendWeight {
            sample: input.sample,
            animation: input.animation,
            weight: 1.0 / (distance * distance),
        });
    }

    let total = out.total();
    if total > 0.0 {
        for entry in &mut out.entries[..out.len] {
            entry.weight /= total;
        }
    }
    out
}
