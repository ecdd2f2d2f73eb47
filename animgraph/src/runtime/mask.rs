use crate::{Error, MAX_JOINTS};

const WORDS: usize = MAX_JOINTS.div_ceil(64);

/// Set of joint indices excluded from pose sampling.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mask {
    bits: [u64; WORDS],
}

impl Mask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, joint_index: u16) -> Result<bool, Error> {
        let (word, bit) = split(joint_index)?;
        let was_set = self.bits[word] & bit != 0;
        self.bits[word] |= bit;
        Ok(!was_set)
    }

    pub fn remove(&mut self, joint_index: u16) -> bool {
        let Ok((word, bit)) = split(joint_index) else {
            return false;
        };
        let was_set = self.bits[word] & bit != 0;
        self.bits[word] &= !bit;
        was_set
    }

    pub fn contains(&self, joint_index: u16) -> bool {
        match split(joint_index) {
            Ok((word, bit)) => self.bits[word] & bit != 0,
            Err(_) => false,
        }
    }

    pub fn clear(&mut self) {
        self.bits = [0; WORDS];
    }

    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        (0..MAX_JOINTS as u16).filter(move |i| self.contains(*i))
    }
}

fn split(joint_index: u16) -> Result<(usize, u64), Error> {
    let index = joint_index as usize;
    if index >= MAX_JOINTS {
        return Err(Error::InvalidValue {
            message: format!("joint index {index} is out of range (max {MAX_JOINTS})"),
        });
    }
    Ok((index / 64, 1u64 << (index % 64)))
}
