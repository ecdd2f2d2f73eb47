//! Skeleton joint records used to resolve joint names for masking.

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a hash of a joint name.
pub const fn name_hash(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Joint {
    pub node_index: u16,
    pub name_hash: u32,
    pub parent_index: Option<u16>,
}

impl Joint {
    pub fn new(node_index: u16, name: &str, parent_index: Option<u16>) -> Self {
        Self {
            node_index,
            name_hash: name_hash(name),
            parent_index,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skin {
    pub joints: Vec<Joint>,
}

impl Skin {
    pub fn new(joints: Vec<Joint>) -> Self {
        Self { joints }
    }

    pub fn joint(&self, name_hash: u32) -> Option<&Joint> {
        self.joints.iter().find(|j| j.name_hash == name_hash)
    }

    pub fn node_index(&self, name_hash: u32) -> Option<u16> {
        self.joint(name_hash).map(|j| j.node_index)
    }

    /// Node indices of `root` and every joint below it, in joint order.
    pub fn descendants(&self, root: u16) -> impl Iterator<Item = u16> + '_ {
        self.joints
            .iter()
            .filter(move |joint| self.is_descendant_or_self(joint.node_index, root))
            .map(|joint| joint.node_index)
    }

    fn is_descendant_or_self(&self, node_index: u16, root: u16) -> bool {
        let mut cur = Some(node_index);
        // Bounded by the joint count so a malformed parent cycle cannot spin forever.
        for _ in 0..=self.joints.len() {
            match cur {
                Some(index) if index == root => return true,
                Some(index) => {
                    cur = self
                        .joints
                        .iter()
                        .find(|j| j.node_index == index)
                        .and_then(|j| j.parent_index);
                }
                None => return false,
            }
        }
        false
    }
}
