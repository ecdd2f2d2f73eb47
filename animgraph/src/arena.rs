use crate::{Error, Handle, Pool};

/// Handle to a slice stored in an [`Arena`].
pub type ArenaHandle<T> = Handle<[T]>;

/// Bounded store of variable-length slices.
///
/// Both the number of live allocations and the total number of stored elements are capped at
/// construction. Freed element budget becomes available again immediately.
#[derive(Debug)]
pub struct Arena<T> {
    blocks: Pool<Box<[T]>>,
    used: usize,
    element_capacity: usize,
}

impl<T: Copy> Arena<T> {
    pub fn new(kind: &'static str, max_allocations: usize, element_capacity: usize) -> Self {
        Self {
            blocks: Pool::new(kind, max_allocations),
            used: 0,
            element_capacity,
        }
    }

    pub fn allocate(&mut self, values: &[T]) -> Result<ArenaHandle<T>, Error> {
        if self.used + values.len() > self.element_capacity {
            return Err(Error::PoolExhausted {
                pool: self.blocks.kind(),
                capacity: self.element_capacity,
            });
        }
        let handle = self.blocks.add(values.into())?;
        self.used += values.len();
        Ok(handle.cast())
    }

    pub fn get(&self, handle: ArenaHandle<T>) -> Option<&[T]> {
        self.blocks.get(handle.cast()).map(|block| &**block)
    }

    pub fn free(&mut self, handle: ArenaHandle<T>) -> bool {
        match self.blocks.remove(handle.cast()) {
            Some(block) => {
                self.used -= block.len();
                true
            }
            None => false,
        }
    }

    /// Elements currently stored across all live allocations.
    pub fn used(&self) -> usize {
        self.used
    }

    pub fn element_capacity(&self) -> usize {
        self.element_capacity
    }
}
