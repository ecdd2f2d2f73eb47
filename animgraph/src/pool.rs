use crate::{Error, Handle};

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Fixed-capacity generational object pool.
///
/// Storage for `capacity` slots is reserved up front; the pool never reallocates afterwards and
/// [`Pool::add`] fails with [`Error::PoolExhausted`] once every slot is occupied.
#[derive(Debug)]
pub struct Pool<T> {
    kind: &'static str,
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    capacity: usize,
    len: usize,
}

impl<T> Pool<T> {
    /// `kind` names the stored object in errors and log output.
    pub fn new(kind: &'static str, capacity: usize) -> Self {
        Self {
            kind,
            slots: Vec::with_capacity(capacity),
            free_list: Vec::with_capacity(capacity),
            capacity,
            len: 0,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn add(&mut self, value: T) -> Result<Handle<T>, Error> {
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            self.len += 1;
            return Ok(Handle::from_raw_parts(index, slot.generation));
        }

        if self.slots.len() >= self.capacity {
            return Err(Error::PoolExhausted {
                pool: self.kind,
                capacity: self.capacity,
            });
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            value: Some(value),
        });
        self.len += 1;
        Ok(Handle::from_raw_parts(index, 1))
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        if handle.is_null() {
            return None;
        }
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        if handle.is_null() {
            return None;
        }
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_mut()
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    pub(crate) fn try_get(&self, handle: Handle<T>) -> Result<&T, Error> {
        let kind = self.kind;
        self.get(handle).ok_or(Error::InvalidHandle { kind })
    }

    pub(crate) fn try_get_mut(&mut self, handle: Handle<T>) -> Result<&mut T, Error> {
        let kind = self.kind;
        self.get_mut(handle).ok_or(Error::InvalidHandle { kind })
    }

    /// Frees the slot and bumps its generation. Stale and null handles are ignored.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        if handle.is_null() {
            return None;
        }
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = next_generation(slot.generation);
        self.free_list.push(handle.index());
        self.len -= 1;
        Some(value)
    }

    /// Handle of the live value at `index`, if any.
    pub fn handle_at(&self, index: usize) -> Option<Handle<T>> {
        let slot = self.slots.get(index)?;
        slot.value
            .as_ref()
            .map(|_| Handle::from_raw_parts(index as u32, slot.generation))
    }

    /// Number of slots touched so far; live values are all below this index.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (Handle::from_raw_parts(index as u32, slot.generation), value))
        })
    }
}

// Generation 0 is reserved for the null handle.
fn next_generation(generation: u32) -> u32 {
    match generation.wrapping_add(1) {
        0 => 1,
        g => g,
    }
}
