use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Generational reference to a slot in a [`Pool`](crate::Pool).
///
/// A handle whose generation is `0` is the null handle. Slots never hand out generation `0`,
/// so a null handle never resolves. When a slot is freed its generation is bumped, which
/// turns every handle issued for the previous occupant stale.
pub struct Handle<T: ?Sized> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ?Sized> Handle<T> {
    pub const NULL: Self = Self {
        index: 0,
        generation: 0,
        _marker: PhantomData,
    };

    /// Rebuilds a handle from its raw parts, eg. for scene-graph entities owned outside of this
    /// crate.
    pub const fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    pub const fn index(self) -> u32 {
        self.index
    }

    pub const fn generation(self) -> u32 {
        self.generation
    }

    pub const fn is_null(self) -> bool {
        self.generation == 0
    }

    /// `None` for the null handle.
    pub fn non_null(self) -> Option<Self> {
        if self.is_null() { None } else { Some(self) }
    }

    pub(crate) const fn cast<U: ?Sized>(self) -> Handle<U> {
        Handle::from_raw_parts(self.index, self.generation)
    }
}

impl<T: ?Sized> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Handle<T> {}

impl<T: ?Sized> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T: ?Sized> Eq for Handle<T> {}

impl<T: ?Sized> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T: ?Sized> Default for Handle<T> {
    fn default() -> Self {
        Self::NULL
    }
}

impl<T: ?Sized> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("Handle(null)")
        } else {
            write!(f, "Handle({}v{})", self.index, self.generation)
        }
    }
}

impl<T: ?Sized> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("null")
        } else {
            write!(f, "{}v{}", self.index, self.generation)
        }
    }
}
