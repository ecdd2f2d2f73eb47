//! Singly linked lists threaded through pool elements.
//!
//! The list head lives in the owner (eg. a state machine's first state) and every element
//! stores the handle of its successor inline. A null `next` ends the list.

use crate::{Handle, Pool};

pub(crate) trait Linked: Sized {
    fn next(&self) -> Handle<Self>;
    fn set_next(&mut self, next: Handle<Self>);
}

/// Appends `item` at the tail of the list starting at `head`. O(n) in the list length.
pub(crate) fn append<T: Linked>(pool: &mut Pool<T>, head: &mut Handle<T>, item: Handle<T>) {
    if pool.get(*head).is_none() {
        *head = item;
        return;
    }

    let mut cur = *head;
    loop {
        let Some(node) = pool.get_mut(cur) else {
            return;
        };
        let next = node.next();
        if next.is_null() {
            node.set_next(item);
            return;
        }
        cur = next;
    }
}

pub(crate) fn iter<T: Linked>(pool: &Pool<T>, head: Handle<T>) -> ListIter<'_, T> {
    ListIter { pool, cur: head }
}

pub(crate) struct ListIter<'a, T> {
    pool: &'a Pool<T>,
    cur: Handle<T>,
}

impl<'a, T: Linked> Iterator for ListIter<'a, T> {
    type Item = (Handle<T>, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cur;
        let node = self.pool.get(handle)?;
        self.cur = node.next();
        Some((handle, node))
    }
}

/// Frees every element of the list and returns how many were removed.
pub(crate) fn remove_all<T: Linked>(pool: &mut Pool<T>, head: Handle<T>) -> usize {
    let mut removed = 0;
    let mut cur = head;
    while let Some(node) = pool.remove(cur) {
        cur = node.next();
        removed += 1;
    }
    removed
}
