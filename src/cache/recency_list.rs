#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly-linked sequence whose nodes live in a slot vector and link to each other by index.
///
/// The front holds the most recently touched item, the back the least recently touched one.
/// Indices returned by [RecencyList::push_front] stay valid until the item is removed or popped.
#[derive(Debug)]
pub(crate) struct RecencyList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> RecencyList<T> {
    pub(crate) fn with_capacity(capacity: usize) -> RecencyList<T> {
        RecencyList {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.node(index).map(|node| &node.value)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots
            .get_mut(index)
            .and_then(Option::as_mut)
            .map(|node| &mut node.value)
    }

    /// Adds an item to the front of the list and returns the slot it was placed in.
    pub(crate) fn push_front(&mut self, value: T) -> usize {
        let node = Node {
            value,
            prev: None,
            next: self.head,
        };

        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                index
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        match self.head {
            Some(old_head) => self.node_mut(old_head).prev = Some(index),
            None => self.tail = Some(index),
        }

        self.head = Some(index);
        self.len += 1;
        index
    }

    /// Moves the item at `index` to the front. Returns `false` if the slot is vacant.
    pub(crate) fn move_to_front(&mut self, index: usize) -> bool {
        if self.node(index).is_none() {
            return false;
        }

        if self.head == Some(index) {
            return true;
        }

        self.unlink(index);

        let old_head = self.head;
        {
            let node = self.node_mut(index);
            node.prev = None;
            node.next = old_head;
        }

        match old_head {
            Some(old_head) => self.node_mut(old_head).prev = Some(index),
            None => self.tail = Some(index),
        }

        self.head = Some(index);
        true
    }

    /// Pops the item at the back of the list and returns it.
    ///
    /// If the list is empty, [None] is returned.
    pub(crate) fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        self.remove(tail)
    }

    /// Removes the item at `index`, freeing its slot for reuse.
    pub(crate) fn remove(&mut self, index: usize) -> Option<T> {
        self.node(index)?;

        self.unlink(index);

        let node = self.slots[index].take()?;
        self.free.push(index);
        self.len -= 1;

        Some(node.value)
    }

    /// Iterates from the front (most recent) to the back (least recent).
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn unlink(&mut self, index: usize) {
        let (prev, next) = {
            let node = self.node_mut(index);
            (node.prev.take(), node.next.take())
        };

        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }

        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }

    fn node(&self, index: usize) -> Option<&Node<T>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, index: usize) -> &mut Node<T> {
        self.slots[index]
            .as_mut()
            .expect("a linked index must point to an occupied slot")
    }
}

pub(crate) struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.value)
    }
}
