//! Arena-backed stack of active test nodes.
//!
//! Nodes live in a slot vector for the whole life of the runner. The active path from the root
//! to the current test is a stack of slot indices, and popped slots go to a free list so that a
//! long run reuses a bounded number of nodes (and their buffer allocations) instead of growing.

use super::node::{NodeId, TestNode};

#[derive(Debug)]
struct Slot {
    node: TestNode,
    generation: u32,
    live: bool,
}

/// Active test path plus the pool of retired nodes.
#[derive(Debug, Default)]
pub struct TestStack {
    slots: Vec<Slot>,
    active: Vec<usize>,
    free: Vec<usize>,
}

impl TestStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a node, recycling a retired slot when one is available.
    pub(crate) fn push(&mut self, name: &str, name_width: usize, fill: char) -> NodeId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    node: TestNode::default(),
                    generation: 0,
                    live: false,
                });
                self.slots.len() - 1
            }
        };

        let slot = &mut self.slots[index];
        slot.node.reset(name, name_width, fill);
        slot.live = true;
        self.active.push(index);

        NodeId {
            index,
            generation: slot.generation,
        }
    }

    /// Detach the top slot from the active path. The slot stays live until [`release`](Self::release).
    pub(crate) fn pop_index(&mut self) -> Option<usize> {
        self.active.pop()
    }

    /// Return a detached slot to the free list, invalidating its handles.
    pub(crate) fn release(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
    }

    pub(crate) fn top_index(&self) -> Option<usize> {
        self.active.last().copied()
    }

    pub(crate) fn node_at(&self, index: usize) -> &TestNode {
        &self.slots[index].node
    }

    pub(crate) fn node_at_mut(&mut self, index: usize) -> &mut TestNode {
        &mut self.slots[index].node
    }

    /// Handle of the active (top) node.
    pub fn top(&self) -> Option<NodeId> {
        self.top_index().map(|index| NodeId {
            index,
            generation: self.slots[index].generation,
        })
    }

    pub fn get(&self, id: NodeId) -> Option<&TestNode> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.live && slot.generation == id.generation)
            .map(|slot| &slot.node)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TestNode> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.live && slot.generation == id.generation)
            .map(|slot| &mut slot.node)
    }

    /// Number of tests on the active path.
    pub fn depth(&self) -> usize {
        self.active.len()
    }

    /// Number of node slots ever allocated.
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    /// Number of retired slots waiting for reuse.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_push_allocates_then_recycles() {
        let mut stack = TestStack::new();
        stack.push("a", 40, '.');
        stack.push("b", 40, '.');
        assert_eq!(stack.allocated(), 2);

        let b = stack.pop_index().unwrap();
        stack.release(b);
        assert_eq!(stack.free_count(), 1);

        stack.push("c", 40, '.');
        assert_eq!(stack.allocated(), 2);
        assert_eq!(stack.free_count(), 0);
    }

    #[test]
    fn test_stale_handle_stops_resolving() {
        let mut stack = TestStack::new();
        let first = stack.push("first", 40, '.');
        let index = stack.pop_index().unwrap();
        stack.release(index);
        assert!(stack.get(first).is_none());

        let second = stack.push("second", 40, '.');
        assert_eq!(second.index, first.index);
        assert!(stack.get(first).is_none());
        assert!(stack.get(second).is_some());
    }

    #[test]
    fn test_top_tracks_active_path() {
        let mut stack = TestStack::new();
        assert!(stack.top().is_none());
        let root = stack.push("root", 40, '.');
        let child = stack.push("child", 40, '.');
        assert_eq!(stack.top(), Some(child));
        assert_eq!(stack.depth(), 2);

        let index = stack.pop_index().unwrap();
        stack.release(index);
        assert_eq!(stack.top(), Some(root));
    }
}
