use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use crate::layout::NodeId;

#[derive(Clone, Debug)]
pub struct WordEntry {
    pub(super) display_text: String,
    pub(super) count: u32,
    pub(super) updated_at: Instant,
    /// Logical touch time; strictly increasing across the whole model.
    pub(super) touched: u64,
    pub(super) recent_messages: VecDeque<Arc<str>>,
    pub(super) node: NodeId,
}

impl WordEntry {
    pub(super) fn new(display_text: String, node: NodeId, touched: u64, now: Instant) -> Self {
        Self {
            display_text,
            count: 1,
            updated_at: now,
            touched,
            recent_messages: VecDeque::new(),
            node,
        }
    }

    pub(super) fn hit(&mut self, touched: u64, now: Instant) {
        self.count = self.count.saturating_add(1);
        self.touched = touched;
        self.updated_at = now;
    }

    /// Appends `message` unless it is the one appended last, dropping the
    /// oldest messages so at most `capacity` remain.
    pub(super) fn remember(&mut self, message: &Arc<str>, capacity: usize) {
        if self
            .recent_messages
            .back()
            .is_some_and(|last| Arc::ptr_eq(last, message))
        {
            return;
        }

        while self.recent_messages.len() >= capacity.max(1) {
            self.recent_messages.pop_front();
        }
        self.recent_messages.push_back(Arc::clone(message));
    }

    pub(super) fn decay(&mut self) -> bool {
        if self.count > 1 {
            self.count -= 1;
            true
        } else {
            false
        }
    }

    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn updated_at(&self) -> Instant {
        self.updated_at
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Oldest first.
    pub fn recent_messages(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.recent_messages.iter().map(|message| &**message)
    }
}
