//! Bounded, decaying word counts over a message stream.

mod entry;
mod filter;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::geometry::Vector2;
use crate::layout::{LayoutEngine, NodeId};
pub use entry::WordEntry;
pub use filter::{Token, is_eliminated, normalize, strip_punctuation, tokenize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelLimits {
    pub max_words: usize,
    pub max_recent: usize,
    pub saturation_interval: u64,
}

impl Default for ModelLimits {
    fn default() -> Self {
        Self {
            max_words: 100,
            max_recent: 20,
            saturation_interval: 20,
        }
    }
}

/// What one `ingest` call changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub accepted: usize,
    pub created: usize,
    pub evicted: usize,
    pub overshoots: usize,
    pub decayed: bool,
}

pub struct WordFrequencyModel {
    entries: HashMap<String, WordEntry>,
    root: NodeId,
    limits: ModelLimits,
    messages_seen: u64,
    clock: u64,
}

impl WordFrequencyModel {
    /// `root` must already be registered with the layout that is later passed
    /// to `ingest`.
    pub fn new(limits: ModelLimits, root: NodeId) -> Self {
        Self {
            entries: HashMap::new(),
            root,
            limits,
            messages_seen: 0,
            clock: 0,
        }
    }

    pub fn ingest(&mut self, message: &str, layout: &mut LayoutEngine) -> IngestReport {
        let mut report = IngestReport::default();
        let shared: Arc<str> = Arc::from(message);
        let now = Instant::now();

        for token in tokenize(message) {
            report.accepted += 1;
            self.clock += 1;

            if let Some(entry) = self.entries.get_mut(&token.key) {
                entry.hit(self.clock, now);
                entry.remember(&shared, self.limits.max_recent);
                continue;
            }

            if self.entries.len() >= self.limits.max_words {
                match self.stale_candidate().map(str::to_owned) {
                    Some(stale) => {
                        if self.evict(&stale, layout) {
                            report.evicted += 1;
                        }
                    }
                    None => {
                        report.overshoots += 1;
                        tracing::warn!(
                            live = self.entries.len(),
                            max_words = self.limits.max_words,
                            word = %token.key,
                            "no single-hit word to evict; admitting over capacity"
                        );
                    }
                }
            }

            let node = self.spawn_node(layout);
            let mut entry = WordEntry::new(token.display, node, self.clock, now);
            entry.remember(&shared, self.limits.max_recent);
            self.entries.insert(token.key, entry);
            report.created += 1;
        }

        self.messages_seen += 1;
        if self.messages_seen % self.limits.saturation_interval.max(1) == 0 {
            let decayed = self.decay();
            report.decayed = true;
            tracing::trace!(messages = self.messages_seen, decayed, "decay pass");
        }

        report
    }

    fn spawn_node(&mut self, layout: &mut LayoutEngine) -> NodeId {
        let origin = layout.position(self.root).unwrap_or(Vector2::ZERO);
        let mut node = layout.create_node(origin);
        node.connect(self.root);
        let id = node.id;
        layout.add_node(node);
        id
    }

    /// The single-hit entry touched longest ago, if any.
    pub fn stale_candidate(&self) -> Option<&str> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.count == 1)
            .min_by_key(|(_, entry)| entry.touched)
            .map(|(key, _)| key.as_str())
    }

    /// Removes `key` from the map and its node from `layout` together. The
    /// entry's message history goes with it.
    pub fn evict(&mut self, key: &str, layout: &mut LayoutEngine) -> bool {
        let Some(entry) = self.entries.remove(key) else {
            return false;
        };
        layout.remove_node(entry.node);
        tracing::debug!(word = key, node = %entry.node, "evicted stale word");
        true
    }

    /// Lowers every multi-hit count by one. Returns how many entries changed.
    pub fn decay(&mut self) -> usize {
        self.entries
            .values_mut()
            .map(WordEntry::decay)
            .filter(|&changed| changed)
            .count()
    }

    /// Drops every entry and its node. The root and the message counter stay.
    pub fn clear(&mut self, layout: &mut LayoutEngine) {
        for entry in self.entries.values() {
            layout.remove_node(entry.node);
        }
        self.entries.clear();
    }

    pub fn get(&self, key: &str) -> Option<&WordEntry> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &WordEntry)> + '_ {
        self.entries
            .iter()
            .map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn messages_seen(&self) -> u64 {
        self.messages_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutSettings;

    fn setup(limits: ModelLimits) -> (WordFrequencyModel, LayoutEngine) {
        let mut layout = LayoutEngine::new(LayoutSettings {
            deterministic: true,
            ..LayoutSettings::default()
        });
        let root = layout.create_node(Vector2::ZERO);
        let root_id = root.id;
        layout.add_node(root);
        (WordFrequencyModel::new(limits, root_id), layout)
    }

    fn count(model: &WordFrequencyModel, key: &str) -> Option<u32> {
        model.get(key).map(WordEntry::count)
    }

    #[test]
    fn new_words_get_a_node_wired_to_the_root() {
        let (mut model, mut layout) = setup(ModelLimits::default());
        let report = model.ingest("the cat sat on the mat", &mut layout);

        assert_eq!(report.accepted, 3);
        assert_eq!(report.created, 3);
        assert_eq!(model.len(), 3);
        assert_eq!(layout.len(), 4);
        for key in ["cat", "sat", "mat"] {
            let entry = model.get(key).unwrap();
            assert_eq!(entry.count(), 1);
            let node = layout.node(entry.node()).unwrap();
            assert_eq!(node.connections(), &[model.root()]);
            assert_eq!(node.position, layout.position(model.root()).unwrap());
        }
        assert!(model.get("the").is_none());
        assert!(model.get("on").is_none());
    }

    #[test]
    fn repeats_bump_count_and_keep_first_display_text() {
        let (mut model, mut layout) = setup(ModelLimits::default());
        model.ingest("Rust rocks", &mut layout);
        model.ingest("rust!", &mut layout);
        let entry = model.get("rust").unwrap();
        assert_eq!(entry.count(), 2);
        assert_eq!(entry.display_text(), "Rust");
        assert_eq!(
            entry.recent_messages().collect::<Vec<_>>(),
            ["Rust rocks", "rust!"]
        );
    }

    #[test]
    fn every_occurrence_counts_but_message_is_kept_once() {
        let (mut model, mut layout) = setup(ModelLimits::default());
        model.ingest("crab crab crab", &mut layout);
        let entry = model.get("crab").unwrap();
        assert_eq!(entry.count(), 3);
        assert_eq!(entry.recent_messages().len(), 1);
    }

    #[test]
    fn recent_messages_are_capped() {
        let (mut model, mut layout) = setup(ModelLimits {
            saturation_interval: 1_000,
            ..ModelLimits::default()
        });
        for index in 0..30 {
            model.ingest(&format!("ferris {index}"), &mut layout);
        }
        let recent = model.get("ferris").unwrap().recent_messages().collect::<Vec<_>>();
        assert_eq!(recent.len(), 20);
        assert_eq!(recent.first().copied(), Some("ferris 10"));
        assert_eq!(recent.last().copied(), Some("ferris 29"));
    }

    #[test]
    fn decay_fires_exactly_on_the_interval() {
        let (mut model, mut layout) = setup(ModelLimits::default());
        model.ingest("solo", &mut layout);
        for index in 1..19 {
            let report = model.ingest("busy", &mut layout);
            assert!(!report.decayed, "decayed early at message {}", index + 1);
        }
        assert_eq!(count(&model, "busy"), Some(18));

        // message 20: bump to 19, then lose one
        let report = model.ingest("busy", &mut layout);
        assert!(report.decayed);
        assert_eq!(count(&model, "busy"), Some(18));
        assert_eq!(count(&model, "solo"), Some(1));
    }

    #[test]
    fn full_model_evicts_the_stalest_single_hit_word() {
        let (mut model, mut layout) = setup(ModelLimits {
            max_words: 3,
            saturation_interval: 1_000,
            ..ModelLimits::default()
        });
        model.ingest("alpha", &mut layout);
        model.ingest("beta", &mut layout);
        model.ingest("gamma gamma", &mut layout);
        let alpha_node = model.get("alpha").unwrap().node();

        let report = model.ingest("delta", &mut layout);
        assert_eq!(report.evicted, 1);
        assert!(model.get("alpha").is_none());
        assert!(!layout.contains(alpha_node));
        assert_eq!(model.len(), 3);
        assert_eq!(layout.len(), 4);

        model.ingest("epsilon", &mut layout);
        assert!(model.get("beta").is_none());
        assert_eq!(count(&model, "gamma"), Some(2));
    }

    #[test]
    fn touching_a_word_protects_it_from_eviction() {
        let (mut model, mut layout) = setup(ModelLimits {
            max_words: 2,
            saturation_interval: 1,
            ..ModelLimits::default()
        });
        model.ingest("old", &mut layout);
        model.ingest("young", &mut layout);
        // bumps to 2 and decays straight back to 1, but is now the freshest
        model.ingest("old", &mut layout);
        assert_eq!(count(&model, "old"), Some(1));

        model.ingest("newcomer", &mut layout);
        assert!(model.get("young").is_none());
        assert!(model.get("old").is_some());
    }

    #[test]
    fn overshoots_when_nothing_is_evictable() {
        let (mut model, mut layout) = setup(ModelLimits {
            max_words: 2,
            saturation_interval: 1_000,
            ..ModelLimits::default()
        });
        model.ingest("one one", &mut layout);
        model.ingest("two two", &mut layout);

        let report = model.ingest("three", &mut layout);
        assert_eq!(report.overshoots, 1);
        assert_eq!(report.evicted, 0);
        assert_eq!(model.len(), 3);

        // the newcomer is single-hit, so the next arrival evicts it
        let report = model.ingest("four", &mut layout);
        assert_eq!(report.evicted, 1);
        assert!(model.get("three").is_none());
        assert_eq!(model.len(), 3);
    }

    #[test]
    fn clear_keeps_only_the_root() {
        let (mut model, mut layout) = setup(ModelLimits::default());
        model.ingest("lots of little words here", &mut layout);
        model.clear(&mut layout);

        assert!(model.is_empty());
        assert_eq!(model.messages_seen(), 1);
        assert_eq!(layout.len(), 1);
        assert!(layout.contains(model.root()));

        let report = model.ingest("fresh start", &mut layout);
        let node = layout.node(model.get("fresh").unwrap().node()).unwrap();
        assert_eq!(node.connections(), &[model.root()]);
        assert!(!report.decayed);
    }

    #[test]
    fn clear_does_not_restart_the_decay_cadence() {
        let (mut model, mut layout) = setup(ModelLimits::default());
        for _ in 0..10 {
            model.ingest("before", &mut layout);
        }
        model.clear(&mut layout);

        for index in 11..20 {
            let report = model.ingest("after", &mut layout);
            assert!(!report.decayed, "decayed early at message {index}");
        }
        // 20th message overall: bump to 10, then lose one
        let report = model.ingest("after", &mut layout);
        assert!(report.decayed);
        assert_eq!(model.messages_seen(), 20);
        assert_eq!(count(&model, "after"), Some(9));
    }

    #[test]
    fn empty_and_filtered_messages_leave_no_entries() {
        let (mut model, mut layout) = setup(ModelLimits::default());
        for message in ["", "   ", "#tag http://x 42 the", "!!! ..."] {
            let report = model.ingest(message, &mut layout);
            assert_eq!(report.accepted, 0);
        }
        assert!(model.is_empty());
        assert_eq!(model.messages_seen(), 4);
    }
}
