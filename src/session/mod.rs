//! The explicit context that ties the queue, the word model and the layout
//! together for one application session.

mod gate;
mod snapshot;
mod ticker;

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::CloudConfig;
use crate::geometry::Vector2;
use crate::layout::LayoutEngine;
use crate::queue::IngestionQueue;
use crate::words::{WordFrequencyModel, normalize};
pub use gate::{TickGate, TickPermit};
use snapshot::size_hint;
pub use snapshot::{Diagnostics, RenderSnapshot, WordDetail, WordSprite};
pub use ticker::{Ticker, TickerControl, run_fixed_rate};

struct CloudState {
    model: WordFrequencyModel,
    layout: LayoutEngine,
    count_threshold: u32,
    frame: u64,
    last_displacement: f64,
}

/// All entry points take `&self`, so one session can be shared between the
/// producer thread, the ticker and the UI.
pub struct CloudSession {
    config: CloudConfig,
    queue: IngestionQueue,
    gate: TickGate,
    state: Mutex<CloudState>,
}

impl CloudSession {
    pub fn new(config: CloudConfig) -> Self {
        let mut layout = LayoutEngine::new(config.layout_settings());
        let root = layout.create_node(Vector2::ZERO);
        let root_id = root.id;
        layout.add_node(root);

        let model = WordFrequencyModel::new(config.model_limits(), root_id);
        tracing::info!(?config, "word cloud session created");

        Self {
            queue: IngestionQueue::new(config.queue_capacity),
            gate: TickGate::default(),
            state: Mutex::new(CloudState {
                model,
                layout,
                count_threshold: config.count_threshold,
                frame: 0,
                last_displacement: 0.0,
            }),
            config,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CloudState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    /// Producer handle for threads that feed messages.
    pub fn queue(&self) -> IngestionQueue {
        self.queue.clone()
    }

    pub fn tick_gate(&self) -> &TickGate {
        &self.gate
    }

    /// Thread-safe: only touches the queue.
    pub fn ingest(&self, message: impl Into<String>) -> bool {
        self.queue.push(message)
    }

    /// Drains one batch, feeds the model, runs one layout step and returns
    /// the result. Returns `None` when another tick is still running.
    pub fn tick(&self) -> Option<RenderSnapshot> {
        let Some(_permit) = self.gate.try_enter() else {
            tracing::debug!("tick skipped; previous tick still running");
            return None;
        };

        let batch = self.queue.drain(self.config.drain_per_tick);
        let mut state = self.lock_state();
        let CloudState { model, layout, .. } = &mut *state;
        for message in &batch {
            model.ingest(message, layout);
        }
        state.last_displacement = state
            .layout
            .step(self.config.damping, self.config.spring_length);
        state.frame += 1;

        let overrun = self.gate.take_overrun();
        Some(self.build_snapshot(&state, overrun))
    }

    /// Current state without draining or stepping.
    pub fn snapshot(&self) -> RenderSnapshot {
        let state = self.lock_state();
        self.build_snapshot(&state, false)
    }

    fn build_snapshot(&self, state: &CloudState, overrun: bool) -> RenderSnapshot {
        let threshold = state.count_threshold;
        let surfaced = state
            .model
            .entries()
            .filter(|(_, entry)| entry.count() > threshold)
            .collect::<Vec<_>>();

        let min_count = surfaced
            .iter()
            .map(|(_, entry)| entry.count())
            .min()
            .unwrap_or(1);
        let max_count = surfaced
            .iter()
            .map(|(_, entry)| entry.count())
            .max()
            .unwrap_or(1);

        let mut words = surfaced
            .into_iter()
            .filter_map(|(key, entry)| {
                let position = state.layout.position(entry.node())?;
                Some(WordSprite {
                    key: key.to_owned(),
                    display_text: entry.display_text().to_owned(),
                    count: entry.count(),
                    position,
                    size_hint: size_hint(entry.count(), min_count, max_count),
                })
            })
            .collect::<Vec<_>>();
        words.sort_by(|a, b| a.count.cmp(&b.count).then_with(|| a.key.cmp(&b.key)));

        RenderSnapshot {
            frame: state.frame,
            words,
            root: state
                .layout
                .position(state.model.root())
                .unwrap_or(Vector2::ZERO),
            bounds: state.layout.bounds(),
            overrun,
            count_threshold: threshold,
            diagnostics: Diagnostics {
                entries: state.model.len(),
                backlog: self.queue.len(),
                dropped_messages: self.queue.dropped(),
                skipped_ticks: self.gate.skipped(),
                messages_seen: state.model.messages_seen(),
                displacement: state.last_displacement,
            },
        }
    }

    /// Recent messages for `word`, oldest first. Unknown words yield nothing.
    pub fn lookup_recent_messages(&self, word: &str) -> Vec<String> {
        let key = normalize(word);
        let state = self.lock_state();
        state
            .model
            .get(&key)
            .map(|entry| entry.recent_messages().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    pub fn word_detail(&self, word: &str) -> Option<WordDetail> {
        let key = normalize(word);
        let state = self.lock_state();
        let entry = state.model.get(&key)?;
        Some(WordDetail {
            display_text: entry.display_text().to_owned(),
            count: entry.count(),
            since_update: entry.updated_at().elapsed(),
            recent_messages: entry.recent_messages().map(str::to_owned).collect(),
            key,
        })
    }

    /// Hides entries with `count <= threshold` from snapshots. The model
    /// itself is untouched.
    pub fn set_count_threshold(&self, threshold: u32) {
        self.lock_state().count_threshold = threshold;
    }

    pub fn count_threshold(&self) -> u32 {
        self.lock_state().count_threshold
    }

    /// Forgets every word. The root node, the configuration, the message
    /// counter and any messages still queued are kept.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        let CloudState { model, layout, .. } = &mut *state;
        let cleared = model.len();
        model.clear(layout);
        tracing::info!(cleared, "word cloud reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> CloudSession {
        CloudSession::new(CloudConfig {
            deterministic: true,
            ..CloudConfig::default()
        })
    }

    #[test]
    fn tick_drains_at_most_one_batch() {
        let session = session();
        for index in 0..45 {
            session.ingest(format!("word{index}"));
        }

        let snapshot = session.tick().unwrap();
        assert_eq!(snapshot.diagnostics.messages_seen, 20);
        assert_eq!(snapshot.diagnostics.backlog, 25);
        assert_eq!(snapshot.words.len(), 20);

        session.tick().unwrap();
        let snapshot = session.tick().unwrap();
        assert_eq!(snapshot.diagnostics.backlog, 0);
        assert_eq!(snapshot.diagnostics.messages_seen, 45);
        assert_eq!(snapshot.frame, 3);
    }

    #[test]
    fn held_gate_skips_the_tick_and_flags_the_next_snapshot() {
        let session = session();
        session.ingest("queued words");

        let permit = session.tick_gate().try_enter();
        assert!(session.tick().is_none());
        drop(permit);

        let snapshot = session.tick().unwrap();
        assert!(snapshot.overrun);
        assert_eq!(snapshot.diagnostics.skipped_ticks, 1);
        assert_eq!(snapshot.diagnostics.messages_seen, 1);

        assert!(!session.tick().unwrap().overrun);
    }

    #[test]
    fn threshold_filters_snapshot_only() {
        let session = session();
        session.ingest("ferris ferris crab");
        session.tick();

        session.set_count_threshold(1);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.words.len(), 1);
        assert_eq!(snapshot.words[0].key, "ferris");
        assert_eq!(snapshot.diagnostics.entries, 2);
        assert_eq!(session.lookup_recent_messages("crab"), ["ferris ferris crab"]);
    }

    #[test]
    fn lookup_normalizes_its_argument() {
        let session = session();
        session.ingest("Hello, world");
        session.tick();
        assert_eq!(session.lookup_recent_messages("HELLO!"), ["Hello, world"]);
        assert!(session.lookup_recent_messages("missing").is_empty());

        let detail = session.word_detail("world").unwrap();
        assert_eq!(detail.display_text, "world");
        assert_eq!(detail.count, 1);
    }

    #[test]
    fn reset_keeps_root_and_threshold() {
        let session = session();
        session.set_count_threshold(2);
        session.ingest("some words to forget");
        session.tick();

        session.reset();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.diagnostics.entries, 0);
        assert!(snapshot.words.is_empty());
        assert_eq!(snapshot.count_threshold, 2);
        assert_eq!(snapshot.diagnostics.messages_seen, 1);
        assert!(snapshot.bounds.is_some());
    }
}
