//! Live word cloud over a stream of short text messages.
//!
//! Messages enter through an [`IngestionQueue`], are tokenized and counted by
//! a [`WordFrequencyModel`], and every counted word gets a node in a
//! force-directed [`LayoutEngine`] wired to one central root. A
//! [`CloudSession`] drives all of it one tick at a time and hands out
//! [`RenderSnapshot`]s.

pub mod config;
pub mod geometry;
pub mod layout;
pub mod queue;
pub mod session;
pub mod words;

pub use config::CloudConfig;
pub use geometry::{Bounds, Vector2};
pub use layout::{GraphNode, LayoutEngine, LayoutSettings, NodeId};
pub use queue::IngestionQueue;
pub use session::{
    CloudSession, Diagnostics, RenderSnapshot, TickGate, Ticker, TickerControl, WordDetail,
    WordSprite, run_fixed_rate,
};
pub use words::{ModelLimits, WordEntry, WordFrequencyModel};
