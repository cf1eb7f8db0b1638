use std::collections::{HashSet, VecDeque};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use eframe::egui::{Context, Vec2};
use word_drift::{CloudSession, RenderSnapshot, TickerControl, run_fixed_rate};

mod graph;
mod render_utils;
mod ui;

pub struct WordCloudApp {
    control: Arc<TickerControl>,
    ticker: Option<JoinHandle<()>>,
    snapshot_rx: Option<Receiver<RenderSnapshot>>,
    view: ViewModel,
}

struct ViewModel {
    session: Arc<CloudSession>,
    control: Arc<TickerControl>,
    source_label: String,
    snapshot: RenderSnapshot,
    ticker_alive: bool,
    count_threshold: u32,
    paused: bool,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    selected: Option<String>,
    pan: Vec2,
    zoom: f32,
    show_spokes: bool,
    overrun_pending: bool,
    last_overrun_secs: Option<f64>,
    show_fps_bar: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

struct SearchMatchCache {
    query: String,
    frame: u64,
    matches: Arc<HashSet<String>>,
}

impl WordCloudApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        session: Arc<CloudSession>,
        source_label: String,
    ) -> Self {
        let control = Arc::new(TickerControl::default());
        let (snapshot_rx, ticker) =
            Self::spawn_ticker(cc.egui_ctx.clone(), Arc::clone(&session), Arc::clone(&control));

        Self {
            view: ViewModel::new(session, Arc::clone(&control), source_label),
            control,
            ticker: Some(ticker),
            snapshot_rx: Some(snapshot_rx),
        }
    }

    fn spawn_ticker(
        ctx: Context,
        session: Arc<CloudSession>,
        control: Arc<TickerControl>,
    ) -> (Receiver<RenderSnapshot>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            run_fixed_rate(&session, &control, |snapshot| {
                let Some(snapshot) = snapshot else {
                    return ControlFlow::Continue(());
                };
                if tx.send(snapshot).is_err() {
                    return ControlFlow::Break(());
                }
                ctx.request_repaint();
                ControlFlow::Continue(())
            });
        });

        (rx, handle)
    }

    fn receive_snapshots(&mut self) {
        let Some(rx) = self.snapshot_rx.as_ref() else {
            return;
        };

        loop {
            match rx.try_recv() {
                Ok(snapshot) => self.view.accept_snapshot(snapshot),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("ticker thread disconnected");
                    self.snapshot_rx = None;
                    self.view.ticker_alive = false;
                    break;
                }
            }
        }
    }
}

impl eframe::App for WordCloudApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.receive_snapshots();
        self.view.show(ctx);
    }
}

impl Drop for WordCloudApp {
    fn drop(&mut self) {
        self.control.stop();
        self.snapshot_rx = None;
        if let Some(handle) = self.ticker.take()
            && handle.join().is_err()
        {
            tracing::warn!("ticker thread panicked");
        }
    }
}
