use std::collections::VecDeque;
use std::sync::Arc;

use eframe::egui::{self, Align, Color32, Context, Layout, RichText, Vec2};
use word_drift::{CloudSession, RenderSnapshot, TickerControl};

use super::super::ViewModel;

impl ViewModel {
    /// How long the overrun indicator stays lit after a skipped tick.
    const OVERRUN_FLASH_SECS: f64 = 1.5;

    pub(in crate::app) fn new(
        session: Arc<CloudSession>,
        control: Arc<TickerControl>,
        source_label: String,
    ) -> Self {
        let count_threshold = session.count_threshold();
        let snapshot = session.snapshot();

        Self {
            session,
            control,
            source_label,
            snapshot,
            ticker_alive: true,
            count_threshold,
            paused: false,
            search: String::new(),
            search_match_cache: None,
            selected: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            show_spokes: true,
            overrun_pending: false,
            last_overrun_secs: None,
            show_fps_bar: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }

    pub(in crate::app) fn accept_snapshot(&mut self, snapshot: RenderSnapshot) {
        // stamped with the frame clock on the next `show`
        self.overrun_pending |= snapshot.overrun;
        self.snapshot = snapshot;
    }

    /// Re-reads the session after a change made while ticks may be paused.
    pub(in crate::app) fn refresh_snapshot(&mut self) {
        self.snapshot = self.session.snapshot();
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        self.update_fps_counter(ctx);

        let now = ctx.input(|input| input.time);
        if std::mem::take(&mut self.overrun_pending) {
            self.last_overrun_secs = Some(now);
        }
        let overrun_lit = self
            .last_overrun_secs
            .is_some_and(|since| now - since < Self::OVERRUN_FLASH_SECS);
        if overrun_lit {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("word-drift");
                    ui.separator();
                    ui.label(format!("source: {}", self.source_label));
                    ui.label(Self::diagnostics_text(&self.snapshot));
                    if overrun_lit {
                        ui.label(RichText::new("overrun").color(Color32::from_rgb(241, 146, 94)))
                            .on_hover_text("A tick was skipped because the previous one ran late.");
                    }
                    if !self.ticker_alive {
                        ui.label(RichText::new("ticker stopped").color(Color32::from_rgb(230, 90, 90)));
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        if self.selected.is_some() {
            egui::SidePanel::right("details")
                .resizable(true)
                .default_width(340.0)
                .show(ctx, |ui| self.draw_details(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| self.draw_cloud(ui));
    }
}
