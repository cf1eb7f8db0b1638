use eframe::egui::{self, Ui};

use super::super::ViewModel;

impl ViewModel {
    const MAX_THRESHOLD: u32 = 50;

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Cloud Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search words")
            .on_hover_text("Fuzzy-highlight matching words without changing the cloud.");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Matching words are tinted blue on the canvas.");

        ui.separator();

        let threshold_slider = ui
            .add(
                egui::Slider::new(&mut self.count_threshold, 0..=Self::MAX_THRESHOLD)
                    .text("Count threshold"),
            )
            .on_hover_text("Only words counted more often than this are drawn.");
        if threshold_slider.changed() {
            self.session.set_count_threshold(self.count_threshold);
            self.refresh_snapshot();
        }

        ui.horizontal(|ui| {
            let pause_label = if self.paused { "Resume" } else { "Pause" };
            if ui
                .button(pause_label)
                .on_hover_text("Stop ticking. Incoming messages keep queueing.")
                .clicked()
            {
                self.paused = !self.paused;
                self.control.set_paused(self.paused);
                tracing::info!(paused = self.paused, "ticker toggled");
            }

            if ui
                .button("Reset")
                .on_hover_text("Forget every word. Queued messages are kept.")
                .clicked()
            {
                self.session.reset();
                self.selected = None;
                self.refresh_snapshot();
            }
        });

        ui.separator();

        ui.checkbox(&mut self.show_spokes, "Draw spokes")
            .on_hover_text("Connect every word to the central root.");
        ui.checkbox(&mut self.show_fps_bar, "FPS Display")
            .on_hover_text("Show a live FPS readout in the header.");

        ui.horizontal(|ui| {
            ui.add(
                egui::Slider::new(&mut self.zoom, 0.2..=4.0)
                    .logarithmic(true)
                    .text("Zoom"),
            );
            if ui.button("Recenter").clicked() {
                self.pan = egui::Vec2::ZERO;
                self.zoom = 1.0;
            }
        });

        ui.separator();
        self.draw_top_words(ui);
    }

    fn draw_top_words(&mut self, ui: &mut Ui) {
        ui.label(format!(
            "Top words ({} shown)",
            self.snapshot.words.len()
        ));

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("top_words")
            .show(ui, |ui| {
                for sprite in self.snapshot.words.iter().rev().take(40) {
                    let is_selected = self.selected.as_deref() == Some(sprite.key.as_str());
                    let label = format!("{}  ×{}", sprite.display_text, sprite.count);
                    if ui.selectable_label(is_selected, label).clicked() {
                        clicked = Some(sprite.key.clone());
                    }
                }
            });

        if let Some(key) = clicked {
            self.toggle_selected(key);
        }
    }

    pub(in crate::app) fn toggle_selected(&mut self, key: String) {
        if self.selected.as_deref() == Some(key.as_str()) {
            self.selected = None;
        } else {
            self.selected = Some(key);
        }
    }
}
