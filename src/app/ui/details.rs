use eframe::egui::{self, RichText, Ui};
use word_drift::WordDetail;

use crate::util::{format_age, truncate_chars};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("Word Details");
            if ui.small_button("Close").clicked() {
                self.selected = None;
            }
        });
        ui.add_space(6.0);

        let Some(selected) = self.selected.as_deref() else {
            return;
        };

        let Some(detail) = self.session.word_detail(selected) else {
            ui.label("This word was evicted or reset away.");
            return;
        };

        Self::draw_word_detail(ui, &detail, usize::MAX);
        if self.snapshot.word(&detail.key).is_none() {
            ui.add_space(6.0);
            ui.small("Hidden by the count threshold.");
        }
    }

    /// Shared by the details panel and the hover popup.
    pub(in crate::app) fn draw_word_detail(ui: &mut Ui, detail: &WordDetail, max_chars: usize) {
        ui.label(RichText::new(detail.display_text.as_str()).strong());
        ui.small(format!(
            "count {} | updated {}",
            detail.count,
            format_age(detail.since_update)
        ));
        ui.separator();

        if detail.recent_messages.is_empty() {
            ui.label("No recent messages.");
            return;
        }

        ui.label(format!("Recent messages ({})", detail.recent_messages.len()));
        egui::ScrollArea::vertical()
            .id_salt(("recent_messages", detail.key.as_str()))
            .max_height(420.0)
            .show(ui, |ui| {
                for message in detail.recent_messages.iter().rev() {
                    ui.label(truncate_chars(message, max_chars));
                }
            });
    }
}
