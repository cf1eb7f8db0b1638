use eframe::egui::{self, Rect, Ui};

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

impl ViewModel {
    /// Zooms around the pointer. `fit` is the auto-fit part of the scale,
    /// which the user's zoom multiplies.
    pub(in crate::app) fn handle_cloud_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        fit: f32,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, fit * self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.2, 4.0);
        self.pan = pointer - rect.center() - (world_before * fit * self.zoom);
    }

    pub(in crate::app) fn handle_cloud_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Index of the label under the pointer. Later labels are drawn on top,
    /// so they win.
    pub(in crate::app) fn hovered_label(ui: &Ui, label_rects: &[Rect]) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        label_rects
            .iter()
            .rposition(|label_rect| label_rect.contains(pointer))
    }
}
