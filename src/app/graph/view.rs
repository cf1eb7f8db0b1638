use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, StrokeKind, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::render_utils::{
    blend_color, dim_color, draw_background, word_color, world_to_screen,
};
use super::super::{SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

impl ViewModel {
    const FIT_MARGIN: f32 = 0.85;
    /// Keeps a young, tightly packed cloud from being blown up to fill the
    /// whole canvas.
    const MAX_FIT_SCALE: f32 = 2.0;

    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<String>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.frame == self.snapshot.frame
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .snapshot
            .words
            .iter()
            .filter(|sprite| fuzzy_match_score(&matcher, &sprite.display_text, query).is_some())
            .map(|sprite| sprite.key.clone())
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            frame: self.snapshot.frame,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_cloud(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        let fit = self.snapshot.fit_scale(
            f64::from(rect.width() * Self::FIT_MARGIN),
            f64::from(rect.height() * Self::FIT_MARGIN),
        ) as f32;
        let fit = fit.min(Self::MAX_FIT_SCALE);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_cloud_zoom(ui, rect, fit, &response);
        self.handle_cloud_pan(&response);

        let search_matches = self.cached_search_matches();
        let search_active = search_matches.is_some();
        let scale = fit * self.zoom;
        let font_scale = self.zoom.sqrt();
        let snapshot = &self.snapshot;

        let root = world_to_screen(rect, self.pan, scale, snapshot.root);
        let labels = snapshot
            .words
            .iter()
            .map(|sprite| {
                let center = world_to_screen(rect, self.pan, scale, sprite.position);
                let font = FontId::proportional((sprite.size_hint * font_scale).clamp(6.0, 96.0));
                let galley =
                    painter.layout_no_wrap(sprite.display_text.clone(), font, Color32::PLACEHOLDER);
                let label_rect = Align2::CENTER_CENTER.anchor_size(center, galley.size());
                (label_rect, galley)
            })
            .collect::<Vec<_>>();
        let label_rects = labels.iter().map(|(label_rect, _)| *label_rect).collect::<Vec<_>>();
        let hovered = Self::hovered_label(ui, &label_rects);

        if self.show_spokes {
            let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(110, 120, 135, 60));
            for label_rect in &label_rects {
                painter.line_segment([root, label_rect.center()], stroke);
            }
        }

        painter.circle_filled(root, 5.0, Color32::from_rgb(245, 206, 93));
        painter.circle_stroke(
            root,
            9.0,
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(245, 206, 93, 90)),
        );

        if snapshot.words.is_empty() {
            painter.text(
                rect.center() + egui::vec2(0.0, 28.0),
                Align2::CENTER_TOP,
                "waiting for words...",
                FontId::proportional(14.0),
                Color32::from_gray(150),
            );
        }

        let selected_color = Color32::from_rgb(245, 206, 93);
        for (index, (sprite, (label_rect, galley))) in
            snapshot.words.iter().zip(labels).enumerate()
        {
            if !rect.intersects(label_rect) {
                continue;
            }

            let is_hovered = hovered == Some(index);
            let is_selected = self.selected.as_deref() == Some(sprite.key.as_str());
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&sprite.key));

            let base_color = word_color(sprite.size_hint);
            let color = if is_hovered {
                Color32::from_rgb(255, 164, 101)
            } else if is_selected {
                selected_color
            } else if is_match {
                blend_color(base_color, Color32::from_rgb(103, 196, 255), 0.68)
            } else if search_active {
                dim_color(base_color, 0.38)
            } else {
                base_color
            };

            if is_selected {
                painter.rect_stroke(
                    label_rect.expand(3.0),
                    4.0,
                    Stroke::new(1.2, selected_color),
                    StrokeKind::Outside,
                );
            }
            painter.galley(label_rect.min, galley, color);
        }

        let hovered_key = hovered
            .and_then(|index| snapshot.words.get(index))
            .map(|sprite| sprite.key.clone());

        if let Some(key) = &hovered_key
            && let Some(detail) = self.session.word_detail(key)
        {
            response.clone().on_hover_ui_at_pointer(|ui| {
                ui.set_max_width(360.0);
                Self::draw_word_detail(ui, &detail, 160);
            });
        }

        if response.clicked() {
            match hovered_key {
                Some(key) => self.toggle_selected(key),
                None => self.selected = None,
            }
        }
    }
}
