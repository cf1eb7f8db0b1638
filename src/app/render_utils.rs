use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2, vec2};
use word_drift::Vector2;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (64.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 50));

    let mut x = origin.x.rem_euclid(step) + rect.left();
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step) + rect.top();
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn to_vec2(point: Vector2) -> Vec2 {
    vec2(point.x as f32, point.y as f32)
}

/// `scale` maps layout units to points before the user's pan is applied.
pub(super) fn world_to_screen(rect: Rect, pan: Vec2, scale: f32, world: Vector2) -> Pos2 {
    rect.center() + pan + to_vec2(world) * scale
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, scale: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / scale
}

/// Maps a sprite's size hint back onto [0, 1] and colours it from cool to
/// warm.
pub(super) fn word_color(size_hint: f32) -> Color32 {
    let t = ((size_hint - 12.0) / 28.0).clamp(0.0, 1.0);
    let r = (90.0 + (165.0 * t)) as u8;
    let g = (170.0 - (40.0 * t)) as u8;
    let b = (225.0 - (150.0 * t)) as u8;
    Color32::from_rgb(r, g, b)
}
