use eframe::egui::{Color32, FontId, Painter, Pos2, Rect, Stroke, Vec2};

pub(super) const ACCENT: Color32 = Color32::from_rgb(247, 147, 33);
pub(super) const BACKGROUND: Color32 = Color32::BLACK;
pub(super) const NODE_FILL: Color32 = Color32::BLACK;
pub(super) const LABEL_COLOR: Color32 = Color32::WHITE;

pub(super) const NODE_FONT_SIZE: f32 = 14.0;
pub(super) const EDGE_FONT_SIZE: f32 = 12.0;
pub(super) const OVERLAY_FONT_SIZE: f32 = 14.0;

const NODE_LABEL_PADDING: f32 = 12.0;
pub(super) const MIN_NODE_RADIUS: f32 = 28.0;

/// Average advance of the bundled monospace face relative to its size.
const MONOSPACE_ADVANCE: f32 = 0.6;

pub(super) fn node_font() -> FontId {
    FontId::monospace(NODE_FONT_SIZE)
}

pub(super) fn edge_font() -> FontId {
    FontId::monospace(EDGE_FONT_SIZE)
}

pub(super) fn overlay_font() -> FontId {
    FontId::monospace(OVERLAY_FONT_SIZE)
}

/// Width of a rendered single-line string, in screen pixels.
pub(super) trait TextMeasure {
    fn text_width(&self, text: &str, font: &FontId) -> f32;
}

impl TextMeasure for Painter {
    fn text_width(&self, text: &str, font: &FontId) -> f32 {
        self.layout_no_wrap(text.to_owned(), font.clone(), LABEL_COLOR)
            .size()
            .x
    }
}

/// Font-free width estimate used before the first frame has fonts loaded.
pub(super) struct MonospaceEstimate;

impl TextMeasure for MonospaceEstimate {
    fn text_width(&self, text: &str, font: &FontId) -> f32 {
        text.chars().count() as f32 * font.size * MONOSPACE_ADVANCE
    }
}

/// Screen-space radius of a circle that fits a label of the given width.
pub(super) fn node_radius(label_width: f32) -> f32 {
    (label_width * 0.5 + NODE_LABEL_PADDING).max(MIN_NODE_RADIUS)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, scale: f32) {
    painter.rect_filled(rect, 0.0, BACKGROUND);

    let step = (64.0 * scale.clamp(0.5, 2.0)).max(24.0);
    let origin = rect.min + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(247, 147, 33, 14));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}
