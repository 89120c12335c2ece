use std::collections::HashMap;

use eframe::egui::{self, Align2, Color32, Painter, Pos2, Rect, Stroke, Vec2, pos2, vec2};

use crate::util::{short_label, wrap_words};

use super::super::render_utils::{
    ACCENT, LABEL_COLOR, NODE_FILL, TextMeasure, draw_background, edge_font, node_font,
    overlay_font,
};
use super::super::transform::ViewTransform;
use super::super::GraphModel;
use super::InteractionState;

const EDGE_STROKE: Color32 = Color32::from_rgba_premultiplied(124, 74, 17, 128);
const EDGE_LABEL_COLOR: Color32 = Color32::from_rgb(200, 200, 200);
const OVERLAY_FILL: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 230);
const OVERLAY_PADDING: f32 = 10.0;
const OVERLAY_GAP: f32 = 12.0;
const OVERLAY_LINE_HEIGHT: f32 = 18.0;

#[derive(Clone, Copy, Debug)]
pub(in crate::app) struct RenderStyle {
    /// Outer width of the hover panel in screen pixels.
    pub(in crate::app) overlay_width: f32,
}

/// One drawable connection. Reciprocal statements share a segment.
#[derive(Debug, PartialEq)]
struct EdgeSegment {
    a: usize,
    b: usize,
    label: String,
}

fn edge_segments(model: &GraphModel) -> Vec<EdgeSegment> {
    let mut segments: Vec<EdgeSegment> = Vec::with_capacity(model.edges.len());
    let mut index_by_pair: HashMap<(usize, usize), usize> = HashMap::with_capacity(model.edges.len());
    for edge in &model.edges {
        let (a, b) = if edge.source < edge.target {
            (edge.source, edge.target)
        } else {
            (edge.target, edge.source)
        };

        let Some(&index) = index_by_pair.get(&(a, b)) else {
            index_by_pair.insert((a, b), segments.len());
            segments.push(EdgeSegment {
                a,
                b,
                label: edge.label.clone(),
            });
            continue;
        };

        let segment = &mut segments[index];
        let known = segment.label.split(" / ").any(|part| part == edge.label);
        if !edge.label.is_empty() && !known {
            if !segment.label.is_empty() {
                segment.label.push_str(" / ");
            }
            segment.label.push_str(&edge.label);
        }
    }
    segments
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum LineKind {
    Heading,
    Body,
}

#[derive(Debug, PartialEq)]
struct OverlayLine {
    text: String,
    kind: LineKind,
}

/// Text of the hover panel for `node`, wrapped to fit `width`.
fn overlay_lines(
    model: &GraphModel,
    node: usize,
    width: f32,
    measure: &impl TextMeasure,
) -> Vec<OverlayLine> {
    let Some(graph_node) = model.nodes.get(node) else {
        return Vec::new();
    };

    let font = overlay_font();
    let text_width = (width - OVERLAY_PADDING * 2.0).max(1.0);
    let mut lines = Vec::new();
    let push_wrapped = |lines: &mut Vec<OverlayLine>, text: &str, kind: LineKind| {
        for line in wrap_words(text, text_width, |part| measure.text_width(part, &font)) {
            lines.push(OverlayLine { text: line, kind });
        }
    };

    push_wrapped(&mut lines, &graph_node.id, LineKind::Heading);
    for title_line in graph_node.display_title.lines() {
        push_wrapped(&mut lines, title_line, LineKind::Body);
    }

    let relationships: Vec<String> = model
        .entity(graph_node)
        .relationships
        .iter()
        .filter_map(|relationship| {
            relationship
                .target_name()
                .map(|name| format!("{name}: {}", relationship.relationship.trim()))
        })
        .collect();
    if !relationships.is_empty() {
        lines.push(OverlayLine {
            text: "Relationships:".to_owned(),
            kind: LineKind::Heading,
        });
        for entry in &relationships {
            push_wrapped(&mut lines, entry, LineKind::Body);
        }
    }

    lines
}

/// Top-left corner of the hover panel in surface coordinates. The panel sits
/// right of the node unless that would leave the surface, in which case it
/// flips to the left; vertically it is clamped to the surface.
fn overlay_origin(center: Pos2, radius: f32, size: Vec2, surface: Vec2) -> Pos2 {
    let mut x = center.x + radius + OVERLAY_GAP;
    if x + size.x > surface.x {
        x = center.x - radius - OVERLAY_GAP - size.x;
    }
    let x = x.max(0.0);
    let y = (center.y - radius).min(surface.y - size.y).max(0.0);
    pos2(x, y)
}

/// Paints one frame of the graph into `rect`.
pub(in crate::app) fn render_scene(
    painter: &Painter,
    rect: Rect,
    model: &GraphModel,
    view: &ViewTransform,
    interaction: &InteractionState,
    style: &RenderStyle,
) {
    let offset = rect.min.to_vec2();
    let to_screen = |world: Vec2| view.world_to_screen(world) + offset;

    draw_background(painter, rect, view.pan(), view.scale());

    let edge_stroke = Stroke::new(1.5, EDGE_STROKE);
    let label_font = edge_font();
    for segment in edge_segments(model) {
        let a = to_screen(model.nodes[segment.a].position);
        let b = to_screen(model.nodes[segment.b].position);
        painter.line_segment([a, b], edge_stroke);
        if !segment.label.is_empty() {
            painter.text(
                a.lerp(b, 0.5),
                Align2::CENTER_CENTER,
                segment.label,
                label_font.clone(),
                EDGE_LABEL_COLOR,
            );
        }
    }

    let hovered = interaction.hovered_node();
    let dragged = interaction.dragged_node();
    let name_font = node_font();
    for (index, node) in model.nodes.iter().enumerate() {
        let center = to_screen(node.position);
        let stroke_width = if Some(index) == hovered || Some(index) == dragged {
            3.0
        } else {
            2.0
        };
        painter.circle(center, node.radius, NODE_FILL, Stroke::new(stroke_width, ACCENT));
        painter.text(
            center,
            Align2::CENTER_CENTER,
            short_label(&node.id),
            name_font.clone(),
            LABEL_COLOR,
        );
    }

    if let Some(index) = hovered {
        draw_overlay(painter, rect, model, view, index, style);
    }
}

fn draw_overlay(
    painter: &Painter,
    rect: Rect,
    model: &GraphModel,
    view: &ViewTransform,
    index: usize,
    style: &RenderStyle,
) {
    let Some(node) = model.nodes.get(index) else {
        return;
    };

    let lines = overlay_lines(model, index, style.overlay_width, painter);
    if lines.is_empty() {
        return;
    }

    let size = vec2(
        style.overlay_width,
        lines.len() as f32 * OVERLAY_LINE_HEIGHT + OVERLAY_PADDING * 2.0,
    );
    let center = view.world_to_screen(node.position);
    let origin = overlay_origin(center, node.radius, size, rect.size()) + rect.min.to_vec2();
    let panel = Rect::from_min_size(origin, size);

    painter.rect_filled(panel, 4.0, OVERLAY_FILL);
    painter.rect_stroke(panel, 4.0, Stroke::new(1.0, ACCENT), egui::StrokeKind::Inside);

    let font = overlay_font();
    let mut cursor = origin + vec2(OVERLAY_PADDING, OVERLAY_PADDING);
    for line in lines {
        let color = match line.kind {
            LineKind::Heading => ACCENT,
            LineKind::Body => LABEL_COLOR,
        };
        painter.text(cursor, Align2::LEFT_TOP, line.text, font.clone(), color);
        cursor.y += OVERLAY_LINE_HEIGHT;
    }
}
