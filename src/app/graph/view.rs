use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Key, Pos2, Rect, Sense, Ui, Vec2, vec2};

use super::super::session::GraphSession;
use super::super::ViewModel;
use super::{Gesture, PointerEvent, RenderStyle};

const HINT: &str = "Scroll to zoom • Drag or arrow keys to pan • Drag nodes to move";
/// Keyboard pan speed in screen pixels per second.
const KEY_PAN_SPEED: f32 = 600.0;

#[derive(Clone, Copy, Debug, Default)]
struct ArrowKeys {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

/// Pan offset for one frame of held arrow keys. The camera moves in the
/// arrow's direction, so the scene slides the other way.
fn keyboard_pan(keys: ArrowKeys, dt: f32) -> Vec2 {
    let direction = vec2(
        keys.left as i8 as f32 - keys.right as i8 as f32,
        keys.up as i8 as f32 - keys.down as i8 as f32,
    );
    direction * KEY_PAN_SPEED * dt.clamp(0.0, 0.1)
}

/// The parts of one frame's pointer input the graph cares about.
#[derive(Clone, Copy, Debug, Default)]
struct PointerSample {
    pos: Option<Pos2>,
    pressed: bool,
    released: bool,
    scroll: f32,
}

/// Translates a frame of egui pointer state into graph events in surface
/// coordinates. `inside` remembers whether the pointer was over the graph on
/// the previous frame so leaving can be reported once.
fn pointer_events(sample: PointerSample, rect: Rect, inside: &mut bool) -> Vec<PointerEvent> {
    let mut events = Vec::new();

    let Some(pos) = sample.pos.filter(|pos| rect.contains(*pos)) else {
        if std::mem::take(inside) {
            events.push(PointerEvent::Leave);
        }
        return events;
    };

    *inside = true;
    let local = pos - rect.min.to_vec2();
    events.push(PointerEvent::Move(local));
    if sample.pressed {
        events.push(PointerEvent::Down(local));
    }
    if sample.released {
        events.push(PointerEvent::Up);
    }
    if sample.scroll.abs() > f32::EPSILON {
        events.push(PointerEvent::Wheel {
            pos: local,
            scroll: sample.scroll,
        });
    }
    events
}

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let surface_size = rect.size();
        if surface_size.x <= 0.0 || surface_size.y <= 0.0 {
            return;
        }

        let painter = ui.painter_at(rect);
        let session = self.session.get_or_insert_with(|| {
            GraphSession::mount(surface_size, Arc::clone(&self.entities), self.physics)
        });

        let sample = ui.input(|input| PointerSample {
            pos: input.pointer.hover_pos(),
            pressed: input.pointer.primary_pressed(),
            released: input.pointer.primary_released(),
            scroll: input.raw_scroll_delta.y,
        });
        for event in pointer_events(sample, rect, &mut self.pointer_inside) {
            session.handle_event(event);
        }

        if self.pointer_inside && !ui.ctx().wants_keyboard_input() {
            let (keys, dt) = ui.input(|input| {
                (
                    ArrowKeys {
                        left: input.key_down(Key::ArrowLeft),
                        right: input.key_down(Key::ArrowRight),
                        up: input.key_down(Key::ArrowUp),
                        down: input.key_down(Key::ArrowDown),
                    },
                    input.stable_dt,
                )
            });
            let delta = keyboard_pan(keys, dt);
            if delta != Vec2::ZERO {
                session.pan_by(delta);
            }
        }

        session.set_physics(self.physics);
        self.layout_moving = session.step(surface_size, &painter, self.live_physics);
        session.render(
            &painter,
            rect,
            &RenderStyle {
                overlay_width: self.overlay_width,
            },
        );

        let interaction = session.interaction();
        let cursor = match interaction.gesture() {
            Gesture::DraggingNode { .. } | Gesture::PanningCanvas { .. } => {
                Some(egui::CursorIcon::Grabbing)
            }
            Gesture::Idle if interaction.hovered_node().is_some() => Some(egui::CursorIcon::Grab),
            Gesture::Idle => None,
        };
        if let Some(cursor) = cursor
            && response.hovered()
        {
            ui.output_mut(|output| output.cursor_icon = cursor);
        }

        painter.text(
            rect.left_bottom() + vec2(10.0, -10.0),
            Align2::LEFT_BOTTOM,
            HINT,
            FontId::proportional(12.0),
            Color32::from_gray(150),
        );

        if session.is_running() {
            ui.ctx().request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    fn rect() -> Rect {
        Rect::from_min_size(pos2(100.0, 50.0), vec2(400.0, 300.0))
    }

    #[test]
    fn press_inside_is_reported_in_surface_coordinates() {
        let mut inside = false;
        let events = pointer_events(
            PointerSample {
                pos: Some(pos2(150.0, 80.0)),
                pressed: true,
                ..PointerSample::default()
            },
            rect(),
            &mut inside,
        );

        assert!(inside);
        assert_eq!(
            events,
            vec![
                PointerEvent::Move(pos2(50.0, 30.0)),
                PointerEvent::Down(pos2(50.0, 30.0)),
            ]
        );
    }

    #[test]
    fn release_and_scroll_follow_move() {
        let mut inside = true;
        let events = pointer_events(
            PointerSample {
                pos: Some(pos2(100.0, 50.0)),
                released: true,
                scroll: -2.0,
                ..PointerSample::default()
            },
            rect(),
            &mut inside,
        );

        assert_eq!(
            events,
            vec![
                PointerEvent::Move(Pos2::ZERO),
                PointerEvent::Up,
                PointerEvent::Wheel {
                    pos: Pos2::ZERO,
                    scroll: -2.0
                },
            ]
        );
    }

    #[test]
    fn arrow_keys_pan_against_their_direction() {
        let none = ArrowKeys::default();
        assert_eq!(keyboard_pan(none, 0.016), Vec2::ZERO);

        let left_up = ArrowKeys {
            left: true,
            up: true,
            ..ArrowKeys::default()
        };
        assert!((keyboard_pan(left_up, 0.05) - vec2(30.0, 30.0)).length() < 1e-3);

        let right = ArrowKeys {
            right: true,
            ..ArrowKeys::default()
        };
        // A long stall is capped at 100 ms of movement.
        assert!((keyboard_pan(right, 2.0) - vec2(-60.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn leaving_is_reported_once() {
        let mut inside = true;
        let outside = PointerSample {
            pos: Some(pos2(10.0, 10.0)),
            ..PointerSample::default()
        };

        assert_eq!(pointer_events(outside, rect(), &mut inside), vec![PointerEvent::Leave]);
        assert!(!inside);
        assert!(pointer_events(outside, rect(), &mut inside).is_empty());
        assert!(pointer_events(PointerSample::default(), rect(), &mut inside).is_empty());
    }
}
