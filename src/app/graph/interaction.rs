use eframe::egui::{Pos2, Vec2};

use super::super::transform::ViewTransform;
use super::super::GraphModel;

const WHEEL_ZOOM_IN: f32 = 1.1;
const WHEEL_ZOOM_OUT: f32 = 0.9;

/// What the single active pointer is currently doing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(in crate::app) enum Gesture {
    #[default]
    Idle,
    /// `anchor` is the pointer position minus the pan at press time.
    PanningCanvas { anchor: Vec2 },
    DraggingNode { node: usize },
}

/// Pointer input in surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum PointerEvent {
    Down(Pos2),
    Move(Pos2),
    Up,
    Leave,
    /// Positive `scroll` zooms in.
    Wheel { pos: Pos2, scroll: f32 },
}

/// Next gesture for an event. `hit` is the node under the pointer for a
/// press; `pan` is the view pan at the time of the event.
///
/// A press while a gesture is already active is ignored.
pub(in crate::app) fn transition(
    gesture: Gesture,
    event: PointerEvent,
    hit: Option<usize>,
    pan: Vec2,
) -> Gesture {
    match (gesture, event) {
        (Gesture::Idle, PointerEvent::Down(pos)) => match hit {
            Some(node) => Gesture::DraggingNode { node },
            None => Gesture::PanningCanvas {
                anchor: pos.to_vec2() - pan,
            },
        },
        (
            Gesture::PanningCanvas { .. } | Gesture::DraggingNode { .. },
            PointerEvent::Up | PointerEvent::Leave,
        ) => Gesture::Idle,
        (current, _) => current,
    }
}

/// Node whose circle contains `pointer`, nearest center first. The boundary
/// itself is a miss.
pub(in crate::app) fn hit_test(model: &GraphModel, view: &ViewTransform, pointer: Pos2) -> Option<usize> {
    let world = view.screen_to_world(pointer);
    let scale = view.scale();

    model
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let distance = (node.position - world).length();
            (distance < node.radius / scale).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

fn wheel_zoom_factor(scroll: f32) -> f32 {
    if scroll > 0.0 {
        WHEEL_ZOOM_IN
    } else if scroll < 0.0 {
        WHEEL_ZOOM_OUT
    } else {
        1.0
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(in crate::app) struct InteractionState {
    gesture: Gesture,
    hovered: Option<usize>,
}

impl InteractionState {
    pub(in crate::app) fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub(in crate::app) fn dragged_node(&self) -> Option<usize> {
        match self.gesture {
            Gesture::DraggingNode { node } => Some(node),
            _ => None,
        }
    }

    pub(in crate::app) fn hovered_node(&self) -> Option<usize> {
        self.hovered
    }

    pub(in crate::app) fn handle(
        &mut self,
        event: PointerEvent,
        model: &mut GraphModel,
        view: &mut ViewTransform,
    ) {
        let hit = match event {
            PointerEvent::Down(pos) if self.gesture == Gesture::Idle => hit_test(model, view, pos),
            _ => None,
        };

        let previous = self.gesture;
        let next = transition(previous, event, hit, view.pan());
        if next != previous {
            if let Gesture::DraggingNode { node } = previous {
                model.set_dragged(node, false);
            }
            if let Gesture::DraggingNode { node } = next {
                model.set_dragged(node, true);
                self.hovered = Some(node);
            }
            log::debug!("gesture {previous:?} -> {next:?}");
            self.gesture = next;
        }

        match event {
            PointerEvent::Move(pos) => match self.gesture {
                Gesture::DraggingNode { node } => model.drag_to(node, view.screen_to_world(pos)),
                Gesture::PanningCanvas { anchor } => view.set_pan(pos.to_vec2() - anchor),
                Gesture::Idle => self.hovered = hit_test(model, view, pos),
            },
            PointerEvent::Leave => self.hovered = None,
            PointerEvent::Wheel { pos, scroll } => view.zoom_at(pos, wheel_zoom_factor(scroll)),
            PointerEvent::Down(_) | PointerEvent::Up => {}
        }
    }

    /// Drops any active gesture and every drag flag.
    pub(in crate::app) fn reset(&mut self, model: &mut GraphModel) {
        if let Gesture::DraggingNode { node } = self.gesture {
            model.set_dragged(node, false);
        }
        self.gesture = Gesture::Idle;
    }

    /// Carries hover over to a rebuilt model by node id. Gestures do not
    /// survive a rebuild.
    pub(in crate::app) fn rebind(&mut self, previous: &GraphModel, next: &GraphModel) {
        self.gesture = Gesture::Idle;
        self.hovered = self
            .hovered
            .and_then(|index| previous.nodes.get(index))
            .and_then(|node| next.node_index(&node.id));
    }

    #[cfg(test)]
    pub(in crate::app) fn set_hovered(&mut self, hovered: Option<usize>) {
        self.hovered = hovered;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::cast::Entity;

    /// Two nodes of radius 40: "A" at the world origin and "B" at (200, 0).
    /// The view maps the world origin to surface (100, 100) at scale 1.
    fn fixture() -> (GraphModel, ViewTransform, InteractionState) {
        let entities = vec![Entity::named("A").related_to("B", "ally"), Entity::named("B")];
        let mut model =
            GraphModel::build(entities.into(), Vec2::ZERO, &mut StdRng::seed_from_u64(11));
        model.nodes[0].position = Vec2::ZERO;
        model.nodes[1].position = vec2(200.0, 0.0);
        for node in &mut model.nodes {
            node.radius = 40.0;
        }

        let mut view = ViewTransform::default();
        view.set_pan(vec2(100.0, 100.0));
        (model, view, InteractionState::default())
    }

    fn dragged_count(model: &GraphModel) -> usize {
        model.nodes.iter().filter(|node| node.is_dragged).count()
    }

    #[test]
    fn press_on_boundary_is_a_miss() {
        let (mut model, mut view, mut state) = fixture();
        state.handle(PointerEvent::Down(pos2(140.0, 100.0)), &mut model, &mut view);

        assert!(matches!(state.gesture(), Gesture::PanningCanvas { .. }));
        assert_eq!(state.dragged_node(), None);
        assert_eq!(dragged_count(&model), 0);
    }

    #[test]
    fn press_inside_node_starts_drag_and_move_follows_pointer() {
        let (mut model, mut view, mut state) = fixture();
        model.nodes[0].velocity = vec2(4.0, 4.0);

        state.handle(PointerEvent::Down(pos2(139.0, 100.0)), &mut model, &mut view);
        assert_eq!(state.gesture(), Gesture::DraggingNode { node: 0 });
        assert!(model.nodes[0].is_dragged);
        assert_eq!(model.nodes[0].velocity, Vec2::ZERO);
        assert_eq!(state.hovered_node(), Some(0));

        state.handle(PointerEvent::Move(pos2(150.0, 180.0)), &mut model, &mut view);
        assert_eq!(model.nodes[0].position, vec2(50.0, 80.0));
        assert_eq!(view.pan(), vec2(100.0, 100.0));

        state.handle(PointerEvent::Up, &mut model, &mut view);
        assert_eq!(state.gesture(), Gesture::Idle);
        assert_eq!(dragged_count(&model), 0);
    }

    #[test]
    fn hit_radius_is_divided_by_scale() {
        let (mut model, mut view, mut state) = fixture();
        view.zoom_at(pos2(100.0, 100.0), 2.0);

        // 30px from the center is 15 world units; radius 40px is 20 world units.
        assert_eq!(hit_test(&model, &view, pos2(130.0, 100.0)), Some(0));
        assert_eq!(hit_test(&model, &view, pos2(141.0, 100.0)), None);

        state.handle(PointerEvent::Down(pos2(130.0, 100.0)), &mut model, &mut view);
        assert_eq!(state.dragged_node(), Some(0));
    }

    #[test]
    fn panning_tracks_pointer_relative_to_anchor() {
        let (mut model, mut view, mut state) = fixture();
        state.handle(PointerEvent::Down(pos2(500.0, 500.0)), &mut model, &mut view);
        assert_eq!(
            state.gesture(),
            Gesture::PanningCanvas {
                anchor: vec2(400.0, 400.0)
            }
        );

        state.handle(PointerEvent::Move(pos2(520.0, 490.0)), &mut model, &mut view);
        assert_eq!(view.pan(), vec2(120.0, 90.0));
        assert_eq!(model.nodes[0].position, Vec2::ZERO);

        state.handle(PointerEvent::Leave, &mut model, &mut view);
        assert_eq!(state.gesture(), Gesture::Idle);
        state.handle(PointerEvent::Move(pos2(0.0, 0.0)), &mut model, &mut view);
        assert_eq!(view.pan(), vec2(120.0, 90.0));
    }

    #[test]
    fn second_press_during_gesture_is_ignored() {
        let (mut model, mut view, mut state) = fixture();
        state.handle(PointerEvent::Down(pos2(100.0, 100.0)), &mut model, &mut view);
        state.handle(PointerEvent::Down(pos2(300.0, 100.0)), &mut model, &mut view);

        assert_eq!(state.dragged_node(), Some(0));
        assert_eq!(dragged_count(&model), 1);
        assert!(!model.nodes[1].is_dragged);
    }

    #[test]
    fn idle_move_updates_hover_and_leave_clears_it() {
        let (mut model, mut view, mut state) = fixture();
        state.handle(PointerEvent::Move(pos2(310.0, 95.0)), &mut model, &mut view);
        assert_eq!(state.hovered_node(), Some(1));
        assert_eq!(state.gesture(), Gesture::Idle);

        state.handle(PointerEvent::Move(pos2(200.0, 300.0)), &mut model, &mut view);
        assert_eq!(state.hovered_node(), None);

        state.handle(PointerEvent::Move(pos2(100.0, 100.0)), &mut model, &mut view);
        state.handle(PointerEvent::Leave, &mut model, &mut view);
        assert_eq!(state.hovered_node(), None);
    }

    #[test]
    fn wheel_zooms_without_changing_gesture() {
        let (mut model, mut view, mut state) = fixture();
        state.handle(PointerEvent::Down(pos2(500.0, 500.0)), &mut model, &mut view);
        let before = state.gesture();

        state.handle(
            PointerEvent::Wheel {
                pos: pos2(100.0, 100.0),
                scroll: 3.0,
            },
            &mut model,
            &mut view,
        );
        assert!((view.scale() - 1.1).abs() < 1e-6);
        assert_eq!(view.world_to_screen(Vec2::ZERO), pos2(100.0, 100.0));
        assert_eq!(state.gesture(), before);

        state.handle(
            PointerEvent::Wheel {
                pos: pos2(100.0, 100.0),
                scroll: -3.0,
            },
            &mut model,
            &mut view,
        );
        assert!((view.scale() - 0.99).abs() < 1e-5);
    }

    #[test]
    fn pure_transition_table() {
        let pan = vec2(10.0, 20.0);
        assert_eq!(
            transition(Gesture::Idle, PointerEvent::Down(pos2(15.0, 25.0)), Some(3), pan),
            Gesture::DraggingNode { node: 3 }
        );
        assert_eq!(
            transition(Gesture::Idle, PointerEvent::Down(pos2(15.0, 25.0)), None, pan),
            Gesture::PanningCanvas {
                anchor: vec2(5.0, 5.0)
            }
        );
        assert_eq!(
            transition(Gesture::DraggingNode { node: 3 }, PointerEvent::Leave, None, pan),
            Gesture::Idle
        );
        assert_eq!(
            transition(Gesture::Idle, PointerEvent::Up, None, pan),
            Gesture::Idle
        );
        assert_eq!(
            transition(
                Gesture::PanningCanvas { anchor: Vec2::ZERO },
                PointerEvent::Move(pos2(1.0, 1.0)),
                None,
                pan
            ),
            Gesture::PanningCanvas { anchor: Vec2::ZERO }
        );
    }

    #[test]
    fn reset_and_rebind_clear_gestures() {
        let (mut model, mut view, mut state) = fixture();
        state.handle(PointerEvent::Down(pos2(300.0, 100.0)), &mut model, &mut view);
        assert!(model.nodes[1].is_dragged);

        state.reset(&mut model);
        assert_eq!(state.gesture(), Gesture::Idle);
        assert_eq!(dragged_count(&model), 0);

        state.set_hovered(Some(1));
        let rebuilt = GraphModel::build(
            vec![Entity::named("B"), Entity::named("C")].into(),
            Vec2::ZERO,
            &mut StdRng::seed_from_u64(5),
        );
        state.rebind(&model, &rebuilt);
        assert_eq!(state.hovered_node(), Some(0));

        state.rebind(&rebuilt, &model);
        assert_eq!(state.hovered_node(), Some(1));
    }
}
