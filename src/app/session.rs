use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eframe::egui::{Painter, Rect, Vec2};
use rand::Rng;

use crate::cast::Entity;

use super::graph::{InteractionState, PointerEvent, RenderStyle, render_scene};
use super::physics::simulate;
use super::render_utils::TextMeasure;
use super::transform::ViewTransform;
use super::{GraphModel, PhysicsConfig};

/// Shared stop flag for a running frame loop.
#[derive(Clone, Debug, Default)]
pub(in crate::app) struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub(in crate::app) fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub(in crate::app) fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Per-frame scheduler. While running, each `tick` runs the frame callback
/// and reports whether another frame should be requested.
#[derive(Debug, Default)]
pub(in crate::app) struct FrameLoop {
    token: Option<CancelToken>,
    frames: u64,
}

impl FrameLoop {
    pub(in crate::app) fn start(&mut self) -> CancelToken {
        if let Some(token) = &self.token
            && !token.is_cancelled()
        {
            return token.clone();
        }

        let token = CancelToken::default();
        self.token = Some(token.clone());
        token
    }

    pub(in crate::app) fn stop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    pub(in crate::app) fn is_running(&self) -> bool {
        self.token.as_ref().is_some_and(|token| !token.is_cancelled())
    }

    pub(in crate::app) fn frames(&self) -> u64 {
        self.frames
    }

    pub(in crate::app) fn tick(&mut self, step: impl FnOnce()) -> bool {
        if !self.is_running() {
            return false;
        }
        step();
        self.frames += 1;
        true
    }
}

/// Everything one mounted graph owns: the model, the view, the pointer state
/// and the frame loop driving physics.
pub(in crate::app) struct GraphSession {
    model: GraphModel,
    view: ViewTransform,
    interaction: InteractionState,
    frame_loop: FrameLoop,
    physics: PhysicsConfig,
    surface_size: Vec2,
    /// World point the centering force pulls toward. Fixed in world space so
    /// panning and zooming do not drag the layout along.
    anchor: Vec2,
    disposed: bool,
}

impl GraphSession {
    pub(in crate::app) fn mount(
        surface_size: Vec2,
        entities: Arc<[Entity]>,
        physics: PhysicsConfig,
    ) -> Self {
        Self::mount_with_rng(surface_size, entities, physics, &mut rand::thread_rng())
    }

    pub(in crate::app) fn mount_with_rng(
        surface_size: Vec2,
        entities: Arc<[Entity]>,
        physics: PhysicsConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let mut view = ViewTransform::default();
        let model = GraphModel::build(entities, view.surface_center_world(surface_size), rng);
        view.fit_to_bounds(model.positions(), surface_size);
        let anchor = view.surface_center_world(surface_size);

        let mut frame_loop = FrameLoop::default();
        frame_loop.start();

        log::info!(
            "mounted graph: {} nodes, {} edges on a {:.0}x{:.0} surface",
            model.nodes.len(),
            model.edges.len(),
            surface_size.x,
            surface_size.y
        );

        Self {
            model,
            view,
            interaction: InteractionState::default(),
            frame_loop,
            physics,
            surface_size,
            anchor,
            disposed: false,
        }
    }

    /// Fits the view to the current layout and drops any gesture in progress.
    pub(in crate::app) fn reset_view(&mut self) {
        if self.disposed {
            return;
        }

        self.interaction.reset(&mut self.model);
        self.model.settle();
        self.view
            .fit_to_bounds(self.model.positions(), self.surface_size);
        self.anchor = self.view.surface_center_world(self.surface_size);
        log::info!("view reset");
    }

    /// Stops the frame loop and detaches input. Safe to call repeatedly.
    pub(in crate::app) fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        self.frame_loop.stop();
        self.interaction.reset(&mut self.model);
        self.disposed = true;
        log::info!("graph session disposed after {} frames", self.frame_loop.frames());
    }

    #[cfg(test)]
    pub(in crate::app) fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub(in crate::app) fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    pub(in crate::app) fn handle_event(&mut self, event: PointerEvent) {
        if self.disposed {
            return;
        }
        self.interaction
            .handle(event, &mut self.model, &mut self.view);
    }

    /// Moves the camera by `delta` screen pixels.
    pub(in crate::app) fn pan_by(&mut self, delta: Vec2) {
        if !self.disposed {
            self.view.pan_by(delta);
        }
    }

    pub(in crate::app) fn set_physics(&mut self, physics: PhysicsConfig) {
        self.physics = physics;
    }

    /// One frame of layout work: re-measure radii for the current surface and
    /// advance the simulation. Returns whether another frame is wanted.
    pub(in crate::app) fn step(
        &mut self,
        surface_size: Vec2,
        measure: &impl TextMeasure,
        live_physics: bool,
    ) -> bool {
        if surface_size != self.surface_size {
            self.anchor += (surface_size - self.surface_size) * 0.5 / self.view.scale();
            self.surface_size = surface_size;
        }

        let Self {
            model,
            frame_loop,
            physics,
            anchor,
            ..
        } = self;
        let mut moving = false;
        let ticked = frame_loop.tick(|| {
            model.refresh_radii(measure);
            if live_physics {
                moving = simulate(model, physics, *anchor);
            }
        });

        ticked && (moving || self.interaction.dragged_node().is_some())
    }

    pub(in crate::app) fn render(&self, painter: &Painter, rect: Rect, style: &RenderStyle) {
        render_scene(
            painter,
            rect,
            &self.model,
            &self.view,
            &self.interaction,
            style,
        );
    }

    /// Rebuilds the model from a new entity list while keeping the view.
    /// Hover follows its node id; an active drag is dropped.
    pub(in crate::app) fn replace_entities(&mut self, entities: Arc<[Entity]>) {
        self.replace_entities_with_rng(entities, &mut rand::thread_rng());
    }

    fn replace_entities_with_rng(&mut self, entities: Arc<[Entity]>, rng: &mut impl Rng) {
        let model = GraphModel::build(entities, self.anchor, rng);
        self.interaction.rebind(&self.model, &model);
        self.model = model;
        log::info!(
            "graph rebuilt: {} nodes, {} edges",
            self.model.nodes.len(),
            self.model.edges.len()
        );
    }

    /// Moves the view so `id` sits at the surface center. Returns false when
    /// no such node exists.
    pub(in crate::app) fn focus(&mut self, id: &str) -> bool {
        let Some(index) = self.model.node_index(id) else {
            return false;
        };
        let position = self.model.nodes[index].position;
        self.view.center_on(position, self.surface_size);
        true
    }

    pub(in crate::app) fn model(&self) -> &GraphModel {
        &self.model
    }

    #[cfg(test)]
    pub(in crate::app) fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub(in crate::app) fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    /// Id of the node under the pointer or being dragged.
    pub(in crate::app) fn hovered_id(&self) -> Option<&str> {
        self.interaction
            .hovered_node()
            .and_then(|index| self.model.nodes.get(index))
            .map(|node| node.id.as_str())
    }
}

impl Drop for GraphSession {
    fn drop(&mut self) {
        self.dispose();
    }
}
