use std::collections::{HashMap, VecDeque};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};

use crate::cast::{Entity, EntitySource};

mod graph;
mod physics;
mod render_utils;
mod session;
mod transform;
mod ui;

use session::GraphSession;

type LoadResult = Result<Vec<Entity>, String>;

/// Settings resolved from the command line before the window opens.
#[derive(Clone, Copy, Debug)]
pub struct AppConfig {
    pub physics: PhysicsConfig,
    pub overlay_width: f32,
    pub live_physics: bool,
}

impl AppConfig {
    pub const OVERLAY_WIDTH_RANGE: RangeInclusive<f32> = 160.0..=600.0;
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            overlay_width: 300.0,
            live_physics: true,
        }
    }
}

/// Tuning constants for the force simulation. Distances are world units,
/// `time_step` is the fixed Euler step per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub repulsion: f32,
    pub spring_strength: f32,
    pub rest_length: f32,
    pub center_strength: f32,
    pub damping: f32,
    pub time_step: f32,
    pub max_velocity: f32,
}

/// Bounds shared by the command line and the tuning sliders.
impl PhysicsConfig {
    pub const REPULSION_RANGE: RangeInclusive<f32> = 0.0..=100_000.0;
    pub const SPRING_RANGE: RangeInclusive<f32> = 0.0..=0.5;
    pub const REST_LENGTH_RANGE: RangeInclusive<f32> = 40.0..=400.0;
    pub const CENTER_RANGE: RangeInclusive<f32> = 0.0..=0.1;
    pub const DAMPING_RANGE: RangeInclusive<f32> = 0.1..=0.99;
    pub const TIME_STEP_RANGE: RangeInclusive<f32> = 0.05..=1.0;
    pub const MAX_VELOCITY_RANGE: RangeInclusive<f32> = 1.0..=100.0;

    /// Every field pulled into its slider range.
    pub fn clamped(self) -> Self {
        Self {
            repulsion: clamp_to(self.repulsion, Self::REPULSION_RANGE),
            spring_strength: clamp_to(self.spring_strength, Self::SPRING_RANGE),
            rest_length: clamp_to(self.rest_length, Self::REST_LENGTH_RANGE),
            center_strength: clamp_to(self.center_strength, Self::CENTER_RANGE),
            damping: clamp_to(self.damping, Self::DAMPING_RANGE),
            time_step: clamp_to(self.time_step, Self::TIME_STEP_RANGE),
            max_velocity: clamp_to(self.max_velocity, Self::MAX_VELOCITY_RANGE),
        }
    }
}

/// NaN falls back to the lower bound.
pub fn clamp_to(value: f32, range: RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            repulsion: 20_000.0,
            spring_strength: 0.08,
            rest_length: 150.0,
            center_strength: 0.01,
            damping: 0.8,
            time_step: 0.3,
            max_velocity: 20.0,
        }
    }
}

pub struct CastGraphApp {
    source: EntitySource,
    config: AppConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    entities: Arc<[Entity]>,
    session: Option<GraphSession>,
    physics: PhysicsConfig,
    live_physics: bool,
    overlay_width: f32,
    search: String,
    focused: Option<String>,
    pointer_inside: bool,
    layout_moving: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

/// Nodes and edges of one layout session. Rebuilt wholesale whenever the
/// entity list changes; only positions, velocities, radii and drag flags
/// change in between.
struct GraphModel {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    entities: Arc<[Entity]>,
    index_by_id: HashMap<String, usize>,
    physics_scratch: PhysicsScratch,
}

struct GraphNode {
    id: String,
    position: Vec2,
    velocity: Vec2,
    /// Screen-space radius in pixels; divide by the view scale for world units.
    radius: f32,
    is_dragged: bool,
    display_title: String,
    /// Index of the owning record in `GraphModel::entities`.
    entity: usize,
}

struct GraphEdge {
    source: usize,
    target: usize,
    label: String,
    details: String,
}

#[derive(Default)]
struct PhysicsScratch {
    forces: Vec<Vec2>,
}

impl CastGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, source: EntitySource, config: AppConfig) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: EntitySource) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = source.load().map_err(|error| format!("{error:#}"));
            if let Err(error) = &result {
                log::error!("{error}");
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: EntitySource) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }
}

impl eframe::App for CastGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition = Some(match result {
                            Ok(entities) => {
                                AppState::Ready(Box::new(ViewModel::new(entities, self.config)))
                            }
                            Err(error) => AppState::Error(error),
                        });
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading cast...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the cast");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.source.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                let source_label = self.source.describe();
                model.show(ctx, &source_label, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(entities)) => model.replace_entities(entities),
                        Ok(Err(error)) => transition = Some(AppState::Error(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
