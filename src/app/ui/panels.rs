use std::collections::VecDeque;
use std::sync::Arc;

use eframe::egui::{self, Align, Context, Layout};

use crate::cast::Entity;

use super::super::{AppConfig, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(entities: Vec<Entity>, config: AppConfig) -> Self {
        log::info!("cast ready: {} entities", entities.len());

        Self {
            entities: entities.into(),
            session: None,
            physics: config.physics,
            live_physics: config.live_physics,
            overlay_width: config.overlay_width,
            search: String::new(),
            focused: None,
            pointer_inside: false,
            layout_moving: false,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source_label: &str,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        self.update_fps_counter(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("cast-graph");
                    ui.separator();
                    ui.label(format!("source: {source_label}"));
                    ui.label(format!("characters: {}", self.entities.len()));
                    if let Some(session) = &self.session {
                        ui.label(format!("links: {}", session.model().edges.len()));
                    }

                    let reload_button =
                        ui.add_enabled(!is_reloading, egui::Button::new("Reload cast"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if is_reloading {
                        ui.spinner();
                    }

                    let reset_button =
                        ui.add_enabled(self.session.is_some(), egui::Button::new("Reset view"));
                    if reset_button.clicked()
                        && let Some(session) = self.session.as_mut()
                    {
                        session.reset_view();
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                        ui.label(self.layout_status_text());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }

    /// Swaps in a freshly loaded cast. A mounted session keeps its view.
    pub(in crate::app) fn replace_entities(&mut self, entities: Vec<Entity>) {
        let entities: Arc<[Entity]> = entities.into();
        log::info!("cast reloaded: {} entities", entities.len());

        if let Some(session) = self.session.as_mut() {
            session.replace_entities(Arc::clone(&entities));
        }
        if let Some(focused) = &self.focused
            && !entities.iter().any(|entity| &entity.name == focused)
        {
            self.focused = None;
        }
        self.entities = entities;
    }
}
