use std::ops::RangeInclusive;

use eframe::egui::{self, Key, Response, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::{AppConfig, PhysicsConfig, ViewModel};

const SEARCH_RESULT_LIMIT: usize = 12;
const KEY_NUDGE_STEPS_PER_SEC: f32 = 40.0;

/// Lets a focused slider be moved with the arrow keys at a rate proportional
/// to its range.
fn nudge_with_arrow_keys(
    ui: &Ui,
    response: &Response,
    value: &mut f32,
    range: RangeInclusive<f32>,
) -> bool {
    if !response.has_focus() {
        return false;
    }

    let (delta_time, increase, decrease) = ui.input(|input| {
        (
            input.stable_dt.min(0.1),
            input.key_down(Key::ArrowRight) || input.key_down(Key::ArrowUp),
            input.key_down(Key::ArrowLeft) || input.key_down(Key::ArrowDown),
        )
    });
    let direction = (increase as i8 - decrease as i8) as f32;
    if direction == 0.0 {
        return false;
    }

    let step = (range.end() - range.start()) / 200.0;
    let old_value = *value;
    *value = (*value + direction * step * KEY_NUDGE_STEPS_PER_SEC * delta_time)
        .clamp(*range.start(), *range.end());
    ui.ctx().request_repaint();
    (*value - old_value).abs() > f32::EPSILON
}

fn tuning_slider(
    ui: &mut Ui,
    value: &mut f32,
    range: RangeInclusive<f32>,
    label: &str,
    hover: &str,
) -> bool {
    let response = ui
        .add(
            egui::Slider::new(value, range.clone())
                .text(label)
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text(hover);
    if response.hovered() {
        response.request_focus();
    }
    let changed = response.changed();
    changed | nudge_with_arrow_keys(ui, &response, value, range)
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Names matching `query`, best first. Ties keep input order.
fn search_matches<'a>(names: impl IntoIterator<Item = &'a str>, query: &str) -> Vec<&'a str> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(&str, i64)> = names
        .into_iter()
        .filter_map(|name| fuzzy_match_score(&matcher, name, query).map(|score| (name, score)))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
        .into_iter()
        .take(SEARCH_RESULT_LIMIT)
        .map(|(name, _)| name)
        .collect()
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search")
            .on_hover_text("Fuzzy-match character names; click a result to center it.");
        ui.text_edit_singleline(&mut self.search);

        let matches: Vec<String> = search_matches(
            self.entities.iter().map(|entity| entity.name.as_str()),
            &self.search,
        )
        .into_iter()
        .map(str::to_owned)
        .collect();
        if !self.search.trim().is_empty() && matches.is_empty() {
            ui.weak("No matching characters.");
        }
        for name in matches {
            let selected = self.focused.as_deref() == Some(name.as_str());
            if ui.selectable_label(selected, name.as_str()).clicked() {
                self.focus_node(name);
            }
        }

        ui.separator();

        ui.checkbox(&mut self.live_physics, "Live physics simulation")
            .on_hover_text("Continuously simulate layout forces while viewing the graph.");

        ui.add_space(4.0);
        tuning_slider(
            ui,
            &mut self.overlay_width,
            AppConfig::OVERLAY_WIDTH_RANGE,
            "Detail panel width",
            "Width of the hover panel drawn next to a node, in pixels.",
        );

        ui.collapsing("Physics tuning", |ui| {
            let physics = &mut self.physics;
            tuning_slider(
                ui,
                &mut physics.repulsion,
                PhysicsConfig::REPULSION_RANGE,
                "Repulsion",
                "How strongly nodes push away from each other.",
            );
            tuning_slider(
                ui,
                &mut physics.spring_strength,
                PhysicsConfig::SPRING_RANGE,
                "Edge spring",
                "How strongly related characters pull toward the rest length.",
            );
            tuning_slider(
                ui,
                &mut physics.rest_length,
                PhysicsConfig::REST_LENGTH_RANGE,
                "Rest length",
                "Preferred distance between related characters, in world units.",
            );
            tuning_slider(
                ui,
                &mut physics.center_strength,
                PhysicsConfig::CENTER_RANGE,
                "Centering",
                "Pull toward the middle of the canvas.",
            );
            tuning_slider(
                ui,
                &mut physics.damping,
                PhysicsConfig::DAMPING_RANGE,
                "Damping",
                "Fraction of velocity kept each step.",
            );
            tuning_slider(
                ui,
                &mut physics.time_step,
                PhysicsConfig::TIME_STEP_RANGE,
                "Time step",
                "Integration step per frame.",
            );
            tuning_slider(
                ui,
                &mut physics.max_velocity,
                PhysicsConfig::MAX_VELOCITY_RANGE,
                "Max speed",
                "Upper bound on node speed per step.",
            );

            if ui.button("Restore defaults").clicked() {
                *physics = PhysicsConfig::default();
            }
        });
    }

    pub(in crate::app) fn focus_node(&mut self, id: String) {
        if let Some(session) = self.session.as_mut()
            && !session.focus(&id)
        {
            log::debug!("{id:?} is not in the current graph");
        }
        self.focused = Some(id);
    }
}
