use eframe::egui::{self, RichText, Ui};

use super::super::ViewModel;

impl ViewModel {
    /// Node the details panel describes: whatever is under the pointer, else
    /// the last search pick.
    fn details_target(&self) -> Option<String> {
        self.session
            .as_ref()
            .and_then(|session| session.hovered_id())
            .map(str::to_owned)
            .or_else(|| self.focused.clone())
    }

    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Character Details");
        ui.add_space(6.0);

        let Some(target) = self.details_target() else {
            ui.label("Hover a node or pick a search result.");
            return;
        };

        let entities = self.entities.clone();
        let Some(entity) = entities.iter().find(|entity| entity.name.trim() == target.trim()) else {
            ui.label("This character is no longer part of the cast.");
            return;
        };

        let model = self.session.as_ref().map(|session| session.model());
        let connection_count = model
            .and_then(|model| {
                model
                    .node_index(&entity.name)
                    .map(|index| model.edge_count_for(index))
            })
            .unwrap_or(0);
        let mentioned_by: Vec<(String, String, String)> = model
            .and_then(|model| {
                model.node_index(&entity.name).map(|index| {
                    model
                        .incoming_edges(index)
                        .map(|(source, edge)| {
                            (source.to_owned(), edge.label.clone(), edge.details.clone())
                        })
                        .collect()
                })
            })
            .unwrap_or_default();
        let in_graph: Vec<bool> = entity
            .relationships
            .iter()
            .map(|relationship| match (model, relationship.target_name()) {
                (Some(model), Some(name)) => model.node_index(name).is_some(),
                _ => false,
            })
            .collect();

        ui.label(RichText::new(entity.name.as_str()).strong());
        let title = entity.display_title();
        if !title.is_empty() {
            ui.small(title);
        }
        ui.label(format!("Connections in graph: {connection_count}"));

        let traits = entity.key_traits();
        if !traits.is_empty() {
            ui.separator();
            ui.label(RichText::new("Key traits").strong());
            for line in traits {
                ui.label(format!("- {line}"));
            }
        }

        let mut pending_focus = None;
        egui::ScrollArea::vertical()
            .id_salt("character_details_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if !entity.bio.is_empty() {
                    ui.separator();
                    ui.label(RichText::new("Bio").strong());
                    for line in &entity.bio {
                        ui.label(line.as_str());
                    }
                }

                if !entity.knowledge.is_empty() {
                    ui.separator();
                    ui.label(RichText::new("Knowledge").strong());
                    for line in &entity.knowledge {
                        ui.label(format!("- {line}"));
                    }
                }

                ui.separator();
                ui.label(RichText::new("Relationships").strong());
                if entity.relationships.is_empty() {
                    ui.label("No relationships recorded.");
                }
                for (index, relationship) in entity.relationships.iter().enumerate() {
                    let Some(name) = relationship.target_name() else {
                        continue;
                    };

                    let linked = in_graph.get(index).copied().unwrap_or(false);
                    let flag = if linked { "in graph" } else { "not in cast" };
                    let label = format!("{name}: {}  [{flag}]", relationship.relationship.trim());
                    if linked {
                        let link = ui.link(label);
                        let link = if relationship.details.is_empty() {
                            link
                        } else {
                            link.on_hover_text(relationship.details.as_str())
                        };
                        if link.clicked() {
                            pending_focus = Some(name.to_owned());
                        }
                    } else {
                        ui.weak(label);
                    }

                    if !relationship.details.is_empty() {
                        ui.small(relationship.details.as_str());
                    }
                    ui.add_space(2.0);
                }

                if !mentioned_by.is_empty() {
                    ui.separator();
                    ui.label(RichText::new("Mentioned by").strong());
                    for (source, label, details) in &mentioned_by {
                        if ui.link(format!("{source}: {label}")).clicked() {
                            pending_focus = Some(source.clone());
                        }
                        if !details.is_empty() {
                            ui.small(details.as_str());
                        }
                    }
                }
            });

        if let Some(name) = pending_focus {
            self.focus_node(name);
        }
    }
}
