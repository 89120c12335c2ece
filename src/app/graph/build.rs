use std::collections::HashMap;
use std::f32::consts::TAU;
use std::sync::Arc;

use eframe::egui::{Vec2, vec2};
use rand::Rng;

use crate::cast::Entity;
use crate::util::short_label;

use super::super::render_utils::{MonospaceEstimate, TextMeasure, node_font, node_radius};
use super::super::{GraphEdge, GraphModel, GraphNode, PhysicsScratch};

/// Radius of the disk around the surface center in which nodes are spawned.
const SPAWN_RADIUS: f32 = 200.0;
/// Past this many nodes the quadratic repulsion pass starts to cost frames.
const LARGE_GRAPH_NODES: usize = 300;

fn random_in_disk(rng: &mut impl Rng, radius: f32) -> Vec2 {
    let angle = rng.gen_range(0.0..TAU);
    let distance = radius * rng.gen_range(0.0f32..1.0).sqrt();
    vec2(angle.cos(), angle.sin()) * distance
}

impl GraphModel {
    pub(in crate::app) fn build(entities: Arc<[Entity]>, center: Vec2, rng: &mut impl Rng) -> Self {
        let mut index_by_id = HashMap::with_capacity(entities.len());
        let mut nodes = Vec::with_capacity(entities.len());

        for (entity_index, entity) in entities.iter().enumerate() {
            let id = entity.name.trim();
            if index_by_id.contains_key(id) {
                log::warn!("duplicate entity name {id:?}; keeping the first record");
                continue;
            }

            index_by_id.insert(id.to_owned(), nodes.len());
            let label_width = MonospaceEstimate.text_width(short_label(id), &node_font());
            nodes.push(GraphNode {
                id: id.to_owned(),
                position: center + random_in_disk(rng, SPAWN_RADIUS),
                velocity: Vec2::ZERO,
                radius: node_radius(label_width),
                is_dragged: false,
                display_title: entity.display_title(),
                entity: entity_index,
            });
        }

        let mut edges = Vec::new();
        for (source, node) in nodes.iter().enumerate() {
            for relationship in &entities[node.entity].relationships {
                let Some(target_name) = relationship.target_name() else {
                    log::debug!("{:?} lists a relationship without a name", node.id);
                    continue;
                };

                let Some(&target) = index_by_id.get(target_name) else {
                    log::debug!(
                        "dropping relationship {:?} -> {:?}: no such entity",
                        node.id,
                        target_name
                    );
                    continue;
                };

                if target == source {
                    continue;
                }

                edges.push(GraphEdge {
                    source,
                    target,
                    label: relationship.relationship.trim().to_owned(),
                    details: relationship.details.clone(),
                });
            }
        }

        if nodes.len() > LARGE_GRAPH_NODES {
            log::warn!(
                "{} nodes in the graph; pairwise repulsion may not keep up with the frame rate",
                nodes.len()
            );
        }

        Self {
            nodes,
            edges,
            entities,
            index_by_id,
            physics_scratch: PhysicsScratch::default(),
        }
    }

    /// Node for an entity name. Surrounding whitespace is ignored, matching
    /// how relationship targets are resolved.
    pub(in crate::app) fn node_index(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id.trim()).copied()
    }

    pub(in crate::app) fn entity(&self, node: &GraphNode) -> &Entity {
        &self.entities[node.entity]
    }

    pub(in crate::app) fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.nodes.iter().map(|node| node.position)
    }

    /// Re-derives every node radius from the width of its rendered label.
    pub(in crate::app) fn refresh_radii(&mut self, measure: &impl TextMeasure) {
        let font = node_font();
        for node in &mut self.nodes {
            node.radius = node_radius(measure.text_width(short_label(&node.id), &font));
        }
    }

    pub(in crate::app) fn set_dragged(&mut self, index: usize, dragged: bool) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.is_dragged = dragged;
            node.velocity = Vec2::ZERO;
        }
    }

    pub(in crate::app) fn drag_to(&mut self, index: usize, world: Vec2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.position = world;
            node.velocity = Vec2::ZERO;
        }
    }

    /// Clears every drag flag and stops all motion.
    pub(in crate::app) fn settle(&mut self) {
        for node in &mut self.nodes {
            node.is_dragged = false;
            node.velocity = Vec2::ZERO;
        }
    }

    pub(in crate::app) fn edge_count_for(&self, index: usize) -> usize {
        self.edges
            .iter()
            .filter(|edge| edge.source == index || edge.target == index)
            .count()
    }

    /// Edges other nodes declare toward `index`, as `(source id, edge)`.
    pub(in crate::app) fn incoming_edges(
        &self,
        index: usize,
    ) -> impl Iterator<Item = (&str, &GraphEdge)> + '_ {
        self.edges
            .iter()
            .filter(move |edge| edge.target == index)
            .map(move |edge| (self.nodes[edge.source].id.as_str(), edge))
    }
}
