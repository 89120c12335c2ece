mod forces;

use eframe::egui::Vec2;

use super::{GraphModel, PhysicsConfig};
use forces::{centering_force, repulsion_between, spring_force};

const REST_SPEED: f32 = 0.01;

/// Advances every non-dragged node by one forward-Euler step and returns
/// whether anything is still moving.
///
/// Dragged nodes keep the position the pointer gave them and have their
/// velocity held at zero; they still push and pull on their neighbours.
pub(in crate::app) fn simulate(model: &mut GraphModel, config: &PhysicsConfig, center: Vec2) -> bool {
    let GraphModel {
        nodes,
        edges,
        physics_scratch,
        ..
    } = model;
    let node_count = nodes.len();
    if node_count == 0 {
        return false;
    }

    let forces = &mut physics_scratch.forces;
    forces.clear();
    forces.resize(node_count, Vec2::ZERO);

    for (index, force) in forces.iter_mut().enumerate() {
        let node = &nodes[index];
        if node.is_dragged {
            continue;
        }

        *force += centering_force(node.position, center, config.center_strength);
        for (other_index, other) in nodes.iter().enumerate() {
            if other_index == index {
                continue;
            }
            *force += repulsion_between(
                node.position,
                other.position,
                config.repulsion,
                index,
                other_index,
            );
        }
    }

    for edge in edges.iter() {
        if edge.source == edge.target || edge.source >= node_count || edge.target >= node_count {
            continue;
        }

        let pull = spring_force(
            nodes[edge.source].position,
            nodes[edge.target].position,
            config.rest_length,
            config.spring_strength,
        );
        if !nodes[edge.source].is_dragged {
            forces[edge.source] += pull;
        }
        if !nodes[edge.target].is_dragged {
            forces[edge.target] -= pull;
        }
    }

    let damping = config.damping.clamp(0.0, 0.999);
    let max_speed = config.max_velocity.max(0.0);
    let mut any_motion = false;
    for (node, force) in nodes.iter_mut().zip(forces.iter()) {
        if node.is_dragged {
            node.velocity = Vec2::ZERO;
            continue;
        }

        let mut velocity = (node.velocity + *force * config.time_step) * damping;
        let speed = velocity.length();
        if speed > max_speed {
            velocity *= max_speed / speed;
        }

        node.velocity = velocity;
        node.position += velocity * config.time_step;
        any_motion |= velocity.length() > REST_SPEED;
    }

    any_motion
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::cast::Entity;

    fn model_at(entities: Vec<Entity>, positions: &[Vec2]) -> GraphModel {
        let mut model =
            GraphModel::build(entities.into(), Vec2::ZERO, &mut StdRng::seed_from_u64(3));
        for (node, position) in model.nodes.iter_mut().zip(positions) {
            node.position = *position;
        }
        model
    }

    fn springs_only() -> PhysicsConfig {
        PhysicsConfig {
            repulsion: 0.0,
            center_strength: 0.0,
            damping: 0.5,
            ..PhysicsConfig::default()
        }
    }

    #[test]
    fn spring_converges_monotonically_to_rest_length() {
        let config = springs_only();
        let mut model = model_at(
            vec![Entity::named("A").related_to("B", "ally"), Entity::named("B")],
            &[vec2(-150.0, 0.0), vec2(150.0, 0.0)],
        );

        let mut error = 300.0 - config.rest_length;
        for _ in 0..400 {
            simulate(&mut model, &config, Vec2::ZERO);
            let distance = (model.nodes[1].position - model.nodes[0].position).length();
            let next_error = (distance - config.rest_length).abs();
            assert!(next_error <= error + 1e-3, "error grew from {error} to {next_error}");
            error = next_error;
        }
        assert!(error < 1.0, "still {error} away from rest length");
    }

    #[test]
    fn compressed_spring_expands_toward_rest_length() {
        let config = springs_only();
        let mut model = model_at(
            vec![Entity::named("A").related_to("B", "ally"), Entity::named("B")],
            &[vec2(-20.0, 0.0), vec2(20.0, 0.0)],
        );

        for _ in 0..400 {
            simulate(&mut model, &config, Vec2::ZERO);
        }
        let distance = (model.nodes[1].position - model.nodes[0].position).length();
        assert!((distance - config.rest_length).abs() < 1.0);
    }

    #[test]
    fn dragged_node_is_never_moved() {
        let mut model = model_at(
            vec![Entity::named("A").related_to("B", "ally"), Entity::named("B")],
            &[vec2(400.0, 0.0), vec2(401.0, 0.0)],
        );
        model.set_dragged(0, true);
        model.nodes[0].velocity = vec2(9.0, 9.0);

        for _ in 0..20 {
            simulate(&mut model, &PhysicsConfig::default(), Vec2::ZERO);
            assert_eq!(model.nodes[0].position, vec2(400.0, 0.0));
            assert_eq!(model.nodes[0].velocity, Vec2::ZERO);
        }
        assert_ne!(model.nodes[1].position, vec2(401.0, 0.0));
    }

    #[test]
    fn coincident_nodes_separate_without_nan() {
        let mut model = model_at(
            vec![Entity::named("A"), Entity::named("B")],
            &[Vec2::ZERO, Vec2::ZERO],
        );
        simulate(&mut model, &PhysicsConfig::default(), Vec2::ZERO);

        let a = model.nodes[0].position;
        let b = model.nodes[1].position;
        assert!(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite());
        assert!((a - b).length() > 0.0);
    }

    #[test]
    fn speed_is_clamped() {
        let config = PhysicsConfig {
            repulsion: 1.0e9,
            ..PhysicsConfig::default()
        };
        let mut model = model_at(
            vec![Entity::named("A"), Entity::named("B")],
            &[vec2(-1.0, 0.0), vec2(1.0, 0.0)],
        );
        simulate(&mut model, &config, Vec2::ZERO);

        for node in &model.nodes {
            assert!(node.velocity.length() <= config.max_velocity + 1e-3);
        }
    }

    #[test]
    fn lone_node_drifts_toward_center_and_comes_to_rest() {
        let mut model = model_at(vec![Entity::named("A")], &[vec2(500.0, -300.0)]);
        let center = vec2(100.0, 100.0);
        let start = (model.nodes[0].position - center).length();

        let mut moving = true;
        for _ in 0..2000 {
            moving = simulate(&mut model, &PhysicsConfig::default(), center);
        }

        assert!((model.nodes[0].position - center).length() < start * 0.01);
        assert!(!moving);
    }

    #[test]
    fn empty_model_is_a_no_op() {
        let mut model = model_at(Vec::new(), &[]);
        assert!(!simulate(&mut model, &PhysicsConfig::default(), Vec2::ZERO));
    }
}
