//! Rigid-body world backed by `rapier3d`, advanced with a fixed timestep.

use glam::Vec3;
use rapier3d::prelude::*;
use std::fmt;

use crate::config::FIXED_TIMESTEP;

/// Half thickness of the slab standing in for the infinite ground plane.
const GROUND_HALF_THICKNESS: f32 = 0.5;
/// Half extent of the ground slab along X and Z.
const GROUND_HALF_EXTENT: f32 = 5000.0;

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyKind {
    /// Never moves, infinite mass.
    Fixed,
    /// Moved only by writing its position; pushes dynamic bodies but is never pushed.
    Kinematic,
    /// Integrated under gravity and contacts.
    Dynamic { mass: f32 },
}

/// Collision primitive for a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Cuboid { half_extents: Vec3 },
    /// Horizontal ground whose top face sits at the body's y.
    Ground,
}

/// Opaque handle to a body owned by [`PhysicsSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyHandle(RigidBodyHandle);

/// Owns every rapier set and pipeline needed to step the world.
pub struct PhysicsSystem {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    gravity: Vector,
    steps: u64,
    last_step_dt: Option<f32>,
}

impl fmt::Debug for PhysicsSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsSystem")
            .field("steps", &self.steps)
            .field("bodies", &self.rigid_body_set.len())
            .field("colliders", &self.collider_set.len())
            .finish_non_exhaustive()
    }
}

impl PhysicsSystem {
    pub fn new(gravity_y: f32) -> Self {
        let integration_parameters = IntegrationParameters {
            dt: FIXED_TIMESTEP,
            ..Default::default()
        };

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity: Vector::new(0.0, gravity_y, 0.0),
            steps: 0,
            last_step_dt: None,
        }
    }

    /// Insert a body with a single collider.
    pub fn create_body(&mut self, shape: BodyShape, kind: BodyKind, position: Vec3) -> BodyHandle {
        let builder = match kind {
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
            BodyKind::Kinematic => RigidBodyBuilder::kinematic_position_based(),
            BodyKind::Dynamic { .. } => RigidBodyBuilder::dynamic(),
        };
        let (body_position, collider) = match shape {
            BodyShape::Cuboid { half_extents } => (
                position,
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z),
            ),
            BodyShape::Ground => (
                position - Vec3::Y * GROUND_HALF_THICKNESS,
                ColliderBuilder::cuboid(GROUND_HALF_EXTENT, GROUND_HALF_THICKNESS, GROUND_HALF_EXTENT),
            ),
        };
        let collider = match kind {
            BodyKind::Dynamic { mass } => collider.mass(mass),
            _ => collider,
        };

        let body = builder.translation(to_vector(body_position)).build();
        let handle = self.rigid_body_set.insert(body);
        self.collider_set
            .insert_with_parent(collider.build(), handle, &mut self.rigid_body_set);
        BodyHandle(handle)
    }

    /// Advance the simulation by exactly one fixed timestep.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &(),
        );
        self.steps += 1;
        self.last_step_dt = Some(self.integration_parameters.dt);
    }

    /// Current body translation, `None` for an unknown handle.
    pub fn position(&self, handle: BodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle.0).map(|body| {
            let t = body.translation();
            Vec3::new(t.x, t.y, t.z)
        })
    }

    /// Overwrite a body translation. Unknown handles are ignored.
    pub fn set_position(&mut self, handle: BodyHandle, position: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle.0) {
            if body.is_kinematic() {
                body.set_next_kinematic_translation(to_vector(position));
            }
            body.set_translation(to_vector(position), true);
        }
    }

    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Timestep handed to the last `step`, `None` before the first one.
    pub fn last_step_dt(&self) -> Option<f32> {
        self.last_step_dt
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }
}

fn to_vector(v: Vec3) -> Vector {
    Vector::new(v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_ground() -> PhysicsSystem {
        let mut world = PhysicsSystem::new(-5.0);
        world.create_body(BodyShape::Ground, BodyKind::Fixed, Vec3::ZERO);
        world
    }

    #[test]
    fn step_always_uses_fixed_timestep() {
        let mut world = world_with_ground();
        assert_eq!(world.last_step_dt(), None);
        for _ in 0..10 {
            world.step();
            assert_eq!(world.last_step_dt(), Some(FIXED_TIMESTEP));
        }
        assert_eq!(world.step_count(), 10);
    }

    #[test]
    fn dynamic_body_falls_and_lands_on_ground() {
        let mut world = world_with_ground();
        let cube = world.create_body(
            BodyShape::Cuboid { half_extents: Vec3::ONE },
            BodyKind::Dynamic { mass: 1.0 },
            Vec3::new(0.0, 5.0, 0.0),
        );

        world.step();
        let after_one = world.position(cube).unwrap();
        assert!(after_one.y < 5.0);

        for _ in 0..600 {
            world.step();
        }
        let rest = world.position(cube).unwrap();
        assert!((rest.y - 1.0).abs() < 0.1, "cube should rest on the ground, y = {}", rest.y);
    }

    #[test]
    fn fixed_and_kinematic_bodies_ignore_gravity() {
        let mut world = world_with_ground();
        let start = Vec3::new(0.0, 5.0, -5.0);
        let obstacle = world.create_body(
            BodyShape::Cuboid { half_extents: Vec3::ONE },
            BodyKind::Kinematic,
            start,
        );
        for _ in 0..120 {
            world.step();
        }
        let pos = world.position(obstacle).unwrap();
        assert!(pos.distance(start) < 1e-5, "kinematic body drifted to {pos}");
    }

    #[test]
    fn set_position_overwrites_translation() {
        let mut world = world_with_ground();
        let body = world.create_body(
            BodyShape::Cuboid { half_extents: Vec3::ONE },
            BodyKind::Dynamic { mass: 1.0 },
            Vec3::new(0.0, 5.0, 0.0),
        );
        let target = Vec3::new(3.0, 4.0, -2.0);
        world.set_position(body, target);
        assert_eq!(world.position(body), Some(target));
    }

    #[test]
    fn ground_top_face_is_at_body_position() {
        let mut world = PhysicsSystem::new(-5.0);
        let ground = world.create_body(BodyShape::Ground, BodyKind::Fixed, Vec3::ZERO);
        let y = world.position(ground).unwrap().y;
        assert!((y + GROUND_HALF_THICKNESS).abs() < 1e-6);
        assert_eq!(world.body_count(), 1);
    }
}
