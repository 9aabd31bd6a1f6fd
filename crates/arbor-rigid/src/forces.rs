//! Force elements and the applied-force accumulator they write into.

use arbor_math::{DVec, SpatialVec, Transform, Vec3};
use arbor_model::{BodyId, Error, MultibodyTree, PositionCache, Result, State};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_FORCE_SET_ID: AtomicU64 = AtomicU64::new(1);

fn next_force_set_id() -> u64 {
    NEXT_FORCE_SET_ID.fetch_add(1, Ordering::Relaxed)
}

/// Forces applied to the tree during one Dynamics realization.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedForces {
    /// Per body `[moment about body origin; force]`, ground frame. Index 0 is
    /// ground and is ignored by the solver.
    pub body: Vec<SpatialVec>,
    /// Generalized forces, by mobility index.
    pub mobility: DVec,
}

impl AppliedForces {
    pub fn zeros(tree: &MultibodyTree) -> Self {
        Self {
            body: vec![SpatialVec::zero(); tree.num_bodies()],
            mobility: DVec::zeros(tree.num_mobilities()),
        }
    }

    /// Apply `force` (ground frame) at the point `offset` from the body origin
    /// (ground frame).
    pub fn add_force_at(&mut self, body: BodyId, offset: Vec3, force: Vec3) -> Result<()> {
        let slot = self.body_slot(body)?;
        *slot += SpatialVec::new(offset.cross(&force), force);
        Ok(())
    }

    /// Apply a pure torque (ground frame).
    pub fn add_torque(&mut self, body: BodyId, torque: Vec3) -> Result<()> {
        let slot = self.body_slot(body)?;
        *slot += SpatialVec::new(torque, Vec3::zeros());
        Ok(())
    }

    /// Add a generalized force to mobility `index`.
    pub fn add_mobility_force(&mut self, index: usize, value: f64) -> Result<()> {
        let len = self.mobility.len();
        let slot = self.mobility.get_mut(index).ok_or(Error::IndexOutOfRange {
            what: "mobility",
            index,
            len,
        })?;
        *slot += value;
        Ok(())
    }

    /// Body forces re-expressed in each body's M frame, moments about M's origin.
    pub fn in_joint_frames(&self, position: &PositionCache) -> Vec<SpatialVec> {
        joint_frame_forces(&self.body, position)
    }

    fn body_slot(&mut self, body: BodyId) -> Result<&mut SpatialVec> {
        let len = self.body.len();
        self.body.get_mut(body.index()).ok_or(Error::IndexOutOfRange {
            what: "body",
            index: body.index(),
            len,
        })
    }
}

/// Ground-frame body forces (moments about body origins) moved to M frames.
pub(crate) fn joint_frame_forces(body: &[SpatialVec], position: &PositionCache) -> Vec<SpatialVec> {
    body.iter()
        .zip(position.x_gm.iter().zip(&position.x_gb))
        .map(|(f, (x_gm, x_gb))| to_joint_frame(f, x_gm, x_gb))
        .collect()
}

fn to_joint_frame(f: &SpatialVec, x_gm: &Transform, x_gb: &Transform) -> SpatialVec {
    let force = f.linear();
    let moment_about_ground = f.angular() + x_gb.pos.cross(&force);
    x_gm.force_to_child(&SpatialVec::new(moment_about_ground, force))
}

/// Something that applies forces to a tree as a function of its state.
///
/// Called with the state realized through Velocity.
pub trait ForceElement: fmt::Debug + Send + Sync {
    /// Accumulate this element's contribution into `forces`.
    fn calc_force(
        &self,
        tree: &MultibodyTree,
        state: &State,
        forces: &mut AppliedForces,
    ) -> Result<()>;

    /// Potential energy stored by this element. Requires Position.
    fn potential_energy(&self, _tree: &MultibodyTree, _state: &State) -> Result<f64> {
        Ok(0.0)
    }
}

/// Constant gravitational acceleration acting at every body's center of mass.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformGravity {
    gravity: Vec3,
    zero_height: f64,
}

impl UniformGravity {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            zero_height: 0.0,
        }
    }

    /// Height (along `-gravity`) at which potential energy is zero.
    pub fn with_zero_height(mut self, zero_height: f64) -> Self {
        self.zero_height = zero_height;
        self
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }
}

impl ForceElement for UniformGravity {
    fn calc_force(
        &self,
        tree: &MultibodyTree,
        state: &State,
        forces: &mut AppliedForces,
    ) -> Result<()> {
        let position = state.position_cache()?;
        for (id, node) in tree.mobilized_bodies() {
            let mass = node.body().mass();
            if mass == 0.0 {
                continue;
            }
            let i = id.index();
            let offset = position.com_g[i] - position.x_gb[i].pos;
            forces.add_force_at(id, offset, self.gravity * mass)?;
        }
        Ok(())
    }

    fn potential_energy(&self, tree: &MultibodyTree, state: &State) -> Result<f64> {
        let position = state.position_cache()?;
        let g = self.gravity.norm();
        Ok(tree
            .mobilized_bodies()
            .map(|(id, node)| {
                let mass = node.body().mass();
                -mass * self.gravity.dot(&position.com_g[id.index()]) - mass * g * self.zero_height
            })
            .sum())
    }
}

/// Constant generalized force on one mobility.
#[derive(Debug, Clone, PartialEq)]
pub struct MobilityConstantForce {
    body: BodyId,
    force: f64,
}

impl MobilityConstantForce {
    pub fn new(body: BodyId, force: f64) -> Self {
        Self { body, force }
    }
}

impl ForceElement for MobilityConstantForce {
    fn calc_force(
        &self,
        tree: &MultibodyTree,
        _state: &State,
        forces: &mut AppliedForces,
    ) -> Result<()> {
        forces.add_mobility_force(tree.mobility_index(self.body)?, self.force)
    }
}

/// Torsional spring on one mobility: `f = -stiffness (q - q0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MobilityLinearSpring {
    body: BodyId,
    stiffness: f64,
    q0: f64,
}

impl MobilityLinearSpring {
    pub fn new(body: BodyId, stiffness: f64, q0: f64) -> Self {
        Self {
            body,
            stiffness,
            q0,
        }
    }
}

impl ForceElement for MobilityLinearSpring {
    fn calc_force(
        &self,
        tree: &MultibodyTree,
        state: &State,
        forces: &mut AppliedForces,
    ) -> Result<()> {
        let q = tree.get_one_q(state, self.body, 0)?;
        forces.add_mobility_force(tree.mobility_index(self.body)?, -self.stiffness * (q - self.q0))
    }

    fn potential_energy(&self, tree: &MultibodyTree, state: &State) -> Result<f64> {
        let stretch = tree.get_one_q(state, self.body, 0)? - self.q0;
        Ok(0.5 * self.stiffness * stretch * stretch)
    }
}

/// Viscous damper on one mobility: `f = -damping u`.
#[derive(Debug, Clone, PartialEq)]
pub struct MobilityLinearDamper {
    body: BodyId,
    damping: f64,
}

impl MobilityLinearDamper {
    pub fn new(body: BodyId, damping: f64) -> Self {
        Self { body, damping }
    }
}

impl ForceElement for MobilityLinearDamper {
    fn calc_force(
        &self,
        tree: &MultibodyTree,
        state: &State,
        forces: &mut AppliedForces,
    ) -> Result<()> {
        let u = tree.get_one_u(state, self.body, 0)?;
        forces.add_mobility_force(tree.mobility_index(self.body)?, -self.damping * u)
    }
}

/// The force elements acting on one tree.
///
/// Every set carries an identity that changes whenever an element is added.
/// Clones share it, since they hold the same elements.
#[derive(Debug, Clone)]
pub struct ForceSet {
    id: u64,
    elements: Vec<Arc<dyn ForceElement>>,
}

impl Default for ForceSet {
    fn default() -> Self {
        Self {
            id: next_force_set_id(),
            elements: Vec::new(),
        }
    }
}

impl ForceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity stamped on Dynamics results computed with this set.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Add an element and return its index in the set.
    pub fn add(&mut self, element: impl ForceElement + 'static) -> usize {
        self.elements.push(Arc::new(element));
        self.id = next_force_set_id();
        self.elements.len() - 1
    }

    /// Builder-style [`ForceSet::add`].
    pub fn with(mut self, element: impl ForceElement + 'static) -> Self {
        self.add(element);
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn ForceElement> {
        self.elements.iter().map(|e| e.as_ref())
    }

    /// Sum every element's contribution.
    pub fn calc_forces(&self, tree: &MultibodyTree, state: &State) -> Result<AppliedForces> {
        let mut forces = AppliedForces::zeros(tree);
        for element in &self.elements {
            element.calc_force(tree, state, &mut forces)?;
        }
        Ok(forces)
    }

    /// Total potential energy over all elements. Requires Position.
    pub fn potential_energy(&self, tree: &MultibodyTree, state: &State) -> Result<f64> {
        self.elements
            .iter()
            .map(|e| e.potential_energy(tree, state))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realize;
    use approx::assert_relative_eq;
    use arbor_model::{Body, Stage};

    fn pendulum() -> (MultibodyTree, BodyId) {
        let mut tree = MultibodyTree::new();
        let body = Arc::new(Body::point_mass(2.0, Vec3::new(0.0, -1.0, 0.0)).unwrap());
        let id = tree
            .add_body(BodyId::GROUND, Transform::identity(), body, Transform::identity(), Vec3::z())
            .unwrap();
        tree.finalize().unwrap();
        (tree, id)
    }

    #[test]
    fn test_force_at_offset_produces_moment() {
        let (tree, id) = pendulum();
        let mut forces = AppliedForces::zeros(&tree);
        forces
            .add_force_at(id, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0))
            .unwrap();
        assert_relative_eq!(forces.body[1].angular(), Vec3::new(0.0, 0.0, 3.0));
        assert_relative_eq!(forces.body[1].linear(), Vec3::new(0.0, 3.0, 0.0));
        assert!(forces.add_torque(BodyId::GROUND, Vec3::x()).is_ok());
        assert!(forces.add_mobility_force(4, 1.0).is_err());
    }

    #[test]
    fn test_gravity_acts_at_com() {
        let (tree, id) = pendulum();
        let forces = ForceSet::new().with(UniformGravity::new(Vec3::new(0.0, -9.8, 0.0)));
        let mut state = tree.default_state().unwrap();
        tree.set_one_q(&mut state, id, 0, std::f64::consts::FRAC_PI_2).unwrap();
        realize(&tree, &forces, &mut state, Stage::Velocity).unwrap();

        let applied = forces.calc_forces(&tree, &state).unwrap();
        // COM swung to +x: weight produces a -z moment about the pin.
        assert_relative_eq!(applied.body[1].linear(), Vec3::new(0.0, -19.6, 0.0), epsilon = 1e-12);
        assert_relative_eq!(applied.body[1].angular(), Vec3::new(0.0, 0.0, -19.6), epsilon = 1e-12);
    }

    #[test]
    fn test_gravity_potential_zero_height() {
        let (tree, _) = pendulum();
        let gravity = UniformGravity::new(Vec3::new(0.0, -10.0, 0.0));
        let forces = ForceSet::new().with(gravity.clone().with_zero_height(-1.0));
        let mut state = tree.default_state().unwrap();
        realize(&tree, &forces, &mut state, Stage::Position).unwrap();

        // COM hangs at y = -1, which is the zero height.
        assert_relative_eq!(forces.potential_energy(&tree, &state).unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(gravity.potential_energy(&tree, &state).unwrap(), -20.0, epsilon = 1e-12);
    }

    #[test]
    fn test_spring_and_damper() {
        let (tree, id) = pendulum();
        let forces = ForceSet::new()
            .with(MobilityLinearSpring::new(id, 4.0, 0.5))
            .with(MobilityLinearDamper::new(id, 0.25))
            .with(MobilityConstantForce::new(id, 1.0));
        let mut state = tree.default_state().unwrap();
        tree.set_one_q(&mut state, id, 0, 1.0).unwrap();
        tree.set_one_u(&mut state, id, 0, 2.0).unwrap();
        realize(&tree, &forces, &mut state, Stage::Velocity).unwrap();

        let applied = forces.calc_forces(&tree, &state).unwrap();
        assert_relative_eq!(applied.mobility[0], -2.0 - 0.5 + 1.0);
        assert_relative_eq!(forces.potential_energy(&tree, &state).unwrap(), 0.5);
    }

    #[test]
    fn test_joint_frame_moment_is_about_m_origin() {
        let (tree, id) = pendulum();
        let forces = ForceSet::new();
        let mut state = tree.default_state().unwrap();
        realize(&tree, &forces, &mut state, Stage::Position).unwrap();

        let mut applied = AppliedForces::zeros(&tree);
        applied.add_force_at(id, Vec3::new(0.0, -1.0, 0.0), Vec3::x()).unwrap();
        let f_m = applied.in_joint_frames(state.position_cache().unwrap());
        assert_relative_eq!(f_m[1].angular(), Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
        assert_relative_eq!(f_m[1].linear(), Vec3::x(), epsilon = 1e-12);
    }
}
