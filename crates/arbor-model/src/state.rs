//! Simulation state: generalized coordinates plus stage-tagged caches.
//!
//! Writes to q invalidate Position and everything above it; writes to u
//! invalidate Velocity and above. Cached reads never recompute: a read of a
//! stage that is not realized returns [`Error::StageViolation`].

use crate::{BodyId, CacheEntry, Error, Result, Stage};
use arbor_math::{DVec, Mat3, Quat, SpatialVec, Transform, Vec3};

/// Position-stage results, indexed by [`BodyId`] (ground at 0).
#[derive(Debug, Clone)]
pub struct PositionCache {
    /// `X_GB` for each body.
    pub x_gb: Vec<Transform>,
    /// `X_GM`: ground to each body's outboard joint frame.
    pub x_gm: Vec<Transform>,
    /// `X_{M_parent M}`: parent's outboard frame to this body's outboard frame.
    pub x_tree: Vec<Transform>,
    /// Center of mass location in ground.
    pub com_g: Vec<Vec3>,
}

/// Velocity-stage results, indexed by [`BodyId`].
#[derive(Debug, Clone)]
pub struct VelocityCache {
    /// Spatial velocity in M coordinates, about M's origin.
    pub v_m: Vec<SpatialVec>,
    /// Velocity-product acceleration `v ×ₘ (S u)`, M coordinates.
    pub coriolis_m: Vec<SpatialVec>,
    /// `[ω; v]` of each body origin, ground frame.
    pub v_gb: Vec<SpatialVec>,
}

/// Dynamics-stage results.
#[derive(Debug, Clone)]
pub struct DynamicsCache {
    /// Generalized accelerations, by mobility index.
    pub udot: DVec,
    /// Spatial acceleration in M coordinates, about M's origin.
    pub a_m: Vec<SpatialVec>,
    /// `[α; a]` of each body origin, ground frame.
    pub a_gb: Vec<SpatialVec>,
    /// Applied body forces `[moment about body origin; force]`, ground frame.
    pub body_forces: Vec<SpatialVec>,
    /// Applied generalized forces, by mobility index.
    pub mobility_forces: DVec,
    /// Identity of the force set these results were computed with.
    pub force_set: u64,
}

/// Mutable simulation state for one finalized tree.
#[derive(Debug, Clone)]
pub struct State {
    tree_id: u64,
    num_bodies: usize,
    q: DVec,
    u: DVec,
    time: f64,
    realized: Stage,
    position: CacheEntry<PositionCache>,
    velocity: CacheEntry<VelocityCache>,
    dynamics: CacheEntry<DynamicsCache>,
}

impl State {
    /// Zero q and u for a tree with `num_bodies` entries (ground included).
    pub(crate) fn new(tree_id: u64, num_bodies: usize, num_mobilities: usize) -> Self {
        Self {
            tree_id,
            num_bodies,
            q: DVec::zeros(num_mobilities),
            u: DVec::zeros(num_mobilities),
            time: 0.0,
            realized: Stage::Topology,
            position: CacheEntry::new(Stage::Position),
            velocity: CacheEntry::new(Stage::Velocity),
            dynamics: CacheEntry::new(Stage::Dynamics),
        }
    }

    /// Identity of the tree this state was created from.
    pub fn tree_id(&self) -> u64 {
        self.tree_id
    }

    /// Number of bodies, ground included.
    pub fn num_bodies(&self) -> usize {
        self.num_bodies
    }

    pub fn num_mobilities(&self) -> usize {
        self.q.len()
    }

    /// Highest stage whose caches are all valid.
    pub fn stage(&self) -> Stage {
        self.realized
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Set the simulation time. No cached quantity depends on time.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Generalized coordinates.
    pub fn q(&self) -> &DVec {
        &self.q
    }

    /// Generalized speeds.
    pub fn u(&self) -> &DVec {
        &self.u
    }

    pub fn set_q(&mut self, index: usize, value: f64) -> Result<()> {
        let len = self.q.len();
        let slot = self.q.get_mut(index).ok_or(Error::IndexOutOfRange {
            what: "mobility",
            index,
            len,
        })?;
        *slot = value;
        self.invalidate_from(Stage::Position);
        Ok(())
    }

    pub fn set_u(&mut self, index: usize, value: f64) -> Result<()> {
        let len = self.u.len();
        let slot = self.u.get_mut(index).ok_or(Error::IndexOutOfRange {
            what: "mobility",
            index,
            len,
        })?;
        *slot = value;
        self.invalidate_from(Stage::Velocity);
        Ok(())
    }

    /// Replace all generalized coordinates.
    pub fn set_q_vector(&mut self, q: &DVec) -> Result<()> {
        check_len("q", q.len(), self.q.len())?;
        self.q.copy_from(q);
        self.invalidate_from(Stage::Position);
        Ok(())
    }

    /// Replace all generalized speeds.
    pub fn set_u_vector(&mut self, u: &DVec) -> Result<()> {
        check_len("u", u.len(), self.u.len())?;
        self.u.copy_from(u);
        self.invalidate_from(Stage::Velocity);
        Ok(())
    }

    /// Drop every cache at `stage` or above.
    pub fn invalidate_from(&mut self, stage: Stage) {
        if stage == Stage::Topology {
            // Topology is fixed for the life of the state.
            return self.invalidate_from(Stage::Position);
        }
        self.position.invalidate_from(stage);
        self.velocity.invalidate_from(stage);
        self.dynamics.invalidate_from(stage);
        if let Some(below) = stage.prev() {
            self.realized = self.realized.min(below);
        }
    }

    pub fn position_cache(&self) -> Result<&PositionCache> {
        self.position.get(self.realized)
    }

    pub fn velocity_cache(&self) -> Result<&VelocityCache> {
        self.velocity.get(self.realized)
    }

    pub fn dynamics_cache(&self) -> Result<&DynamicsCache> {
        self.dynamics.get(self.realized)
    }

    /// Store Position results. The state must be realized exactly to Topology.
    pub fn commit_position(&mut self, cache: PositionCache) -> Result<()> {
        self.require_realized(Stage::Topology)?;
        self.position.set(cache);
        self.realized = Stage::Position;
        Ok(())
    }

    /// Store Velocity results. The state must be realized exactly to Position.
    pub fn commit_velocity(&mut self, cache: VelocityCache) -> Result<()> {
        self.require_realized(Stage::Position)?;
        self.velocity.set(cache);
        self.realized = Stage::Velocity;
        Ok(())
    }

    /// Store Dynamics results. The state must be realized exactly to Velocity.
    pub fn commit_dynamics(&mut self, cache: DynamicsCache) -> Result<()> {
        self.require_realized(Stage::Velocity)?;
        self.dynamics.set(cache);
        self.realized = Stage::Dynamics;
        Ok(())
    }

    fn require_realized(&self, stage: Stage) -> Result<()> {
        if self.realized == stage {
            Ok(())
        } else {
            Err(Error::StageViolation {
                required: stage,
                realized: self.realized,
            })
        }
    }

    fn check_body(&self, body: BodyId) -> Result<usize> {
        let index = body.index();
        if index < self.num_bodies {
            Ok(index)
        } else {
            Err(Error::IndexOutOfRange {
                what: "body",
                index,
                len: self.num_bodies,
            })
        }
    }

    // Position-stage queries.

    /// `X_GB`: pose of the body frame in ground.
    pub fn body_transform(&self, body: BodyId) -> Result<&Transform> {
        let i = self.check_body(body)?;
        Ok(&self.position_cache()?.x_gb[i])
    }

    /// `R_GB` as a matrix.
    pub fn body_rotation(&self, body: BodyId) -> Result<Mat3> {
        Ok(*self.body_transform(body)?.rotation_matrix())
    }

    /// `R_GB` as a unit quaternion with non-negative scalar part.
    pub fn body_quaternion(&self, body: BodyId) -> Result<Quat> {
        Ok(self.body_transform(body)?.rot.to_quat())
    }

    pub fn body_origin_location(&self, body: BodyId) -> Result<Vec3> {
        Ok(self.body_transform(body)?.pos)
    }

    pub fn body_com_location(&self, body: BodyId) -> Result<Vec3> {
        let i = self.check_body(body)?;
        Ok(self.position_cache()?.com_g[i])
    }

    // Velocity-stage queries.

    /// `[ω; v]` of the body origin in ground.
    pub fn body_spatial_velocity(&self, body: BodyId) -> Result<SpatialVec> {
        let i = self.check_body(body)?;
        Ok(self.velocity_cache()?.v_gb[i])
    }

    pub fn body_angular_velocity(&self, body: BodyId) -> Result<Vec3> {
        Ok(self.body_spatial_velocity(body)?.angular())
    }

    pub fn body_origin_velocity(&self, body: BodyId) -> Result<Vec3> {
        Ok(self.body_spatial_velocity(body)?.linear())
    }

    pub fn body_com_velocity(&self, body: BodyId) -> Result<Vec3> {
        let v = self.body_spatial_velocity(body)?;
        let r = self.body_com_location(body)? - self.body_origin_location(body)?;
        Ok(v.linear() + v.angular().cross(&r))
    }

    // Dynamics-stage queries.

    /// Generalized accelerations.
    pub fn udot(&self) -> Result<&DVec> {
        Ok(&self.dynamics_cache()?.udot)
    }

    /// `[α; a]` of the body origin in ground.
    pub fn body_spatial_acceleration(&self, body: BodyId) -> Result<SpatialVec> {
        let i = self.check_body(body)?;
        Ok(self.dynamics_cache()?.a_gb[i])
    }

    pub fn body_angular_acceleration(&self, body: BodyId) -> Result<Vec3> {
        Ok(self.body_spatial_acceleration(body)?.angular())
    }

    pub fn body_origin_acceleration(&self, body: BodyId) -> Result<Vec3> {
        Ok(self.body_spatial_acceleration(body)?.linear())
    }

    /// Applied generalized forces gathered for the last Dynamics realization.
    pub fn mobility_forces(&self) -> Result<&DVec> {
        Ok(&self.dynamics_cache()?.mobility_forces)
    }

    /// Applied body forces gathered for the last Dynamics realization.
    pub fn body_forces(&self) -> Result<&[SpatialVec]> {
        Ok(&self.dynamics_cache()?.body_forces)
    }
}

fn check_len(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got == expected {
        Ok(())
    } else {
        Err(Error::IndexOutOfRange {
            what,
            index: got,
            len: expected,
        })
    }
}
