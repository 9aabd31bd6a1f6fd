//! Topology tree of pin-jointed bodies.

use crate::{Body, Error, PinJoint, Result, State};
use arbor_math::{SpatialMat, Transform, Vec3};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable handle to a node of a [`MultibodyTree`]. Index 0 is ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(usize);

impl BodyId {
    pub const GROUND: BodyId = BodyId(0);

    pub fn index(self) -> usize {
        self.0
    }

    pub fn is_ground(self) -> bool {
        self.0 == 0
    }
}

/// One node of the tree: a body attached to its parent through a pin.
///
/// Frames: P is the parent body frame, F the inboard joint frame fixed on P,
/// M the outboard joint frame fixed on this body B.
#[derive(Debug, Clone)]
pub struct MobilizedBody {
    parent: BodyId,
    x_pf: Transform,
    x_bm: Transform,
    x_mb: Transform,
    body: Arc<Body>,
    joint: PinJoint,
    inertia_m: SpatialMat,
    mobility: usize,
}

impl MobilizedBody {
    pub fn parent(&self) -> BodyId {
        self.parent
    }

    /// `X_PF`: joint attachment on the parent.
    pub fn parent_attachment(&self) -> &Transform {
        &self.x_pf
    }

    /// `X_BM`: joint attachment on this body.
    pub fn child_attachment(&self) -> &Transform {
        &self.x_bm
    }

    /// `X_MB`, the inverse of the child attachment.
    pub fn x_mb(&self) -> &Transform {
        &self.x_mb
    }

    pub fn body(&self) -> &Arc<Body> {
        &self.body
    }

    pub fn joint(&self) -> &PinJoint {
        &self.joint
    }

    /// Rigid-body spatial inertia in M coordinates, about M's origin.
    pub fn inertia_m(&self) -> &SpatialMat {
        &self.inertia_m
    }

    /// Index of this node's coordinate in q and u. Assigned at finalization.
    pub fn mobility(&self) -> usize {
        self.mobility
    }
}

/// Rooted tree of mobilized bodies.
///
/// Built with [`MultibodyTree::add_body`], then locked by
/// [`MultibodyTree::finalize`]. Only a finalized tree can create states.
#[derive(Debug)]
pub struct MultibodyTree {
    // nodes[0] is None: ground has no mobilizer.
    nodes: Vec<Option<MobilizedBody>>,
    num_mobilities: usize,
    id: Option<u64>,
}

impl Default for MultibodyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MultibodyTree {
    /// A tree containing only ground.
    pub fn new() -> Self {
        Self {
            nodes: vec![None],
            num_mobilities: 0,
            id: None,
        }
    }

    /// Attach `body` to `parent` with a pin about `axis`.
    ///
    /// `parent_attachment` is `X_PF`, `child_attachment` is `X_BM`. The axis is
    /// expressed in F (and therefore also in M).
    pub fn add_body(
        &mut self,
        parent: BodyId,
        parent_attachment: Transform,
        body: Arc<Body>,
        child_attachment: Transform,
        axis: Vec3,
    ) -> Result<BodyId> {
        if self.is_finalized() {
            return Err(Error::Structural(
                "cannot add a body to a finalized tree".to_string(),
            ));
        }
        self.check_body(parent)?;
        let joint = PinJoint::new(axis)?;

        let x_mb = child_attachment.inverse();
        let inertia_m = body.spatial_inertia().reexpress(&x_mb).to_matrix();
        let id = BodyId(self.nodes.len());
        self.nodes.push(Some(MobilizedBody {
            parent,
            x_pf: parent_attachment,
            x_bm: child_attachment,
            x_mb,
            body,
            joint,
            inertia_m,
            mobility: 0,
        }));
        Ok(id)
    }

    /// Lock the tree and assign mobility offsets.
    pub fn finalize(&mut self) -> Result<()> {
        if self.is_finalized() {
            return Err(Error::Structural("tree is already finalized".to_string()));
        }
        let mut offset = 0;
        for (index, node) in self.nodes.iter_mut().enumerate() {
            let Some(node) = node else { continue };
            if node.parent.index() >= index {
                return Err(Error::Structural(format!(
                    "body {index} has parent {} which does not precede it",
                    node.parent.index()
                )));
            }
            node.mobility = offset;
            offset += node.joint.ndof();
        }
        self.num_mobilities = offset;
        self.id = Some(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed));

        tracing::debug!(
            bodies = self.num_bodies(),
            mobilities = self.num_mobilities,
            "multibody tree finalized"
        );
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.id.is_some()
    }

    /// Identity shared by every state created from this tree, once finalized.
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    /// Number of bodies, ground included.
    pub fn num_bodies(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_mobilities(&self) -> usize {
        self.num_mobilities
    }

    /// Ids of all mobilized bodies in parent-before-child order.
    pub fn body_ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        (1..self.nodes.len()).map(BodyId)
    }

    /// Mobilized bodies with their ids, parent-before-child.
    pub fn mobilized_bodies(&self) -> impl DoubleEndedIterator<Item = (BodyId, &MobilizedBody)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.as_ref().map(|n| (BodyId(i), n)))
    }

    /// The node for `body`. Ground has no node and yields an index error.
    pub fn mobilized_body(&self, body: BodyId) -> Result<&MobilizedBody> {
        self.nodes
            .get(body.index())
            .and_then(Option::as_ref)
            .ok_or(Error::IndexOutOfRange {
                what: "mobilized body",
                index: body.index(),
                len: self.nodes.len(),
            })
    }

    /// Index of `body`'s coordinate in q and u.
    pub fn mobility_index(&self, body: BodyId) -> Result<usize> {
        self.require_finalized()?;
        Ok(self.mobilized_body(body)?.mobility)
    }

    /// A fresh state: every coordinate and speed zero, time zero.
    pub fn default_state(&self) -> Result<State> {
        let id = self.require_finalized()?;
        Ok(State::new(id, self.num_bodies(), self.num_mobilities))
    }

    /// Fail unless `state` was created from this tree.
    pub fn check_state(&self, state: &State) -> Result<()> {
        let id = self.require_finalized()?;
        if state.tree_id() != id {
            return Err(Error::Structural(
                "state was created from a different tree".to_string(),
            ));
        }
        Ok(())
    }

    pub fn set_one_q(&self, state: &mut State, body: BodyId, which: usize, value: f64) -> Result<()> {
        let index = self.local_index(state, body, which)?;
        state.set_q(index, value)
    }

    pub fn set_one_u(&self, state: &mut State, body: BodyId, which: usize, value: f64) -> Result<()> {
        let index = self.local_index(state, body, which)?;
        state.set_u(index, value)
    }

    pub fn get_one_q(&self, state: &State, body: BodyId, which: usize) -> Result<f64> {
        let index = self.local_index(state, body, which)?;
        Ok(state.q()[index])
    }

    pub fn get_one_u(&self, state: &State, body: BodyId, which: usize) -> Result<f64> {
        let index = self.local_index(state, body, which)?;
        Ok(state.u()[index])
    }

    fn local_index(&self, state: &State, body: BodyId, which: usize) -> Result<usize> {
        self.check_state(state)?;
        let node = self.mobilized_body(body)?;
        let ndof = node.joint.ndof();
        if which >= ndof {
            return Err(Error::IndexOutOfRange {
                what: "joint coordinate",
                index: which,
                len: ndof,
            });
        }
        Ok(node.mobility + which)
    }

    fn require_finalized(&self) -> Result<u64> {
        self.id
            .ok_or_else(|| Error::Structural("tree has not been finalized".to_string()))
    }

    fn check_body(&self, body: BodyId) -> Result<()> {
        if body.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                what: "body",
                index: body.index(),
                len: self.nodes.len(),
            })
        }
    }
}
