//! Forward kinematics: Position and Velocity realization.
//!
//! Both passes walk the tree in index order, which puts every parent before
//! its children, so a parent's pose and velocity are always ready when the
//! child needs them.

use arbor_math::{SpatialVec, Transform, Vec3};
use arbor_model::{MultibodyTree, PositionCache, Result, State, VelocityCache};

/// Compute every body's pose from q and store it in `state`.
pub fn realize_position(tree: &MultibodyTree, state: &mut State) -> Result<()> {
    let nb = tree.num_bodies();
    let mut x_tree = vec![Transform::identity(); nb];
    let mut x_gm = vec![Transform::identity(); nb];
    let mut x_gb = vec![Transform::identity(); nb];
    let mut com_g = vec![Vec3::zeros(); nb];

    for (id, node) in tree.mobilized_bodies() {
        let i = id.index();
        let p = node.parent().index();

        // X_{Mp F} = X_{Mp Bp} X_{Bp F}; ground's M frame is ground itself.
        let x_mp_f = if node.parent().is_ground() {
            *node.parent_attachment()
        } else {
            tree.mobilized_body(node.parent())?
                .x_mb()
                .compose(node.parent_attachment())
        };
        let x_fm = node.joint().joint_transform(state.q()[node.mobility()]);

        x_tree[i] = x_mp_f.compose(&x_fm);
        x_gm[i] = x_gm[p].compose(&x_tree[i]);
        x_gb[i] = x_gm[i].compose(node.x_mb());
        com_g[i] = x_gb[i].transform_point(&node.body().com());
    }

    state.commit_position(PositionCache {
        x_gb,
        x_gm,
        x_tree,
        com_g,
    })
}

/// Compute every body's spatial velocity from u. Requires Position.
pub fn realize_velocity(tree: &MultibodyTree, state: &mut State) -> Result<()> {
    let position = state.position_cache()?;
    let nb = tree.num_bodies();
    let mut v_m = vec![SpatialVec::zero(); nb];
    let mut coriolis_m = vec![SpatialVec::zero(); nb];
    let mut v_gb = vec![SpatialVec::zero(); nb];

    for (id, node) in tree.mobilized_bodies() {
        let i = id.index();
        let p = node.parent().index();

        // Joint rate along the axis, then the parent's motion carried across.
        let v_joint = node.joint().motion_subspace() * state.u()[node.mobility()];
        v_m[i] = position.x_tree[i].motion_to_child(&v_m[p]) + v_joint;
        coriolis_m[i] = v_m[i].cross_motion(&v_joint);

        let rot = &position.x_gm[i].rot;
        let w = rot.apply(&v_m[i].angular());
        let r = position.x_gb[i].pos - position.x_gm[i].pos;
        v_gb[i] = SpatialVec::new(w, rot.apply(&v_m[i].linear()) + w.cross(&r));
    }

    state.commit_velocity(VelocityCache {
        v_m,
        coriolis_m,
        v_gb,
    })
}

/// Ground-frame `[α; a]` of each body origin from M-frame spatial
/// accelerations. Requires Velocity.
pub fn ground_accelerations(state: &State, a_m: &[SpatialVec]) -> Result<Vec<SpatialVec>> {
    let position = state.position_cache()?;
    let velocity = state.velocity_cache()?;

    Ok(a_m
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let rot = &position.x_gm[i].rot;
            let v = &velocity.v_m[i];
            // Spatial to classical: the M origin's acceleration picks up ω × v.
            let alpha = rot.apply(&a.angular());
            let a_origin_m = rot.apply(&(a.linear() + v.angular().cross(&v.linear())));
            let w = velocity.v_gb[i].angular();
            let r = position.x_gb[i].pos - position.x_gm[i].pos;
            SpatialVec::new(alpha, a_origin_m + alpha.cross(&r) + w.cross(&w.cross(&r)))
        })
        .collect())
}
