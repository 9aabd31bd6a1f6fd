//! Rigid body descriptor.

use crate::{Error, Result};
use arbor_math::{Mat3, SpatialInertia, Vec3};

/// Mass properties of one rigid body type, in its own body frame.
///
/// Immutable once built. Share one descriptor between many tree nodes by
/// wrapping it in an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    inertia: SpatialInertia,
}

impl Body {
    /// Create a body from mass, center of mass (body frame) and inertia about
    /// the center of mass (body frame).
    pub fn new(mass: f64, com: Vec3, inertia_about_com: Mat3) -> Result<Self> {
        Self::from_inertia(SpatialInertia::new(mass, com, inertia_about_com))
    }

    /// Create a body from a prepared [`SpatialInertia`].
    pub fn from_inertia(inertia: SpatialInertia) -> Result<Self> {
        if !inertia.mass.is_finite() || inertia.mass < 0.0 {
            return Err(Error::Structural(format!(
                "body mass must be finite and non-negative, got {}",
                inertia.mass
            )));
        }
        let i = &inertia.inertia;
        if (i - i.transpose()).amax() > 1e-9 * (1.0 + i.amax()) {
            return Err(Error::Structural(
                "inertia tensor must be symmetric".to_string(),
            ));
        }
        let smallest = i.symmetric_eigenvalues().min();
        if smallest < -1e-9 * (1.0 + i.amax()) {
            return Err(Error::Structural(format!(
                "inertia tensor has a negative principal moment {smallest}"
            )));
        }
        Ok(Self { inertia })
    }

    /// A point mass located at `com`.
    pub fn point_mass(mass: f64, com: Vec3) -> Result<Self> {
        Self::from_inertia(SpatialInertia::point_mass(mass, com))
    }

    pub fn mass(&self) -> f64 {
        self.inertia.mass
    }

    pub fn com(&self) -> Vec3 {
        self.inertia.com
    }

    pub fn inertia_about_com(&self) -> Mat3 {
        self.inertia.inertia
    }

    pub fn spatial_inertia(&self) -> &SpatialInertia {
        &self.inertia
    }
}
