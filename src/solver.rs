//! Partitioned solution of the assembled stiffness system.
//!
//! With free DOFs numbered first the global system splits into
//!
//! ```text
//! | F_f |   | K_ff  K_fr | | u_f |
//! | F_r | = | K_rf  K_rr | | 0   |
//! ```
//!
//! so `u_f = K_ff⁻¹·F_f` and the support reactions are `F_r = K_rf·u_f`.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dof::DofMap;
use crate::errors::AnalysisError;

/// Most decimal places results can be rounded to; beyond this `f64` has no
/// digits left to keep.
pub const MAX_DECIMALS: u32 = 15;

/// Tunables for the solve and for presenting its results.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverOptions {
    /// Decimal places kept when results are reported.
    pub decimals: u32,
    /// Smallest accepted ratio between the smallest and largest LU pivot.
    pub pivot_tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            decimals: 3,
            pivot_tolerance: 1.0e-12,
        }
    }
}

impl SolverOptions {
    /// Check that the options describe a usable solve.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] naming `solver.decimals` when more
    /// than [`MAX_DECIMALS`] places are requested, and `solver.pivot_tolerance`
    /// when the tolerance is not a finite ratio strictly between 0 and 1. A zero,
    /// negative or NaN tolerance would let singular systems through.
    ///
    /// # Examples
    /// ```
    /// use planar_truss::SolverOptions;
    ///
    /// assert!(SolverOptions::default().validate().is_ok());
    /// let lax = SolverOptions { pivot_tolerance: 0.0, ..SolverOptions::default() };
    /// assert!(lax.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.decimals > MAX_DECIMALS {
            return Err(AnalysisError::invalid_input(
                "solver.decimals",
                format!("at most {MAX_DECIMALS} decimal places are supported"),
            ));
        }
        let tolerance = self.pivot_tolerance;
        if !(tolerance.is_finite() && tolerance > 0.0 && tolerance < 1.0) {
            return Err(AnalysisError::invalid_input(
                "solver.pivot_tolerance",
                format!("must be a finite ratio between 0 and 1 (received {tolerance})"),
            ));
        }
        Ok(())
    }
}

/// Displacements and reactions of a solved system, at full precision.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionedSolution {
    /// Displacement at every DOF, indexed by `dof - 1`; restrained DOFs are zero.
    pub displacements: DVector<f64>,
    /// Reaction at every restrained DOF, indexed by `dof - free_count - 1`.
    pub reactions: DVector<f64>,
}

/// Solve `K_ff·u_f = F` and recover the reactions `K_rf·u_f`.
///
/// `loads` holds one entry per free DOF, in DOF order.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidInput`] when `options` fail
/// [`SolverOptions::validate`], and [`AnalysisError::UnstableStructure`] when
/// `K_ff` is singular or so badly conditioned that its smallest pivot falls below
/// `options.pivot_tolerance` relative to the largest.
///
/// # Panics
///
/// Panics when `stiffness` is not `dofs.total()` square or `loads` does not have
/// `dofs.free_count()` entries.
pub fn solve_partitioned(
    stiffness: &DMatrix<f64>,
    loads: &DVector<f64>,
    dofs: &DofMap,
    options: &SolverOptions,
) -> Result<PartitionedSolution, AnalysisError> {
    let total = dofs.total();
    let free = dofs.free_count();
    let restrained = dofs.restrained_count();
    assert_eq!(stiffness.shape(), (total, total), "stiffness matrix size");
    assert_eq!(loads.len(), free, "load vector size");
    options.validate()?;

    let mut displacements = DVector::zeros(total);
    if free == 0 {
        return Ok(PartitionedSolution {
            displacements,
            reactions: DVector::zeros(restrained),
        });
    }

    let k_ff = stiffness.view((0, 0), (free, free)).into_owned();
    let k_rf = stiffness.view((free, 0), (restrained, free)).into_owned();
    debug!(free, restrained, "partitioned stiffness matrix");

    let lu = k_ff.lu();
    let pivots = lu.u().diagonal();
    let largest = pivots.amax();
    let smallest = pivots.amin();
    if !(largest > 0.0) || smallest <= options.pivot_tolerance * largest {
        warn!(free, smallest, largest, "free-DOF stiffness matrix is singular");
        return Err(AnalysisError::UnstableStructure { free_dofs: free });
    }
    let solution = lu
        .solve(loads)
        .filter(|solution| solution.iter().all(|value| value.is_finite()))
        .ok_or(AnalysisError::UnstableStructure { free_dofs: free })?;

    let reactions = k_rf * &solution;
    displacements.rows_mut(0, free).copy_from(&solution);
    Ok(PartitionedSolution {
        displacements,
        reactions,
    })
}

/// Round `value` to `decimals` places, folding negative zero into zero.
///
/// Requests beyond [`MAX_DECIMALS`] are rounded to [`MAX_DECIMALS`] places.
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let places = i32::try_from(decimals.min(MAX_DECIMALS)).unwrap_or(0);
    let scale = 10_f64.powi(places);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
