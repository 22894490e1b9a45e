//! Request-level entry point: layout + request in, rounded response out.

use tracing::{debug, info_span};

use crate::errors::AnalysisError;
use crate::layout::TrussLayout;
use crate::recovery::MemberForce;
use crate::request::{Reaction, TrussRequest, TrussResponse};
use crate::solver::round_to;
use crate::truss::Solution;

/// Run the full direct stiffness pipeline for one request.
///
/// The computation is pure: calling it twice with the same inputs gives
/// identical responses.
///
/// # Errors
///
/// Returns the first [`AnalysisError`] met while checking the solver settings,
/// resolving the layout, building the element matrices or solving the system. No
/// partial results are produced.
///
/// # Examples
/// ```
/// use planar_truss::{solve_request, TrussLayout, TrussRequest};
///
/// let request = TrussRequest::from_json(
///     r#"{
///         "dimensions": {"a": 4, "b": 4, "c": 2, "d": 2, "h": 3},
///         "loads": {"p1": 0, "p2": 10, "p3": 0},
///         "properties": {"area": 1, "elasticity": 1}
///     }"#,
/// )
/// .unwrap();
/// let response = solve_request(&TrussLayout::reference(), &request).unwrap();
/// let total_x: f64 = response.reactions.iter().map(|(_, reaction)| reaction.x).sum();
/// assert!((total_x + 10.0).abs() < 1.0e-9);
/// ```
pub fn solve_request(
    layout: &TrussLayout,
    request: &TrussRequest,
) -> Result<TrussResponse, AnalysisError> {
    let _span = info_span!("solve_request").entered();
    layout.solver.validate()?;
    let truss = layout.build(request)?;
    let solution = truss.evaluate()?;
    debug!(
        joints = solution.joints.len(),
        members = solution.members.len(),
        "truss solved"
    );
    Ok(present(&solution, layout.solver.decimals))
}

/// Round a full-precision solution for the wire.
#[must_use]
pub fn present(solution: &Solution, decimals: u32) -> TrussResponse {
    let reactions = solution
        .joints
        .iter()
        .filter_map(|joint| {
            joint.reaction.map(|reaction| {
                (
                    joint.id.clone(),
                    Reaction {
                        x: round_to(reaction.x, decimals),
                        y: round_to(reaction.y, decimals),
                    },
                )
            })
        })
        .collect();
    let forces = solution
        .members
        .iter()
        .map(|member| {
            (
                member.id.clone(),
                MemberForce::from_axial(member.axial_force, decimals),
            )
        })
        .collect();
    TrussResponse { reactions, forces }
}
