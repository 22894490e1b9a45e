#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod analysis;
pub mod assembly;
pub mod dof;
pub mod errors;
pub mod geometry;
pub mod layout;
pub mod recovery;
pub mod request;
pub mod solver;
pub mod stiffness;
pub mod truss;

pub use analysis::{present, solve_request};
pub use assembly::assemble;
pub use dof::{Axis, DofMap};
pub use errors::{AnalysisError, LayoutError, MemberPropertyError, TrussEditError};
pub use geometry::{force, point, Displacement, Force, MemberGeometry, Point};
pub use layout::{Coordinate, JointLayout, LoadLayout, MemberLayout, SupportLayout, TrussLayout};
pub use recovery::{axial_force, Condition, MemberForce};
pub use request::{ErrorReport, MaterialProperties, Reaction, TrussRequest, TrussResponse};
pub use solver::{round_to, solve_partitioned, PartitionedSolution, SolverOptions, MAX_DECIMALS};
pub use stiffness::{local_stiffness, transformation, Element, Matrix4};
pub use truss::{JointResult, MemberResult, Solution, Truss};
