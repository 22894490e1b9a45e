//! Error types produced while building, configuring or analysing trusses.

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;

/// Error returned when a truss analysis fails.
///
/// Every variant is terminal for the request that produced it: no partial
/// results are ever returned alongside an error.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Returned when a field of the model is missing, malformed or not physically meaningful.
    #[error("invalid input for `{field}`: {reason}")]
    InvalidInput {
        /// Path of the offending field, e.g. `dimensions.a` or `members.3.area`.
        field: String,
        /// Human readable description of the problem.
        reason: String,
    },
    /// Returned when a member spans zero (or non-finite) distance.
    #[error("member {member} has degenerate length {length}")]
    DegenerateGeometry {
        /// Identifier of the offending member.
        member: String,
        /// Length derived from the joint coordinates.
        length: f64,
    },
    /// Returned when the free-DOF stiffness matrix cannot be solved.
    #[error("stiffness matrix for {free_dofs} free DOFs is singular; check supports and connectivity")]
    UnstableStructure {
        /// Number of unrestrained degrees of freedom in the rejected system.
        free_dofs: usize,
    },
}

impl AnalysisError {
    /// Shorthand for an [`AnalysisError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable name of the error category, as reported on the wire.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "InvalidInput",
            Self::DegenerateGeometry { .. } => "DegenerateGeometry",
            Self::UnstableStructure { .. } => "UnstableStructure",
        }
    }

    /// Identifier of the field or member responsible for the failure, when known.
    #[must_use]
    pub fn entity(&self) -> Option<&str> {
        match self {
            Self::InvalidInput { field, .. } => Some(field),
            Self::DegenerateGeometry { member, .. } => Some(member),
            Self::UnstableStructure { .. } => None,
        }
    }
}

/// Error returned when updating material properties for a truss member.
///
/// The variants describe the reason the supplied value is rejected so callers can
/// present actionable feedback to users.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum MemberPropertyError {
    /// Returned when the cross-sectional area is zero, negative or not finite.
    #[error("area must be positive (received {area})")]
    NonPositiveArea {
        /// Identifier of the affected member.
        member: EdgeIndex,
        /// Rejected cross-sectional area.
        area: f64,
    },
    /// Returned when the elastic modulus is zero, negative or not finite.
    #[error("elastic modulus must be positive (received {elastic_modulus})")]
    NonPositiveElasticModulus {
        /// Identifier of the affected member.
        member: EdgeIndex,
        /// Rejected elastic modulus.
        elastic_modulus: f64,
    },
}

/// Error returned when editing a [`Truss`](crate::Truss) with invalid indices or values.
///
/// # Examples
///
/// ```
/// use petgraph::graph::EdgeIndex;
/// use planar_truss::{Truss, TrussEditError};
///
/// let mut truss = Truss::new();
/// let invalid_member = EdgeIndex::new(42);
/// let error = truss
///     .set_member_properties(invalid_member, 0.01, 200.0e9)
///     .expect_err("unknown member is rejected");
/// assert_eq!(error, TrussEditError::UnknownMember(invalid_member));
/// ```
#[derive(Debug, Error, PartialEq)]
pub enum TrussEditError {
    /// Returned when a joint cannot be found in the truss.
    #[error("joint {0:?} does not exist in this truss")]
    UnknownJoint(NodeIndex),
    /// Returned when a member cannot be found in the truss.
    #[error("member {0:?} does not exist in this truss")]
    UnknownMember(EdgeIndex),
    /// Returned when a joint identifier is already taken.
    #[error("joint id `{0}` is already in use")]
    DuplicateJoint(String),
    /// Returned when a member identifier is already taken.
    #[error("member id `{0}` is already in use")]
    DuplicateMember(String),
    /// Returned when the supplied member properties are invalid.
    #[error("{0}")]
    InvalidMemberProperties(MemberPropertyError),
}

/// Error returned when a [`TrussLayout`](crate::TrussLayout) cannot be loaded.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The layout file could not be read.
    #[error("failed to read layout file: {0}")]
    Io(#[from] std::io::Error),
    /// The layout is not valid TOML for this schema.
    #[error("failed to parse TOML layout: {0}")]
    Toml(#[from] toml::de::Error),
    /// The layout is not valid JSON for this schema.
    #[error("failed to parse JSON layout: {0}")]
    Json(#[from] serde_json::Error),
    /// Two joints share an identifier.
    #[error("joint id `{0}` appears more than once")]
    DuplicateJoint(String),
    /// Two members share an identifier.
    #[error("member id `{0}` appears more than once")]
    DuplicateMember(String),
    /// A member, support or load references a joint that is not declared.
    #[error("{owner} references unknown joint `{joint}`")]
    UnknownJoint {
        /// Description of the referencing entry, e.g. `member 4`.
        owner: String,
        /// The unresolved joint identifier.
        joint: String,
    },
    /// A member starts and ends on the same joint.
    #[error("member `{0}` connects a joint to itself")]
    SelfConnectedMember(String),
    /// The `[solver]` table holds values the solver cannot work with.
    #[error("invalid solver settings: {0}")]
    Solver(#[source] AnalysisError),
}
