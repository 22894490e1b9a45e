//! Truss topology as configuration.
//!
//! A [`TrussLayout`] lists joints (with coordinates written in terms of the
//! request's named dimensions), members, supports and the joints at which each
//! named load acts. Layouts are read from TOML or JSON; the reference
//! five-joint, seven-member truss is built in:
//!
//! ```text
//!          4 ───────(4)─────── 5
//!         ╱ ╲                ╱ ╲
//!       (1)  (3)          (5)   (6)
//!       ╱      ╲          ╱       ╲
//!      1 ──(2)── 2 ──────(7)────── 3
//!      ▲                           ▲
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dof::Axis;
use crate::errors::{AnalysisError, LayoutError};
use crate::geometry::{Force, Point};
use crate::request::TrussRequest;
use crate::solver::SolverOptions;
use crate::truss::Truss;

/// Complete description of a truss family, independent of any one request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrussLayout {
    /// Joints in DOF-numbering order.
    pub joints: Vec<JointLayout>,
    /// Members in reporting order.
    pub members: Vec<MemberLayout>,
    /// Restrained axes.
    #[serde(default)]
    pub supports: Vec<SupportLayout>,
    /// Bindings from named request loads to joint force components.
    #[serde(default)]
    pub loads: Vec<LoadLayout>,
    /// Solver and reporting settings.
    #[serde(default)]
    pub solver: SolverOptions,
}

/// A joint whose coordinates are expressions over named dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JointLayout {
    /// Joint identifier.
    pub id: String,
    /// Horizontal coordinate.
    pub x: Coordinate,
    /// Vertical coordinate.
    pub y: Coordinate,
}

/// A coordinate: either a literal or a weighted sum of named dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    /// Literal value.
    Fixed(f64),
    /// `Σ weight · dimension`, e.g. `{ a = 1.0, b = 1.0, d = -1.0 }`.
    Linear(BTreeMap<String, f64>),
}

impl Coordinate {
    /// Evaluate the coordinate against the request's dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] when a referenced dimension is
    /// missing or not finite.
    pub fn evaluate(&self, request: &TrussRequest) -> Result<f64, AnalysisError> {
        match self {
            Coordinate::Fixed(value) => Ok(*value),
            Coordinate::Linear(terms) => terms.iter().try_fold(0.0, |sum, (name, weight)| {
                Ok(sum + weight * request.dimension(name)?)
            }),
        }
    }
}

/// A member between two joints, optionally overriding the request's material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberLayout {
    /// Member identifier.
    pub id: String,
    /// Start joint identifier.
    pub start: String,
    /// End joint identifier.
    pub end: String,
    /// Cross-sectional area for this member only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    /// Elastic modulus for this member only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticity: Option<f64>,
}

/// Restrained axes of a joint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SupportLayout {
    /// Supported joint identifier.
    pub joint: String,
    /// Horizontal translation is fixed.
    #[serde(default)]
    pub x: bool,
    /// Vertical translation is fixed.
    #[serde(default)]
    pub y: bool,
}

/// Applies `factor · loads[parameter]` along `axis` at `joint`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadLayout {
    /// Name of the load magnitude in the request.
    pub parameter: String,
    /// Loaded joint identifier.
    pub joint: String,
    /// Direction of the force.
    pub axis: Axis,
    /// Multiplier applied to the magnitude, typically `1.0` or `-1.0`.
    #[serde(default = "unit_factor")]
    pub factor: f64,
}

/// Default load multiplier.
fn unit_factor() -> f64 {
    1.0
}

impl TrussLayout {
    /// The reference five-joint, seven-member truss on two pinned supports.
    ///
    /// Joint 1 sits at the origin, joints 2 and 3 at `a` and `a + b` along the
    /// chord, joints 4 and 5 at height `h`, offset `c` from the left and `d` from
    /// the right. Load `p2` pushes joint 4 horizontally, `p1` and `p3` push
    /// joints 4 and 5 downwards.
    #[must_use]
    pub fn reference() -> Self {
        let dim = |terms: &[(&str, f64)]| {
            Coordinate::Linear(
                terms
                    .iter()
                    .map(|(name, weight)| ((*name).to_string(), *weight))
                    .collect(),
            )
        };
        let joint = |id: &str, x: Coordinate, y: Coordinate| JointLayout {
            id: id.to_string(),
            x,
            y,
        };
        let member = |id: &str, start: &str, end: &str| MemberLayout {
            id: id.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            area: None,
            elasticity: None,
        };
        let pinned = |joint: &str| SupportLayout {
            joint: joint.to_string(),
            x: true,
            y: true,
        };
        let load = |parameter: &str, joint: &str, axis: Axis, factor: f64| LoadLayout {
            parameter: parameter.to_string(),
            joint: joint.to_string(),
            axis,
            factor,
        };

        Self {
            joints: vec![
                joint("1", Coordinate::Fixed(0.0), Coordinate::Fixed(0.0)),
                joint("2", dim(&[("a", 1.0)]), Coordinate::Fixed(0.0)),
                joint("3", dim(&[("a", 1.0), ("b", 1.0)]), Coordinate::Fixed(0.0)),
                joint("4", dim(&[("c", 1.0)]), dim(&[("h", 1.0)])),
                joint(
                    "5",
                    dim(&[("a", 1.0), ("b", 1.0), ("d", -1.0)]),
                    dim(&[("h", 1.0)]),
                ),
            ],
            members: vec![
                member("1", "1", "4"),
                member("2", "1", "2"),
                member("3", "4", "2"),
                member("4", "4", "5"),
                member("5", "2", "5"),
                member("6", "5", "3"),
                member("7", "2", "3"),
            ],
            supports: vec![pinned("1"), pinned("3")],
            loads: vec![
                load("p2", "4", Axis::Horizontal, 1.0),
                load("p1", "4", Axis::Vertical, -1.0),
                load("p3", "5", Axis::Vertical, -1.0),
            ],
            solver: SolverOptions::default(),
        }
    }

    /// Parse and validate a TOML layout.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] when the text does not match the schema or the
    /// layout references undeclared joints.
    pub fn from_toml_str(text: &str) -> Result<Self, LayoutError> {
        let layout: Self = toml::from_str(text)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Parse and validate a JSON layout.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] when the text does not match the schema or the
    /// layout references undeclared joints.
    pub fn from_json_str(text: &str) -> Result<Self, LayoutError> {
        let layout: Self = serde_json::from_str(text)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Read a layout file; `.json` files are parsed as JSON, anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] when the file cannot be read, parsed or validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading truss layout");
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }

    /// Check identifiers, cross references and solver settings.
    ///
    /// # Errors
    ///
    /// Returns the first [`LayoutError`] found.
    pub fn validate(&self) -> Result<(), LayoutError> {
        self.solver.validate().map_err(LayoutError::Solver)?;
        let mut joints = HashSet::new();
        for joint in &self.joints {
            if !joints.insert(joint.id.as_str()) {
                return Err(LayoutError::DuplicateJoint(joint.id.clone()));
            }
        }
        let known = |owner: String, joint: &str| {
            if joints.contains(joint) {
                Ok(())
            } else {
                Err(LayoutError::UnknownJoint {
                    owner,
                    joint: joint.to_string(),
                })
            }
        };

        let mut members = HashSet::new();
        for member in &self.members {
            if !members.insert(member.id.as_str()) {
                return Err(LayoutError::DuplicateMember(member.id.clone()));
            }
            known(format!("member {}", member.id), &member.start)?;
            known(format!("member {}", member.id), &member.end)?;
            if member.start == member.end {
                return Err(LayoutError::SelfConnectedMember(member.id.clone()));
            }
        }
        for support in &self.supports {
            known("support".to_string(), &support.joint)?;
        }
        for load in &self.loads {
            known(format!("load {}", load.parameter), &load.joint)?;
        }
        Ok(())
    }

    /// Resolve the layout against a request into an analysable [`Truss`].
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] when a dimension or load named by the
    /// layout is missing or not finite, when material properties are not positive,
    /// or when the layout itself is inconsistent.
    pub fn build(&self, request: &TrussRequest) -> Result<Truss, AnalysisError> {
        let mut truss = Truss::with_options(self.solver);

        for joint in &self.joints {
            let position = Point::new(joint.x.evaluate(request)?, joint.y.evaluate(request)?);
            truss
                .add_joint(joint.id.as_str(), position)
                .map_err(|error| AnalysisError::invalid_input("joints", error.to_string()))?;
        }

        let mut supports: BTreeMap<&str, [bool; 2]> = BTreeMap::new();
        for support in &self.supports {
            let entry = supports.entry(support.joint.as_str()).or_default();
            entry[0] |= support.x;
            entry[1] |= support.y;
        }
        for (id, restraint) in supports {
            let joint = joint_index(&truss, id, "supports")?;
            truss
                .set_support(joint, restraint)
                .map_err(|error| AnalysisError::invalid_input("supports", error.to_string()))?;
        }

        let mut loads: BTreeMap<&str, Force> = BTreeMap::new();
        for binding in &self.loads {
            let value = binding.factor * request.load(&binding.parameter)?;
            let entry = loads.entry(binding.joint.as_str()).or_default();
            match binding.axis {
                Axis::Horizontal => entry.x += value,
                Axis::Vertical => entry.y += value,
            }
        }
        for (id, load) in loads {
            let joint = joint_index(&truss, id, "loads")?;
            truss
                .set_load(joint, load)
                .map_err(|error| AnalysisError::invalid_input("loads", error.to_string()))?;
        }

        for member in &self.members {
            let start = joint_index(&truss, &member.start, "members")?;
            let end = joint_index(&truss, &member.end, "members")?;
            let edge = truss
                .add_member(member.id.as_str(), start, end)
                .map_err(|error| AnalysisError::invalid_input("members", error.to_string()))?;
            let area = member.area.unwrap_or(request.properties.area);
            let elasticity = member.elasticity.unwrap_or(request.properties.elasticity);
            truss
                .set_member_properties(edge, area, elasticity)
                .map_err(|error| {
                    let field = if member.area.is_none() && member.elasticity.is_none() {
                        "properties".to_string()
                    } else {
                        format!("members.{}", member.id)
                    };
                    AnalysisError::invalid_input(field, error.to_string())
                })?;
        }

        Ok(truss)
    }
}

/// Graph index of the joint declared as `id`.
///
/// `owner` names the layout section holding the reference and becomes the
/// reported field.
fn joint_index(truss: &Truss, id: &str, owner: &str) -> Result<NodeIndex, AnalysisError> {
    truss.joint(id).ok_or_else(|| {
        AnalysisError::invalid_input(owner, format!("joint `{id}` is not declared"))
    })
}

impl Default for TrussLayout {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::request::MaterialProperties;

    fn request() -> TrussRequest {
        TrussRequest {
            dimensions: [("a", 4.0), ("b", 5.0), ("c", 1.5), ("d", 2.0), ("h", 3.0)]
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            loads: [("p1", 10.0), ("p2", 4.0), ("p3", 6.0)]
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            properties: MaterialProperties {
                area: 0.01,
                elasticity: 200.0e9,
            },
        }
    }

    #[test]
    fn shipped_layout_file_matches_reference() {
        let shipped = TrussLayout::from_toml_str(include_str!("../layouts/pratt.toml"))
            .expect("shipped layout parses");
        assert_eq!(shipped, TrussLayout::reference());
    }

    #[test]
    fn json_layouts_are_accepted() {
        let json = serde_json::to_string(&TrussLayout::reference()).expect("serializable");
        let parsed = TrussLayout::from_json_str(&json).expect("round trip");
        assert_eq!(parsed, TrussLayout::reference());
    }

    #[test]
    fn coordinates_combine_dimensions() {
        let request = request();
        let joint_five = &TrussLayout::reference().joints[4];
        assert_relative_eq!(joint_five.x.evaluate(&request).expect("known"), 7.0);
        assert_relative_eq!(joint_five.y.evaluate(&request).expect("known"), 3.0);
        assert_eq!(Coordinate::Fixed(2.5).evaluate(&request), Ok(2.5));
    }

    #[test]
    fn missing_dimension_is_invalid_input() {
        let mut request = request();
        request.dimensions.remove("h");
        let error = TrussLayout::reference()
            .build(&request)
            .expect_err("h is required");
        assert_eq!(
            error,
            AnalysisError::invalid_input("dimensions.h", "value is required")
        );
    }

    #[test]
    fn non_positive_properties_are_invalid_input() {
        let mut request = request();
        request.properties.area = -1.0;
        let error = TrussLayout::reference()
            .build(&request)
            .expect_err("negative area rejected");
        assert!(matches!(error, AnalysisError::InvalidInput { ref field, .. } if field == "properties"));
    }

    #[test]
    fn builds_reference_topology() {
        let truss = TrussLayout::reference()
            .build(&request())
            .expect("valid request");
        assert_eq!(truss.joint_count(), 5);
        assert_eq!(truss.member_count(), 7);
        assert_eq!(truss.joint("3").map(|joint| joint.index()), Some(2));
        assert_eq!(truss.member("7").map(|member| member.index()), Some(6));
    }

    #[test]
    fn per_member_properties_override_defaults() {
        let mut layout = TrussLayout::reference();
        layout.members[3].area = Some(0.0);
        let error = layout.build(&request()).expect_err("override validated");
        assert!(matches!(error, AnalysisError::InvalidInput { ref field, .. } if field == "members.4"));
    }

    #[test]
    fn build_rejects_undeclared_joints() {
        let mut layout = TrussLayout::reference();
        layout.supports.push(SupportLayout {
            joint: "9".to_string(),
            x: true,
            y: false,
        });
        let error = layout.build(&request()).expect_err("joint 9 is not declared");
        assert_eq!(
            error,
            AnalysisError::invalid_input("supports", "joint `9` is not declared")
        );

        let mut layout = TrussLayout::reference();
        layout.members[2].start = "0".to_string();
        let error = layout.build(&request()).expect_err("joint 0 is not declared");
        assert_eq!(error.entity(), Some("members"));
    }

    #[test]
    fn validation_catches_dangling_references() {
        let mut layout = TrussLayout::reference();
        layout.members[0].end = "9".to_string();
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::UnknownJoint { ref joint, .. }) if joint == "9"
        ));

        let mut layout = TrussLayout::reference();
        layout.joints.push(layout.joints[0].clone());
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::DuplicateJoint(ref id)) if id == "1"
        ));

        let mut layout = TrussLayout::reference();
        layout.members[6].end = "2".to_string();
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::SelfConnectedMember(ref id)) if id == "7"
        ));
    }

    #[test]
    fn solver_table_is_range_checked() {
        let text = include_str!("../layouts/pratt.toml")
            .replace("pivot_tolerance = 1e-12", "pivot_tolerance = -1.0");
        let error = TrussLayout::from_toml_str(&text).expect_err("negative tolerance");
        assert!(matches!(
            error,
            LayoutError::Solver(AnalysisError::InvalidInput { ref field, .. })
                if field == "solver.pivot_tolerance"
        ));

        let text = include_str!("../layouts/pratt.toml").replace("decimals = 3", "decimals = 400");
        let error = TrussLayout::from_toml_str(&text).expect_err("too many decimals");
        assert!(matches!(error, LayoutError::Solver(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = TrussLayout::from_toml_str("joints = []\nmembers = []\nport = 3008\n")
            .expect_err("unknown key rejected");
        assert!(matches!(error, LayoutError::Toml(_)));
    }
}
