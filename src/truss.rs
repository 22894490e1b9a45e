//! Core data structures and the analysis pipeline for planar trusses.

use std::collections::HashMap;

use nalgebra::DVector;
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
use tracing::{debug, debug_span};

use crate::assembly::assemble;
use crate::dof::{Axis, DofMap};
use crate::errors::{AnalysisError, MemberPropertyError, TrussEditError};
use crate::geometry::{Displacement, Force, MemberGeometry, Point};
use crate::recovery::axial_force;
use crate::solver::{solve_partitioned, SolverOptions};
use crate::stiffness::Element;

/// Internal representation of a truss joint.
#[derive(Clone, Debug)]
struct Joint {
    /// External identifier of the joint.
    id: String,
    /// Position of the joint.
    position: Point,
    /// Indicator for each translational degree of freedom that is restrained.
    support: [bool; 2],
    /// External load applied to the joint.
    load: Force,
}

/// Internal representation of a truss member.
#[derive(Clone, Debug)]
struct Member {
    /// External identifier of the member.
    id: String,
    /// Cross-sectional area.
    area: Option<f64>,
    /// Elastic modulus.
    elastic_modulus: Option<f64>,
}

impl Member {
    /// Return the area and elastic modulus when both are present.
    fn properties(&self) -> Option<(f64, f64)> {
        Some((self.area?, self.elastic_modulus?))
    }
}

/// Container for a pin-jointed planar truss model.
///
/// Joints and members are stored in insertion order; that order fixes the DOF
/// numbering and the order of every reported result.
#[derive(Clone, Debug, Default)]
pub struct Truss {
    /// Underlying graph storage for joints and members.
    graph: Graph<Joint, Member>,
    /// Joint identifier to graph index.
    joint_ids: HashMap<String, NodeIndex>,
    /// Member identifier to graph index.
    member_ids: HashMap<String, EdgeIndex>,
    /// Settings used by [`Truss::evaluate`].
    options: SolverOptions,
}

/// Solved state of one joint.
#[derive(Clone, Debug, PartialEq)]
pub struct JointResult {
    /// Identifier of the joint.
    pub id: String,
    /// Applied external load.
    pub load: Force,
    /// Joint translation; zero along restrained axes.
    pub displacement: Displacement,
    /// Support reaction, present when at least one axis is restrained.
    pub reaction: Option<Force>,
}

/// Solved state of one member.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberResult {
    /// Identifier of the member.
    pub id: String,
    /// Signed local axial force; positive values are reported as compression.
    pub axial_force: f64,
}

/// Full-precision result of [`Truss::evaluate`].
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// Per-joint results in joint insertion order.
    pub joints: Vec<JointResult>,
    /// Per-member results in member insertion order.
    pub members: Vec<MemberResult>,
}

impl Solution {
    /// Look up the result for a joint by identifier.
    #[must_use]
    pub fn joint(&self, id: &str) -> Option<&JointResult> {
        self.joints.iter().find(|joint| joint.id == id)
    }

    /// Look up the result for a member by identifier.
    #[must_use]
    pub fn member(&self, id: &str) -> Option<&MemberResult> {
        self.members.iter().find(|member| member.id == id)
    }

    /// Vector sum of all applied loads and all reactions; zero at equilibrium.
    #[must_use]
    pub fn residual(&self) -> Force {
        self.joints.iter().fold(Force::default(), |sum, joint| {
            let reaction = joint.reaction.unwrap_or_default();
            Force::new(
                sum.x + joint.load.x + reaction.x,
                sum.y + joint.load.y + reaction.y,
            )
        })
    }
}

impl Truss {
    /// Create an empty truss.
    ///
    /// # Examples
    /// ```
    /// use planar_truss::Truss;
    ///
    /// let truss = Truss::new();
    /// assert_eq!(truss.joint_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty truss that solves with the given options.
    #[must_use]
    pub fn with_options(options: SolverOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Return the number of joints in the truss.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of members in the truss.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Find a joint by identifier.
    #[must_use]
    pub fn joint(&self, id: &str) -> Option<NodeIndex> {
        self.joint_ids.get(id).copied()
    }

    /// Find a member by identifier.
    #[must_use]
    pub fn member(&self, id: &str) -> Option<EdgeIndex> {
        self.member_ids.get(id).copied()
    }

    /// Add a new joint to the truss.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::DuplicateJoint`] when `id` is already used.
    ///
    /// # Examples
    /// ```
    /// use planar_truss::{point, Truss};
    ///
    /// let mut truss = Truss::new();
    /// let joint = truss.add_joint("A", point(0.0, 0.0)).unwrap();
    /// assert_eq!(truss.joint_count(), 1);
    /// assert_eq!(joint.index(), 0);
    /// ```
    pub fn add_joint(
        &mut self,
        id: impl Into<String>,
        position: Point,
    ) -> Result<NodeIndex, TrussEditError> {
        let id = id.into();
        if self.joint_ids.contains_key(&id) {
            return Err(TrussEditError::DuplicateJoint(id));
        }
        let index = self.graph.add_node(Joint {
            id: id.clone(),
            position,
            support: [false, false],
            load: Force::default(),
        });
        self.joint_ids.insert(id, index);
        Ok(index)
    }

    /// Connect two joints with a new member.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownJoint`] when either endpoint is not part of
    /// this truss and [`TrussEditError::DuplicateMember`] when `id` is already used.
    pub fn add_member(
        &mut self,
        id: impl Into<String>,
        start: NodeIndex,
        end: NodeIndex,
    ) -> Result<EdgeIndex, TrussEditError> {
        for joint in [start, end] {
            if self.graph.node_weight(joint).is_none() {
                return Err(TrussEditError::UnknownJoint(joint));
            }
        }
        let id = id.into();
        if self.member_ids.contains_key(&id) {
            return Err(TrussEditError::DuplicateMember(id));
        }
        let index = self.graph.add_edge(
            start,
            end,
            Member {
                id: id.clone(),
                area: None,
                elastic_modulus: None,
            },
        );
        self.member_ids.insert(id, index);
        Ok(index)
    }

    /// Set the restraint state for a joint.
    ///
    /// Each entry in `support` corresponds to the X and Y directions respectively. A
    /// value of `true` indicates that the degree of freedom is fixed.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownJoint`] when `joint` is not part of this truss.
    pub fn set_support(
        &mut self,
        joint: NodeIndex,
        support: [bool; 2],
    ) -> Result<(), TrussEditError> {
        let node = self
            .graph
            .node_weight_mut(joint)
            .ok_or(TrussEditError::UnknownJoint(joint))?;
        node.support = support;
        Ok(())
    }

    /// Apply a point load to a joint.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownJoint`] when `joint` is not part of this truss.
    pub fn set_load(&mut self, joint: NodeIndex, load: Force) -> Result<(), TrussEditError> {
        let node = self
            .graph
            .node_weight_mut(joint)
            .ok_or(TrussEditError::UnknownJoint(joint))?;
        node.load = load;
        Ok(())
    }

    /// Set the axial properties for a member.
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::UnknownMember`] when `member` is not part of this truss and
    /// [`TrussEditError::InvalidMemberProperties`] when either `area` or `elastic_modulus`
    /// is not strictly positive.
    ///
    /// # Examples
    /// ```
    /// use planar_truss::{point, Truss, TrussEditError};
    ///
    /// let mut truss = Truss::new();
    /// let a = truss.add_joint("A", point(0.0, 0.0)).unwrap();
    /// let b = truss.add_joint("B", point(1.0, 0.0)).unwrap();
    /// let member = truss.add_member("AB", a, b).unwrap();
    ///
    /// let error = truss
    ///     .set_member_properties(member, 0.0, 200.0e9)
    ///     .expect_err("invalid area rejected");
    /// match error {
    ///     TrussEditError::InvalidMemberProperties(_) => (),
    ///     other => panic!("unexpected error: {other:?}"),
    /// }
    /// ```
    pub fn set_member_properties(
        &mut self,
        member: EdgeIndex,
        area: f64,
        elastic_modulus: f64,
    ) -> Result<(), TrussEditError> {
        let edge = self
            .graph
            .edge_weight_mut(member)
            .ok_or(TrussEditError::UnknownMember(member))?;
        if !(area.is_finite() && area > 0.0) {
            return Err(TrussEditError::InvalidMemberProperties(
                MemberPropertyError::NonPositiveArea { member, area },
            ));
        }
        if !(elastic_modulus.is_finite() && elastic_modulus > 0.0) {
            return Err(TrussEditError::InvalidMemberProperties(
                MemberPropertyError::NonPositiveElasticModulus {
                    member,
                    elastic_modulus,
                },
            ));
        }
        edge.area = Some(area);
        edge.elastic_modulus = Some(elastic_modulus);
        Ok(())
    }

    /// Analyse the truss under the configured loads.
    ///
    /// The truss itself is not modified; evaluating the same truss twice yields
    /// identical solutions.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] for members without properties or
    /// loads acting on restrained DOFs, [`AnalysisError::DegenerateGeometry`] for
    /// zero-length members and [`AnalysisError::UnstableStructure`] when the
    /// supports do not hold the structure in place.
    ///
    /// # Examples
    /// ```
    /// use planar_truss::{force, point, Truss};
    ///
    /// let mut truss = Truss::new();
    /// let support = truss.add_joint("A", point(0.0, 0.0)).unwrap();
    /// let tip = truss.add_joint("B", point(1.0, 0.0)).unwrap();
    /// truss.set_support(support, [true, true]).unwrap();
    /// truss.set_support(tip, [false, true]).unwrap();
    /// truss.set_load(tip, force(1_000.0, 0.0)).unwrap();
    /// let bar = truss.add_member("AB", support, tip).unwrap();
    /// truss.set_member_properties(bar, 0.01, 200.0e9).unwrap();
    ///
    /// let solution = truss.evaluate().unwrap();
    /// let reaction = solution.joint("A").unwrap().reaction.unwrap();
    /// assert!((reaction.x + 1_000.0).abs() < 1.0e-6);
    /// ```
    pub fn evaluate(&self) -> Result<Solution, AnalysisError> {
        let _span = debug_span!(
            "evaluate",
            joints = self.joint_count(),
            members = self.member_count()
        )
        .entered();
        let dofs = self.dof_map();
        let elements = self.build_elements(&dofs)?;
        let stiffness = assemble(dofs.total(), &elements);
        debug!(size = dofs.total(), "assembled global stiffness matrix");
        let loads = self.build_load_vector(&dofs)?;
        let partition = solve_partitioned(&stiffness, &loads, &dofs, &self.options)?;
        Ok(self.collect_results(&dofs, &elements, &partition.displacements, &partition.reactions))
    }

    /// Number the DOFs of every joint, free DOFs first.
    fn dof_map(&self) -> DofMap {
        let restraints: Vec<[bool; 2]> = self
            .graph
            .node_weights()
            .map(|joint| joint.support)
            .collect();
        DofMap::new(&restraints)
    }

    /// Resolve geometry and build the element matrices of every member.
    fn build_elements(&self, dofs: &DofMap) -> Result<Vec<Element>, AnalysisError> {
        self.graph
            .edge_indices()
            .map(|edge| -> Result<Element, AnalysisError> {
                let member = &self.graph[edge];
                let (start, end) = self
                    .graph
                    .edge_endpoints(edge)
                    .ok_or_else(|| AnalysisError::invalid_input("members", "dangling member"))?;
                let (area, elastic_modulus) = member.properties().ok_or_else(|| {
                    AnalysisError::invalid_input(
                        format!("members.{}", member.id),
                        "area and elastic modulus are required",
                    )
                })?;
                let geometry = MemberGeometry::between(
                    self.graph[start].position,
                    self.graph[end].position,
                )
                .map_err(|length| AnalysisError::DegenerateGeometry {
                    member: member.id.clone(),
                    length,
                })?;
                Ok(Element::new(
                    member.id.clone(),
                    dofs.element_dofs(start.index(), end.index()),
                    area,
                    elastic_modulus,
                    geometry,
                ))
            })
            .collect()
    }

    /// Collect applied loads at the free DOFs.
    fn build_load_vector(&self, dofs: &DofMap) -> Result<DVector<f64>, AnalysisError> {
        let mut loads = DVector::zeros(dofs.free_count());
        for node in self.graph.node_indices() {
            let joint = &self.graph[node];
            for (axis, value) in Axis::ALL.into_iter().zip([joint.load.x, joint.load.y]) {
                let dof = dofs.dof(node.index(), axis);
                if dofs.is_free(dof) {
                    loads[dof - 1] = value;
                } else if value != 0.0 {
                    return Err(AnalysisError::invalid_input(
                        format!("joints.{}.load", joint.id),
                        "loads cannot act along a restrained axis",
                    ));
                }
            }
        }
        Ok(loads)
    }

    /// Map the solved vectors back onto joints and members.
    fn collect_results(
        &self,
        dofs: &DofMap,
        elements: &[Element],
        displacements: &DVector<f64>,
        reactions: &DVector<f64>,
    ) -> Solution {
        let free = dofs.free_count();
        let joints = self
            .graph
            .node_indices()
            .map(|node| {
                let joint = &self.graph[node];
                let [u, v] = Axis::ALL.map(|axis| dofs.dof(node.index(), axis));
                let reaction_at = |dof: usize| {
                    if dofs.is_free(dof) {
                        0.0
                    } else {
                        reactions[dof - free - 1]
                    }
                };
                JointResult {
                    id: joint.id.clone(),
                    load: joint.load,
                    displacement: Displacement::new(displacements[u - 1], displacements[v - 1]),
                    reaction: (joint.support[0] || joint.support[1])
                        .then(|| Force::new(reaction_at(u), reaction_at(v))),
                }
            })
            .collect();
        let members = elements
            .iter()
            .map(|element| MemberResult {
                id: element.member.clone(),
                axial_force: axial_force(element, displacements),
            })
            .collect();
        Solution { joints, members }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{force, point};

    /// Two-joint bar along X, fixed at the origin, loaded at the tip.
    fn axial_bar(load: f64) -> Truss {
        let mut truss = Truss::new();
        let support = truss.add_joint("A", point(0.0, 0.0)).expect("new joint");
        truss
            .set_support(support, [true, true])
            .expect("support applied");
        let free = truss.add_joint("B", point(1.0, 0.0)).expect("new joint");
        truss
            .set_support(free, [false, true])
            .expect("support applied");
        truss
            .set_load(free, force(load, 0.0))
            .expect("load applied");
        let member = truss.add_member("AB", support, free).expect("new member");
        truss
            .set_member_properties(member, 0.01, 200.0e9)
            .expect("properties accepted");
        truss
    }

    #[test]
    fn joint_mutators_return_error_for_unknown_indices() {
        let mut truss = Truss::new();
        let mut other = Truss::new();
        other.add_joint("A", point(0.0, 0.0)).expect("new joint");
        let foreign_joint = other.add_joint("B", point(1.0, 0.0)).expect("new joint");

        let support_error = truss
            .set_support(foreign_joint, [true, false])
            .expect_err("unknown joint rejected");
        assert_eq!(support_error, TrussEditError::UnknownJoint(foreign_joint));

        let load_error = truss
            .set_load(foreign_joint, force(0.0, 0.0))
            .expect_err("unknown joint rejected");
        assert_eq!(load_error, TrussEditError::UnknownJoint(foreign_joint));

        let a = truss.add_joint("A", point(0.0, 0.0)).expect("new joint");
        let member_error = truss
            .add_member("AB", a, foreign_joint)
            .expect_err("unknown joint rejected");
        assert_eq!(member_error, TrussEditError::UnknownJoint(foreign_joint));
    }

    #[test]
    fn member_mutators_return_error_for_unknown_indices() {
        let mut truss = Truss::new();
        let mut other = Truss::new();
        let start = other.add_joint("A", point(0.0, 0.0)).expect("new joint");
        let end = other.add_joint("B", point(1.0, 0.0)).expect("new joint");
        let foreign_member = other.add_member("AB", start, end).expect("new member");

        let properties_error = truss
            .set_member_properties(foreign_member, 0.01, 200.0e9)
            .expect_err("unknown member rejected");
        assert_eq!(
            properties_error,
            TrussEditError::UnknownMember(foreign_member)
        );
    }

    #[test]
    fn duplicate_identifiers_are_rejected() {
        let mut truss = Truss::new();
        let a = truss.add_joint("A", point(0.0, 0.0)).expect("new joint");
        let b = truss.add_joint("B", point(1.0, 0.0)).expect("new joint");
        assert_eq!(
            truss.add_joint("A", point(2.0, 0.0)),
            Err(TrussEditError::DuplicateJoint("A".to_string()))
        );
        truss.add_member("1", a, b).expect("new member");
        assert_eq!(
            truss.add_member("1", b, a),
            Err(TrussEditError::DuplicateMember("1".to_string()))
        );
        assert_eq!(truss.joint("B"), Some(b));
        assert_eq!(truss.member("2"), None);
    }

    #[test]
    fn invalid_member_properties_are_rejected() {
        let mut truss = Truss::new();
        let a = truss.add_joint("A", point(0.0, 0.0)).expect("new joint");
        let b = truss.add_joint("B", point(1.0, 0.0)).expect("new joint");
        let member = truss.add_member("AB", a, b).expect("new member");

        let area_error = truss
            .set_member_properties(member, 0.0, 200.0e9)
            .expect_err("zero area rejected");
        assert!(matches!(
            area_error,
            TrussEditError::InvalidMemberProperties(MemberPropertyError::NonPositiveArea { .. })
        ));

        let modulus_error = truss
            .set_member_properties(member, 0.01, f64::NAN)
            .expect_err("non-finite modulus rejected");
        assert!(matches!(
            modulus_error,
            TrussEditError::InvalidMemberProperties(
                MemberPropertyError::NonPositiveElasticModulus { .. }
            )
        ));
    }

    #[test]
    fn analysis_requires_member_properties() {
        let mut truss = Truss::new();
        let a = truss.add_joint("A", point(0.0, 0.0)).expect("new joint");
        let b = truss.add_joint("B", point(1.0, 0.0)).expect("new joint");
        truss.add_member("AB", a, b).expect("new member");

        let error = truss.evaluate().expect_err("missing properties detected");
        assert_eq!(
            error,
            AnalysisError::invalid_input("members.AB", "area and elastic modulus are required")
        );
    }

    #[test]
    fn zero_length_member_is_rejected() {
        let mut truss = Truss::new();
        let a = truss.add_joint("A", point(0.0, 0.0)).expect("new joint");
        let b = truss.add_joint("B", point(0.0, 0.0)).expect("new joint");
        let member = truss.add_member("AB", a, b).expect("new member");
        truss
            .set_member_properties(member, 0.01, 200.0e9)
            .expect("properties accepted");

        let error = truss.evaluate().expect_err("zero length detected");
        assert_eq!(
            error,
            AnalysisError::DegenerateGeometry {
                member: "AB".to_string(),
                length: 0.0
            }
        );
    }

    #[test]
    fn unsupported_structure_is_unstable() {
        let mut truss = axial_bar(-1_000.0);
        let support = truss.joint("A").expect("joint exists");
        truss
            .set_support(support, [false, false])
            .expect("support applied");

        let error = truss.evaluate().expect_err("rigid body motion detected");
        assert!(matches!(error, AnalysisError::UnstableStructure { .. }));
    }

    #[test]
    fn loads_on_restrained_axes_are_rejected() {
        let mut truss = axial_bar(0.0);
        let tip = truss.joint("B").expect("joint exists");
        truss
            .set_load(tip, force(0.0, -50.0))
            .expect("load applied");

        let error = truss.evaluate().expect_err("load on support rejected");
        assert!(matches!(error, AnalysisError::InvalidInput { ref field, .. } if field == "joints.B.load"));
    }

    #[test]
    fn axial_bar_matches_expected_displacements() {
        let truss = axial_bar(-1_000.0);
        let solution = truss.evaluate().expect("analysis succeeds");

        let tip = solution.joint("B").expect("tip result");
        let expected_displacement = -1_000.0 * 1.0 / (0.01 * 200.0e9);
        assert_relative_eq!(tip.displacement.x, expected_displacement, epsilon = 1.0e-12);
        assert_relative_eq!(tip.displacement.y, 0.0, epsilon = 1.0e-12);

        let reaction = solution
            .joint("A")
            .and_then(|joint| joint.reaction)
            .expect("support reaction");
        assert_relative_eq!(reaction.x, 1_000.0, epsilon = 1.0e-6);
        assert_relative_eq!(reaction.y, 0.0, epsilon = 1.0e-6);

        // Pushing the tip towards the support gives a negative local axial force.
        let force = solution.member("AB").expect("member result").axial_force;
        assert_relative_eq!(force, -1_000.0, epsilon = 1.0e-6);

        let residual = solution.residual();
        assert_relative_eq!(residual.x, 0.0, epsilon = 1.0e-6);
        assert_relative_eq!(residual.y, 0.0, epsilon = 1.0e-6);
    }

    #[test]
    fn evaluation_leaves_the_model_untouched() {
        let truss = axial_bar(250.0);
        let first = truss.evaluate().expect("analysis succeeds");
        let second = truss.evaluate().expect("analysis succeeds");
        assert_eq!(first, second);
    }
}
