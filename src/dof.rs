//! Degree-of-freedom numbering.
//!
//! Every joint owns a horizontal and a vertical DOF. Free DOFs are numbered
//! `1..=k` and restrained DOFs `k+1..=2n`, which is what lets the solver take the
//! leading block of the global matrix as `K_ff`.

use serde::{Deserialize, Serialize};

/// Global translation direction of a DOF.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Global X.
    #[serde(rename = "x")]
    Horizontal,
    /// Global Y.
    #[serde(rename = "y")]
    Vertical,
}

impl Axis {
    /// Both axes, horizontal first.
    pub const ALL: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

    /// Position of the axis within a joint's DOF pair.
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Axis::Horizontal => 0,
            Axis::Vertical => 1,
        }
    }
}

/// Bijection from (joint, axis) to a 1-based global DOF index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DofMap {
    /// 1-based DOF of each joint's horizontal and vertical translation.
    indices: Vec<[usize; 2]>,
    /// Number of unrestrained DOFs.
    free: usize,
}

impl DofMap {
    /// Number the DOFs of joints with the given restraints.
    ///
    /// `restraints[j][a]` is `true` when axis `a` of joint `j` is fixed. Within the
    /// free and restrained groups DOFs follow joint order, horizontal first.
    ///
    /// # Examples
    /// ```
    /// use planar_truss::{Axis, DofMap};
    ///
    /// let dofs = DofMap::new(&[[true, true], [false, false]]);
    /// assert_eq!(dofs.free_count(), 2);
    /// assert_eq!(dofs.dof(1, Axis::Horizontal), 1);
    /// assert_eq!(dofs.dof(0, Axis::Vertical), 4);
    /// ```
    #[must_use]
    pub fn new(restraints: &[[bool; 2]]) -> Self {
        let free = restraints.iter().flatten().filter(|fixed| !**fixed).count();
        let mut next_free = 1;
        let mut next_restrained = free + 1;
        let indices = restraints
            .iter()
            .map(|&joint| {
                joint.map(|fixed| {
                    let counter = if fixed {
                        &mut next_restrained
                    } else {
                        &mut next_free
                    };
                    let dof = *counter;
                    *counter += 1;
                    dof
                })
            })
            .collect();
        Self { indices, free }
    }

    /// 1-based DOF of `axis` at joint `joint`.
    ///
    /// # Panics
    ///
    /// Panics when `joint` is out of range for this map.
    #[must_use]
    pub fn dof(&self, joint: usize, axis: Axis) -> usize {
        self.indices[joint][axis.offset()]
    }

    /// The four DOFs of a member, ordered (u_start, v_start, u_end, v_end).
    #[must_use]
    pub fn element_dofs(&self, start: usize, end: usize) -> [usize; 4] {
        let [u_start, v_start] = self.indices[start];
        let [u_end, v_end] = self.indices[end];
        [u_start, v_start, u_end, v_end]
    }

    /// Whether the 1-based `dof` is unrestrained.
    #[must_use]
    pub fn is_free(&self, dof: usize) -> bool {
        (1..=self.free).contains(&dof)
    }

    /// Number of joints covered by the map.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.indices.len()
    }

    /// Total number of DOFs.
    #[must_use]
    pub fn total(&self) -> usize {
        self.indices.len() * 2
    }

    /// Number of unrestrained DOFs.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free
    }

    /// Number of restrained DOFs.
    #[must_use]
    pub fn restrained_count(&self) -> usize {
        self.total() - self.free
    }
}
