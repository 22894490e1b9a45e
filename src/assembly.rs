//! Assembly of the structure-wide stiffness matrix.

use nalgebra::DMatrix;

use crate::stiffness::Element;

/// Scatter every element's global stiffness into a `size × size` matrix.
///
/// Contributions at shared DOFs are summed, so the result does not depend on
/// the order in which elements are supplied.
#[must_use]
pub fn assemble<'a, I>(size: usize, elements: I) -> DMatrix<f64>
where
    I: IntoIterator<Item = &'a Element>,
{
    let mut matrix = DMatrix::zeros(size, size);
    for element in elements {
        for (row_local, global_row) in element.dofs.iter().enumerate() {
            for (col_local, global_col) in element.dofs.iter().enumerate() {
                matrix[(global_row - 1, global_col - 1)] += element.stiffness[(row_local, col_local)];
            }
        }
    }
    matrix
}
