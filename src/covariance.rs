//! Precision and correlation matrices derived from graph structure.

use nalgebra::{Cholesky, DMatrix};
use nalgebra_sparse::CsrMatrix;

use crate::error::FcError;
use crate::graph::AdjacencyGraph;

/// The adjacency, precision and correlation matrices of a single graph.
///
/// The precision matrix is `A + I` and the correlation matrix is its
/// inverse, so the graph must make `A + I` symmetric positive-definite.
/// The derivation is pure; rebuild the storage whenever the graph changes.
#[derive(Debug, Clone)]
pub struct GraphStorage {
    adjacency: CsrMatrix<f64>,
    precision: CsrMatrix<f64>,
    correlation: DMatrix<f64>,
}

impl GraphStorage {
    /// Derive the matrices from the given graph.
    /// The function returns an error if the precision matrix is singular or
    /// not positive-definite.
    pub fn new(graph: &impl AdjacencyGraph) -> Result<Self, FcError> {
        let adjacency = graph.adjacency_matrix();
        let n = adjacency.nrows();
        let precision = &adjacency + &CsrMatrix::identity(n);

        let cholesky = Cholesky::new(csr_to_dense(&precision)).ok_or_else(|| {
            FcError::LinearAlgebra(
                "The precision matrix is singular or not positive-definite".to_string(),
            )
        })?;
        let correlation = cholesky.inverse();

        Ok(GraphStorage {
            adjacency,
            precision,
            correlation,
        })
    }

    /// Returns the number of nodes of the underlying graph.
    pub fn num_nodes(&self) -> usize {
        self.precision.nrows()
    }

    /// Returns the symmetric adjacency matrix of the graph.
    pub fn adjacency(&self) -> &CsrMatrix<f64> {
        &self.adjacency
    }

    /// Returns the precision matrix `A + I`.
    pub fn precision(&self) -> &CsrMatrix<f64> {
        &self.precision
    }

    /// Returns the correlation matrix, the inverse of the precision matrix.
    pub fn correlation(&self) -> &DMatrix<f64> {
        &self.correlation
    }
}

fn csr_to_dense(matrix: &CsrMatrix<f64>) -> DMatrix<f64> {
    let mut dense = DMatrix::zeros(matrix.nrows(), matrix.ncols());
    for (i, j, &v) in matrix.triplet_iter() {
        dense[(i, j)] = v;
    }
    dense
}
