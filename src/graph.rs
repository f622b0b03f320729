//! Graph inputs for precision-structured synthetic data.
//!
//! The library does not depend on any specific graph crate: anything
//! exposing a node count and a weighted edge list can parameterize a
//! [`GraphStorage`](crate::covariance::GraphStorage). [`EdgeListGraph`] is
//! the built-in implementation, read from delimited edge-list files.

use std::collections::HashMap;
use std::path::Path;

use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::FcError;

/// A weighted undirected edge between two nodes, by dense node index.
pub type Edge = (usize, usize, f64);

/// Capability interface for graphs used as precision-matrix structure.
pub trait AdjacencyGraph {
    /// The number of nodes in the graph.
    fn num_nodes(&self) -> usize;

    /// The weighted edges of the graph, with node indices in `0..num_nodes()`.
    fn edges(&self) -> &[Edge];

    /// The symmetric adjacency matrix of the graph.
    /// Off-diagonal edges are mirrored; self-loop weights land on the diagonal.
    fn adjacency_matrix(&self) -> CsrMatrix<f64> {
        let n = self.num_nodes();
        let mut coo = CooMatrix::new(n, n);
        for &(i, j, w) in self.edges() {
            coo.push(i, j, w);
            if i != j {
                coo.push(j, i, w);
            }
        }
        CsrMatrix::from(&coo)
    }
}

/// A graph held as a plain weighted edge list.
#[derive(Debug, PartialEq, Clone)]
pub struct EdgeListGraph {
    num_nodes: usize,
    edges: Vec<Edge>,
}

impl EdgeListGraph {
    /// Create a graph from a dense node count and an edge list.
    /// The function returns an error for edges referencing missing nodes or
    /// carrying non-finite weights.
    pub fn new(num_nodes: usize, edges: Vec<Edge>) -> Result<Self, FcError> {
        for &(i, j, w) in &edges {
            if i >= num_nodes || j >= num_nodes {
                return Err(FcError::InvalidParameter(format!(
                    "Edge ({}, {}) references a node outside 0..{}",
                    i, j, num_nodes
                )));
            }
            if !w.is_finite() {
                return Err(FcError::InvalidParameter(format!(
                    "Edge ({}, {}) has non-finite weight {}",
                    i, j, w
                )));
            }
        }
        Ok(EdgeListGraph { num_nodes, edges })
    }

    /// Read a graph from an edge-list file.
    ///
    /// Each record is `source delimiter target delimiter weight`; records
    /// starting with the comment byte are skipped. Node ids are arbitrary
    /// integers and are mapped to dense indices in first-seen order.
    pub fn from_edgelist<P: AsRef<Path>>(
        path: P,
        comment: u8,
        delimiter: u8,
    ) -> Result<Self, FcError> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .comment(Some(comment))
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(|e| FcError::Io(format!("Cannot open edge list {}: {}", path.display(), e)))?;

        let mut index: HashMap<i64, usize> = HashMap::new();
        let mut edges: Vec<Edge> = Vec::new();

        for (num, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                FcError::Parse(format!("Edge list {}, record {}: {}", path.display(), num, e))
            })?;
            if record.len() < 3 {
                return Err(FcError::Parse(format!(
                    "Edge list {}, record {}: expected 3 fields, got {}",
                    path.display(),
                    num,
                    record.len()
                )));
            }

            let source: i64 = parse_field(&record[0], path, num, "source id")?;
            let target: i64 = parse_field(&record[1], path, num, "target id")?;
            let weight: f64 = parse_field(&record[2], path, num, "weight")?;

            let next = index.len();
            let i = *index.entry(source).or_insert(next);
            let next = index.len();
            let j = *index.entry(target).or_insert(next);
            edges.push((i, j, weight));
        }

        EdgeListGraph::new(index.len(), edges)
    }

    /// Returns the edges of the graph in input order.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }
}

fn parse_field<T: std::str::FromStr>(
    field: &str,
    path: &Path,
    num: usize,
    what: &str,
) -> Result<T, FcError>
where
    T::Err: std::fmt::Display,
{
    field.parse().map_err(|e| {
        FcError::Parse(format!(
            "Edge list {}, record {}: invalid {} {:?}: {}",
            path.display(),
            num,
            what,
            field,
            e
        ))
    })
}

impl AdjacencyGraph for EdgeListGraph {
    fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    fn edges(&self) -> &[Edge] {
        &self.edges
    }
}
