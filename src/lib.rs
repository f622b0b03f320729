//! This crate provides tools for sensing functional connectivity in the brain.
//!
//! Remote electrophysiology recordings are resolved and downloaded from the
//! DANDI archive ([`dandi`]), their spike trains are binned against labeled
//! behavioral epochs ([`epoch`], [`binning`]), and synthetic
//! multivariate-normal datasets are generated from graph-structured precision
//! matrices ([`graph`], [`covariance`], [`synthetic`]) to benchmark
//! network-inference algorithms.
//!
//! # Binning spikes against behavioral epochs
//!
//! ```rust
//! use functional_connectivity::binning::count_spikes;
//! use functional_connectivity::epoch::{segment, Epoch};
//! use functional_connectivity::spike_train::SpikeTrain;
//! use functional_connectivity::DEFAULT_BIN_WIDTH;
//!
//! // One behavioral epoch, cut into windows of 100 seconds
//! let epochs = vec![Epoch::build(0.0, 250.0, "run").unwrap()];
//! let windows = segment(&epochs, DEFAULT_BIN_WIDTH).unwrap();
//! assert_eq!(windows.len(), 3);
//!
//! // Count the spikes of each neuron in each window
//! let trains = vec![SpikeTrain::build(0, &[50.0, 150.0, 260.0]).unwrap()];
//! let counts = count_spikes(&trains, &windows);
//! assert_eq!(counts[(0, 0)], 1.0);
//! assert_eq!(counts[(0, 2)], 0.0);
//! ```
//!
//! # Synthetic data from graph ensembles
//!
//! ```rust
//! use functional_connectivity::graph::EdgeListGraph;
//! use functional_connectivity::synthetic::SyntheticGenerator;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let graph = EdgeListGraph::new(3, vec![(0, 1, 0.25), (1, 2, 0.25)]).unwrap();
//! let mut generator = SyntheticGenerator::new();
//! generator.add_graph(&graph).unwrap();
//! generator.add_graph(&graph).unwrap();
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let samples = generator.generate_mvn(&[5, 10], &mut rng).unwrap();
//! assert_eq!(samples.shape(), (3, 15));
//! ```

pub mod binning;
pub mod covariance;
pub mod dandi;
pub mod epoch;
pub mod error;
pub mod graph;
pub mod io;
pub mod spike_train;
pub mod synthetic;

/// The default bin width (seconds) for segmenting behavioral epochs.
pub const DEFAULT_BIN_WIDTH: f64 = 100.0;
/// The tolerance under which the product of a matrix and its inverse is
/// accepted as the identity.
pub const INVERSION_TOLERANCE: f64 = 1e-8;
