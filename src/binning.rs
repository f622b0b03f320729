//! Spike-count matrices over labeled binning windows.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::epoch::Window;
use crate::error::FcError;
use crate::spike_train::SpikeTrain;

/// Minimum axis length to parallelize a binning loop.
pub const MIN_AXIS_PAR: usize = 10;

/// Count the spikes of each train falling in each window.
///
/// Cell `(n, t)` holds the number of spikes `s` of train `n` with
/// `windows[t].start <= s < windows[t].stop`. With windows produced by
/// [`segment`](crate::epoch::segment) every spike is attributed to at most
/// one window; spikes outside all windows are dropped. The truncation is
/// intentional and reported at debug level, never as an error.
///
/// The counting loop is independent per train and runs in parallel once
/// there are at least [`MIN_AXIS_PAR`] trains.
pub fn count_spikes(trains: &[SpikeTrain], windows: &[Window]) -> DMatrix<f64> {
    let count_row = |train: &SpikeTrain| -> Vec<f64> {
        windows
            .iter()
            .map(|w| train.count_in(w.start, w.stop) as f64)
            .collect()
    };

    let rows: Vec<Vec<f64>> = if trains.len() >= MIN_AXIS_PAR {
        trains.par_iter().map(count_row).collect()
    } else {
        trains.iter().map(count_row).collect()
    };

    let counts = DMatrix::from_row_iterator(
        trains.len(),
        windows.len(),
        rows.into_iter().flatten(),
    );

    let total: usize = trains.iter().map(|t| t.num_spikes()).sum();
    let counted = counts.sum() as usize;
    if counted < total {
        log::debug!(
            "{} of {} spikes fall outside all windows and were dropped",
            total - counted,
            total
        );
    }

    counts
}

/// Sum every group of `n_bins` consecutive columns of a count matrix.
///
/// The output has `ncols / n_bins` columns; trailing columns that do not
/// fill a complete group are dropped. Output columns are independent and
/// computed in parallel once there are at least [`MIN_AXIS_PAR`] of them.
pub fn sum_chunks(counts: &DMatrix<f64>, n_bins: usize) -> Result<DMatrix<f64>, FcError> {
    if n_bins == 0 {
        return Err(FcError::InvalidParameter(
            "The chunk size must be positive".to_string(),
        ));
    }

    let n_out = counts.ncols() / n_bins;
    let dropped = counts.ncols() - n_out * n_bins;
    if dropped > 0 {
        log::debug!(
            "{} trailing columns do not fill a chunk of {} and were dropped",
            dropped,
            n_bins
        );
    }
    if n_out == 0 {
        return Ok(DMatrix::zeros(counts.nrows(), 0));
    }

    let sum_chunk = |i: usize| -> DVector<f64> {
        (0..n_bins).fold(DVector::zeros(counts.nrows()), |acc, j| {
            acc + counts.column(i * n_bins + j)
        })
    };

    let columns: Vec<DVector<f64>> = if n_out >= MIN_AXIS_PAR {
        (0..n_out).into_par_iter().map(sum_chunk).collect()
    } else {
        (0..n_out).map(sum_chunk).collect()
    };

    Ok(DMatrix::from_columns(&columns))
}

/// Per-neuron annotations carried along the rows of a count matrix.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct NeuronInfo {
    /// The putative cell type of the neuron.
    pub cell_type: String,
    /// The recording shank the neuron was detected on.
    pub shank_id: i64,
    /// The anatomical region of the neuron.
    pub region: String,
}

/// A count matrix together with its coordinates: one annotated neuron per
/// row and one labeled window per column.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledCounts {
    counts: DMatrix<f64>,
    neuron_ids: Vec<usize>,
    neuron_info: Vec<NeuronInfo>,
    windows: Vec<Window>,
}

impl LabeledCounts {
    /// Bin the trains over the windows and attach the coordinate metadata.
    /// The function returns an error unless there is exactly one annotation
    /// per spike train; pass default annotations when none are available.
    pub fn build(
        trains: &[SpikeTrain],
        windows: &[Window],
        neuron_info: Vec<NeuronInfo>,
    ) -> Result<Self, FcError> {
        if neuron_info.len() != trains.len() {
            return Err(FcError::InvalidParameter(format!(
                "Expected one annotation per spike train, got {} for {} trains",
                neuron_info.len(),
                trains.len()
            )));
        }

        Ok(LabeledCounts {
            counts: count_spikes(trains, windows),
            neuron_ids: trains.iter().map(|t| t.id()).collect(),
            neuron_info,
            windows: windows.to_vec(),
        })
    }

    /// Returns the underlying neuron-by-window count matrix.
    pub fn counts(&self) -> &DMatrix<f64> {
        &self.counts
    }

    /// Returns the neuron IDs along the row axis.
    pub fn neuron_ids(&self) -> &[usize] {
        &self.neuron_ids
    }

    /// Returns the neuron annotations along the row axis.
    pub fn neuron_info(&self) -> &[NeuronInfo] {
        &self.neuron_info
    }

    /// Returns the labeled windows along the column axis.
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Returns the number of neurons.
    pub fn num_neurons(&self) -> usize {
        self.counts.nrows()
    }

    /// Returns the number of windows.
    pub fn num_windows(&self) -> usize {
        self.counts.ncols()
    }
}
