//! Labeled behavioral epochs and their fixed-width segmentation.

use serde::{Deserialize, Serialize};

use crate::error::FcError;

/// A labeled behavioral time span.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Epoch {
    start: f64,
    stop: f64,
    label: String,
}

impl Epoch {
    /// Create an epoch with the specified parameters.
    /// The function returns an error for non-finite times or if the epoch
    /// stops before it starts.
    pub fn build(start: f64, stop: f64, label: &str) -> Result<Self, FcError> {
        if !start.is_finite() || !stop.is_finite() {
            return Err(FcError::InvalidParameter(format!(
                "Epoch times must be finite, got [{}, {})",
                start, stop
            )));
        }
        if stop < start {
            return Err(FcError::InvalidEpoch { start, stop });
        }
        Ok(Epoch {
            start,
            stop,
            label: label.to_string(),
        })
    }

    /// Returns the start time of the epoch.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Returns the stop time of the epoch.
    pub fn stop(&self) -> f64 {
        self.stop
    }

    /// Returns the behavioral label of the epoch.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the duration of the epoch.
    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }
}

/// A left-closed/right-open binning window derived from an epoch.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Window {
    /// The start time of the window (included).
    pub start: f64,
    /// The stop time of the window (excluded).
    pub stop: f64,
    /// The label inherited from the parent epoch.
    pub label: String,
}

impl Window {
    /// Whether the window contains the given time, with half-open semantics.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.stop
    }

    /// Returns the duration of the window.
    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }
}

/// Divide each epoch into fixed-width windows of `bin_width` seconds.
///
/// An epoch of duration `d` contributes `floor(d / bin_width) + 1` windows:
/// window `j` spans `[start + j * bin_width, start + (j + 1) * bin_width)`,
/// with the last window clamped to the epoch stop. Windows inherit the epoch
/// label and are emitted in epoch order, in time order within each epoch.
///
/// Within each epoch the windows are contiguous, non-overlapping and cover
/// `[start, stop)` exactly. Together with the global left-closed/right-open
/// convention this guarantees every spike lands in at most one window; code
/// merging window sets from other sources must preserve that convention.
///
/// A zero-duration epoch yields a single zero-length window, which contains
/// no time at all. Whether such epochs should instead be skipped is left to
/// the caller.
pub fn segment(epochs: &[Epoch], bin_width: f64) -> Result<Vec<Window>, FcError> {
    if !(bin_width > 0.0) || !bin_width.is_finite() {
        return Err(FcError::InvalidParameter(format!(
            "The bin width must be positive, got {}",
            bin_width
        )));
    }

    let mut windows = Vec::new();
    for epoch in epochs {
        let num_full = (epoch.duration() / bin_width).floor() as usize;
        for j in 0..=num_full {
            let start = epoch.start + j as f64 * bin_width;
            let stop = (epoch.start + (j + 1) as f64 * bin_width).min(epoch.stop);
            windows.push(Window {
                start,
                stop,
                label: epoch.label.clone(),
            });
        }
    }

    log::debug!(
        "Segmented {} epochs into {} windows of width {}",
        epochs.len(),
        windows.len(),
        bin_width
    );
    Ok(windows)
}
