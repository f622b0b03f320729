//! Module implementing the concept of a spike train.

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::Poisson;
use serde::{Deserialize, Serialize};

use crate::error::FcError;

/// The spike train recorded from a single neuron.
///
/// Spike times are finite, expressed in seconds, and kept sorted. A spike
/// train is immutable once built.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SpikeTrain {
    id: usize,
    times: Vec<f64>,
}

impl SpikeTrain {
    /// Create a spike train with the specified parameters.
    /// If necessary, the spike times are sorted.
    /// The function returns an error for non-finite spike times.
    pub fn build(id: usize, times: &[f64]) -> Result<Self, FcError> {
        if times.iter().any(|t| !t.is_finite()) {
            return Err(FcError::InvalidParameter(format!(
                "Spike times of neuron {} must be finite",
                id
            )));
        }

        let mut times = times.to_vec();
        times.sort_by(|t1, t2| {
            t1.partial_cmp(t2)
                .unwrap_or_else(|| panic!("Comparison failed: NaN values should have been caught earlier"))
        });

        Ok(SpikeTrain { id, times })
    }

    /// Sample homogeneous Poisson spike trains on the interval [0, duration).
    ///
    /// The number of spikes of each neuron is Poisson with mean
    /// `firing_rate * duration` and the spike times are uniform on the
    /// interval. A zero firing rate produces empty trains.
    pub fn rand<R: Rng>(
        num_neurons: usize,
        duration: f64,
        firing_rate: f64,
        rng: &mut R,
    ) -> Result<Vec<SpikeTrain>, FcError> {
        if !(duration > 0.0) || !duration.is_finite() {
            return Err(FcError::InvalidParameter(format!(
                "The duration must be positive, got {}",
                duration
            )));
        }
        if firing_rate < 0.0 {
            return Err(FcError::InvalidParameter(format!(
                "The firing rate must be non-negative, got {}",
                firing_rate
            )));
        }

        if firing_rate == 0.0 {
            return (0..num_neurons).map(|id| SpikeTrain::build(id, &[])).collect();
        }

        let num_spikes_dist = Poisson::new(firing_rate * duration).map_err(|e| {
            FcError::InvalidParameter(format!("Invalid spike count distribution: {}", e))
        })?;
        let time_dist = Uniform::new(0.0, duration);

        (0..num_neurons)
            .map(|id| {
                let num_spikes: f64 = num_spikes_dist.sample(rng);
                let times: Vec<f64> = (0..num_spikes as usize)
                    .map(|_| time_dist.sample(rng))
                    .collect();
                SpikeTrain::build(id, &times)
            })
            .collect()
    }

    /// Returns the ID of the neuron associated with the spike train.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the spike times of the spike train.
    pub fn times(&self) -> &[f64] {
        &self.times[..]
    }

    /// Returns the number of spikes in the spike train.
    pub fn num_spikes(&self) -> usize {
        self.times.len()
    }

    /// Count the spikes falling in the half-open interval [start, stop).
    pub fn count_in(&self, start: f64, stop: f64) -> usize {
        self.times.iter().filter(|&&t| t >= start && t < stop).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SEED: u64 = 42;

    #[test]
    fn test_spike_train_build() {
        // Sorted input is preserved
        let spike_train = SpikeTrain::build(0, &[0.0, 2.0, 5.0]).unwrap();
        assert_eq!(spike_train.times(), &[0.0, 2.0, 5.0]);

        // Unsorted input is sorted
        let spike_train = SpikeTrain::build(0, &[0.0, 5.0, 2.0]).unwrap();
        assert_eq!(spike_train.times(), &[0.0, 2.0, 5.0]);

        // Empty spike train
        let spike_train = SpikeTrain::build(0, &[]).unwrap();
        assert_eq!(spike_train.times(), &[] as &[f64]);
        assert_eq!(spike_train.num_spikes(), 0);

        // NaN values are rejected
        assert!(SpikeTrain::build(0, &[0.0, 5.0, f64::NAN]).is_err());
        assert!(SpikeTrain::build(0, &[f64::INFINITY]).is_err());
    }

    #[test]
    fn test_count_in_is_half_open() {
        let spike_train = SpikeTrain::build(0, &[0.0, 50.0, 100.0, 150.0]).unwrap();

        // The left boundary is included, the right one is not
        assert_eq!(spike_train.count_in(0.0, 100.0), 2);
        assert_eq!(spike_train.count_in(100.0, 200.0), 2);
        assert_eq!(spike_train.count_in(150.0, 150.0), 0);
        assert_eq!(spike_train.count_in(200.0, 300.0), 0);
    }

    #[test]
    fn test_spike_train_rand() {
        let mut rng = StdRng::seed_from_u64(SEED);

        assert!(SpikeTrain::rand(10, -10.0, 1.0, &mut rng).is_err());
        assert!(SpikeTrain::rand(10, 0.0, 1.0, &mut rng).is_err());
        assert!(SpikeTrain::rand(10, 10.0, -1.0, &mut rng).is_err());

        let spike_trains = SpikeTrain::rand(50, 100.0, 1.0, &mut rng).unwrap();
        assert_eq!(spike_trains.len(), 50);

        for (id, spike_train) in spike_trains.iter().enumerate() {
            assert_eq!(spike_train.id(), id);
            assert!(spike_train
                .times()
                .windows(2)
                .all(|ts| ts[0] <= ts[1]));
            assert!(spike_train.times().iter().all(|&t| (0.0..100.0).contains(&t)));
        }

        // The total spike count concentrates around num_neurons * rate * duration
        let total: usize = spike_trains.iter().map(|s| s.num_spikes()).sum();
        assert!(total > 4000 && total < 6000);

        let empty_trains = SpikeTrain::rand(5, 100.0, 0.0, &mut rng).unwrap();
        assert!(empty_trains.iter().all(|s| s.num_spikes() == 0));
    }
}
