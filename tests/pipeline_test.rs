use std::io::Write;

use nalgebra::{DMatrix, DMatrixView};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

use functional_connectivity::binning::{count_spikes, LabeledCounts, NeuronInfo};
use functional_connectivity::epoch::segment;
use functional_connectivity::graph::EdgeListGraph;
use functional_connectivity::io::{read_epochs, read_spike_trains, write_synthetic};
use functional_connectivity::spike_train::SpikeTrain;
use functional_connectivity::synthetic::SyntheticGenerator;

const SEED: u64 = 42;

/// Empirical covariance of zero-mean samples laid out one column per sample.
fn empirical_cov(block: DMatrixView<f64>) -> DMatrix<f64> {
    (block * block.transpose()) / block.ncols() as f64
}

#[test]
fn spike_counting_pipeline() {
    // Behavior table as exported from a recording
    let mut behavior = tempfile::NamedTempFile::new().unwrap();
    writeln!(behavior, "start_time,stop_time,label").unwrap();
    writeln!(behavior, "0.0,250.0,run").unwrap();
    writeln!(behavior, "250.0,423.5,rest").unwrap();

    // Spike table: one record per neuron
    let mut spikes = tempfile::NamedTempFile::new().unwrap();
    writeln!(spikes, "0,50.0,150.0,260.0").unwrap();
    writeln!(spikes, "1,90.0,99.999,100.0,430.0").unwrap();

    let epochs = read_epochs(behavior.path()).unwrap();
    let windows = segment(&epochs, 100.0).unwrap();
    // floor(250/100)+1 + floor(173.5/100)+1
    assert_eq!(windows.len(), 5);

    let trains = read_spike_trains(spikes.path()).unwrap();
    let labeled = LabeledCounts::build(
        &trains,
        &windows,
        vec![NeuronInfo::default(); trains.len()],
    )
    .unwrap();

    let counts = labeled.counts();
    assert_eq!(counts.shape(), (2, 5));
    assert_eq!(counts.row(0).iter().cloned().collect::<Vec<f64>>(), vec![1.0, 1.0, 0.0, 1.0, 0.0]);
    // The boundary spike at 100.0 lands in the second window only,
    // and the spike at 430.0 is outside every window
    assert_eq!(counts.row(1).iter().cloned().collect::<Vec<f64>>(), vec![2.0, 1.0, 0.0, 0.0, 0.0]);
}

#[test]
fn binning_conserves_in_window_spikes() {
    let mut rng = ChaCha12Rng::seed_from_u64(SEED);
    let epochs = vec![
        functional_connectivity::epoch::Epoch::build(0.0, 233.5, "run").unwrap(),
        functional_connectivity::epoch::Epoch::build(233.5, 500.0, "rest").unwrap(),
    ];
    let windows = segment(&epochs, 40.0).unwrap();
    let trains = SpikeTrain::rand(30, 600.0, 0.3, &mut rng).unwrap();

    let counts = count_spikes(&trains, &windows);
    for (i, train) in trains.iter().enumerate() {
        let expected = train.count_in(0.0, 500.0) as f64;
        assert_eq!(counts.row(i).sum(), expected, "neuron {}", i);
    }
}

#[test]
fn synthetic_pipeline_from_edgelists() {
    let dir = tempfile::tempdir().unwrap();
    let chain = dir.path().join("chain.csv");
    let empty = dir.path().join("empty.csv");
    std::fs::write(&chain, "# chain graph\n0 1 0.25\n1 2 0.25\n2 0 0.0\n").unwrap();
    std::fs::write(&empty, "0 1 0.0\n1 2 0.0\n").unwrap();

    let mut generator = SyntheticGenerator::new();
    generator.add_edgelist(&chain, b'#', b' ').unwrap();
    generator.add_edgelist(&empty, b'#', b' ').unwrap();
    assert_eq!(generator.num_nodes(), 3);

    let mut rng = ChaCha12Rng::seed_from_u64(SEED);
    let samples = generator.generate_mvn(&[5, 10], &mut rng).unwrap();
    assert_eq!(samples.shape(), (3, 15));

    let out = dir.path().join("synthetic.csv");
    write_synthetic(&out, &samples, generator.sources()).unwrap();
    let content = std::fs::read_to_string(&out).unwrap();
    let header = content.lines().next().unwrap();
    assert!(header.starts_with("# Data generated from networks: "));
    assert!(header.contains("chain.csv"));
    assert!(header.contains("empty.csv"));
    assert_eq!(content.lines().count(), 4);
}

#[test]
fn mvn_blocks_match_their_covariances() {
    // First graph couples the nodes, second one leaves them independent
    let coupled = EdgeListGraph::new(3, vec![(0, 1, 0.25), (1, 2, 0.25)]).unwrap();
    let independent = EdgeListGraph::new(3, vec![]).unwrap();

    let mut generator = SyntheticGenerator::new();
    generator.add_graph(&coupled).unwrap();
    generator.add_graph(&independent).unwrap();

    let n = 10_000;
    let mut rng = ChaCha12Rng::seed_from_u64(SEED);
    let samples = generator.generate_mvn(&[n, n], &mut rng).unwrap();
    assert_eq!(samples.shape(), (3, 2 * n));

    // Empirical means vanish
    for row in 0..3 {
        assert!(samples.row(row).mean().abs() < 0.05);
    }

    // Each block's empirical covariance converges to its graph's correlation
    for (block, storage) in [
        (samples.view((0, 0), (3, n)), &generator.graphs()[0]),
        (samples.view((0, n), (3, n)), &generator.graphs()[1]),
    ] {
        let cov = empirical_cov(block);
        let expected = storage.correlation();
        assert!(
            (&cov - expected).abs().max() < 0.1,
            "empirical covariance {:.3} vs expected {:.3}",
            cov,
            expected
        );
    }

    // The independent block really is decorrelated
    let cov = empirical_cov(samples.view((0, n), (3, n)));
    assert!(cov[(0, 1)].abs() < 0.05);
    assert!(cov[(1, 2)].abs() < 0.05);
}
