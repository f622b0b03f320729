//! Delimited readers and writers for spike, epoch and synthetic data.
//!
//! Behavioral epochs and spike tables are exported from the recording file
//! by an external tool; this module consumes and produces plain delimited
//! text around the in-memory pipeline.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use itertools::Itertools;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::binning::LabeledCounts;
use crate::epoch::Epoch;
use crate::error::FcError;
use crate::spike_train::SpikeTrain;

/// Read labeled behavioral epochs from a delimited file.
///
/// The file carries a header row followed by `start_time,stop_time,label`
/// records, in time order.
pub fn read_epochs<P: AsRef<Path>>(path: P) -> Result<Vec<Epoch>, FcError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| FcError::Io(format!("Cannot open {}: {}", path.display(), e)))?;

    let mut epochs = Vec::new();
    for (num, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| FcError::Parse(format!("{}, record {}: {}", path.display(), num, e)))?;
        if record.len() < 3 {
            return Err(FcError::Parse(format!(
                "{}, record {}: expected 3 fields, got {}",
                path.display(),
                num,
                record.len()
            )));
        }
        let start: f64 = parse_time(&record[0], path, num)?;
        let stop: f64 = parse_time(&record[1], path, num)?;
        epochs.push(Epoch::build(start, stop, &record[2])?);
    }
    Ok(epochs)
}

/// Read spike trains from a delimited file with one record per neuron:
/// the neuron id followed by its spike times.
pub fn read_spike_trains<P: AsRef<Path>>(path: P) -> Result<Vec<SpikeTrain>, FcError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| FcError::Io(format!("Cannot open {}: {}", path.display(), e)))?;

    let mut trains = Vec::new();
    for (num, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| FcError::Parse(format!("{}, record {}: {}", path.display(), num, e)))?;
        if record.len() == 0 || (record.len() == 1 && record[0].is_empty()) {
            continue;
        }
        let id: usize = record[0].parse().map_err(|e| {
            FcError::Parse(format!(
                "{}, record {}: invalid neuron id {:?}: {}",
                path.display(),
                num,
                &record[0],
                e
            ))
        })?;
        let times = record
            .iter()
            .skip(1)
            .filter(|field| !field.is_empty())
            .map(|field| parse_time(field, path, num))
            .collect::<Result<Vec<f64>, FcError>>()?;
        trains.push(SpikeTrain::build(id, &times)?);
    }
    Ok(trains)
}

fn parse_time(field: &str, path: &Path, num: usize) -> Result<f64, FcError> {
    field.parse().map_err(|e| {
        FcError::Parse(format!(
            "{}, record {}: invalid time {:?}: {}",
            path.display(),
            num,
            field,
            e
        ))
    })
}

/// Write a synthetic sample matrix as comma-delimited rows, preceded by a
/// comment line naming the source graphs.
pub fn write_synthetic<P: AsRef<Path>>(
    path: P,
    samples: &DMatrix<f64>,
    sources: &[String],
) -> Result<(), FcError> {
    let path = path.as_ref();
    let mut file = File::create(path)
        .map_err(|e| FcError::Io(format!("Cannot create {}: {}", path.display(), e)))?;
    writeln!(file, "# Data generated from networks: {}", sources.iter().join(" "))
        .map_err(|e| FcError::Io(format!("Cannot write {}: {}", path.display(), e)))?;

    let mut writer = csv::Writer::from_writer(file);
    for i in 0..samples.nrows() {
        writer
            .write_record(samples.row(i).iter().map(|v| v.to_string()))
            .map_err(|e| FcError::Io(format!("Cannot write {}: {}", path.display(), e)))?;
    }
    writer
        .flush()
        .map_err(|e| FcError::Io(format!("Cannot write {}: {}", path.display(), e)))?;

    log::info!("Saved {}x{} samples to {}", samples.nrows(), samples.ncols(), path.display());
    Ok(())
}

/// The timestamped filename scheme for synthetic data files:
/// `{total}-{count1_count2_...}-n_{num_nodes}-{datetime}.csv`.
pub fn timestamped_synthetic_path(dir: &Path, counts: &[usize], num_nodes: usize) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d%H%M%S");
    let total: usize = counts.iter().sum();
    dir.join(format!(
        "{}-{}-n_{}-{}.csv",
        total,
        counts.iter().join("_"),
        num_nodes,
        stamp
    ))
}

/// Write a labeled count matrix as comma-delimited rows: one record per
/// neuron carrying its id and annotations, one column per window headed
/// `label[start,stop)`.
pub fn write_counts<P: AsRef<Path>>(path: P, counts: &LabeledCounts) -> Result<(), FcError> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| FcError::Io(format!("Cannot create {}: {}", path.display(), e)))?;

    let mut header: Vec<String> = ["neuron", "cell_type", "shank_id", "region"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(
        counts
            .windows()
            .iter()
            .map(|w| format!("{}[{},{})", w.label, w.start, w.stop)),
    );
    writer
        .write_record(&header)
        .map_err(|e| FcError::Io(format!("Cannot write {}: {}", path.display(), e)))?;

    for (row, (id, info)) in counts
        .neuron_ids()
        .iter()
        .zip(counts.neuron_info())
        .enumerate()
    {
        let mut record = vec![
            id.to_string(),
            info.cell_type.clone(),
            info.shank_id.to_string(),
            info.region.clone(),
        ];
        record.extend(counts.counts().row(row).iter().map(|v| v.to_string()));
        writer
            .write_record(&record)
            .map_err(|e| FcError::Io(format!("Cannot write {}: {}", path.display(), e)))?;
    }
    writer
        .flush()
        .map_err(|e| FcError::Io(format!("Cannot write {}: {}", path.display(), e)))?;
    Ok(())
}

/// Summary of one network-inference solver run.
///
/// The solver lives outside this crate; it reports its parameters and
/// convergence results through this structure, which renders them in the
/// two-section human-readable report layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// The solver type name.
    pub solver: String,
    /// The penalty function used by the solver.
    pub penalty_function: String,
    /// The data file the solver ran on.
    pub data_file: String,
    /// The data dimension.
    pub dimension: usize,
    /// The number of temporal blocks.
    pub blocks: usize,
    /// The number of observations in a block.
    pub observations_per_block: usize,
    /// The ADMM step size.
    pub rho: f64,
    /// The temporal consistency penalty.
    pub beta: f64,
    /// The sparsity penalty.
    pub lambda: f64,
    /// The number of worker processes used.
    pub processes: usize,
    /// The solver run time in seconds.
    pub run_time_secs: f64,
    /// The number of iterations to convergence.
    pub iterations: usize,
    /// The temporal deviations between consecutive blocks.
    pub deviations: Vec<f64>,
    /// The normalized temporal deviations between consecutive blocks.
    pub normalized_deviations: Vec<f64>,
}

impl RunReport {
    /// Write the report in the two-section human-readable layout.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), FcError> {
        let path = path.as_ref();
        self.write_inner(path)
            .map_err(|e| FcError::Io(format!("Cannot write report {}: {}", path.display(), e)))
    }

    fn write_inner(&self, path: &Path) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        writeln!(file, "# Information")?;
        writeln!(file, "Run datetime, {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(file, "Data file, {}", self.data_file)?;
        writeln!(file, "Solver type, {}", self.solver)?;
        writeln!(file, "Penalty function, {}", self.penalty_function)?;
        writeln!(file, "Data dimension, {}", self.dimension)?;
        writeln!(file, "Blocks, {}", self.blocks)?;
        writeln!(file, "Observations in a block, {}", self.observations_per_block)?;
        writeln!(file, "Rho, {}", self.rho)?;
        writeln!(file, "Beta, {}", self.beta)?;
        writeln!(file, "Lambda, {}", self.lambda)?;
        writeln!(file, "Processes used, {}", self.processes)?;
        writeln!(file)?;
        writeln!(file, "# Results")?;
        writeln!(file, "Algorithm run time, {} seconds", self.run_time_secs)?;
        writeln!(file, "Iterations to complete, {}", self.iterations)?;
        match self.deviation_ratio() {
            Some(ratio) => {
                writeln!(file, "Temporal deviations ratio (max/mean), {:.3}", ratio)?
            }
            None => writeln!(file, "Temporal deviations ratio (max/mean), -")?,
        }
        write!(file, "Temporal deviations")?;
        for dev in &self.deviations {
            write!(file, ",{:.3}", dev)?;
        }
        writeln!(file)?;
        write!(file, "Normalized temporal deviations")?;
        for dev in &self.normalized_deviations {
            write!(file, ",{:.3}", dev)?;
        }
        writeln!(file)?;
        Ok(())
    }

    /// The ratio of the maximum to the mean temporal deviation, if any.
    pub fn deviation_ratio(&self) -> Option<f64> {
        if self.deviations.is_empty() {
            return None;
        }
        let max = self.deviations.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean: f64 = self.deviations.iter().sum::<f64>() / self.deviations.len() as f64;
        Some(max / mean)
    }

    /// The timestamped filename scheme for report files:
    /// `{solver}_la{lambda}be{beta}_{datetime}.csv`.
    pub fn timestamped_path(&self, dir: &Path) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d%H%M%S");
        dir.join(format!(
            "{}_la{}be{}_{}.csv",
            self.solver, self.lambda as i64, self.beta as i64, stamp
        ))
    }

    /// Serialize the report to a JSON file for machine consumption.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), FcError> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| FcError::Io(format!("Cannot create {}: {}", path.display(), e)))?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| FcError::Io(format!("Cannot write {}: {}", path.display(), e)))
    }

    /// Load a report from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, FcError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| FcError::Io(format!("Cannot open {}: {}", path.display(), e)))?;
        serde_json::from_reader(file)
            .map_err(|e| FcError::Parse(format!("Cannot decode {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::NeuronInfo;
    use crate::epoch::segment;

    fn sample_report() -> RunReport {
        RunReport {
            solver: "TVGL".to_string(),
            penalty_function: "element_wise".to_string(),
            data_file: "synthetic_data/200-100_100-n_3.csv".to_string(),
            dimension: 3,
            blocks: 2,
            observations_per_block: 100,
            rho: 1.0,
            beta: 5.0,
            lambda: 2.0,
            processes: 4,
            run_time_secs: 1.25,
            iterations: 311,
            deviations: vec![0.5, 1.5],
            normalized_deviations: vec![0.25, 0.75],
        }
    }

    #[test]
    fn test_read_epochs() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "start_time,stop_time,label").unwrap();
        writeln!(file, "0.0,250.0,run").unwrap();
        writeln!(file, "250.0,300.0,rest").unwrap();

        let epochs = read_epochs(file.path()).unwrap();
        assert_eq!(epochs.len(), 2);
        assert_eq!(epochs[0], Epoch::build(0.0, 250.0, "run").unwrap());
        assert_eq!(epochs[1].label(), "rest");
    }

    #[test]
    fn test_read_epochs_rejects_malformed_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "start_time,stop_time,label").unwrap();
        writeln!(file, "0.0,soon,run").unwrap();
        assert!(matches!(read_epochs(file.path()), Err(FcError::Parse(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "start_time,stop_time,label").unwrap();
        writeln!(file, "250.0,0.0,run").unwrap();
        assert!(matches!(read_epochs(file.path()), Err(FcError::InvalidEpoch { .. })));
    }

    #[test]
    fn test_read_spike_trains() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0,50.0,150.0,260.0").unwrap();
        writeln!(file, "1").unwrap();
        writeln!(file, "2,10.5").unwrap();

        let trains = read_spike_trains(file.path()).unwrap();
        assert_eq!(trains.len(), 3);
        assert_eq!(trains[0].times(), &[50.0, 150.0, 260.0]);
        assert_eq!(trains[1].num_spikes(), 0);
        assert_eq!(trains[2].times(), &[10.5]);
    }

    #[test]
    fn test_write_synthetic_names_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("synthetic.csv");
        let samples = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let sources = vec!["networks/a.csv".to_string(), "networks/b.csv".to_string()];

        write_synthetic(&path, &samples, &sources).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "# Data generated from networks: networks/a.csv networks/b.csv"
        );
        assert_eq!(lines.next().unwrap(), "1,2,3");
        assert_eq!(lines.next().unwrap(), "4,5,6");
    }

    #[test]
    fn test_timestamped_synthetic_path() {
        let path = timestamped_synthetic_path(Path::new("synthetic_data"), &[100, 100], 3);
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("200-100_100-n_3-"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn test_write_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.csv");

        let epochs = vec![Epoch::build(0.0, 250.0, "run").unwrap()];
        let windows = segment(&epochs, 100.0).unwrap();
        let trains = vec![SpikeTrain::build(0, &[50.0, 150.0]).unwrap()];
        let info = vec![NeuronInfo {
            cell_type: "pyr".to_string(),
            shank_id: 2,
            region: "CA1".to_string(),
        }];
        let counts = LabeledCounts::build(&trains, &windows, info).unwrap();

        write_counts(&path, &counts).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("neuron,cell_type,shank_id,region"));
        assert!(header.contains("run[0,100)"));
        assert_eq!(lines.next().unwrap(), "0,pyr,2,CA1,1,1,0");
    }

    #[test]
    fn test_run_report_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let report = sample_report();

        report.write(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Information"));
        assert!(content.contains("Solver type, TVGL"));
        assert!(content.contains("# Results"));
        assert!(content.contains("Iterations to complete, 311"));
        assert!(content.contains("Temporal deviations ratio (max/mean), 1.500"));
        assert!(content.contains("Temporal deviations,0.500,1.500"));
    }

    #[test]
    fn test_run_report_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = sample_report();

        report.save_json(&path).unwrap();
        assert_eq!(RunReport::load_json(&path).unwrap(), report);
    }

    #[test]
    fn test_run_report_timestamped_path() {
        let name = sample_report()
            .timestamped_path(Path::new("results"))
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        assert!(name.starts_with("TVGL_la2be5_"));
        assert!(name.ends_with(".csv"));
    }
}
