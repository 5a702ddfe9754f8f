//! Append-only record of a solver run: its parameters and every published
//! improvement, writable in a plain text log layout.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use crate::solution::TourMatrix;

/// Value of a logged run parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Integer(i64),
    Float(f64),
}

/// One published best-so-far solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Milliseconds since the run started
    pub elapsed_ms: u128,
    pub vehicle_count: usize,
    pub distance: f64,
    pub tours: Vec<isize>,
}

/// Collects the history of a run. Safe to share between colony threads.
#[derive(Debug)]
pub struct SolutionLogger {
    algorithm: String,
    parameters: Vec<(String, ParameterValue)>,
    started: Instant,
    entries: Mutex<Vec<LogEntry>>,
}

impl Default for SolutionLogger {
    fn default() -> Self {
        SolutionLogger::new()
    }
}

impl SolutionLogger {
    pub fn new() -> Self {
        SolutionLogger {
            algorithm: String::new(),
            parameters: Vec::new(),
            started: Instant::now(),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Begin a new run, discarding earlier parameters and entries.
    pub fn start(&mut self, algorithm: &str) {
        self.algorithm = algorithm.to_string();
        self.parameters.clear();
        self.entries.get_mut().clear();
        self.started = Instant::now();
    }

    pub fn add_parameter(&mut self, name: &str, value: ParameterValue) {
        self.parameters.push((name.to_string(), value));
    }

    /// Record a published solution.
    pub fn add(&self, vehicle_count: usize, distance: f64, tours: &TourMatrix) {
        let entry = LogEntry {
            elapsed_ms: self.started.elapsed().as_millis(),
            vehicle_count,
            distance,
            tours: tours.to_flat(),
        };
        self.entries.lock().push(entry);
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn parameters(&self) -> &[(String, ParameterValue)] {
        &self.parameters
    }

    /// Snapshot of the recorded solutions, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Write the log to a file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "# {}", self.algorithm)?;
        writeln!(writer, "# parameters")?;
        for (name, value) in &self.parameters {
            match value {
                ParameterValue::Integer(v) => writeln!(writer, "{} = {}", name, v)?,
                ParameterValue::Float(v) => writeln!(writer, "{} = {:.6}", name, v)?,
            }
        }

        writeln!(writer, "# solutions")?;
        for entry in self.entries.lock().iter() {
            write!(
                writer,
                "{};{};{:.6};",
                entry.elapsed_ms, entry.vehicle_count, entry.distance
            )?;
            for customer in &entry.tours {
                write!(writer, "{};", customer)?;
            }
            writeln!(writer)?;
        }
        writeln!(writer, "# EOF")
    }
}
