//! Offline state export, decoupled from the real-time path.
//!
//! A [`StateLogger`] owns a bounded channel and a writer thread. The
//! producer side hands over one record per sample with `try_send`; if the
//! writer falls behind, records are dropped and counted rather than ever
//! blocking the caller. Building a record allocates, so recording is a
//! verification affordance, not something to enable in production audio
//! use.
//!
//! Output format: one delimited text line per sample per stream —
//! `u.txt` and `w.txt` carry the segment displacements, `grid.txt` the
//! per-sample grid quantities (`sample;alpha;m;mw`).

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Sender};
use tracing::{info, warn};

use crate::error::{Result, StringError};
use crate::simulation::string::DynamicString;

/// One sample's worth of exported state.
#[derive(Debug, Clone)]
pub struct StateRecord {
    /// Sample index since recording started.
    pub sample: u64,
    /// Fractional junction offset.
    pub alpha: f64,
    /// Segment 1 point count.
    pub m: usize,
    /// Segment 2 point count.
    pub mw: usize,
    /// Segment 1 current-slice values.
    pub u: Vec<f64>,
    /// Segment 2 current-slice values.
    pub w: Vec<f64>,
}

impl StateRecord {
    /// Capture the current state of a string.
    pub fn capture(string: &DynamicString, sample: u64) -> Self {
        let layout = string.layout();
        Self {
            sample,
            alpha: layout.alpha,
            m: layout.m,
            mw: layout.mw,
            u: string.segment_u().to_vec(),
            w: string.segment_w().to_vec(),
        }
    }
}

/// Channel capacity before records are dropped.
const QUEUE_CAPACITY: usize = 64;

/// Buffered, threaded writer for per-sample state records.
pub struct StateLogger {
    sender: Option<Sender<StateRecord>>,
    dropped: Arc<AtomicU64>,
    writer: Option<JoinHandle<Result<()>>>,
}

impl StateLogger {
    /// Create the output directory and start the writer thread.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let (sender, receiver) = bounded::<StateRecord>(QUEUE_CAPACITY);
        let dropped = Arc::new(AtomicU64::new(0));

        let writer = std::thread::Builder::new()
            .name("dynastring-statelog".into())
            .spawn(move || -> Result<()> {
                let mut u_out = BufWriter::new(File::create(dir.join("u.txt"))?);
                let mut w_out = BufWriter::new(File::create(dir.join("w.txt"))?);
                let mut grid_out = BufWriter::new(File::create(dir.join("grid.txt"))?);

                for record in receiver {
                    write_values(&mut u_out, &record.u)?;
                    write_values(&mut w_out, &record.w)?;
                    writeln!(
                        grid_out,
                        "{};{};{};{}",
                        record.sample, record.alpha, record.m, record.mw
                    )?;
                }
                u_out.flush()?;
                w_out.flush()?;
                grid_out.flush()?;
                Ok(())
            })
            .map_err(|e| StringError::diagnostics(format!("failed to spawn writer: {}", e)))?;

        Ok(Self {
            sender: Some(sender),
            dropped,
            writer: Some(writer),
        })
    }

    /// Capture and enqueue one record. Never blocks: on a full queue the
    /// record is dropped and counted.
    pub fn record(&self, string: &DynamicString, sample: u64) {
        let record = StateRecord::capture(string, sample);
        if let Some(sender) = &self.sender {
            if sender.try_send(record).is_err() {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Records dropped because the writer fell behind.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Close the channel, wait for the writer to drain and report the
    /// drop count.
    pub fn finish(mut self) -> Result<()> {
        self.sender.take();
        let result = match self.writer.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| StringError::diagnostics("writer thread panicked"))?,
            None => Ok(()),
        };
        let dropped = self.dropped();
        if dropped > 0 {
            warn!("state logger dropped {} records", dropped);
        } else {
            info!("state logger finished without drops");
        }
        result
    }
}

impl Drop for StateLogger {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.writer.take() {
            let _ = handle.join();
        }
    }
}

fn write_values(out: &mut impl Write, values: &[f64]) -> Result<()> {
    let mut first = true;
    for value in values {
        if first {
            first = false;
        } else {
            write!(out, ";")?;
        }
        write!(out, "{}", value)?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::physics::StringConfig;

    #[test]
    fn test_logger_writes_one_line_per_sample() {
        let dir = std::env::temp_dir().join("dynastring-statelog-test");
        let _ = fs::remove_dir_all(&dir);

        let mut string = DynamicString::new(
            StringConfig::new(600.0, 1.0, 44_100.0, 200).unwrap(),
        )
        .unwrap();
        let logger = StateLogger::create(&dir).unwrap();

        for sample in 0..10 {
            string.advance();
            string.rotate();
            logger.record(&string, sample);
            // Keep the bounded queue from overflowing in this tight loop.
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        logger.finish().unwrap();

        let grid = fs::read_to_string(dir.join("grid.txt")).unwrap();
        let u = fs::read_to_string(dir.join("u.txt")).unwrap();
        assert_eq!(grid.lines().count(), 10);
        assert_eq!(u.lines().count(), 10);

        let first: Vec<&str> = grid.lines().next().unwrap().split(';').collect();
        assert_eq!(first.len(), 4, "grid line is sample;alpha;m;mw");
        assert_eq!(first[2], "37");
        assert_eq!(first[3], "36");

        let _ = fs::remove_dir_all(&dir);
    }
}
