//! Run Writer
//!
//! Append-only per-tick export streams in one output directory.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use strain_events::INFECTIONS_CSV_HEADER;

use crate::systems::TickReport;

pub const SPREAD_FILE: &str = "spread.jsonl";
pub const AGENTS_FILE: &str = "agents.jsonl";
pub const INFECTIONS_FILE: &str = "infections.csv";
pub const COUNTS_FILE: &str = "counts.jsonl";
pub const EDGES_FILE: &str = "edges.txt";
pub const SPREADERS_FILE: &str = "spreaders.json";
pub const CENTRALITY_FILE: &str = "centrality.json";
pub const SUMMARY_FILE: &str = "summary.json";

fn create(path: &Path) -> std::io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    Ok(BufWriter::new(file))
}

struct Streams {
    spread: BufWriter<File>,
    agents: Option<BufWriter<File>>,
    infections: BufWriter<File>,
    counts: BufWriter<File>,
}

/// Writes tick reports to the per-tick export files
pub struct RunWriter {
    dir: Option<PathBuf>,
    streams: Option<Streams>,
    ticks_written: u64,
    infections_written: u64,
}

impl RunWriter {
    /// Create the output directory and truncate every stream file in it.
    ///
    /// `agents.jsonl` is only created when `agent_dumps` is set.
    pub fn new(dir: impl AsRef<Path>, agent_dumps: bool) -> std::io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut infections = create(&dir.join(INFECTIONS_FILE))?;
        writeln!(infections, "{}", INFECTIONS_CSV_HEADER)?;

        let agents = if agent_dumps {
            Some(create(&dir.join(AGENTS_FILE))?)
        } else {
            None
        };

        Ok(Self {
            dir: Some(dir.to_path_buf()),
            streams: Some(Streams {
                spread: create(&dir.join(SPREAD_FILE))?,
                agents,
                infections,
                counts: create(&dir.join(COUNTS_FILE))?,
            }),
            ticks_written: 0,
            infections_written: 0,
        })
    }

    /// Create a writer that discards everything (for testing)
    pub fn null() -> Self {
        Self {
            dir: None,
            streams: None,
            ticks_written: 0,
            infections_written: 0,
        }
    }

    /// Output directory, `None` for the null writer
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Path of a file inside the output directory
    pub fn path(&self, file: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(file))
    }

    pub fn ticks_written(&self) -> u64 {
        self.ticks_written
    }

    pub fn infections_written(&self) -> u64 {
        self.infections_written
    }

    /// Append one tick to every stream
    pub fn write_tick(&mut self, report: &TickReport) -> std::io::Result<()> {
        self.ticks_written += 1;
        self.infections_written += report.infections.len() as u64;

        let Some(streams) = self.streams.as_mut() else {
            return Ok(());
        };

        for snapshot in &report.snapshots {
            writeln!(streams.spread, "{}", snapshot.to_jsonl()?)?;
        }
        writeln!(streams.counts, "{}", report.counts.to_jsonl()?)?;
        for event in &report.infections {
            writeln!(streams.infections, "{}", event.to_csv_row())?;
        }
        if let Some(agents) = streams.agents.as_mut() {
            for dump in &report.agents {
                writeln!(agents, "{}", dump.to_jsonl()?)?;
            }
        }
        Ok(())
    }

    /// Flush the buffers to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(streams) = self.streams.as_mut() {
            streams.spread.flush()?;
            streams.infections.flush()?;
            streams.counts.flush()?;
            if let Some(agents) = streams.agents.as_mut() {
                agents.flush()?;
            }
        }
        Ok(())
    }
}

impl Drop for RunWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush run writer: {}", e);
        }
    }
}
