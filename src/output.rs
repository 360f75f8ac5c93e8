//! Output formatting and persistence for analysis results.
//!
//! Supports serde CSV records, tables with a dynamic header, and JSON
//! summaries, each optionally gzip-compressed.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Rows of text under a header that is only known at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(header: impl IntoIterator<Item = String>) -> Self {
        Self {
            header: header.into_iter().collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

enum FileSink {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl FileSink {
    fn create(path: &Path, gzip: bool) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let buffered = BufWriter::new(file);
        Ok(if gzip {
            FileSink::Gzip(GzEncoder::new(buffered, Compression::default()))
        } else {
            FileSink::Plain(buffered)
        })
    }

    /// Flushes everything, writing the gzip trailer if compressing.
    fn finish(self) -> Result<()> {
        match self {
            FileSink::Plain(mut w) => w.flush()?,
            FileSink::Gzip(encoder) => encoder.finish()?.flush()?,
        }
        Ok(())
    }
}

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileSink::Plain(w) => w.write(buf),
            FileSink::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileSink::Plain(w) => w.flush(),
            FileSink::Gzip(w) => w.flush(),
        }
    }
}

/// A results directory. File names get a `.gz` suffix when compressing.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
    gzip: bool,
}

impl OutputDir {
    /// Creates `root` (and parents) if it does not exist.
    pub fn create(root: impl Into<PathBuf>, gzip: bool) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("creating output directory {}", root.display()))?;
        Ok(Self { root, gzip })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        if self.gzip {
            self.root.join(format!("{name}.gz"))
        } else {
            self.root.join(name)
        }
    }

    /// Writes `records` as CSV, header taken from the serde field names.
    pub fn write_records<T: Serialize>(&self, name: &str, records: &[T]) -> Result<PathBuf> {
        let path = self.path(name);
        let mut writer = WriterBuilder::new().from_writer(FileSink::create(&path, self.gzip)?);
        for record in records {
            writer.serialize(record)?;
        }
        finish_csv(writer)?;

        debug!(path = %path.display(), rows = records.len(), "Wrote CSV records");
        Ok(path)
    }

    pub fn write_table(&self, name: &str, table: &Table) -> Result<PathBuf> {
        let path = self.path(name);
        let mut writer = WriterBuilder::new()
            .flexible(false)
            .from_writer(FileSink::create(&path, self.gzip)?);
        writer.write_record(&table.header)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        finish_csv(writer)?;

        debug!(path = %path.display(), rows = table.rows.len(), "Wrote CSV table");
        Ok(path)
    }

    /// Writes `value` as pretty-printed JSON.
    pub fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let path = self.path(name);
        let mut sink = FileSink::create(&path, self.gzip)?;
        serde_json::to_writer_pretty(&mut sink, value)?;
        sink.finish()?;

        debug!(path = %path.display(), "Wrote JSON");
        Ok(path)
    }
}

fn finish_csv(writer: csv::Writer<FileSink>) -> Result<()> {
    let sink = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV writer: {}", e.error()))?;
    sink.finish()
}
