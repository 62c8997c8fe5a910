use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::event::Event;

/// Sink for simulation events. `emit` must not fail the tick on transient
/// I/O trouble; sinks deal with (or log) their own errors. `close` flushes
/// and is safe to call more than once.
pub trait EventExporter {
    fn emit(&mut self, event: &Event);
    fn close(&mut self);
}

// --- JSON Lines file sink ---

/// Appends one JSON object per line to a file, flushed per event.
pub struct JsonlExporter {
    path: PathBuf,
    writer: Option<BufWriter<std::fs::File>>,
}

impl JsonlExporter {
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
        })
    }

    fn write_line(&mut self, event: &Event) -> io::Result<()> {
        if let Some(w) = self.writer.as_mut() {
            serde_json::to_writer(&mut *w, event)?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}

impl EventExporter for JsonlExporter {
    fn emit(&mut self, event: &Event) {
        if let Err(e) = self.write_line(event) {
            log::warn!("jsonl write to {} failed: {}", self.path.display(), e);
        }
    }

    fn close(&mut self) {
        if let Some(mut w) = self.writer.take() {
            if let Err(e) = w.flush() {
                log::warn!("jsonl flush of {} failed: {}", self.path.display(), e);
            }
        }
    }
}

// --- Remote ingestion placeholder ---

/// Configuration for a future remote bulk-ingestion sink.
#[derive(Debug, Clone, Default)]
pub struct RemoteConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub index: Option<String>,
    pub batch_size: usize,
    pub verify_certs: bool,
}

impl RemoteConfig {
    pub fn enabled(&self) -> bool {
        self.endpoint.is_some() && self.index.is_some()
    }
}

/// Placeholder sink: batches events and drops them with a single warning.
/// Performs no network I/O; wire up the bulk call here to activate ingestion.
pub struct RemoteTemplateExporter {
    config: RemoteConfig,
    buffer: Vec<Event>,
    warned: bool,
}

impl RemoteTemplateExporter {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config,
            buffer: Vec::new(),
            warned: false,
        }
    }

    fn drop_batch(&mut self) {
        if !self.warned {
            self.warned = true;
            log::warn!(
                "remote ingestion not implemented, discarding {} buffered events (endpoint {:?}, index {:?})",
                self.buffer.len(),
                self.config.endpoint,
                self.config.index,
            );
        }
        self.buffer.clear();
    }

    #[cfg(test)]
    fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

impl EventExporter for RemoteTemplateExporter {
    fn emit(&mut self, event: &Event) {
        if !self.config.enabled() {
            return;
        }
        self.buffer.push(event.clone());
        if self.buffer.len() >= self.config.batch_size.max(1) {
            self.drop_batch();
        }
    }

    fn close(&mut self) {
        if !self.buffer.is_empty() {
            self.drop_batch();
        }
    }
}

// --- Fan-out ---

/// Treats a group of sinks as one.
pub struct MultiExporter {
    exporters: Vec<Box<dyn EventExporter>>,
}

impl MultiExporter {
    pub fn new(exporters: Vec<Box<dyn EventExporter>>) -> Self {
        Self { exporters }
    }
}

impl EventExporter for MultiExporter {
    fn emit(&mut self, event: &Event) {
        for exp in &mut self.exporters {
            exp.emit(event);
        }
    }

    fn close(&mut self) {
        for exp in &mut self.exporters {
            exp.close();
        }
    }
}
