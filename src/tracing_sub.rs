use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::Level;

/// Where log lines end up.
#[derive(Debug, Clone)]
pub enum LogTarget {
    /// Append to the file at this path, creating it if needed.
    File(PathBuf),
    Stderr,
    /// Drop everything. Used while a full-screen UI owns the terminal.
    Discard,
}

pub struct DelegatingWriter {
    inner: DelegatingInner,
}

enum DelegatingInner {
    File(Arc<File>),
    Stderr(io::Stderr),
    Discard(io::Sink),
}

impl DelegatingWriter {
    fn new(sink: &Sink) -> Self {
        let inner = match sink {
            Sink::File(file) => DelegatingInner::File(Arc::clone(file)),
            Sink::Stderr => DelegatingInner::Stderr(io::stderr()),
            Sink::Discard => DelegatingInner::Discard(io::sink()),
        };
        DelegatingWriter { inner }
    }
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            DelegatingInner::File(f) => (&**f).write(buf),
            DelegatingInner::Stderr(s) => s.write(buf),
            DelegatingInner::Discard(d) => d.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            DelegatingInner::File(f) => (&**f).flush(),
            DelegatingInner::Stderr(s) => s.flush(),
            DelegatingInner::Discard(d) => d.flush(),
        }
    }
}

#[derive(Debug, Clone)]
enum Sink {
    File(Arc<File>),
    Stderr,
    Discard,
}

#[derive(Clone, Debug)]
pub struct SubscriberMakeWriter {
    sink: Sink,
}

impl SubscriberMakeWriter {
    pub fn open(target: &LogTarget) -> io::Result<Self> {
        let sink = match target {
            LogTarget::File(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Sink::File(Arc::new(file))
            }
            LogTarget::Stderr => Sink::Stderr,
            LogTarget::Discard => Sink::Discard,
        };
        Ok(Self { sink })
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DelegatingWriter::new(&self.sink)
    }
}

/// Initialize the global tracing subscriber to write to `target`. Safe to call
/// multiple times; subsequent calls are no-ops for the global subscriber.
///
/// Fails only when a log file was requested and could not be opened.
pub fn init_default(target: &LogTarget) -> io::Result<()> {
    let writer = SubscriberMakeWriter::open(target)?;
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_writer(writer)
        .with_target(false)
        .with_thread_names(false)
        .with_ansi(matches!(target, LogTarget::Stderr))
        .try_init();
    Ok(())
}
