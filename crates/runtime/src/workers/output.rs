//! Per-agent capture of diagnostic output.
use std::io;
use std::sync::{Arc, Mutex};

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Shared in-memory buffer that agent `tracing` events are written into
/// while the agent is muted.
#[derive(Clone, Debug, Default)]
pub(crate) struct OutputSink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl OutputSink {
    /// Subscriber installed for the duration of one agent callback.
    pub(crate) fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(Level::TRACE)
            .finish()
    }

    pub(crate) fn contents(&self) -> String {
        match self.buffer.lock() {
            Ok(buffer) => String::from_utf8_lossy(&buffer).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }
}

impl io::Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .map_err(|_| io::Error::other("agent output buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for OutputSink {
    type Writer = OutputSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
