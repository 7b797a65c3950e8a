//! Bucket writer
//!
//! Sole owner of the output streams for one pass. Each disposition becomes
//! exactly one line in its bucket and bumps the matching counter. Output is
//! buffered and flushed every `flush_every` records, so an abnormal exit
//! loses at most that many records; [`BucketWriter::finish`] flushes the
//! rest.
//!
//! File mode writes four files. Streaming mode sends validated lines to
//! standard output and every other disposition, tagged with its bucket, to
//! standard error.

use crate::models::{Bucket, Disposition, PassStats};
use lexv_common::buckets::BucketPaths;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::debug;

type Sink = BufWriter<Box<dyn AsyncWrite + Send + Unpin>>;

enum Diagnostics {
    /// One file per bucket
    Files {
        nonexistent: Sink,
        hard_rejected: Sink,
        retry: Sink,
    },
    /// Single stream, lines prefixed `[BUCKET] `
    Tagged(Sink),
}

pub struct BucketWriter {
    validated: Sink,
    diagnostics: Diagnostics,
    flush_every: usize,
    since_flush: usize,
}

fn sink<W: AsyncWrite + Send + Unpin + 'static>(writer: W) -> Sink {
    BufWriter::new(Box::new(writer))
}

async fn open_append(path: &Path) -> std::io::Result<Sink> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))?;
    Ok(sink(file))
}

impl BucketWriter {
    /// Open (creating if needed) all four bucket files in append mode
    pub async fn open_files(paths: &BucketPaths, flush_every: usize) -> std::io::Result<Self> {
        Ok(Self {
            validated: open_append(&paths.validated).await?,
            diagnostics: Diagnostics::Files {
                nonexistent: open_append(&paths.nonexistent).await?,
                hard_rejected: open_append(&paths.hard_rejected).await?,
                retry: open_append(&paths.retry).await?,
            },
            flush_every: flush_every.max(1),
            since_flush: 0,
        })
    }

    /// Validated to standard output, everything else tagged to standard error
    pub fn streaming(flush_every: usize) -> Self {
        Self::tagged(tokio::io::stdout(), tokio::io::stderr(), flush_every)
    }

    /// Streaming layout over arbitrary writers
    pub fn tagged<V, D>(validated: V, diagnostics: D, flush_every: usize) -> Self
    where
        V: AsyncWrite + Send + Unpin + 'static,
        D: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            validated: sink(validated),
            diagnostics: Diagnostics::Tagged(sink(diagnostics)),
            flush_every: flush_every.max(1),
            since_flush: 0,
        }
    }

    /// Append one disposition and count it
    pub async fn write(
        &mut self,
        disposition: &Disposition,
        stats: &mut PassStats,
    ) -> std::io::Result<()> {
        let bucket = disposition.bucket();
        let mut line = disposition.to_line();
        line.push('\n');

        let out = match (&mut self.diagnostics, bucket) {
            (_, Bucket::Validated) => &mut self.validated,
            (Diagnostics::Tagged(stream), _) => {
                line = format!("[{}] {}", bucket.tag(), line);
                stream
            }
            (Diagnostics::Files { nonexistent, .. }, Bucket::Nonexistent) => nonexistent,
            (Diagnostics::Files { hard_rejected, .. }, Bucket::HardRejected) => hard_rejected,
            (Diagnostics::Files { retry, .. }, Bucket::Retry) => retry,
        };
        out.write_all(line.as_bytes()).await?;

        stats.record(bucket, disposition.word());

        self.since_flush += 1;
        if self.since_flush >= self.flush_every {
            self.flush().await?;
        }
        Ok(())
    }

    /// Push buffered lines to the underlying streams
    pub async fn flush(&mut self) -> std::io::Result<()> {
        self.validated.flush().await?;
        match &mut self.diagnostics {
            Diagnostics::Files {
                nonexistent,
                hard_rejected,
                retry,
            } => {
                nonexistent.flush().await?;
                hard_rejected.flush().await?;
                retry.flush().await?;
            }
            Diagnostics::Tagged(stream) => stream.flush().await?,
        }
        debug!(records = self.since_flush, "Flushed bucket streams");
        self.since_flush = 0;
        Ok(())
    }

    /// Final flush at the end of a pass
    pub async fn finish(mut self) -> std::io::Result<()> {
        self.flush().await
    }
}
