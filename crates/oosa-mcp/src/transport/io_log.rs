//! Raw I/O interception for command logging.
//!
//! [`LoggedReader`] and [`LoggedWriter`] wrap a byte stream and report every
//! read and write to an [`IoSink`] while passing the bytes through untouched.
//! One record is emitted per underlying `poll_read` that produced data and per
//! `poll_write` that accepted data. Errors from the wrapped stream are
//! returned as-is.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Tracing target used by [`TracingSink`].
pub const IO_LOG_TARGET: &str = "oosa_mcp::io";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Read => f.write_str("read"),
            Direction::Write => f.write_str("write"),
        }
    }
}

/// One intercepted read or write.
#[derive(Debug, Clone)]
pub struct IoRecord {
    pub at: DateTime<Utc>,
    pub direction: Direction,
    pub payload: Vec<u8>,
}

impl IoRecord {
    fn now(direction: Direction, payload: &[u8]) -> Self {
        Self {
            at: Utc::now(),
            direction,
            payload: payload.to_vec(),
        }
    }
}

/// Destination for intercepted I/O records.
pub trait IoSink: Send + Sync {
    fn record(&self, record: IoRecord);
}

/// Emits each record as a `tracing` event on [`IO_LOG_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl IoSink for TracingSink {
    fn record(&self, record: IoRecord) {
        tracing::info!(
            target: IO_LOG_TARGET,
            at = %record.at.to_rfc3339(),
            direction = %record.direction,
            bytes = record.payload.len(),
            payload = %String::from_utf8_lossy(&record.payload),
        );
    }
}

pub struct LoggedReader<R> {
    inner: R,
    sink: Arc<dyn IoSink>,
}

pub struct LoggedWriter<W> {
    inner: W,
    sink: Arc<dyn IoSink>,
}

/// Wrap a reader/writer pair so both directions report to `sink`.
pub fn intercept<R, W>(
    reader: R,
    writer: W,
    sink: Arc<dyn IoSink>,
) -> (LoggedReader<R>, LoggedWriter<W>) {
    (
        LoggedReader {
            inner: reader,
            sink: sink.clone(),
        },
        LoggedWriter {
            inner: writer,
            sink,
        },
    )
}

impl<R> LoggedReader<R> {
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<W> LoggedWriter<W> {
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for LoggedReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();

        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = poll {
            let read = &buf.filled()[before..];
            if !read.is_empty() {
                this.sink.record(IoRecord::now(Direction::Read, read));
            }
        }
        poll
    }
}

impl<W: AsyncWrite + Unpin> AsyncWrite for LoggedWriter<W> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();

        let poll = Pin::new(&mut this.inner).poll_write(cx, buf);
        if let Poll::Ready(Ok(written)) = poll {
            if let Some(accepted) = buf.get(..written).filter(|b| !b.is_empty()) {
                this.sink.record(IoRecord::now(Direction::Write, accepted));
            }
        }
        poll
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
