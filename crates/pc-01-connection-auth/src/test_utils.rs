//! Test utilities for downstream crates.

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::domain::Credential;
use crate::ports::Authorizer;

/// Authorizer wrapper that counts how often it was consulted.
#[derive(Debug, Clone)]
pub struct CountingAuthorizer<A> {
    inner: A,
    calls: Arc<AtomicUsize>,
}

impl<A: Authorizer> CountingAuthorizer<A> {
    /// Wrap `inner`.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter, readable after the authorizer has been moved away.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Number of decisions made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<A: Authorizer> Authorizer for CountingAuthorizer<A> {
    fn authorize(&self, credential: &Credential) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.authorize(credential)
    }
}

/// Byte counters shared by a [`ByteCountingStream`] and the test.
#[derive(Debug, Clone, Default)]
pub struct ByteCounters {
    read: Arc<AtomicUsize>,
    written: Arc<AtomicUsize>,
}

impl ByteCounters {
    /// Bytes read through the stream so far.
    pub fn read(&self) -> usize {
        self.read.load(Ordering::SeqCst)
    }

    /// Bytes written through the stream so far.
    pub fn written(&self) -> usize {
        self.written.load(Ordering::SeqCst)
    }
}

/// Stream wrapper that counts bytes in both directions.
#[derive(Debug)]
pub struct ByteCountingStream<S> {
    inner: S,
    counters: ByteCounters,
}

impl<S> ByteCountingStream<S> {
    /// Wrap `inner`, returning the wrapper and its counters.
    pub fn new(inner: S) -> (Self, ByteCounters) {
        let counters = ByteCounters::default();
        (
            Self {
                inner,
                counters: counters.clone(),
            },
            counters,
        )
    }

    /// Unwrap the inner stream.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for ByteCountingStream<S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let poll = Pin::new(&mut self.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = &poll {
            let n = buf.filled().len() - before;
            self.counters.read.fetch_add(n, Ordering::SeqCst);
        }
        poll
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for ByteCountingStream<S> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let poll = Pin::new(&mut self.inner).poll_write(cx, buf);
        if let Poll::Ready(Ok(n)) = &poll {
            self.counters.written.fetch_add(*n, Ordering::SeqCst);
        }
        poll
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}
