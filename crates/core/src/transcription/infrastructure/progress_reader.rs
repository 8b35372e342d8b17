use std::io::{self, Read};

use crate::transcription::domain::transcription_api::ProgressFn;

/// Wraps a reader and reports the share of `total` bytes consumed so far.
///
/// Nothing is reported when `total` is 0, since no percentage can be derived.
pub struct ProgressReader<R> {
    inner: R,
    read: u64,
    total: u64,
    on_progress: Option<ProgressFn>,
}

impl<R: Read> ProgressReader<R> {
    pub fn new(inner: R, total: u64, on_progress: Option<ProgressFn>) -> Self {
        Self {
            inner,
            read: 0,
            total,
            on_progress,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.read
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.read += n as u64;
            if let Some(ref cb) = self.on_progress {
                if self.total > 0 {
                    let pct = (self.read as f64 * 100.0 / self.total as f64).min(100.0);
                    cb(pct);
                }
            }
        }
        Ok(n)
    }
}
