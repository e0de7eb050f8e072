//! Telemetry records from running devices.
//!
//! A record is one line: the device identifier followed by the device's
//! condition flags and then its values, in declaration order and separated
//! by spaces. A condition named `Compare` has no field. Flags are `1` for
//! true and anything else for false; they are stored as `1.0` and `0.0`.
//!
//! ```text
//! _Button_1 1 0
//! _Weather 0 21.50 48.0
//! ```

use std::collections::HashMap;

use gizmo_core::{device_identifier, ValueRef};

use crate::error::FeedError;
use crate::live::Reading;

/// Name of the condition that is evaluated host-side and never reported.
pub const COMPARE_CONDITION: &str = "Compare";

/// Field order of one device's telemetry record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceLayout {
    pub device: String,
    pub conditions: Vec<String>,
    pub values: Vec<String>,
}

impl DeviceLayout {
    pub fn new(device: impl Into<String>, conditions: Vec<String>, values: Vec<String>) -> Self {
        DeviceLayout {
            device: device.into(),
            conditions,
            values,
        }
    }

    /// The record prefix, identical to the generated variable name.
    pub fn token(&self) -> String {
        device_identifier(&self.device)
    }

    fn reported_conditions(&self) -> impl Iterator<Item = &String> {
        self.conditions.iter().filter(|c| c.as_str() != COMPARE_CONDITION)
    }

    /// Number of fields after the token.
    pub fn arity(&self) -> usize {
        self.reported_conditions().count() + self.values.len()
    }

    /// Turns the fields after the token into readings.
    pub fn parse_fields(&self, fields: &[&str]) -> Result<Vec<Reading>, FeedError> {
        if fields.len() != self.arity() {
            return Err(FeedError::Arity {
                device: self.device.clone(),
                expected: self.arity(),
                found: fields.len(),
            });
        }

        let mut readings = Vec::with_capacity(fields.len());
        let mut fields = fields.iter().enumerate();
        for condition in self.reported_conditions() {
            if let Some((_, text)) = fields.next() {
                let flag = if *text == "1" { 1.0 } else { 0.0 };
                readings.push(Reading::new(ValueRef::new(&self.device, condition), flag));
            }
        }
        for value in &self.values {
            if let Some((index, text)) = fields.next() {
                let v: f64 = text.parse().map_err(|_| FeedError::BadNumber {
                    device: self.device.clone(),
                    index,
                    text: text.to_string(),
                })?;
                readings.push(Reading::new(ValueRef::new(&self.device, value), v));
            }
        }
        Ok(readings)
    }
}

/// Dispatches records to device layouts by token.
#[derive(Debug, Clone, Default)]
pub struct FeedParser {
    layouts: HashMap<String, DeviceLayout>,
}

impl FeedParser {
    pub fn new(layouts: impl IntoIterator<Item = DeviceLayout>) -> Self {
        FeedParser {
            layouts: layouts.into_iter().map(|l| (l.token(), l)).collect(),
        }
    }

    pub fn add(&mut self, layout: DeviceLayout) {
        self.layouts.insert(layout.token(), layout);
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn parse_line(&self, line: &str) -> Result<Vec<Reading>, FeedError> {
        let mut parts = line.split_whitespace();
        let token = parts.next().ok_or(FeedError::Empty)?;
        let layout = self
            .layouts
            .get(token)
            .ok_or_else(|| FeedError::UnknownDevice {
                token: token.to_string(),
            })?;
        let fields: Vec<&str> = parts.collect();
        layout.parse_fields(&fields)
    }
}

// ──────────────────────────────────────────────
// Async reader
// ──────────────────────────────────────────────

#[cfg(feature = "feed")]
pub use reader::{
    run_feed, run_feed_with, FeedStats, LineSource, TelemetrySource, MAX_RECORD_LEN,
};

#[cfg(feature = "feed")]
mod reader {
    use async_trait::async_trait;
    use tokio::io::{AsyncBufRead, AsyncBufReadExt};

    use super::FeedParser;
    use crate::error::FeedError;
    use crate::live::LiveValueCache;

    /// Asynchronous source of telemetry lines.
    #[async_trait]
    pub trait TelemetrySource: Send {
        /// The next non-empty line, or `None` at end of stream.
        async fn next_line(&mut self) -> Result<Option<String>, FeedError>;
    }

    /// Longest record [`LineSource::new`] accepts, in bytes.
    pub const MAX_RECORD_LEN: usize = 4096;

    /// Splits a byte stream into lines on `\r` or `\n`. Boards terminate
    /// records with `\r` alone, so waiting for `\n` would stall.
    ///
    /// A record longer than the limit is discarded up to its terminator
    /// and reported as [`FeedError::RecordTooLong`]; the next record reads
    /// normally.
    pub struct LineSource<R> {
        reader: R,
        pending: Vec<u8>,
        max_len: usize,
        overflowed: bool,
    }

    impl<R> LineSource<R> {
        pub fn new(reader: R) -> Self {
            Self::with_max_len(reader, MAX_RECORD_LEN)
        }

        pub fn with_max_len(reader: R, max_len: usize) -> Self {
            LineSource {
                reader,
                pending: Vec::new(),
                max_len,
                overflowed: false,
            }
        }

        fn take_line(&mut self) -> Result<Option<String>, FeedError> {
            if std::mem::take(&mut self.overflowed) {
                return Err(FeedError::RecordTooLong {
                    limit: self.max_len,
                });
            }
            let line = std::mem::take(&mut self.pending);
            Ok(Some(String::from_utf8_lossy(&line).into_owned()))
        }

        fn keep(&mut self, bytes: &[u8]) {
            if self.overflowed {
                return;
            }
            if self.pending.len() + bytes.len() > self.max_len {
                self.pending.clear();
                self.overflowed = true;
            } else {
                self.pending.extend_from_slice(bytes);
            }
        }
    }

    #[async_trait]
    impl<R> TelemetrySource for LineSource<R>
    where
        R: AsyncBufRead + Unpin + Send,
    {
        async fn next_line(&mut self) -> Result<Option<String>, FeedError> {
            loop {
                let buf = self.reader.fill_buf().await?;
                if buf.is_empty() {
                    if self.pending.is_empty() && !self.overflowed {
                        return Ok(None);
                    }
                    return self.take_line();
                }
                match buf.iter().position(|b| *b == b'\r' || *b == b'\n') {
                    Some(end) => {
                        let chunk = buf[..end].to_vec();
                        self.reader.consume(end + 1);
                        self.keep(&chunk);
                        if self.pending.is_empty() && !self.overflowed {
                            continue;
                        }
                        return self.take_line();
                    }
                    None => {
                        let chunk = buf.to_vec();
                        self.reader.consume(chunk.len());
                        self.keep(&chunk);
                    }
                }
            }
        }
    }

    /// Counters reported when a feed ends.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct FeedStats {
        pub applied: usize,
        pub skipped: usize,
    }

    /// Reads records until end of stream, writing each into `cache`.
    /// Records that do not parse, or run past the source's length limit,
    /// are logged and skipped; a read failure ends the feed.
    pub async fn run_feed<S>(
        source: &mut S,
        parser: &FeedParser,
        cache: &LiveValueCache,
    ) -> Result<FeedStats, FeedError>
    where
        S: TelemetrySource + ?Sized,
    {
        run_feed_with(source, parser, cache, |_, _| {}).await
    }

    /// [`run_feed`], calling `on_record` after each record is applied.
    pub async fn run_feed_with<S, F>(
        source: &mut S,
        parser: &FeedParser,
        cache: &LiveValueCache,
        mut on_record: F,
    ) -> Result<FeedStats, FeedError>
    where
        S: TelemetrySource + ?Sized,
        F: FnMut(&LiveValueCache, &FeedStats),
    {
        let mut stats = FeedStats::default();
        loop {
            let line = match source.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e @ FeedError::RecordTooLong { .. }) => {
                    tracing::warn!(error = %e, "dropping telemetry record");
                    stats.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };
            match parser.parse_line(&line) {
                Ok(readings) => {
                    cache.apply(&readings);
                    stats.applied += 1;
                    on_record(cache, &stats);
                }
                Err(e) => {
                    tracing::warn!(error = %e, line = %line.trim(), "dropping telemetry record");
                    stats.skipped += 1;
                }
            }
        }
        tracing::debug!(applied = stats.applied, skipped = stats.skipped, "feed ended");
        Ok(stats)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
