//! Gizmo live interpreter -- evaluates expressions against values streamed
//! from running devices.
//!
//! Telemetry records are parsed by [`feed`] into readings and stored in a
//! [`LiveValueCache`]. Evaluators read that cache through the
//! [`ValueLookup`] trait, so tests and one-shot tools can pass a plain map
//! instead.
//!
//! The async reader ([`run_feed`], [`LineSource`]) is behind the `feed`
//! feature, on by default.

pub mod command;
pub mod error;
pub mod evaluate;
pub mod feed;
pub mod interpreter;
pub mod live;

pub use command::{Command, COMMAND_DELIMITER};
pub use error::{EvalError, FeedError};
pub use evaluate::{
    evaluate, evaluate_boolean, evaluate_linking, evaluate_number, evaluate_number_in_range,
    render_string, LiveValue,
};
pub use feed::{DeviceLayout, FeedParser};
#[cfg(feature = "feed")]
pub use feed::{
    run_feed, run_feed_with, FeedStats, LineSource, TelemetrySource, MAX_RECORD_LEN,
};
pub use interpreter::{evaluate_terms, EvalOptions};
pub use live::{LiveValueCache, Reading, ValueLookup};
