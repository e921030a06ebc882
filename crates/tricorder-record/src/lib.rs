// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Trace recorder for behavioral test runs.
//!
//! `tricorder-record` turns runner callbacks into a `tricorder-proto`
//! envelope stream and writes it as NDJSON. Producers hand envelopes to a
//! non-blocking sink backed by a dedicated writer thread; line order is
//! whatever interleaving the channel saw, which is valid because
//! envelopes correlate by id, not by position.
//!
//! # Pipeline
//!
//! [`Recorder::start`] resolves the destination from a [`RecorderConfig`],
//! opens an [`NdjsonFileSink`], and emits the stream preamble. Binding
//! registrations dedupe through a [`BindingRegistry`]; execution messages
//! flow through [`CaseRun`] handles that carry the correlation ids.
//! [`Recorder::run_finished`] (or dropping the recorder) drains the
//! writer thread so the file on disk is complete.
//!
//! # Modules
//!
//! - [`factory`]: pure constructors from runner facts to envelopes
//! - [`recorder`]: the facade hosts drive
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self
)]

/// Envelope constructors from runner-facing facts.
pub mod factory;
/// The recorder facade and its per-case handles.
pub mod recorder;

mod b64;
mod broker;
mod config;
mod events;
mod ident;
mod mime;
mod sanitize;
mod sink;

/// Fan-out delivery of one envelope to many sinks.
pub use broker::MessageBroker;
/// Recorder configuration surface and its JSON/env settings form.
pub use config::{destination_path, ConfigError, RecorderConfig, RecorderSettings};
/// Runner-facing fact types the factory and recorder consume.
pub use events::{
    CapturedArgument, CapturedGroup, CasePlan, HookEvent, MatchedBinding, ParameterTypeEvent,
    PlannedStep, StepDefinitionEvent, StepExecutionStatus, StepOutcome,
};
/// Message identity and binding correlation.
pub use ident::{
    BindingRegistry, BindingSignature, CorrelationError, IdSequence, MessageId, Registration,
};
/// Extension-based media type lookup for attachments.
pub use mime::{media_type_for_path, FALLBACK_MEDIA_TYPE, LOG_MEDIA_TYPE};
/// Facade types for driving a recording.
pub use recorder::{CaseRun, Recorder, RecorderError, RetryableCase};
/// Destination file name sanitization.
pub use sanitize::{sanitize_file_name, MAX_FILE_NAME_BYTES};
/// Sink trait and the NDJSON file sink with its worker thread.
pub use sink::{EnvelopeSink, NdjsonFileSink, SinkError};
