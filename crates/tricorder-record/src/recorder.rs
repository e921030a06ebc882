// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The recorder facade: wires configuration, registry, factory, and
//! pipeline into the surface a host runner drives.
//!
//! Lifecycle: [`Recorder::start`] opens the stream (`Meta`,
//! `TestRunStarted`), binding declarations register as they load, each
//! case goes through [`Recorder::case_started`] and the returned
//! [`CaseRun`], and [`Recorder::run_finished`] closes the stream and
//! drains the pipeline. A disabled configuration yields an inert recorder
//! whose calls all no-op.

use crate::broker::MessageBroker;
use crate::config::{destination_path, RecorderConfig};
use crate::events::{
    CasePlan, HookEvent, ParameterTypeEvent, PlannedStep, StepDefinitionEvent, StepOutcome,
};
use crate::factory;
use crate::ident::{BindingRegistry, CorrelationError, IdSequence, MessageId};
use crate::sink::{EnvelopeSink, NdjsonFileSink, SinkError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;
use tricorder_proto::{Envelope, Product};

/// Recorder failures.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// The emission pipeline could not start.
    #[error("pipeline startup failed: {0}")]
    Sink(#[from] SinkError),
    /// An execution message referenced an unregistered binding.
    #[error("{0}")]
    Correlation(#[from] CorrelationError),
    /// A step index outside the planned case was reported.
    #[error("[RECORD_UNKNOWN_STEP] no planned step at index {index}")]
    UnknownStep {
        /// Index the host reported.
        index: usize,
    },
    /// An attachment file could not be read.
    #[error("[RECORD_ATTACH_READ] cannot read attachment `{path}`: {source}")]
    AttachRead {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Shared pipeline state behind every handle the recorder gives out.
struct Pipeline {
    broker: MessageBroker,
    file_sink: Option<Arc<NdjsonFileSink>>,
    ids: IdSequence,
    registry: BindingRegistry,
    finished: AtomicBool,
}

impl Pipeline {
    fn publish(&self, envelope: Envelope) {
        self.broker.publish(envelope);
    }

    fn shutdown(&self) {
        if let Some(sink) = &self.file_sink {
            sink.shutdown();
        }
    }
}

/// Records one test run as a trace stream.
///
/// Dropping the recorder drains and closes the stream even when the host
/// never reported a verdict.
pub struct Recorder {
    pipeline: Option<Arc<Pipeline>>,
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("enabled", &self.pipeline.is_some())
            .finish()
    }
}

impl Recorder {
    /// Starts recording per `config`: resolves the destination, starts
    /// the file sink, and emits `Meta` and `TestRunStarted`.
    ///
    /// A disabled configuration yields an inert recorder without touching
    /// the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Sink`] when the destination file cannot be
    /// created or the writer thread cannot start.
    pub fn start(
        config: &dyn RecorderConfig,
        implementation: Product,
        at: SystemTime,
    ) -> Result<Self, RecorderError> {
        if !config.enabled() {
            return Ok(Self::disabled());
        }
        let path = destination_path(config);
        let sink = Arc::new(NdjsonFileSink::start(&path)?);
        let mut broker = MessageBroker::new();
        broker.register(Arc::clone(&sink) as Arc<dyn EnvelopeSink>);
        Ok(Self::start_with_parts(broker, Some(sink), implementation, at))
    }

    /// Starts recording through an arbitrary sink instead of a file.
    ///
    /// Seam for tests and embedded consumers. The sink's lifecycle stays
    /// with the caller; to fan out to several sinks, pass a
    /// [`MessageBroker`].
    pub fn start_with_sink(
        sink: Arc<dyn EnvelopeSink>,
        implementation: Product,
        at: SystemTime,
    ) -> Self {
        let mut broker = MessageBroker::new();
        broker.register(sink);
        Self::start_with_parts(broker, None, implementation, at)
    }

    fn start_with_parts(
        broker: MessageBroker,
        file_sink: Option<Arc<NdjsonFileSink>>,
        implementation: Product,
        at: SystemTime,
    ) -> Self {
        let pipeline = Arc::new(Pipeline {
            broker,
            file_sink,
            ids: IdSequence::new(),
            registry: BindingRegistry::new(),
            finished: AtomicBool::new(false),
        });
        pipeline.publish(Envelope::Meta(factory::meta(implementation)));
        pipeline.publish(factory::test_run_started(at));
        Self {
            pipeline: Some(pipeline),
        }
    }

    /// Creates an inert recorder: every call no-ops, nothing is written.
    #[must_use]
    pub fn disabled() -> Self {
        Self { pipeline: None }
    }

    /// True when this recorder actually records.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Registers a step definition binding. First registration per
    /// canonical signature emits the declaration; repeats no-op.
    pub fn step_definition(&self, event: &StepDefinitionEvent) {
        let Some(pipeline) = &self.pipeline else {
            return;
        };
        let registration = pipeline.registry.register(&event.signature, &pipeline.ids);
        if registration.newly_registered {
            pipeline.publish(factory::step_definition(registration.id, event));
        }
    }

    /// Registers a lifecycle hook binding. First registration per
    /// canonical signature emits the declaration; repeats no-op.
    pub fn hook(&self, event: &HookEvent) {
        let Some(pipeline) = &self.pipeline else {
            return;
        };
        let registration = pipeline.registry.register(&event.signature, &pipeline.ids);
        if registration.newly_registered {
            pipeline.publish(factory::hook(registration.id, event));
        }
    }

    /// Registers a parameter type declaration. First registration per
    /// canonical signature emits the declaration; repeats no-op.
    pub fn parameter_type(&self, event: &ParameterTypeEvent) {
        let Some(pipeline) = &self.pipeline else {
            return;
        };
        let registration = pipeline.registry.register(&event.signature, &pipeline.ids);
        if registration.newly_registered {
            pipeline.publish(factory::parameter_type(registration.id, event));
        }
    }

    /// Publishes a pre-built envelope as-is. Boundary for hosts that
    /// carry parser output (`Source`, `GherkinDocument`, `Pickle`)
    /// produced elsewhere.
    pub fn publish(&self, envelope: Envelope) {
        if let Some(pipeline) = &self.pipeline {
            pipeline.publish(envelope);
        }
    }

    /// Plans and starts the first attempt of a test case: emits
    /// `TestCase` and `TestCaseStarted`, returning the handle step and
    /// attachment events go through.
    ///
    /// Every binding the plan references must already be registered; a
    /// miss is a fatal [`RecorderError::Correlation`].
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Correlation`] when a planned step names a
    /// binding signature that was never registered.
    pub fn case_started(
        &self,
        plan: &CasePlan,
        at: SystemTime,
        worker_id: Option<String>,
    ) -> Result<CaseRun, RecorderError> {
        let Some(pipeline) = &self.pipeline else {
            return Ok(CaseRun::inert());
        };
        let test_case_id = pipeline.ids.next_id();
        let mut step_ids = Vec::with_capacity(plan.steps.len());
        let mut test_steps = Vec::with_capacity(plan.steps.len());
        for planned in &plan.steps {
            let id = pipeline.ids.next_id();
            step_ids.push(id.clone());
            test_steps.push(plan_step(pipeline, id, planned)?);
        }
        pipeline.publish(factory::test_case(
            test_case_id.clone(),
            plan.pickle_id.clone(),
            test_steps,
        ));
        let started_id = pipeline.ids.next_id();
        pipeline.publish(factory::test_case_started(
            started_id.clone(),
            test_case_id.clone(),
            0,
            worker_id,
            at,
        ));
        Ok(CaseRun {
            pipeline: Some(Arc::clone(pipeline)),
            test_case_id,
            started_id,
            step_ids,
            attempt: 0,
        })
    }

    /// Emits `TestRunFinished` with the overall verdict, then drains and
    /// closes the stream. Only the first call takes effect.
    pub fn run_finished(&self, success: bool, at: SystemTime, message: Option<String>) {
        let Some(pipeline) = &self.pipeline else {
            return;
        };
        if pipeline.finished.swap(true, Ordering::SeqCst) {
            return;
        }
        pipeline.publish(factory::test_run_finished(success, at, message));
        pipeline.shutdown();
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if let Some(pipeline) = &self.pipeline {
            // Host never reported a verdict; still drain and close so the
            // file on disk is complete.
            if !pipeline.finished.swap(true, Ordering::SeqCst) {
                pipeline.shutdown();
            }
        }
    }
}

/// Maps one planned step to its wire form, resolving binding ids.
fn plan_step(
    pipeline: &Pipeline,
    id: MessageId,
    planned: &PlannedStep,
) -> Result<tricorder_proto::TestStep, CorrelationError> {
    match planned {
        PlannedStep::Hook { signature } => {
            let hook_id = pipeline.registry.resolve(signature)?;
            Ok(factory::hook_test_step(id, hook_id))
        }
        PlannedStep::Pickle {
            pickle_step_id,
            matches,
        } => {
            let mut definition_ids = Vec::with_capacity(matches.len());
            let mut argument_lists = Vec::with_capacity(matches.len());
            for matched in matches {
                definition_ids.push(pipeline.registry.resolve(&matched.signature)?);
                argument_lists.push(factory::match_arguments(&matched.arguments));
            }
            Ok(factory::pickle_test_step(
                id,
                pickle_step_id.clone(),
                definition_ids,
                argument_lists,
            ))
        }
    }
}

/// Handle for one execution attempt of a planned case.
///
/// Step and attachment events reference planned steps by their index in
/// the plan. [`finished`](Self::finished) consumes the handle, so no
/// step events can follow the case's end.
pub struct CaseRun {
    pipeline: Option<Arc<Pipeline>>,
    test_case_id: MessageId,
    started_id: MessageId,
    step_ids: Vec<MessageId>,
    attempt: u32,
}

impl std::fmt::Debug for CaseRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaseRun")
            .field("test_case_id", &self.test_case_id)
            .field("started_id", &self.started_id)
            .field("attempt", &self.attempt)
            .finish_non_exhaustive()
    }
}

impl CaseRun {
    fn inert() -> Self {
        Self {
            pipeline: None,
            test_case_id: MessageId::new(),
            started_id: MessageId::new(),
            step_ids: Vec::new(),
            attempt: 0,
        }
    }

    /// Correlation id of this attempt (`TestCaseStarted.id`).
    #[must_use]
    pub fn test_case_started_id(&self) -> &str {
        &self.started_id
    }

    /// Zero-based attempt counter.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    fn step_id(&self, index: usize) -> Result<&MessageId, RecorderError> {
        self.step_ids
            .get(index)
            .ok_or(RecorderError::UnknownStep { index })
    }

    /// Emits `TestStepStarted` for the planned step at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::UnknownStep`] when `index` is outside the
    /// planned steps.
    pub fn step_started(&self, index: usize, at: SystemTime) -> Result<(), RecorderError> {
        let Some(pipeline) = &self.pipeline else {
            return Ok(());
        };
        let step_id = self.step_id(index)?.clone();
        pipeline.publish(factory::test_step_started(
            self.started_id.clone(),
            step_id,
            at,
        ));
        Ok(())
    }

    /// Emits `TestStepFinished` for the planned step at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::UnknownStep`] when `index` is outside the
    /// planned steps.
    pub fn step_finished(
        &self,
        index: usize,
        outcome: &StepOutcome,
        at: SystemTime,
    ) -> Result<(), RecorderError> {
        let Some(pipeline) = &self.pipeline else {
            return Ok(());
        };
        let step_id = self.step_id(index)?.clone();
        pipeline.publish(factory::test_step_finished(
            self.started_id.clone(),
            step_id,
            outcome,
            at,
        ));
        Ok(())
    }

    /// Reads a file and emits it as a base64 attachment correlated to
    /// this attempt (and to a planned step when `step` is given).
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::AttachRead`] when the file cannot be read,
    /// or [`RecorderError::UnknownStep`] when `step` is outside the
    /// planned steps.
    pub fn attach_file(&self, step: Option<usize>, path: &Path) -> Result<(), RecorderError> {
        let Some(pipeline) = &self.pipeline else {
            return Ok(());
        };
        let content = std::fs::read(path).map_err(|source| RecorderError::AttachRead {
            path: path.to_path_buf(),
            source,
        })?;
        let step_id = match step {
            Some(index) => Some(self.step_id(index)?.clone()),
            None => None,
        };
        pipeline.publish(factory::file_attachment(
            Some(self.started_id.clone()),
            step_id,
            path,
            &content,
        ));
        Ok(())
    }

    /// Emits a textual log attachment correlated to this attempt (and to
    /// a planned step when `step` is given).
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::UnknownStep`] when `step` is outside the
    /// planned steps.
    pub fn attach_log(
        &self,
        step: Option<usize>,
        text: impl Into<String>,
    ) -> Result<(), RecorderError> {
        let Some(pipeline) = &self.pipeline else {
            return Ok(());
        };
        let step_id = match step {
            Some(index) => Some(self.step_id(index)?.clone()),
            None => None,
        };
        pipeline.publish(factory::log_attachment(
            Some(self.started_id.clone()),
            step_id,
            text,
        ));
        Ok(())
    }

    /// Emits `TestCaseFinished`, consuming the handle. Returns a retry
    /// handle exactly when `will_be_retried` is true.
    pub fn finished(self, at: SystemTime, will_be_retried: bool) -> Option<RetryableCase> {
        if let Some(pipeline) = &self.pipeline {
            pipeline.publish(factory::test_case_finished(
                self.started_id.clone(),
                at,
                will_be_retried,
            ));
        }
        if !will_be_retried {
            return None;
        }
        Some(RetryableCase {
            pipeline: self.pipeline,
            test_case_id: self.test_case_id,
            step_ids: self.step_ids,
            next_attempt: self.attempt + 1,
        })
    }
}

/// A finished attempt that will run again: same plan, next attempt
/// number.
pub struct RetryableCase {
    pipeline: Option<Arc<Pipeline>>,
    test_case_id: MessageId,
    step_ids: Vec<MessageId>,
    next_attempt: u32,
}

impl std::fmt::Debug for RetryableCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryableCase")
            .field("test_case_id", &self.test_case_id)
            .field("next_attempt", &self.next_attempt)
            .finish_non_exhaustive()
    }
}

impl RetryableCase {
    /// Starts the next attempt: emits `TestCaseStarted` with a fresh
    /// correlation id and the incremented attempt counter. The plan
    /// (`TestCase`) is not re-emitted.
    pub fn start(self, at: SystemTime, worker_id: Option<String>) -> CaseRun {
        let started_id = match &self.pipeline {
            Some(pipeline) => {
                let id = pipeline.ids.next_id();
                pipeline.publish(factory::test_case_started(
                    id.clone(),
                    self.test_case_id.clone(),
                    self.next_attempt,
                    worker_id,
                    at,
                ));
                id
            }
            None => MessageId::new(),
        };
        CaseRun {
            pipeline: self.pipeline,
            test_case_id: self.test_case_id,
            started_id,
            step_ids: self.step_ids,
            attempt: self.next_attempt,
        }
    }
}
