//! Run Workflow use case — the dynamic tool-orchestration loop.
//!
//! The orchestrator repeatedly asks the mediator what should happen next and
//! executes the chosen action against the tool registry, accumulating a run
//! context and an audit trace until the mediator signals `done`, a
//! decision-layer error breaks the loop, or the step budget runs out.
//!
//! # Error taxonomy
//!
//! | Failure | Class | Loop |
//! |---------|-------|------|
//! | mediator exception | decision | break |
//! | invalid instruction | decision | break |
//! | missing tool name | decision | break |
//! | unknown tool | decision | break |
//! | tool timeout | execution | continue |
//! | tool-raised error | execution | continue |
//! | budget exhausted | terminal marker | exit |
//!
//! Decision errors mean the control protocol itself is broken and terminate
//! the run; execution errors are per-step noise the mediator can observe in
//! the context and route around on its next decision. No failure mode ever
//! escapes [`execute`](RunWorkflowUseCase::execute): callers always receive
//! a well-formed [`RunRecord`].

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use postpilot_domain::workflow::trace::MAX_STEPS_REACHED;
use postpilot_domain::{
    ActionInstruction, ContextSeed, RunContext, RunRecord, ToolError, ToolMetadata, TraceEntry,
};

use crate::config::WorkflowParams;
use crate::ports::mediator::{Decision, Mediator, MediatorError};
use crate::ports::tool::{Tool, ToolRegistry};

/// Trace text for a cancelled run
const CANCELLED: &str = "cancelled";

/// Input for one workflow run
#[derive(Debug, Clone)]
pub struct RunWorkflowInput {
    /// Opaque run identifier
    pub user_id: String,
    /// Context fields the caller wants pre-populated (e.g. a cached profile)
    pub seed: ContextSeed,
}

impl RunWorkflowInput {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            seed: ContextSeed::default(),
        }
    }

    pub fn with_seed(mut self, seed: ContextSeed) -> Self {
        self.seed = seed;
        self
    }
}

/// Explicit loop exit states, instead of fall-through control flow.
enum LoopExit {
    /// Mediator signaled completion
    Done,
    /// Decision-layer error or external cancellation
    FailedStep,
    /// Step budget exhausted without `done`
    MaxStepsReached,
}

/// How one tool invocation settled
enum InvokeOutcome {
    Ok(Value),
    Timeout,
    Failed(ToolError),
    Cancelled,
}

/// Use case for running one orchestrated workflow.
///
/// Holds the injected mediator and registry; both are read-only for the
/// duration of a run and may be shared across concurrently executing runs.
/// Each run's context, trace, and step counter are local to one `execute`
/// call, so there is no cross-run locking.
pub struct RunWorkflowUseCase<M: Mediator> {
    mediator: Arc<M>,
    registry: Arc<ToolRegistry>,
    params: WorkflowParams,
    cancellation_token: Option<CancellationToken>,
}

impl<M: Mediator> RunWorkflowUseCase<M> {
    pub fn new(mediator: Arc<M>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            mediator,
            registry,
            params: WorkflowParams::default(),
            cancellation_token: None,
        }
    }

    pub fn with_params(mut self, params: WorkflowParams) -> Self {
        self.params = params;
        self
    }

    /// Set a cancellation token for graceful interruption.
    ///
    /// Cancellation is observed at the decide and tool await points; it
    /// appends a terminal `cancelled` trace error and returns the record.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Run the loop to completion and return the audit record.
    ///
    /// Never returns an error: every failure mode is converted into a trace
    /// entry and the record is always well-formed.
    pub async fn execute(&self, input: RunWorkflowInput) -> RunRecord {
        info!(user_id = %input.user_id, "starting workflow run");

        let mut context = RunContext::seeded(&input.user_id, input.seed);
        let mut trace: Vec<TraceEntry> = Vec::new();

        // Tool set is static for a run: metadata is built once, not per step
        let tool_metadata = self.registry.metadata();
        let max_steps = self.params.max_steps.max(1);
        let mut step: u32 = 0;

        let exit = loop {
            if step >= max_steps {
                break LoopExit::MaxStepsReached;
            }
            step += 1;
            debug!(step, max_steps, "workflow step");

            // Ask the mediator for the next action
            let decision = match self.decide(&context, &tool_metadata).await {
                Ok(Some(decision)) => decision,
                Ok(None) => {
                    warn!(step, "run cancelled while waiting for mediator");
                    trace.push(TraceEntry::step_error(step, CANCELLED));
                    break LoopExit::FailedStep;
                }
                Err(e) => {
                    error!(step, error = %e, "mediator failed to decide");
                    trace.push(TraceEntry::step_error(step, format!("mediator_exception: {e}")));
                    break LoopExit::FailedStep;
                }
            };

            // Raw decisions go through the same strict validation everywhere
            let instruction = match decision {
                Decision::Instruction(instruction) => instruction,
                Decision::Raw(value) => match ActionInstruction::from_value(value) {
                    Ok(instruction) => instruction,
                    Err(e) => {
                        error!(step, error = %e, "invalid instruction from mediator");
                        trace.push(TraceEntry::step_error(step, e.to_string()));
                        break LoopExit::FailedStep;
                    }
                },
            };

            if instruction.is_done() {
                info!(step, reason = ?instruction.reason, "workflow finished");
                trace.push(TraceEntry::done(step, instruction.reason));
                break LoopExit::Done;
            }

            let Some(tool_name) = instruction.tool.filter(|t| !t.is_empty()) else {
                error!(step, "call_tool instruction without a tool name");
                trace.push(TraceEntry::step_error(step, "unsupported_action_or_missing_tool"));
                break LoopExit::FailedStep;
            };

            let Some(tool) = self.registry.get(&tool_name) else {
                error!(step, tool = %tool_name, "unknown tool requested");
                trace.push(TraceEntry::step_error(step, format!("unknown_tool:{tool_name}")));
                break LoopExit::FailedStep;
            };

            // Record the attempt before invoking, so a timeout or crash still
            // leaves an audit entry for the dispatch
            context.record_call(&tool_name, instruction.args.clone());

            match self.invoke(tool.as_ref(), &instruction.args).await {
                InvokeOutcome::Ok(result) => {
                    debug!(step, tool = %tool_name, "tool succeeded");
                    let patch = tool.context_patch(&result);
                    trace.push(TraceEntry::tool_success(
                        step,
                        &tool_name,
                        instruction.args,
                        result.clone(),
                    ));
                    context.record_output(&tool_name, result, patch);
                }
                InvokeOutcome::Timeout => {
                    // The only failure class that does not break the loop by
                    // design: a slow tool should not abort the whole run
                    warn!(step, tool = %tool_name, "tool timed out");
                    trace.push(TraceEntry::tool_failure(step, &tool_name, instruction.args, "timeout"));
                }
                InvokeOutcome::Failed(e) => {
                    warn!(step, tool = %tool_name, error = %e, "tool raised an error");
                    trace.push(TraceEntry::tool_failure(
                        step,
                        &tool_name,
                        instruction.args,
                        e.to_string(),
                    ));
                }
                InvokeOutcome::Cancelled => {
                    warn!(step, tool = %tool_name, "run cancelled during tool invocation");
                    trace.push(TraceEntry::step_error(step, CANCELLED));
                    break LoopExit::FailedStep;
                }
            }
        };

        match exit {
            LoopExit::MaxStepsReached => {
                warn!(user_id = %input.user_id, max_steps, "max steps reached without done");
                trace.push(TraceEntry::step_error(step, MAX_STEPS_REACHED));
            }
            LoopExit::Done | LoopExit::FailedStep => {}
        }

        let record = RunRecord::new(input.user_id, trace);
        info!(user_id = %record.user_id, outcome = ?record.outcome(), "workflow run completed");
        record
    }

    /// Ask the mediator, honoring cancellation. `Ok(None)` means cancelled.
    async fn decide(
        &self,
        context: &RunContext,
        tools: &[ToolMetadata],
    ) -> Result<Option<Decision>, MediatorError> {
        match &self.cancellation_token {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Ok(None),
                decision = self.mediator.decide(context, tools) => decision.map(Some),
            },
            None => self.mediator.decide(context, tools).await.map(Some),
        }
    }

    /// Invoke one tool bounded by the per-call timeout.
    ///
    /// Timeout expiry cancels this single invocation only; the surrounding
    /// loop continues.
    async fn invoke(&self, tool: &dyn Tool, args: &Map<String, Value>) -> InvokeOutcome {
        let bounded = tokio::time::timeout(self.params.tool_timeout, tool.invoke(args));

        let settled = match &self.cancellation_token {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => return InvokeOutcome::Cancelled,
                settled = bounded => settled,
            },
            None => bounded.await,
        };

        match settled {
            Ok(Ok(result)) => InvokeOutcome::Ok(result),
            Ok(Err(e)) => InvokeOutcome::Failed(e),
            Err(_elapsed) => InvokeOutcome::Timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mediators::script::ScriptMediator;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mediator that replays a fixed sequence of decisions
    struct ScriptedDecisions {
        decisions: Mutex<std::vec::IntoIter<Result<Decision, MediatorError>>>,
    }

    impl ScriptedDecisions {
        fn new(decisions: Vec<Result<Decision, MediatorError>>) -> Self {
            Self {
                decisions: Mutex::new(decisions.into_iter()),
            }
        }
    }

    #[async_trait]
    impl Mediator for ScriptedDecisions {
        async fn decide(
            &self,
            _context: &RunContext,
            _tools: &[ToolMetadata],
        ) -> Result<Decision, MediatorError> {
            self.decisions
                .lock()
                .unwrap()
                .next()
                .unwrap_or_else(|| Err(MediatorError::Other("script exhausted".to_string())))
        }
    }

    /// Mediator that always asks for the same tool
    struct AlwaysCall(&'static str);

    #[async_trait]
    impl Mediator for AlwaysCall {
        async fn decide(
            &self,
            _context: &RunContext,
            _tools: &[ToolMetadata],
        ) -> Result<Decision, MediatorError> {
            Ok(ActionInstruction::call_tool(self.0).into())
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "echoes its arguments back"
        }

        async fn invoke(&self, args: &Map<String, Value>) -> Result<Value, ToolError> {
            Ok(Value::Object(args.clone()))
        }
    }

    struct SleepTool {
        sleep: Duration,
    }

    #[async_trait]
    impl Tool for SleepTool {
        fn name(&self) -> &str {
            "slow"
        }

        fn description(&self) -> &str {
            "sleeps before answering"
        }

        async fn invoke(&self, _args: &Map<String, Value>) -> Result<Value, ToolError> {
            tokio::time::sleep(self.sleep).await;
            Ok(json!({"slept": true}))
        }
    }

    struct FailTool;

    #[async_trait]
    impl Tool for FailTool {
        fn name(&self) -> &str {
            "broken"
        }

        fn description(&self) -> &str {
            "always raises"
        }

        async fn invoke(&self, _args: &Map<String, Value>) -> Result<Value, ToolError> {
            Err(ToolError::execution_failed("boom"))
        }
    }

    /// Stand-in profile tool returning the fixed workflow shapes
    struct StubProfileTool;

    #[async_trait]
    impl Tool for StubProfileTool {
        fn name(&self) -> &str {
            "profile"
        }

        fn description(&self) -> &str {
            "returns a canned profile"
        }

        async fn invoke(&self, args: &Map<String, Value>) -> Result<Value, ToolError> {
            let user_id = args
                .get("user_id")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::invalid_argument("Missing required argument: user_id"))?;
            Ok(json!({
                "profile": {"user_id": user_id, "name": "Dana", "skills": ["rust", "ml"]},
                "analysis": {"top_keywords": ["rust"], "activity_level": 6}
            }))
        }

        fn context_patch(&self, result: &Value) -> postpilot_domain::ContextPatch {
            let profile = result.get("profile").cloned().unwrap_or_else(|| result.clone());
            postpilot_domain::ContextPatch::from_analysis(result).set_profile(profile)
        }
    }

    fn params(max_steps: u32) -> WorkflowParams {
        WorkflowParams::default()
            .with_max_steps(max_steps)
            .with_tool_timeout(Duration::from_millis(100))
    }

    fn assert_steps_strictly_increasing(record: &RunRecord) {
        assert!(!record.trace.is_empty(), "trace is never empty");
        let body_len = record.trace.len()
            - usize::from(matches!(
                record.trace.last(),
                Some(TraceEntry::StepError { error, .. }) if error == MAX_STEPS_REACHED
            ));
        for (i, entry) in record.trace[..body_len].iter().enumerate() {
            assert_eq!(entry.step(), i as u32 + 1, "step numbers start at 1 and increase by 1");
        }
    }

    #[tokio::test]
    async fn test_done_on_first_step_yields_single_entry() {
        let mediator = Arc::new(ScriptedDecisions::new(vec![Ok(
            ActionInstruction::done("nothing to do").into(),
        )]));
        let registry = Arc::new(ToolRegistry::new().register(EchoTool));

        let record = RunWorkflowUseCase::new(mediator, registry)
            .execute(RunWorkflowInput::new("u-1"))
            .await;

        assert_eq!(record.trace.len(), 1);
        assert!(matches!(&record.trace[0], TraceEntry::Done { step: 1, .. }));
        assert!(record.is_completed());
    }

    #[tokio::test]
    async fn test_tool_dispatch_appends_success_and_output() {
        let mediator = Arc::new(ScriptedDecisions::new(vec![
            Ok(ActionInstruction::call_tool("echo").with_arg("k", "v").into()),
            Ok(ActionInstruction::done("done").into()),
        ]));
        let registry = Arc::new(ToolRegistry::new().register(EchoTool));

        let record = RunWorkflowUseCase::new(mediator, registry)
            .execute(RunWorkflowInput::new("u-1"))
            .await;

        assert_eq!(record.trace.len(), 2);
        match &record.trace[0] {
            TraceEntry::ToolSuccess { step, tool, result, .. } => {
                assert_eq!(*step, 1);
                assert_eq!(tool, "echo");
                assert_eq!(result["k"], json!("v"));
            }
            other => panic!("expected tool success, got {other:?}"),
        }
        assert_steps_strictly_increasing(&record);
    }

    #[tokio::test]
    async fn test_unknown_tool_terminates_without_invocation() {
        let mediator = Arc::new(AlwaysCall("publisher"));
        let registry = Arc::new(ToolRegistry::new().register(EchoTool));

        let record = RunWorkflowUseCase::new(mediator, registry)
            .with_params(params(8))
            .execute(RunWorkflowInput::new("u-1"))
            .await;

        assert_eq!(record.trace.len(), 1);
        assert_eq!(record.trace[0].error(), Some("unknown_tool:publisher"));
        assert_eq!(record.outcome(), postpilot_domain::RunOutcome::Failed);
    }

    #[tokio::test]
    async fn test_mediator_exception_breaks_loop() {
        let mediator = Arc::new(ScriptedDecisions::new(vec![Err(MediatorError::Gateway(
            "model unreachable".to_string(),
        ))]));
        let registry = Arc::new(ToolRegistry::new().register(EchoTool));

        let record = RunWorkflowUseCase::new(mediator, registry)
            .execute(RunWorkflowInput::new("u-1"))
            .await;

        assert_eq!(record.trace.len(), 1);
        assert!(record.trace[0].error().unwrap().starts_with("mediator_exception:"));
    }

    #[tokio::test]
    async fn test_invalid_raw_instruction_breaks_loop() {
        let mediator = Arc::new(ScriptedDecisions::new(vec![Ok(Decision::Raw(json!({
            "action": "sleep_on_it"
        })))]));
        let registry = Arc::new(ToolRegistry::new().register(EchoTool));

        let record = RunWorkflowUseCase::new(mediator, registry)
            .execute(RunWorkflowInput::new("u-1"))
            .await;

        assert_eq!(record.trace.len(), 1);
        assert!(record.trace[0].error().unwrap().starts_with("invalid_instruction"));
    }

    #[tokio::test]
    async fn test_raw_call_tool_without_tool_is_unsupported() {
        // Scenario: mediator returns {"action": "call_tool"} with no tool field
        let mediator = Arc::new(ScriptedDecisions::new(vec![Ok(Decision::Raw(json!({
            "action": "call_tool"
        })))]));
        let registry = Arc::new(ToolRegistry::new().register(EchoTool));

        let record = RunWorkflowUseCase::new(mediator, registry)
            .execute(RunWorkflowInput::new("u-1"))
            .await;

        assert_eq!(record.trace.len(), 1);
        assert_eq!(record.trace[0].error(), Some("unsupported_action_or_missing_tool"));
        assert_eq!(record.trace[0].step(), 1);
    }

    #[tokio::test]
    async fn test_max_steps_reached_appends_marker() {
        // Scenario: max_steps = 2 with a mediator that never returns done
        let mediator = Arc::new(AlwaysCall("echo"));
        let registry = Arc::new(ToolRegistry::new().register(EchoTool));

        let record = RunWorkflowUseCase::new(mediator, registry)
            .with_params(params(2))
            .execute(RunWorkflowInput::new("u-1"))
            .await;

        // One entry per step plus the final marker
        assert_eq!(record.trace.len(), 3);
        assert_eq!(record.trace[2].error(), Some(MAX_STEPS_REACHED));
        assert_eq!(record.trace[2].step(), 2);
        assert_eq!(record.outcome(), postpilot_domain::RunOutcome::BudgetExhausted);
        assert_steps_strictly_increasing(&record);
    }

    #[tokio::test]
    async fn test_timeout_recorded_and_loop_continues() {
        // Scenario: a tool sleeping longer than the timeout, then done
        let mediator = Arc::new(ScriptedDecisions::new(vec![
            Ok(ActionInstruction::call_tool("slow").into()),
            Ok(ActionInstruction::done("gave up on slow").into()),
        ]));
        let registry = Arc::new(
            ToolRegistry::new().register(SleepTool { sleep: Duration::from_secs(10) }),
        );

        let record = RunWorkflowUseCase::new(mediator, registry)
            .with_params(params(8))
            .execute(RunWorkflowInput::new("u-1"))
            .await;

        assert_eq!(record.trace.len(), 2);
        match &record.trace[0] {
            TraceEntry::ToolFailure { tool, error, .. } => {
                assert_eq!(tool, "slow");
                assert_eq!(error, "timeout");
            }
            other => panic!("expected tool failure, got {other:?}"),
        }
        // The loop proceeded to a second mediator decision
        assert!(matches!(&record.trace[1], TraceEntry::Done { step: 2, .. }));
    }

    #[tokio::test]
    async fn test_tool_error_recorded_and_loop_continues() {
        let mediator = Arc::new(ScriptedDecisions::new(vec![
            Ok(ActionInstruction::call_tool("broken").into()),
            Ok(ActionInstruction::done("routed around failure").into()),
        ]));
        let registry = Arc::new(ToolRegistry::new().register(FailTool));

        let record = RunWorkflowUseCase::new(mediator, registry)
            .execute(RunWorkflowInput::new("u-1"))
            .await;

        assert_eq!(record.trace.len(), 2);
        assert_eq!(record.trace[0].error(), Some("[EXECUTION_FAILED] boom"));
        assert!(record.is_completed());
    }

    #[tokio::test]
    async fn test_failed_dispatches_still_recorded_in_tools_called() {
        // tools_called grows on every dispatch attempt, before the outcome is
        // known. Observed here through the trace: two failure entries mean
        // two attempts were recorded.
        let mediator = Arc::new(ScriptedDecisions::new(vec![
            Ok(ActionInstruction::call_tool("broken").into()),
            Ok(ActionInstruction::call_tool("broken").into()),
            Ok(ActionInstruction::done("enough").into()),
        ]));
        let registry = Arc::new(ToolRegistry::new().register(FailTool));

        let record = RunWorkflowUseCase::new(mediator, registry)
            .execute(RunWorkflowInput::new("u-1"))
            .await;

        let dispatches = record
            .trace
            .iter()
            .filter(|e| {
                matches!(e, TraceEntry::ToolSuccess { .. } | TraceEntry::ToolFailure { .. })
            })
            .count();
        assert_eq!(dispatches, 2);
        assert_steps_strictly_increasing(&record);
    }

    #[tokio::test]
    async fn test_exactly_one_terminal_entry() {
        let mediator = Arc::new(ScriptedDecisions::new(vec![
            Ok(ActionInstruction::call_tool("echo").into()),
            Ok(ActionInstruction::done("done").into()),
        ]));
        let registry = Arc::new(ToolRegistry::new().register(EchoTool));

        let record = RunWorkflowUseCase::new(mediator, registry)
            .execute(RunWorkflowInput::new("u-1"))
            .await;

        let terminal = record.trace.iter().filter(|e| e.is_terminal()).count();
        assert_eq!(terminal, 1);
        assert!(record.trace.last().unwrap().is_terminal());
    }

    #[tokio::test]
    async fn test_script_mediator_drives_profile_then_research() {
        // Scenario: rule-based mediator with an empty profile
        let mediator = Arc::new(ScriptMediator::new());
        let registry = Arc::new(ToolRegistry::new().register(StubProfileTool).register(EchoTool));

        // max_steps = 2 so the run stops right after the second decision
        let record = RunWorkflowUseCase::new(mediator, registry)
            .with_params(params(2))
            .execute(RunWorkflowInput::new("u-1"))
            .await;

        match &record.trace[0] {
            TraceEntry::ToolSuccess { tool, .. } => assert_eq!(tool, "profile"),
            other => panic!("first dispatch must be profile, got {other:?}"),
        }
        // Second decision targeted research (unknown here, which terminates
        // the run and proves the mediator moved on after profile succeeded)
        assert_eq!(record.trace[1].error(), Some("unknown_tool:research"));
    }

    #[tokio::test]
    async fn test_seeded_profile_skips_profile_step() {
        let mediator = Arc::new(ScriptMediator::new());
        let registry = Arc::new(ToolRegistry::new().register(StubProfileTool));

        let input = RunWorkflowInput::new("u-1")
            .with_seed(ContextSeed::new().with_profile(json!({"skills": ["go"]})));
        let record = RunWorkflowUseCase::new(mediator, registry)
            .with_params(params(1))
            .execute(input)
            .await;

        // First decision goes straight to research
        assert_eq!(record.trace[0].error(), Some("unknown_tool:research"));
    }

    #[tokio::test]
    async fn test_cancellation_terminates_with_cancelled_entry() {
        let token = CancellationToken::new();
        token.cancel();

        let mediator = Arc::new(AlwaysCall("echo"));
        let registry = Arc::new(ToolRegistry::new().register(EchoTool));

        let record = RunWorkflowUseCase::new(mediator, registry)
            .with_cancellation(token)
            .execute(RunWorkflowInput::new("u-1"))
            .await;

        assert_eq!(record.trace.len(), 1);
        assert_eq!(record.trace[0].error(), Some(CANCELLED));
    }

    #[tokio::test]
    async fn test_zero_max_steps_treated_as_one() {
        let mediator = Arc::new(AlwaysCall("echo"));
        let registry = Arc::new(ToolRegistry::new().register(EchoTool));

        let record = RunWorkflowUseCase::new(mediator, registry)
            .with_params(params(0))
            .execute(RunWorkflowInput::new("u-1"))
            .await;

        assert_eq!(record.trace.last().unwrap().error(), Some(MAX_STEPS_REACHED));
        assert!(record.trace.last().unwrap().step() >= 1);
    }
}
