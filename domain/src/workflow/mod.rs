//! Workflow run model
//!
//! The types that flow through one orchestrated run: the mediator's
//! [`ActionInstruction`](instruction::ActionInstruction), the accumulating
//! [`RunContext`](context::RunContext), and the append-only audit
//! [`TraceEntry`](trace::TraceEntry) records collected into a
//! [`RunRecord`](trace::RunRecord).

pub mod context;
pub mod instruction;
pub mod trace;
