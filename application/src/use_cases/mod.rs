//! Use cases
//!
//! [`run_workflow`] owns the step loop — the only real control flow in the
//! system. Everything it touches comes in through the ports.

pub mod run_workflow;
