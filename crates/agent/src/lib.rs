//! Intent-routing workflow for the shopfront assistant.
//!
//! This crate is the "brain" of the system: it takes one free-text shopper
//! message and produces one response payload by running a small directed
//! graph of stateful nodes:
//!
//! 1. **Intent classification** (`classifier`) - one LLM call mapping the
//!    message onto the closed intent set, with a keyword fallback when the
//!    model output is unusable.
//! 2. **Routing** (`router`) - a pure function from intent to handler node.
//! 3. **One handler** (`handlers`) - product search, order creation, order
//!    status, or informational Q&A; each performs its own LLM-mediated
//!    extraction and/or external call plus a second formatting pass.
//! 4. **Termination** (`workflow`) - the accumulated conversation state is
//!    returned; nothing survives the run.
//!
//! The LLM is strictly a translator between free text and fixed JSON
//! shapes. Order submission, status lookups, and retrieval all happen in
//! deterministic adapter code behind the `tools` and retriever seams.

pub mod classifier;
pub mod handlers;
pub mod llm;
pub mod router;
pub mod tools;
pub mod workflow;

pub use handlers::info_search::RagAccess;
pub use workflow::{build_workflow, Workflow};
