//! Shared foundation for the shopfront assistant.
//!
//! This crate holds the pieces every other member depends on:
//! - `config` - the explicit application configuration struct, loaded from an
//!   optional TOML file plus `SHOPFRONT_*` environment overrides, validated
//!   once at startup.
//! - `state` - the closed intent set and the per-run conversation state that
//!   flows through the workflow graph.
//! - `extract` - the structured-extraction utility that recovers a JSON
//!   object from free-form model output, keeping "model declined" distinct
//!   from "model said something unparsable".

pub mod config;
pub mod extract;
pub mod state;
