//! The four handler nodes. Each owns exactly one intent category, builds
//! its payload from LLM-mediated extraction plus at most one external call,
//! and folds every failure into a JSON error object on the same channel as
//! success payloads.

pub mod info_search;
pub mod order_creation;
pub mod order_status;
pub mod product_search;
