//! Task Registry Module
//!
//! Owns the lifecycle of asynchronous search tasks. Submitting a search creates a
//! task here and schedules the orchestrator; clients then poll the registry for
//! progress and the final result.
//!
//! ## State Machine
//! Every task moves monotonically through
//! `Queued -> Running -> Completed | Failed`. Terminal states are sticky: once a
//! task completed or failed, further mutation attempts are ignored, so a
//! misbehaving orchestrator run can never resurrect a finished task.
//!
//! ## Submodules
//! - **`types`**: Task identity, status enum, stored entries, and API DTOs.
//! - **`store`**: The concurrent in-memory task store and its transition rules.
//! - **`handlers`**: HTTP request handlers for status lookup and task listing.

pub mod handlers;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;
