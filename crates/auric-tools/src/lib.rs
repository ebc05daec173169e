//! Tool framework for auric - define and register executable capabilities
//!
//! A [`Tool`] is an async executable contract (name, description, parameter
//! schema, execute). Tools are collected into a [`ToolRegistry`] that is
//! immutable after construction and shared read-only across concurrent
//! analysis runs.

pub mod registry;
pub mod tool;

pub use registry::{ToolRegistry, ToolRegistryBuilder};
pub use tool::{Tool, ToolError, ToolResult};
