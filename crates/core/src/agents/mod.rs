//! Agent invocation.
//!
//! This module provides the `AgentRuntime` trait (Adapter Pattern) for the
//! remote call boundary and the `AgentClient` that wraps it with credential
//! checks, completion decoding and history recording.

pub mod adapters;
pub mod base;
pub mod cli_executor;
pub mod client;

pub use adapters::{MockReply, MockRuntime, ProcessRuntime};
pub use base::{AgentRuntime, CompletionEvent, InvokeRequest, InvokeResponse, TransportError};
pub use client::{session_id_for, AgentClient, CallProfile, DecodeMode};
