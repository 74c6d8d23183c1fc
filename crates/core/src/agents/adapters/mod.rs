//! Agent runtime implementations.

pub mod mock_runtime;
mod process_runtime;

pub use mock_runtime::{MockReply, MockRuntime};
pub use process_runtime::ProcessRuntime;
