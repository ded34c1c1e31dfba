//! Built-in checks.
//!
//! # Check Types
//! - `http`: HEAD request reachability probe (http.rs)
//! - `memory`: host memory/swap usage threshold (memory.rs)
//!
//! registry.rs maps config `type` names to constructors; embedders add
//! their own types there.

pub mod http;
pub mod memory;
pub mod registry;

pub use http::HttpCheck;
pub use memory::{MemInfo, MemoryCheck};
pub use registry::{parse_params, CheckRegistry};
