//! State Management
//!
//! Global application state and the browser session backend.

pub mod global;
pub mod storage;

pub use global::{provide_global_state, GlobalState};
pub use storage::LocalStorage;
