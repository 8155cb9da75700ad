//! Git integration for the UI.
//!
//! A `std::thread` owns the `GitCli` collaborator and serves `GitRequest`s
//! one at a time, so the event loop keeps ticking while git runs.
pub mod highlight;
pub mod types;
pub mod worker;
