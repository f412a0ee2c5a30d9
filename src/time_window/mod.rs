//! Time windows and the admissible-window engine.
//!
//! Every task is offered a set of `[start, end)` windows on a shared grid.
//! The grid step (the *granularity*) is the GCD of all task durations, so
//! every task length is a whole number of grid steps and windows of different
//! tasks line up with each other.

mod engine;
mod window;

pub use engine::{admissible_windows, gcd, granularity, WindowEngine};
pub use window::TimeWindow;
