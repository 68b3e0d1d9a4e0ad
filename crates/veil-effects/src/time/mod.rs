//! Time effect handlers

mod fixed;
mod real;

pub use fixed::FixedTimeHandler;
pub use real::RealTimeHandler;
