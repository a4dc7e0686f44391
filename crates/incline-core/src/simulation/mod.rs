//! Simulation framework
//!
//! Ground-truth motion profiles, the inclinometer sensor model and the
//! run loop that feeds simulated readings to the filter.

pub mod config;
pub mod profiles;
pub mod sensors;
pub mod runner;

pub use config::*;
pub use profiles::*;
pub use sensors::*;
pub use runner::*;
