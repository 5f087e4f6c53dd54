//! CLI library components for the lab-value validator.

pub mod logging;
