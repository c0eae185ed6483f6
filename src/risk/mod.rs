//! Risk management module
//!
//! Fractional Kelly position sizing for risk-free edges

mod kelly;

pub use kelly::KellySizer;
