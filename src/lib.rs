//! Simulated ADS-B traffic: per-flight kinematics, LNAV/VNAV guidance, an
//! ISA atmosphere model, fault injection and rule-based anomaly detection,
//! with events exported as JSON Lines.

pub mod anomaly;
pub mod atmosphere;
pub mod cli;
pub mod event;
pub mod exporter;
pub mod flight;
pub mod geo;
pub mod guidance;
pub mod kinematics;
pub mod sim;
