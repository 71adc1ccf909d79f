//! Deal intelligence core: fuses external market sources into a
//! confidence-scored report, predicts weekly walk-in traffic from it, and
//! triages new deals into priority tiers.

pub mod config;
pub mod error;
pub mod infra;
pub mod market;
pub mod repository;
pub mod telemetry;
pub mod traffic;
pub mod triage;
