//! JourneyLens - analytics over a travel journey's environmental readings,
//! biometric readings and journal entries.
//!
//! The [`analysis`] engine is pure and synchronous; [`source`] loads the
//! record snapshots it works on and [`report`] renders the results.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod models;
pub mod report;
pub mod source;
