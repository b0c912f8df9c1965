//! VR/VA Benefit Engine
//!
//! This crate consolidates the monthly HR spreadsheets of a company, selects
//! the employees eligible for the meal/food voucher benefit, computes each
//! employee's voucher value from union rates and working days, and writes the
//! payout report with the 80% company / 20% employee split. A small document
//! assistant answers questions about the benefit policy.

#![warn(missing_docs)]

pub mod api;
pub mod assistant;
pub mod calculation;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod sources;
