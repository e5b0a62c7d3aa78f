//! Financial computation engine for small-business bookkeeping.
//!
//! This crate settles monthly payroll (progressive tax, insurance and net
//! salary for every active employee of a company) and invoices (per-line tax
//! and discount, invoice totals) using fixed-point decimal arithmetic.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
