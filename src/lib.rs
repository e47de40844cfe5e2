//! `loan-radar` library crate.
//!
//! The binary (`radar`) is a thin wrapper around this library so that:
//!
//! - the estimator and chart geometry are testable without a terminal
//! - front-ends (TUI, one-shot CLI commands) share one session model
//! - presentation code never reaches into the core math

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod estimator;
pub mod geometry;
pub mod io;
pub mod plot;
pub mod report;
pub mod session;
pub mod telemetry;
pub mod tui;
