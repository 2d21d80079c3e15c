//! qadrill-core — Core grading engine, traits, and report aggregation.
//!
//! This crate defines the fundamental data model, traits, answer-checking
//! logic, and report aggregation that the entire qadrill system builds on.

pub mod auth;
pub mod chat;
pub mod checker;
pub mod engine;
pub mod error;
pub mod judge;
pub mod model;
pub mod parser;
pub mod report;
pub mod traits;
