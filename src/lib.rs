//! Storefront catalog library
//!
//! Category normalization, asset discovery and catalog top-up planning for
//! the storefront product database, plus the operator tasks around it
//! (admin seeding, cleaning, password reset).
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod migrator;
pub mod repositories;
pub mod services;

pub use errors::{SeedError, SeedResult};
