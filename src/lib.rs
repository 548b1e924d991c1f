//! Magasin core library
//!
//! Persistence of internal and external order aggregates for a stock-room
//! inventory, link reconciliation and the derived inventory view.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod common;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod migrator;
pub mod models;
pub mod repositories;
pub mod services;

pub use errors::{ErrorCategory, ServiceError};
pub use services::{ExternalOrderStore, InternalOrderStore, InventoryAggregator};
