//! GeoHarvest Core - Fetching, geometry normalization, and identity resolution
//!
//! This crate contains the domain logic and port definitions for the GeoHarvest pipeline.

pub mod config;
pub mod error;
pub mod fetch;
pub mod identity;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod ports;

pub use error::{HarvestError, Result};
