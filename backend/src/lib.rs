//! # Demand Map Backend
//!
//! Region-level pickup demand forecasting for a city map.
//!
//! Pre-fit artifacts (coordinate scaler, k-means region model, column
//! encoder, regressor) are loaded once at startup together with the
//! feature table and historical pickup locations. Given a date and time the
//! backend predicts pickups per region for the next 15-minute interval and
//! packages them as map data. A model registry (in-memory or MLflow) backs
//! model promotion and the post-promotion load check.
//!
//! ## Architecture
//!
//! - [`models`]: Region ids, coordinates, feature rows and time helpers
//! - [`artifacts`]: Artifact types, inference pipeline and the loader
//! - [`services`]: Region resolution, demand prediction, map assembly
//! - [`registry`]: Model registry backends and lifecycle management
//! - [`routes`]: Response payload types
//! - [`config`]: TOML configuration with environment overrides
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RegistryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod artifacts;
pub mod bootstrap;
pub mod config;
pub mod models;
pub mod registry;
pub mod routes;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
