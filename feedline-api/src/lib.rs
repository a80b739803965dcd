//! # Feedline API Server Library
//!
//! HTTP surface of the Feedline service, exposed as a library so the
//! integration tests can drive the router in-process.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
