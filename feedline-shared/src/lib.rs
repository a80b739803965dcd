//! # Feedline Shared Library
//!
//! Core of the Feedline micro-blogging service: accounts and tokens, the
//! follow graph, tweets and timeline composition. The HTTP server in
//! `feedline-api` is a thin layer over these types.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, credential store, bearer tokens, header auth
//! - `db`: Storage trait with PostgreSQL and in-memory backends, migrations
//! - `error`: Error categories and the storage error type
//! - `graph`: Follow graph
//! - `models`: Users, follow edges, tweets
//! - `timeline`: K-way merge of followee streams
//! - `tweets`: Tweet posting and per-author streams

pub mod auth;
pub mod db;
pub mod error;
pub mod graph;
pub mod models;
pub mod timeline;
pub mod tweets;

/// Current version of the Feedline shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
