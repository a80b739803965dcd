/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Ping and health check
/// - `auth`: Sign-up and login
/// - `tweets`: Posting tweets
/// - `follows`: Follow and unfollow
/// - `timeline`: Timelines
/// - `users`: Profiles and per-user tweets

pub mod auth;
pub mod follows;
pub mod health;
pub mod timeline;
pub mod tweets;
pub mod users;
