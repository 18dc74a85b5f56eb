//! Teamsheet - attendance confirmation tokens and audit logging
//!
//! This library provides the trust and accountability pieces of a sports
//! club management platform: signed, expiring links that let an athlete
//! confirm attendance without logging in, and an append-only audit trail of
//! state-changing operations.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `crypto`: Shared signing secret and HMAC-SHA256 primitives
//! - `token`: Stateless confirmation tokens and links
//! - `audit`: Field diffs and best-effort audit logging
//! - `storage`: JSON file storage for recorded confirmations
//! - `services`: Attendance confirmation
//! - `cli` / `display`: Command handlers and terminal formatting
//! - `logging`: Tracing subscriber setup
//!
//! # Example
//!
//! ```rust,ignore
//! use teamsheet::crypto::SigningSecret;
//! use teamsheet::token::{TokenService, DEFAULT_VALIDITY};
//!
//! let tokens = TokenService::new(SigningSecret::from_env("TEAMSHEET_AUTH_SECRET")?);
//! let url = tokens.build_confirmation_url("https://club.example", "session-1", "athlete-7")?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod logging;
pub mod services;
pub mod storage;
pub mod token;

pub use error::{TeamsheetError, TeamsheetResult};
