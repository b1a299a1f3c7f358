//! Afftrack - affiliate click-to-commission attribution service
//!
//! Tracks outbound product clicks, issues affiliate links carrying a
//! tracking token, verifies conversion webhooks, credits commission exactly
//! once per order, and manages withdrawable balances.
//!
//! # Architecture
//! - `api`: HTTP routes, JWT auth, response envelope
//! - `services`: attribution, link issuance, commission rates, balances
//! - `storage`: SeaORM persistence (SQLite, MySQL, PostgreSQL)
//! - `config`: TOML + environment configuration
//! - `system`: logging setup

pub mod api;
pub mod config;
pub mod errors;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
