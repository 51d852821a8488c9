//! Content Understanding Quick Parse Library
//!
//! This library provides a small client for the Azure AI Content Understanding
//! REST API and the pieces of the quick-parse workflow built on it: submit a
//! document to an analyzer, poll the long-running operation, print the
//! extracted fields and save the raw result.
//!
//! # Modules
//!
//! - `auth`: Subscription key and Azure AD token credentials.
//! - `cli`: Command-line arguments and the end-to-end workflow.
//! - `client`: Content Understanding REST client.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `models`: Operation and analysis result models.
//! - `processor`: Submit-and-wait wrapper around the client.
//! - `report`: Console rendering of extracted fields.
//! - `storage`: JSON result persistence.

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod processor;
pub mod report;
pub mod storage;
