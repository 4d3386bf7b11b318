//! ACORD Quote Bridge Library
//!
//! Receives insurance quote submissions, keeps the ones that arrived through
//! the online channel, converts them to ACORD XML, forwards them to the
//! (mocked) TurboRater rating system and keeps them in memory.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Quote pipeline and shared errors/models.
//! - `integrations`: External service integrations.
//! - `acord`: ACORD XML generation.
//! - `config`: Configuration management.
//! - `dispatcher`: Payload decoding, online gate and response mapping.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `mapping`: Field mapping tables for the flat and nested payload shapes.
//! - `models`: Quote input and stored quote models.
//! - `routes`: Router construction.
//! - `store`: In-memory quote store.
//! - `transport`: Transport adapter trait, quote endpoint and gateway entry point.
//! - `turborater`: Mocked TurboRater client.

pub mod api;
pub mod core;
pub mod integrations;

pub mod acord;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod handlers;
pub mod mapping;
pub mod models;
pub mod routes;
pub mod store;
pub mod transport;
pub mod turborater;
