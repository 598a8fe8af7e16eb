//! Backend library for the BrightWave Enterprises marketing site.
//!
//! The heart of the crate is the [`intake`] module: a contact-form admission
//! pipeline that rate-limits inbound submissions per client address, validates
//! and normalizes the payload, and hands the result to the notification and
//! persistence collaborators. The remaining modules provide the service
//! scaffolding (configuration, telemetry, error surface, session guard).

pub mod auth;
pub mod config;
pub mod error;
pub mod intake;
pub mod telemetry;
