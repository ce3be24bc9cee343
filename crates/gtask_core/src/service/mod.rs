//! Host-facing use-case services.
//!
//! # Responsibility
//! - Orchestrate store and tree calls into editing sessions.
//! - Flatten trees into display rows so hosts only render.

pub mod outline;
pub mod session;
