//! # Session Core Service
//!
//! The orchestration layer tying the domain rules to the ports: it drives
//! the secure channel service, validates presented certificates, schedules
//! the discovery loops and hands established peers to the forwarding
//! layer.

// Semantic submodules
mod core;
mod events;
mod resolver;
mod scheduler;

// Re-export public API
pub use core::SessionOrchestrator;
pub use resolver::EndpointResolver;
pub use scheduler::{ContactScheduler, PeriodicLoop};
