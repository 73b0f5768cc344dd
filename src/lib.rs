//! # Virtual Network Session Core
//!
//! Control plane of a peer-to-peer encrypted virtual network node: peer
//! discovery, certificate trust-chain validation, session lifecycle
//! orchestration and the handoff of established peers to a frame- or
//! packet-forwarding layer.
//!
//! The actual encrypted datagram transport and the forwarding fabric live
//! behind ports; this crate owns the policy between them: who gets
//! contacted, whose certificates are trusted, when sessions are requested
//! and which peers hold forwarding ports.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture with:
//! - **Domain Layer:** Pure control-plane logic (contacts, trust chains,
//!   ban ranges, fan-out aggregation, control messages)
//! - **Ports Layer:** Trait contracts for the secure channel service, the
//!   forwarding components and the inbound event sink
//! - **Service Layer:** The session orchestrator, contact resolution and
//!   the periodic discovery loops
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vnet_core::{
//!     ChannelConfig, Contact, CoreConfig, Forwarding, SecurityConfig,
//!     SessionOrchestrator,
//! };
//! # use vnet_core::{FrameSwitch, SecureChannel};
//! # async fn run(
//! #     channel: Arc<dyn SecureChannel>,
//! #     switch: Arc<dyn FrameSwitch>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let config = CoreConfig {
//!     channel: ChannelConfig {
//!         contact_list: vec!["peer.example:12000".parse::<Contact>()?],
//!         ..ChannelConfig::default()
//!     },
//!     ..CoreConfig::default()
//! };
//!
//! let core = Arc::new(SessionOrchestrator::new(
//!     config,
//!     channel,
//!     Forwarding::Bridged(switch),
//! ));
//! core.open().await?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// =============================================================================
// CORE RE-EXPORTS
// =============================================================================

// Configuration
pub use config::{
    ChannelConfig, CoreConfig, ForwardingConfig, ForwardingMode, SecurityConfig, CONTACT_PERIOD,
    DYNAMIC_CONTACT_PERIOD,
};

// Domain entities
pub use domain::{
    AlgorithmInfo, BannedHostFilter, CertificateError, ChannelNumber, CipherAlgorithm, Contact,
    ContactParseError, ControlMessage, CoreError, Fingerprint, Identity, MessageError,
    PeerCertificate, PeerEndpoint, ResolutionProtocol, ResolveError, ResultsGatherer,
    RevocationList, RouteSet, TransportError, ValidationError, DEFAULT_PORT,
};

// Trust and validation
pub use domain::trust::{
    CertificateValidator, ExternalValidator, RevocationMethod, TrustStore, ValidationMethod,
};

// Port traits
pub use ports::{
    Forwarding, FrameSwitch, PacketRouter, PortSender, SecureChannel, TransportEventSink,
};

// Service
pub use service::{ContactScheduler, EndpointResolver, PeriodicLoop, SessionOrchestrator};
