//! Typed configuration for the session core.
//!
//! Parsing configuration files is out of scope; these structs are the
//! contract between whatever loads configuration and the orchestrator.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use ipnet::IpNet;

use crate::domain::trust::{ExternalValidator, RevocationMethod, ValidationMethod};
use crate::domain::{CipherAlgorithm, Contact, Identity, PeerCertificate, ResolutionProtocol, RevocationList, DEFAULT_PORT};

/// Period of the static-contact re-announcement loop.
pub const CONTACT_PERIOD: Duration = Duration::from_secs(30);

/// Period of the dynamic (fingerprint-based) contact discovery loop.
pub const DYNAMIC_CONTACT_PERIOD: Duration = Duration::from_secs(45);

/// Complete configuration of the session core.
#[derive(Clone, Debug, Default)]
pub struct CoreConfig {
    /// Secure channel / discovery settings.
    pub channel: ChannelConfig,
    /// Certificate and validation settings.
    pub security: SecurityConfig,
    /// Forwarding handoff settings.
    pub forwarding: ForwardingConfig,
}

/// Discovery and transport-facing settings.
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    /// Endpoint or hostname to listen on.
    pub listen_on: Contact,
    /// Statically configured contacts.
    pub contact_list: Vec<Contact>,
    /// Dynamically configured contacts, identified by certificate rather
    /// than address; discovered through fingerprint relaying.
    pub dynamic_contact_list: Vec<PeerCertificate>,
    /// Network ranges that must never be contacted or accepted.
    pub never_contact_list: Vec<IpNet>,
    /// Whether inbound contact requests are honored.
    pub accept_contact_requests: bool,
    /// Whether inbound contact announcements are honored.
    pub accept_contacts: bool,
    /// Cipher algorithms offered during session negotiation.
    pub cipher_capabilities: Vec<CipherAlgorithm>,
    /// Protocol hint for hostname resolution.
    pub hostname_resolution_protocol: ResolutionProtocol,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            listen_on: Contact::Literal(SocketAddr::new(
                IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                DEFAULT_PORT,
            )),
            contact_list: Vec::new(),
            dynamic_contact_list: Vec::new(),
            never_contact_list: Vec::new(),
            accept_contact_requests: true,
            accept_contacts: true,
            cipher_capabilities: CipherAlgorithm::default_capabilities(),
            hostname_resolution_protocol: ResolutionProtocol::default(),
        }
    }
}

/// Certificate material and validation policy.
#[derive(Clone, Default)]
pub struct SecurityConfig {
    /// The node's own certificates and keys. Required; `open()` fails
    /// without it.
    pub identity: Option<Identity>,
    /// Trusted certificate authorities.
    pub certificate_authorities: Vec<PeerCertificate>,
    /// Certificate revocation lists.
    pub revocation_lists: Vec<RevocationList>,
    /// How presented certificates are validated.
    pub certificate_validation_method: ValidationMethod,
    /// How revocation is checked during chain validation.
    pub certificate_revocation_validation_method: RevocationMethod,
    /// Optional externally supplied validator; when present its verdict
    /// is final after structural verification.
    pub external_validator: Option<ExternalValidator>,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("identity", &self.identity.is_some())
            .field("certificate_authorities", &self.certificate_authorities.len())
            .field("revocation_lists", &self.revocation_lists.len())
            .field(
                "certificate_validation_method",
                &self.certificate_validation_method,
            )
            .field(
                "certificate_revocation_validation_method",
                &self.certificate_revocation_validation_method,
            )
            .field("external_validator", &self.external_validator.is_some())
            .finish()
    }
}

/// How established peers are handed off to the forwarding layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ForwardingMode {
    /// Bridged (switch) mode: forwarding ports carry raw frames.
    #[default]
    Bridged,
    /// Routed mode: forwarding ports carry packets plus route sets.
    Routed,
}

/// Forwarding handoff settings.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardingConfig {
    /// Selected forwarding mode. The forwarding collaborator passed to the
    /// orchestrator must match.
    pub mode: ForwardingMode,
}
