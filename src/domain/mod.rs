//! Domain layer: pure types and logic with no transport or runtime
//! dependencies.

pub mod banned;
pub mod certificate;
pub mod errors;
pub mod gatherer;
pub mod message;
pub mod trust;
pub mod value_objects;

pub use banned::BannedHostFilter;
pub use certificate::{Identity, PeerCertificate, RevocationList};
pub use errors::{CertificateError, CoreError, ResolveError, TransportError, ValidationError};
pub use gatherer::ResultsGatherer;
pub use message::{ControlMessage, MessageError};
pub use trust::{
    CertificateValidator, ExternalValidator, RevocationMethod, TrustStore, ValidationMethod,
};
pub use value_objects::{
    AlgorithmInfo, ChannelNumber, CipherAlgorithm, Contact, ContactParseError, Fingerprint,
    PeerEndpoint, ResolutionProtocol, RouteSet, DEFAULT_PORT,
};
