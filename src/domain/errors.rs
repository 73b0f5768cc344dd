//! Error types for the session core.

use thiserror::Error;

/// Fatal errors surfaced by the core lifecycle.
///
/// Everything else (resolution failures, transport errors, policy
/// rejections) is logged and absorbed; only configuration-level problems
/// abort startup.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No local certificate/private key pair is configured.
    #[error("no local identity configured: a certificate and private key are required")]
    MissingIdentity,

    /// The listen endpoint could not be resolved.
    #[error("unable to resolve listen endpoint: {0}")]
    ListenResolution(#[from] ResolveError),

    /// The secure channel service failed to open.
    #[error("secure channel error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors reported by the secure channel service for outbound operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The hello request received no response within the transport's window.
    #[error("hello request timed out")]
    HelloTimedOut,

    /// The peer could not be reached.
    #[error("peer is unreachable")]
    Unreachable,

    /// The secure channel service is closed.
    #[error("secure channel is closed")]
    ChannelClosed,

    /// Any other transport-reported failure.
    #[error("transport failure: {0}")]
    Other(String),
}

/// Errors produced while resolving a contact to a concrete endpoint.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The underlying name lookup failed.
    #[error("name resolution failed for {name}: {source}")]
    Lookup {
        /// Hostname that failed to resolve.
        name: String,
        /// Resolver failure.
        #[source]
        source: std::io::Error,
    },

    /// Resolution succeeded but produced no address matching the
    /// configured protocol hint.
    #[error("no usable address records for {0}")]
    Empty(String),
}

/// Errors produced when loading certificate or revocation-list material.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CertificateError {
    /// The DER blob is not a well-formed X.509 certificate.
    #[error("malformed certificate: {0}")]
    MalformedCertificate(String),

    /// The DER blob is not a well-formed X.509 CRL.
    #[error("malformed certificate revocation list: {0}")]
    MalformedRevocationList(String),
}

/// Reasons a certificate chain fails validation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A certificate in the chain could not be parsed.
    #[error("malformed certificate in chain: {0}")]
    Malformed(String),

    /// No configured authority matches the certificate's issuer.
    #[error("no trusted issuer found for {subject}")]
    UnknownIssuer {
        /// Subject of the certificate whose issuer is missing.
        subject: String,
    },

    /// The issuer's key does not verify the certificate's signature.
    #[error("signature verification failed for {subject}")]
    BadSignature {
        /// Subject of the offending certificate.
        subject: String,
    },

    /// The certificate is outside its validity window.
    #[error("certificate {subject} is expired or not yet valid")]
    OutsideValidity {
        /// Subject of the offending certificate.
        subject: String,
    },

    /// The certificate appears on a configured revocation list.
    #[error("certificate {subject} is revoked")]
    Revoked {
        /// Subject of the revoked certificate.
        subject: String,
    },

    /// The per-certificate check rejected the certificate.
    #[error("certificate {subject} rejected at depth {depth}")]
    Rejected {
        /// Subject of the rejected certificate.
        subject: String,
        /// Chain depth, leaf is 0.
        depth: usize,
    },

    /// The chain exceeds the maximum supported depth.
    #[error("certificate chain exceeds maximum depth")]
    ChainTooLong,
}
