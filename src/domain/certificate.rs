//! Certificate material: peer certificates, revocation lists and the
//! local identity.

use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use x509_parser::prelude::*;

use crate::domain::errors::CertificateError;
use crate::domain::value_objects::Fingerprint;

// =============================================================================
// PeerCertificate
// =============================================================================

/// An X.509 certificate held as DER.
///
/// Parsing is validated once at construction; the subject and issuer are
/// cached so they can be logged without re-parsing. Cloning is cheap (the
/// DER is shared).
#[derive(Clone)]
pub struct PeerCertificate {
    der: Arc<Vec<u8>>,
    subject: String,
    issuer: String,
    fingerprint: Fingerprint,
}

impl PeerCertificate {
    /// Load a certificate from its DER encoding.
    pub fn from_der(der: Vec<u8>) -> Result<Self, CertificateError> {
        let (_, parsed) = X509Certificate::from_der(&der)
            .map_err(|e| CertificateError::MalformedCertificate(e.to_string()))?;

        let subject = parsed.subject().to_string();
        let issuer = parsed.issuer().to_string();

        let mut hasher = Sha256::new();
        hasher.update(&der);
        let fingerprint = Fingerprint::from_bytes(hasher.finalize().into());

        Ok(Self {
            der: Arc::new(der),
            subject,
            issuer,
            fingerprint,
        })
    }

    /// The DER encoding.
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    /// The certificate subject, in RFC 4514 form.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The certificate issuer, in RFC 4514 form.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// SHA-256 digest of the DER encoding.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }
}

impl fmt::Debug for PeerCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerCertificate")
            .field("subject", &self.subject)
            .field("issuer", &self.issuer)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

impl PartialEq for PeerCertificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for PeerCertificate {}

// =============================================================================
// RevocationList
// =============================================================================

/// An X.509 certificate revocation list held as DER.
#[derive(Clone)]
pub struct RevocationList {
    der: Arc<Vec<u8>>,
    issuer: String,
}

impl RevocationList {
    /// Load a CRL from its DER encoding.
    pub fn from_der(der: Vec<u8>) -> Result<Self, CertificateError> {
        let (_, parsed) = CertificateRevocationList::from_der(&der)
            .map_err(|e| CertificateError::MalformedRevocationList(e.to_string()))?;

        let issuer = parsed.tbs_cert_list.issuer.to_string();

        Ok(Self {
            der: Arc::new(der),
            issuer,
        })
    }

    /// The DER encoding.
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    /// The CRL issuer, in RFC 4514 form.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}

impl fmt::Debug for RevocationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevocationList")
            .field("issuer", &self.issuer)
            .finish()
    }
}

// =============================================================================
// Identity
// =============================================================================

/// The node's own certificate material. Required for the node to operate;
/// immutable after load.
#[derive(Clone, Debug)]
pub struct Identity {
    /// Certificate presented for signatures.
    pub signature_certificate: PeerCertificate,
    /// Private key matching the signature certificate (DER).
    pub signature_key: Arc<Vec<u8>>,
    /// Certificate presented for cipherment.
    pub cipherment_certificate: PeerCertificate,
    /// Private key matching the cipherment certificate (DER).
    pub cipherment_key: Arc<Vec<u8>>,
}

impl Identity {
    /// Assemble an identity from certificates and their keys.
    pub fn new(
        signature_certificate: PeerCertificate,
        signature_key: Vec<u8>,
        cipherment_certificate: PeerCertificate,
        cipherment_key: Vec<u8>,
    ) -> Self {
        Self {
            signature_certificate,
            signature_key: Arc::new(signature_key),
            cipherment_certificate,
            cipherment_key: Arc::new(cipherment_key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_der_is_rejected() {
        assert!(PeerCertificate::from_der(vec![0xde, 0xad, 0xbe, 0xef]).is_err());
        assert!(RevocationList::from_der(vec![0x30, 0x00]).is_err());
    }

    #[test]
    fn certificate_caches_subject_and_fingerprint() {
        let key = rcgen::KeyPair::generate().unwrap();
        let mut params = rcgen::CertificateParams::new(vec!["node-a.example".into()]).unwrap();
        params
            .distinguished_name
            .push(rcgen::DnType::CommonName, "node-a");
        let cert = params.self_signed(&key).unwrap();

        let loaded = PeerCertificate::from_der(cert.der().to_vec()).unwrap();
        assert!(loaded.subject().contains("node-a"));
        // Fingerprint is the SHA-256 of the DER, stable across clones.
        assert_eq!(loaded.fingerprint(), loaded.clone().fingerprint());
    }
}
