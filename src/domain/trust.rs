//! Trust-chain validation.
//!
//! A [`TrustStore`] holds the configured authorities and revocation lists;
//! it is built once at open time and read-only thereafter. The
//! [`CertificateValidator`] walks a presented certificate up to a
//! self-signed root inside the store, verifying signatures and validity
//! windows per RFC 5280, with revocation checking applied according to the
//! configured [`RevocationMethod`].

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};
use x509_parser::prelude::*;

use crate::domain::certificate::{PeerCertificate, RevocationList};
use crate::domain::errors::ValidationError;

/// Maximum supported chain depth, leaf included.
const MAX_CHAIN_DEPTH: usize = 8;

// =============================================================================
// Methods and flags
// =============================================================================

/// Check the CRL status of the terminal (leaf) certificate.
pub const FLAG_CRL_CHECK: u32 = 0b01;
/// Check the CRL status of every certificate in the chain.
/// Only meaningful together with [`FLAG_CRL_CHECK`].
pub const FLAG_CRL_CHECK_ALL: u32 = 0b10;

/// How presented certificates are validated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidationMethod {
    /// Verify the trust chain against the configured store.
    #[default]
    Chain,
    /// Skip structural verification entirely.
    None,
}

/// How certificate revocation is checked during chain verification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RevocationMethod {
    /// Skip revocation checking.
    #[default]
    None,
    /// Check only the leaf certificate against the revocation lists.
    Leaf,
    /// Check every certificate in the chain.
    Chain,
}

impl RevocationMethod {
    /// The verification flag set for this method.
    ///
    /// The `Chain` flag set is a strict superset of the `Leaf` flag set:
    /// full-chain checking always implies leaf checking.
    pub fn verification_flags(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Leaf => FLAG_CRL_CHECK,
            Self::Chain => FLAG_CRL_CHECK | FLAG_CRL_CHECK_ALL,
        }
    }
}

// =============================================================================
// TrustStore
// =============================================================================

/// The configured trust anchors: CA certificates, revocation lists and the
/// revocation-check policy. Immutable once constructed.
#[derive(Clone, Debug, Default)]
pub struct TrustStore {
    authorities: Vec<PeerCertificate>,
    revocation_lists: Vec<RevocationList>,
    revocation: RevocationMethod,
}

impl TrustStore {
    /// Build a store from configuration material.
    pub fn new(
        authorities: Vec<PeerCertificate>,
        revocation_lists: Vec<RevocationList>,
        revocation: RevocationMethod,
    ) -> Self {
        Self {
            authorities,
            revocation_lists,
            revocation,
        }
    }

    /// The configured revocation-check policy.
    pub fn revocation_method(&self) -> RevocationMethod {
        self.revocation
    }
}

// =============================================================================
// CertificateValidator
// =============================================================================

/// Externally supplied validator consulted after structural verification.
/// When present, its verdict is final.
pub type ExternalValidator =
    Arc<dyn Fn(&CertificateValidator, &PeerCertificate) -> bool + Send + Sync>;

/// Validates peer certificates under the configured method.
pub struct CertificateValidator {
    method: ValidationMethod,
    store: TrustStore,
    external: Option<ExternalValidator>,
}

impl CertificateValidator {
    /// Build a validator.
    pub fn new(
        method: ValidationMethod,
        store: TrustStore,
        external: Option<ExternalValidator>,
    ) -> Self {
        Self {
            method,
            store,
            external,
        }
    }

    /// The trust store backing chain verification.
    pub fn trust_store(&self) -> &TrustStore {
        &self.store
    }

    /// Validate a presented certificate. A single boolean gate: there is
    /// no side channel for partial success.
    pub fn validate(&self, certificate: &PeerCertificate) -> bool {
        match self.method {
            ValidationMethod::Chain => {
                if let Err(error) = self.verify_chain(certificate) {
                    warn!(
                        subject = certificate.subject(),
                        %error,
                        "certificate chain validation failed"
                    );
                    return false;
                }
            }
            ValidationMethod::None => {}
        }

        match &self.external {
            Some(external) => external(self, certificate),
            None => true,
        }
    }

    /// Walk the chain from the presented leaf up to a self-signed root in
    /// the store, invoking the per-certificate check at each step.
    fn verify_chain(&self, certificate: &PeerCertificate) -> Result<(), ValidationError> {
        let authorities = parse_certificates(&self.store.authorities)?;
        let revocation_lists = parse_revocation_lists(&self.store.revocation_lists)?;
        let flags = self.store.revocation.verification_flags();

        let (_, leaf) = X509Certificate::from_der(certificate.as_der())
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;

        let mut current = &leaf;
        let mut depth = 0;

        loop {
            if depth >= MAX_CHAIN_DEPTH {
                return Err(ValidationError::ChainTooLong);
            }

            let subject = current.subject().to_string();

            let step = self.verify_step(current, &authorities, &revocation_lists, flags, depth);
            let accepted = self.check_certificate(&subject, depth, &step);

            step?;

            if !accepted {
                return Err(ValidationError::Rejected { subject, depth });
            }

            if is_self_signed(current) {
                // Reached a trusted root.
                return Ok(());
            }

            // verify_step proved the issuer exists in the store.
            current = find_issuer(current, &authorities)
                .ok_or(ValidationError::UnknownIssuer { subject })?;
            depth += 1;
        }
    }

    /// Verify a single certificate of the chain: validity window, issuer
    /// presence, signature, and revocation status per the flag set.
    fn verify_step<'a>(
        &self,
        current: &X509Certificate<'a>,
        authorities: &[X509Certificate<'a>],
        revocation_lists: &[CertificateRevocationList<'a>],
        flags: u32,
        depth: usize,
    ) -> Result<(), ValidationError> {
        let subject = || current.subject().to_string();

        if !current.validity().is_valid() {
            return Err(ValidationError::OutsideValidity { subject: subject() });
        }

        let issuer = if is_self_signed(current) {
            // A self-signed certificate is only acceptable if the store
            // carries it as an authority.
            authorities
                .iter()
                .find(|ca| {
                    ca.subject().as_raw() == current.subject().as_raw()
                        && ca.raw_serial() == current.raw_serial()
                })
                .ok_or(ValidationError::UnknownIssuer { subject: subject() })?
        } else {
            find_issuer(current, authorities)
                .ok_or(ValidationError::UnknownIssuer { subject: subject() })?
        };

        current
            .verify_signature(Some(issuer.public_key()))
            .map_err(|_| ValidationError::BadSignature { subject: subject() })?;

        let check_revocation =
            flags & FLAG_CRL_CHECK != 0 && (depth == 0 || flags & FLAG_CRL_CHECK_ALL != 0);

        if check_revocation && is_revoked(current, revocation_lists) {
            return Err(ValidationError::Revoked { subject: subject() });
        }

        Ok(())
    }

    /// Per-certificate check invoked synchronously, in chain order, during
    /// a single `validate` call. Logs the accept/reject decision; its
    /// return value is the decision for this certificate.
    fn check_certificate(
        &self,
        subject: &str,
        depth: usize,
        result: &Result<(), ValidationError>,
    ) -> bool {
        match result {
            Ok(()) => {
                debug!(subject, depth, "validating certificate: ok");
                true
            }
            Err(error) => {
                warn!(subject, depth, %error, "validating certificate: error");
                false
            }
        }
    }
}

impl fmt::Debug for CertificateValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateValidator")
            .field("method", &self.method)
            .field("store", &self.store)
            .field("external", &self.external.is_some())
            .finish()
    }
}

// =============================================================================
// Chain helpers
// =============================================================================

fn parse_certificates(
    certificates: &[PeerCertificate],
) -> Result<Vec<X509Certificate<'_>>, ValidationError> {
    certificates
        .iter()
        .map(|cert| {
            X509Certificate::from_der(cert.as_der())
                .map(|(_, parsed)| parsed)
                .map_err(|e| ValidationError::Malformed(e.to_string()))
        })
        .collect()
}

fn parse_revocation_lists(
    revocation_lists: &[RevocationList],
) -> Result<Vec<CertificateRevocationList<'_>>, ValidationError> {
    revocation_lists
        .iter()
        .map(|crl| {
            CertificateRevocationList::from_der(crl.as_der())
                .map(|(_, parsed)| parsed)
                .map_err(|e| ValidationError::Malformed(e.to_string()))
        })
        .collect()
}

fn is_self_signed(certificate: &X509Certificate<'_>) -> bool {
    certificate.subject().as_raw() == certificate.issuer().as_raw()
}

fn find_issuer<'c, 'a>(
    certificate: &X509Certificate<'a>,
    authorities: &'c [X509Certificate<'a>],
) -> Option<&'c X509Certificate<'a>> {
    authorities
        .iter()
        .find(|ca| ca.subject().as_raw() == certificate.issuer().as_raw())
}

fn is_revoked(
    certificate: &X509Certificate<'_>,
    revocation_lists: &[CertificateRevocationList<'_>],
) -> bool {
    revocation_lists
        .iter()
        .filter(|crl| crl.tbs_cert_list.issuer.as_raw() == certificate.issuer().as_raw())
        .any(|crl| {
            crl.iter_revoked_certificates()
                .any(|revoked| revoked.raw_serial() == certificate.raw_serial())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{
        BasicConstraints, CertificateParams, CertificateRevocationListParams, DnType, IsCa,
        KeyIdMethod, KeyPair, RevokedCertParams, SerialNumber,
    };

    const LEAF_SERIAL: &[u8] = &[0x2a];

    struct TestPki {
        ca: PeerCertificate,
        leaf: PeerCertificate,
        crl_revoking_leaf: RevocationList,
    }

    fn build_pki() -> TestPki {
        let ca_key = KeyPair::generate().unwrap();
        let mut ca_params = CertificateParams::new(Vec::new()).unwrap();
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        ca_params
            .distinguished_name
            .push(DnType::CommonName, "test authority");
        let ca_cert = ca_params.self_signed(&ca_key).unwrap();

        let leaf_key = KeyPair::generate().unwrap();
        let mut leaf_params = CertificateParams::new(vec!["node-a.example".into()]).unwrap();
        leaf_params
            .distinguished_name
            .push(DnType::CommonName, "node-a");
        leaf_params.serial_number = Some(SerialNumber::from(LEAF_SERIAL.to_vec()));
        let leaf_cert = leaf_params.signed_by(&leaf_key, &ca_cert, &ca_key).unwrap();

        let crl_params = CertificateRevocationListParams {
            this_update: rcgen::date_time_ymd(2024, 1, 1),
            next_update: rcgen::date_time_ymd(4096, 1, 1),
            crl_number: SerialNumber::from(vec![0x01]),
            issuing_distribution_point: None,
            revoked_certs: vec![RevokedCertParams {
                serial_number: SerialNumber::from(LEAF_SERIAL.to_vec()),
                revocation_time: rcgen::date_time_ymd(2024, 1, 2),
                reason_code: None,
                invalidity_date: None,
            }],
            key_identifier_method: KeyIdMethod::Sha256,
        };
        let crl = crl_params.signed_by(&ca_cert, &ca_key).unwrap();

        TestPki {
            ca: PeerCertificate::from_der(ca_cert.der().to_vec()).unwrap(),
            leaf: PeerCertificate::from_der(leaf_cert.der().to_vec()).unwrap(),
            crl_revoking_leaf: RevocationList::from_der(crl.der().to_vec()).unwrap(),
        }
    }

    fn self_signed(common_name: &str) -> PeerCertificate {
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(Vec::new()).unwrap();
        params.distinguished_name.push(DnType::CommonName, common_name);
        let cert = params.self_signed(&key).unwrap();
        PeerCertificate::from_der(cert.der().to_vec()).unwrap()
    }

    #[test]
    fn chain_flags_are_a_strict_superset_of_leaf_flags() {
        let leaf = RevocationMethod::Leaf.verification_flags();
        let chain = RevocationMethod::Chain.verification_flags();

        assert_eq!(chain & leaf, leaf);
        assert_ne!(chain, leaf);
        assert_eq!(RevocationMethod::None.verification_flags(), 0);
    }

    #[test]
    fn none_mode_accepts_any_certificate() {
        let validator =
            CertificateValidator::new(ValidationMethod::None, TrustStore::default(), None);
        assert!(validator.validate(&self_signed("anyone")));
    }

    #[test]
    fn none_mode_defers_to_external_validator() {
        let reject: ExternalValidator = Arc::new(|_, _| false);
        let validator =
            CertificateValidator::new(ValidationMethod::None, TrustStore::default(), Some(reject));
        assert!(!validator.validate(&self_signed("anyone")));

        let accept: ExternalValidator = Arc::new(|_, _| true);
        let validator =
            CertificateValidator::new(ValidationMethod::None, TrustStore::default(), Some(accept));
        assert!(validator.validate(&self_signed("anyone")));
    }

    #[test]
    fn chain_mode_accepts_leaf_signed_by_stored_authority() {
        let pki = build_pki();
        let store = TrustStore::new(vec![pki.ca], Vec::new(), RevocationMethod::None);
        let validator = CertificateValidator::new(ValidationMethod::Chain, store, None);

        assert!(validator.validate(&pki.leaf));
    }

    #[test]
    fn chain_mode_rejects_leaf_with_unknown_issuer() {
        let pki = build_pki();
        let unrelated = self_signed("unrelated authority");
        let store = TrustStore::new(vec![unrelated], Vec::new(), RevocationMethod::None);
        let validator = CertificateValidator::new(ValidationMethod::Chain, store, None);

        assert!(!validator.validate(&pki.leaf));
    }

    #[test]
    fn chain_mode_rejects_self_signed_certificate_not_in_store() {
        let pki = build_pki();
        let store = TrustStore::new(vec![pki.ca], Vec::new(), RevocationMethod::None);
        let validator = CertificateValidator::new(ValidationMethod::Chain, store, None);

        assert!(!validator.validate(&self_signed("impostor")));
    }

    #[test]
    fn revoked_leaf_is_rejected_under_leaf_and_chain_checking() {
        let pki = build_pki();

        for method in [RevocationMethod::Leaf, RevocationMethod::Chain] {
            let store = TrustStore::new(
                vec![pki.ca.clone()],
                vec![pki.crl_revoking_leaf.clone()],
                method,
            );
            let validator = CertificateValidator::new(ValidationMethod::Chain, store, None);
            assert!(!validator.validate(&pki.leaf), "method {method:?}");
        }
    }

    #[test]
    fn revoked_leaf_is_accepted_when_revocation_checking_is_disabled() {
        let pki = build_pki();
        let store = TrustStore::new(
            vec![pki.ca],
            vec![pki.crl_revoking_leaf],
            RevocationMethod::None,
        );
        let validator = CertificateValidator::new(ValidationMethod::Chain, store, None);

        assert!(validator.validate(&pki.leaf));
    }

    #[test]
    fn external_validator_verdict_is_final_after_structural_success() {
        let pki = build_pki();
        let store = TrustStore::new(vec![pki.ca], Vec::new(), RevocationMethod::None);
        let reject: ExternalValidator = Arc::new(|_, _| false);
        let validator = CertificateValidator::new(ValidationMethod::Chain, store, Some(reject));

        assert!(!validator.validate(&pki.leaf));
    }

    #[test]
    fn structural_failure_is_not_overridden_by_external_validator() {
        let pki = build_pki();
        let store = TrustStore::new(Vec::new(), Vec::new(), RevocationMethod::None);
        let accept: ExternalValidator = Arc::new(|_, _| true);
        let validator = CertificateValidator::new(ValidationMethod::Chain, store, Some(accept));

        assert!(!validator.validate(&pki.leaf));
    }
}
