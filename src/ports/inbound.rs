//! Inbound port: the event sink the core implements and the secure
//! channel service drives.

use async_trait::async_trait;

use crate::domain::{
    AlgorithmInfo, ChannelNumber, CipherAlgorithm, Fingerprint, PeerCertificate, PeerEndpoint,
};

/// Callback sink for every event the secure channel service reports.
///
/// One interface, one implementor: the session orchestrator registers
/// itself with the transport at open time. Methods returning `bool` carry
/// the accept/reject verdict back to the transport; the `default_accept`
/// parameter is the transport's own suggested disposition.
#[async_trait]
pub trait TransportEventSink: Send + Sync {
    /// A hello probe arrived from `sender`.
    async fn hello_received(&self, sender: PeerEndpoint, default_accept: bool) -> bool;

    /// A peer asked to be introduced to a third party identified by hash.
    async fn contact_request_received(
        &self,
        sender: PeerEndpoint,
        subject: PeerCertificate,
        fingerprint: Fingerprint,
        answer: PeerEndpoint,
    ) -> bool;

    /// A peer announced a third party's address for a fingerprint.
    async fn contact_received(
        &self,
        sender: PeerEndpoint,
        fingerprint: Fingerprint,
        answer: PeerEndpoint,
    );

    /// A peer presented its signature and cipherment certificates.
    async fn presentation_received(
        &self,
        sender: PeerEndpoint,
        signature_certificate: PeerCertificate,
        cipherment_certificate: PeerCertificate,
        is_new: bool,
    ) -> bool;

    /// A peer offered its cipher capability set.
    async fn session_request_received(
        &self,
        sender: PeerEndpoint,
        capabilities: Vec<CipherAlgorithm>,
        default_accept: bool,
    ) -> bool;

    /// A peer committed to a cipher algorithm.
    async fn session_received(
        &self,
        sender: PeerEndpoint,
        cipher: CipherAlgorithm,
        default_accept: bool,
    ) -> bool;

    /// Session establishment or renewal with `peer` failed.
    async fn session_failed(
        &self,
        peer: PeerEndpoint,
        is_new: bool,
        local: AlgorithmInfo,
        remote: AlgorithmInfo,
    );

    /// A session with `peer` was established (`is_new`) or renewed.
    async fn session_established(
        &self,
        peer: PeerEndpoint,
        is_new: bool,
        local: AlgorithmInfo,
        remote: AlgorithmInfo,
    );

    /// The session with `peer` was lost.
    async fn session_lost(&self, peer: PeerEndpoint);

    /// Payload arrived from an established peer on a logical channel.
    async fn data_received(&self, sender: PeerEndpoint, channel: ChannelNumber, payload: Vec<u8>);
}
