//! The session orchestrator.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::{CoreConfig, CONTACT_PERIOD, DYNAMIC_CONTACT_PERIOD};
use crate::domain::{
    BannedHostFilter, CertificateValidator, Contact, CoreError, Fingerprint, PeerCertificate,
    PeerEndpoint, ResultsGatherer, RouteSet, TransportError, TrustStore, DEFAULT_PORT,
};
use crate::ports::inbound::TransportEventSink;
use crate::ports::outbound::{Forwarding, PortSender, SecureChannel};
use crate::service::resolver::EndpointResolver;
use crate::service::scheduler::{ContactScheduler, PeriodicLoop};

/// Policy and orchestration layer above the secure channel service.
///
/// Owns the trust store, the banned-host filter, the discovery loops and
/// the peer→forwarding-port associations. Registers itself as the
/// transport's event sink at open time and drives the
/// greet → introduce → session-request sequence per peer.
pub struct SessionOrchestrator {
    config: CoreConfig,
    channel: Arc<dyn SecureChannel>,
    forwarding: Forwarding,
    resolver: EndpointResolver,
    validator: CertificateValidator,
    banned: BannedHostFilter,
    // Peers currently holding a forwarding port; at most one per peer.
    ports: Mutex<HashSet<PeerEndpoint>>,
    scheduler: Mutex<Option<ContactScheduler>>,
}

impl SessionOrchestrator {
    /// Assemble the orchestrator. The trust store and banned-host filter
    /// are built here from configuration and are immutable afterwards.
    ///
    /// `forwarding` must match the configured forwarding mode.
    pub fn new(config: CoreConfig, channel: Arc<dyn SecureChannel>, forwarding: Forwarding) -> Self {
        let resolver = EndpointResolver::new(
            config.channel.hostname_resolution_protocol,
            DEFAULT_PORT,
        );
        let banned = BannedHostFilter::new(config.channel.never_contact_list.clone());
        let store = TrustStore::new(
            config.security.certificate_authorities.clone(),
            config.security.revocation_lists.clone(),
            config.security.certificate_revocation_validation_method,
        );
        let validator = CertificateValidator::new(
            config.security.certificate_validation_method,
            store,
            config.security.external_validator.clone(),
        );

        Self {
            config,
            channel,
            forwarding,
            resolver,
            validator,
            banned,
            ports: Mutex::new(HashSet::new()),
            scheduler: Mutex::new(None),
        }
    }

    /// Open the core: verify an identity is configured, resolve the listen
    /// endpoint, open the secure channel service with this orchestrator as
    /// its event sink, and start both discovery loops.
    pub async fn open(self: &Arc<Self>) -> Result<(), CoreError> {
        debug!("opening session core");

        if self.config.security.identity.is_none() {
            return Err(CoreError::MissingIdentity);
        }

        let listen = self.resolver.resolve(&self.config.channel.listen_on).await?;
        info!(%listen, "core set to listen on");

        self.channel
            .set_cipher_capabilities(self.config.channel.cipher_capabilities.clone());
        self.channel
            .register_event_sink(Arc::clone(self) as Arc<dyn TransportEventSink>);
        self.channel.open(listen).await?;

        for range in self.banned.ranges() {
            info!(%range, "configured to never accept requests from");
        }

        let contact_core = Arc::clone(self);
        let contact_loop = PeriodicLoop::spawn("contact", CONTACT_PERIOD, move || {
            let core = Arc::clone(&contact_core);
            async move { core.contact_all().await }
        });

        let dynamic_core = Arc::clone(self);
        let dynamic_contact_loop =
            PeriodicLoop::spawn("dynamic-contact", DYNAMIC_CONTACT_PERIOD, move || {
                let core = Arc::clone(&dynamic_core);
                async move { core.dynamic_contact_all().await }
            });

        *self.scheduler.lock() = Some(ContactScheduler::new(contact_loop, dynamic_contact_loop));

        debug!("session core opened");
        Ok(())
    }

    /// Close the core: cancel both discovery loops, then close the secure
    /// channel service, in that order, so no discovery traffic is
    /// generated mid-teardown. Safe to call even if `open` partially
    /// failed.
    pub async fn close(&self) {
        debug!("closing session core");

        let scheduler = self.scheduler.lock().take();
        if let Some(scheduler) = scheduler {
            scheduler.stop().await;
        }

        self.channel.close().await;

        debug!("session core closed");
    }

    /// Resolve a contact and, on success, greet it. Resolution and greet
    /// failures are logged only; the next periodic cycle retries.
    pub async fn contact(&self, target: &Contact) {
        match self.resolver.resolve(target).await {
            Ok(endpoint) => self.do_contact(target, endpoint).await,
            Err(error) => {
                // Zero-duration placeholder keeps the log shape uniform
                // with the latency-measuring path.
                debug!(contact = %target, %error, elapsed = ?Duration::ZERO, "unable to resolve contact");
            }
        }
    }

    /// Greet a resolved endpoint; a hello response triggers an automatic
    /// introduction.
    async fn do_contact(&self, host: &Contact, endpoint: PeerEndpoint) {
        match self.channel.greet(endpoint).await {
            Ok(latency) => {
                debug!(contact = %host, %endpoint, ?latency, "received hello response");
                self.introduce_to(endpoint).await;
            }
            Err(TransportError::HelloTimedOut) => {
                debug!(contact = %host, %endpoint, "no hello response before timeout");
            }
            Err(error) => {
                debug!(contact = %host, %error, "unable to send hello");
            }
        }
    }

    /// Issue a contact for every statically configured contact.
    pub async fn contact_all(&self) {
        for contact in &self.config.channel.contact_list {
            self.contact(contact).await;
        }
    }

    /// Fan a contact request for every dynamic-contact fingerprint out to
    /// all configured static contacts, collecting one result per peer.
    /// The aggregate handler logs per-peer failures once all responded.
    pub async fn dynamic_contact_all(self: &Arc<Self>) {
        let fingerprints: Arc<Vec<Fingerprint>> = Arc::new(
            self.config
                .channel
                .dynamic_contact_list
                .iter()
                .map(PeerCertificate::fingerprint)
                .collect(),
        );

        if fingerprints.is_empty() {
            return;
        }

        let mut targets: HashSet<PeerEndpoint> = HashSet::new();
        for contact in &self.config.channel.contact_list {
            match self.resolver.resolve(contact).await {
                Ok(endpoint) => {
                    targets.insert(endpoint);
                }
                Err(error) => {
                    debug!(contact = %contact, %error, "skipping unresolved contact for fan-out");
                }
            }
        }

        if targets.is_empty() {
            debug!("no contactable peers for dynamic contact discovery");
            return;
        }

        debug!(
            fingerprints = fingerprints.len(),
            peers = targets.len(),
            "sending contact requests"
        );

        let gatherer = Arc::new(ResultsGatherer::new(
            targets.clone(),
            Self::log_contact_request_results,
        ));

        let mut tasks = Vec::with_capacity(targets.len());
        for target in targets {
            let channel = Arc::clone(&self.channel);
            let fingerprints = Arc::clone(&fingerprints);
            let gatherer = Arc::clone(&gatherer);

            tasks.push(tokio::spawn(async move {
                let result = channel.send_contact_request(target, &fingerprints).await;
                gatherer.gather(target, result);
            }));
        }

        for task in tasks {
            let _ = task.await;
        }
    }

    fn log_contact_request_results(results: HashMap<PeerEndpoint, Result<(), TransportError>>) {
        for (peer, result) in results {
            if let Err(error) = result {
                warn!(%peer, %error, "error sending contact request");
            }
        }
    }

    /// Send the local presentation to a peer.
    pub(crate) async fn introduce_to(&self, target: PeerEndpoint) {
        if let Err(error) = self.channel.introduce_to(target).await {
            warn!(%target, %error, "error sending introduction message");
        }
    }

    /// Request a session with a peer whose presentation validated.
    pub(crate) async fn request_session_with(&self, target: PeerEndpoint) {
        if let Err(error) = self.channel.request_session(target).await {
            warn!(%target, %error, "error requesting session");
        }
    }

    /// Validate a presented certificate under the configured method.
    pub fn certificate_is_valid(&self, certificate: &PeerCertificate) -> bool {
        self.validator.validate(certificate)
    }

    /// Register a forwarding port for a newly established peer. A peer
    /// that already holds a port (session renewal) keeps its existing one.
    pub(crate) fn register_forwarding_port(&self, peer: PeerEndpoint) {
        if !self.ports.lock().insert(peer) {
            debug!(%peer, "forwarding port already registered");
            return;
        }

        let sender = PortSender::new(Arc::clone(&self.channel), peer);
        match &self.forwarding {
            Forwarding::Bridged(switch) => switch.register_port(peer, sender),
            Forwarding::Routed(router) => router.register_port(peer, RouteSet::new(), sender),
        }
    }

    /// Tear down the forwarding port for a lost peer. Absence of a port
    /// is not an error.
    pub(crate) fn unregister_forwarding_port(&self, peer: PeerEndpoint) {
        if !self.ports.lock().remove(&peer) {
            return;
        }

        match &self.forwarding {
            Forwarding::Bridged(switch) => switch.unregister_port(&peer),
            Forwarding::Routed(router) => router.unregister_port(&peer),
        }
    }

    /// Number of currently registered forwarding ports.
    pub fn forwarding_port_count(&self) -> usize {
        self.ports.lock().len()
    }

    pub(crate) fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub(crate) fn banned(&self) -> &BannedHostFilter {
        &self.banned
    }

    pub(crate) fn forwarding(&self) -> &Forwarding {
        &self.forwarding
    }
}
