//! Asynchronous contact resolution.

use tokio::net::lookup_host;

use crate::domain::{Contact, PeerEndpoint, ResolutionProtocol, ResolveError};

/// Turns configured contacts (hostname or literal address) into concrete
/// transport endpoints.
///
/// Literal contacts resolve trivially without a network round trip.
/// Failure is never fatal: callers log it and retry on the next periodic
/// cycle.
#[derive(Clone, Debug)]
pub struct EndpointResolver {
    protocol: ResolutionProtocol,
    default_port: u16,
}

impl EndpointResolver {
    /// Build a resolver with a protocol hint and the default service port
    /// substituted for contacts that carry none.
    pub fn new(protocol: ResolutionProtocol, default_port: u16) -> Self {
        Self {
            protocol,
            default_port,
        }
    }

    /// Resolve a contact to the first endpoint matching the protocol hint.
    pub async fn resolve(&self, contact: &Contact) -> Result<PeerEndpoint, ResolveError> {
        match contact {
            Contact::Literal(addr) => Ok(PeerEndpoint::from(*addr)),
            Contact::Host { name, port } => {
                let port = port.unwrap_or(self.default_port);
                let addrs = lookup_host((name.as_str(), port))
                    .await
                    .map_err(|source| ResolveError::Lookup {
                        name: name.clone(),
                        source,
                    })?;

                addrs
                    .into_iter()
                    .find(|addr| self.protocol.matches(addr))
                    .map(PeerEndpoint::from)
                    .ok_or_else(|| ResolveError::Empty(name.clone()))
            }
        }
    }
}
