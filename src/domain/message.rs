//! Control messages carried on channel 1.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value_objects::RouteSet;

/// Structured control messages exchanged between established peers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMessage {
    /// Ask the peer to advertise its local routes.
    RoutesRequest,
    /// Advertise routes reachable through the sender.
    Routes {
        /// Advertised network prefixes.
        routes: RouteSet,
    },
}

impl ControlMessage {
    /// Encode for transmission on the message channel.
    pub fn encode(&self) -> Result<Vec<u8>, MessageError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a received message-channel payload.
    ///
    /// Malformed payloads error out here; the caller logs and drops them
    /// without affecting the session.
    pub fn decode(payload: &[u8]) -> Result<Self, MessageError> {
        Ok(bincode::deserialize(payload)?)
    }
}

/// Codec failure for a control message.
#[derive(Debug, Error)]
pub enum MessageError {
    /// The payload does not decode as a control message.
    #[error("malformed control message: {0}")]
    Codec(#[from] bincode::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_round_trip() {
        let mut routes = RouteSet::new();
        routes.insert("10.1.0.0/16".parse().unwrap());
        routes.insert("2001:db8::/32".parse().unwrap());

        let message = ControlMessage::Routes { routes };
        let encoded = message.encode().unwrap();
        assert_eq!(ControlMessage::decode(&encoded).unwrap(), message);
    }

    #[test]
    fn routes_request_round_trips() {
        let encoded = ControlMessage::RoutesRequest.encode().unwrap();
        assert_eq!(
            ControlMessage::decode(&encoded).unwrap(),
            ControlMessage::RoutesRequest
        );
    }

    #[test]
    fn malformed_payload_errors_instead_of_panicking() {
        assert!(ControlMessage::decode(&[0xff, 0xff, 0xff]).is_err());
        assert!(ControlMessage::decode(&[]).is_err());
    }
}
