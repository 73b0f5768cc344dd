//! Ports layer: trait contracts between the core and its external
//! collaborators.

pub mod inbound;
pub mod outbound;

pub use inbound::TransportEventSink;
pub use outbound::{Forwarding, FrameSwitch, PacketRouter, PortSender, SecureChannel};
