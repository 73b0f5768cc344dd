//! Membership test against the configured never-contact ranges.

use std::net::IpAddr;

use ipnet::IpNet;

/// Filter over the configured forbidden network ranges.
///
/// Consulted on every inbound (hello, contact request, contact,
/// presentation) and outbound (before issuing a contact) decision.
/// Pure and side-effect free.
#[derive(Clone, Debug, Default)]
pub struct BannedHostFilter {
    ranges: Vec<IpNet>,
}

impl BannedHostFilter {
    /// Build a filter from the configured ranges.
    pub fn new(ranges: Vec<IpNet>) -> Self {
        Self { ranges }
    }

    /// Whether `address` falls within any configured banned range.
    pub fn is_banned(&self, address: IpAddr) -> bool {
        self.ranges.iter().any(|range| range.contains(&address))
    }

    /// The configured ranges, for startup logging.
    pub fn ranges(&self) -> &[IpNet] {
        &self.ranges
    }
}
