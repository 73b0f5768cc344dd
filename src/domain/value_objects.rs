//! Value objects shared across the core.

use std::collections::BTreeSet;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use ipnet::IpNet;

/// Default service port used when a contact does not carry one.
pub const DEFAULT_PORT: u16 = 12_000;

// =============================================================================
// PeerEndpoint
// =============================================================================

/// A concrete transport endpoint (IP address + port).
///
/// Equality, ordering and hashing are defined by address + port, which makes
/// the type usable as a map/set key throughout the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerEndpoint(SocketAddr);

impl PeerEndpoint {
    /// Create an endpoint from an address and port.
    pub fn new(address: IpAddr, port: u16) -> Self {
        Self(SocketAddr::new(address, port))
    }

    /// The IP address component.
    pub fn address(&self) -> IpAddr {
        self.0.ip()
    }

    /// The port component.
    pub fn port(&self) -> u16 {
        self.0.port()
    }

    /// The underlying socket address.
    pub fn socket_addr(&self) -> SocketAddr {
        self.0
    }
}

impl From<SocketAddr> for PeerEndpoint {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl fmt::Display for PeerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PeerEndpoint {
    type Err = std::net::AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<SocketAddr>().map(Self)
    }
}

// =============================================================================
// Contact
// =============================================================================

/// A configured reference used to initiate peer discovery.
///
/// Either a literal endpoint (no resolution round trip required) or a
/// hostname that must be resolved before the peer can be contacted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Contact {
    /// A literal socket address.
    Literal(SocketAddr),
    /// A hostname, optionally carrying an explicit port.
    ///
    /// When `port` is `None` the resolver substitutes [`DEFAULT_PORT`].
    Host {
        /// Hostname to resolve.
        name: String,
        /// Explicit port, if configured.
        port: Option<u16>,
    },
}

impl Contact {
    /// Build a hostname contact.
    pub fn host(name: impl Into<String>, port: Option<u16>) -> Self {
        Self::Host {
            name: name.into(),
            port,
        }
    }
}

impl From<SocketAddr> for Contact {
    fn from(addr: SocketAddr) -> Self {
        Self::Literal(addr)
    }
}

impl From<PeerEndpoint> for Contact {
    fn from(endpoint: PeerEndpoint) -> Self {
        Self::Literal(endpoint.socket_addr())
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(addr) => addr.fmt(f),
            Self::Host { name, port: Some(port) } => write!(f, "{name}:{port}"),
            Self::Host { name, port: None } => f.write_str(name),
        }
    }
}

impl FromStr for Contact {
    type Err = ContactParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ContactParseError);
        }

        // Literal endpoints parse directly; everything else is a hostname
        // with an optional trailing `:port`.
        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(Self::Literal(addr));
        }

        match s.rsplit_once(':') {
            Some((name, port)) if !name.is_empty() => {
                let port = port.parse::<u16>().map_err(|_| ContactParseError)?;
                Ok(Self::host(name, Some(port)))
            }
            _ => Ok(Self::host(s, None)),
        }
    }
}

/// Error returned when a contact string cannot be parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactParseError;

impl fmt::Display for ContactParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid contact (expected an endpoint or host[:port])")
    }
}

impl std::error::Error for ContactParseError {}

// =============================================================================
// Fingerprint
// =============================================================================

/// A certificate hash used to identify a peer for dynamic discovery before
/// its address is known.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Wrap a raw 32-byte digest.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", hex::encode(self.0))
    }
}

// =============================================================================
// Cipher algorithms
// =============================================================================

/// Cipher algorithms negotiable for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CipherAlgorithm {
    /// AES-256 in GCM mode.
    Aes256Gcm,
    /// AES-128 in GCM mode.
    Aes128Gcm,
    /// ChaCha20-Poly1305.
    ChaCha20Poly1305,
}

impl CipherAlgorithm {
    /// The capability set offered by default, strongest first.
    pub fn default_capabilities() -> Vec<Self> {
        vec![Self::Aes256Gcm, Self::ChaCha20Poly1305, Self::Aes128Gcm]
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aes256Gcm => f.write_str("aes256-gcm"),
            Self::Aes128Gcm => f.write_str("aes128-gcm"),
            Self::ChaCha20Poly1305 => f.write_str("chacha20-poly1305"),
        }
    }
}

/// The algorithms one side of a session negotiation settled on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlgorithmInfo {
    /// Negotiated cipher.
    pub cipher: CipherAlgorithm,
}

impl fmt::Display for AlgorithmInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cipher: {}", self.cipher)
    }
}

// =============================================================================
// Channels
// =============================================================================

/// A logical channel number on the secure transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelNumber(pub u8);

impl ChannelNumber {
    /// Channel 0 carries network-layer payload (frames or packets).
    pub const DATA: Self = Self(0);
    /// Channel 1 carries structured control messages.
    pub const MESSAGES: Self = Self(1);
}

impl fmt::Display for ChannelNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Network prefixes advertised for a routed-mode forwarding port.
pub type RouteSet = BTreeSet<IpNet>;

// =============================================================================
// Resolution
// =============================================================================

/// Protocol hint constraining hostname resolution results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResolutionProtocol {
    /// Accept the first result of any family.
    #[default]
    Any,
    /// Only accept IPv4 results.
    Ipv4,
    /// Only accept IPv6 results.
    Ipv6,
}

impl ResolutionProtocol {
    /// Whether a resolved address satisfies the hint.
    pub fn matches(&self, addr: &SocketAddr) -> bool {
        match self {
            Self::Any => true,
            Self::Ipv4 => addr.is_ipv4(),
            Self::Ipv6 => addr.is_ipv6(),
        }
    }
}
