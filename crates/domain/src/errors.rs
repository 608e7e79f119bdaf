use thiserror::Error;

/// Error taxonomy shared by the DNS client, the crypto verifier, and the
/// chain-of-trust walker. Every variant maps to exactly one `TestStep`
/// status at the call site that observes it.
#[derive(Error, Debug)]
pub enum TrustWalkError {
    #[error("query to {origin} for {qname} ({rdtype}) timed out")]
    QueryTimeout {
        origin: String,
        qname: String,
        rdtype: String,
    },

    #[error("query failed: {detail}")]
    QueryError { detail: String },

    #[error("no DNSSEC response: {detail}")]
    QueryNoResponse { detail: String },

    #[error("unsupported DNSSEC algorithm: {0}")]
    UnsupportedAlgorithm(u8),

    #[error("unsupported DS digest type: {0}")]
    UnsupportedDigest(u8),

    #[error("cryptographic verification error: {0}")]
    CryptoError(String),

    #[error("key tag {key_tag} does not match any DS digest from the parent zone")]
    ChainOfTrustMismatch { key_tag: u16 },

    #[error("key tag {key_tag} is not present in the chain of trust or the RRSet itself")]
    KeyTagNotInChain { key_tag: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode DNS wire message: {0}")]
    WireDecode(String),

    #[error("invalid domain name: {0}")]
    InvalidDomainName(String),
}

impl TrustWalkError {
    /// Whether this error kind is WARNING-grade at the DS-fetch step
    /// (§4.8.2a: an authoritative "not signed" answer is not a failure).
    pub fn is_unsigned_zone(&self) -> bool {
        matches!(self, TrustWalkError::QueryNoResponse { .. })
    }
}
