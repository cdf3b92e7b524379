use thiserror::Error;

pub type TrustResult<T> = Result<T, TrustError>;

#[derive(Debug, Error)]
pub enum TrustError {
    /// The public key offered at issuance is already bound to a certificate.
    #[error("sybil detected: public key already bound (claimed identity {0})")]
    SybilDetected(String),

    #[error("snapshot i/o: {0}")]
    Snapshot(#[from] std::io::Error),

    #[error("snapshot encoding: {0}")]
    SnapshotEncoding(#[from] serde_json::Error),

    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
}
