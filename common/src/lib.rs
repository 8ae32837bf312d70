use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanagramError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("constraints unsatisfied: the guess does not hash to the answer")]
    ConstraintViolation,
    #[error("computation error: {0}")]
    Computation(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("a proof is already in flight; resubmit after it completes")]
    Busy,
}

/// Fiat-Shamir/serialization flavor of a generated proof.
///
/// The two flavors are produced from the same witness but are distinct byte
/// encodings and must never be conflated: only a `Keccak` proof can be
/// submitted on-chain, and only a `Native` proof can be verified locally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transcript {
    /// EVM calldata layout, consumed by the on-chain verifier.
    Keccak,
    /// Arkworks canonical serialization, used for local self-verification.
    Native,
}

/// A generated proof together with its ordered public inputs.
#[derive(Clone, Debug)]
pub struct ProofBundle {
    pub transcript: Transcript,
    pub proof: Vec<u8>,
    /// Big-endian 32-byte values, in the circuit's declared public-input order.
    pub public_inputs: Vec<[u8; 32]>,
}
