pub mod circuits;
pub mod encoder;
pub mod field;
pub mod pipeline;
pub mod prover;
pub mod witness;

pub use circuits::{CircuitArtifact, CircuitSchema, PanagramCircuit};
pub use common::{PanagramError, ProofBundle, Transcript};
pub use pipeline::{ProofPipeline, ProvedGuess, Stage};
pub use prover::{ProofBackend, Verbosity};
pub use witness::{execute, CircuitInputs, Witness};
