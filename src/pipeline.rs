//! The proof pipeline: hash, witness, prove twice, self-verify, encode.
//!
//! One invocation is one linear pass through the stages below. Progress is
//! reported through a caller-supplied callback before and after each stage;
//! on failure the error is logged and propagated unchanged, and the caller
//! retries by resubmitting. A second invocation while one is in flight is
//! rejected with [`PanagramError::Busy`] rather than queued.

use std::sync::atomic::{AtomicBool, Ordering};

use common::{PanagramError, ProofBundle, Transcript};

use crate::circuits::CircuitArtifact;
use crate::encoder;
use crate::field;
use crate::prover::{ProofBackend, Verbosity};
use crate::witness::{self, CircuitInputs};

/// Steps of one proof-generation invocation, in order. `Failed` is reachable
/// from every working stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Idle,
    HashingGuess,
    GeneratingWitness,
    GeneratingOnChainProof,
    GeneratingOffChainProof,
    Verifying,
    Encoding,
    Done,
    Failed,
}

impl Stage {
    /// Progress messages emitted before and after the stage. Terminal states
    /// have none.
    fn messages(self) -> Option<(&'static str, &'static str)> {
        match self {
            Stage::HashingGuess => Some(("Hashing guess... ⏳", "Hashed guess... ✅")),
            Stage::GeneratingWitness => Some(("Generating witness... ⏳", "Generated witness... ✅")),
            Stage::GeneratingOnChainProof => Some(("Generating proof... ⏳", "Generated proof... ✅")),
            Stage::GeneratingOffChainProof => {
                Some(("Generating off-chain proof... ⏳", "Generated off-chain proof... ✅"))
            }
            Stage::Verifying => Some(("Verifying proof... ⏳", "Proof is valid: true ✅")),
            Stage::Encoding => Some(("Encoding payload... ⏳", "Encoded payload... ✅")),
            Stage::Idle | Stage::Done | Stage::Failed => None,
        }
    }
}

/// Result of a successful pipeline run: the on-chain proof, its public
/// inputs, and the ABI-encoded calldata ready for submission.
pub struct ProvedGuess {
    pub proof: Vec<u8>,
    pub public_inputs: Vec<[u8; 32]>,
    pub payload: Vec<u8>,
}

pub struct ProofPipeline {
    artifact: CircuitArtifact,
    backend: ProofBackend,
    in_flight: AtomicBool,
}

/// Releases the in-flight flag on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn step<T>(
    stage: Stage,
    progress: &mut dyn FnMut(&str),
    f: impl FnOnce() -> Result<T, PanagramError>,
) -> Result<T, PanagramError> {
    if let Some((pending, _)) = stage.messages() {
        progress(pending);
    }
    let out = f().map_err(|e| {
        log::error!("{stage:?} failed: {e}");
        e
    })?;
    if let Some((_, done)) = stage.messages() {
        progress(done);
    }
    Ok(out)
}

impl ProofPipeline {
    pub fn new(artifact: CircuitArtifact) -> Self {
        let backend = ProofBackend::new(&artifact);
        Self {
            artifact,
            backend,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.backend = self.backend.with_verbosity(verbosity);
        self
    }

    fn acquire(&self) -> Result<InFlightGuard<'_>, PanagramError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .map_err(|_| PanagramError::Busy)?;
        Ok(InFlightGuard(&self.in_flight))
    }

    /// Prove a plaintext guess. This is the UI-facing entry point: the guess
    /// is hashed into the field here, then fed through the shared pipeline.
    pub fn prove_guess(
        &self,
        guess: &str,
        address: &str,
        answer_double_hash: &str,
        mut progress: impl FnMut(&str),
    ) -> Result<ProvedGuess, PanagramError> {
        let _guard = self.acquire()?;
        let inputs = step(Stage::HashingGuess, &mut progress, || {
            if guess.trim().is_empty() {
                return Err(PanagramError::InvalidInput("empty guess".to_string()));
            }
            Ok(CircuitInputs {
                guess_hash: field::hash_guess(guess),
                answer_double_hash: field::parse_field_hex(answer_double_hash)?,
                address: field::parse_address(address)?,
            })
        })?;
        self.run(inputs, &mut progress)
    }

    /// Prove an already-hashed guess commitment, as the CLI does. Hex parsing
    /// stands in for the hashing stage.
    pub fn prove_hash(
        &self,
        guess_hash: &str,
        answer_double_hash: &str,
        address: &str,
        mut progress: impl FnMut(&str),
    ) -> Result<ProvedGuess, PanagramError> {
        let _guard = self.acquire()?;
        let inputs = step(Stage::HashingGuess, &mut progress, || {
            CircuitInputs::from_strings(guess_hash, answer_double_hash, address)
        })?;
        self.run(inputs, &mut progress)
    }

    fn run(
        &self,
        inputs: CircuitInputs,
        progress: &mut dyn FnMut(&str),
    ) -> Result<ProvedGuess, PanagramError> {
        let witness = step(Stage::GeneratingWitness, progress, || {
            witness::execute(&self.artifact, &inputs)
        })?;

        let onchain = step(Stage::GeneratingOnChainProof, progress, || {
            self.backend.generate_proof(&witness, Transcript::Keccak)
        })?;
        let offchain = step(Stage::GeneratingOffChainProof, progress, || {
            self.backend.generate_proof(&witness, Transcript::Native)
        })?;

        step(Stage::Verifying, progress, || {
            self.verify_before_submission(&offchain)
        })?;

        let payload = step(Stage::Encoding, progress, || {
            Ok(encoder::encode_payload(&onchain.proof, &onchain.public_inputs))
        })?;

        Ok(ProvedGuess {
            proof: onchain.proof,
            public_inputs: onchain.public_inputs,
            payload,
        })
    }

    // Abort before submission rather than spend gas on a doomed transaction.
    fn verify_before_submission(&self, offchain: &ProofBundle) -> Result<(), PanagramError> {
        if self.backend.verify_proof(offchain)? {
            Ok(())
        } else {
            Err(PanagramError::Computation(
                "local proof verification failed; refusing to submit".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::hash::double_hash;

    const ADDRESS: &str = "0x8D0EF35fF6E9e4234b34B916EF842d199AB10a7a";

    fn answer_hex(secret: &str) -> String {
        field::field_to_hex(double_hash(field::hash_guess(secret)))
    }

    fn pipeline() -> Result<ProofPipeline, anyhow::Error> {
        Ok(ProofPipeline::new(CircuitArtifact::dev_setup()?).with_verbosity(Verbosity::Quiet))
    }

    #[test]
    fn correct_guess_end_to_end() -> Result<(), anyhow::Error> {
        let pipeline = pipeline()?;
        let answer = answer_hex("triangles");
        let mut messages = Vec::new();

        let proved =
            pipeline.prove_guess("triangles", ADDRESS, &answer, |m| messages.push(m.to_string()))?;

        // First public input is the answer double hash.
        assert_eq!(
            field::field_to_hex(field::reduce_bytes(&proved.public_inputs[0])),
            answer
        );
        assert_eq!(proved.proof.len(), 256);

        let (proof_back, inputs_back) = encoder::decode_payload(&proved.payload)?;
        assert_eq!(proof_back, proved.proof);
        assert_eq!(inputs_back, proved.public_inputs);

        assert_eq!(
            messages,
            vec![
                "Hashing guess... ⏳",
                "Hashed guess... ✅",
                "Generating witness... ⏳",
                "Generated witness... ✅",
                "Generating proof... ⏳",
                "Generated proof... ✅",
                "Generating off-chain proof... ⏳",
                "Generated off-chain proof... ✅",
                "Verifying proof... ⏳",
                "Proof is valid: true ✅",
                "Encoding payload... ⏳",
                "Encoded payload... ✅",
            ]
        );
        Ok(())
    }

    #[test]
    fn wrong_guess_is_a_constraint_violation() -> Result<(), anyhow::Error> {
        let pipeline = pipeline()?;
        let answer = answer_hex("triangles");
        let mut messages = Vec::new();

        let result =
            pipeline.prove_guess("wrongword", ADDRESS, &answer, |m| messages.push(m.to_string()));

        assert!(matches!(result, Err(PanagramError::ConstraintViolation)));
        // The pipeline stops inside witness generation; no proof messages.
        assert_eq!(messages.last().map(String::as_str), Some("Generating witness... ⏳"));
        Ok(())
    }

    #[test]
    fn malformed_address_fails_before_witness_generation() -> Result<(), anyhow::Error> {
        let pipeline = pipeline()?;
        let answer = answer_hex("triangles");
        let mut messages = Vec::new();

        let result =
            pipeline.prove_guess("triangles", "0x1234", &answer, |m| messages.push(m.to_string()));

        assert!(matches!(result, Err(PanagramError::InvalidInput(_))));
        assert_eq!(messages, vec!["Hashing guess... ⏳"]);
        Ok(())
    }

    #[test]
    fn empty_guess_is_invalid_input() -> Result<(), anyhow::Error> {
        let pipeline = pipeline()?;
        let answer = answer_hex("triangles");

        let result = pipeline.prove_guess("   ", ADDRESS, &answer, |_| {});
        assert!(matches!(result, Err(PanagramError::InvalidInput(_))));
        Ok(())
    }

    #[test]
    fn prehashed_entry_point_matches_the_cli_contract() -> Result<(), anyhow::Error> {
        let pipeline = pipeline()?;
        let guess_hash = field::field_to_hex(field::hash_guess("triangles"));
        let answer = answer_hex("triangles");

        let proved = pipeline.prove_hash(&guess_hash, &answer, ADDRESS, |_| {})?;
        assert!(!proved.payload.is_empty());
        Ok(())
    }

    #[test]
    fn second_invocation_in_flight_is_rejected() -> Result<(), anyhow::Error> {
        let pipeline = pipeline()?;
        let answer = answer_hex("triangles");

        let mut nested: Option<Result<(), PanagramError>> = None;
        let outer = pipeline.prove_guess("triangles", ADDRESS, &answer, |_| {
            if nested.is_none() {
                nested = Some(
                    pipeline
                        .prove_guess("triangles", ADDRESS, &answer, |_| {})
                        .map(|_| ()),
                );
            }
        });

        assert!(outer.is_ok());
        assert!(matches!(nested, Some(Err(PanagramError::Busy))));

        // The guard is released once the first run completes.
        assert!(pipeline.prove_guess("triangles", ADDRESS, &answer, |_| {}).is_ok());
        Ok(())
    }
}
