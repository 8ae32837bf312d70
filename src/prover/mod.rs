//! Groth16 proof backend over BN254.
//!
//! One witness yields two proof encodings: the `Keccak` transcript is the
//! EVM calldata layout the on-chain verifier consumes, the `Native`
//! transcript is the arkworks canonical serialization used only for the
//! local pre-submission sanity check. The proving stack is compiled without
//! parallel features, so each proof is computed on a single thread.

use ark_bn254::{Bn254, Fq, Fr, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_ff::{BigInteger, PrimeField};
use ark_groth16::{prepare_verifying_key, Groth16, Proof, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use common::{PanagramError, ProofBundle, Transcript};

use crate::circuits::CircuitArtifact;
use crate::field;
use crate::witness::Witness;

/// How much of the backend's own diagnostics reach the log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
}

pub struct ProofBackend {
    pk: ProvingKey<Bn254>,
    vk: VerifyingKey<Bn254>,
    verbosity: Verbosity,
}

impl ProofBackend {
    pub fn new(artifact: &CircuitArtifact) -> Self {
        Self {
            pk: artifact.pk.clone(),
            vk: artifact.vk.clone(),
            verbosity: Verbosity::Normal,
        }
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Generate a proof from a satisfying witness.
    ///
    /// Each call draws fresh proof randomness, so two calls over the same
    /// witness produce distinct byte sequences even before the transcript
    /// encodings diverge. Failure here indicates a backend fault, not a
    /// wrong guess, and is not retried.
    pub fn generate_proof(
        &self,
        witness: &Witness,
        transcript: Transcript,
    ) -> Result<ProofBundle, PanagramError> {
        let mut rng = rand::thread_rng();
        let proof = Groth16::<Bn254>::prove(&self.pk, witness.circuit.clone(), &mut rng)
            .map_err(|e| PanagramError::Computation(format!("proof generation failed: {e}")))?;

        let proof_bytes = match transcript {
            Transcript::Keccak => encode_evm_proof(&proof),
            Transcript::Native => {
                let mut bytes = Vec::new();
                proof.serialize_compressed(&mut bytes).map_err(|e| {
                    PanagramError::Computation(format!("proof serialization failed: {e}"))
                })?;
                bytes
            }
        };
        let public_inputs: Vec<[u8; 32]> = witness
            .public_inputs()
            .iter()
            .map(|v| field::field_to_bytes32(*v))
            .collect();

        if self.verbosity == Verbosity::Normal {
            log::debug!(
                "generated {transcript:?}-transcript proof: {} bytes, {} public inputs",
                proof_bytes.len(),
                public_inputs.len()
            );
        }

        Ok(ProofBundle {
            transcript,
            proof: proof_bytes,
            public_inputs,
        })
    }

    /// Verify a `Native` bundle against the verifying key.
    ///
    /// This is the local sanity check only; the on-chain contract remains
    /// the authoritative verifier, and `Keccak` bundles are rejected here.
    pub fn verify_proof(&self, bundle: &ProofBundle) -> Result<bool, PanagramError> {
        if bundle.transcript == Transcript::Keccak {
            return Err(PanagramError::InvalidInput(
                "keccak-transcript proofs are verified on-chain, not locally".to_string(),
            ));
        }

        let proof = Proof::<Bn254>::deserialize_compressed(&bundle.proof[..])
            .map_err(|e| PanagramError::Computation(format!("proof deserialization failed: {e}")))?;
        let inputs: Vec<Fr> = bundle
            .public_inputs
            .iter()
            .map(|bytes| Fr::from_be_bytes_mod_order(bytes))
            .collect();

        let pvk = prepare_verifying_key(&self.vk);
        let valid = Groth16::<Bn254>::verify_proof(&pvk, &proof, &inputs)
            .map_err(|e| PanagramError::Computation(format!("verification failed: {e}")))?;

        if self.verbosity == Verbosity::Normal {
            log::debug!("local verification result: {valid}");
        }
        Ok(valid)
    }
}

fn fq_word(x: &Fq) -> [u8; 32] {
    let be = x.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - be.len()..].copy_from_slice(&be);
    out
}

fn g1_words(p: &G1Affine) -> [[u8; 32]; 2] {
    match p.xy() {
        Some((x, y)) => [fq_word(x), fq_word(y)],
        // The point at infinity encodes as zero words.
        None => [[0u8; 32]; 2],
    }
}

// snarkjs calldata ordering: each G2 coordinate is imaginary-first.
fn g2_words(p: &G2Affine) -> [[u8; 32]; 4] {
    match p.xy() {
        Some((x, y)) => [
            fq_word(&x.c1),
            fq_word(&x.c0),
            fq_word(&y.c1),
            fq_word(&y.c0),
        ],
        None => [[0u8; 32]; 4],
    }
}

/// Serialize a proof in the layout the Solidity verifier reads: eight
/// big-endian 32-byte words `a.x, a.y, b.x.c1, b.x.c0, b.y.c1, b.y.c0,
/// c.x, c.y`.
fn encode_evm_proof(proof: &Proof<Bn254>) -> Vec<u8> {
    let mut out = Vec::with_capacity(256);
    for word in g1_words(&proof.a) {
        out.extend_from_slice(&word);
    }
    for word in g2_words(&proof.b) {
        out.extend_from_slice(&word);
    }
    for word in g1_words(&proof.c) {
        out.extend_from_slice(&word);
    }
    out
}
