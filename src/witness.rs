//! Circuit execution: turn concrete inputs into a satisfying assignment, or
//! report that no such assignment exists (a wrong guess).

use ark_bn254::Fr;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use common::PanagramError;

use crate::circuits::{CircuitArtifact, PanagramCircuit};
use crate::field;

/// Concrete assignment for every input the circuit declares (V2 shape).
#[derive(Clone, Copy, Debug)]
pub struct CircuitInputs {
    pub guess_hash: Fr,
    pub answer_double_hash: Fr,
    pub address: Fr,
}

impl CircuitInputs {
    /// Build inputs from the caller's string representation, enforcing the
    /// typing rules before the circuit ever runs.
    pub fn from_strings(
        guess_hash: &str,
        answer_double_hash: &str,
        address: &str,
    ) -> Result<Self, PanagramError> {
        Ok(Self {
            guess_hash: field::parse_field_hex(guess_hash)?,
            answer_double_hash: field::parse_field_hex(answer_double_hash)?,
            address: field::parse_address(address)?,
        })
    }
}

/// A satisfying execution trace of the circuit.
///
/// Owned by a single proof-generation call and never reused: the backend
/// consumes it while the call is in flight and it is dropped afterwards.
pub struct Witness {
    pub(crate) circuit: PanagramCircuit,
    public_inputs: Vec<Fr>,
}

impl Witness {
    /// Public inputs in the circuit's declared order.
    pub fn public_inputs(&self) -> &[Fr] {
        &self.public_inputs
    }
}

/// Execute the circuit against concrete inputs.
///
/// Fails with [`PanagramError::ConstraintViolation`] when the assignment
/// cannot satisfy the constraint system — the normal outcome for a guess
/// that does not match the secret answer.
pub fn execute(
    artifact: &CircuitArtifact,
    inputs: &CircuitInputs,
) -> Result<Witness, PanagramError> {
    artifact.schema.validate()?;

    let circuit = PanagramCircuit {
        guess_hash: Some(inputs.guess_hash),
        answer_double_hash: Some(inputs.answer_double_hash),
        address: Some(inputs.address),
    };

    let cs = ConstraintSystem::<Fr>::new_ref();
    circuit
        .clone()
        .generate_constraints(cs.clone())
        .map_err(|e| PanagramError::Internal(format!("constraint synthesis failed: {e}")))?;
    let satisfied = cs
        .is_satisfied()
        .map_err(|e| PanagramError::Internal(format!("satisfiability check failed: {e}")))?;
    if !satisfied {
        return Err(PanagramError::ConstraintViolation);
    }

    Ok(Witness {
        circuit,
        public_inputs: vec![inputs.answer_double_hash, inputs.address],
    })
}
