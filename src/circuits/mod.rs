use ark_bn254::Fr;
use ark_r1cs_std::{fields::fp::FpVar, prelude::*};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

pub mod artifact;
pub mod hash;

pub use artifact::{CircuitArtifact, CircuitSchema, InputDecl, InputKind, Visibility};
pub use hash::double_hash;

/// The Panagram word-guess circuit.
///
/// Proves knowledge of a `guess_hash` whose double hash equals the public
/// answer commitment, without revealing the guess. Public inputs are
/// allocated in the order the artifact schema declares them:
/// `[answer_double_hash, address]`.
///
/// All assignments are `None` during key setup and `Some` when proving.
#[derive(Clone, Default)]
pub struct PanagramCircuit {
    /// Field-reduced keccak hash of the guess (private).
    pub guess_hash: Option<Fr>,
    /// Double hash of the secret answer (public).
    pub answer_double_hash: Option<Fr>,
    /// Claimer wallet address (public).
    pub address: Option<Fr>,
}

impl ConstraintSynthesizer<Fr> for PanagramCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let guess = FpVar::new_witness(cs.clone(), || {
            self.guess_hash.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let answer = FpVar::new_input(cs.clone(), || {
            self.answer_double_hash.ok_or(SynthesisError::AssignmentMissing)
        })?;
        // The address carries no arithmetic constraints; allocating it as an
        // instance variable folds it into the verification equation, which
        // ties the proof to one wallet.
        let _address = FpVar::new_input(cs.clone(), || {
            self.address.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let computed = hash::double_hash_gadget(&guess)?;
        computed.enforce_equal(&answer)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_relations::r1cs::ConstraintSystem;

    #[test]
    fn correct_guess_satisfies_constraints() -> Result<(), anyhow::Error> {
        let cs = ConstraintSystem::<Fr>::new_ref();

        let guess_hash = Fr::from(1234u64);
        let circuit = PanagramCircuit {
            guess_hash: Some(guess_hash),
            answer_double_hash: Some(hash::double_hash(guess_hash)),
            address: Some(Fr::from(0xabcdu64)),
        };

        circuit.generate_constraints(cs.clone())?;
        assert!(cs.is_satisfied()?);
        Ok(())
    }

    #[test]
    fn wrong_guess_leaves_constraints_unsatisfied() -> Result<(), anyhow::Error> {
        let cs = ConstraintSystem::<Fr>::new_ref();

        let circuit = PanagramCircuit {
            guess_hash: Some(Fr::from(1234u64)),
            answer_double_hash: Some(hash::double_hash(Fr::from(5678u64))),
            address: Some(Fr::from(0xabcdu64)),
        };

        circuit.generate_constraints(cs.clone())?;
        assert!(!cs.is_satisfied()?);
        Ok(())
    }
}
