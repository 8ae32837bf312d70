//! ABI encoding of the on-chain submission payload.
//!
//! The verifying contract decodes `(bytes proof, bytes32[] publicInputs)`;
//! the byte layout here must match that declaration exactly, with the public
//! inputs in the circuit's declared order. Any drift is a silent on-chain
//! correctness bug, which is why the decode direction exists and the
//! round-trip is tested.

use alloy_primitives::{Bytes, B256};
use alloy_sol_types::SolValue;
use common::PanagramError;

/// Encode `(bytes, bytes32[])` calldata for the contract call.
pub fn encode_payload(proof: &[u8], public_inputs: &[[u8; 32]]) -> Vec<u8> {
    let inputs: Vec<B256> = public_inputs.iter().map(|b| B256::from(*b)).collect();
    (Bytes::from(proof.to_vec()), inputs).abi_encode_params()
}

/// Decode a payload back into `(proof, publicInputs)`.
pub fn decode_payload(data: &[u8]) -> Result<(Vec<u8>, Vec<[u8; 32]>), PanagramError> {
    let (proof, inputs) = <(Bytes, Vec<B256>)>::abi_decode_params(data, true)
        .map_err(|e| PanagramError::Internal(format!("payload decode failed: {e}")))?;
    Ok((proof.to_vec(), inputs.into_iter().map(|b| b.0).collect()))
}
