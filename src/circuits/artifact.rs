//! The circuit artifact: the schema of declared inputs plus the Groth16 key
//! material. Loaded once at startup and read-only afterwards; everything else
//! in the pipeline treats it as an opaque, versioned build output.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use ark_bn254::Bn254;
use ark_groth16::{Groth16, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::CircuitSpecificSetupSNARK;
use ark_std::rand::{rngs::StdRng, SeedableRng};
use common::PanagramError;
use serde::{Deserialize, Serialize};

use crate::circuits::PanagramCircuit;

const MAGIC: &[u8; 4] = b"PNGM";
const FORMAT_VERSION: u32 = 1;

/// Current circuit shape: `{guess_hash, answer_double_hash, address}`.
pub const SCHEMA_VERSION: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Public,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Field,
    Address,
}

/// One named input the circuit declares.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDecl {
    pub name: String,
    pub visibility: Visibility,
    pub kind: InputKind,
}

/// Versioned declaration of the circuit's input shape. Declaration order of
/// the public inputs is the order the encoder must mirror.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitSchema {
    pub version: u32,
    pub inputs: Vec<InputDecl>,
}

impl CircuitSchema {
    /// The canonical V2 shape this crate proves against.
    pub fn canonical() -> Self {
        let decl = |name: &str, visibility, kind| InputDecl {
            name: name.to_string(),
            visibility,
            kind,
        };
        Self {
            version: SCHEMA_VERSION,
            inputs: vec![
                decl("guess_hash", Visibility::Private, InputKind::Field),
                decl("answer_double_hash", Visibility::Public, InputKind::Field),
                decl("address", Visibility::Public, InputKind::Address),
            ],
        }
    }

    /// Names of the public inputs, in declaration order.
    pub fn public_input_names(&self) -> Vec<&str> {
        self.inputs
            .iter()
            .filter(|decl| decl.visibility == Visibility::Public)
            .map(|decl| decl.name.as_str())
            .collect()
    }

    fn is_legacy(&self) -> bool {
        let mut names: Vec<&str> = self.inputs.iter().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        self.version < SCHEMA_VERSION || names == ["address", "expected_hash", "guess"]
    }

    /// Check the schema against the shape this crate was built for.
    pub fn validate(&self) -> Result<(), PanagramError> {
        if self.is_legacy() {
            return Err(PanagramError::Internal(
                "artifact declares the legacy {guess, address, expected_hash} shape; \
                 re-export it with the guess_hash shape"
                    .to_string(),
            ));
        }
        if *self != Self::canonical() {
            return Err(PanagramError::Internal(format!(
                "artifact schema does not match the expected circuit inputs: {:?}",
                self.inputs
            )));
        }
        Ok(())
    }
}

/// Schema plus proving/verifying keys, as loaded from a build artifact.
pub struct CircuitArtifact {
    pub schema: CircuitSchema,
    pub pk: ProvingKey<Bn254>,
    pub vk: VerifyingKey<Bn254>,
}

impl CircuitArtifact {
    /// Deterministic single-party setup from a fixed seed.
    ///
    /// Development and test use only; a deployed artifact must come from a
    /// proper multi-party ceremony and be loaded with [`CircuitArtifact::load`].
    pub fn dev_setup() -> Result<Self, PanagramError> {
        let mut rng = StdRng::from_seed([42; 32]);
        let (pk, vk) = Groth16::<Bn254>::setup(PanagramCircuit::default(), &mut rng)
            .map_err(|e| PanagramError::Internal(format!("circuit setup failed: {e}")))?;
        Ok(Self {
            schema: CircuitSchema::canonical(),
            pk,
            vk,
        })
    }

    /// Load and validate an artifact file. Any missing or corrupt data is
    /// fatal here rather than surfacing later as a bad proof.
    pub fn load(path: &Path) -> Result<Self, PanagramError> {
        let file = File::open(path).map_err(|e| {
            PanagramError::Internal(format!("cannot open artifact {}: {e}", path.display()))
        })?;
        let mut reader = BufReader::new(file);

        let corrupt = |detail: String| PanagramError::Internal(format!(
            "corrupt artifact {}: {detail}",
            path.display()
        ));

        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| corrupt(e.to_string()))?;
        if &magic != MAGIC {
            return Err(corrupt("bad magic".to_string()));
        }

        let mut word = [0u8; 4];
        reader
            .read_exact(&mut word)
            .map_err(|e| corrupt(e.to_string()))?;
        let format_version = u32::from_le_bytes(word);
        if format_version != FORMAT_VERSION {
            return Err(corrupt(format!("unsupported format version {format_version}")));
        }

        reader
            .read_exact(&mut word)
            .map_err(|e| corrupt(e.to_string()))?;
        let schema_len = u32::from_le_bytes(word) as usize;
        let mut schema_bytes = vec![0u8; schema_len];
        reader
            .read_exact(&mut schema_bytes)
            .map_err(|e| corrupt(e.to_string()))?;
        let schema: CircuitSchema = serde_json::from_slice(&schema_bytes)
            .map_err(|e| corrupt(format!("schema parse failed: {e}")))?;
        schema.validate()?;

        let pk = ProvingKey::deserialize_compressed(&mut reader)
            .map_err(|e| corrupt(format!("proving key: {e}")))?;
        let vk = VerifyingKey::deserialize_compressed(&mut reader)
            .map_err(|e| corrupt(format!("verifying key: {e}")))?;

        Ok(Self { schema, pk, vk })
    }

    /// Write the artifact in the binary layout [`CircuitArtifact::load`] reads.
    pub fn save(&self, path: &Path) -> Result<(), PanagramError> {
        let file = File::create(path).map_err(|e| {
            PanagramError::Internal(format!("cannot create artifact {}: {e}", path.display()))
        })?;
        let mut writer = BufWriter::new(file);

        let io_err =
            |e: std::io::Error| PanagramError::Internal(format!("artifact write failed: {e}"));

        let schema_bytes = serde_json::to_vec(&self.schema)
            .map_err(|e| PanagramError::Internal(format!("schema serialization failed: {e}")))?;

        writer.write_all(MAGIC).map_err(io_err)?;
        writer
            .write_all(&FORMAT_VERSION.to_le_bytes())
            .map_err(io_err)?;
        writer
            .write_all(&(schema_bytes.len() as u32).to_le_bytes())
            .map_err(io_err)?;
        writer.write_all(&schema_bytes).map_err(io_err)?;

        self.pk
            .serialize_compressed(&mut writer)
            .map_err(|e| PanagramError::Internal(format!("proving key write failed: {e}")))?;
        self.vk
            .serialize_compressed(&mut writer)
            .map_err(|e| PanagramError::Internal(format!("verifying key write failed: {e}")))?;

        writer.flush().map_err(io_err)?;
        Ok(())
    }
}
