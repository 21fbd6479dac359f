//! Loading of contract compilation artifacts
//!
//! Both Foundry (`out/<Name>.sol/<Name>.json`, with bytecode nested under an
//! `object` key) and Hardhat (`artifacts/**/<Name>.json`, with bytecode as a
//! plain string) layouts are supported.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::primitives::{keccak256, Bytes, B256};
use itertools::Itertools;
use serde::Deserialize;

use crate::{
    constants::{ARTIFACT_EXTENSION, UNLINKED_LIBRARY_MARKER},
    errors::ScriptError,
};

/// The bytecode field of an artifact, in either of the supported layouts
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// Hardhat layout
    Plain(String),
    /// Foundry layout
    Object {
        /// The hex-encoded bytecode
        object: String,
    },
}

impl RawBytecode {
    /// The hex-encoded bytecode
    fn hex(&self) -> &str {
        match self {
            RawBytecode::Plain(s) => s,
            RawBytecode::Object { object } => object,
        }
    }
}

/// The fields of an artifact file the scripts care about
#[derive(Deserialize)]
struct RawArtifact {
    /// The creation bytecode
    bytecode: RawBytecode,
}

/// A compiled contract, able to produce creation code for deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    /// The name of the contract
    pub name: String,
    /// The creation bytecode of the contract
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Locate and parse the artifact for the named contract in the given
    /// directory, failing if the name is ambiguous
    pub fn load(artifacts_dir: &Path, name: &str) -> Result<Self, ScriptError> {
        let path = find_artifact(artifacts_dir, name)?;
        let contents =
            fs::read_to_string(&path).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

        Self::parse(name, &contents)
    }

    /// Parse an artifact from its JSON contents
    pub fn parse(name: &str, contents: &str) -> Result<Self, ScriptError> {
        let raw: RawArtifact = serde_json::from_str(contents)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{name}: {e}")))?;

        let hex = raw.bytecode.hex();
        if hex.contains(UNLINKED_LIBRARY_MARKER) {
            return Err(ScriptError::ArtifactParsing(format!(
                "{name} has unlinked library references"
            )));
        }

        let bytecode =
            Bytes::from_str(hex).map_err(|e| ScriptError::ArtifactParsing(format!("{name}: {e}")))?;
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{name} has no bytecode, is it abstract or an interface?"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            bytecode,
        })
    }

    /// The hash identifying this version of the contract
    pub fn version(&self) -> B256 {
        keccak256(&self.bytecode)
    }

    /// The creation code for this contract with the given ABI-encoded
    /// constructor arguments appended
    pub fn creation_code(&self, constructor_args: &[u8]) -> Bytes {
        [&self.bytecode[..], constructor_args].concat().into()
    }
}

/// Find the artifact file for the named contract.
///
/// The Foundry location is tried first, then the directory tree is searched
/// for a file named after the contract. A name matching more than one file
/// in the tree is an error.
fn find_artifact(artifacts_dir: &Path, name: &str) -> Result<PathBuf, ScriptError> {
    let file_name = format!("{name}.{ARTIFACT_EXTENSION}");
    let foundry_path = artifacts_dir.join(format!("{name}.sol")).join(&file_name);
    if foundry_path.is_file() {
        return Ok(foundry_path);
    }

    let mut candidates = Vec::new();
    search_dir(artifacts_dir, &file_name, &mut candidates)?;

    match candidates.len() {
        0 => Err(ScriptError::ArtifactParsing(format!(
            "could not find artifact for {name} in {}",
            artifacts_dir.display()
        ))),
        1 => Ok(candidates.remove(0)),
        _ => {
            candidates.sort();
            Err(ScriptError::ArtifactParsing(format!(
                "multiple artifacts for {name}: {}",
                candidates.iter().map(|p| p.display()).join(", ")
            )))
        }
    }
}

/// Collect every file with the given name under `dir`
fn search_dir(dir: &Path, file_name: &str, found: &mut Vec<PathBuf>) -> Result<(), ScriptError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        ScriptError::ArtifactParsing(format!("error reading {}: {e}", dir.display()))
    })?;

    for entry in entries {
        let path = entry
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?
            .path();
        if path.is_dir() {
            search_dir(&path, file_name, found)?;
        } else if path.file_name().is_some_and(|f| f == file_name) {
            found.push(path);
        }
    }

    Ok(())
}
