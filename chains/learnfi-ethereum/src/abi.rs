use std::{fs::File, io::BufReader, path::Path};

use color_eyre::{eyre::WrapErr, Result};
use ethers::core::abi::Abi;
use serde::Deserialize;

/// A compiler artifact (hardhat layout) holding the registry ABI under an
/// `abi` field. Read once at startup; any failure here is fatal before the
/// first topic is processed.
#[derive(Debug, Deserialize)]
pub struct ContractArtifact {
    /// The contract interface description
    pub abi: Abi,
}

impl ContractArtifact {
    /// Read and parse an artifact from disk
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .wrap_err_with(|| format!("Unable to open ABI artifact at {}", path.display()))?;
        let artifact = serde_json::from_reader(BufReader::new(file))
            .wrap_err_with(|| format!("Malformed ABI artifact at {}", path.display()))?;
        Ok(artifact)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    const ARTIFACT: &str = r#"{
        "contractName": "LearnFiContent",
        "abi": [
            {
                "type": "function",
                "name": "createContent",
                "inputs": [
                    { "name": "contentHash", "type": "string" },
                    { "name": "contentType", "type": "uint8" },
                    { "name": "tags", "type": "string[]" }
                ],
                "outputs": [],
                "stateMutability": "nonpayable"
            }
        ]
    }"#;

    #[test]
    fn it_reads_artifacts() {
        let mut file = tempfile::NamedTempFile::new().expect("!tempfile");
        file.write_all(ARTIFACT.as_bytes()).expect("!write");

        let artifact = ContractArtifact::read_from(file.path()).expect("!read");
        assert!(artifact.abi.function("createContent").is_ok());
    }

    #[test]
    fn it_rejects_missing_or_malformed_artifacts() {
        assert!(ContractArtifact::read_from("/nonexistent/LearnFiContent.json").is_err());

        let mut file = tempfile::NamedTempFile::new().expect("!tempfile");
        file.write_all(b"not an artifact").expect("!write");
        assert!(ContractArtifact::read_from(file.path()).is_err());
    }
}
