//! Settings and configuration for LearnFi agents
//!
//! Usually this should be treated as a base config and extended per agent
//! with the `decl_settings!` macro, which also generates the file/env
//! loading boilerplate. The signing key is expected to arrive through the
//! environment (`LEARNFI_BASE_SIGNER_KEY`), never through a checked-in file.

use std::time::Duration;

use color_eyre::{eyre::eyre, Report};
use ethers::{
    core::types::Address,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
};
use serde::Deserialize;

use learnfi_core::traits::ContentStore;
use learnfi_ethereum::{ContentRegistry, ContractArtifact};

use crate::agent::AgentCore;

/// Tracing subscriber management
pub mod log;

pub use log::TracingConfig;

fn default_gas_limit() -> u64 {
    // Conservative flat bound per createContent call; no gas estimation
    2_000_000
}

fn default_confirmation_timeout() -> u64 {
    120
}

fn default_poll_interval() -> u64 {
    3
}

/// Ethereum connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChainConnection {
    /// HTTP connection details
    Http {
        /// Fully qualified string to connect to
        url: String,
    },
}

/// A signer for registry transactions
#[derive(Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SignerConf {
    /// A local hex key
    HexKey {
        /// Hex string of private key, without 0x prefix
        key: String,
    },
    #[serde(other)]
    /// No key configured. Startup fails before any topic is processed.
    None,
}

impl std::fmt::Debug for SignerConf {
    // Key material must never reach logs or error reports
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignerConf::HexKey { .. } => write!(f, "SignerConf::HexKey {{ key: <redacted> }}"),
            SignerConf::None => write!(f, "SignerConf::None"),
        }
    }
}

impl SignerConf {
    /// Try to convert this into a local wallet. A missing or malformed key
    /// is a fatal startup error.
    pub fn try_into_wallet(&self) -> Result<LocalWallet, Report> {
        match self {
            SignerConf::HexKey { key } => key
                .parse()
                .map_err(|_| eyre!("Malformed signing key in config")),
            SignerConf::None => Err(eyre!("No signing key configured")),
        }
    }
}

/// A content registry deployment: an address on some chain, the ABI artifact
/// describing it, submission tunables, and details for connecting to the
/// chain API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSetup {
    /// Chain name
    pub name: String,
    /// Address of the deployed registry
    pub address: String,
    /// Path to the compiler artifact holding the registry ABI
    pub abi_path: String,
    /// Gas to attach to every createContent call. A flat upper bound, not
    /// an estimate; raise it here if registry calls start reverting out of
    /// gas.
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Seconds to wait for a receipt before reporting a timed-out
    /// submission
    #[serde(default = "default_confirmation_timeout")]
    pub confirmation_timeout: u64,
    /// Seconds between receipt polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    /// The connection details
    #[serde(flatten)]
    pub connection: ChainConnection,
}

impl ChainSetup {
    /// Try to instantiate the registry client this setup describes. Binds
    /// the signer to the chain id reported by the node.
    #[tracing::instrument(err)]
    pub async fn try_into_content_store(
        &self,
        signer: &SignerConf,
    ) -> Result<Box<dyn ContentStore>, Report> {
        let artifact = ContractArtifact::read_from(&self.abi_path)?;
        let address: Address = self
            .address
            .parse()
            .map_err(|_| eyre!("Malformed registry address {}", self.address))?;
        let wallet = signer.try_into_wallet()?;

        match &self.connection {
            ChainConnection::Http { url } => {
                let provider = Provider::<Http>::try_from(url.as_str())?;
                let chain_id = provider.get_chainid().await?;
                Ok(Box::new(ContentRegistry::new(
                    &self.name,
                    address,
                    artifact.abi,
                    provider,
                    wallet.with_chain_id(chain_id.as_u64()),
                    self.gas_limit,
                    Duration::from_secs(self.confirmation_timeout),
                    Duration::from_secs(self.poll_interval),
                )))
            }
        }
    }
}

/// Settings. Treated as a base config and extended by each agent via
/// `decl_settings!`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// The registry deployment to publish into
    pub registry: ChainSetup,
    /// The transaction signer
    pub signer: SignerConf,
    /// The tracing configuration
    pub tracing: TracingConfig,
}

impl Settings {
    /// Try to generate an agent core
    pub async fn try_into_core(&self) -> Result<AgentCore, Report> {
        let store = self
            .registry
            .try_into_content_store(&self.signer)
            .await?
            .into();
        Ok(AgentCore { store })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_parses_settings_json() {
        let json = r#"{
            "registry": {
                "name": "sonicTestnet",
                "address": "0x33372a70698c891E686D4FB82798361d4314de96",
                "abiPath": "./config/abis/LearnFiContent.json",
                "type": "http",
                "url": "https://rpc.blaze.soniclabs.com"
            },
            "signer": { "type": "hexKey", "key": "1111111111111111111111111111111111111111111111111111111111111111" },
            "tracing": { "level": "info", "style": "compact" }
        }"#;

        let settings: Settings = serde_json::from_str(json).expect("!settings");
        assert_eq!(settings.registry.name, "sonicTestnet");
        // Defaults kick in for the tunables the file leaves out
        assert_eq!(settings.registry.gas_limit, 2_000_000);
        assert_eq!(settings.registry.confirmation_timeout, 120);
        assert!(settings.signer.try_into_wallet().is_ok());
    }

    #[test]
    fn it_redacts_signing_keys() {
        let signer = SignerConf::HexKey {
            key: "1111111111111111111111111111111111111111111111111111111111111111".to_owned(),
        };
        let debugged = format!("{:?}", signer);
        assert!(!debugged.contains("1111"));
        assert!(debugged.contains("redacted"));
    }

    #[test]
    fn it_rejects_missing_or_malformed_keys() {
        assert!(SignerConf::None.try_into_wallet().is_err());
        assert!(SignerConf::HexKey {
            key: "not a key".to_owned()
        }
        .try_into_wallet()
        .is_err());
    }
}
