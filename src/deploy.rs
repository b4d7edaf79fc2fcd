//! Periphery deployment: the swap router, then the position manager with
//! its token descriptor.
//!
//! Creation itself sits behind [`ContractDeployer`]. [`ArtifactDeployer`]
//! implements it from compiled artifact JSON (`bytecode` plus
//! `linkReferences`) and sends the create transaction through the regular
//! [`TransactionSubmitter`].

use crate::chain::{Chain, ContractCall};
use crate::config::OrchestratorConfig;
use crate::error::{DeployError, Error};
use crate::gas::GasPolicy;
use crate::records::{
    DeploymentRecord, FactoryRecord, Weth9Record, load_optional, load_required, parse_address,
    save,
};
use crate::submit::TransactionSubmitter;
use alloy::sol_types::SolValue;
use alloy_primitives::{Address, B256, hex};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Library name -> deployed address.
pub type Libraries = BTreeMap<String, Address>;

#[async_trait]
pub trait ContractDeployer: Send {
    /// Deploys `contract` with ABI-encoded `constructor_args`, linking
    /// `libraries`, and returns the new contract's address.
    async fn deploy(
        &mut self,
        contract: &str,
        constructor_args: &[u8],
        libraries: &Libraries,
    ) -> Result<Address, Error>;
}

#[derive(Clone, Debug, Copy, PartialEq, Eq, Deserialize)]
pub struct LinkOffset {
    pub start: usize,
    pub length: usize,
}

/// The parts of a compiled artifact needed to deploy it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(default)]
    pub contract_name: String,
    pub bytecode: String,
    /// source file -> library name -> placeholder offsets (in bytes)
    #[serde(default)]
    pub link_references: BTreeMap<String, BTreeMap<String, Vec<LinkOffset>>>,
}

impl Artifact {
    pub fn load(artifacts_dir: &Path, contract: &str) -> Result<Self, DeployError> {
        let file = format!("{contract}.json");
        let path = find_file(artifacts_dir, &file).ok_or_else(|| DeployError::ArtifactMissing {
            contract: contract.to_owned(),
            path: artifacts_dir.join(&file),
        })?;

        let malformed = |reason: String| DeployError::MalformedArtifact {
            contract: contract.to_owned(),
            reason,
        };
        let raw = fs::read_to_string(&path).map_err(|err| malformed(err.to_string()))?;
        let artifact: Artifact =
            serde_json::from_str(&raw).map_err(|err| malformed(err.to_string()))?;

        debug!(contract, path = %path.display(), "artifact loaded");
        Ok(artifact)
    }

    /// Creation bytecode with every library placeholder replaced by its
    /// address.
    pub fn linked_bytecode(&self, contract: &str, libraries: &Libraries) -> Result<Vec<u8>, DeployError> {
        let malformed = |reason: String| DeployError::MalformedArtifact {
            contract: contract.to_owned(),
            reason,
        };

        let hex_text = self.bytecode.strip_prefix("0x").unwrap_or(&self.bytecode);
        if hex_text.is_empty() {
            return Err(malformed("no creation bytecode (abstract contract or interface?)".into()));
        }
        // placeholders are ASCII too, so splicing works on the raw bytes
        if !hex_text.is_ascii() {
            return Err(malformed("bytecode is not hex".into()));
        }
        let mut code = hex_text.as_bytes().to_vec();

        for (library, offsets) in self.link_references.values().flatten() {
            let address = libraries
                .get(library)
                .ok_or_else(|| DeployError::UnlinkedLibrary {
                    contract: contract.to_owned(),
                    library: library.clone(),
                })?;
            let encoded = hex::encode(address);

            for offset in offsets {
                let span = offset
                    .start
                    .checked_mul(2)
                    .zip(offset.length.checked_mul(2))
                    .and_then(|(start, len)| Some((start, start.checked_add(len)?)))
                    .filter(|(_, end)| offset.length == 20 && *end <= code.len());
                let Some((start, end)) = span else {
                    return Err(malformed(format!(
                        "link reference for {library} at {} (length {}) does not fit",
                        offset.start, offset.length
                    )));
                };
                code[start..end].copy_from_slice(encoded.as_bytes());
            }
        }

        hex::decode(&code).map_err(|err| malformed(format!("bytecode is not hex: {err}")))
    }
}

/// `<dir>/<file>`, else the first match anywhere below `dir`.
fn find_file(dir: &Path, file: &str) -> Option<PathBuf> {
    let direct = dir.join(file);
    if direct.is_file() {
        return Some(direct);
    }

    let mut entries: Vec<_> = fs::read_dir(dir).ok()?.filter_map(Result::ok).collect();
    entries.sort_by_key(|entry| entry.file_name());
    entries
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .find_map(|sub| find_file(&sub, file))
}

/// Deploys from artifacts on disk through a [`TransactionSubmitter`]. The
/// gas price is read on the first deployment and reused afterwards.
pub struct ArtifactDeployer<'c, C> {
    chain: &'c C,
    artifacts_dir: PathBuf,
    policy: GasPolicy,
    confirmation_timeout: Duration,
    submitter: Option<TransactionSubmitter<'c, C>>,
}

impl<'c, C: Chain> ArtifactDeployer<'c, C> {
    pub fn new(
        chain: &'c C,
        artifacts_dir: impl Into<PathBuf>,
        policy: GasPolicy,
        confirmation_timeout: Duration,
    ) -> Self {
        Self {
            chain,
            artifacts_dir: artifacts_dir.into(),
            policy,
            confirmation_timeout,
            submitter: None,
        }
    }

    pub fn from_config(chain: &'c C, config: &OrchestratorConfig) -> Result<Self, Error> {
        Ok(Self::new(
            chain,
            &config.paths.artifacts_dir,
            config.gas_policy()?,
            config.confirmation_timeout(),
        ))
    }

    async fn submitter(&mut self) -> Result<&mut TransactionSubmitter<'c, C>, Error> {
        let submitter = match self.submitter.take() {
            Some(submitter) => submitter,
            None => {
                let gas = self.policy.quote(self.chain).await?;
                TransactionSubmitter::new(self.chain, gas, self.confirmation_timeout)
            }
        };
        Ok(self.submitter.insert(submitter))
    }
}

#[async_trait]
impl<C: Chain> ContractDeployer for ArtifactDeployer<'_, C> {
    async fn deploy(
        &mut self,
        contract: &str,
        constructor_args: &[u8],
        libraries: &Libraries,
    ) -> Result<Address, Error> {
        let artifact = Artifact::load(&self.artifacts_dir, contract)?;
        let mut init_code = artifact.linked_bytecode(contract, libraries)?;
        init_code.extend_from_slice(constructor_args);

        info!(contract, bytes = init_code.len(), "deploying");
        let receipt = self
            .submitter()
            .await?
            .submit(ContractCall::Deploy {
                contract: contract.to_owned(),
                init_code: init_code.into(),
            })
            .await?;

        let address = receipt
            .contract_address
            .ok_or_else(|| DeployError::NoContractAddress {
                contract: contract.to_owned(),
            })?;
        info!(contract, %address, "deployed");
        Ok(address)
    }
}

/// `bytes32` form of a native currency label, right-padded with zeros.
pub fn native_currency_label(label: &str) -> B256 {
    B256::right_padding_from(label.as_bytes())
}

/// Deploys `SwapRouter(factory, weth9)`, reusing the recorded WETH9 or
/// deploying (and recording) a new one, and writes a fresh deployment
/// record.
pub async fn deploy_router<D>(
    deployer: &mut D,
    config: &OrchestratorConfig,
) -> Result<DeploymentRecord, Error>
where
    D: ContractDeployer + ?Sized,
{
    let paths = &config.paths;
    let factory_record: FactoryRecord = load_required("factory record", &paths.factory_record)?;
    let factory = parse_address("factory", &factory_record.factory)?;
    info!(%factory, "using factory");

    let weth9 = match load_optional::<Weth9Record>(&paths.weth9_record)? {
        Some(record) => {
            let weth9 = parse_address("weth9", &record.weth9)?;
            info!(%weth9, "using recorded WETH9");
            weth9
        }
        None => {
            let weth9 = deployer.deploy("WETH9", &[], &Libraries::new()).await?;
            save(
                &paths.weth9_record,
                &Weth9Record {
                    weth9: weth9.to_checksum(None),
                },
            )?;
            weth9
        }
    };

    let router = deployer
        .deploy("SwapRouter", &(factory, weth9).abi_encode_params(), &Libraries::new())
        .await?;

    let record = DeploymentRecord {
        network_name: Some(config.network_name.clone()),
        factory: factory.to_checksum(None),
        weth9: weth9.to_checksum(None),
        swap_router: router.to_checksum(None),
        ..Default::default()
    };
    save(&paths.deployment_record, &record)?;
    info!(path = %paths.deployment_record.display(), "deployment record written");

    Ok(record)
}

/// Deploys the `NFTDescriptor` library, the token position descriptor
/// linked against it and the position manager, then merges the three
/// addresses into the existing deployment record.
pub async fn deploy_position_manager<D>(
    deployer: &mut D,
    config: &OrchestratorConfig,
) -> Result<DeploymentRecord, Error>
where
    D: ContractDeployer + ?Sized,
{
    let path = &config.paths.deployment_record;
    let mut record: DeploymentRecord = load_required("deployment record", path)?;
    let factory = record.factory()?;
    let weth9 = record.weth9()?;
    info!(%factory, %weth9, "using recorded factory and WETH9");

    let nft_descriptor = deployer
        .deploy("NFTDescriptor", &[], &Libraries::new())
        .await?;

    let libraries = Libraries::from([("NFTDescriptor".to_owned(), nft_descriptor)]);
    let token_descriptor = deployer
        .deploy(
            "NonfungibleTokenPositionDescriptor",
            &(weth9, native_currency_label("ETH")).abi_encode_params(),
            &libraries,
        )
        .await?;

    let position_manager = deployer
        .deploy(
            "NonfungiblePositionManager",
            &(factory, weth9, token_descriptor).abi_encode_params(),
            &Libraries::new(),
        )
        .await?;

    record.nft_descriptor = Some(nft_descriptor.to_checksum(None));
    record.token_descriptor = Some(token_descriptor.to_checksum(None));
    record.position_manager = Some(position_manager.to_checksum(None));
    save(path, &record)?;
    info!(path = %path.display(), %position_manager, "deployment record updated");

    Ok(record)
}
