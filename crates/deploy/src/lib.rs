//! koru-deploy - Deployment library for the Koru contracts.
//!
//! This crate publishes `TimeRestrictionForPosting` behind an upgrade proxy, wired to
//! the already deployed `KoruDao` and `KoruDaoNFT` contracts.
//!
//! # Example
//!
//! ```no_run
//! use koru_deploy::{
//!     AbortSignal, DeployConfig, DeployEnv, FsRegistry, Network, ProxyDeployer, RpcClient,
//!     TimeRestrictionForPosting,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = DeployConfig::load("Koru.toml".as_ref())?;
//! let network = Network::from("matic");
//! let rpc = RpcClient::new(config.rpc_url(&network)?)?;
//! let accounts = config.named_accounts.clone().bind(rpc.accounts().await?);
//! let registry = FsRegistry::new(&config.deployments, network.clone());
//! let mechanism = ProxyDeployer::new(rpc, registry.clone(), &config.artifacts);
//!
//! let record = TimeRestrictionForPosting
//!     .run(DeployEnv {
//!         accounts: &accounts,
//!         registry: &registry,
//!         mechanism: &mechanism,
//!         policy: &config.policy,
//!         abort: AbortSignal::never(),
//!     })
//!     .await?;
//! println!("deployed at {}", record.address);
//! # Ok(())
//! # }
//! ```

pub mod abi;
pub mod accounts;
pub mod artifact;
pub mod config;
pub mod error;
pub mod gate;
pub mod mechanism;
pub mod network;
pub mod registry;
pub mod rpc;
pub mod step;

pub use accounts::{Accounts, DEPLOYER, NamedAccount, NamedAccounts};
pub use config::{CONFIG_FILENAME, DeployConfig, NetworkConfig};
pub use error::DeployError;
pub use gate::{AbortHandle, AbortSignal, SafetyGate};
pub use mechanism::{DeploymentMechanism, DeploymentRequest, ProxyDeployer};
pub use network::{ActionInterval, Network, NetworkClass, NetworkPolicy};
pub use registry::{ContractRegistry, DeploymentRecord, FsRegistry, resolve_dependency};
pub use rpc::RpcClient;
pub use step::{DeployEnv, DeployStep, KORU_DAO, KORU_DAO_NFT, TimeRestrictionForPosting};
