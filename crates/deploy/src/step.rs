//! The `TimeRestrictionForPosting` deployment step.

use crate::{
    accounts::Accounts,
    error::DeployError,
    gate::{AbortSignal, SafetyGate},
    mechanism::{DeploymentMechanism, DeploymentRequest},
    network::NetworkPolicy,
    registry::{ContractRegistry, DeploymentRecord, resolve_dependency},
};

/// Registry name of the KoruDao contract.
pub const KORU_DAO: &str = "KoruDao";
/// Registry name of the KoruDao membership NFT contract.
pub const KORU_DAO_NFT: &str = "KoruDaoNFT";

/// A deployment step that can be selected by tag within a larger ordered set.
///
/// Ordering against `DEPENDENCIES` is the caller's responsibility.
pub trait DeployStep {
    /// Registry name of the contract the step publishes.
    const NAME: &'static str;
    /// Tags selecting this step.
    const TAGS: &'static [&'static str];
    /// Contracts that must be deployed before this step runs.
    const DEPENDENCIES: &'static [&'static str];

    /// Whether a run restricted to `tags` includes this step. No tags selects every step.
    fn selected_by(tags: &[String]) -> bool {
        tags.is_empty() || tags.iter().any(|tag| Self::TAGS.contains(&tag.as_str()))
    }
}

/// Environment a step runs against. Nothing is looked up ambiently.
///
/// The target network is the one the registry is bound to.
pub struct DeployEnv<'a, R: ?Sized, M> {
    pub accounts: &'a Accounts,
    pub registry: &'a R,
    pub mechanism: &'a M,
    pub policy: &'a NetworkPolicy,
    /// Tripped by the caller to cancel during the grace period.
    pub abort: AbortSignal,
}

/// Publishes `TimeRestrictionForPosting` behind an upgrade proxy owned by the deployer.
///
/// Constructor arguments are `[actionInterval, KoruDao, KoruDaoNFT]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeRestrictionForPosting;

impl DeployStep for TimeRestrictionForPosting {
    const NAME: &'static str = "TimeRestrictionForPosting";
    const TAGS: &'static [&'static str] = &["TimeRestrictionForPosting"];
    const DEPENDENCIES: &'static [&'static str] = &[KORU_DAO, KORU_DAO_NFT];
}

impl TimeRestrictionForPosting {
    /// Resolve dependencies, pick the action interval, hold at the safety gate, deploy.
    ///
    /// Fails before the gate (and before any transaction) if a dependency or the
    /// deployer account cannot be resolved.
    pub async fn run<R, M>(&self, env: DeployEnv<'_, R, M>) -> Result<DeploymentRecord, DeployError>
    where
        R: ContractRegistry + ?Sized,
        M: DeploymentMechanism,
    {
        let network = env.registry.network();
        let koru_dao = resolve_dependency(env.registry, KORU_DAO)?;
        let koru_dao_nft = resolve_dependency(env.registry, KORU_DAO_NFT)?;
        let deployer = env.accounts.deployer()?;
        let action_interval = env.policy.action_interval(network);

        SafetyGate::from_policy(env.policy)
            .pass(Self::NAME, network, action_interval, env.abort)
            .await?;

        let request = DeploymentRequest {
            contract: Self::NAME.to_string(),
            from: deployer,
            proxy_owner: Some(deployer),
            args: vec![
                action_interval.into(),
                koru_dao.into(),
                koru_dao_nft.into(),
            ],
        };

        tracing::debug!(
            %network,
            %deployer,
            %action_interval,
            %koru_dao,
            %koru_dao_nft,
            "Submitting deployment request"
        );

        env.mechanism
            .deploy(request)
            .await
            .map_err(DeployError::DeploymentFailure)
    }
}
