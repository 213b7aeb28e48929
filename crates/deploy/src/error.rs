//! Error taxonomy for a deployment run.

use thiserror::Error;

/// Failures that terminate a deployment step.
///
/// Nothing in this crate recovers from any of these locally: every variant ends
/// the run with a non-zero outcome.
#[derive(Debug, Error)]
pub enum DeployError {
    /// A contract the step depends on has no deployment record on the active network.
    #[error("dependency '{name}' is not deployed on network '{network}'")]
    DependencyNotFound { name: String, network: String },

    /// A named account is missing from the accounts table.
    #[error("named account '{name}' is not configured")]
    UnknownAccount { name: String },

    /// A named account points at an index the node does not expose.
    #[error("named account '{name}' uses index {index} but the node exposes {available} accounts")]
    AccountIndexOutOfRange {
        name: String,
        index: usize,
        available: usize,
    },

    /// The operator interrupted the run during the grace period.
    #[error("deployment to '{network}' aborted by operator")]
    Aborted { network: String },

    /// A deployment record exists but could not be read.
    #[error(transparent)]
    Registry(anyhow::Error),

    /// The deployment mechanism rejected or failed to submit the deployment.
    #[error(transparent)]
    DeploymentFailure(anyhow::Error),
}
