//! Operator safety gate run before touching a persistent network.

use std::time::Duration;

use tokio::sync::watch;

use crate::{
    error::DeployError,
    network::{ActionInterval, Network, NetworkPolicy},
};

/// Caller-owned signal that ends the grace period early.
///
/// The gate never cancels itself; whoever drives the run (the CLI on Ctrl+C) trips
/// the matching [`AbortHandle`].
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

/// Sending half of an [`AbortSignal`].
#[derive(Debug)]
pub struct AbortHandle {
    tx: watch::Sender<bool>,
}

impl AbortSignal {
    pub fn channel() -> (AbortHandle, AbortSignal) {
        let (tx, rx) = watch::channel(false);
        (AbortHandle { tx }, AbortSignal { rx })
    }

    /// A signal that never trips.
    pub fn never() -> Self {
        Self::channel().1
    }

    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal trips. Pends forever if the handle was dropped untripped.
    pub async fn aborted(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl AbortHandle {
    pub fn abort(&self) {
        // Receivers may already be gone once the run finished.
        let _ = self.tx.send(true);
    }
}

/// Holds a deployment for a fixed grace period on every non-ephemeral network.
#[derive(Debug, Clone, Default)]
pub struct SafetyGate {
    policy: NetworkPolicy,
}

impl SafetyGate {
    pub fn new(policy: NetworkPolicy) -> Self {
        Self { policy }
    }

    pub fn from_policy(policy: &NetworkPolicy) -> Self {
        Self::new(policy.clone())
    }

    pub fn grace_period(&self) -> Duration {
        self.policy.grace_period()
    }

    /// Returns `true` when the gate would hold a deployment to `network`.
    pub fn holds(&self, network: &Network) -> bool {
        !self.policy.is_ephemeral(network)
    }

    /// Announce the deployment and wait out the grace period.
    ///
    /// No-op on the ephemeral network. Returns [`DeployError::Aborted`] if `abort`
    /// trips while waiting.
    pub async fn pass(
        &self,
        contract: &str,
        network: &Network,
        action_interval: ActionInterval,
        mut abort: AbortSignal,
    ) -> Result<(), DeployError> {
        if !self.holds(network) {
            return Ok(());
        }

        // Operator prompt: must stay visible when the log level is raised to warn.
        tracing::warn!("Deploying {contract} to {network}. Hit ctrl + c to abort");
        tracing::warn!("actionInterval: {action_interval}");

        tokio::select! {
            _ = tokio::time::sleep(self.grace_period()) => Ok(()),
            _ = abort.aborted() => {
                tracing::warn!(%network, contract, "Deployment aborted during grace period");
                Err(DeployError::Aborted {
                    network: network.to_string(),
                })
            }
        }
    }
}
