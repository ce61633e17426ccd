// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

mod accessor;
mod condition;

use std::{collections::BTreeMap, fmt::Display, future::Future, time::Duration};

pub use accessor::{Accessor, FetchError, KubeAccessor};
pub use condition::{
    CONDITION_REASON_READY, CONDITION_REASON_STOPPED, CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_READY, Condition, classify,
    ready_condition,
};
use thiserror::Error;
use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Level, debug, info, span, warn};
use typed_builder::TypedBuilder;

use crate::common::{ResourceKey, ResourceKeyError};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Ready,
    Stopped,
    Unknown,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Outcome::Ready => "Ready",
            Outcome::Stopped => "Stopped",
            Outcome::Unknown => "Unknown",
        };
        f.write_str(value)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkSummary {
    pub internal_ip: Option<String>,
    pub external_ip: Option<String>,
    pub floating_ips: BTreeMap<String, String>,
}

impl NetworkSummary {
    fn emit(&self, key: &ResourceKey) {
        info!(id = %key, "Network internal IP {}", self.internal_ip.as_deref().unwrap_or_default());
        info!(id = %key, "Network external IP {}", self.external_ip.as_deref().unwrap_or_default());
        for (service, ip) in &self.floating_ips {
            info!(id = %key, "Network floating IP {service} {ip}");
        }
    }
}

impl Display for NetworkSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Network:\n\tinternal IP: {}\n\texternal IP: {}\n\tfloating IPs:",
            self.internal_ip.as_deref().unwrap_or_default(),
            self.external_ip.as_deref().unwrap_or_default()
        )?;
        for (service, ip) in &self.floating_ips {
            write!(f, "\n\t\t{service}: {ip}")?;
        }
        Ok(())
    }
}

/// An object the waiter can make a readiness decision about.
pub trait ReadinessSource {
    fn conditions(&self) -> &[Condition];
    fn network_summary(&self) -> NetworkSummary;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Readiness {
    pub outcome: Outcome,
    /// Number of fetches performed, including the one that produced the outcome.
    pub attempts: u32,
    /// Only present for [`Outcome::Ready`].
    pub network: Option<NetworkSummary>,
}

impl Readiness {
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WaitError {
    #[error("invalid resource key {0}")]
    InvalidKey(#[from] ResourceKeyError),
    #[error("fetch failed {0}")]
    Fetch(FetchError),
    #[error("deadline exceeded after {attempts} attempts")]
    DeadlineExceeded { attempts: u32 },
    #[error("wait cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

/// Polls an object until it reports a terminal readiness condition.
///
/// `NotFound` fetches and non-terminal conditions are retried every `poll_interval`. Transient fetch failures back
/// off exponentially up to `max_backoff` and never retry faster than `poll_interval`. Permanent fetch failures end the wait. Without a `timeout` the wait only
/// ends on a decision or on cancellation.
#[derive(Clone, Debug, TypedBuilder)]
pub struct ReadinessWaiter {
    #[builder(default = DEFAULT_POLL_INTERVAL)]
    poll_interval: Duration,
    #[builder(default = DEFAULT_MAX_BACKOFF)]
    max_backoff: Duration,
    #[builder(default)]
    timeout: Option<Duration>,
    #[builder(default)]
    cancellation_token: CancellationToken,
}

impl ReadinessWaiter {
    pub async fn wait<K, A>(&self, key: &ResourceKey, accessor: &A) -> Result<Readiness, WaitError>
    where
        K: ReadinessSource + Send,
        A: Accessor<K> + ?Sized,
    {
        key.validate()?;
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let span = span!(Level::INFO, "ReadinessWaiter", id = %key);

        self.poll::<K, A>(key, accessor, deadline).instrument(span).await
    }

    async fn poll<K, A>(&self, key: &ResourceKey, accessor: &A, deadline: Option<Instant>) -> Result<Readiness, WaitError>
    where
        K: ReadinessSource + Send,
        A: Accessor<K> + ?Sized,
    {
        let mut attempts = 0;
        let mut backoff = self.poll_interval;
        loop {
            let fetched = self.guard(deadline, attempts, accessor.fetch(key)).await?;
            attempts += 1;

            let delay = match fetched {
                Ok(resource) => match classify(resource.conditions()) {
                    Some(Outcome::Ready) => {
                        let network = resource.network_summary();
                        network.emit(key);
                        info!("ready after {attempts} attempts");
                        return Ok(Readiness { outcome: Outcome::Ready, attempts, network: Some(network) });
                    },
                    Some(outcome) => {
                        info!("{outcome} after {attempts} attempts");
                        return Ok(Readiness { outcome, attempts, network: None });
                    },
                    None => {
                        debug!("not ready yet, attempt {attempts}");
                        backoff = self.poll_interval;
                        self.poll_interval
                    },
                },
                Err(FetchError::NotFound) => {
                    debug!("not created yet, attempt {attempts}");
                    backoff = self.poll_interval;
                    self.poll_interval
                },
                Err(e @ FetchError::Transient(_)) => {
                    let delay = backoff.max(self.poll_interval);
                    backoff = (delay * 2).min(self.max_backoff).max(self.poll_interval);
                    warn!("fetch failed, retrying in {delay:?} {e}");
                    delay
                },
                Err(e @ FetchError::Permanent(_)) => {
                    warn!("fetch failed, giving up {e}");
                    return Err(WaitError::Fetch(e));
                },
            };

            self.guard(deadline, attempts, sleep(delay)).await?;
        }
    }

    async fn guard<F>(&self, deadline: Option<Instant>, attempts: u32, future: F) -> Result<F::Output, WaitError>
    where
        F: Future,
    {
        let expiry = async {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => futures::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancellation_token.cancelled() => Err(WaitError::Cancelled { attempts }),
            () = expiry => Err(WaitError::DeadlineExceeded { attempts }),
            output = future => Ok(output),
        }
    }
}

impl Default for ReadinessWaiter {
    fn default() -> Self {
        Self::builder().build()
    }
}
