// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

pub mod common;
pub mod configuration;
mod demo;
pub mod provisioning;
pub mod readiness;
pub mod services;
pub mod virtual_server;

use configuration::Configuration;
pub use demo::build_virtual_server;
use kube::Client;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;

pub async fn start(configuration: Configuration) -> Result<()> {
    info!("Virtual server demo started");
    let client = Client::try_default().await?;
    let cancellation_token = CancellationToken::new();

    let interrupt = {
        let cancellation_token = cancellation_token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling");
                cancellation_token.cancel();
            }
        }
    };
    let interrupt = tokio::spawn(interrupt);

    let result = demo::run(client, configuration, cancellation_token).await;
    interrupt.abort();
    info!("Virtual server demo stopped");
    result
}
