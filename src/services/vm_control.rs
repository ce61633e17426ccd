// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::fmt::Display;

use http::{Request, header};
use kube::Client;
use thiserror::Error;
use tracing::{Instrument, Level, info, span, warn};
use typed_builder::TypedBuilder;

use crate::common::ResourceKey;

const KUBEVIRT_SUBRESOURCES_PATH: &str = "/apis/subresources.kubevirt.io/v1";

#[derive(Error, Debug)]
pub enum VmControlError {
    #[error("can't build request {0}")]
    Request(#[from] http::Error),
    #[error("virtual machine request failed {0}")]
    Api(#[from] kube::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VmAction {
    Start,
    Stop,
}

impl Display for VmAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VmAction::Start => f.write_str("start"),
            VmAction::Stop => f.write_str("stop"),
        }
    }
}

/// Drives the KubeVirt virtual machine backing a virtual server through the subresource API.
#[derive(Clone, TypedBuilder)]
pub struct VirtualMachineControl {
    client: Client,
}

impl VirtualMachineControl {
    pub async fn stop(&self, key: &ResourceKey) -> Result<(), VmControlError> {
        self.request(key, VmAction::Stop).await
    }

    pub async fn start(&self, key: &ResourceKey) -> Result<(), VmControlError> {
        self.request(key, VmAction::Start).await
    }

    async fn request(&self, key: &ResourceKey, action: VmAction) -> Result<(), VmControlError> {
        let span = span!(Level::INFO, "VirtualMachineControl", id = %key, %action);
        let uri = format!("{KUBEVIRT_SUBRESOURCES_PATH}/namespaces/{}/virtualmachines/{}/{action}", key.namespace, key.name);
        let request = Request::put(uri).header(header::CONTENT_TYPE, "application/json").body(b"{}".to_vec())?;

        match self.client.request_text(request).instrument(span.clone()).await {
            Ok(_) => {
                span.in_scope(|| info!("virtual machine {action} requested"));
                Ok(())
            },
            Err(e) => {
                span.in_scope(|| warn!("virtual machine {action} failed {e:?}"));
                Err(e.into())
            },
        }
    }
}
