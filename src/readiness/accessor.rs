// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::{fmt::Debug, marker::PhantomData};

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{Instrument, Level, span};

use crate::common::{ResourceKey, format_resource};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("resource not found")]
    NotFound,
    #[error("transient failure {0}")]
    Transient(String),
    #[error("permanent failure {0}")]
    Permanent(String),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::NotFound | FetchError::Transient(_))
    }
}

impl From<kube::Error> for FetchError {
    fn from(error: kube::Error) -> Self {
        match error {
            kube::Error::Api(response) => match response.code {
                404 => FetchError::NotFound,
                408 | 409 | 429 | 500..=599 => FetchError::Transient(format!("{} {}", response.code, response.message)),
                _ => FetchError::Permanent(format!("{} {}", response.code, response.message)),
            },
            kube::Error::SerdeError(e) => FetchError::Permanent(e.to_string()),
            kube::Error::BuildRequest(e) => FetchError::Permanent(e.to_string()),
            kube::Error::InferConfig(e) => FetchError::Permanent(e.to_string()),
            kube::Error::Auth(e) => FetchError::Permanent(e.to_string()),
            other => FetchError::Transient(other.to_string()),
        }
    }
}

/// Performs a single read of the watched object.
#[async_trait]
pub trait Accessor<K>: Send + Sync {
    async fn fetch(&self, key: &ResourceKey) -> Result<K, FetchError>;
}

pub struct KubeAccessor<K> {
    client: Client,
    resource: PhantomData<fn() -> K>,
}

impl<K> KubeAccessor<K> {
    pub fn new(client: Client) -> Self {
        Self { client, resource: PhantomData }
    }
}

impl<K> Clone for KubeAccessor<K> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone())
    }
}

#[async_trait]
impl<K> Accessor<K> for KubeAccessor<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
    K: DeserializeOwned + Clone + Debug + Send + Sync + 'static,
{
    async fn fetch(&self, key: &ResourceKey) -> Result<K, FetchError> {
        let span = span!(Level::DEBUG, "KubeAccessor", resource = format_resource::<K>(), id = %key);
        let api: Api<K> = Api::namespaced(self.client.clone(), &key.namespace);
        api.get(&key.name).instrument(span).await.map_err(FetchError::from)
    }
}
