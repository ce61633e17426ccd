// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::{collections::BTreeMap, fmt::Debug};

use k8s_openapi::{
    NamespaceResourceScope,
    api::core::v1::{PersistentVolumeClaim, PersistentVolumeClaimSpec, Service, ServicePort, ServiceSpec, VolumeResourceRequirements},
    apimachinery::pkg::api::resource::Quantity,
};
use kube::{
    Api, Client, Resource, ResourceExt,
    api::{DeleteParams, PostParams},
};
use kube_core::ObjectMeta;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{Instrument, Level, info, span};

use crate::common::{ResourceKey, format_resource};

pub const DEFAULT_PVC_STORAGE_CLASS: &str = "block-nvme-ewr1";
const FLOATING_IP_PORT_NAME: &str = "p0";
const FLOATING_IP_PORT: i32 = 1;

pub fn build_pvc(name: &str, namespace: &str, size: Quantity) -> PersistentVolumeClaim {
    build_pvc_with_storage_class(name, namespace, size, DEFAULT_PVC_STORAGE_CLASS)
}

pub fn build_pvc_with_storage_class(name: &str, namespace: &str, size: Quantity, storage_class: &str) -> PersistentVolumeClaim {
    PersistentVolumeClaim {
        metadata: ObjectMeta { name: Some(name.to_owned()), namespace: Some(namespace.to_owned()), ..Default::default() },
        spec: Some(PersistentVolumeClaimSpec {
            access_modes: Some(vec!["ReadWriteOnce".to_owned()]),
            volume_mode: Some("Block".to_owned()),
            storage_class_name: Some(storage_class.to_owned()),
            resources: Some(VolumeResourceRequirements {
                requests: Some(BTreeMap::from([("storage".to_owned(), size)])),
                ..Default::default()
            }),
            ..Default::default()
        }),
        status: None,
    }
}

/// A load balancer service whose only purpose is to reserve an address that can be attached to a virtual server.
pub fn build_floating_ip_service(name: &str, namespace: &str) -> Service {
    Service {
        metadata: ObjectMeta { name: Some(name.to_owned()), namespace: Some(namespace.to_owned()), ..Default::default() },
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort { name: Some(FLOATING_IP_PORT_NAME.to_owned()), port: FLOATING_IP_PORT, ..Default::default() }]),
            type_: Some("LoadBalancer".to_owned()),
            ..Default::default()
        }),
        status: None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Created {
    New,
    AlreadyExists,
}

pub fn namespaced_api<K>(client: &Client, key: &ResourceKey) -> Api<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
{
    Api::namespaced(client.clone(), &key.namespace)
}

/// Creates the object, treating an existing object with the same name as success so that reruns converge.
pub async fn create_tolerating_conflict<K>(api: &Api<K>, resource: &K) -> Result<Created, kube::Error>
where
    K: Resource + Serialize + DeserializeOwned + Clone + Debug,
{
    let span = span!(Level::INFO, "Provisioning", resource = format_resource::<K>(), name = %resource.name_any());
    match api.create(&PostParams::default(), resource).instrument(span.clone()).await {
        Ok(_) => {
            span.in_scope(|| info!("created"));
            Ok(Created::New)
        },
        Err(kube::Error::Api(e)) if e.code == 409 => {
            span.in_scope(|| info!("already exists {}", e.message));
            Ok(Created::AlreadyExists)
        },
        Err(e) => Err(e),
    }
}

/// Deletes the object. Returns `false` when there was nothing to delete.
pub async fn delete_ignoring_missing<K>(api: &Api<K>, name: &str) -> Result<bool, kube::Error>
where
    K: Resource + DeserializeOwned + Clone + Debug,
{
    let span = span!(Level::INFO, "Provisioning", resource = format_resource::<K>(), name);
    match api.delete(name, &DeleteParams::default()).instrument(span.clone()).await {
        Ok(_) => {
            span.in_scope(|| info!("deleted"));
            Ok(true)
        },
        Err(kube::Error::Api(e)) if e.code == 404 => {
            span.in_scope(|| info!("already deleted"));
            Ok(false)
        },
        Err(e) => Err(e),
    }
}
