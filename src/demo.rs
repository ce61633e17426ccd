// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use k8s_openapi::{
    api::core::v1::{PersistentVolumeClaim, Service},
    apimachinery::pkg::api::resource::Quantity,
};
use kube::{Api, Client, api::PostParams};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    Result,
    common::ResourceKey,
    configuration::Configuration,
    provisioning::{build_floating_ip_service, build_pvc, create_tolerating_conflict, delete_ignoring_missing, namespaced_api},
    readiness::{KubeAccessor, Outcome, ReadinessWaiter},
    services::VirtualMachineControl,
    virtual_server::{OperatingSystemType, RootPvcSource, User, VirtualServer},
};

const REGION: &str = "ORD1";
const GPU_TYPE: &str = "Quadro_RTX_4000";
const GPU_COUNT: u32 = 1;
const CPU_COUNT: u32 = 2;
const MEMORY: &str = "16Gi";
const ROOT_SIZE: &str = "40Gi";
const ROOT_SOURCE_PVC_NAME: &str = "ubuntu1804-docker-master-20210210-ord1";
const ROOT_SOURCE_PVC_NAMESPACE: &str = "vd-images";
const ROOT_STORAGE_CLASS: &str = "ceph-ssd-2-replica";
const TCP_PORTS: [i32; 2] = [22, 443];
const UDP_PORT: i32 = 4172;
const EXAMPLE_PVC_NAME: &str = "example-pvc";
const EXAMPLE_PVC_SIZE: &str = "256Gi";
const EXAMPLE_FILE_SYSTEM_NAME: &str = "example-storage";
const EXAMPLE_FLOATING_IP_SERVICE_NAME: &str = "example-floating-ip-service";

pub fn build_virtual_server(configuration: &Configuration) -> Result<VirtualServer> {
    let mut virtual_server = VirtualServer::namespaced(&configuration.name, &configuration.namespace);
    virtual_server
        .set_region(REGION)
        .set_os(OperatingSystemType::Linux)
        .set_gpu_type(GPU_TYPE)
        .set_gpu_count(GPU_COUNT)
        .set_cpu_count(CPU_COUNT)
        .set_memory(MEMORY)
        .add_user(User {
            username: configuration.credentials.username.clone().unwrap_or_default(),
            password: configuration.credentials.password.clone().unwrap_or_default(),
        })
        .configure_storage_root_with_pvc_source(RootPvcSource {
            size: ROOT_SIZE.to_owned(),
            pvc_name: ROOT_SOURCE_PVC_NAME.to_owned(),
            pvc_namespace: ROOT_SOURCE_PVC_NAMESPACE.to_owned(),
            storage_class_name: ROOT_STORAGE_CLASS.to_owned(),
        })?
        .direct_attach_load_balancer_ip(true)
        .expose_tcp_ports(&TCP_PORTS)
        .expose_udp_port(UDP_PORT)
        .enable_public_ip(true)
        .initialize_running(true);
    Ok(virtual_server)
}

/// Provisions a virtual server with its auxiliary storage and network objects, waits for it to become ready, stops
/// it, waits again and deletes it. The virtual server is deleted on every path once it was created.
pub async fn run(client: Client, configuration: Configuration, cancellation_token: CancellationToken) -> Result<()> {
    let key = configuration.virtual_server_key();
    key.validate()?;

    let mut virtual_server = build_virtual_server(&configuration)?;

    let pvc_key = ResourceKey::namespaced(EXAMPLE_PVC_NAME, &configuration.namespace);
    let pvc_api: Api<PersistentVolumeClaim> = namespaced_api(&client, &pvc_key);
    let pvc = build_pvc(&pvc_key.name, &pvc_key.namespace, Quantity(EXAMPLE_PVC_SIZE.to_owned()));
    create_tolerating_conflict(&pvc_api, &pvc).await?;
    virtual_server.add_pvc_file_system(EXAMPLE_FILE_SYSTEM_NAME, &pvc_key.name, false);

    let service_key = ResourceKey::namespaced(EXAMPLE_FLOATING_IP_SERVICE_NAME, &configuration.namespace);
    let service_api: Api<Service> = namespaced_api(&client, &service_key);
    let service = build_floating_ip_service(&service_key.name, &service_key.namespace);
    create_tolerating_conflict(&service_api, &service).await?;
    virtual_server.add_floating_ip(&service_key.name);

    virtual_server.spec.validate()?;

    let api: Api<VirtualServer> = namespaced_api(&client, &key);
    if !delete_ignoring_missing(&api, &key.name).await? {
        info!("VirtualServer {} in namespace {} already deleted", key.name, key.namespace);
    }
    api.create(&PostParams::default(), &virtual_server).await?;
    info!("VirtualServer {key} created");

    let waiter = ReadinessWaiter::builder()
        .poll_interval(configuration.wait.poll_interval())
        .max_backoff(configuration.wait.max_backoff())
        .timeout(configuration.wait.timeout())
        .cancellation_token(cancellation_token)
        .build();
    let result = start_and_stop(&client, &waiter, &key).await;
    if let Err(e) = &result {
        warn!("VirtualServer {key} failed, deleting {e}");
    }

    let deleted = delete_ignoring_missing(&api, &key.name).await;
    let cleaned_up = if configuration.cleanup_auxiliary {
        let service_deleted = delete_ignoring_missing(&service_api, &service_key.name).await;
        let pvc_deleted = delete_ignoring_missing(&pvc_api, &pvc_key.name).await;
        service_deleted.and(pvc_deleted).map(|_| ())
    } else {
        Ok(())
    };

    result?;
    deleted?;
    cleaned_up?;
    Ok(())
}

async fn start_and_stop(client: &Client, waiter: &ReadinessWaiter, key: &ResourceKey) -> Result<()> {
    let accessor = KubeAccessor::<VirtualServer>::new(client.clone());

    let readiness = waiter.wait(key, &accessor).await?;
    info!("VirtualServer status: {}", readiness.outcome);
    if let Some(network) = &readiness.network {
        info!("{network}");
    }

    if readiness.outcome == Outcome::Unknown {
        warn!("VirtualServer {key} reports no readiness condition, stopping anyway");
    }
    VirtualMachineControl::builder().client(client.clone()).build().stop(key).await?;

    let readiness = waiter.wait(key, &accessor).await?;
    info!("VirtualServer status: {}", readiness.outcome);
    Ok(())
}
