// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

mod status;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use status::{NetworkStatus, VirtualServerStatus};
use thiserror::Error;

use crate::common::is_valid_quantity;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SpecError {
    #[error("region must be not empty")]
    Region,
    #[error("cpu type can't be selected together with gpu type {0}")]
    CpuAndGpuType(String),
    #[error("root storage {0} must be not empty")]
    RootStorageField(&'static str),
    #[error("invalid quantity {0:?}")]
    Quantity(String),
}

#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "virtualservers.coreweave.com",
    version = "v1alpha1",
    kind = "VirtualServer",
    plural = "virtualservers",
    shortname = "vs",
    status = "VirtualServerStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct VirtualServerSpec {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub os: OperatingSystem,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<User>,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub network: Network,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initialize_running: Option<bool>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystemType {
    #[default]
    Linux,
    Windows,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OperatingSystem {
    #[serde(rename = "type")]
    pub type_: OperatingSystemType,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Resources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu: Option<Gpu>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Cpu>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Gpu {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Cpu {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct User {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Storage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<RootStorage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filesystems: Vec<FileSystem>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RootStorage {
    pub size: String,
    pub storage_class_name: String,
    pub source: RootStorageSource,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RootStorageSource {
    pub pvc: PvcReference,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PvcReference {
    pub namespace: String,
    pub name: String,
}

/// Describes where the root filesystem is cloned from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RootPvcSource {
    pub size: String,
    pub pvc_name: String,
    pub pvc_namespace: String,
    pub storage_class_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileSystem {
    pub name: String,
    pub spec: FileSystemSpec,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemSpec {
    pub persistent_volume_claim: PersistentVolumeClaimSource,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersistentVolumeClaimSource {
    pub claim_name: String,
    #[serde(default)]
    pub read_only: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    #[serde(rename = "directAttachLoadBalancerIP", default, skip_serializing_if = "Option::is_none")]
    pub direct_attach_load_balancer_ip: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp: Option<Ports>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udp: Option<Ports>,
    #[serde(rename = "floatingIPs", default, skip_serializing_if = "Vec::is_empty")]
    pub floating_ips: Vec<FloatingIp>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Ports {
    #[serde(default)]
    pub ports: Vec<i32>,
}

impl Ports {
    fn add(&mut self, port: i32) {
        if !self.ports.contains(&port) {
            self.ports.push(port);
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FloatingIp {
    pub service_name: String,
}

impl VirtualServer {
    pub fn namespaced(name: &str, namespace: &str) -> Self {
        let mut virtual_server = VirtualServer::new(name, VirtualServerSpec::default());
        virtual_server.metadata.namespace = Some(namespace.to_owned());
        virtual_server
    }

    pub fn set_region(&mut self, region: &str) -> &mut Self {
        region.clone_into(&mut self.spec.region);
        self
    }

    pub fn set_os(&mut self, os: OperatingSystemType) -> &mut Self {
        self.spec.os.type_ = os;
        self
    }

    pub fn set_gpu_type(&mut self, gpu_type: &str) -> &mut Self {
        self.spec.resources.gpu.get_or_insert_with(Gpu::default).type_ = Some(gpu_type.to_owned());
        self
    }

    pub fn set_gpu_count(&mut self, count: u32) -> &mut Self {
        self.spec.resources.gpu.get_or_insert_with(Gpu::default).count = Some(count);
        self
    }

    /// The cpu type is derived from the gpu type when a gpu is requested, see [`VirtualServerSpec::validate`].
    pub fn set_cpu_type(&mut self, cpu_type: &str) -> &mut Self {
        self.spec.resources.cpu.get_or_insert_with(Cpu::default).type_ = Some(cpu_type.to_owned());
        self
    }

    pub fn set_cpu_count(&mut self, count: u32) -> &mut Self {
        self.spec.resources.cpu.get_or_insert_with(Cpu::default).count = Some(count);
        self
    }

    pub fn set_memory(&mut self, memory: &str) -> &mut Self {
        self.spec.resources.memory = Some(memory.to_owned());
        self
    }

    pub fn add_user(&mut self, user: User) -> &mut Self {
        self.spec.users.retain(|u| u.username != user.username);
        self.spec.users.push(user);
        self
    }

    pub fn configure_storage_root_with_pvc_source(&mut self, source: RootPvcSource) -> Result<&mut Self, SpecError> {
        let required = [
            ("size", &source.size),
            ("pvc name", &source.pvc_name),
            ("pvc namespace", &source.pvc_namespace),
            ("storage class name", &source.storage_class_name),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(SpecError::RootStorageField(*field));
        }
        if !is_valid_quantity(&source.size) {
            return Err(SpecError::Quantity(source.size));
        }

        self.spec.storage.root = Some(RootStorage {
            size: source.size,
            storage_class_name: source.storage_class_name,
            source: RootStorageSource { pvc: PvcReference { namespace: source.pvc_namespace, name: source.pvc_name } },
        });
        Ok(self)
    }

    pub fn add_pvc_file_system(&mut self, name: &str, claim_name: &str, read_only: bool) -> &mut Self {
        self.spec.storage.filesystems.retain(|f| f.name != name);
        self.spec.storage.filesystems.push(FileSystem {
            name: name.to_owned(),
            spec: FileSystemSpec {
                persistent_volume_claim: PersistentVolumeClaimSource { claim_name: claim_name.to_owned(), read_only },
            },
        });
        self
    }

    pub fn add_floating_ip(&mut self, service_name: &str) -> &mut Self {
        let floating_ips = &mut self.spec.network.floating_ips;
        if !floating_ips.iter().any(|f| f.service_name == service_name) {
            floating_ips.push(FloatingIp { service_name: service_name.to_owned() });
        }
        self
    }

    pub fn direct_attach_load_balancer_ip(&mut self, enabled: bool) -> &mut Self {
        self.spec.network.direct_attach_load_balancer_ip = Some(enabled);
        self
    }

    pub fn expose_tcp_ports(&mut self, ports: &[i32]) -> &mut Self {
        for port in ports {
            self.expose_tcp_port(*port);
        }
        self
    }

    pub fn expose_tcp_port(&mut self, port: i32) -> &mut Self {
        self.spec.network.tcp.get_or_insert_with(Ports::default).add(port);
        self
    }

    pub fn expose_udp_ports(&mut self, ports: &[i32]) -> &mut Self {
        for port in ports {
            self.expose_udp_port(*port);
        }
        self
    }

    pub fn expose_udp_port(&mut self, port: i32) -> &mut Self {
        self.spec.network.udp.get_or_insert_with(Ports::default).add(port);
        self
    }

    pub fn enable_public_ip(&mut self, enabled: bool) -> &mut Self {
        self.spec.network.public = Some(enabled);
        self
    }

    pub fn initialize_running(&mut self, running: bool) -> &mut Self {
        self.spec.initialize_running = Some(running);
        self
    }
}

impl VirtualServerSpec {
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.region.is_empty() {
            return Err(SpecError::Region);
        }
        let gpu_type = self.resources.gpu.as_ref().and_then(|gpu| gpu.type_.as_ref());
        let cpu_type = self.resources.cpu.as_ref().and_then(|cpu| cpu.type_.as_ref());
        if let (Some(gpu_type), Some(_)) = (gpu_type, cpu_type) {
            return Err(SpecError::CpuAndGpuType(gpu_type.clone()));
        }
        if let Some(memory) = self.resources.memory.as_ref().filter(|memory| !is_valid_quantity(memory)) {
            return Err(SpecError::Quantity(memory.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use kube::Resource;

    use super::{OperatingSystemType, RootPvcSource, SpecError, User, VirtualServer};

    fn root_source() -> RootPvcSource {
        RootPvcSource {
            size: "40Gi".to_owned(),
            pvc_name: "ubuntu1804-docker-master-20210210-ord1".to_owned(),
            pvc_namespace: "vd-images".to_owned(),
            storage_class_name: "ceph-ssd-2-replica".to_owned(),
        }
    }

    #[test]
    fn test_resource_identity() {
        assert_eq!(VirtualServer::group(&()), "virtualservers.coreweave.com");
        assert_eq!(VirtualServer::version(&()), "v1alpha1");
        assert_eq!(VirtualServer::plural(&()), "virtualservers");
        let vs = VirtualServer::namespaced("vm-1", "tenant-a");
        assert_eq!(vs.metadata.namespace.as_deref(), Some("tenant-a"));
    }

    #[test]
    fn test_build_spec() {
        let mut vs = VirtualServer::namespaced("my-test-virtual-server", "default");
        vs.set_region("ORD1")
            .set_os(OperatingSystemType::Linux)
            .set_gpu_type("Quadro_RTX_4000")
            .set_gpu_count(1)
            .set_cpu_count(2)
            .set_memory("16Gi")
            .add_user(User { username: "jane".to_owned(), password: "secret".to_owned() })
            .direct_attach_load_balancer_ip(true)
            .expose_tcp_ports(&[22, 443])
            .expose_udp_port(4172)
            .enable_public_ip(true)
            .initialize_running(true)
            .add_pvc_file_system("example-storage", "example-pvc", false)
            .add_floating_ip("example-floating-ip-service");
        vs.configure_storage_root_with_pvc_source(root_source()).unwrap();
        assert_eq!(vs.spec.validate(), Ok(()));

        let expected = r#"
region: ORD1
os:
  type: linux
resources:
  gpu:
    type: Quadro_RTX_4000
    count: 1
  cpu:
    count: 2
  memory: 16Gi
users:
- username: jane
  password: secret
storage:
  root:
    size: 40Gi
    storageClassName: ceph-ssd-2-replica
    source:
      pvc:
        namespace: vd-images
        name: ubuntu1804-docker-master-20210210-ord1
  filesystems:
  - name: example-storage
    spec:
      persistentVolumeClaim:
        claimName: example-pvc
        readOnly: false
network:
  directAttachLoadBalancerIP: true
  public: true
  tcp:
    ports:
    - 22
    - 443
  udp:
    ports:
    - 4172
  floatingIPs:
  - serviceName: example-floating-ip-service
initializeRunning: true
"#;
        let expected: serde_yaml::Value = serde_yaml::from_str(expected).unwrap();
        assert_eq!(serde_yaml::to_value(&vs.spec).unwrap(), expected);
    }

    #[test]
    fn test_repeated_calls_do_not_duplicate() {
        let mut vs = VirtualServer::namespaced("vm-1", "default");
        vs.expose_tcp_ports(&[22, 443]).expose_tcp_port(22).add_floating_ip("svc").add_floating_ip("svc");
        vs.add_user(User { username: "jane".to_owned(), password: "one".to_owned() });
        vs.add_user(User { username: "jane".to_owned(), password: "two".to_owned() });
        assert_eq!(vs.spec.network.tcp.as_ref().map(|tcp| tcp.ports.clone()), Some(vec![22, 443]));
        assert_eq!(vs.spec.network.floating_ips.len(), 1);
        assert_eq!(vs.spec.users, vec![User { username: "jane".to_owned(), password: "two".to_owned() }]);
    }

    #[test]
    fn test_cpu_and_gpu_type_are_exclusive() {
        let mut vs = VirtualServer::namespaced("vm-1", "default");
        vs.set_region("ORD1").set_gpu_type("Quadro_RTX_4000").set_cpu_type("amd-epyc-rome");
        assert_eq!(vs.spec.validate(), Err(SpecError::CpuAndGpuType("Quadro_RTX_4000".to_owned())));

        let mut vs = VirtualServer::namespaced("vm-1", "default");
        vs.set_region("ORD1").set_cpu_type("amd-epyc-rome").set_cpu_count(4);
        assert_eq!(vs.spec.validate(), Ok(()));
    }

    #[test]
    fn test_invalid_spec() {
        let vs = VirtualServer::namespaced("vm-1", "default");
        assert_eq!(vs.spec.validate(), Err(SpecError::Region));

        let mut vs = VirtualServer::namespaced("vm-1", "default");
        vs.set_region("ORD1").set_memory("lots");
        assert_eq!(vs.spec.validate(), Err(SpecError::Quantity("lots".to_owned())));
    }

    #[test]
    fn test_invalid_root_storage() {
        let mut vs = VirtualServer::namespaced("vm-1", "default");
        let source = RootPvcSource { pvc_name: String::new(), ..root_source() };
        assert_eq!(vs.configure_storage_root_with_pvc_source(source).err(), Some(SpecError::RootStorageField("pvc name")));

        let source = RootPvcSource { size: "forty".to_owned(), ..root_source() };
        assert_eq!(vs.configure_storage_root_with_pvc_source(source).err(), Some(SpecError::Quantity("forty".to_owned())));
        assert_eq!(vs.spec.storage.root, None);
    }
}
