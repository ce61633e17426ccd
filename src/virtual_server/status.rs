// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::VirtualServer;
use crate::readiness::{Condition, NetworkSummary, ReadinessSource, ready_condition};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualServerStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkStatus>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkStatus {
    #[serde(rename = "internalIP", default, skip_serializing_if = "Option::is_none")]
    pub internal_ip: Option<String>,
    #[serde(rename = "externalIP", default, skip_serializing_if = "Option::is_none")]
    pub external_ip: Option<String>,
    #[serde(rename = "floatingIPs", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub floating_ips: BTreeMap<String, String>,
}

impl VirtualServerStatus {
    pub fn internal_ip(&self) -> Option<&str> {
        self.network.as_ref().and_then(|n| n.internal_ip.as_deref())
    }

    pub fn external_ip(&self) -> Option<&str> {
        self.network.as_ref().and_then(|n| n.external_ip.as_deref())
    }

    pub fn floating_ips(&self) -> BTreeMap<String, String> {
        self.network.as_ref().map(|n| n.floating_ips.clone()).unwrap_or_default()
    }
}

impl VirtualServer {
    pub fn ready_condition(&self) -> Option<&Condition> {
        self.status.as_ref().and_then(|status| ready_condition(&status.conditions))
    }
}

impl ReadinessSource for VirtualServer {
    fn conditions(&self) -> &[Condition] {
        self.status.as_ref().map(|status| status.conditions.as_slice()).unwrap_or_default()
    }

    fn network_summary(&self) -> NetworkSummary {
        let Some(status) = self.status.as_ref() else {
            return NetworkSummary::default();
        };
        NetworkSummary {
            internal_ip: status.internal_ip().map(str::to_owned),
            external_ip: status.external_ip().map(str::to_owned),
            floating_ips: status.floating_ips(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        readiness::{Outcome, ReadinessSource, classify},
        virtual_server::VirtualServer,
    };

    #[test]
    fn test_ready_virtual_server() {
        let vs = r#"
apiVersion: virtualservers.coreweave.com/v1alpha1
kind: VirtualServer
metadata:
  name: my-test-virtual-server
  namespace: tenant-a
spec:
  region: ORD1
status:
  conditions:
  - type: Ready
    status: "True"
    reason: VirtualServerReady
    message: VirtualServer is ready
    lastTransitionTime: "2021-03-01T10:00:00Z"
  network:
    internalIP: 10.135.102.139
    externalIP: 216.153.60.10
    floatingIPs:
      example-floating-ip-service: 216.153.60.11
"#;
        let vs: VirtualServer = serde_yaml::from_str(vs).unwrap();
        assert_eq!(classify(vs.conditions()), Some(Outcome::Ready));
        assert_eq!(vs.ready_condition().and_then(|c| c.message.as_deref()), Some("VirtualServer is ready"));

        let network = vs.network_summary();
        assert_eq!(network.internal_ip.as_deref(), Some("10.135.102.139"));
        assert_eq!(network.external_ip.as_deref(), Some("216.153.60.10"));
        assert_eq!(network.floating_ips.get("example-floating-ip-service").map(String::as_str), Some("216.153.60.11"));
    }

    #[test]
    fn test_virtual_server_without_status() {
        let vs = r"
apiVersion: virtualservers.coreweave.com/v1alpha1
kind: VirtualServer
metadata:
  name: my-test-virtual-server
spec:
  region: ORD1
";
        let vs: VirtualServer = serde_yaml::from_str(vs).unwrap();
        assert!(vs.conditions().is_empty());
        assert_eq!(vs.ready_condition(), None);
        assert_eq!(vs.network_summary(), Default::default());
        assert_eq!(classify(vs.conditions()), Some(Outcome::Unknown));
    }
}
