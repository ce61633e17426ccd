// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::{
    Result,
    common::{DEFAULT_NAMESPACE_NAME, ResourceKey},
    readiness::{DEFAULT_MAX_BACKOFF, DEFAULT_POLL_INTERVAL},
};

pub const DEFAULT_VIRTUAL_SERVER_NAME: &str = "my-test-virtual-server";
pub const DEFAULT_LOG_FILE: &str = "virtual-server-demo.log";
pub const DEFAULT_OPEN_TELEMETRY_ENDPOINT: &str = "http://127.0.0.1:4317";

fn default_namespace() -> String {
    DEFAULT_NAMESPACE_NAME.to_owned()
}

fn default_name() -> String {
    DEFAULT_VIRTUAL_SERVER_NAME.to_owned()
}

fn default_log_file() -> String {
    DEFAULT_LOG_FILE.to_owned()
}

fn default_open_telemetry_endpoint() -> String {
    DEFAULT_OPEN_TELEMETRY_ENDPOINT.to_owned()
}

#[allow(clippy::cast_possible_truncation)]
fn default_poll_interval_millis() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

#[allow(clippy::cast_possible_truncation)]
fn default_max_backoff_millis() -> u64 {
    DEFAULT_MAX_BACKOFF.as_millis() as u64
}

#[derive(Clone, Debug, Default, TypedBuilder, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Clone, Debug, TypedBuilder, Deserialize)]
pub struct WaitConfiguration {
    #[serde(default = "default_poll_interval_millis")]
    #[builder(default = default_poll_interval_millis())]
    pub poll_interval_millis: u64,
    #[serde(default = "default_max_backoff_millis")]
    #[builder(default = default_max_backoff_millis())]
    pub max_backoff_millis: u64,
    #[serde(default)]
    #[builder(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for WaitConfiguration {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WaitConfiguration {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_millis)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, TypedBuilder, Deserialize)]
pub struct Configuration {
    #[serde(default = "default_namespace")]
    #[builder(default = default_namespace())]
    pub namespace: String,
    #[serde(default = "default_name")]
    #[builder(default = default_name())]
    pub name: String,
    #[serde(default)]
    #[builder(default)]
    pub credentials: Credentials,
    #[serde(default)]
    #[builder(default)]
    pub enable_open_telemetry: Option<bool>,
    #[serde(default = "default_open_telemetry_endpoint")]
    #[builder(default = default_open_telemetry_endpoint())]
    pub open_telemetry_endpoint: String,
    #[serde(default = "default_log_file")]
    #[builder(default = default_log_file())]
    pub log_file: String,
    #[serde(default)]
    #[builder(default)]
    pub cleanup_auxiliary: bool,
    #[serde(default)]
    #[builder(default)]
    pub wait: WaitConfiguration,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("namespace must be not empty")]
    Namespace,
    #[error("virtual server name must be not empty")]
    Name,
    #[error("required credential username is missing")]
    Username,
    #[error("required credential password is missing")]
    Password,
    #[error("poll interval must be greater than zero")]
    PollInterval,
    #[error("max backoff must be not shorter than the poll interval")]
    MaxBackoff,
}

impl Configuration {
    pub fn validate(&self) -> Result<()> {
        self.check().map_err(Into::into)
    }

    fn check(&self) -> std::result::Result<(), ConfigurationError> {
        if self.namespace.is_empty() {
            return Err(ConfigurationError::Namespace);
        }
        if self.name.is_empty() {
            return Err(ConfigurationError::Name);
        }
        if self.credentials.username.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigurationError::Username);
        }
        if self.credentials.password.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigurationError::Password);
        }
        if self.wait.poll_interval_millis == 0 {
            return Err(ConfigurationError::PollInterval);
        }
        if self.wait.max_backoff_millis < self.wait.poll_interval_millis {
            return Err(ConfigurationError::MaxBackoff);
        }
        Ok(())
    }

    pub fn virtual_server_key(&self) -> ResourceKey {
        ResourceKey::namespaced(&self.name, &self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Configuration, ConfigurationError, Credentials};

    #[test]
    fn test_full_configuration() {
        let configuration = r"
namespace: tenant-a
name: vm-1
credentials:
  username: jane
  password: secret
enable_open_telemetry: true
open_telemetry_endpoint: http://otel-collector:4317
log_file: demo.log
cleanup_auxiliary: true
wait:
  poll_interval_millis: 500
  max_backoff_millis: 8000
  timeout_secs: 900
";
        let configuration: Configuration = serde_yaml::from_str(configuration).unwrap();
        assert_eq!(configuration.check(), Ok(()));
        assert_eq!(configuration.virtual_server_key().to_string(), "tenant-a.vm-1");
        assert_eq!(configuration.wait.poll_interval(), Duration::from_millis(500));
        assert_eq!(configuration.wait.max_backoff(), Duration::from_secs(8));
        assert_eq!(configuration.wait.timeout(), Some(Duration::from_secs(900)));
        assert!(configuration.cleanup_auxiliary);
        assert_eq!(configuration.open_telemetry_endpoint, "http://otel-collector:4317");
        assert_eq!(configuration.log_file, "demo.log");
    }

    #[test]
    fn test_defaults() {
        let configuration = r"
credentials:
  username: jane
  password: secret
";
        let configuration: Configuration = serde_yaml::from_str(configuration).unwrap();
        assert_eq!(configuration.check(), Ok(()));
        assert_eq!(configuration.namespace, "default");
        assert_eq!(configuration.name, "my-test-virtual-server");
        assert_eq!(configuration.wait.poll_interval(), Duration::from_secs(2));
        assert_eq!(configuration.wait.timeout(), None);
        assert!(!configuration.cleanup_auxiliary);
        assert_eq!(configuration.open_telemetry_endpoint, "http://127.0.0.1:4317");
        assert_eq!(configuration.log_file, "virtual-server-demo.log");
    }

    #[test]
    fn test_both_credentials_are_required() {
        let username_only = Credentials::builder().username(Some("jane".to_owned())).password(None).build();
        let configuration = Configuration::builder().credentials(username_only).build();
        assert_eq!(configuration.check(), Err(ConfigurationError::Password));

        let password_only = Credentials::builder().username(None).password(Some("secret".to_owned())).build();
        let configuration = Configuration::builder().credentials(password_only).build();
        assert_eq!(configuration.check(), Err(ConfigurationError::Username));

        let empty_password = Credentials::builder().username(Some("jane".to_owned())).password(Some(String::new())).build();
        let configuration = Configuration::builder().credentials(empty_password).build();
        assert_eq!(configuration.check(), Err(ConfigurationError::Password));
        assert!(configuration.validate().is_err());
    }

    #[test]
    fn test_invalid_wait() {
        let configuration = r"
credentials:
  username: jane
  password: secret
wait:
  poll_interval_millis: 0
";
        let configuration: Configuration = serde_yaml::from_str(configuration).unwrap();
        assert_eq!(configuration.check(), Err(ConfigurationError::PollInterval));
    }

    #[test]
    fn test_max_backoff_shorter_than_poll_interval() {
        let configuration = r"
credentials:
  username: jane
  password: secret
wait:
  poll_interval_millis: 2000
  max_backoff_millis: 0
";
        let configuration: Configuration = serde_yaml::from_str(configuration).unwrap();
        assert_eq!(configuration.check(), Err(ConfigurationError::MaxBackoff));

        let configuration = r"
credentials:
  username: jane
  password: secret
wait:
  poll_interval_millis: 2000
  max_backoff_millis: 2000
";
        let configuration: Configuration = serde_yaml::from_str(configuration).unwrap();
        assert_eq!(configuration.check(), Ok(()));
    }
}
