// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::fmt::Display;

use kube::{Resource, ResourceExt};
use thiserror::Error;

pub const DEFAULT_NAMESPACE_NAME: &str = "default";

const MAX_NAME_LENGTH: usize = 253;
const MAX_NAMESPACE_LENGTH: usize = 63;

#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ResourceKey {
    pub namespace: String,
    pub name: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResourceKeyError {
    #[error("resource name must be not empty")]
    EmptyName,
    #[error("namespace must be not empty")]
    EmptyNamespace,
    #[error("invalid resource name {0:?}")]
    InvalidName(String),
    #[error("invalid namespace {0:?}")]
    InvalidNamespace(String),
}

impl ResourceKey {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_owned(), ..Default::default() }
    }

    pub fn namespaced(name: &str, namespace: &str) -> Self {
        Self { name: name.to_owned(), namespace: namespace.to_owned() }
    }

    /// Checks that the key can address an object at all. Names are DNS-1123 subdomains,
    /// namespaces are DNS-1123 labels.
    pub fn validate(&self) -> Result<(), ResourceKeyError> {
        if self.name.is_empty() {
            return Err(ResourceKeyError::EmptyName);
        }
        if self.namespace.is_empty() {
            return Err(ResourceKeyError::EmptyNamespace);
        }
        if self.name.len() > MAX_NAME_LENGTH || !self.name.split('.').all(is_dns1123_label) {
            return Err(ResourceKeyError::InvalidName(self.name.clone()));
        }
        if self.namespace.len() > MAX_NAMESPACE_LENGTH || !is_dns1123_label(&self.namespace) {
            return Err(ResourceKeyError::InvalidNamespace(self.namespace.clone()));
        }
        Ok(())
    }
}

impl Default for ResourceKey {
    fn default() -> Self {
        Self { namespace: DEFAULT_NAMESPACE_NAME.to_owned(), name: String::default() }
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", create_id(&self.name, &self.namespace))
    }
}

fn create_id(name: &str, namespace: &str) -> String {
    namespace.to_owned() + "." + name
}

fn is_dns1123_label(value: &str) -> bool {
    let bytes = value.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) if first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric() => {
            bytes.iter().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        },
        _ => false,
    }
}

impl<R> From<&R> for ResourceKey
where
    R: Resource,
{
    fn from(value: &R) -> Self {
        let namespace = value.meta().namespace.clone().unwrap_or(DEFAULT_NAMESPACE_NAME.to_owned());
        Self { namespace, name: value.name_any() }
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::core::v1::Service;
    use kube_core::ObjectMeta;

    use super::{ResourceKey, ResourceKeyError};

    #[test]
    fn test_default_namespace() {
        let key = ResourceKey::new("vm-1");
        assert_eq!(key.namespace, "default");
        assert_eq!(key.to_string(), "default.vm-1");
        assert_eq!(key.validate(), Ok(()));
    }

    #[test]
    fn test_malformed_keys() {
        assert_eq!(ResourceKey::namespaced("", "default").validate(), Err(ResourceKeyError::EmptyName));
        assert_eq!(ResourceKey::namespaced("vm-1", "").validate(), Err(ResourceKeyError::EmptyNamespace));
        assert_eq!(ResourceKey::namespaced("VM_1", "default").validate(), Err(ResourceKeyError::InvalidName("VM_1".to_owned())));
        assert_eq!(ResourceKey::namespaced("-vm", "default").validate(), Err(ResourceKeyError::InvalidName("-vm".to_owned())));
        assert_eq!(ResourceKey::namespaced("vm..1", "default").validate(), Err(ResourceKeyError::InvalidName("vm..1".to_owned())));
        assert_eq!(ResourceKey::namespaced("vm-1", "a.b").validate(), Err(ResourceKeyError::InvalidNamespace("a.b".to_owned())));
        let long_namespace = "n".repeat(64);
        assert_eq!(ResourceKey::namespaced("vm-1", &long_namespace).validate(), Err(ResourceKeyError::InvalidNamespace(long_namespace)));
    }

    #[test]
    fn test_dotted_names_are_valid() {
        assert_eq!(ResourceKey::namespaced("vm-1.example", "tenant-a").validate(), Ok(()));
    }

    #[test]
    fn test_from_resource() {
        let service = Service {
            metadata: ObjectMeta { name: Some("floating-ip".to_owned()), namespace: Some("tenant-a".to_owned()), ..Default::default() },
            ..Default::default()
        };
        assert_eq!(ResourceKey::from(&service), ResourceKey::namespaced("floating-ip", "tenant-a"));

        let service = Service { metadata: ObjectMeta { name: Some("floating-ip".to_owned()), ..Default::default() }, ..Default::default() };
        assert_eq!(ResourceKey::from(&service), ResourceKey::new("floating-ip"));
    }
}
