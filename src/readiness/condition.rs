// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Outcome;

pub const CONDITION_TYPE_READY: &str = "Ready";
pub const CONDITION_REASON_READY: &str = "VirtualServerReady";
pub const CONDITION_REASON_STOPPED: &str = "VirtualServerStopped";
pub const CONDITION_STATUS_TRUE: &str = "True";
pub const CONDITION_STATUS_FALSE: &str = "False";

/// A `(type, reason, status)` triple as reported by the operator. Everything but the type and status is optional
/// because the operator fills conditions in gradually.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<Time>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

impl Condition {
    pub fn new(type_: &str, reason: &str, status: &str) -> Self {
        Self { type_: type_.to_owned(), status: status.to_owned(), reason: Some(reason.to_owned()), ..Default::default() }
    }

    fn matches(&self, type_: &str, reason: &str, status: &str) -> bool {
        self.type_ == type_ && self.reason.as_deref() == Some(reason) && self.status == status
    }
}

pub fn ready_condition(conditions: &[Condition]) -> Option<&Condition> {
    conditions.iter().find(|c| c.type_ == CONDITION_TYPE_READY)
}

/// Maps the observed conditions to a terminal outcome. `None` means the object is still converging and should be
/// polled again.
pub fn classify(conditions: &[Condition]) -> Option<Outcome> {
    let Some(condition) = ready_condition(conditions) else {
        return Some(Outcome::Unknown);
    };

    if condition.matches(CONDITION_TYPE_READY, CONDITION_REASON_READY, CONDITION_STATUS_TRUE) {
        Some(Outcome::Ready)
    } else if condition.matches(CONDITION_TYPE_READY, CONDITION_REASON_STOPPED, CONDITION_STATUS_FALSE) {
        Some(Outcome::Stopped)
    } else {
        None
    }
}
