// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workload lifecycle status.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle status of a workload, as tracked by the manager's store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Init,
    Distributing,
    Running,
    Down,
    Err,
}

crate::simple_display! {
    Status {
        Init => "initializing",
        Distributing => "distributing",
        Running => "running",
        Down => "down",
        Err => "error",
    }
}

/// Returned when a string does not match one of the canonical status forms.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid state")]
pub struct StatusParseError;

impl FromStr for Status {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initializing" => Ok(Status::Init),
            "distributing" => Ok(Status::Distributing),
            "running" => Ok(Status::Running),
            "down" => Ok(Status::Down),
            "error" => Ok(Status::Err),
            _ => Err(StatusParseError),
        }
    }
}

impl Serialize for Status {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StatusVisitor;

        impl Visitor<'_> for StatusVisitor {
            type Value = Status;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("one of initializing, distributing, running, down, error")
            }

            fn visit_str<E>(self, v: &str) -> Result<Status, E>
            where
                E: de::Error,
            {
                v.parse().map_err(|_| E::custom("invalid state"))
            }
        }

        deserializer.deserialize_str(StatusVisitor)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
