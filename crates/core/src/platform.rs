// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Social platforms a simulation can run on

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown platform {0:?} (expected twitter, reddit, or parallel)")]
pub struct UnknownPlatform(pub String);

/// A single simulated platform. Every action-log line belongs to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Reddit,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Reddit => "reddit",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "twitter" => Ok(Platform::Twitter),
            "reddit" => Ok(Platform::Reddit),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

/// Which platforms a launched worker drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformMode {
    Twitter,
    Reddit,
    /// Both platforms in one worker process.
    Parallel,
}

impl PlatformMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformMode::Twitter => "twitter",
            PlatformMode::Reddit => "reddit",
            PlatformMode::Parallel => "parallel",
        }
    }

    /// Platforms this mode runs, in a stable order.
    pub fn platforms(&self) -> &'static [Platform] {
        match self {
            PlatformMode::Twitter => &[Platform::Twitter],
            PlatformMode::Reddit => &[Platform::Reddit],
            PlatformMode::Parallel => &[Platform::Twitter, Platform::Reddit],
        }
    }

    pub fn includes(&self, platform: Platform) -> bool {
        self.platforms().contains(&platform)
    }

    /// The only platform this mode runs, `None` for parallel.
    pub fn sole(&self) -> Option<Platform> {
        match self.platforms() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

impl fmt::Display for PlatformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformMode {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "twitter" => Ok(PlatformMode::Twitter),
            "reddit" => Ok(PlatformMode::Reddit),
            "parallel" => Ok(PlatformMode::Parallel),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

impl From<Platform> for PlatformMode {
    fn from(platform: Platform) -> Self {
        match platform {
            Platform::Twitter => PlatformMode::Twitter,
            Platform::Reddit => PlatformMode::Reddit,
        }
    }
}

#[cfg(test)]
#[path = "platform_tests.rs"]
mod tests;
