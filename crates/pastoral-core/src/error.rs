//! Error types for configuration, seeding, storage and hiring.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::components::{Job, ResourceKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse simulation config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read simulation config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid simulation config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to parse world seed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read world seed from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("human {name:?} refers to town hall #{index}, which the seed does not define")]
    UnknownEmployer { name: String, index: usize },
    #[error("could not employ {name:?}: {source}")]
    Hire {
        name: String,
        #[source]
        source: HireError,
    },
}

/// Refusal from a storage building's `deposit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DepositError {
    #[error("building is full")]
    BuildingFull,
    #[error("building does not accept {0:?}")]
    WrongResource(ResourceKind),
    #[error("not a storage building")]
    NotStorage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HireError {
    #[error("no open {job:?} slot at this town hall")]
    NoSlot { job: Job },
    #[error("already employed")]
    AlreadyEmployed,
    #[error("entity is not a human")]
    NotAHuman,
    #[error("entity is not a town hall")]
    NotATownHall,
}
