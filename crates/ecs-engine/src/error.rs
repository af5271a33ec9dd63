//! Engine error type.

use thiserror::Error;

use crate::api::types::{ComponentId, EntityId, PoolId};

/// Errors produced by scene, pool and tile-map operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// `Scene::render` was called before a camera was assigned.
    #[error("scene has no camera assigned; nothing was rendered")]
    MissingCamera,

    /// A collection setter received the wrong number of items.
    #[error("invalid argument: expected {expected} items, got {actual}")]
    InvalidArgument { expected: usize, actual: usize },

    #[error("unknown entity: {0}")]
    UnknownEntity(EntityId),

    #[error("unknown component: {0}")]
    UnknownComponent(ComponentId),

    #[error("unknown pool: {0:?}")]
    UnknownPool(PoolId),

    /// The entity belongs to the pool but is already sitting in its free list.
    #[error("{0} was already released to its pool")]
    AlreadyReleased(EntityId),

    #[error("{0} was not handed out by this pool")]
    NotPooled(EntityId),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
