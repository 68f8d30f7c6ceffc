use cosmwasm_schema::cw_serde;
use cosmwasm_std::StdError;
use stream_challenge_common::{PoolStatus, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("pool {pool_id} not found")]
    PoolNotFound { pool_id: u64 },

    #[error("participant {participant_id} not found in pool {pool_id}")]
    ParticipantNotFound { pool_id: u64, participant_id: u64 },

    #[error("creator cannot join their own pool {pool_id}")]
    CreatorCannotJoin { pool_id: u64 },

    #[error("pool {pool_id} is {status}, expected active")]
    PoolNotActive { pool_id: u64, status: PoolStatus },

    #[error("pool {pool_id} stopped accepting participants at {end_time}")]
    PoolClosed { pool_id: u64, end_time: u64 },

    #[error("pool {pool_id} was already completed by another draw")]
    AlreadyCompleted { pool_id: u64 },

    #[error("pool {pool_id} has no participants")]
    NoParticipants { pool_id: u64 },

    #[error("pool {pool_id} is full ({max} participants)")]
    PoolFull { pool_id: u64, max: u32 },

    #[error("already joined pool {pool_id}")]
    AlreadyJoined { pool_id: u64 },

    #[error("participant {participant_id} already holds a winning slot in pool {pool_id}")]
    DuplicateWinner { pool_id: u64, participant_id: u64 },

    #[error("invalid display name: {reason}")]
    InvalidDisplayName { reason: String },

    #[error("scan batch {value} must be between 1 and {max}")]
    InvalidScanBatch { value: u32, max: u32 },
}

/// Coarse failure category surfaced to callers that render messages.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    InvalidState,
    CapacityExceeded,
    DuplicateParticipant,
    PersistenceFailure,
    InvalidInput,
}

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::Std(_) | ContractError::DuplicateWinner { .. } => {
                ErrorKind::PersistenceFailure
            }
            ContractError::Validation(_)
            | ContractError::InvalidDisplayName { .. }
            | ContractError::InvalidScanBatch { .. } => ErrorKind::InvalidInput,
            ContractError::Unauthorized { .. } | ContractError::CreatorCannotJoin { .. } => {
                ErrorKind::Unauthorized
            }
            ContractError::PoolNotFound { .. } | ContractError::ParticipantNotFound { .. } => {
                ErrorKind::NotFound
            }
            ContractError::PoolNotActive { .. }
            | ContractError::PoolClosed { .. }
            | ContractError::AlreadyCompleted { .. }
            | ContractError::NoParticipants { .. } => ErrorKind::InvalidState,
            ContractError::PoolFull { .. } => ErrorKind::CapacityExceeded,
            ContractError::AlreadyJoined { .. } => ErrorKind::DuplicateParticipant,
        }
    }
}
