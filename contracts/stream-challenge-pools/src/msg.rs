use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Timestamp;
use stream_challenge_common::{PoolStatus, PoolSubmission, WinnerCounts};

use crate::error::ErrorKind;
use crate::state::{Config, Participant, Pool, Prize};

#[cw_serde]
pub struct InstantiateMsg {
    /// Address of the scheduler that runs expiry scans
    pub scanner: String,
    pub max_scan_batch: Option<u32>,
    pub default_auto_publish: Option<bool>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Create a pool. The sender becomes its creator.
    CreatePool { pool: PoolSubmission },
    /// Join an active pool as the sender.
    JoinPool { pool_id: u64, display_name: String },
    /// Draw winners now. Creator only. The seed comes from chain context alone.
    DrawWinners { pool_id: u64 },
    /// Cancel an active pool. Creator only.
    CancelPool { pool_id: u64 },
    /// Draw every active pool whose end time has passed. Scanner only.
    ScanAndDrawExpired { limit: Option<u32> },
    /// Update configuration. Admin only.
    UpdateConfig {
        scanner: Option<String>,
        max_scan_batch: Option<u32>,
        default_auto_publish: Option<bool>,
    },
}

/// Grouped parameters for `update_config`.
pub struct UpdateConfigParams {
    pub scanner: Option<String>,
    pub max_scan_batch: Option<u32>,
    pub default_auto_publish: Option<bool>,
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Config)]
    Config {},
    #[returns(Pool)]
    Pool { pool_id: u64 },
    #[returns(PoolsResponse)]
    Pools {
        status: Option<PoolStatus>,
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(ParticipantsResponse)]
    Participants {
        pool_id: u64,
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(ParticipantCountResponse)]
    ParticipantCount { pool_id: u64 },
    #[returns(Vec<Prize>)]
    Prizes { pool_id: u64 },
    /// Pool status plus winners. Winners stay hidden from everyone but the
    /// creator unless the pool auto-publishes.
    ///
    /// `requester` is caller-declared; queries carry no authenticated sender,
    /// so hiding is a display default, not access control.
    #[returns(DrawResultResponse)]
    DrawResult {
        pool_id: u64,
        requester: Option<String>,
    },
    #[returns(UserPoolsResponse)]
    UserPools {
        address: String,
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    /// Pools the next expiry scan would pick up at the current block time.
    #[returns(ExpiredPoolsResponse)]
    ExpiredPools { limit: Option<u32> },
}

#[cw_serde]
pub struct CreatePoolResponse {
    pub pool_id: u64,
}

#[cw_serde]
pub struct JoinResponse {
    pub pool_id: u64,
    pub participant_id: u64,
    pub participant_count: u32,
}

#[cw_serde]
pub struct WinnerView {
    pub winner_id: u64,
    pub position: u32,
    pub participant_id: u64,
    pub user: String,
    pub display_name: String,
    pub is_backup: bool,
    pub verified: bool,
}

/// A winner row that could not be written during an otherwise completed draw.
#[cw_serde]
pub struct WinnerInsertFailure {
    pub participant_id: u64,
    pub is_backup: bool,
    pub position: u32,
    pub kind: ErrorKind,
    pub reason: String,
}

#[cw_serde]
pub struct DrawResponse {
    pub pool_id: u64,
    pub completed_at: Timestamp,
    pub primary: Vec<WinnerView>,
    pub backup: Vec<WinnerView>,
    pub requested: WinnerCounts,
    /// Set when there were fewer participants than requested winners
    pub adjusted: Option<WinnerCounts>,
    /// Hex of the seed the selection was drawn from
    pub seed: String,
    pub failed_inserts: Vec<WinnerInsertFailure>,
}

#[cw_serde]
pub enum ScanResult {
    Drawn {
        primary: u32,
        backup: u32,
        failed_inserts: u32,
    },
    /// Expired with nobody in it; completed without winners
    ClosedEmpty {},
    Failed {
        kind: ErrorKind,
        reason: String,
    },
}

#[cw_serde]
pub struct PoolScanOutcome {
    pub pool_id: u64,
    pub result: ScanResult,
}

#[cw_serde]
pub struct ScanReport {
    pub scanned: u32,
    pub drawn: u32,
    pub closed_empty: u32,
    pub failed: u32,
    pub outcomes: Vec<PoolScanOutcome>,
}

#[cw_serde]
pub struct DrawResultResponse {
    pub pool_id: u64,
    pub status: PoolStatus,
    pub completed_at: Option<Timestamp>,
    pub winners_hidden: bool,
    pub primary: Vec<WinnerView>,
    pub backup: Vec<WinnerView>,
}

#[cw_serde]
pub struct PoolsResponse {
    pub pools: Vec<Pool>,
}

#[cw_serde]
pub struct ParticipantsResponse {
    pub participants: Vec<Participant>,
}

#[cw_serde]
pub struct ParticipantCountResponse {
    pub pool_id: u64,
    pub count: u32,
    pub max_participants: Option<u32>,
}

#[cw_serde]
pub struct UserPoolsResponse {
    pub address: String,
    pub pool_ids: Vec<u64>,
}

#[cw_serde]
pub struct ExpiredPoolsResponse {
    pub pool_ids: Vec<u64>,
}
