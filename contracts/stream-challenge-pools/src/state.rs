use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp};
use cw_storage_plus::{Item, Map};
use stream_challenge_common::{PoolStatus, PrizeKind, WinnerCounts};

pub const CONFIG: Item<Config> = Item::new("config");
pub const COUNTERS: Item<Counters> = Item::new("counters");
pub const POOLS: Map<u64, Pool> = Map::new("pools");
pub const PRIZES: Map<u64, Vec<Prize>> = Map::new("prizes");

/// Active pools keyed by (end_time nanos, pool_id). Rows are removed when a
/// pool leaves `Active`, so a range up to "now" is exactly the expiry scan input.
pub const ACTIVE_BY_END: Map<(u64, u64), ()> = Map::new("active_by_end");

/// (status, pool_id), kept in step with `Pool::status` for filtered listing
pub const POOLS_BY_STATUS: Map<(&str, u64), ()> = Map::new("pools_by_status");

/// (pool_id, participant_id) -> participant, iterates in join order
pub const PARTICIPANTS: Map<(u64, u64), Participant> = Map::new("participants");
pub const PARTICIPANT_BY_USER: Map<(u64, &Addr), u64> = Map::new("participant_by_user");
pub const PARTICIPANT_COUNT: Map<u64, u32> = Map::new("participant_count");

/// (pool_id, winner_id) -> winner
pub const WINNERS: Map<(u64, u64), Winner> = Map::new("winners");
/// (pool_id, participant_id) -> winner_id, one winning slot per participant
pub const WINNER_BY_PARTICIPANT: Map<(u64, u64), u64> = Map::new("winner_by_participant");

/// Pools a user has joined.
pub const USER_POOLS: Map<(&Addr, u64), ()> = Map::new("user_pools");

/// Upper bound on pools handled by a single expiry scan.
pub const MAX_SCAN_BATCH_LIMIT: u32 = 100;
pub const DEFAULT_SCAN_BATCH: u32 = 25;

#[cw_serde]
pub struct Config {
    pub admin: Addr,
    /// Trusted scheduler allowed to run expiry scans
    pub scanner: Addr,
    pub max_scan_batch: u32,
    /// Used when a pool is created without an explicit auto-publish choice
    pub default_auto_publish: bool,
}

#[cw_serde]
#[derive(Default)]
pub struct Counters {
    pub next_pool_id: u64,
    pub next_participant_id: u64,
    pub next_winner_id: u64,
    pub total_pools_created: u64,
    pub total_draws_completed: u64,
}

#[cw_serde]
pub struct Pool {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub creator: Addr,
    pub status: PoolStatus,
    pub end_time: Timestamp,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    /// `None` means unlimited
    pub max_participants: Option<u32>,
    pub subscribers_only: bool,
    /// Requested primary winners; rewritten to the drawn count when a draw adjusts it
    pub num_winners: u32,
    /// Requested backup winners; rewritten to the drawn count when a draw adjusts it
    pub num_backup_winners: u32,
    pub notify_winners: bool,
    pub auto_publish: bool,
    pub require_verification: bool,
}

impl Pool {
    pub fn requested_counts(&self) -> WinnerCounts {
        WinnerCounts::new(self.num_winners, self.num_backup_winners)
    }
}

#[cw_serde]
pub struct Prize {
    pub position: u32,
    pub kind: PrizeKind,
    pub content: String,
}

#[cw_serde]
pub struct Participant {
    pub id: u64,
    pub pool_id: u64,
    pub user: Addr,
    pub display_name: String,
    pub joined_at: Timestamp,
}

#[cw_serde]
pub struct Winner {
    pub id: u64,
    pub pool_id: u64,
    pub participant_id: u64,
    /// 1-based rank within its tier
    pub position: u32,
    pub is_backup: bool,
    pub verified: bool,
}
