use cosmwasm_std::{Addr, Order, StdResult, Storage, Timestamp};
use cw_storage_plus::Bound;
use stream_challenge_common::{PoolStatus, WinnerCounts};

use crate::error::ContractError;
use crate::state::{
    Counters, Participant, Pool, Prize, Winner, ACTIVE_BY_END, COUNTERS, PARTICIPANTS,
    PARTICIPANT_BY_USER, PARTICIPANT_COUNT, POOLS, POOLS_BY_STATUS, PRIZES, USER_POOLS, WINNERS,
    WINNER_BY_PARTICIPANT,
};

#[derive(Clone, Debug, PartialEq)]
pub struct NewParticipant {
    pub pool_id: u64,
    pub user: Addr,
    pub display_name: String,
    pub joined_at: Timestamp,
    /// Row-count limit enforced at insert time, independent of any pre-check
    pub cap: Option<u32>,
}

/// Conditional status transition: applied only if the stored status still
/// equals `expected`.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusUpdate {
    pub pool_id: u64,
    pub expected: PoolStatus,
    pub new_status: PoolStatus,
    pub completed_at: Option<Timestamp>,
    pub actual_counts: Option<WinnerCounts>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewWinner {
    pub pool_id: u64,
    pub participant_id: u64,
    pub is_backup: bool,
    pub position: u32,
}

/// Persistence operations needed by the gate, the draw and the expiry scan.
pub trait PoolRepository {
    fn get_pool(&self, pool_id: u64) -> Result<Option<Pool>, ContractError>;

    /// Participants of a pool in join order.
    fn list_participants(&self, pool_id: u64) -> Result<Vec<Participant>, ContractError>;

    fn count_participants(&self, pool_id: u64) -> Result<u32, ContractError>;

    fn get_participant(
        &self,
        pool_id: u64,
        user: &Addr,
    ) -> Result<Option<Participant>, ContractError>;

    /// Fails with `AlreadyJoined` on a duplicate (pool, user) pair and with
    /// `PoolFull` when `cap` is already reached.
    fn insert_participant(&mut self, new: NewParticipant) -> Result<Participant, ContractError>;

    /// Returns the number of rows changed: 1 when the transition applied,
    /// 0 when the pool is missing or no longer in `expected`.
    fn update_pool_status(&mut self, update: StatusUpdate) -> Result<u32, ContractError>;

    fn insert_winner(&mut self, new: NewWinner) -> Result<Winner, ContractError>;

    /// One result per row, in input order. A failed row does not stop the rest.
    fn insert_winners(&mut self, rows: Vec<NewWinner>) -> Vec<Result<Winner, ContractError>> {
        rows.into_iter().map(|row| self.insert_winner(row)).collect()
    }

    /// Ids of active pools whose end time is strictly before `now`,
    /// earliest deadline first.
    fn list_expired_active_pools(
        &self,
        now: Timestamp,
        limit: usize,
    ) -> Result<Vec<u64>, ContractError>;
}

/// `PoolRepository` over contract storage.
pub struct StorageRepository<'a> {
    storage: &'a mut dyn Storage,
}

impl<'a> StorageRepository<'a> {
    pub fn new(storage: &'a mut dyn Storage) -> Self {
        Self { storage }
    }

    /// Store a new active pool with its prizes and register it for expiry.
    pub fn insert_pool(&mut self, pool: &Pool, prizes: &[Prize]) -> Result<(), ContractError> {
        POOLS.save(self.storage, pool.id, pool)?;
        PRIZES.save(self.storage, pool.id, &prizes.to_vec())?;
        PARTICIPANT_COUNT.save(self.storage, pool.id, &0)?;
        POOLS_BY_STATUS.save(self.storage, (pool.status.as_str(), pool.id), &())?;
        if pool.status == PoolStatus::Active {
            ACTIVE_BY_END.save(self.storage, (pool.end_time.nanos(), pool.id), &())?;
        }
        Ok(())
    }

    pub fn next_pool_id(&mut self) -> Result<u64, ContractError> {
        let mut counters = load_counters(&*self.storage)?;
        counters.next_pool_id += 1;
        counters.total_pools_created += 1;
        COUNTERS.save(self.storage, &counters)?;
        Ok(counters.next_pool_id)
    }

    pub fn record_draws_completed(&mut self, count: u64) -> Result<(), ContractError> {
        let mut counters = load_counters(&*self.storage)?;
        counters.total_draws_completed += count;
        COUNTERS.save(self.storage, &counters)?;
        Ok(())
    }
}

impl PoolRepository for StorageRepository<'_> {
    fn get_pool(&self, pool_id: u64) -> Result<Option<Pool>, ContractError> {
        Ok(POOLS.may_load(&*self.storage, pool_id)?)
    }

    fn list_participants(&self, pool_id: u64) -> Result<Vec<Participant>, ContractError> {
        let participants = PARTICIPANTS
            .prefix(pool_id)
            .range(&*self.storage, None, None, Order::Ascending)
            .map(|item| item.map(|(_, participant)| participant))
            .collect::<StdResult<Vec<_>>>()?;
        Ok(participants)
    }

    fn count_participants(&self, pool_id: u64) -> Result<u32, ContractError> {
        Ok(participant_count(&*self.storage, pool_id)?)
    }

    fn get_participant(
        &self,
        pool_id: u64,
        user: &Addr,
    ) -> Result<Option<Participant>, ContractError> {
        let Some(participant_id) = PARTICIPANT_BY_USER.may_load(&*self.storage, (pool_id, user))?
        else {
            return Ok(None);
        };
        Ok(PARTICIPANTS.may_load(&*self.storage, (pool_id, participant_id))?)
    }

    fn insert_participant(&mut self, new: NewParticipant) -> Result<Participant, ContractError> {
        if PARTICIPANT_BY_USER.has(&*self.storage, (new.pool_id, &new.user)) {
            return Err(ContractError::AlreadyJoined {
                pool_id: new.pool_id,
            });
        }

        let count = participant_count(&*self.storage, new.pool_id)?;
        if let Some(max) = new.cap {
            if count >= max {
                return Err(ContractError::PoolFull {
                    pool_id: new.pool_id,
                    max,
                });
            }
        }

        let mut counters = load_counters(&*self.storage)?;
        counters.next_participant_id += 1;
        let participant = Participant {
            id: counters.next_participant_id,
            pool_id: new.pool_id,
            user: new.user,
            display_name: new.display_name,
            joined_at: new.joined_at,
        };

        PARTICIPANTS.save(self.storage, (new.pool_id, participant.id), &participant)?;
        PARTICIPANT_BY_USER.save(
            self.storage,
            (new.pool_id, &participant.user),
            &participant.id,
        )?;
        PARTICIPANT_COUNT.save(self.storage, new.pool_id, &(count + 1))?;
        USER_POOLS.save(self.storage, (&participant.user, new.pool_id), &())?;
        COUNTERS.save(self.storage, &counters)?;

        Ok(participant)
    }

    fn update_pool_status(&mut self, update: StatusUpdate) -> Result<u32, ContractError> {
        let Some(mut pool) = POOLS.may_load(&*self.storage, update.pool_id)? else {
            return Ok(0);
        };
        if pool.status != update.expected {
            return Ok(0);
        }

        let was_active = pool.status == PoolStatus::Active;
        POOLS_BY_STATUS.remove(self.storage, (pool.status.as_str(), pool.id));
        pool.status = update.new_status;
        if let Some(completed_at) = update.completed_at {
            pool.completed_at = Some(completed_at);
        }
        if let Some(counts) = update.actual_counts {
            pool.num_winners = counts.primary;
            pool.num_backup_winners = counts.backup;
        }
        POOLS.save(self.storage, pool.id, &pool)?;
        POOLS_BY_STATUS.save(self.storage, (pool.status.as_str(), pool.id), &())?;

        if was_active && pool.status != PoolStatus::Active {
            ACTIVE_BY_END.remove(self.storage, (pool.end_time.nanos(), pool.id));
        }
        Ok(1)
    }

    fn insert_winner(&mut self, new: NewWinner) -> Result<Winner, ContractError> {
        if WINNER_BY_PARTICIPANT.has(&*self.storage, (new.pool_id, new.participant_id)) {
            return Err(ContractError::DuplicateWinner {
                pool_id: new.pool_id,
                participant_id: new.participant_id,
            });
        }
        if !PARTICIPANTS.has(&*self.storage, (new.pool_id, new.participant_id)) {
            return Err(ContractError::ParticipantNotFound {
                pool_id: new.pool_id,
                participant_id: new.participant_id,
            });
        }

        let mut counters = load_counters(&*self.storage)?;
        counters.next_winner_id += 1;
        let winner = Winner {
            id: counters.next_winner_id,
            pool_id: new.pool_id,
            participant_id: new.participant_id,
            position: new.position,
            is_backup: new.is_backup,
            verified: false,
        };

        WINNERS.save(self.storage, (new.pool_id, winner.id), &winner)?;
        WINNER_BY_PARTICIPANT.save(self.storage, (new.pool_id, new.participant_id), &winner.id)?;
        COUNTERS.save(self.storage, &counters)?;

        Ok(winner)
    }

    fn list_expired_active_pools(
        &self,
        now: Timestamp,
        limit: usize,
    ) -> Result<Vec<u64>, ContractError> {
        Ok(expired_active_pool_ids(&*self.storage, now, limit)?)
    }
}

pub fn load_counters(storage: &dyn Storage) -> StdResult<Counters> {
    Ok(COUNTERS.may_load(storage)?.unwrap_or_default())
}

pub fn participant_count(storage: &dyn Storage, pool_id: u64) -> StdResult<u32> {
    Ok(PARTICIPANT_COUNT.may_load(storage, pool_id)?.unwrap_or(0))
}

pub fn expired_active_pool_ids(
    storage: &dyn Storage,
    now: Timestamp,
    limit: usize,
) -> StdResult<Vec<u64>> {
    let end = Bound::exclusive((now.nanos(), 0u64));
    ACTIVE_BY_END
        .keys(storage, None, Some(end), Order::Ascending)
        .take(limit)
        .map(|key| key.map(|(_, pool_id)| pool_id))
        .collect()
}

/// Winners of a pool ordered primary tier first, then by position.
pub fn pool_winners(storage: &dyn Storage, pool_id: u64) -> StdResult<Vec<Winner>> {
    let mut winners = WINNERS
        .prefix(pool_id)
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, winner)| winner))
        .collect::<StdResult<Vec<_>>>()?;
    winners.sort_by_key(|w| (w.is_backup, w.position));
    Ok(winners)
}
