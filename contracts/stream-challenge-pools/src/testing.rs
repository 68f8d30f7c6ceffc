//! Fixtures and repository wrappers shared by unit tests.

use std::collections::HashSet;

use cosmwasm_std::testing::MockApi;
use cosmwasm_std::{Addr, StdError, Timestamp};
use stream_challenge_common::PoolStatus;

use crate::error::ContractError;
use crate::repository::{NewParticipant, NewWinner, PoolRepository, StatusUpdate};
use crate::state::{Participant, Pool, Winner};

pub fn addr(name: &str) -> Addr {
    MockApi::default().addr_make(name)
}

pub fn seed(tag: u8) -> [u8; 32] {
    [tag; 32]
}

/// Active pool drawing one winner, open until `end_seconds`.
pub fn active_pool(id: u64, creator: &str, end_seconds: u64) -> Pool {
    Pool {
        id,
        title: format!("pool {}", id),
        description: String::new(),
        creator: addr(creator),
        status: PoolStatus::Active,
        end_time: Timestamp::from_seconds(end_seconds),
        created_at: Timestamp::from_seconds(0),
        completed_at: None,
        max_participants: None,
        subscribers_only: false,
        num_winners: 1,
        num_backup_winners: 0,
        notify_winners: false,
        auto_publish: true,
        require_verification: false,
    }
}

pub fn join<R: PoolRepository>(repo: &mut R, pool_id: u64, name: &str) -> Participant {
    repo.insert_participant(NewParticipant {
        pool_id,
        user: addr(name),
        display_name: name.to_string(),
        joined_at: Timestamp::from_seconds(1),
        cap: None,
    })
    .unwrap()
}

type Hook<R> = Box<dyn FnOnce(&mut R)>;

/// Wraps a repository to inject failures and interleavings.
pub struct FlakyRepository<R> {
    pub inner: R,
    /// `update_pool_status` fails for these pools
    pub fail_status_for: HashSet<u64>,
    /// `insert_winner` fails for these participant ids
    pub fail_winner_for: HashSet<u64>,
    /// `count_participants` reports this value instead of the stored one
    pub stale_count: Option<u32>,
    /// Runs against the inner repository right before the first status update
    pub before_status_update: Option<Hook<R>>,
}

impl<R: PoolRepository> FlakyRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            fail_status_for: HashSet::new(),
            fail_winner_for: HashSet::new(),
            stale_count: None,
            before_status_update: None,
        }
    }
}

impl<R: PoolRepository> PoolRepository for FlakyRepository<R> {
    fn get_pool(&self, pool_id: u64) -> Result<Option<Pool>, ContractError> {
        self.inner.get_pool(pool_id)
    }

    fn list_participants(&self, pool_id: u64) -> Result<Vec<Participant>, ContractError> {
        self.inner.list_participants(pool_id)
    }

    fn count_participants(&self, pool_id: u64) -> Result<u32, ContractError> {
        match self.stale_count {
            Some(count) => Ok(count),
            None => self.inner.count_participants(pool_id),
        }
    }

    fn get_participant(
        &self,
        pool_id: u64,
        user: &Addr,
    ) -> Result<Option<Participant>, ContractError> {
        self.inner.get_participant(pool_id, user)
    }

    fn insert_participant(&mut self, new: NewParticipant) -> Result<Participant, ContractError> {
        self.inner.insert_participant(new)
    }

    fn update_pool_status(&mut self, update: StatusUpdate) -> Result<u32, ContractError> {
        if let Some(hook) = self.before_status_update.take() {
            hook(&mut self.inner);
        }
        if self.fail_status_for.contains(&update.pool_id) {
            return Err(StdError::generic_err("storage unavailable").into());
        }
        self.inner.update_pool_status(update)
    }

    fn insert_winner(&mut self, new: NewWinner) -> Result<Winner, ContractError> {
        if self.fail_winner_for.contains(&new.participant_id) {
            return Err(StdError::generic_err("write rejected").into());
        }
        self.inner.insert_winner(new)
    }

    fn list_expired_active_pools(
        &self,
        now: Timestamp,
        limit: usize,
    ) -> Result<Vec<u64>, ContractError> {
        self.inner.list_expired_active_pools(now, limit)
    }
}
