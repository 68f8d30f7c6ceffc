use cosmwasm_std::{Addr, Timestamp};
use stream_challenge_common::{actual_counts, PoolStatus, WinnerCounts};

use crate::error::ContractError;
use crate::repository::PoolRepository;
use crate::state::Pool;

/// Who is asking for a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requester<'a> {
    /// A user; must be the pool creator.
    User(&'a Addr),
    /// The trusted expiry scanner; no identity check.
    Scanner,
}

/// A pool that passed the draw preconditions.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawEligibility {
    pub pool: Pool,
    pub participant_count: u32,
}

/// Requested versus drawable winner counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountPlan {
    pub requested: WinnerCounts,
    pub actual: WinnerCounts,
}

impl CountPlan {
    /// The draw proceeds with fewer winners than requested.
    pub fn is_adjusted(&self) -> bool {
        self.requested != self.actual
    }
}

/// Draw preconditions, reported in order: pool exists, requester is the
/// creator (unless scanner), pool is active, at least one participant.
pub fn check_draw<R>(
    repo: &R,
    pool_id: u64,
    requester: Requester,
) -> Result<DrawEligibility, ContractError>
where
    R: PoolRepository + ?Sized,
{
    let pool = repo
        .get_pool(pool_id)?
        .ok_or(ContractError::PoolNotFound { pool_id })?;

    if let Requester::User(user) = requester {
        if *user != pool.creator {
            return Err(ContractError::Unauthorized {
                reason: "only the pool creator can draw winners".to_string(),
            });
        }
    }

    if pool.status != PoolStatus::Active {
        return Err(ContractError::PoolNotActive {
            pool_id,
            status: pool.status,
        });
    }

    let participant_count = repo.count_participants(pool_id)?;
    if participant_count == 0 {
        return Err(ContractError::NoParticipants { pool_id });
    }

    Ok(DrawEligibility {
        pool,
        participant_count,
    })
}

/// Undersubscribed pools are drawn with reduced counts rather than rejected.
pub fn plan_counts(requested: WinnerCounts, participants: usize) -> CountPlan {
    CountPlan {
        requested,
        actual: actual_counts(participants, requested),
    }
}

/// Join preconditions, reported in order: pool exists, requester is not the
/// creator, pool is active and still open, requester has not joined yet,
/// pool has room.
///
/// The capacity check here is a read-ahead; the repository enforces the cap
/// again when the participant row is written.
pub fn check_join<R>(
    repo: &R,
    pool_id: u64,
    user: &Addr,
    now: Timestamp,
) -> Result<Pool, ContractError>
where
    R: PoolRepository + ?Sized,
{
    let pool = repo
        .get_pool(pool_id)?
        .ok_or(ContractError::PoolNotFound { pool_id })?;

    if *user == pool.creator {
        return Err(ContractError::CreatorCannotJoin { pool_id });
    }

    if pool.status != PoolStatus::Active {
        return Err(ContractError::PoolNotActive {
            pool_id,
            status: pool.status,
        });
    }

    if now >= pool.end_time {
        return Err(ContractError::PoolClosed {
            pool_id,
            end_time: pool.end_time.seconds(),
        });
    }

    if repo.get_participant(pool_id, user)?.is_some() {
        return Err(ContractError::AlreadyJoined { pool_id });
    }

    if let Some(max) = pool.max_participants {
        if repo.count_participants(pool_id)? >= max {
            return Err(ContractError::PoolFull { pool_id, max });
        }
    }

    Ok(pool)
}
