use cosmwasm_std::{Env, Timestamp};
use sha2::{Digest, Sha256};
use stream_challenge_common::{select_winners, HashRng, PoolStatus};

use crate::error::ContractError;
use crate::gate::{check_draw, plan_counts, Requester};
use crate::msg::{DrawResponse, WinnerInsertFailure, WinnerView};
use crate::repository::{NewWinner, PoolRepository, StatusUpdate};
use crate::state::Participant;

const SEED_DOMAIN: &[u8] = b"stream_challenge_draw";

/// Seed for one pool's draw in the current block.
///
/// `seed = sha256(domain || pool_id_be || height_be || time_nanos_be ||
///                tx_index_be || contract_addr)`
///
/// Only chain context goes in; nothing the requester sends can shift it.
pub fn draw_seed(env: &Env, pool_id: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(SEED_DOMAIN);
    hasher.update(pool_id.to_be_bytes());
    hasher.update(env.block.height.to_be_bytes());
    hasher.update(env.block.time.nanos().to_be_bytes());
    if let Some(tx) = &env.transaction {
        hasher.update(tx.index.to_be_bytes());
    }
    hasher.update(env.contract.address.as_str().as_bytes());
    hasher.finalize().into()
}

/// Move an active pool to `completed` and materialise its winners.
///
/// The status change is a compare-and-swap on `active`; of two racing draws
/// only one gets a row back, the other fails with `AlreadyCompleted` before
/// writing any winner. Winner rows are written after the transition, so a
/// failed row is reported in `failed_inserts` instead of undoing the draw.
pub fn draw_winners<R>(
    repo: &mut R,
    pool_id: u64,
    requester: Requester,
    now: Timestamp,
    seed: [u8; 32],
) -> Result<DrawResponse, ContractError>
where
    R: PoolRepository + ?Sized,
{
    let eligibility = check_draw(&*repo, pool_id, requester)?;

    let participants = repo.list_participants(pool_id)?;
    if participants.is_empty() {
        return Err(ContractError::NoParticipants { pool_id });
    }

    let plan = plan_counts(eligibility.pool.requested_counts(), participants.len());
    let selection = select_winners(&participants, plan.actual, &mut HashRng::new(seed));

    let rows = repo.update_pool_status(StatusUpdate {
        pool_id,
        expected: PoolStatus::Active,
        new_status: PoolStatus::Completed,
        completed_at: Some(now),
        actual_counts: plan.is_adjusted().then_some(plan.actual),
    })?;
    if rows == 0 {
        return Err(ContractError::AlreadyCompleted { pool_id });
    }

    let picks: Vec<(&Participant, bool, u32)> = tier(&selection.primary, false)
        .chain(tier(&selection.backup, true))
        .collect();
    let new_rows = picks
        .iter()
        .map(|(participant, is_backup, position)| NewWinner {
            pool_id,
            participant_id: participant.id,
            is_backup: *is_backup,
            position: *position,
        })
        .collect();
    let results = repo.insert_winners(new_rows);

    let mut primary = vec![];
    let mut backup = vec![];
    let mut failed_inserts = vec![];
    for ((participant, is_backup, position), result) in picks.into_iter().zip(results) {
        match result {
            Ok(winner) => {
                let view = WinnerView {
                    winner_id: winner.id,
                    position: winner.position,
                    participant_id: participant.id,
                    user: participant.user.to_string(),
                    display_name: participant.display_name.clone(),
                    is_backup: winner.is_backup,
                    verified: winner.verified,
                };
                if is_backup {
                    backup.push(view);
                } else {
                    primary.push(view);
                }
            }
            Err(err) => failed_inserts.push(WinnerInsertFailure {
                participant_id: participant.id,
                is_backup,
                position,
                kind: err.kind(),
                reason: err.to_string(),
            }),
        }
    }

    Ok(DrawResponse {
        pool_id,
        completed_at: now,
        primary,
        backup,
        requested: plan.requested,
        adjusted: plan.is_adjusted().then_some(plan.actual),
        seed: hex::encode(seed),
        failed_inserts,
    })
}

/// Close an expired pool nobody joined. Completed with no winners.
pub fn close_empty<R>(repo: &mut R, pool_id: u64, now: Timestamp) -> Result<(), ContractError>
where
    R: PoolRepository + ?Sized,
{
    let rows = repo.update_pool_status(StatusUpdate {
        pool_id,
        expected: PoolStatus::Active,
        new_status: PoolStatus::Completed,
        completed_at: Some(now),
        actual_counts: None,
    })?;
    if rows == 0 {
        return Err(ContractError::AlreadyCompleted { pool_id });
    }
    Ok(())
}

/// Rank a tier from 1.
fn tier(
    participants: &[Participant],
    is_backup: bool,
) -> impl Iterator<Item = (&Participant, bool, u32)> {
    participants
        .iter()
        .zip(1u32..)
        .map(move |(participant, position)| (participant, is_backup, position))
}
