use cosmwasm_std::{to_json_binary, Binary, Deps, Env, Order, StdResult, Storage};
use cw_storage_plus::Bound;
use stream_challenge_common::PoolStatus;

use crate::msg::{
    DrawResultResponse, ExpiredPoolsResponse, ParticipantCountResponse, ParticipantsResponse,
    PoolsResponse, UserPoolsResponse, WinnerView,
};
use crate::repository::{expired_active_pool_ids, participant_count, pool_winners};
use crate::state::{
    CONFIG, MAX_SCAN_BATCH_LIMIT, PARTICIPANTS, POOLS, POOLS_BY_STATUS, PRIZES, USER_POOLS,
};

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_pool(deps: Deps, pool_id: u64) -> StdResult<Binary> {
    let pool = POOLS.load(deps.storage, pool_id)?;
    to_json_binary(&pool)
}

pub fn query_pools(
    deps: Deps,
    status: Option<PoolStatus>,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let pools = match status {
        Some(status) => POOLS_BY_STATUS
            .prefix(status.as_str())
            .keys(deps.storage, start, None, Order::Ascending)
            .take(limit)
            .map(|pool_id| POOLS.load(deps.storage, pool_id?))
            .collect::<StdResult<Vec<_>>>()?,
        None => POOLS
            .range(deps.storage, start, None, Order::Ascending)
            .take(limit)
            .map(|item| item.map(|(_, pool)| pool))
            .collect::<StdResult<Vec<_>>>()?,
    };

    to_json_binary(&PoolsResponse { pools })
}

pub fn query_participants(
    deps: Deps,
    pool_id: u64,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let participants = PARTICIPANTS
        .prefix(pool_id)
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, participant)| participant))
        .collect::<StdResult<Vec<_>>>()?;

    to_json_binary(&ParticipantsResponse { participants })
}

pub fn query_participant_count(deps: Deps, pool_id: u64) -> StdResult<Binary> {
    let pool = POOLS.load(deps.storage, pool_id)?;
    to_json_binary(&ParticipantCountResponse {
        pool_id,
        count: participant_count(deps.storage, pool_id)?,
        max_participants: pool.max_participants,
    })
}

pub fn query_prizes(deps: Deps, pool_id: u64) -> StdResult<Binary> {
    let prizes = PRIZES.may_load(deps.storage, pool_id)?.unwrap_or_default();
    to_json_binary(&prizes)
}

pub fn query_draw_result(
    deps: Deps,
    pool_id: u64,
    requester: Option<String>,
) -> StdResult<Binary> {
    let pool = POOLS.load(deps.storage, pool_id)?;
    let requester = requester
        .map(|address| deps.api.addr_validate(&address))
        .transpose()?;

    let is_creator = requester.as_ref() == Some(&pool.creator);
    let completed = pool.status == PoolStatus::Completed;
    let visible = completed && (pool.auto_publish || is_creator);

    let (backup, primary): (Vec<WinnerView>, Vec<WinnerView>) = if visible {
        winner_views(deps.storage, pool_id)?
            .into_iter()
            .partition(|view| view.is_backup)
    } else {
        (vec![], vec![])
    };

    to_json_binary(&DrawResultResponse {
        pool_id,
        status: pool.status,
        completed_at: pool.completed_at,
        winners_hidden: completed && !visible,
        primary,
        backup,
    })
}

pub fn query_user_pools(
    deps: Deps,
    address: String,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let pool_ids = USER_POOLS
        .prefix(&addr)
        .keys(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .collect::<StdResult<Vec<_>>>()?;

    to_json_binary(&UserPoolsResponse { address, pool_ids })
}

pub fn query_expired_pools(deps: Deps, env: Env, limit: Option<u32>) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let limit = limit
        .unwrap_or(config.max_scan_batch)
        .min(MAX_SCAN_BATCH_LIMIT) as usize;
    let pool_ids = expired_active_pool_ids(deps.storage, env.block.time, limit)?;
    to_json_binary(&ExpiredPoolsResponse { pool_ids })
}

/// Winners joined with their participant rows, primary tier first.
fn winner_views(storage: &dyn Storage, pool_id: u64) -> StdResult<Vec<WinnerView>> {
    pool_winners(storage, pool_id)?
        .into_iter()
        .map(|winner| {
            let participant = PARTICIPANTS.load(storage, (pool_id, winner.participant_id))?;
            Ok(WinnerView {
                winner_id: winner.id,
                position: winner.position,
                participant_id: participant.id,
                user: participant.user.to_string(),
                display_name: participant.display_name,
                is_backup: winner.is_backup,
                verified: winner.verified,
            })
        })
        .collect()
}
