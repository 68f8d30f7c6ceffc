use cosmwasm_std::{to_json_binary, DepsMut, Env, Event, MessageInfo, Response};
use stream_challenge_common::{PoolStatus, PoolSubmission};

use crate::draw::{self, draw_seed};
use crate::error::ContractError;
use crate::gate::{check_join, Requester};
use crate::msg::{CreatePoolResponse, DrawResponse, JoinResponse, UpdateConfigParams};
use crate::repository::{NewParticipant, PoolRepository, StatusUpdate, StorageRepository};
use crate::scan;
use crate::state::{Pool, Prize, CONFIG, MAX_SCAN_BATCH_LIMIT};

pub const MAX_DISPLAY_NAME_LEN: usize = 50;

pub fn validate_scan_batch(value: u32) -> Result<u32, ContractError> {
    if value == 0 || value > MAX_SCAN_BATCH_LIMIT {
        return Err(ContractError::InvalidScanBatch {
            value,
            max: MAX_SCAN_BATCH_LIMIT,
        });
    }
    Ok(value)
}

/// Create a pool owned by the sender.
pub fn create_pool(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    submission: PoolSubmission,
) -> Result<Response, ContractError> {
    submission.validate(env.block.time)?;
    let config = CONFIG.load(deps.storage)?;

    let mut repo = StorageRepository::new(deps.storage);
    let pool_id = repo.next_pool_id()?;

    let pool = Pool {
        id: pool_id,
        title: submission.title.trim().to_string(),
        description: submission.description.trim().to_string(),
        creator: info.sender.clone(),
        status: PoolStatus::Active,
        end_time: submission.end_time,
        created_at: env.block.time,
        completed_at: None,
        max_participants: submission.max_participants,
        subscribers_only: submission.subscribers_only,
        num_winners: submission.num_winners,
        num_backup_winners: submission.num_backup_winners,
        notify_winners: submission.notify_winners,
        auto_publish: submission
            .auto_publish
            .unwrap_or(config.default_auto_publish),
        require_verification: submission.require_verification,
    };
    let prizes: Vec<Prize> = submission
        .prizes
        .iter()
        .zip(1u32..)
        .map(|(prize, position)| Prize {
            position,
            kind: prize.kind,
            content: prize.content.trim().to_string(),
        })
        .collect();

    repo.insert_pool(&pool, &prizes)?;

    Ok(Response::new()
        .set_data(to_json_binary(&CreatePoolResponse { pool_id })?)
        .add_attribute("action", "create_pool")
        .add_attribute("pool_id", pool_id.to_string())
        .add_attribute("creator", info.sender.to_string())
        .add_event(
            Event::new("stream_challenge_pool_created")
                .add_attribute("pool_id", pool_id.to_string())
                .add_attribute("creator", info.sender.to_string())
                .add_attribute("end_time", pool.end_time.seconds().to_string())
                .add_attribute("num_winners", pool.num_winners.to_string())
                .add_attribute("num_backup_winners", pool.num_backup_winners.to_string())
                .add_attribute(
                    "max_participants",
                    pool.max_participants
                        .map(|max| max.to_string())
                        .unwrap_or_else(|| "unlimited".to_string()),
                )
                .add_attribute("prizes", prizes.len().to_string()),
        ))
}

/// Join a pool as the sender.
pub fn join_pool(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    pool_id: u64,
    display_name: String,
) -> Result<Response, ContractError> {
    let display_name = display_name.trim().to_string();
    if display_name.is_empty() {
        return Err(ContractError::InvalidDisplayName {
            reason: "display name is empty".to_string(),
        });
    }
    if display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(ContractError::InvalidDisplayName {
            reason: format!("display name exceeds {} characters", MAX_DISPLAY_NAME_LEN),
        });
    }

    let mut repo = StorageRepository::new(deps.storage);
    let pool = check_join(&repo, pool_id, &info.sender, env.block.time)?;

    let participant = repo.insert_participant(NewParticipant {
        pool_id,
        user: info.sender.clone(),
        display_name,
        joined_at: env.block.time,
        cap: pool.max_participants,
    })?;
    let participant_count = repo.count_participants(pool_id)?;

    Ok(Response::new()
        .set_data(to_json_binary(&JoinResponse {
            pool_id,
            participant_id: participant.id,
            participant_count,
        })?)
        .add_attribute("action", "join_pool")
        .add_attribute("pool_id", pool_id.to_string())
        .add_attribute("participant_id", participant.id.to_string())
        .add_event(
            Event::new("stream_challenge_pool_joined")
                .add_attribute("pool_id", pool_id.to_string())
                .add_attribute("participant_id", participant.id.to_string())
                .add_attribute("user", info.sender.to_string())
                .add_attribute("participant_count", participant_count.to_string()),
        ))
}

/// Draw winners on demand. Creator only.
pub fn draw_winners(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    pool_id: u64,
) -> Result<Response, ContractError> {
    let seed = draw_seed(&env, pool_id);

    let mut repo = StorageRepository::new(deps.storage);
    let draw = draw::draw_winners(
        &mut repo,
        pool_id,
        Requester::User(&info.sender),
        env.block.time,
        seed,
    )?;
    repo.record_draws_completed(1)?;

    Ok(Response::new()
        .set_data(to_json_binary(&draw)?)
        .add_attribute("action", "draw_winners")
        .add_attribute("pool_id", pool_id.to_string())
        .add_attribute("primary", draw.primary.len().to_string())
        .add_attribute("backup", draw.backup.len().to_string())
        .add_events(draw_events(&draw, "manual", &env)))
}

/// Cancel an active pool. Creator only.
pub fn cancel_pool(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    pool_id: u64,
) -> Result<Response, ContractError> {
    let mut repo = StorageRepository::new(deps.storage);
    let pool = repo
        .get_pool(pool_id)?
        .ok_or(ContractError::PoolNotFound { pool_id })?;

    if info.sender != pool.creator {
        return Err(ContractError::Unauthorized {
            reason: "only the pool creator can cancel it".to_string(),
        });
    }
    if pool.status != PoolStatus::Active {
        return Err(ContractError::PoolNotActive {
            pool_id,
            status: pool.status,
        });
    }

    let rows = repo.update_pool_status(StatusUpdate {
        pool_id,
        expected: PoolStatus::Active,
        new_status: PoolStatus::Cancelled,
        completed_at: None,
        actual_counts: None,
    })?;
    if rows == 0 {
        return Err(ContractError::AlreadyCompleted { pool_id });
    }

    Ok(Response::new()
        .add_attribute("action", "cancel_pool")
        .add_attribute("pool_id", pool_id.to_string())
        .add_event(
            Event::new("stream_challenge_pool_cancelled")
                .add_attribute("pool_id", pool_id.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        ))
}

/// Draw all expired active pools. Scanner only.
pub fn scan_and_draw_expired(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    limit: Option<u32>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.scanner {
        return Err(ContractError::Unauthorized {
            reason: "only the scanner can draw expired pools".to_string(),
        });
    }
    let limit = match limit {
        Some(value) => validate_scan_batch(value)?,
        None => config.max_scan_batch,
    };

    let mut events = vec![];
    let mut repo = StorageRepository::new(deps.storage);
    let report = scan::scan_and_draw_expired(
        &mut repo,
        env.block.time,
        limit as usize,
        |pool_id| draw_seed(&env, pool_id),
        |draw| events.extend(draw_events(draw, "expiry", &env)),
    )?;
    repo.record_draws_completed(u64::from(report.drawn))?;

    Ok(Response::new()
        .set_data(to_json_binary(&report)?)
        .add_attribute("action", "scan_and_draw_expired")
        .add_attribute("scanned", report.scanned.to_string())
        .add_attribute("drawn", report.drawn.to_string())
        .add_events(events)
        .add_event(
            Event::new("stream_challenge_scan_completed")
                .add_attribute("scanned", report.scanned.to_string())
                .add_attribute("drawn", report.drawn.to_string())
                .add_attribute("closed_empty", report.closed_empty.to_string())
                .add_attribute("failed", report.failed.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        ))
}

/// Update configuration. Admin only.
pub fn update_config(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    params: UpdateConfigParams,
) -> Result<Response, ContractError> {
    let UpdateConfigParams {
        scanner,
        max_scan_batch,
        default_auto_publish,
    } = params;

    let mut config = CONFIG.load(deps.storage)?;

    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update config".to_string(),
        });
    }

    if let Some(scanner) = scanner {
        config.scanner = deps.api.addr_validate(&scanner)?;
    }
    if let Some(batch) = max_scan_batch {
        config.max_scan_batch = validate_scan_batch(batch)?;
    }
    if let Some(auto_publish) = default_auto_publish {
        config.default_auto_publish = auto_publish;
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("action", "update_config"))
}

fn draw_events(draw: &DrawResponse, trigger: &str, env: &Env) -> Vec<Event> {
    let mut event = Event::new("stream_challenge_draw_completed")
        .add_attribute("pool_id", draw.pool_id.to_string())
        .add_attribute("trigger", trigger)
        .add_attribute("primary", draw.primary.len().to_string())
        .add_attribute("backup", draw.backup.len().to_string())
        .add_attribute("adjusted", draw.adjusted.is_some().to_string())
        .add_attribute("failed_inserts", draw.failed_inserts.len().to_string())
        .add_attribute("seed", draw.seed.clone())
        .add_attribute("timestamp", env.block.time.seconds().to_string());
    if let Some(actual) = draw.adjusted {
        event = event
            .add_attribute("actual_primary", actual.primary.to_string())
            .add_attribute("actual_backup", actual.backup.to_string());
    }

    let mut events = vec![event];
    for failure in &draw.failed_inserts {
        events.push(
            Event::new("stream_challenge_winner_insert_failed")
                .add_attribute("pool_id", draw.pool_id.to_string())
                .add_attribute("participant_id", failure.participant_id.to_string())
                .add_attribute("is_backup", failure.is_backup.to_string())
                .add_attribute("position", failure.position.to_string())
                .add_attribute("reason", failure.reason.clone()),
        );
    }
    events
}
