use cosmwasm_std::{entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult};
use cw2::{get_contract_version, set_contract_version};

use crate::error::ContractError;
use crate::execute;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, UpdateConfigParams};
use crate::query;
use crate::state::{Config, Counters, CONFIG, COUNTERS, DEFAULT_SCAN_BATCH};

const CONTRACT_NAME: &str = "crates.io:stream-challenge-pools";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let max_scan_batch =
        execute::validate_scan_batch(msg.max_scan_batch.unwrap_or(DEFAULT_SCAN_BATCH))?;

    let config = Config {
        admin: info.sender.clone(),
        scanner: deps.api.addr_validate(&msg.scanner)?,
        max_scan_batch,
        default_auto_publish: msg.default_auto_publish.unwrap_or(true),
    };
    CONFIG.save(deps.storage, &config)?;
    COUNTERS.save(deps.storage, &Counters::default())?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "stream-challenge-pools")
        .add_attribute("admin", info.sender.to_string())
        .add_attribute("scanner", config.scanner.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::CreatePool { pool } => execute::create_pool(deps, env, info, pool),
        ExecuteMsg::JoinPool {
            pool_id,
            display_name,
        } => execute::join_pool(deps, env, info, pool_id, display_name),
        ExecuteMsg::DrawWinners { pool_id } => execute::draw_winners(deps, env, info, pool_id),
        ExecuteMsg::CancelPool { pool_id } => execute::cancel_pool(deps, env, info, pool_id),
        ExecuteMsg::ScanAndDrawExpired { limit } => {
            execute::scan_and_draw_expired(deps, env, info, limit)
        }
        ExecuteMsg::UpdateConfig {
            scanner,
            max_scan_batch,
            default_auto_publish,
        } => execute::update_config(
            deps,
            env,
            info,
            UpdateConfigParams {
                scanner,
                max_scan_batch,
                default_auto_publish,
            },
        ),
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::Pool { pool_id } => query::query_pool(deps, pool_id),
        QueryMsg::Pools {
            status,
            start_after,
            limit,
        } => query::query_pools(deps, status, start_after, limit),
        QueryMsg::Participants {
            pool_id,
            start_after,
            limit,
        } => query::query_participants(deps, pool_id, start_after, limit),
        QueryMsg::ParticipantCount { pool_id } => query::query_participant_count(deps, pool_id),
        QueryMsg::Prizes { pool_id } => query::query_prizes(deps, pool_id),
        QueryMsg::DrawResult { pool_id, requester } => {
            query::query_draw_result(deps, pool_id, requester)
        }
        QueryMsg::UserPools {
            address,
            start_after,
            limit,
        } => query::query_user_pools(deps, address, start_after, limit),
        QueryMsg::ExpiredPools { limit } => query::query_expired_pools(deps, env, limit),
    }
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
