//! Integration tests for the stream challenge pools contract.
//!
//! These tests drive the contract through its `instantiate` / `execute` /
//! `query` entry points using `cosmwasm_std::testing` mocks, decoding every
//! response the way a client would.
//!
//! Run:
//! ```bash
//! cargo test -p stream-challenge-integration-tests
//! ```

use cosmwasm_std::testing::{message_info, mock_dependencies, mock_env, MockApi, MockQuerier};
use cosmwasm_std::{from_json, Env, MemoryStorage, OwnedDeps, Response};
use sha2::{Digest, Sha256};
use stream_challenge_common::{
    BasicsStep, PoolDraft, PoolStatus, PrizeInput, PrizeKind, SettingsStep, WinnersStep,
};
use stream_challenge_pools::contract::{execute, instantiate, query};
use stream_challenge_pools::msg::{
    CreatePoolResponse, DrawResponse, DrawResultResponse, ExecuteMsg, ExpiredPoolsResponse,
    InstantiateMsg, JoinResponse, ParticipantCountResponse, ParticipantsResponse, PoolsResponse,
    QueryMsg, ScanReport, ScanResult,
};
use stream_challenge_pools::state::Pool;
use stream_challenge_pools::{ContractError, ErrorKind};

type Deps = OwnedDeps<MemoryStorage, MockApi, MockQuerier>;

// ─── Helpers ───

fn setup(default_auto_publish: bool) -> Deps {
    let mut deps = mock_dependencies();
    let admin = deps.api.addr_make("admin");
    let msg = InstantiateMsg {
        scanner: deps.api.addr_make("scanner").to_string(),
        max_scan_batch: Some(10),
        default_auto_publish: Some(default_auto_publish),
    };
    instantiate(deps.as_mut(), mock_env(), message_info(&admin, &[]), msg).unwrap();
    deps
}

fn at(seconds_after_genesis: u64) -> Env {
    let mut env = mock_env();
    env.block.time = mock_env().block.time.plus_seconds(seconds_after_genesis);
    env.block.height += seconds_after_genesis / 5;
    env
}

fn draft(num_winners: u32, num_backup_winners: u32, max_participants: Option<u32>) -> PoolDraft {
    PoolDraft::new()
        .with_basics(BasicsStep {
            title: "Speedrun challenge".to_string(),
            description: "Beat the streamer's time".to_string(),
            end_time: mock_env().block.time.plus_seconds(600),
        })
        .with_winners(WinnersStep {
            num_winners,
            num_backup_winners,
        })
        .with_settings(SettingsStep {
            max_participants,
            notify_winners: true,
            ..SettingsStep::default()
        })
        .with_prizes(vec![
            PrizeInput {
                kind: PrizeKind::Text,
                content: "Game key".to_string(),
            },
            PrizeInput {
                kind: PrizeKind::Link,
                content: "https://example.com/merch".to_string(),
            },
        ])
}

fn create(deps: &mut Deps, creator: &str, draft: PoolDraft) -> u64 {
    let creator = deps.api.addr_make(creator);
    let pool = draft.submit(mock_env().block.time).unwrap();
    let res = execute(
        deps.as_mut(),
        mock_env(),
        message_info(&creator, &[]),
        ExecuteMsg::CreatePool { pool },
    )
    .unwrap();
    let created: CreatePoolResponse = from_json(res.data.unwrap()).unwrap();
    created.pool_id
}

fn join(deps: &mut Deps, env: Env, user: &str, pool_id: u64) -> Result<Response, ContractError> {
    let sender = deps.api.addr_make(user);
    execute(
        deps.as_mut(),
        env,
        message_info(&sender, &[]),
        ExecuteMsg::JoinPool {
            pool_id,
            display_name: user.to_string(),
        },
    )
}

fn draw(deps: &mut Deps, env: Env, sender: &str, pool_id: u64) -> Result<Response, ContractError> {
    let sender = deps.api.addr_make(sender);
    execute(
        deps.as_mut(),
        env,
        message_info(&sender, &[]),
        ExecuteMsg::DrawWinners { pool_id },
    )
}

fn scan(deps: &mut Deps, env: Env) -> ScanReport {
    let scanner = deps.api.addr_make("scanner");
    let res = execute(
        deps.as_mut(),
        env,
        message_info(&scanner, &[]),
        ExecuteMsg::ScanAndDrawExpired { limit: None },
    )
    .unwrap();
    from_json(res.data.unwrap()).unwrap()
}

fn pool(deps: &Deps, pool_id: u64) -> Pool {
    from_json(query(deps.as_ref(), mock_env(), QueryMsg::Pool { pool_id }).unwrap()).unwrap()
}

fn draw_result(deps: &Deps, pool_id: u64, requester: Option<&str>) -> DrawResultResponse {
    let requester = requester.map(|name| deps.api.addr_make(name).to_string());
    from_json(
        query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::DrawResult { pool_id, requester },
        )
        .unwrap(),
    )
    .unwrap()
}

// ─── Pool lifecycle ───

#[test]
fn test_full_flow_manual_draw() {
    let mut deps = setup(true);
    let pool_id = create(&mut deps, "streamer", draft(2, 1, None));

    for viewer in ["alice", "bob", "carol", "dave", "erin"] {
        join(&mut deps, at(10), viewer, pool_id).unwrap();
    }

    let count: ParticipantCountResponse = from_json(
        query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::ParticipantCount { pool_id },
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(count.count, 5);

    let res = draw(&mut deps, at(20), "streamer", pool_id).unwrap();
    let drawn: DrawResponse = from_json(res.data.unwrap()).unwrap();
    assert_eq!(drawn.primary.len(), 2);
    assert_eq!(drawn.backup.len(), 1);
    assert!(drawn.adjusted.is_none());
    assert!(drawn.failed_inserts.is_empty());
    assert_eq!(drawn.seed.len(), 64);

    let mut users: Vec<&str> = drawn
        .primary
        .iter()
        .chain(drawn.backup.iter())
        .map(|w| w.user.as_str())
        .collect();
    users.sort();
    users.dedup();
    assert_eq!(users.len(), 3);

    let positions: Vec<u32> = drawn.primary.iter().map(|w| w.position).collect();
    assert_eq!(positions, vec![1, 2]);
    assert_eq!(drawn.backup[0].position, 1);

    let after = pool(&deps, pool_id);
    assert_eq!(after.status, PoolStatus::Completed);
    assert_eq!(after.completed_at, Some(at(20).block.time));

    let public = draw_result(&deps, pool_id, None);
    assert!(!public.winners_hidden);
    assert_eq!(public.primary, drawn.primary);
    assert_eq!(public.backup, drawn.backup);
}

#[test]
fn test_undersubscribed_pool_draws_everyone() {
    let mut deps = setup(true);
    let pool_id = create(&mut deps, "streamer", draft(3, 2, None));
    join(&mut deps, at(10), "alice", pool_id).unwrap();
    join(&mut deps, at(10), "bob", pool_id).unwrap();

    let res = draw(&mut deps, at(20), "streamer", pool_id).unwrap();
    let drawn: DrawResponse = from_json(res.data.unwrap()).unwrap();
    assert_eq!(drawn.primary.len(), 2);
    assert!(drawn.backup.is_empty());
    let adjusted = drawn.adjusted.unwrap();
    assert_eq!((adjusted.primary, adjusted.backup), (2, 0));
    assert_eq!((drawn.requested.primary, drawn.requested.backup), (3, 2));
}

#[test]
fn test_draw_without_participants_keeps_pool_open() {
    let mut deps = setup(true);
    let pool_id = create(&mut deps, "streamer", draft(1, 0, None));

    let err = draw(&mut deps, at(20), "streamer", pool_id).unwrap_err();
    assert!(matches!(err, ContractError::NoParticipants { .. }));
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(pool(&deps, pool_id).status, PoolStatus::Active);

    // Late joiners can still make it in before the end time.
    join(&mut deps, at(30), "alice", pool_id).unwrap();
    draw(&mut deps, at(40), "streamer", pool_id).unwrap();
    assert_eq!(pool(&deps, pool_id).status, PoolStatus::Completed);
}

#[test]
fn test_capacity_is_enforced_across_joins() {
    let mut deps = setup(true);
    let pool_id = create(&mut deps, "streamer", draft(1, 0, Some(3)));

    let mut accepted = 0;
    let mut rejected = 0;
    for i in 0..6 {
        match join(&mut deps, at(10), &format!("viewer{}", i), pool_id) {
            Ok(res) => {
                let joined: JoinResponse = from_json(res.data.unwrap()).unwrap();
                accepted += 1;
                assert_eq!(joined.participant_count, accepted);
            }
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
                rejected += 1;
            }
        }
    }
    assert_eq!((accepted, rejected), (3, 3));

    let participants: ParticipantsResponse = from_json(
        query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::Participants {
                pool_id,
                start_after: None,
                limit: None,
            },
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(participants.participants.len(), 3);
}

#[test]
fn test_hidden_results_until_published() {
    let mut deps = setup(false);
    let pool_id = create(&mut deps, "streamer", draft(1, 1, None));
    join(&mut deps, at(10), "alice", pool_id).unwrap();
    join(&mut deps, at(10), "bob", pool_id).unwrap();

    let before = draw_result(&deps, pool_id, Some("streamer"));
    assert_eq!(before.status, PoolStatus::Active);
    assert!(!before.winners_hidden);
    assert!(before.primary.is_empty());

    draw(&mut deps, at(20), "streamer", pool_id).unwrap();

    let viewer = draw_result(&deps, pool_id, Some("alice"));
    assert!(viewer.winners_hidden);
    assert!(viewer.primary.is_empty() && viewer.backup.is_empty());

    let anonymous = draw_result(&deps, pool_id, None);
    assert!(anonymous.winners_hidden);

    let creator = draw_result(&deps, pool_id, Some("streamer"));
    assert!(!creator.winners_hidden);
    assert_eq!(creator.primary.len(), 1);
    assert_eq!(creator.backup.len(), 1);
}

// ─── Expiry scanning ───

#[test]
fn test_scan_draws_expired_pools_once() {
    let mut deps = setup(true);
    let first = create(&mut deps, "streamer", draft(1, 0, None));
    let empty = create(&mut deps, "other_streamer", draft(1, 0, None));
    let mut later = draft(1, 0, None);
    if let Some(basics) = later.basics.as_mut() {
        basics.end_time = mock_env().block.time.plus_seconds(10_000);
    }
    let not_yet = create(&mut deps, "streamer", later);

    join(&mut deps, at(10), "alice", first).unwrap();
    join(&mut deps, at(10), "bob", first).unwrap();
    join(&mut deps, at(10), "carol", not_yet).unwrap();

    let expired: ExpiredPoolsResponse = from_json(
        query(deps.as_ref(), at(700), QueryMsg::ExpiredPools { limit: None }).unwrap(),
    )
    .unwrap();
    assert_eq!(expired.pool_ids, vec![first, empty]);

    let report = scan(&mut deps, at(700));
    assert_eq!(report.scanned, 2);
    assert_eq!(report.drawn, 1);
    assert_eq!(report.closed_empty, 1);
    assert_eq!(report.failed, 0);
    assert!(matches!(
        report.outcomes[0].result,
        ScanResult::Drawn { primary: 1, .. }
    ));

    assert_eq!(pool(&deps, first).status, PoolStatus::Completed);
    assert_eq!(pool(&deps, empty).status, PoolStatus::Completed);
    assert_eq!(pool(&deps, not_yet).status, PoolStatus::Active);

    // A second tick finds nothing; the creator can no longer draw either.
    assert_eq!(scan(&mut deps, at(800)).scanned, 0);
    let err = draw(&mut deps, at(800), "streamer", first).unwrap_err();
    assert!(matches!(err, ContractError::PoolNotActive { .. }));

    let completed: PoolsResponse = from_json(
        query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::Pools {
                status: Some(PoolStatus::Completed),
                start_after: None,
                limit: None,
            },
        )
        .unwrap(),
    )
    .unwrap();
    let ids: Vec<u64> = completed.pools.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![first, empty]);
}

#[test]
fn test_same_chain_state_draws_same_winners() {
    let run = || {
        let mut deps = setup(true);
        let pool_id = create(&mut deps, "streamer", draft(2, 2, None));
        for i in 0..8 {
            join(&mut deps, at(10), &format!("viewer{}", i), pool_id).unwrap();
        }
        let res = draw(&mut deps, at(20), "streamer", pool_id).unwrap();
        from_json::<DrawResponse>(res.data.unwrap()).unwrap()
    };

    let a = run();
    let b = run();
    assert_eq!(a.seed, b.seed);
    assert_eq!(a.primary, b.primary);
    assert_eq!(a.backup, b.backup);
}

#[test]
fn test_seed_is_fixed_by_chain_context() {
    let mut deps = setup(true);
    let pool_id = create(&mut deps, "streamer", draft(1, 0, None));
    for i in 0..10 {
        join(&mut deps, at(10), &format!("viewer{}", i), pool_id).unwrap();
    }

    // The creator has no field to steer the seed with.
    let payload = serde_json::json!({
        "draw_winners": { "pool_id": pool_id, "entropy_hex": "c0ffee" }
    });
    let msg = serde_json::to_vec(&payload).unwrap();
    assert!(from_json::<ExecuteMsg>(msg).is_err());

    let env = at(20);
    let drawn: DrawResponse = from_json(
        draw(&mut deps, env.clone(), "streamer", pool_id)
            .unwrap()
            .data
            .unwrap(),
    )
    .unwrap();

    // Anyone can recompute the seed from public block data.
    let mut hasher = Sha256::new();
    hasher.update(b"stream_challenge_draw");
    hasher.update(pool_id.to_be_bytes());
    hasher.update(env.block.height.to_be_bytes());
    hasher.update(env.block.time.nanos().to_be_bytes());
    if let Some(tx) = &env.transaction {
        hasher.update(tx.index.to_be_bytes());
    }
    hasher.update(env.contract.address.as_str().as_bytes());
    let expected: [u8; 32] = hasher.finalize().into();

    assert_eq!(drawn.seed, hex::encode(expected));
    assert_eq!(drawn.completed_at, env.block.time);
}
