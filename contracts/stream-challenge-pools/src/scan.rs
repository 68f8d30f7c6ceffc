use cosmwasm_std::Timestamp;

use crate::draw::{close_empty, draw_winners};
use crate::error::ContractError;
use crate::gate::Requester;
use crate::msg::{DrawResponse, PoolScanOutcome, ScanReport, ScanResult};
use crate::repository::PoolRepository;

/// Draw every active pool whose end time is before `now`, up to `limit`.
///
/// Each pool is drawn on its own; a failure is recorded in the report and
/// the scan moves on. Expired pools without participants are closed empty.
/// Only the initial listing can fail the whole scan.
///
/// `on_drawn` sees every successful draw, e.g. to emit an event for it.
pub fn scan_and_draw_expired<R, S, D>(
    repo: &mut R,
    now: Timestamp,
    limit: usize,
    mut seed_for: S,
    mut on_drawn: D,
) -> Result<ScanReport, ContractError>
where
    R: PoolRepository + ?Sized,
    S: FnMut(u64) -> [u8; 32],
    D: FnMut(&DrawResponse),
{
    let pool_ids = repo.list_expired_active_pools(now, limit)?;

    let mut report = ScanReport {
        scanned: 0,
        drawn: 0,
        closed_empty: 0,
        failed: 0,
        outcomes: Vec::with_capacity(pool_ids.len()),
    };

    for pool_id in pool_ids {
        report.scanned += 1;
        let result = match draw_winners(repo, pool_id, Requester::Scanner, now, seed_for(pool_id)) {
            Ok(draw) => {
                on_drawn(&draw);
                report.drawn += 1;
                ScanResult::Drawn {
                    primary: draw.primary.len() as u32,
                    backup: draw.backup.len() as u32,
                    failed_inserts: draw.failed_inserts.len() as u32,
                }
            }
            Err(ContractError::NoParticipants { .. }) => match close_empty(repo, pool_id, now) {
                Ok(()) => {
                    report.closed_empty += 1;
                    ScanResult::ClosedEmpty {}
                }
                Err(err) => {
                    report.failed += 1;
                    failed(err)
                }
            },
            Err(err) => {
                report.failed += 1;
                failed(err)
            }
        };
        report.outcomes.push(PoolScanOutcome { pool_id, result });
    }

    Ok(report)
}

fn failed(err: ContractError) -> ScanResult {
    ScanResult::Failed {
        kind: err.kind(),
        reason: err.to_string(),
    }
}
