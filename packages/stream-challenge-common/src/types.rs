use cosmwasm_schema::cw_serde;

/// Lifecycle status of a pick-me pool.
///
/// `Active` is the only non-terminal state. A pool leaves it exactly once,
/// either through a draw (`Completed`) or through its creator (`Cancelled`).
#[cw_serde]
#[derive(Copy, Eq, Hash)]
pub enum PoolStatus {
    Active,
    Completed,
    Cancelled,
}

impl PoolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolStatus::Active => "active",
            PoolStatus::Completed => "completed",
            PoolStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PoolStatus::Active)
    }
}

impl std::fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cw_serde]
#[derive(Copy, Eq)]
pub enum PrizeKind {
    Text,
    Image,
    Link,
}

/// A reward descriptor as submitted by the pool creator.
#[cw_serde]
pub struct PrizeInput {
    pub kind: PrizeKind,
    pub content: String,
}

/// Primary and backup winner counts, either requested or actually drawn.
#[cw_serde]
#[derive(Copy, Eq)]
pub struct WinnerCounts {
    pub primary: u32,
    pub backup: u32,
}

impl WinnerCounts {
    pub fn new(primary: u32, backup: u32) -> Self {
        Self { primary, backup }
    }

    pub fn total(&self) -> u32 {
        self.primary + self.backup
    }
}
