//! Pool drafts assembled step by step before submission.
//!
//! Each step is an immutable value. A `PoolDraft` collects whichever steps
//! have been filled in so far; nothing is validated until `submit`.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Timestamp;
use thiserror::Error;

use crate::types::{PrizeInput, WinnerCounts};

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_PRIMARY_WINNERS: u32 = 100;
pub const MAX_BACKUP_WINNERS: u32 = 100;
pub const MAX_PRIZES: usize = 20;
pub const MAX_PRIZE_CONTENT_LEN: usize = 500;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("draft is missing the {field} step")]
    Incomplete { field: String },

    #[error("invalid title: {reason}")]
    InvalidTitle { reason: String },

    #[error("description exceeds {max} characters")]
    DescriptionTooLong { max: usize },

    #[error("invalid winner count: {reason}")]
    InvalidWinnerCount { reason: String },

    #[error("end time {end_time} must be after {now}")]
    InvalidEndTime { end_time: u64, now: u64 },

    #[error("max participants must be at least 1")]
    InvalidMaxParticipants,

    #[error("invalid prize at position {position}: {reason}")]
    InvalidPrize { position: usize, reason: String },
}

#[cw_serde]
pub struct BasicsStep {
    pub title: String,
    pub description: String,
    pub end_time: Timestamp,
}

#[cw_serde]
pub struct WinnersStep {
    pub num_winners: u32,
    pub num_backup_winners: u32,
}

#[cw_serde]
#[derive(Default)]
pub struct SettingsStep {
    /// `None` means unlimited
    pub max_participants: Option<u32>,
    pub subscribers_only: bool,
    pub notify_winners: bool,
    /// `None` falls back to the contract default
    pub auto_publish: Option<bool>,
    pub require_verification: bool,
}

#[cw_serde]
#[derive(Default)]
pub struct PoolDraft {
    pub basics: Option<BasicsStep>,
    pub winners: Option<WinnersStep>,
    pub settings: Option<SettingsStep>,
    pub prizes: Vec<PrizeInput>,
}

/// A complete pool definition, ready to be sent as `CreatePool`.
#[cw_serde]
pub struct PoolSubmission {
    pub title: String,
    pub description: String,
    pub end_time: Timestamp,
    pub max_participants: Option<u32>,
    pub subscribers_only: bool,
    pub num_winners: u32,
    pub num_backup_winners: u32,
    pub notify_winners: bool,
    pub auto_publish: Option<bool>,
    pub require_verification: bool,
    pub prizes: Vec<PrizeInput>,
}

impl PoolDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basics(mut self, step: BasicsStep) -> Self {
        self.basics = Some(step);
        self
    }

    pub fn with_winners(mut self, step: WinnersStep) -> Self {
        self.winners = Some(step);
        self
    }

    pub fn with_settings(mut self, step: SettingsStep) -> Self {
        self.settings = Some(step);
        self
    }

    pub fn with_prizes(mut self, prizes: Vec<PrizeInput>) -> Self {
        self.prizes = prizes;
        self
    }

    /// Overlay `update` on top of `self`. Steps present in `update` win;
    /// prizes are replaced only when `update` carries some.
    pub fn merge(self, update: PoolDraft) -> Self {
        PoolDraft {
            basics: update.basics.or(self.basics),
            winners: update.winners.or(self.winners),
            settings: update.settings.or(self.settings),
            prizes: if update.prizes.is_empty() {
                self.prizes
            } else {
                update.prizes
            },
        }
    }

    /// Validate the draft against `now` and produce the submission payload.
    /// Settings are optional and default to an uncapped, non-gated pool.
    pub fn submit(&self, now: Timestamp) -> Result<PoolSubmission, ValidationError> {
        let basics = self.basics.as_ref().ok_or_else(|| ValidationError::Incomplete {
            field: "basics".to_string(),
        })?;
        let winners = self.winners.as_ref().ok_or_else(|| ValidationError::Incomplete {
            field: "winners".to_string(),
        })?;
        let settings = self.settings.clone().unwrap_or_default();

        let submission = PoolSubmission {
            title: basics.title.trim().to_string(),
            description: basics.description.trim().to_string(),
            end_time: basics.end_time,
            max_participants: settings.max_participants,
            subscribers_only: settings.subscribers_only,
            num_winners: winners.num_winners,
            num_backup_winners: winners.num_backup_winners,
            notify_winners: settings.notify_winners,
            auto_publish: settings.auto_publish,
            require_verification: settings.require_verification,
            prizes: self.prizes.clone(),
        };
        submission.validate(now)?;
        Ok(submission)
    }
}

impl PoolSubmission {
    pub fn requested_counts(&self) -> WinnerCounts {
        WinnerCounts::new(self.num_winners, self.num_backup_winners)
    }

    pub fn validate(&self, now: Timestamp) -> Result<(), ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::InvalidTitle {
                reason: "title is empty".to_string(),
            });
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::InvalidTitle {
                reason: format!("title exceeds {} characters", MAX_TITLE_LEN),
            });
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::DescriptionTooLong {
                max: MAX_DESCRIPTION_LEN,
            });
        }

        if self.num_winners == 0 {
            return Err(ValidationError::InvalidWinnerCount {
                reason: "at least one winner is required".to_string(),
            });
        }
        if self.num_winners > MAX_PRIMARY_WINNERS {
            return Err(ValidationError::InvalidWinnerCount {
                reason: format!("at most {} winners", MAX_PRIMARY_WINNERS),
            });
        }
        if self.num_backup_winners > MAX_BACKUP_WINNERS {
            return Err(ValidationError::InvalidWinnerCount {
                reason: format!("at most {} backup winners", MAX_BACKUP_WINNERS),
            });
        }

        if self.end_time <= now {
            return Err(ValidationError::InvalidEndTime {
                end_time: self.end_time.seconds(),
                now: now.seconds(),
            });
        }

        if self.max_participants == Some(0) {
            return Err(ValidationError::InvalidMaxParticipants);
        }

        if self.prizes.len() > MAX_PRIZES {
            return Err(ValidationError::InvalidPrize {
                position: MAX_PRIZES + 1,
                reason: format!("at most {} prizes", MAX_PRIZES),
            });
        }
        for (index, prize) in self.prizes.iter().enumerate() {
            let content = prize.content.trim();
            if content.is_empty() {
                return Err(ValidationError::InvalidPrize {
                    position: index + 1,
                    reason: "content is empty".to_string(),
                });
            }
            if content.chars().count() > MAX_PRIZE_CONTENT_LEN {
                return Err(ValidationError::InvalidPrize {
                    position: index + 1,
                    reason: format!("content exceeds {} characters", MAX_PRIZE_CONTENT_LEN),
                });
            }
        }

        Ok(())
    }
}
