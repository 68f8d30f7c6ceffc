pub mod draft;
pub mod selector;
pub mod types;

pub use draft::{BasicsStep, PoolDraft, PoolSubmission, SettingsStep, ValidationError, WinnersStep};
pub use selector::{actual_counts, select_winners, HashRng, RandomSource, Selection};
pub use types::{PoolStatus, PrizeInput, PrizeKind, WinnerCounts};
