pub mod contract;
pub mod draw;
pub mod error;
pub mod execute;
pub mod gate;
pub mod msg;
pub mod query;
pub mod repository;
pub mod scan;
pub mod state;

#[cfg(test)]
mod testing;

pub use crate::error::{ContractError, ErrorKind};
