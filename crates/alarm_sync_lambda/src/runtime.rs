//! Runtime module boundary over the alarm contract crate.

pub use alarm_sync_core::contract;
pub use alarm_sync_core::naming;
