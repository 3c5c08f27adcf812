//! Domain types shared by the ruleport crates: legacy and target config
//! records, historical anomaly results, migration state and id generation.

pub mod id;
pub mod status;
pub mod types;
