//! Migration of legacy detection functions and alerts onto detection and
//! subscription configs.
//!
//! [`orchestrator::MigrationOrchestrator`] drives the work. It validates a
//! legacy function with [`validator::Validator`], maps it to a document with
//! the pure functions in [`translator`], turns the document into a record
//! through a [`builder::DocumentBuilder`], repoints historical anomalies with
//! [`cascade::CascadeUpdater`] and finally tags the legacy record so later
//! runs skip it.

pub mod builder;
pub mod cascade;
pub mod document;
pub mod error;
pub mod locks;
pub mod orchestrator;
pub mod report;
pub mod translator;
pub mod validator;


pub use builder::{DocumentBuilder, YamlConfigBuilder};
pub use document::Document;
pub use error::MigrationError;
pub use orchestrator::MigrationOrchestrator;
pub use report::{AlertMigrationOutcome, ApplicationReport, MigrationReport};
