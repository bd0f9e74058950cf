//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: in-memory map databases and the seed fixtures
//! - **providers**: template AI, translation and knowledge stubs plus the
//!   local model served by a child process
//! - **files**: upload storage and model artefacts, confined with `cap-std`
//! - **system**: host and process figures gathered through `sysinfo`
//! - **training**: runs the data collection and training scripts
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod files;
pub mod memory;
pub mod providers;
pub mod system;
pub mod training;
