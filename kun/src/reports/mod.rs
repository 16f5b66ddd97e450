//! Report data structures for commands.
//!
//! Commands build reports, then render them to an Output target.

mod output;
mod repo;
mod scaffold;
mod wire;

pub use output::{Report, TerminalOutput};
pub use repo::RepoReport;
pub use scaffold::ScaffoldReport;
pub use wire::{WireReport, WireRun};

#[cfg(test)]
pub(crate) use output::testing;
