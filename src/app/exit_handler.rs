//! Exit code logic for the pdfdl process.

use pdfdl_core::RunReport;

use crate::ProcessExit;

/// Success if any seed produced a downloaded PDF; partial success counts.
pub(crate) fn determine_exit_outcome(report: &RunReport) -> ProcessExit {
    if report.any_seed_succeeded() {
        ProcessExit::Success
    } else {
        ProcessExit::Failure
    }
}
