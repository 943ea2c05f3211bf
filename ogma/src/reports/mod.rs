mod check;
mod enum_usage;
mod output;

pub use check::CheckReport;
pub use enum_usage::{EnumUsage, EnumUsageReport};
pub use output::{Output, Report, TerminalOutput};
