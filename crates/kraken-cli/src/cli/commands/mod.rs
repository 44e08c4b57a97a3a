//! CLI command handlers, one file per subcommand.

mod check;
mod serve;

pub use check::run_check;
pub use serve::run_serve;

#[cfg(test)]
pub(crate) use serve::resolve_config;
