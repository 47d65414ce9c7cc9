pub mod config;
pub mod dump;
pub mod generate;

use pyg_config::{Config, DEFAULT_SIGFETCH_TOOL};
use pyg_dump::{FileSource, SymbolSource, ToolSource};
use pyg_logger as logger;
use std::path::PathBuf;
use std::time::Duration;

/// Pick the symbol source: captured JSON when given, the introspection tools otherwise
pub(crate) fn build_source(
    config: &Config,
    from_json: Option<PathBuf>,
    sigs_json: Option<PathBuf>,
    timeout: Option<u64>,
) -> Result<Box<dyn SymbolSource>, String> {
    if let Some(dump) = from_json {
        logger::debug(&format!("Reading symbol dump from {}", dump.display()));
        return Ok(Box::new(FileSource::new(dump, sigs_json)));
    }

    let dump_tool = config.resolve_dump_tool().map_err(|e| e.to_string())?;
    // Only the secondary phase needs this tool; a spawn failure there is not fatal
    let sigfetch_tool = config
        .resolve_sigfetch_tool()
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SIGFETCH_TOOL));
    let timeout = Duration::from_secs(timeout.unwrap_or_else(|| config.timeout_secs()));

    logger::debug(&format!(
        "Using {} and {} (timeout {}s)",
        dump_tool.display(),
        sigfetch_tool.display(),
        timeout.as_secs()
    ));
    Ok(Box::new(ToolSource::new(dump_tool, sigfetch_tool, timeout)))
}
