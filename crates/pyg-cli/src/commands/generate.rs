use crate::commands::build_source;
use crate::common::load_config;
use crate::GlobalOpts;
use clap::Args;
use pyg_config::Config;
use pyg_gen::{
    generate, output_path, render, write_module, GenerateOptions, GenerationReport,
    KeywordPolicy, UnsupportedPolicy,
};
use pyg_logger as logger;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct GenerateCommand {
    /// Python module to bind (e.g. numpy, torch.nn.functional)
    pub module: String,

    /// Output directory; defaults to `<output-dir>/<module>` from config, or `./<module>`
    #[arg(short, long = "out", value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Read the module dump from a JSON file instead of running the dump tool ("-" for stdin)
    #[arg(long, value_name = "FILE")]
    pub from_json: Option<PathBuf>,

    /// Signatures for deferred symbols, as a JSON dump (used with --from-json)
    #[arg(long, value_name = "FILE", requires = "from_json")]
    pub sigs_json: Option<PathBuf>,

    /// Seconds to wait for each introspection tool
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Signatures with keyword-only or `**kwargs` parameters: drop | reject
    #[arg(long, value_name = "POLICY")]
    pub keyword_policy: Option<KeywordPolicy>,

    /// Symbols of an unknown kind: collect | abort
    #[arg(long, value_name = "POLICY")]
    pub on_unsupported: Option<UnsupportedPolicy>,

    /// Print the generated file instead of writing it
    #[arg(long)]
    pub stdout: bool,
}

/// Command-line flags win over config values
pub(crate) fn resolve_options(
    cmd: &GenerateCommand,
    config: &Config,
) -> Result<GenerateOptions, String> {
    let keyword_policy = match (cmd.keyword_policy, config.keyword_policy.as_deref()) {
        (Some(policy), _) => policy,
        (None, Some(raw)) => raw.parse()?,
        (None, None) => KeywordPolicy::default(),
    };
    let unsupported_policy = match (cmd.on_unsupported, config.unsupported_policy.as_deref()) {
        (Some(policy), _) => policy,
        (None, Some(raw)) => raw.parse()?,
        (None, None) => UnsupportedPolicy::default(),
    };
    Ok(GenerateOptions {
        keyword_policy,
        unsupported_policy,
    })
}

pub(crate) fn resolve_out_dir(cmd: &GenerateCommand, config: &Config) -> PathBuf {
    if let Some(out) = &cmd.out {
        return out.clone();
    }
    let base = config
        .output_dir
        .as_deref()
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    base.join(&cmd.module)
}

pub fn handle_generate(cmd: GenerateCommand, _opts: &GlobalOpts) -> Result<(), String> {
    let config = load_config();
    let options = resolve_options(&cmd, &config)?;
    logger::debug(&format!(
        "Generating {} (keyword policy: {}, unsupported kinds: {})",
        cmd.module, options.keyword_policy, options.unsupported_policy
    ));

    let source = build_source(
        &config,
        cmd.from_json.clone(),
        cmd.sigs_json.clone(),
        cmd.timeout,
    )?;

    logger::set_current_module(Some(cmd.module.clone()));
    logger::spinner_start(&format!("Generating bindings for {}", cmd.module));

    let report = match generate(source.as_ref(), &cmd.module, &options) {
        Ok(report) => report,
        Err(e) => {
            logger::spinner_error(&format!("Failed to generate {}", cmd.module));
            return Err(e.to_string());
        }
    };
    logger::spinner_success(&format!(
        "Generated {} declarations for {}",
        report.declarations.len(),
        cmd.module
    ));

    report_problems(&report);

    let contents = render(&cmd.module, &report.declarations);
    if cmd.stdout {
        print!("{}", contents);
        return Ok(());
    }

    let out_dir = resolve_out_dir(&cmd, &config);
    logger::step(&format!(
        "Writing {}",
        output_path(&out_dir, &cmd.module).display()
    ));
    let path = write_module(&out_dir, &cmd.module, &contents).map_err(|e| e.to_string())?;

    logger::success(&format!("Wrote {}", path.display()));
    Ok(())
}

fn report_problems(report: &GenerationReport) {
    for unsupported in &report.unsupported {
        logger::warn(&format!(
            "Unsupported type {} for {}",
            unsupported.kind, unsupported.symbol
        ));
    }
    for rejected in &report.rejected {
        logger::warn(&format!(
            "Rejected {}: signature has {}",
            rejected.symbol, rejected.reason
        ));
    }
    for collision in &report.collisions {
        logger::warn(&format!(
            "{} and {} both map to {}; kept {}",
            collision.kept, collision.dropped, collision.local_name, collision.kept
        ));
    }
    if !report.unresolved.is_empty() {
        logger::warn(&format!(
            "Skip {} symbols: {}",
            report.unresolved.len(),
            report.unresolved.join(", ")
        ));
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::generate::*;

    fn command(module: &str) -> GenerateCommand {
        GenerateCommand {
            module: module.to_string(),
            out: None,
            from_json: None,
            sigs_json: None,
            timeout: None,
            keyword_policy: None,
            on_unsupported: None,
            stdout: false,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            keyword_policy: Some("drop".to_string()),
            ..Default::default()
        };
        let mut cmd = command("numpy");
        cmd.keyword_policy = Some(KeywordPolicy::Reject);
        let options = resolve_options(&cmd, &config);
        assert!(options.is_ok_and(|o| o.keyword_policy == KeywordPolicy::Reject));
    }

    #[test]
    fn test_config_policy_used_without_flag() {
        let config = Config {
            unsupported_policy: Some("abort".to_string()),
            ..Default::default()
        };
        let options = resolve_options(&command("numpy"), &config);
        assert!(options.is_ok_and(|o| o.unsupported_policy == UnsupportedPolicy::Abort
            && o.keyword_policy == KeywordPolicy::Drop));
    }

    #[test]
    fn test_bad_config_policy_is_an_error() {
        let config = Config {
            keyword_policy: Some("keep".to_string()),
            ..Default::default()
        };
        assert!(resolve_options(&command("numpy"), &config).is_err());
    }

    #[test]
    fn test_out_dir_defaults_to_module_name() {
        let config = Config::default();
        assert_eq!(
            resolve_out_dir(&command("numpy"), &config),
            PathBuf::from(".").join("numpy")
        );

        let config = Config {
            output_dir: Some("/tmp/bindings".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_out_dir(&command("numpy"), &config),
            PathBuf::from("/tmp/bindings/numpy")
        );

        let mut cmd = command("numpy");
        cmd.out = Some(PathBuf::from("gen"));
        assert_eq!(resolve_out_dir(&cmd, &config), PathBuf::from("gen"));
    }
}
