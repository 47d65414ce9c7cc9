use crate::commands::build_source;
use crate::common::load_config;
use crate::GlobalOpts;
use clap::Args;
use colored::Colorize;
use pyg_dump::{Module, Symbol};
use pyg_logger as logger;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct DumpCommand {
    /// Python module to introspect
    pub module: String,

    /// Show a single symbol in full
    #[arg(long, value_name = "NAME")]
    pub symbol: Option<String>,

    /// Read the module dump from a JSON file instead of running the dump tool ("-" for stdin)
    #[arg(long, value_name = "FILE")]
    pub from_json: Option<PathBuf>,

    /// Seconds to wait for the dump tool
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

pub fn handle_dump(cmd: DumpCommand, opts: &GlobalOpts) -> Result<(), String> {
    let config = load_config();
    let source = build_source(&config, cmd.from_json.clone(), None, cmd.timeout)?;

    logger::set_current_module(Some(cmd.module.clone()));
    let module = source.fetch(&cmd.module).map_err(|e| e.to_string())?;
    if module.name != cmd.module {
        return Err(format!(
            "import module {} failed: dump reported module '{}'",
            cmd.module, module.name
        ));
    }

    match &cmd.symbol {
        Some(name) => {
            let symbol = module
                .find(name)
                .ok_or_else(|| format!("Symbol '{}' not found in {}", name, cmd.module))?;
            print_symbol_detail(symbol);
        }
        None => print_listing(&module, opts.verbosity_level() > 0),
    }
    Ok(())
}

fn print_listing(module: &Module, verbose: bool) {
    println!(
        "{} {} ({} symbols)",
        "Module:".bold().green(),
        module.name,
        module.symbols.len()
    );
    for symbol in &module.symbols {
        println!(
            "Name: {}, Type: {}, Sig: {}, URL: {}",
            symbol.name.cyan(),
            symbol.kind.tag(),
            symbol.signature.as_str(),
            symbol.source_url
        );
        if verbose && !symbol.doc.is_empty() {
            for line in symbol.doc.lines() {
                println!("    {}", line.dimmed());
            }
        }
    }
}

fn print_symbol_detail(symbol: &Symbol) {
    println!("{} {}", "Name:".bold(), symbol.name);
    println!("{} {}", "Type:".bold(), symbol.kind.tag());
    println!("{} {}", "Sig:".bold(), symbol.signature.as_str());
    println!("{} {}", "URL:".bold(), symbol.source_url);
    if !symbol.doc.is_empty() {
        println!("{}", "Doc:".bold());
        for line in symbol.doc.lines() {
            println!("  {}", line);
        }
    }
}
