//! Two-phase generation: dump, emit, re-fetch what was deferred, emit again
//!
//! Each phase returns a [`PhaseOutcome`] value; the orchestrator combines
//! them. The secondary lookup runs at most once per run.

use crate::classify::{classify, Disposition};
use crate::emit::{emit, Declaration, Emission, KeywordPolicy};
use crate::errors::GenerateError;
use pyg_dump::{Module, SymbolSource};
use pyg_sig::Truncation;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Local names the output file already defines
const RESERVED_LOCAL_NAMES: &[&str] = &["LLGoPackage"];

/// What to do when a symbol's kind is unknown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnsupportedPolicy {
    /// Record it in the report and keep going
    #[default]
    Collect,
    /// Stop the run with [`GenerateError::UnsupportedSymbolKind`]
    Abort,
}

impl FromStr for UnsupportedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "collect" | "warn" => Ok(UnsupportedPolicy::Collect),
            "abort" => Ok(UnsupportedPolicy::Abort),
            other => Err(format!(
                "Unknown unsupported-kind policy '{}', expected 'collect' or 'abort'",
                other
            )),
        }
    }
}

impl fmt::Display for UnsupportedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedPolicy::Collect => write!(f, "collect"),
            UnsupportedPolicy::Abort => write!(f, "abort"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    pub keyword_policy: KeywordPolicy,
    pub unsupported_policy: UnsupportedPolicy,
}

/// Orchestrator states, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Init,
    Phase1Dump,
    Phase1Emit,
    Phase2Fetch,
    Phase2Emit,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Init => "init",
            Phase::Phase1Dump => "phase 1 dump",
            Phase::Phase1Emit => "phase 1 emit",
            Phase::Phase2Fetch => "phase 2 fetch",
            Phase::Phase2Emit => "phase 2 emit",
            Phase::Done => "done",
        };
        write!(f, "{}", label)
    }
}

/// Names awaiting the secondary lookup, in the order they were deferred
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeferredSet {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl DeferredSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the name was already queued
    pub fn insert(&mut self, name: &str) -> bool {
        if !self.seen.insert(name.to_string()) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedSymbol {
    pub kind: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedSymbol {
    pub symbol: String,
    pub reason: Truncation,
}

/// A symbol dropped because its mangled name was already used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub local_name: String,
    pub kept: String,
    pub dropped: String,
}

/// Everything one classify/emit pass produced
#[derive(Debug, Clone, Default)]
pub struct PhaseOutcome {
    pub declarations: Vec<Declaration>,
    pub deferred: DeferredSet,
    pub unsupported: Vec<UnsupportedSymbol>,
    pub rejected: Vec<RejectedSymbol>,
}

/// Classify and emit every symbol of one dump
pub fn run_phase(module: &Module, options: &GenerateOptions) -> Result<PhaseOutcome, GenerateError> {
    let mut outcome = PhaseOutcome::default();

    for symbol in &module.symbols {
        match classify(symbol) {
            Disposition::Ignore | Disposition::Skip => {}
            Disposition::Defer => {
                outcome.deferred.insert(&symbol.name);
            }
            Disposition::Unsupported(kind) => {
                if options.unsupported_policy == UnsupportedPolicy::Abort {
                    return Err(GenerateError::UnsupportedSymbolKind {
                        kind,
                        symbol: symbol.name.clone(),
                    });
                }
                outcome.unsupported.push(UnsupportedSymbol {
                    kind,
                    symbol: symbol.name.clone(),
                });
            }
            Disposition::Emit => match emit(symbol, options.keyword_policy) {
                Emission::Declared(decl) => outcome.declarations.push(decl),
                Emission::Rejected(reason) => outcome.rejected.push(RejectedSymbol {
                    symbol: symbol.name.clone(),
                    reason,
                }),
            },
        }
    }

    Ok(outcome)
}

/// Final result of a run
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub module: String,
    pub declarations: Vec<Declaration>,
    /// Names still without a signature after the secondary lookup
    pub unresolved: Vec<String>,
    pub unsupported: Vec<UnsupportedSymbol>,
    pub rejected: Vec<RejectedSymbol>,
    pub collisions: Vec<Collision>,
    /// Names sent to the secondary lookup, empty when it never ran
    pub requested: Vec<String>,
    pub phase: Phase,
}

impl GenerationReport {
    fn new(module: &str) -> Self {
        GenerationReport {
            module: module.to_string(),
            declarations: Vec::new(),
            unresolved: Vec::new(),
            unsupported: Vec::new(),
            rejected: Vec::new(),
            collisions: Vec::new(),
            requested: Vec::new(),
            phase: Phase::Init,
        }
    }

    fn advance(&mut self, next: Phase) {
        debug!("{}: {} -> {}", self.module, self.phase, next);
        self.phase = next;
    }

    /// Fold one phase's declarations and diagnostics into the report
    fn absorb(&mut self, outcome: PhaseOutcome, owners: &mut HashMap<String, String>) {
        for decl in outcome.declarations {
            if let Some(kept) = owners.get(&decl.local_name) {
                warn!(
                    "{} and {} both mangle to {}; keeping {}",
                    kept, decl.link_name, decl.local_name, kept
                );
                self.collisions.push(Collision {
                    local_name: decl.local_name.clone(),
                    kept: kept.clone(),
                    dropped: decl.link_name.clone(),
                });
                continue;
            }
            owners.insert(decl.local_name.clone(), decl.link_name.clone());
            self.declarations.push(decl);
        }
        self.unsupported.extend(outcome.unsupported);
        self.rejected.extend(outcome.rejected);
    }
}

/// Run both phases against `source` for `module_name`
pub fn generate<S: SymbolSource + ?Sized>(
    source: &S,
    module_name: &str,
    options: &GenerateOptions,
) -> Result<GenerationReport, GenerateError> {
    let mut report = GenerationReport::new(module_name);
    let mut owners: HashMap<String, String> = RESERVED_LOCAL_NAMES
        .iter()
        .map(|n| (n.to_string(), n.to_string()))
        .collect();

    report.advance(Phase::Phase1Dump);
    let module = source.fetch(module_name)?;
    if module.name != module_name {
        return Err(GenerateError::ModuleMismatch {
            requested: module_name.to_string(),
            found: module.name,
        });
    }
    info!("Dumped {} symbols from {}", module.symbols.len(), module_name);

    report.advance(Phase::Phase1Emit);
    let mut first = run_phase(&module, options)?;
    let deferred = std::mem::take(&mut first.deferred);
    report.absorb(first, &mut owners);

    if deferred.is_empty() {
        report.advance(Phase::Done);
        return Ok(report);
    }

    report.advance(Phase::Phase2Fetch);
    info!(
        "{} signatures not found, fetching from the doc site",
        deferred.len()
    );
    report.requested = deferred.names().to_vec();
    let fetched = match source.fetch_names(module_name, deferred.names()) {
        Ok(module) => module,
        Err(e) => {
            warn!("Secondary lookup failed: {}", e);
            Module::default()
        }
    };

    report.advance(Phase::Phase2Emit);
    let mut second = run_phase(&fetched, options)?;
    let still_deferred = std::mem::take(&mut second.deferred);
    report.absorb(second, &mut owners);

    let mut unresolved = DeferredSet::new();
    for name in deferred.names() {
        if fetched.find(name).is_none() || still_deferred.contains(name) {
            unresolved.insert(name);
        }
    }
    for name in still_deferred.names() {
        unresolved.insert(name);
    }
    report.unresolved = unresolved.into_names();

    if !report.unresolved.is_empty() {
        warn!(
            "Skip {} symbols: {}",
            report.unresolved.len(),
            report.unresolved.join(", ")
        );
    }

    report.advance(Phase::Done);
    Ok(report)
}
