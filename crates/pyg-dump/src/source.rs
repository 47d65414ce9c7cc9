//! Where symbol dumps come from
//!
//! [`ToolSource`] runs the introspection tools as subprocesses,
//! [`FileSource`] replays captured JSON, and [`StaticSource`] serves fixed
//! modules from memory.

use crate::errors::DumpError;
use crate::model::Module;
use pyg_logger as logger;
use std::cell::RefCell;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(25);
/// How long to keep reading a pipe once the tool itself is gone
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Provider of module dumps for the generator
pub trait SymbolSource {
    /// Dump every public member of `module`
    fn fetch(&self, module: &str) -> Result<Module, DumpError>;

    /// Look up only `names` in `module`
    fn fetch_names(&self, module: &str, names: &[String]) -> Result<Module, DumpError>;
}

// =============================================================================
// SUBPROCESS TOOLS
// =============================================================================

/// Runs `pydump <module>` and `pysigfetch <module> -`
#[derive(Debug, Clone)]
pub struct ToolSource {
    pub dump_tool: PathBuf,
    pub sigfetch_tool: PathBuf,
    pub timeout: Duration,
}

impl ToolSource {
    pub fn new(dump_tool: PathBuf, sigfetch_tool: PathBuf, timeout: Duration) -> Self {
        ToolSource {
            dump_tool,
            sigfetch_tool,
            timeout,
        }
    }
}

impl SymbolSource for ToolSource {
    fn fetch(&self, module: &str) -> Result<Module, DumpError> {
        let stdout = run_tool(&self.dump_tool, &[module], None, self.timeout)?;
        Ok(Module::from_json(&stdout))
    }

    fn fetch_names(&self, module: &str, names: &[String]) -> Result<Module, DumpError> {
        let stdin = names.join(" ");
        let stdout = run_tool(&self.sigfetch_tool, &[module, "-"], Some(stdin), self.timeout)?;
        Ok(Module::from_json(&stdout))
    }
}

fn tool_label(tool: &Path) -> String {
    tool.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| tool.display().to_string())
}

/// Run a tool and return its stdout.
///
/// A run that outlives `timeout` is killed and reported as having printed
/// nothing. A non-zero exit still returns whatever was printed.
pub fn run_tool(
    tool: &Path,
    args: &[&str],
    stdin: Option<String>,
    timeout: Duration,
) -> Result<Vec<u8>, DumpError> {
    let label = tool_label(tool);
    debug!("Running {} {}", tool.display(), args.join(" "));

    let mut child = Command::new(tool)
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| DumpError::Spawn {
            tool: label.clone(),
            source,
        })?;

    if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
        // The pipe closes when `pipe` drops, which ends the tool's input
        thread::spawn(move || {
            let _ = pipe.write_all(input.as_bytes());
        });
    }
    let stdout_reader = child.stdout.take().map(drain);
    let stderr_reader = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let finished = wait_with_deadline(&mut child, deadline).map_err(|source| DumpError::Spawn {
        tool: label.clone(),
        source,
    })?;

    // Descendants of a killed tool may keep the pipes open; never wait on them past the deadline
    let grace = match finished {
        Some(_) => deadline.saturating_duration_since(Instant::now()).max(DRAIN_GRACE),
        None => DRAIN_GRACE,
    };
    let stdout = collect(stdout_reader, grace);
    let stderr = collect(stderr_reader, DRAIN_GRACE);
    logger::capture_tool_stderr(&label, &stderr);

    match finished {
        Some(status) if status.success() => Ok(stdout),
        Some(status) => {
            debug!("{} exited with {}", label, status);
            Ok(stdout)
        }
        None => {
            logger::warn(&timeout_message(&label, timeout));
            Ok(Vec::new())
        }
    }
}

fn timeout_message(label: &str, timeout: Duration) -> String {
    format!(
        "{} did not finish within {:?}, treating it as returning no symbols",
        label, timeout
    )
}

/// Read a pipe to its end on a detached thread
fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

fn collect(reader: Option<Receiver<Vec<u8>>>, wait: Duration) -> Vec<u8> {
    reader
        .and_then(|rx| rx.recv_timeout(wait).ok())
        .unwrap_or_default()
}

/// `Ok(None)` means the deadline passed and the child was killed
fn wait_with_deadline(
    child: &mut Child,
    deadline: Instant,
) -> io::Result<Option<std::process::ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

// =============================================================================
// CAPTURED JSON
// =============================================================================

/// Replays dumps captured earlier; `-` reads the primary dump from stdin
#[derive(Debug, Clone)]
pub struct FileSource {
    pub dump: PathBuf,
    pub signatures: Option<PathBuf>,
}

impl FileSource {
    pub fn new(dump: PathBuf, signatures: Option<PathBuf>) -> Self {
        FileSource { dump, signatures }
    }

    fn read(path: &Path) -> Result<Vec<u8>, DumpError> {
        let io_err = |source| DumpError::Io {
            path: path.to_path_buf(),
            source,
        };
        if path.as_os_str() == "-" {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).map_err(io_err)?;
            return Ok(buf);
        }
        fs::read(path).map_err(io_err)
    }
}

impl SymbolSource for FileSource {
    fn fetch(&self, _module: &str) -> Result<Module, DumpError> {
        Ok(Module::from_json(&Self::read(&self.dump)?))
    }

    fn fetch_names(&self, _module: &str, names: &[String]) -> Result<Module, DumpError> {
        let Some(path) = &self.signatures else {
            debug!("No captured signature file, secondary lookup returns nothing");
            return Ok(Module::default());
        };
        let mut module = Module::from_json(&Self::read(path)?);
        module.retain_names(names);
        Ok(module)
    }
}

// =============================================================================
// IN MEMORY
// =============================================================================

/// Serves fixed modules and remembers which names were requested
#[derive(Debug, Default)]
pub struct StaticSource {
    primary: Module,
    secondary: Option<Module>,
    requests: RefCell<Vec<Vec<String>>>,
}

impl StaticSource {
    pub fn new(primary: Module) -> Self {
        StaticSource {
            primary,
            ..Default::default()
        }
    }

    pub fn with_secondary(mut self, secondary: Module) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Every name list passed to `fetch_names`, in call order
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.borrow().clone()
    }
}

impl SymbolSource for StaticSource {
    fn fetch(&self, _module: &str) -> Result<Module, DumpError> {
        Ok(self.primary.clone())
    }

    fn fetch_names(&self, _module: &str, names: &[String]) -> Result<Module, DumpError> {
        self.requests.borrow_mut().push(names.to_vec());
        let mut module = self.secondary.clone().unwrap_or_default();
        module.retain_names(names);
        Ok(module)
    }
}
