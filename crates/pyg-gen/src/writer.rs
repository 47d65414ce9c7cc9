//! Go source output
//!
//! One file per module: a package clause, the `py` import, the
//! `LLGoPackage` link directive and one bodiless function per declaration.

use crate::emit::Declaration;
use crate::errors::GenerateError;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub const PY_IMPORT: &str = "github.com/goplus/lib/py";
pub const OBJECT_HANDLE: &str = "*py.Object";

/// Go package name for a dotted Python module (`numpy.linalg` -> `linalg`)
pub fn package_name(module: &str) -> &str {
    match module.rfind('.') {
        Some(pos) => &module[pos + 1..],
        None => module,
    }
}

/// Render the whole output unit
pub fn render(module: &str, declarations: &[Declaration]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "package {}", package_name(module));
    out.push('\n');
    if declarations.is_empty() {
        let _ = writeln!(out, "import _ \"unsafe\"");
    } else {
        let _ = writeln!(out, "import (");
        let _ = writeln!(out, "\t\"{}\"", PY_IMPORT);
        let _ = writeln!(out, "\t_ \"unsafe\"");
        let _ = writeln!(out, ")");
    }
    out.push('\n');
    let _ = writeln!(out, "const LLGoPackage = \"py.{}\"", module);

    for decl in declarations {
        out.push('\n');
        render_declaration(&mut out, decl);
    }

    out
}

fn render_declaration(out: &mut String, decl: &Declaration) {
    let comments = decl.comment_lines();
    for line in &comments {
        if line.is_empty() {
            out.push_str("//\n");
        } else {
            let _ = writeln!(out, "// {}", line);
        }
    }
    if !comments.is_empty() {
        out.push_str("//\n");
    }
    let _ = writeln!(out, "{}", decl.link_directive());

    let mut params: Vec<String> = decl
        .params
        .iter()
        .map(|p| format!("{} {}", p.name, OBJECT_HANDLE))
        .collect();
    if let Some(variadic) = &decl.variadic {
        params.push(format!("{} ...{}", variadic.name, OBJECT_HANDLE));
    }

    let _ = write!(out, "func {}({})", decl.local_name, params.join(", "));
    if decl.returns_one {
        let _ = write!(out, " {}", OBJECT_HANDLE);
    }
    out.push('\n');
}

/// `<out_dir>/<module>.go`
pub fn output_path(out_dir: &Path, module: &str) -> PathBuf {
    out_dir.join(format!("{}.go", module))
}

/// Write the rendered unit, creating `out_dir` when needed
pub fn write_module(out_dir: &Path, module: &str, contents: &str) -> Result<PathBuf, GenerateError> {
    fs::create_dir_all(out_dir).map_err(|source| GenerateError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let path = output_path(out_dir, module);
    fs::write(&path, contents).map_err(|source| GenerateError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use crate::emit::DeclParam;
    use crate::writer::*;
    use tempfile::TempDir;

    fn add() -> Declaration {
        Declaration {
            local_name: "Add".to_string(),
            params: vec![
                DeclParam {
                    name: "a".to_string(),
                },
                DeclParam {
                    name: "b".to_string(),
                },
            ],
            variadic: None,
            returns_one: true,
            doc: vec!["Add two numbers".to_string()],
            source_url: "http://x/add".to_string(),
            link_name: "add".to_string(),
        }
    }

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("numpy"), "numpy");
        assert_eq!(package_name("numpy.linalg"), "linalg");
        assert_eq!(package_name("torch.nn.functional"), "functional");
    }

    #[test]
    fn test_render_single_declaration() {
        let expected = "\
package mathx

import (
\t\"github.com/goplus/lib/py\"
\t_ \"unsafe\"
)

const LLGoPackage = \"py.mathx\"

// Add two numbers
//
// See http://x/add
//
//go:linkname Add py.add
func Add(a *py.Object, b *py.Object) *py.Object
";
        assert_eq!(render("mathx", &[add()]), expected);
    }

    #[test]
    fn test_render_variadic_without_comments() {
        let decl = Declaration {
            local_name: "Concat".to_string(),
            params: Vec::new(),
            variadic: Some(DeclParam {
                name: "arrays".to_string(),
            }),
            returns_one: true,
            doc: Vec::new(),
            source_url: String::new(),
            link_name: "concat".to_string(),
        };
        let out = render("np", &[decl]);
        assert!(out.ends_with(
            "\n//go:linkname Concat py.concat\nfunc Concat(arrays ...*py.Object) *py.Object\n"
        ));
    }

    #[test]
    fn test_render_without_declarations_skips_py_import() {
        let out = render("empty", &[]);
        assert!(!out.contains(PY_IMPORT));
        assert!(out.contains("const LLGoPackage = \"py.empty\""));
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(render("mathx", &[add()]), render("mathx", &[add()]));
    }

    #[test]
    fn test_write_module_creates_directory() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let out_dir = temp_dir.path().join("nested").join("mathx");
        let result = write_module(&out_dir, "mathx", "package mathx\n");
        assert!(result.is_ok_and(|p| p == out_dir.join("mathx.go")));
        assert_eq!(
            std::fs::read_to_string(out_dir.join("mathx.go")).ok(),
            Some("package mathx\n".to_string())
        );
    }

    #[test]
    fn test_write_module_reports_path_on_failure() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let blocker = temp_dir.path().join("file");
        if std::fs::write(&blocker, "").is_err() {
            return;
        }
        let result = write_module(&blocker.join("sub"), "m", "");
        assert!(matches!(result, Err(GenerateError::Io { .. })));
    }
}
