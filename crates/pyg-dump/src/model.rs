//! Module and symbol types produced from a dump
//!
//! The wire format printed by the introspection tools is
//! `{ "name": str, "items": [ { "name", "type", "doc", "sig", "url" } ] }`.
//! Every field may be missing; anything that does not parse is an empty
//! module rather than an error.

use serde::Deserialize;

/// Signature sentinel meaning "introspection could not produce one"
pub const NULL_SIGNATURE: &str = "<NULL>";

/// Kind tags that can be bound as functions
pub const CALLABLE_KINDS: &[&str] = &[
    "builtin_function_or_method",
    "function",
    "method",
    "ufunc",
    "method-wrapper",
];

/// Kind tags of data and type symbols that are never bound
pub const DATA_KINDS: &[&str] = &[
    "str",
    "float",
    "bool",
    "type",
    "dict",
    "tuple",
    "list",
    "object",
    "module",
    "int",
    "set",
    "frozenset",
    "flags",
    "bool_",
    "pybind11_type",
    "layout",
    "memory_format",
    "qscheme",
    "dtype",
    "tensortype",
    "ellipsis",
];

/// Suffix marking metadata objects such as numpy's `finfo`-style `*_info`
pub const INFORMATIONAL_SUFFIX: &str = "_info";

// =============================================================================
// WIRE FORMAT
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct RawModule {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    items: Option<Vec<Option<RawSymbol>>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSymbol {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    doc: Option<String>,
    #[serde(default)]
    sig: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

// =============================================================================
// MODEL
// =============================================================================

/// What a dumped symbol is, decided once from its raw `type` tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    /// Functions, methods and ufuncs
    Callable(String),
    /// Constants, types, submodules and other values
    Data(String),
    /// Empty tag: the doc-site lookup found no page for the symbol
    Missing,
    /// Metadata tags that are harmless to ignore
    Informational(String),
    /// Lowercase tag nobody taught us about
    Unsupported(String),
}

impl SymbolKind {
    pub fn from_tag(tag: &str) -> Self {
        if tag.is_empty() {
            return SymbolKind::Missing;
        }
        if CALLABLE_KINDS.contains(&tag) {
            return SymbolKind::Callable(tag.to_string());
        }
        if DATA_KINDS.contains(&tag) {
            return SymbolKind::Data(tag.to_string());
        }

        let lowercase_leading = tag.as_bytes().first().is_some_and(u8::is_ascii_lowercase);
        if lowercase_leading && !tag.ends_with(INFORMATIONAL_SUFFIX) {
            SymbolKind::Unsupported(tag.to_string())
        } else {
            SymbolKind::Informational(tag.to_string())
        }
    }

    /// The raw tag this kind was parsed from
    pub fn tag(&self) -> &str {
        match self {
            SymbolKind::Callable(tag)
            | SymbolKind::Data(tag)
            | SymbolKind::Informational(tag)
            | SymbolKind::Unsupported(tag) => tag,
            SymbolKind::Missing => "",
        }
    }
}

/// A symbol's parameter signature text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureText {
    /// The `<NULL>` sentinel
    Missing,
    Text(String),
}

impl SignatureText {
    pub fn from_raw(raw: String) -> Self {
        if raw == NULL_SIGNATURE {
            SignatureText::Missing
        } else {
            SignatureText::Text(raw)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SignatureText::Missing => NULL_SIGNATURE,
            SignatureText::Text(text) => text,
        }
    }
}

/// One member of a dumped module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub doc: String,
    pub signature: SignatureText,
    pub source_url: String,
}

impl Symbol {
    /// Build a symbol from raw wire values
    pub fn new(name: &str, kind: &str, signature: &str, doc: &str, source_url: &str) -> Self {
        Symbol {
            name: name.to_string(),
            kind: SymbolKind::from_tag(kind),
            doc: doc.to_string(),
            signature: SignatureText::from_raw(signature.to_string()),
            source_url: source_url.to_string(),
        }
    }

    fn from_raw(raw: RawSymbol) -> Self {
        Symbol {
            name: raw.name.unwrap_or_default(),
            kind: SymbolKind::from_tag(raw.kind.as_deref().unwrap_or_default()),
            doc: raw.doc.unwrap_or_default(),
            signature: SignatureText::from_raw(raw.sig.unwrap_or_default()),
            source_url: raw.url.unwrap_or_default(),
        }
    }
}

/// A dumped Python module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub symbols: Vec<Symbol>,
}

impl Module {
    pub fn new(name: &str, symbols: Vec<Symbol>) -> Self {
        Module {
            name: name.to_string(),
            symbols,
        }
    }

    /// Parse tool output; empty or non-JSON output is an empty module
    pub fn from_json(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            tracing::debug!("Dump output is empty");
            return Module::default();
        }

        match serde_json::from_slice::<RawModule>(bytes) {
            Ok(raw) => Module {
                name: raw.name.unwrap_or_default(),
                symbols: raw
                    .items
                    .unwrap_or_default()
                    .into_iter()
                    .flatten()
                    .map(Symbol::from_raw)
                    .collect(),
            },
            Err(e) => {
                tracing::debug!("Dump output is not a module document: {}", e);
                Module::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Find a symbol by its foreign name
    pub fn find(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// Keep only the symbols whose names are listed, in dump order
    pub fn retain_names(&mut self, names: &[String]) {
        self.symbols.retain(|s| names.iter().any(|n| *n == s.name));
    }
}

#[cfg(test)]
mod tests {
    use crate::model::*;

    #[test]
    fn test_kind_from_tag() {
        assert_eq!(
            SymbolKind::from_tag("function"),
            SymbolKind::Callable("function".to_string())
        );
        assert_eq!(
            SymbolKind::from_tag("method-wrapper"),
            SymbolKind::Callable("method-wrapper".to_string())
        );
        assert_eq!(
            SymbolKind::from_tag("float"),
            SymbolKind::Data("float".to_string())
        );
        assert_eq!(SymbolKind::from_tag(""), SymbolKind::Missing);
        assert_eq!(
            SymbolKind::from_tag("iinfo_info"),
            SymbolKind::Informational("iinfo_info".to_string())
        );
        assert_eq!(
            SymbolKind::from_tag("PyCapsule"),
            SymbolKind::Informational("PyCapsule".to_string())
        );
        assert_eq!(
            SymbolKind::from_tag("cython_function_or_method"),
            SymbolKind::Unsupported("cython_function_or_method".to_string())
        );
    }

    #[test]
    fn test_kind_tag_roundtrip() {
        for tag in ["function", "dtype", "", "Foo", "weird_kind"] {
            assert_eq!(SymbolKind::from_tag(tag).tag(), tag);
        }
    }

    #[test]
    fn test_null_signature_sentinel() {
        assert_eq!(
            SignatureText::from_raw("<NULL>".to_string()),
            SignatureText::Missing
        );
        assert_eq!(
            SignatureText::from_raw("(x)".to_string()),
            SignatureText::Text("(x)".to_string())
        );
        assert_eq!(SignatureText::Missing.as_str(), NULL_SIGNATURE);
    }

    #[test]
    fn test_from_json_full_document() {
        let json = br#"{
            "name": "mathx",
            "items": [
                {"name": "add", "type": "function", "sig": "(a, b, /)", "doc": "Add two numbers", "url": "http://x/add"},
                {"name": "pi", "type": "float"}
            ]
        }"#;
        let module = Module::from_json(json);
        assert_eq!(module.name, "mathx");
        assert_eq!(module.symbols.len(), 2);
        assert_eq!(module.symbols[0].signature.as_str(), "(a, b, /)");
        assert_eq!(module.symbols[0].source_url, "http://x/add");
        assert_eq!(module.symbols[1].doc, "");
        assert_eq!(
            module.symbols[1].signature,
            SignatureText::Text(String::new())
        );
    }

    #[test]
    fn test_from_json_null_items() {
        let module = Module::from_json(br#"{"name": "m", "items": null}"#);
        assert_eq!(module.name, "m");
        assert!(module.is_empty());

        let module = Module::from_json(br#"{"name": "m", "items": [null, {"name": "f"}]}"#);
        assert_eq!(module.symbols.len(), 1);
        assert_eq!(module.symbols[0].kind, SymbolKind::Missing);
    }

    #[test]
    fn test_from_json_null_fields_read_as_empty() {
        let module = Module::from_json(
            br#"{"name": "mathx", "items": [
                {"name": "add", "type": "function", "doc": null, "sig": null, "url": "http://x/add"},
                {"name": "sub", "type": null, "doc": "Subtract", "sig": "(a, b)", "url": null}
            ]}"#,
        );
        assert_eq!(module.name, "mathx");
        assert_eq!(module.symbols.len(), 2);
        assert_eq!(module.symbols[0].doc, "");
        assert_eq!(module.symbols[0].signature, SignatureText::Text(String::new()));
        assert_eq!(module.symbols[0].source_url, "http://x/add");
        assert_eq!(module.symbols[1].kind, SymbolKind::Missing);
        assert_eq!(module.symbols[1].source_url, "");
    }

    #[test]
    fn test_from_json_garbage_is_empty() {
        assert_eq!(Module::from_json(b""), Module::default());
        assert_eq!(Module::from_json(b"  \n"), Module::default());
        assert_eq!(Module::from_json(b"Traceback (most recent call last)"), Module::default());
    }

    #[test]
    fn test_retain_names() {
        let mut module = Module::new(
            "m",
            vec![
                Symbol::new("a", "function", "()", "", ""),
                Symbol::new("b", "function", "()", "", ""),
                Symbol::new("c", "function", "()", "", ""),
            ],
        );
        module.retain_names(&["c".to_string(), "a".to_string()]);
        let names: Vec<&str> = module.symbols.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert!(module.find("b").is_none());
    }
}
