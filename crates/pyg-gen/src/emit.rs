//! Declarations for callable symbols
//!
//! Every parameter and the single return value are `*py.Object` handles;
//! no foreign types are inferred.

use pyg_dump::Symbol;
use pyg_sig::{mangle, parse, Keep, Truncation};
use std::fmt;
use std::str::FromStr;

/// What to do with signatures that lose keyword-only or `**kw` parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeywordPolicy {
    /// Emit the positional prefix and drop the rest
    #[default]
    Drop,
    /// Do not emit such symbols at all
    Reject,
}

impl FromStr for KeywordPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(KeywordPolicy::Drop),
            "reject" => Ok(KeywordPolicy::Reject),
            other => Err(format!(
                "Unknown keyword policy '{}', expected 'drop' or 'reject'",
                other
            )),
        }
    }
}

impl fmt::Display for KeywordPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeywordPolicy::Drop => write!(f, "drop"),
            KeywordPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// A parameter of a generated declaration; its type is always the handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclParam {
    pub name: String,
}

/// One link-only Go function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub local_name: String,
    pub params: Vec<DeclParam>,
    /// Trailing `...*py.Object` parameter
    pub variadic: Option<DeclParam>,
    pub returns_one: bool,
    pub doc: Vec<String>,
    pub source_url: String,
    /// Unmangled Python name the declaration links to
    pub link_name: String,
}

impl Declaration {
    /// Comment lines above the function, without the linkname directive
    pub fn comment_lines(&self) -> Vec<String> {
        let mut lines = self.doc.clone();
        if !self.source_url.is_empty() {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push(format!("See {}", self.source_url));
        }
        lines
    }

    pub fn link_directive(&self) -> String {
        format!("//go:linkname {} py.{}", self.local_name, self.link_name)
    }
}

/// Result of emitting one symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    Declared(Declaration),
    /// Refused under [`KeywordPolicy::Reject`]
    Rejected(Truncation),
}

/// Build the declaration for a callable symbol
pub fn emit(symbol: &Symbol, policy: KeywordPolicy) -> Emission {
    let signature = parse(symbol.signature.as_str());

    if policy == KeywordPolicy::Reject {
        if let Some(truncation) = signature.truncated {
            return Emission::Rejected(truncation);
        }
    }

    let mut taken: Vec<String> = Vec::with_capacity(signature.params.len());
    let mut unique = |raw: &str| {
        let mut name = mangle(raw, Keep::Segment(0));
        while taken.contains(&name) {
            name.push('_');
        }
        taken.push(name.clone());
        DeclParam { name }
    };

    let params = signature.positional().map(|p| unique(&p.name)).collect();
    let variadic = signature.variadic_param().map(|p| unique(&p.name));

    Emission::Declared(Declaration {
        local_name: mangle(&symbol.name, Keep::None),
        params,
        variadic,
        returns_one: true,
        doc: doc_lines(&symbol.doc),
        source_url: symbol.source_url.clone(),
        link_name: symbol.name.clone(),
    })
}

/// Split a docstring into lines, keeping every line including blank ones
fn doc_lines(doc: &str) -> Vec<String> {
    if doc.is_empty() {
        return Vec::new();
    }
    doc.split('\n').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use crate::emit::*;

    fn declared(symbol: &Symbol) -> Option<Declaration> {
        match emit(symbol, KeywordPolicy::Drop) {
            Emission::Declared(decl) => Some(decl),
            Emission::Rejected(_) => None,
        }
    }

    fn param_names(decl: &Declaration) -> Vec<&str> {
        decl.params.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_add_declaration() {
        let symbol = Symbol::new(
            "add",
            "function",
            "(a, b, /)",
            "Add two numbers",
            "http://x/add",
        );
        let Some(decl) = declared(&symbol) else {
            panic!("add should be declared");
        };
        assert_eq!(decl.local_name, "Add");
        assert_eq!(param_names(&decl), vec!["a", "b"]);
        assert!(decl.variadic.is_none());
        assert!(decl.returns_one);
        assert_eq!(decl.link_name, "add");
        assert_eq!(
            decl.comment_lines(),
            vec![
                "Add two numbers".to_string(),
                String::new(),
                "See http://x/add".to_string()
            ]
        );
        assert_eq!(decl.link_directive(), "//go:linkname Add py.add");
    }

    #[test]
    fn test_variadic_declaration() {
        let symbol = Symbol::new("concat", "builtin_function_or_method", "(x, *arrays)", "", "");
        let Some(decl) = declared(&symbol) else {
            panic!("concat should be declared");
        };
        assert_eq!(param_names(&decl), vec!["x"]);
        assert_eq!(decl.variadic.map(|p| p.name), Some("arrays".to_string()));
    }

    #[test]
    fn test_parameter_names_are_mangled_and_unique() {
        let symbol = Symbol::new("f", "function", "(axis_name, axisName, range)", "", "");
        let Some(decl) = declared(&symbol) else {
            panic!("f should be declared");
        };
        assert_eq!(param_names(&decl), vec!["axisName", "axisName_", "range_"]);
    }

    #[test]
    fn test_doc_lines_verbatim() {
        let symbol = Symbol::new("f", "function", "()", "Line one\n\n  indented\n", "");
        let Some(decl) = declared(&symbol) else {
            panic!("f should be declared");
        };
        assert_eq!(decl.doc, vec!["Line one", "", "  indented", ""]);
        assert_eq!(decl.comment_lines().len(), 4);
    }

    #[test]
    fn test_url_without_doc_has_no_separator() {
        let symbol = Symbol::new("f", "function", "()", "", "http://x/f");
        let Some(decl) = declared(&symbol) else {
            panic!("f should be declared");
        };
        assert_eq!(decl.comment_lines(), vec!["See http://x/f".to_string()]);
    }

    #[test]
    fn test_link_uses_unmangled_name() {
        let symbol = Symbol::new("log_softmax", "function", "(x)", "", "");
        let Some(decl) = declared(&symbol) else {
            panic!("log_softmax should be declared");
        };
        assert_eq!(decl.local_name, "LogSoftmax");
        assert_eq!(decl.link_directive(), "//go:linkname LogSoftmax py.log_softmax");
    }

    #[test]
    fn test_keyword_policy() {
        let symbol = Symbol::new("f", "function", "(a, *, b)", "", "");
        assert!(matches!(
            emit(&symbol, KeywordPolicy::Drop),
            Emission::Declared(_)
        ));
        assert_eq!(
            emit(&symbol, KeywordPolicy::Reject),
            Emission::Rejected(Truncation::KeywordOnly)
        );

        let plain = Symbol::new("g", "function", "(a, /)", "", "");
        assert!(matches!(
            emit(&plain, KeywordPolicy::Reject),
            Emission::Declared(_)
        ));
    }

    #[test]
    fn test_keyword_policy_parse() {
        assert_eq!("drop".parse::<KeywordPolicy>(), Ok(KeywordPolicy::Drop));
        assert_eq!("Reject".parse::<KeywordPolicy>(), Ok(KeywordPolicy::Reject));
        assert!("keep".parse::<KeywordPolicy>().is_err());
        assert_eq!(KeywordPolicy::Reject.to_string(), "reject");
    }
}
