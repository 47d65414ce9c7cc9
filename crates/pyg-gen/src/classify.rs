//! Routing of dumped symbols

use pyg_dump::{SignatureText, Symbol, SymbolKind};

/// What to do with one symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Empty or private (`_`-prefixed) name; never looked at again
    Ignore,
    /// Callable with a signature: emit a declaration
    Emit,
    /// Data, type or informational symbol
    Skip,
    /// No signature or no introspection page: ask the secondary lookup
    Defer,
    /// Kind tag outside every known set
    Unsupported(String),
}

pub fn classify(symbol: &Symbol) -> Disposition {
    if symbol.name.is_empty() || symbol.name.starts_with('_') {
        return Disposition::Ignore;
    }

    if symbol.signature == SignatureText::Missing {
        return Disposition::Defer;
    }

    match &symbol.kind {
        SymbolKind::Callable(_) => Disposition::Emit,
        SymbolKind::Data(_) | SymbolKind::Informational(_) => Disposition::Skip,
        SymbolKind::Missing => Disposition::Defer,
        SymbolKind::Unsupported(tag) => Disposition::Unsupported(tag.clone()),
    }
}

#[cfg(test)]
mod tests {
    use crate::classify::*;

    #[test]
    fn test_callables_emit() {
        for kind in [
            "function",
            "method",
            "builtin_function_or_method",
            "method-wrapper",
            "ufunc",
        ] {
            let symbol = Symbol::new("f", kind, "(x)", "", "");
            assert_eq!(classify(&symbol), Disposition::Emit, "{kind}");
        }
    }

    #[test]
    fn test_data_skips() {
        for kind in ["float", "str", "module", "dtype", "ellipsis", "tensortype"] {
            let symbol = Symbol::new("pi", kind, "", "", "");
            assert_eq!(classify(&symbol), Disposition::Skip, "{kind}");
        }
    }

    #[test]
    fn test_informational_skips() {
        let symbol = Symbol::new("finfo", "finfo_info", "()", "", "");
        assert_eq!(classify(&symbol), Disposition::Skip);
        let symbol = Symbol::new("Thing", "PyCapsule", "()", "", "");
        assert_eq!(classify(&symbol), Disposition::Skip);
    }

    #[test]
    fn test_missing_kind_defers() {
        let symbol = Symbol::new("zeros", "", "", "", "");
        assert_eq!(classify(&symbol), Disposition::Defer);
    }

    #[test]
    fn test_null_signature_defers_regardless_of_kind() {
        let symbol = Symbol::new("dot", "builtin_function_or_method", "<NULL>", "", "");
        assert_eq!(classify(&symbol), Disposition::Defer);
        let symbol = Symbol::new("odd", "strange_kind", "<NULL>", "", "");
        assert_eq!(classify(&symbol), Disposition::Defer);
    }

    #[test]
    fn test_unknown_lowercase_kind_is_unsupported() {
        let symbol = Symbol::new("f", "cython_function_or_method", "(x)", "", "");
        assert_eq!(
            classify(&symbol),
            Disposition::Unsupported("cython_function_or_method".to_string())
        );
    }

    #[test]
    fn test_private_and_empty_names_ignored() {
        assert_eq!(
            classify(&Symbol::new("_impl", "function", "(x)", "", "")),
            Disposition::Ignore
        );
        assert_eq!(
            classify(&Symbol::new("", "function", "(x)", "", "")),
            Disposition::Ignore
        );
        assert_eq!(
            classify(&Symbol::new("_hidden", "", "<NULL>", "", "")),
            Disposition::Ignore
        );
    }
}
