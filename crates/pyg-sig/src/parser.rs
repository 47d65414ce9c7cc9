//! Parser for Python parameter signatures such as `(a, b, /, *, c=None, **kw)`
//!
//! The output only keeps what a positional Go declaration can express.
//! Parsing stops at the first keyword-only marker (`*`), variadic keyword
//! (`**kw`) or variadic positional (`*args`) parameter; whatever follows is
//! dropped and recorded in [`Signature::truncated`].

use smallvec::SmallVec;
use std::fmt;

/// One parameter of a parsed signature
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub positional_only: bool,
    pub keyword_only: bool,
    pub variadic_positional: bool,
    pub variadic_keyword: bool,
}

impl Parameter {
    fn named(name: &str) -> Self {
        Parameter {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// Why parsing stopped before the end of the parameter list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    /// Keyword-only parameters were dropped
    KeywordOnly,
    /// A `**kwargs` parameter was dropped
    VariadicKeyword,
}

impl fmt::Display for Truncation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Truncation::KeywordOnly => write!(f, "keyword-only parameters"),
            Truncation::VariadicKeyword => write!(f, "a **kwargs parameter"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub params: SmallVec<[Parameter; 4]>,
    /// Ends in a `*args` parameter
    pub variadic: bool,
    pub truncated: Option<Truncation>,
}

impl Signature {
    /// Parameters other than the trailing `*args`
    pub fn positional(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|p| !p.variadic_positional)
    }

    /// The trailing `*args` parameter, if any
    pub fn variadic_param(&self) -> Option<&Parameter> {
        self.params.iter().find(|p| p.variadic_positional)
    }
}

/// Parse one signature string
pub fn parse(sig: &str) -> Signature {
    let mut signature = Signature::default();

    let tokens = split_top_level(parameter_list(sig));
    let mut iter = tokens.iter().map(|t| t.trim()).filter(|t| !t.is_empty());

    while let Some(token) = iter.next() {
        let name = parameter_name(token);

        if name == "/" {
            for param in &mut signature.params {
                param.positional_only = true;
            }
            continue;
        }

        if name == "*" {
            signature.truncated = truncation_of(iter);
            break;
        }

        if name.starts_with("**") {
            signature.truncated = Some(Truncation::VariadicKeyword);
            break;
        }

        if let Some(rest) = name.strip_prefix('*') {
            signature.params.push(Parameter {
                variadic_positional: true,
                ..Parameter::named(rest)
            });
            signature.variadic = true;
            signature.truncated = truncation_of(iter);
            break;
        }

        signature.params.push(Parameter::named(&name));
    }

    signature
}

/// What kind of data loss the unconsumed tokens represent
fn truncation_of<'a>(rest: impl Iterator<Item = &'a str>) -> Option<Truncation> {
    let mut truncation = None;
    for token in rest {
        if parameter_name(token).starts_with("**") {
            return Some(Truncation::VariadicKeyword);
        }
        truncation = Some(Truncation::KeywordOnly);
    }
    truncation
}

/// The text between the outer parentheses, or the whole string without them
fn parameter_list(sig: &str) -> &str {
    let sig = sig.trim();
    let Some(open) = sig.find('(') else {
        return sig;
    };
    let inner = &sig[open + 1..];
    match find_matching_paren(inner) {
        Some(close) => &inner[..close],
        None => inner,
    }
}

/// Find the `)` closing an already-open paren, skipping nested brackets
fn find_matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    for (i, ch) in text.char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Split on commas that are not nested in brackets or quotes.
///
/// Doc-site optional groups such as `x[, y[, z]]` are flattened to `x, y, z`.
fn split_top_level(params: &str) -> Vec<String> {
    let chars: Vec<char> = params.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut optional = 0u32;
    let mut quote: Option<char> = None;

    for (i, &ch) in chars.iter().enumerate() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            current.push(ch);
            continue;
        }
        match ch {
            '\'' | '"' => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' if depth <= 0 && opens_optional_group(&chars[i + 1..]) => optional += 1,
            ']' if depth <= 0 && optional > 0 => optional -= 1,
            '[' | '(' | '{' => {
                depth += 1;
                current.push(ch);
            }
            ']' | ')' | '}' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth <= 0 => tokens.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    tokens.push(current);

    tokens
}

/// `[` directly followed by a comma starts an optional group, not a subscript
fn opens_optional_group(rest: &[char]) -> bool {
    rest.iter().find(|c| !c.is_whitespace()) == Some(&',')
}

/// Strip annotation and default from a token, and undo doc-site `\*` escapes
fn parameter_name(token: &str) -> String {
    let unescaped = token.replace("\\*", "*");
    let end = unescaped.find([':', '=']).unwrap_or(unescaped.len());
    unescaped[..end].trim().to_string()
}
