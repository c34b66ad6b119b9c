//! Declaration keyword table and header extraction.
//!
//! The keyword table is the single source of truth for what counts as a
//! declaration: both the query compiler and the extractor are built from it.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Syntactic category of a declaration, named after its introducing keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Theorem,
    Lemma,
    Def,
    Axiom,
    Class,
    Instance,
    Structure,
    Inductive,
    Abbrev,
    Opaque,
}

/// Keyword → kind table. Adding a keyword here is enough for it to be
/// searched and classified.
pub const DECLARATION_KEYWORDS: &[(&str, DeclarationKind)] = &[
    ("theorem", DeclarationKind::Theorem),
    ("lemma", DeclarationKind::Lemma),
    ("def", DeclarationKind::Def),
    ("axiom", DeclarationKind::Axiom),
    ("class", DeclarationKind::Class),
    ("instance", DeclarationKind::Instance),
    ("structure", DeclarationKind::Structure),
    ("inductive", DeclarationKind::Inductive),
    ("abbrev", DeclarationKind::Abbrev),
    ("opaque", DeclarationKind::Opaque),
];

/// Characters allowed inside one segment of a qualified name, as a regex
/// character-class body.
pub(crate) const IDENT_CHARS: &str = r"\p{L}\p{N}_'";

impl DeclarationKind {
    /// The literal keyword that introduces this kind of declaration.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Theorem => "theorem",
            Self::Lemma => "lemma",
            Self::Def => "def",
            Self::Axiom => "axiom",
            Self::Class => "class",
            Self::Instance => "instance",
            Self::Structure => "structure",
            Self::Inductive => "inductive",
            Self::Abbrev => "abbrev",
            Self::Opaque => "opaque",
        }
    }

    /// Look up a kind by its keyword. Matching is exact; no aliases.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        DECLARATION_KEYWORDS
            .iter()
            .find(|(k, _)| *k == keyword)
            .map(|(_, kind)| *kind)
    }

    /// All recognized kinds in table order.
    pub fn all() -> impl Iterator<Item = DeclarationKind> {
        DECLARATION_KEYWORDS.iter().map(|(_, kind)| *kind)
    }
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

impl std::str::FromStr for DeclarationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_keyword(s).ok_or_else(|| format!("Unknown declaration keyword: {}", s))
    }
}

/// Modifiers that may precede a declaration keyword on the same line.
pub const DECLARATION_MODIFIERS: &[&str] = &[
    "private",
    "protected",
    "noncomputable",
    "partial",
    "unsafe",
    "nonrec",
    "scoped",
];

/// Leading indentation, attributes and modifiers of a declaration header.
/// Shared by the query compiler and the extractor so both accept the same
/// lines.
pub(crate) fn header_prefix() -> String {
    format!(
        r"^\s*(?:@\[[^\]]*\]\s*)*(?:(?:{modifiers})\s+)*",
        modifiers = DECLARATION_MODIFIERS.join("|"),
    )
}

/// Regex alternation of every keyword in the table, e.g. `theorem|lemma|...`.
pub(crate) fn keyword_alternation() -> String {
    DECLARATION_KEYWORDS
        .iter()
        .map(|(keyword, _)| *keyword)
        .collect::<Vec<_>>()
        .join("|")
}

lazy_static! {
    static ref ANCHORED_HEADER_RE: Regex = Regex::new(&format!(
        r"{prefix}({keywords})\s+([{ident}.]+)",
        prefix = header_prefix(),
        ident = IDENT_CHARS,
        keywords = keyword_alternation(),
    ))
    .expect("anchored declaration header regex is valid");

    // Keyword must start the line or follow a non-identifier character.
    static ref HEADER_RE: Regex = Regex::new(&format!(
        r"(?:^|[^{ident}.])({keywords})\s+([{ident}.]+)",
        ident = IDENT_CHARS,
        keywords = keyword_alternation(),
    ))
    .expect("declaration header regex is valid");
}

/// A declaration recognized on a single source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDeclaration {
    pub kind: DeclarationKind,
    pub name: String,
}

/// Extract the first declaration header from a raw source line.
///
/// The header is read the way the search pattern matches it: keyword after
/// any attributes and modifiers at the start of the line. Keywords inside
/// attribute arguments (`@[instance 100]`, doc strings) are skipped. Lines
/// that do not have that shape fall back to the first keyword token found
/// anywhere on the line.
///
/// Returns `None` for lines without a recognized keyword followed by an
/// identifier; most source lines are not declaration headers.
pub fn extract(line: &str) -> Option<ExtractedDeclaration> {
    if let Some(decl) = ANCHORED_HEADER_RE
        .captures(line)
        .and_then(|caps| declaration_from(&caps))
    {
        return Some(decl);
    }
    HEADER_RE
        .captures_iter(line)
        .find_map(|caps| declaration_from(&caps))
}

fn declaration_from(caps: &regex::Captures<'_>) -> Option<ExtractedDeclaration> {
    let kind = DeclarationKind::from_keyword(&caps[1])?;
    let name = normalize_name(&caps[2]);
    if name.is_empty() {
        return None;
    }
    Some(ExtractedDeclaration {
        kind,
        name: name.to_string(),
    })
}

fn normalize_name(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c: char| c == ':' || c == '.')
}

/// One result of a declaration search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationMatch {
    /// Declared name, possibly dot-qualified
    pub name: String,
    /// Declaration keyword
    pub kind: DeclarationKind,
    /// File path relative to the project root, `/`-separated
    pub file: String,
}
