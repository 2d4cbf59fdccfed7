//! Character sets and the names their glyphs are emitted under.

use serde::{Deserialize, Serialize};

/// Punctuation rendered ahead of the alphanumerics in the color glyph set.
pub const PUNCTUATION: &str = "!\"#$%&'()*+,-./";
/// Digits, then upper case, then lower case.
pub const ALPHANUMERIC: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
/// Every character a probe pass measures, in Python's `string.printable` order.
pub const PRINTABLE: &str = concat!(
    "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~",
    " \t\n\r\x0b\x0c",
);

/// How glyphs in a group get their names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Naming {
    /// `<prefix><index>`, index counting from zero within the group.
    Index,
    /// `<prefix><char>`. Characters that can't appear in an identifier use their index.
    Char,
}

/// A run of characters sharing a name prefix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharGroup {
    /// Prepended to every name, e.g. `punctuation_`.
    pub prefix: String,
    /// How the rest of the name is derived.
    pub naming: Naming,
    /// The characters, in emission order.
    pub chars: String,
}

impl CharGroup {
    /// Create a group.
    pub fn new(prefix: impl Into<String>, naming: Naming, chars: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            naming,
            chars: chars.into(),
        }
    }
}

/// One character together with the identifier its array is emitted under.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Symbol {
    /// The character to rasterize.
    pub ch: char,
    /// The array name.
    pub name: String,
}

/// An ordered list of [`CharGroup`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterSet {
    /// The groups, in emission order.
    pub groups: Vec<CharGroup>,
}

impl CharacterSet {
    /// A set with a single group.
    pub fn single(group: CharGroup) -> Self {
        Self {
            groups: vec![group],
        }
    }

    /// The color glyph set: punctuation by index, then alphanumerics by character.
    pub fn glyph_set() -> Self {
        Self {
            groups: vec![
                CharGroup::new("punctuation_", Naming::Index, PUNCTUATION),
                CharGroup::new("char_", Naming::Char, ALPHANUMERIC),
            ],
        }
    }

    /// Space through tilde, the layout monochrome font tables are indexed by.
    pub fn ascii_table() -> Self {
        Self::single(CharGroup::new(
            "",
            Naming::Index,
            (' '..='~').collect::<String>(),
        ))
    }

    /// Every character in order, ignoring grouping.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.groups.iter().flat_map(|v| v.chars.chars())
    }

    /// Number of characters across all groups.
    pub fn len(&self) -> usize {
        self.chars().count()
    }

    /// Whether there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every character paired with its array name, in order. Names are always valid C
    /// identifiers, whatever the prefix.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.groups
            .iter()
            .flat_map(|group| {
                group.chars.chars().enumerate().map(move |(index, ch)| {
                    let raw = match group.naming {
                        Naming::Char if ch.is_ascii_alphanumeric() => {
                            format!("{}{ch}", group.prefix)
                        }
                        Naming::Char | Naming::Index => format!("{}{index}", group.prefix),
                    };
                    Symbol {
                        ch,
                        name: identifier(&raw),
                    }
                })
            })
            .collect()
    }
}

/// Turn an arbitrary string (a file stem, usually) into a C identifier.
pub fn identifier(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
