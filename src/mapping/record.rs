//! Line-oriented mapping record parser.
//!
//! Each line of a mapping table is tokenized by splitting on whitespace and `:`; tokens are
//! trimmed and empty tokens are discarded, so `CL: a Foo` and `CL a Foo` are equivalent.
//! The leading token selects the record kind:
//!
//! ```text
//! CL: <fromType> <toType>
//! FD: <fromOwner>/<fromName> <toOwner>/<toName>
//! FD: <fromOwner>/<fromName> <fromDesc> <toOwner>/<toName> <toDesc>
//! MD: <fromOwner>/<fromName> <fromDesc> <toOwner>/<toName> [<toDesc>]
//! ```
//!
//! Lines with any other leading token (`PK:` package records, comments, future extensions) are
//! ignored. Malformed or truncated lines are skipped and logged; they never abort a load.

use std::{fmt, str::FromStr};

use strum::{Display, EnumString};

/// The kind of a mapping record, parsed from the line's leading token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum MappingKind {
    /// `CL` type rename
    #[strum(serialize = "CL")]
    Type,
    /// `FD` field rename
    #[strum(serialize = "FD")]
    Field,
    /// `MD` method rename
    #[strum(serialize = "MD")]
    Method,
}

/// An `owner/name` member path, split at the last `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberPath {
    /// Internal name of the declaring type
    pub owner: String,
    /// Simple member name
    pub name: String,
}

impl MemberPath {
    /// Creates a member path from its parts.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        MemberPath {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Splits `owner/name` at the last `/`.
    ///
    /// Returns `None` when there is no `/` or either side is empty.
    #[must_use]
    pub fn parse(path: &str) -> Option<MemberPath> {
        let (owner, name) = path.rsplit_once('/')?;
        if owner.is_empty() || name.is_empty() {
            return None;
        }
        Some(MemberPath::new(owner, name))
    }
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// One parsed mapping line. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingRecord {
    /// Type rename
    Type {
        /// Source internal name
        from: String,
        /// Target internal name
        to: String,
    },
    /// Field rename; descriptors are present only in the extended five-token form
    Field {
        /// Source owner and name
        from: MemberPath,
        /// Source field descriptor, if given
        from_descriptor: Option<String>,
        /// Target owner and name
        to: MemberPath,
        /// Target field descriptor, if given
        to_descriptor: Option<String>,
    },
    /// Method rename
    Method {
        /// Source owner and name
        from: MemberPath,
        /// Source method descriptor
        from_descriptor: String,
        /// Target owner and name
        to: MemberPath,
        /// Target method descriptor, if given
        to_descriptor: Option<String>,
    },
}

impl MappingRecord {
    /// Returns the record kind.
    #[must_use]
    pub fn kind(&self) -> MappingKind {
        match self {
            MappingRecord::Type { .. } => MappingKind::Type,
            MappingRecord::Field { .. } => MappingKind::Field,
            MappingRecord::Method { .. } => MappingKind::Method,
        }
    }
}

/// Result of parsing a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// A well-formed record
    Record(MappingRecord),
    /// Blank line or unrecognized leading token
    Ignored,
    /// Recognized kind with missing or invalid tokens
    Malformed(String),
}

/// Records parsed from a whole table, plus the count of skipped malformed lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecords {
    /// Well-formed records in input order
    pub records: Vec<MappingRecord>,
    /// Number of malformed lines that were skipped
    pub skipped: usize,
}

/// Parser for `CL`/`FD`/`MD` mapping lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct MappingRecordParser;

impl MappingRecordParser {
    /// Creates a parser.
    #[must_use]
    pub fn new() -> Self {
        MappingRecordParser
    }

    /// Splits a line into trimmed, non-empty tokens on whitespace and `:`.
    pub fn tokenize(line: &str) -> impl Iterator<Item = &str> {
        line.split(|c: char| c.is_whitespace() || c == ':')
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Parses one line.
    #[must_use]
    pub fn parse_line(&self, line: &str) -> LineOutcome {
        let tokens: Vec<&str> = Self::tokenize(line).collect();
        let Some(kind) = tokens.first().and_then(|token| MappingKind::from_str(token).ok())
        else {
            return LineOutcome::Ignored;
        };

        match Self::parse_tokens(kind, &tokens) {
            Ok(record) => LineOutcome::Record(record),
            Err(reason) => LineOutcome::Malformed(reason),
        }
    }

    fn parse_tokens(kind: MappingKind, tokens: &[&str]) -> Result<MappingRecord, String> {
        let path = |token: &str| {
            MemberPath::parse(token).ok_or_else(|| format!("invalid member path '{token}'"))
        };

        match (kind, tokens.len()) {
            (MappingKind::Type, 3..) => Ok(MappingRecord::Type {
                from: tokens[1].to_string(),
                to: tokens[2].to_string(),
            }),
            (MappingKind::Field, 3) => Ok(MappingRecord::Field {
                from: path(tokens[1])?,
                from_descriptor: None,
                to: path(tokens[2])?,
                to_descriptor: None,
            }),
            (MappingKind::Field, 5..) => Ok(MappingRecord::Field {
                from: path(tokens[1])?,
                from_descriptor: Some(tokens[2].to_string()),
                to: path(tokens[3])?,
                to_descriptor: Some(tokens[4].to_string()),
            }),
            (MappingKind::Method, 4..) => {
                if !tokens[2].starts_with('(') {
                    return Err(format!("invalid method descriptor '{}'", tokens[2]));
                }
                Ok(MappingRecord::Method {
                    from: path(tokens[1])?,
                    from_descriptor: tokens[2].to_string(),
                    to: path(tokens[3])?,
                    to_descriptor: tokens.get(4).map(|token| token.to_string()),
                })
            }
            (kind, count) => Err(format!("{kind} record with {count} tokens")),
        }
    }

    /// Parses a whole table, skipping and logging malformed lines.
    pub fn parse<I, S>(&self, lines: I) -> ParsedRecords
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = ParsedRecords::default();

        for (index, line) in lines.into_iter().enumerate() {
            match self.parse_line(line.as_ref()) {
                LineOutcome::Record(record) => parsed.records.push(record),
                LineOutcome::Ignored => {}
                LineOutcome::Malformed(reason) => {
                    tracing::warn!(line = index + 1, %reason, "skipping malformed mapping line");
                    parsed.skipped += 1;
                }
            }
        }

        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> LineOutcome {
        MappingRecordParser::new().parse_line(line)
    }

    #[test]
    fn type_record() {
        assert_eq!(
            parse("CL: a net/minecraft/world/Widget"),
            LineOutcome::Record(MappingRecord::Type {
                from: "a".to_string(),
                to: "net/minecraft/world/Widget".to_string(),
            })
        );
    }

    #[test]
    fn colon_and_whitespace_are_separators() {
        assert_eq!(parse("CL:a\tFoo"), parse("  CL :  a   Foo  "));
        assert_eq!(parse("CL:a\tFoo"), parse("CL a Foo"));
    }

    #[test]
    fn field_records() {
        assert_eq!(
            parse("FD: a/b net/minecraft/world/Widget/size"),
            LineOutcome::Record(MappingRecord::Field {
                from: MemberPath::new("a", "b"),
                from_descriptor: None,
                to: MemberPath::new("net/minecraft/world/Widget", "size"),
                to_descriptor: None,
            })
        );

        match parse("FD: a/b I Foo/size I") {
            LineOutcome::Record(MappingRecord::Field {
                from_descriptor,
                to_descriptor,
                ..
            }) => {
                assert_eq!(from_descriptor.as_deref(), Some("I"));
                assert_eq!(to_descriptor.as_deref(), Some("I"));
            }
            other => panic!("Expected field record, got {other:?}"),
        }
    }

    #[test]
    fn method_record() {
        match parse("MD: a/c (I)V net/minecraft/world/Widget/resize (I)V") {
            LineOutcome::Record(record @ MappingRecord::Method { .. }) => {
                assert_eq!(record.kind(), MappingKind::Method);
                if let MappingRecord::Method {
                    from,
                    from_descriptor,
                    to,
                    to_descriptor,
                } = record
                {
                    assert_eq!(from, MemberPath::new("a", "c"));
                    assert_eq!(from_descriptor, "(I)V");
                    assert_eq!(to.name, "resize");
                    assert_eq!(to_descriptor.as_deref(), Some("(I)V"));
                }
            }
            other => panic!("Expected method record, got {other:?}"),
        }

        match parse("MD: a/c (I)V Foo/resize") {
            LineOutcome::Record(MappingRecord::Method { to_descriptor, .. }) => {
                assert!(to_descriptor.is_none());
            }
            other => panic!("Expected method record, got {other:?}"),
        }
    }

    #[test]
    fn unknown_and_blank_lines_are_ignored() {
        assert_eq!(parse("PK: ./ net/minecraft/src"), LineOutcome::Ignored);
        assert_eq!(parse("# comment"), LineOutcome::Ignored);
        assert_eq!(parse(""), LineOutcome::Ignored);
        assert_eq!(parse("   \t "), LineOutcome::Ignored);
    }

    #[test]
    fn malformed_lines() {
        assert!(matches!(parse("CL: a"), LineOutcome::Malformed(_)));
        assert!(matches!(parse("FD: a/b"), LineOutcome::Malformed(_)));
        assert!(matches!(parse("FD: ab Foo/size"), LineOutcome::Malformed(_)));
        assert!(matches!(parse("FD: a/b I Foo/size"), LineOutcome::Malformed(_)));
        assert!(matches!(parse("MD: a/c (I)V"), LineOutcome::Malformed(_)));
        assert!(matches!(parse("MD: a/c I Foo/resize"), LineOutcome::Malformed(_)));
        assert!(matches!(parse("FD: /b Foo/size"), LineOutcome::Malformed(_)));
    }

    #[test]
    fn parse_table_counts_skipped() {
        let parsed = MappingRecordParser::new().parse([
            "PK: ./ net/minecraft/src",
            "CL: a Foo",
            "CL: broken",
            "FD: a/b Foo/size",
            "MD: a/c",
        ]);

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.skipped, 2);
        assert_eq!(parsed.records[1].kind(), MappingKind::Field);
    }

    #[test]
    fn member_path_splits_at_last_slash() {
        let path = MemberPath::parse("net/minecraft/world/Widget/size").unwrap();
        assert_eq!(path.owner, "net/minecraft/world/Widget");
        assert_eq!(path.name, "size");
        assert_eq!(path.to_string(), "net/minecraft/world/Widget/size");
        assert!(MemberPath::parse("size").is_none());
        assert!(MemberPath::parse("Widget/").is_none());
    }
}
