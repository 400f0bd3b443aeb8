//! Parsing of the DDL text SQLite keeps in `sqlite_master`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{ColumnDescriptor, IndexDescriptor, Table};

static TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)^\s*CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:"[^"]+"|\[[^\]]+\]|'[^']+'|`[^`]+`|[^\s(]+)\s*\((?P<body>.*)\)\s*$"#,
    )
    .unwrap_or_else(|e| unreachable!("table pattern: {e}"))
});

static COLUMN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)^(?:\[(?P<bracket>[^\]]+)\]|"(?P<double>[^"]+)"|'(?P<single>[^']+)'|`(?P<tick>[^`]+)`|(?P<bare>[^\s'"\[`]+))\s+(?P<type>\S+)(?P<pk>\s+PRIMARY\s+KEY)?(?P<ai>\s+AUTOINCREMENT)?(?P<uq>\s+UNIQUE)?(?P<nn>\s+NOT\s+NULL)?(?:\s+DEFAULT\s+(?P<default>'(?:[^']|'')*'|"[^"]*"|\((?:[^()]|\([^()]*\))*\)|[^\s'"(]+))?\s*$"#,
    )
    .unwrap_or_else(|e| unreachable!("column pattern: {e}"))
});

static UNIQUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^UNIQUE\s*\((?P<columns>.+)\)$")
        .unwrap_or_else(|e| unreachable!("unique pattern: {e}"))
});

static INDEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^\s*CREATE\s+INDEX\s+(?:IF\s+NOT\s+EXISTS\s+)?(?P<index>\S+)\s+ON\s+(?P<table>[^\s(]+)\s*\((?P<columns>.+)\)\s*$",
    )
    .unwrap_or_else(|e| unreachable!("index pattern: {e}"))
});

fn parse_error(definition: &str) -> Error {
    Error::SchemaParse {
        definition: definition.to_string(),
    }
}

fn unquote(identifier: &str) -> &str {
    identifier.trim_matches(|c: char| matches!(c, '[' | ']' | '"' | '\'' | '`') || c.is_whitespace())
}

fn column_list(columns: &str) -> Vec<String> {
    columns
        .split(',')
        .map(|column| unquote(column).to_string())
        .collect()
}

/// Splits at commas that are outside parentheses and quotes.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in body.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '[' => quote = Some(']'),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    items.push(body[start..i].trim());
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    items.push(body[start..].trim());
    items
}

fn parse_column(item: &str) -> Option<ColumnDescriptor> {
    let caps = COLUMN_RE.captures(item)?;
    let name = ["bracket", "double", "single", "tick", "bare"]
        .iter()
        .find_map(|group| caps.name(group))?
        .as_str();

    let mut column = ColumnDescriptor::introspected(name, &caps["type"]);
    column.primary_key = caps.name("pk").is_some();
    column.auto_increment = caps.name("ai").is_some();
    column.unique = caps.name("uq").is_some();
    column.not_null = caps.name("nn").is_some();
    column.default = caps.name("default").map(|d| d.as_str().trim().to_string());
    Some(column)
}

/// Reconstructs a table from its stored `CREATE TABLE` text.
pub(super) fn parse_table(name: &str, ddl: &str) -> Result<Table> {
    let caps = TABLE_RE.captures(ddl).ok_or_else(|| parse_error(ddl))?;
    let mut table = Table {
        name: name.to_string(),
        columns: Vec::new(),
        indices: Vec::new(),
        uniques: Vec::new(),
    };

    for item in split_top_level(&caps["body"]) {
        if let Some(unique) = UNIQUE_RE.captures(item) {
            table
                .uniques
                .push(IndexDescriptor::new("", column_list(&unique["columns"])));
        } else {
            table
                .columns
                .push(parse_column(item).ok_or_else(|| parse_error(ddl))?);
        }
    }

    if table.columns.is_empty() {
        return Err(parse_error(ddl));
    }
    Ok(table)
}

/// Reconstructs a model index from its stored `CREATE INDEX` text. Only
/// indices named `idx_<table>_<name>` are recognised.
pub(super) fn parse_index(table: &str, ddl: &str) -> Result<IndexDescriptor> {
    let caps = INDEX_RE.captures(ddl).ok_or_else(|| parse_error(ddl))?;
    // SQLite matches identifiers without regard to case.
    let prefix = format!("idx_{table}_");
    let index = unquote(&caps["index"]);
    let name = index
        .get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(&prefix))
        .and_then(|_| index.get(prefix.len()..))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| parse_error(ddl))?;
    Ok(IndexDescriptor {
        name: name.to_string(),
        columns: column_list(&caps["columns"]),
    })
}
