//! Definition file parsing
//!
//! A definition file starts with optional top-level blocks and continues
//! with the template body:
//!
//! ```text
//! config { type: "table", tags: ["daily"] }
//! pre_operations { set x = 1 }
//! post_operations { grant select on ${self()} to reader }
//!
//! select * from ${ref("orders")}
//! ```
//!
//! Blocks may appear in any order, at most once each. Comments and
//! whitespace between them are skipped.

use crate::action::TableType;
use crate::action_config::{ActionConfig, ParsedConfig};
use crate::error::{CoreError, CoreResult};

/// A definition file split into config, hooks, and template body
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionFile {
    /// Path relative to the project root
    pub path: String,

    /// File name without extension; the default action name
    pub stem: String,

    /// Parsed config block (operations when absent)
    pub config: ActionConfig,

    /// Warnings raised while parsing the config block
    pub warnings: Vec<String>,

    /// Raw `pre_operations` template, if present
    pub pre_operations: Option<String>,

    /// Raw `post_operations` template, if present
    pub post_operations: Option<String>,

    /// Template body
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Config,
    PreOperations,
    PostOperations,
}

impl BlockKind {
    fn keyword(&self) -> &'static str {
        match self {
            BlockKind::Config => "config",
            BlockKind::PreOperations => "pre_operations",
            BlockKind::PostOperations => "post_operations",
        }
    }

    fn all() -> [BlockKind; 3] {
        [
            BlockKind::Config,
            BlockKind::PreOperations,
            BlockKind::PostOperations,
        ]
    }
}

impl DefinitionFile {
    /// Parse a definition file's contents.
    pub fn parse(path: &str, content: &str) -> CoreResult<Self> {
        let invalid = |message: String| CoreError::InvalidDefinition {
            path: path.to_string(),
            message,
        };

        let mut config_body: Option<&str> = None;
        let mut pre_operations: Option<&str> = None;
        let mut post_operations: Option<&str> = None;
        let mut pos = 0;

        loop {
            let start = skip_trivia(content, pos);
            let Some((kind, open)) = block_at(content, start) else {
                break;
            };
            let close = matching_brace(content, open, kind.comment_style()).ok_or_else(|| {
                invalid(format!("unterminated '{}' block", kind.keyword()))
            })?;
            let inner = &content[open + 1..close];

            let slot = match kind {
                BlockKind::Config => &mut config_body,
                BlockKind::PreOperations => &mut pre_operations,
                BlockKind::PostOperations => &mut post_operations,
            };
            if slot.is_some() {
                return Err(invalid(format!("duplicate '{}' block", kind.keyword())));
            }
            *slot = Some(inner);
            pos = close + 1;
        }

        let ParsedConfig { config, warnings } = match config_body {
            Some(body) => ActionConfig::parse(path, body)?,
            None => ParsedConfig::default(),
        };

        let has_hooks = pre_operations.is_some() || post_operations.is_some();
        if has_hooks && !matches!(config, ActionConfig::Table { .. }) {
            return Err(invalid(
                "pre_operations and post_operations are only allowed for table, view, and incremental actions"
                    .to_string(),
            ));
        }

        Ok(Self {
            path: path.to_string(),
            stem: file_stem(path),
            config,
            warnings,
            pre_operations: pre_operations.map(|s| s.trim().to_string()),
            post_operations: post_operations.map(|s| s.trim().to_string()),
            body: content[pos..].trim().to_string(),
        })
    }

    /// Action name: explicit `name` or the file stem
    pub fn action_name(&self) -> &str {
        self.config.declared_name().unwrap_or(&self.stem)
    }

    /// Table type when this file defines a table
    pub fn table_type(&self) -> Option<TableType> {
        match &self.config {
            ActionConfig::Table { table_type, .. } => Some(*table_type),
            _ => None,
        }
    }
}

fn file_stem(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file.to_string(),
    }
}

/// Skip whitespace, `-- line` comments, and `/* block */` comments
fn skip_trivia(content: &str, mut pos: usize) -> usize {
    let bytes = content.as_bytes();
    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let rest = &content[pos..];
        if rest.starts_with("--") {
            pos += rest.find('\n').unwrap_or(rest.len());
        } else if rest.starts_with("/*") {
            match rest[2..].find("*/") {
                Some(end) => pos += end + 4,
                None => return pos,
            }
        } else {
            return pos;
        }
    }
}

/// If a block keyword starts at `pos`, return it and the offset of its `{`
fn block_at(content: &str, pos: usize) -> Option<(BlockKind, usize)> {
    let rest = &content[pos..];
    BlockKind::all().into_iter().find_map(|kind| {
        let after = rest.strip_prefix(kind.keyword())?;
        let trimmed = after.trim_start();
        if !trimmed.starts_with('{') {
            return None;
        }
        Some((kind, pos + kind.keyword().len() + (after.len() - trimmed.len())))
    })
}

/// Comment syntax recognized inside a block body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentStyle {
    /// YAML `# ...`, when at line start or after whitespace
    Hash,
    /// SQL `-- ...` and `/* ... */`
    Sql,
}

impl BlockKind {
    fn comment_style(&self) -> CommentStyle {
        match self {
            BlockKind::Config => CommentStyle::Hash,
            BlockKind::PreOperations | BlockKind::PostOperations => CommentStyle::Sql,
        }
    }
}

/// Offset of the `}` matching the `{` at `open`, skipping quoted strings
/// and comments
fn matching_brace(content: &str, open: usize, comments: CommentStyle) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev: Option<char> = None;
    let mut chars = content[open..].char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            prev = Some(c);
            continue;
        }

        let next = chars.peek().map(|&(_, n)| n);
        let line_comment = match comments {
            CommentStyle::Hash => c == '#' && prev.is_none_or(char::is_whitespace),
            CommentStyle::Sql => c == '-' && next == Some('-'),
        };
        if line_comment {
            for (_, skipped) in chars.by_ref() {
                if skipped == '\n' {
                    break;
                }
            }
            prev = Some('\n');
            continue;
        }
        if comments == CommentStyle::Sql && c == '/' && next == Some('*') {
            chars.next();
            let mut star = false;
            loop {
                let (_, skipped) = chars.next()?;
                if star && skipped == '/' {
                    break;
                }
                star = skipped == '*';
            }
            prev = Some(' ');
            continue;
        }

        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
        prev = Some(c);
    }
    None
}

#[cfg(test)]
#[path = "definition_test.rs"]
mod tests;
