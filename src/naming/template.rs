//! Table name templates.
//!
//! A template is plain text containing `%(name)s` placeholders. Placeholders are opaque
//! find/replace keys: there is no escaping, and text that is not a recognized placeholder
//! (including `%(` sequences of any other shape) is copied through unchanged.

use std::fmt;

use crate::error::{LoadError, LoadResult};

/// A recognized template placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateToken {
    /// `%(default)s`: the loader's default template.
    Default,
    /// `%(filename)s`: source file stem.
    Filename,
    /// `%(format_name)s`: the loader's format name.
    FormatName,
    /// `%(format_id)s`: per-format emission number.
    FormatId,
    /// `%(global_id)s`: process-wide emission number.
    GlobalId,
    /// `%(key)s`: format-specific table key.
    Key,
    /// `%(title)s`: document title or table caption.
    Title,
    /// `%(sheet)s`: worksheet name.
    Sheet,
}

impl TemplateToken {
    /// All tokens, in declaration order.
    pub const ALL: [TemplateToken; 8] = [
        Self::Default,
        Self::Filename,
        Self::FormatName,
        Self::FormatId,
        Self::GlobalId,
        Self::Key,
        Self::Title,
        Self::Sheet,
    ];

    /// The variable name inside the placeholder.
    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Filename => "filename",
            Self::FormatName => "format_name",
            Self::FormatId => "format_id",
            Self::GlobalId => "global_id",
            Self::Key => "key",
            Self::Title => "title",
            Self::Sheet => "sheet",
        }
    }

    /// The full placeholder text, e.g. `%(filename)s`.
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Default => "%(default)s",
            Self::Filename => "%(filename)s",
            Self::FormatName => "%(format_name)s",
            Self::FormatId => "%(format_id)s",
            Self::GlobalId => "%(global_id)s",
            Self::Key => "%(key)s",
            Self::Title => "%(title)s",
            Self::Sheet => "%(sheet)s",
        }
    }
}

impl fmt::Display for TemplateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.placeholder())
    }
}

/// Substitution values for one table emission.
///
/// Entries are kept in insertion order; when two entries could match at the same position the
/// earlier one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameContext {
    default_template: String,
    entries: Vec<(TemplateToken, String)>,
}

impl NameContext {
    /// Create a context whose `%(default)s` expands to `default_template`.
    pub fn new(default_template: impl Into<String>) -> Self {
        Self {
            default_template: default_template.into(),
            entries: Vec::new(),
        }
    }

    /// Add (or replace) a value, builder style.
    pub fn with(mut self, token: TemplateToken, value: impl Into<String>) -> Self {
        self.set(token, value);
        self
    }

    /// Add (or replace) a value. Replacing keeps the entry's original position.
    ///
    /// Setting [`TemplateToken::Default`] replaces the default template.
    pub fn set(&mut self, token: TemplateToken, value: impl Into<String>) {
        let value = value.into();
        if token == TemplateToken::Default {
            self.default_template = value;
            return;
        }
        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((token, value)),
        }
    }

    /// The value for `token`, if set.
    pub fn get(&self, token: TemplateToken) -> Option<&str> {
        if token == TemplateToken::Default {
            return Some(self.default_template.as_str());
        }
        self.entries
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, v)| v.as_str())
    }

    /// The default template.
    pub fn default_template(&self) -> &str {
        &self.default_template
    }

    /// Substitution entries, in application order.
    pub fn entries(&self) -> &[(TemplateToken, String)] {
        &self.entries
    }
}

/// Expand `pattern` against `ctx`.
///
/// `%(default)s` is first replaced by the default template, one level deep. The result is then
/// scanned once from left to right; each placeholder with a value in `ctx` is replaced and the
/// replacement text is never scanned again. Placeholders without a value are left as-is.
///
/// # Errors
///
/// - [`LoadError::InvalidName`] if `pattern` is empty.
/// - [`LoadError::EmptyName`] if the expansion is empty.
pub fn expand_table_name(pattern: &str, ctx: &NameContext) -> LoadResult<String> {
    if pattern.is_empty() {
        return Err(LoadError::InvalidName {
            message: "table name template must not be empty".to_string(),
        });
    }

    let with_default = pattern.replace(
        TemplateToken::Default.placeholder(),
        ctx.default_template(),
    );

    let mut out = String::with_capacity(with_default.len());
    let mut rest = with_default.as_str();
    while !rest.is_empty() {
        let hit = if rest.starts_with("%(") {
            ctx.entries()
                .iter()
                .find(|(token, _)| rest.starts_with(token.placeholder()))
        } else {
            None
        };

        match hit {
            Some((token, value)) => {
                out.push_str(value);
                rest = &rest[token.placeholder().len()..];
            }
            None => {
                let ch_len = rest.chars().next().map_or(1, char::len_utf8);
                out.push_str(&rest[..ch_len]);
                rest = &rest[ch_len..];
            }
        }
    }

    if out.is_empty() {
        return Err(LoadError::EmptyName {
            template: pattern.to_string(),
        });
    }
    Ok(out)
}
