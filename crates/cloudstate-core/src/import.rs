//! Import identifier parsing
//!
//! Users import existing remote objects with a human-readable identifier
//! such as `{federation_settings_id}-{okta_idp_id}`. A naive split on the
//! first or last separator silently produces the wrong fields as soon as a
//! component contains the separator itself, so parsing here considers every
//! possible split and only accepts a unique one.

use crate::state_id::StateFields;
use std::fmt;
use thiserror::Error;

/// Default separator between import id components
pub const IMPORT_SEPARATOR: char = '-';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("import id `{id}` does not match the format {format}")]
    Malformed { id: String, format: String },

    #[error("import id `{id}` can be split {candidates} ways for the format {format}")]
    Ambiguous {
        id: String,
        format: String,
        candidates: usize,
    },

    #[error("import id component `{0}` is missing")]
    MissingComponent(String),
}

/// What a single component may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// Any non-empty text
    Free,
    /// 24 hexadecimal characters (project, organization and settings ids)
    ObjectId,
}

impl ComponentKind {
    fn accepts(&self, part: &str) -> bool {
        match self {
            ComponentKind::Free => !part.is_empty(),
            ComponentKind::ObjectId => {
                part.len() == 24 && part.bytes().all(|b| b.is_ascii_hexdigit())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportComponent {
    pub name: String,
    pub kind: ComponentKind,
}

/// Ordered components joined by a separator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFormat {
    components: Vec<ImportComponent>,
    separator: char,
}

impl ImportFormat {
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            separator: IMPORT_SEPARATOR,
        }
    }

    /// Build a format of free-text components
    pub fn of(names: &[&str]) -> Self {
        names
            .iter()
            .fold(Self::new(), |format, name| format.free(*name))
    }

    pub fn free(mut self, name: impl Into<String>) -> Self {
        self.components.push(ImportComponent {
            name: name.into(),
            kind: ComponentKind::Free,
        });
        self
    }

    pub fn object_id(mut self, name: impl Into<String>) -> Self {
        self.components.push(ImportComponent {
            name: name.into(),
            kind: ComponentKind::ObjectId,
        });
        self
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn components(&self) -> &[ImportComponent] {
        &self.components
    }

    /// Split an import id into named fields
    pub fn parse(&self, id: &str) -> Result<StateFields, ImportError> {
        let cuts: Vec<usize> = id
            .char_indices()
            .filter(|(_, c)| *c == self.separator)
            .map(|(i, _)| i)
            .collect();
        let needed = self.components.len().saturating_sub(1);

        let mut candidates = Vec::new();
        let mut chosen = Vec::with_capacity(needed);
        self.collect_splits(id, &cuts, 0, needed, &mut chosen, &mut candidates);

        match candidates.len() {
            0 => Err(ImportError::Malformed {
                id: id.to_string(),
                format: self.to_string(),
            }),
            1 => Ok(candidates.remove(0)),
            n => Err(ImportError::Ambiguous {
                id: id.to_string(),
                format: self.to_string(),
                candidates: n,
            }),
        }
    }

    fn collect_splits(
        &self,
        id: &str,
        cuts: &[usize],
        from: usize,
        remaining: usize,
        chosen: &mut Vec<usize>,
        out: &mut Vec<StateFields>,
    ) {
        if remaining == 0 {
            if let Some(fields) = self.try_split(id, chosen) {
                out.push(fields);
            }
            return;
        }
        for i in from..cuts.len() {
            if cuts.len() - i < remaining {
                break;
            }
            chosen.push(cuts[i]);
            self.collect_splits(id, cuts, i + 1, remaining - 1, chosen, out);
            chosen.pop();
        }
    }

    fn try_split(&self, id: &str, cuts: &[usize]) -> Option<StateFields> {
        let sep_len = self.separator.len_utf8();
        let mut fields = StateFields::new();
        let mut start = 0;

        for (index, component) in self.components.iter().enumerate() {
            let end = cuts.get(index).copied().unwrap_or(id.len());
            let part = &id[start..end];
            if !component.kind.accepts(part) {
                return None;
            }
            fields.insert(component.name.clone(), part.to_string());
            start = end + sep_len;
        }

        Some(fields)
    }

    /// Render an import id from named fields
    pub fn format(&self, fields: &StateFields) -> Result<String, ImportError> {
        let parts = self
            .components
            .iter()
            .map(|c| {
                fields
                    .get(&c.name)
                    .map(String::as_str)
                    .ok_or_else(|| ImportError::MissingComponent(c.name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(&self.separator.to_string()))
    }
}

impl Default for ImportFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", self.separator)?;
            }
            write!(f, "{{{}}}", component.name)?;
        }
        Ok(())
    }
}
