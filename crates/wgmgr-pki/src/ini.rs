//! Section-based `Key = Value` documents.
//!
//! Both the persisted PKI file and the rendered WireGuard/systemd configs use
//! this format. Keys keep their literal casing and sections and entries keep
//! the order in which they were added, so the output diffs cleanly.

use std::fmt;

use crate::error::{PkiError, Result};

/// A named section with ordered entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    line: usize,
    entries: Vec<(String, String)>,
}

impl Section {
    /// Creates an empty section.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            line: 0,
            entries: Vec::new(),
        }
    }

    /// Appends an entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Appends an entry if `value` is present.
    #[must_use]
    pub fn with_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Appends an entry in place.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Returns the section name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the line of the section header, or 0 if built in memory.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Looks up a value by exact key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Looks up a value that must be present.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| {
            PkiError::parse(
                self.line,
                format!("missing {key} in [{}] section", self.name),
            )
        })
    }

    /// Iterates over the entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Line breaks inside a value are written as `\n` and `\r` so an entry
/// always stays on its own line.
impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.name)?;
        for (key, value) in &self.entries {
            if value.is_empty() {
                writeln!(f, "{key} =")?;
            } else if value.contains(['\n', '\r']) {
                let escaped = value.replace('\r', "\\r").replace('\n', "\\n");
                writeln!(f, "{key} = {escaped}")?;
            } else {
                writeln!(f, "{key} = {value}")?;
            }
        }
        Ok(())
    }
}

/// An ordered list of sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a section.
    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Returns the sections in order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Parses a document.
    ///
    /// Blank lines and lines starting with `#` or `;` are skipped. Section
    /// names and keys must be unique within their scope.
    pub fn parse(input: &str) -> Result<Self> {
        let mut sections: Vec<Section> = Vec::new();

        for (line_num, line) in input.lines().enumerate() {
            let line = line.trim();
            let line_number = line_num + 1;

            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = &line[1..line.len() - 1];
                if name.is_empty() {
                    return Err(PkiError::parse(line_number, "empty section name"));
                }
                if sections.iter().any(|s| s.name == name) {
                    return Err(PkiError::parse(
                        line_number,
                        format!("duplicate section: {name}"),
                    ));
                }
                let mut section = Section::new(name);
                section.line = line_number;
                sections.push(section);
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(PkiError::parse(
                    line_number,
                    format!("invalid line format: {line}"),
                ));
            };

            let key = key.trim();
            let value = value.trim();

            let Some(section) = sections.last_mut() else {
                return Err(PkiError::parse(
                    line_number,
                    "key-value pair outside of section",
                ));
            };
            if key.is_empty() {
                return Err(PkiError::parse(line_number, "empty key"));
            }
            if section.get(key).is_some() {
                return Err(PkiError::parse(
                    line_number,
                    format!("duplicate key {key} in [{}] section", section.name),
                ));
            }
            section.push(key, value);
        }

        Ok(Self { sections })
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, section) in self.sections.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{section}")?;
        }
        Ok(())
    }
}

impl FromIterator<Section> for Document {
    fn from_iter<I: IntoIterator<Item = Section>>(iter: I) -> Self {
        Self {
            sections: iter.into_iter().collect(),
        }
    }
}
