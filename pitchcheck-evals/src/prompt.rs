// Copyright 2025 Pitchcheck Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Prompt templates with a single `{data_payload}` slot

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the only substitution slot
pub const PAYLOAD_SLOT: &str = "data_payload";

const BUILTIN_TEMPLATE: &str = include_str!("../prompts/real_estate_analysis_prompt.txt");

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read prompt template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown template slot {{{0}}}")]
    UnknownSlot(String),

    #[error("Unbalanced brace at byte {0}")]
    UnbalancedBrace(usize),

    #[error("Template has no {{data_payload}} slot")]
    MissingSlot,

    #[error("Failed to serialize payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// A prompt template
///
/// `{data_payload}` is replaced by the pretty-printed JSON payload. Literal
/// braces are written `{{` and `}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    /// Parse and validate a template
    pub fn new(text: impl Into<String>) -> Result<Self, TemplateError> {
        let template = Self { text: text.into() };
        // Rendering can then only fail on payload serialization.
        let (_, slots) = template.substitute("")?;
        if slots == 0 {
            return Err(TemplateError::MissingSlot);
        }
        Ok(template)
    }

    /// Load a template from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(text)
    }

    /// The real-estate analysis template shipped with the crate
    pub fn builtin() -> Self {
        Self {
            text: BUILTIN_TEMPLATE.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Fill the slot with `payload` as 2-space indented JSON
    pub fn render<T: Serialize + ?Sized>(&self, payload: &T) -> Result<String, TemplateError> {
        let json = serde_json::to_string_pretty(payload)?;
        self.substitute(&json).map(|(rendered, _)| rendered)
    }

    fn substitute(&self, payload: &str) -> Result<(String, usize), TemplateError> {
        let text = self.text.as_str();
        let mut out = String::with_capacity(text.len() + payload.len());
        let mut rest = text;
        let mut slots = 0;

        while let Some(pos) = rest.find(['{', '}']) {
            out.push_str(&rest[..pos]);
            let offset = text.len() - rest.len() + pos;
            let tail = &rest[pos..];

            if tail.starts_with("{{") {
                out.push('{');
                rest = &tail[2..];
            } else if tail.starts_with("}}") {
                out.push('}');
                rest = &tail[2..];
            } else if tail.starts_with('}') {
                return Err(TemplateError::UnbalancedBrace(offset));
            } else {
                let close = tail.find('}').ok_or(TemplateError::UnbalancedBrace(offset))?;
                let slot = &tail[1..close];
                if slot != PAYLOAD_SLOT {
                    return Err(TemplateError::UnknownSlot(slot.to_string()));
                }
                out.push_str(payload);
                slots += 1;
                rest = &tail[close + 1..];
            }
        }

        out.push_str(rest);
        Ok((out, slots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_pretty_json() {
        let template = PromptTemplate::new("Data:\n{data_payload}\nEnd").unwrap();
        let rendered = template.render(&json!({"sqft": 750})).unwrap();
        assert_eq!(rendered, "Data:\n{\n  \"sqft\": 750\n}\nEnd");
    }

    #[test]
    fn test_escaped_braces() {
        let template = PromptTemplate::new("Format: {{\"bullets\": []}} {data_payload}").unwrap();
        let rendered = template.render(&json!(1)).unwrap();
        assert_eq!(rendered, "Format: {\"bullets\": []} 1");
    }

    #[test]
    fn test_unknown_slot_rejected() {
        let err = PromptTemplate::new("{data_payload} {other}").unwrap_err();
        assert!(matches!(err, TemplateError::UnknownSlot(slot) if slot == "other"));
    }

    #[test]
    fn test_unbalanced_braces_rejected() {
        assert!(matches!(
            PromptTemplate::new("{data_payload"),
            Err(TemplateError::UnbalancedBrace(0))
        ));
        assert!(matches!(
            PromptTemplate::new("{data_payload} }"),
            Err(TemplateError::UnbalancedBrace(15))
        ));
    }

    #[test]
    fn test_missing_slot_rejected() {
        assert!(matches!(
            PromptTemplate::new("no slot here"),
            Err(TemplateError::MissingSlot)
        ));
    }

    #[test]
    fn test_builtin_template_is_valid() {
        let builtin = PromptTemplate::builtin();
        assert!(PromptTemplate::new(builtin.as_str()).is_ok());

        let rendered = builtin.render(&json!({"unitData": {"sqft": 1200}})).unwrap();
        assert!(rendered.contains("\"sqft\": 1200"));
        assert!(!rendered.contains("{data_payload}"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = PromptTemplate::from_file("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, TemplateError::Read { .. }));
    }
}
