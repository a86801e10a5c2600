//! Chat prompt templates
//!
//! A [`ChatTemplate`] is an ordered list of message templates and message
//! placeholders. Formatting substitutes `{name}` references from
//! [`PromptVariables`] (FString style: `{{` and `}}` produce literal braces)
//! and splices placeholder histories in place.

use crate::protocol::{Message, MessageRole};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

/// Errors raised while formatting a template
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    /// A `{name}` reference had no matching variable
    #[error("missing template variable '{0}'")]
    MissingVariable(String),

    /// A required message placeholder had no history supplied
    #[error("missing messages for placeholder '{0}'")]
    MissingPlaceholder(String),

    /// The template text is not valid FString syntax
    #[error("malformed template at byte {position}: {message}")]
    Malformed { position: usize, message: String },
}

/// Values available to a template
#[derive(Debug, Clone, Default)]
pub struct PromptVariables {
    text: HashMap<String, String>,
    messages: HashMap<String, Vec<Message>>,
}

impl PromptVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a text variable
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.text.insert(name.into(), value.into());
        self
    }

    /// Bind a message history for a placeholder
    pub fn with_messages(mut self, name: impl Into<String>, messages: Vec<Message>) -> Self {
        self.messages.insert(name.into(), messages);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str)
    }
}

/// One entry of a chat template
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateEntry {
    /// A message whose content is formatted
    Message { role: MessageRole, template: String },
    /// A slot filled with a caller-supplied message history
    Placeholder { name: String, optional: bool },
}

/// Ordered message templates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatTemplate {
    entries: Vec<TemplateEntry>,
}

impl ChatTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system(self, template: impl Into<String>) -> Self {
        self.message(MessageRole::System, template)
    }

    pub fn user(self, template: impl Into<String>) -> Self {
        self.message(MessageRole::User, template)
    }

    pub fn assistant(self, template: impl Into<String>) -> Self {
        self.message(MessageRole::Assistant, template)
    }

    /// Append a message template with an explicit role
    pub fn message(mut self, role: MessageRole, template: impl Into<String>) -> Self {
        self.entries.push(TemplateEntry::Message {
            role,
            template: template.into(),
        });
        self
    }

    /// Append a message placeholder; an optional one may be left unbound
    pub fn placeholder(mut self, name: impl Into<String>, optional: bool) -> Self {
        self.entries.push(TemplateEntry::Placeholder {
            name: name.into(),
            optional,
        });
        self
    }

    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    /// Render every entry into concrete messages
    pub fn format(&self, variables: &PromptVariables) -> Result<Vec<Message>, PromptError> {
        let mut messages = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            match entry {
                TemplateEntry::Message { role, template } => {
                    let content = format_fstring(template, variables)?;
                    messages.push(Message::new(*role, content));
                }
                TemplateEntry::Placeholder { name, optional } => {
                    match variables.messages.get(name) {
                        Some(history) => messages.extend(history.iter().cloned()),
                        None if *optional => {}
                        None => return Err(PromptError::MissingPlaceholder(name.clone())),
                    }
                }
            }
        }

        Ok(messages)
    }
}

/// `{{`, `}}`, `{name}`, or a stray brace, tried in that order
static FSTRING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").expect("valid fstring pattern")
});

/// Substitute `{name}` references in `template`
pub fn format_fstring(template: &str, variables: &PromptVariables) -> Result<String, PromptError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for cap in FSTRING_PATTERN.captures_iter(template) {
        let Some(full) = cap.get(0) else { continue };
        out.push_str(&template[last..full.start()]);
        last = full.end();

        match (full.as_str(), cap.get(1)) {
            ("{{", _) => out.push('{'),
            ("}}", _) => out.push('}'),
            (_, Some(name)) => {
                let name = name.as_str().trim();
                if name.is_empty() {
                    return Err(PromptError::Malformed {
                        position: full.start(),
                        message: "empty variable name".to_string(),
                    });
                }
                let value = variables
                    .get(name)
                    .ok_or_else(|| PromptError::MissingVariable(name.to_string()))?;
                out.push_str(value);
            }
            ("{", None) => {
                return Err(PromptError::Malformed {
                    position: full.start(),
                    message: "unclosed '{'".to_string(),
                });
            }
            _ => {
                return Err(PromptError::Malformed {
                    position: full.start(),
                    message: "single '}' outside a variable".to_string(),
                });
            }
        }
    }

    out.push_str(&template[last..]);
    Ok(out)
}
