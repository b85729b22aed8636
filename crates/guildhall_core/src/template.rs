//! Positional string templates.
//!
//! Supports `{}` (automatic numbering), `{N}` (explicit index) and `{{`/`}}`
//! escapes. Automatic and explicit numbering cannot be mixed in one template.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Template rendering failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Placeholder index has no matching argument.
    MissingArgument { index: usize, provided: usize },
    /// Template text cannot be parsed.
    Malformed(String),
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingArgument { index, provided } => write!(
                f,
                "template placeholder {index} has no argument ({provided} provided)"
            ),
            Self::Malformed(message) => write!(f, "malformed template: {message}"),
        }
    }
}

impl Error for TemplateError {}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Numbering {
    Unknown,
    Automatic,
    Explicit,
}

/// Substitutes positional `args` into `template`.
///
/// Extra arguments are ignored.
pub fn format_positional<S: AsRef<str>>(template: &str, args: &[S]) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut numbering = Numbering::Unknown;
    let mut next_auto = 0usize;

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                output.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                output.push('}');
            }
            '}' => {
                return Err(TemplateError::Malformed(
                    "single `}` encountered in template".to_string(),
                ));
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(inner) => field.push(inner),
                        None => {
                            return Err(TemplateError::Malformed(
                                "unclosed `{` in template".to_string(),
                            ));
                        }
                    }
                }

                let index = if field.is_empty() {
                    if numbering == Numbering::Explicit {
                        return Err(TemplateError::Malformed(
                            "cannot switch from explicit to automatic numbering".to_string(),
                        ));
                    }
                    numbering = Numbering::Automatic;
                    next_auto += 1;
                    next_auto - 1
                } else {
                    let parsed = field.parse::<usize>().map_err(|_| {
                        TemplateError::Malformed(format!("unsupported placeholder `{{{field}}}`"))
                    })?;
                    if numbering == Numbering::Automatic {
                        return Err(TemplateError::Malformed(
                            "cannot switch from automatic to explicit numbering".to_string(),
                        ));
                    }
                    numbering = Numbering::Explicit;
                    parsed
                };

                let value = args.get(index).ok_or(TemplateError::MissingArgument {
                    index,
                    provided: args.len(),
                })?;
                output.push_str(value.as_ref());
            }
            other => output.push(other),
        }
    }

    Ok(output)
}
