// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `$NAME` / `${NAME}` substitution for the rally config template.
//!
//! `$$` renders a literal `$`. Every placeholder must have a value.

use std::collections::HashMap;

use crate::error::TemplateError;

/// Config template shipped with the crate.
pub const RALLY_CONFIG_TEMPLATE: &str = include_str!("../resources/pytest.ini");

/// Template variable holding the rally config directory.
pub const CONFIG_DIR_VAR: &str = "CONFIG_DIR";

/// Template variable holding the track repository path.
pub const TRACK_REPO_VAR: &str = "TRACK_REPO";

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Substitute every placeholder in `template` from `vars`.
pub fn render(template: &str, vars: &HashMap<&str, &str>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let name = match chars.peek().copied() {
            Some((_, '$')) => {
                chars.next();
                out.push('$');
                continue;
            }
            Some((_, '{')) => {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, ch)) if is_ident_char(ch) => name.push(ch),
                        _ => return Err(TemplateError::InvalidPlaceholder { offset }),
                    }
                }
                if !name.starts_with(is_ident_start) {
                    return Err(TemplateError::InvalidPlaceholder { offset });
                }
                name
            }
            Some((_, ch)) if is_ident_start(ch) => {
                let mut name = String::new();
                while let Some((_, ch)) = chars.peek().copied() {
                    if !is_ident_char(ch) {
                        break;
                    }
                    name.push(ch);
                    chars.next();
                }
                name
            }
            _ => return Err(TemplateError::InvalidPlaceholder { offset }),
        };

        let value = vars
            .get(name.as_str())
            .ok_or(TemplateError::MissingVariable { name })?;
        out.push_str(value);
    }

    Ok(out)
}
