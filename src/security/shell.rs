//! Shell metacharacter escaping.
//!
//! Escaping is a secondary defense only. Arguments handed to external
//! processes never go through a shell (see [`crate::invocation`]); this
//! helper covers text that may later be echoed into a shell outside our control.

/// Escapes shell metacharacters with a backslash and turns line breaks into spaces.
///
/// Runs in a single pass, so an inserted backslash is never escaped again.
#[must_use]
pub fn escape_for_shell(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '`' | '$' | '\\' | '"' | '\'' | ';' | '&' | '|' | '<' | '>' | '(' | ')' | '{'
            | '}' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' | '\r' => escaped.push(' '),
            _ => escaped.push(c),
        }
    }
    escaped
}
