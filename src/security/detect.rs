//! Injection detection and credential masking.

use crate::security::catalog::{default_catalog, Category, PatternCatalog, MASKED_KEY_TOKEN};
use std::fmt;
use std::ops::Range;

/// The first injection rule that matched a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionMatch {
    /// Category of the matching rule.
    pub category: Category,
    /// Source text of the matching rule.
    pub rule: String,
    /// The text the rule matched. Caller text: mask before logging.
    pub matched: String,
}

impl PatternCatalog {
    /// Scans `text` with the injection rules in order and returns the first hit.
    ///
    /// Which category matched depends on rule order, so callers inspect the
    /// returned match rather than assuming one.
    #[must_use]
    pub fn detect_injection(&self, text: &str) -> Option<InjectionMatch> {
        if text.is_empty() {
            return None;
        }
        self.injection_rules().iter().find_map(|rule| {
            rule.regex().find(text).map(|m| InjectionMatch {
                category: rule.category(),
                rule: rule.as_str().to_string(),
                matched: m.as_str().to_string(),
            })
        })
    }

    /// Replaces every credential-shaped span in `text` with `[MASKED_KEY]`.
    ///
    /// Spans are collected from every rule in priority order and overlapping
    /// spans are merged, so one token covers a region two rules both claimed.
    /// A merged span can swallow a scheme word: `Authorization: Bearer sk-...`
    /// becomes `Authorization: [MASKED_KEY]`.
    /// Masked text contains no credential shapes: masking twice equals masking once.
    #[must_use]
    pub fn mask_credentials(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut claimed: Vec<Range<usize>> = Vec::new();
        for rule in self.credential_rules() {
            for m in rule.regex().find_iter(text) {
                let mut span = m.range();
                claimed.retain(|c| {
                    let overlaps = c.start < span.end && span.start < c.end;
                    if overlaps {
                        span = span.start.min(c.start)..span.end.max(c.end);
                    }
                    !overlaps
                });
                claimed.push(span);
            }
        }

        if claimed.is_empty() {
            return text.to_string();
        }
        claimed.sort_by_key(|r| r.start);

        let mut masked = String::with_capacity(text.len());
        let mut cursor = 0;
        for span in claimed {
            masked.push_str(&text[cursor..span.start]);
            masked.push_str(MASKED_KEY_TOKEN);
            cursor = span.end;
        }
        masked.push_str(&text[cursor..]);
        masked
    }
}

/// Detects prompt injection with the built-in catalog.
///
/// Returns `None` for empty text.
#[must_use]
pub fn detect_injection(text: &str) -> Option<InjectionMatch> {
    default_catalog().detect_injection(text)
}

/// Masks API keys and tokens with the built-in catalog.
#[must_use]
pub fn mask_api_keys(text: &str) -> String {
    default_catalog().mask_credentials(text)
}

/// Display wrapper that masks credentials when formatted.
///
/// Use it for any caller-provided value that ends up in a tracing field:
///
/// ```rust
/// use agent_gate::security::Masked;
///
/// let line = format!("{}", Masked("curl -H 'Authorization: Bearer abc123'"));
/// assert!(line.contains("[MASKED_KEY]"));
/// ```
pub struct Masked<T>(pub T);

impl<T: fmt::Display> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&mask_api_keys(&self.0.to_string()))
    }
}

impl<T: fmt::Display> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", mask_api_keys(&self.0.to_string()))
    }
}
