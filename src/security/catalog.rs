//! Injection and credential signature catalogs.
//!
//! A [`PatternCatalog`] is compiled once and then only read. The crate keeps a
//! lazily built process default for the free functions, but a [`Gate`](crate::gate::Gate)
//! can carry any catalog, which is how tests substitute their own rules.

use crate::error::GateError;
use regex::{Regex, RegexBuilder};
use std::fmt;
use std::sync::OnceLock;

/// Replacement token for filtered injection text.
pub const FILTERED_TOKEN: &str = "[FILTERED]";

/// Replacement token for masked credentials.
pub const MASKED_KEY_TOKEN: &str = "[MASKED_KEY]";

/// Category label attached to every rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// "ignore/disregard/forget previous instructions"
    InstructionOverride,
    /// "show your system prompt", "what is your system prompt"
    PromptExtraction,
    /// "you are now a", "pretend to be", "act as", "roleplay as"
    RoleManipulation,
    /// "DAN mode", "developer mode", "jailbreak"
    Jailbreak,
    /// Fenced system blocks, `[SYSTEM]`, chat-turn tokens
    DelimiterInjection,
    /// Provider API key shapes
    ProviderToken,
    /// `Bearer <token>` headers
    BearerToken,
}

impl Category {
    /// Returns the kebab-case label used in logs and error messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::InstructionOverride => "instruction-override",
            Self::PromptExtraction => "prompt-extraction",
            Self::RoleManipulation => "role-manipulation",
            Self::Jailbreak => "jailbreak",
            Self::DelimiterInjection => "delimiter-injection",
            Self::ProviderToken => "provider-token",
            Self::BearerToken => "bearer-token",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A compiled pattern with its category.
#[derive(Debug, Clone)]
pub struct PatternRule {
    category: Category,
    pattern: Regex,
}

impl PatternRule {
    /// Compiles a rule.
    ///
    /// # Errors
    ///
    /// Returns a `Catalog` error if the source does not compile.
    pub fn new(category: Category, source: &str, case_insensitive: bool) -> Result<Self, GateError> {
        let pattern = RegexBuilder::new(source)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| GateError::catalog(source, e.to_string()))?;
        Ok(Self { category, pattern })
    }

    /// Returns the rule's category.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Returns the rule's source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// Returns the compiled regex.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.pattern
    }
}

/// Injection signatures in detection order. Matched case-insensitively.
pub const INJECTION_SOURCES: &[(Category, &str)] = &[
    (
        Category::InstructionOverride,
        r"ignore\s+(all\s+)?(previous|above|prior)\s+(instructions?|prompts?|rules?)",
    ),
    (
        Category::InstructionOverride,
        r"disregard\s+(all\s+)?(previous|above|prior)\s+(instructions?|prompts?|rules?)",
    ),
    (
        Category::InstructionOverride,
        r"forget\s+(all\s+)?(previous|above|prior)\s+(instructions?|prompts?|rules?)",
    ),
    (
        Category::PromptExtraction,
        r"(show|reveal|display|print|output)\s+(me\s+)?(your\s+)?(system\s+)?(prompt|instructions?)",
    ),
    (
        Category::PromptExtraction,
        r"what\s+(are|is)\s+your\s+(system\s+)?(prompt|instructions?)",
    ),
    (Category::RoleManipulation, r"you\s+are\s+now\s+a"),
    (Category::RoleManipulation, r"pretend\s+(to\s+be|you\s+are)"),
    (Category::RoleManipulation, r"act\s+as\s+(if\s+you\s+are|a)"),
    (Category::RoleManipulation, r"roleplay\s+as"),
    (Category::Jailbreak, r"DAN\s+mode"),
    (Category::Jailbreak, r"developer\s+mode"),
    (Category::Jailbreak, r"jailbreak"),
    (Category::DelimiterInjection, r"```\s*system"),
    (Category::DelimiterInjection, r"\[SYSTEM\]"),
    (Category::DelimiterInjection, r"<\|im_start\|>"),
    (Category::DelimiterInjection, r"<\|im_end\|>"),
];

/// Credential signatures in masking priority order. Matched case-sensitively;
/// the bearer scheme carries its own inline case-insensitive group.
pub const CREDENTIAL_SOURCES: &[(Category, &str)] = &[
    (Category::ProviderToken, r"sk-[a-zA-Z0-9]{20,}"),
    (Category::ProviderToken, r"ghp_[a-zA-Z0-9]{36,}"),
    (Category::ProviderToken, r"gho_[a-zA-Z0-9]{36,}"),
    (Category::ProviderToken, r"AIza[a-zA-Z0-9_-]{35}"),
    (Category::ProviderToken, r"ya29\.[a-zA-Z0-9_-]+"),
    (Category::ProviderToken, r"AKIA[A-Z0-9]{16}"),
    (Category::ProviderToken, r"xox[baprs]-[a-zA-Z0-9-]+"),
    (Category::BearerToken, r"(?i:bearer)\s+[a-zA-Z0-9._-]+"),
];

/// The two rule sets the gate scans text with.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    injection: Vec<PatternRule>,
    credentials: Vec<PatternRule>,
}

impl PatternCatalog {
    /// Compiles the built-in injection and credential signatures.
    ///
    /// # Errors
    ///
    /// Returns a `Catalog` error naming the first rule that fails to compile.
    pub fn builtin() -> Result<Self, GateError> {
        Self::from_sources(INJECTION_SOURCES, CREDENTIAL_SOURCES)
    }

    /// Compiles a catalog from explicit rule sources.
    ///
    /// Injection rules are case-insensitive, credential rules case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns a `Catalog` error naming the first rule that fails to compile.
    /// A malformed catalog is never partially built.
    pub fn from_sources(
        injection: &[(Category, &str)],
        credentials: &[(Category, &str)],
    ) -> Result<Self, GateError> {
        let injection = injection
            .iter()
            .map(|(category, source)| PatternRule::new(*category, source, true))
            .collect::<Result<Vec<_>, _>>()?;
        let credentials = credentials
            .iter()
            .map(|(category, source)| PatternRule::new(*category, source, false))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            injection,
            credentials,
        })
    }

    /// Returns the injection rules in detection order.
    #[must_use]
    pub fn injection_rules(&self) -> &[PatternRule] {
        &self.injection
    }

    /// Returns the credential rules in priority order.
    #[must_use]
    pub fn credential_rules(&self) -> &[PatternRule] {
        &self.credentials
    }
}

static DEFAULT_CATALOG: OnceLock<PatternCatalog> = OnceLock::new();

/// Returns the process-wide built-in catalog, compiling it on first use.
///
/// # Panics
///
/// Panics if a built-in rule fails to compile.
pub fn default_catalog() -> &'static PatternCatalog {
    DEFAULT_CATALOG.get_or_init(|| match PatternCatalog::builtin() {
        Ok(catalog) => catalog,
        Err(e) => panic!("built-in pattern catalog is malformed: {e}"),
    })
}
