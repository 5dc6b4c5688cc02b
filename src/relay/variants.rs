//! Upstream URL building and title-variant expansion.
//!
//! Expansion is a pure function of the residual path and the substitution
//! table. The fetch orchestrator only ever sees the resulting URL list.

use crate::config::schema::Substitution;

/// Builds upstream URLs from residual paths.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: String,
    substitutions: Vec<Substitution>,
}

impl UrlBuilder {
    pub fn new(base: impl Into<String>, substitutions: Vec<Substitution>) -> Self {
        Self {
            base: base.into(),
            substitutions,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Single target URL for `residual`, no variants.
    pub fn target(&self, residual: &str) -> String {
        format!("{}{}", self.base, residual)
    }

    /// Ordered candidate URLs; the unmodified residual always comes first.
    pub fn candidates(&self, residual: &str) -> Vec<String> {
        expand_variants(residual, &self.substitutions)
            .iter()
            .map(|variant| self.target(variant))
            .collect()
    }
}

/// Expand `residual` into its candidate spellings.
///
/// The original comes first, then one candidate per substitution that both
/// matches and yields a spelling not already listed, in table order.
pub fn expand_variants(residual: &str, table: &[Substitution]) -> Vec<String> {
    let mut variants = vec![residual.to_string()];
    for substitution in table {
        if let Some(variant) = apply(substitution, residual) {
            if !variants.contains(&variant) {
                variants.push(variant);
            }
        }
    }
    variants
}

/// Replace every non-overlapping occurrence of the pattern, or `None` when
/// it does not occur.
pub fn apply(substitution: &Substitution, input: &str) -> Option<String> {
    let pattern = substitution.pattern.as_str();
    if pattern.is_empty() {
        return None;
    }

    // ASCII lowering keeps byte offsets aligned with `input`.
    let (haystack, needle) = if substitution.ignore_case {
        (input.to_ascii_lowercase(), pattern.to_ascii_lowercase())
    } else {
        (input.to_string(), pattern.to_string())
    };

    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for (idx, _) in haystack.match_indices(needle.as_str()) {
        out.push_str(&input[last..idx]);
        out.push_str(&substitution.replacement);
        last = idx + pattern.len();
    }
    if last == 0 {
        return None;
    }
    out.push_str(&input[last..]);
    Some(out)
}
