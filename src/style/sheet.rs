use std::{
    collections::BTreeMap,
    path::Path,
    sync::OnceLock,
};

use regex::Regex;

use crate::foundation::error::{CoverError, CoverResult, ResourceKind};

/// Selector carrying the shared paragraph rules.
pub const BASE_SELECTOR: &str = ".text-block p";

/// Number of `p.lineN` override selectors recognized by the parser.
pub const LINE_SELECTOR_COUNT: usize = 3;

/// Raw property declarations of one rule block, keyed by property name.
///
/// Values are kept verbatim (trimmed); no type coercion happens at parse time.
pub type StyleRule = BTreeMap<String, String>;

/// The four rule sets a cover stylesheet can carry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleSheet {
    /// Rules from `.text-block p`.
    pub base: StyleRule,
    /// Rules from `.text-block p.line1` .. `.text-block p.line3`.
    pub lines: [StyleRule; LINE_SELECTOR_COUNT],
}

/// Cascaded style for one text line: `base` overlaid with its `lineN` rules.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectiveLineStyle {
    props: StyleRule,
}

impl EffectiveLineStyle {
    /// Raw value for `property`, if set.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.props.get(property).map(String::as_str)
    }

    /// All cascaded declarations.
    pub fn props(&self) -> &StyleRule {
        &self.props
    }

    /// Consume into the underlying map.
    pub fn into_props(self) -> StyleRule {
        self.props
    }
}

impl StyleSheet {
    /// Read and parse a stylesheet file.
    ///
    /// Only an unreadable file is an error; any text, including an empty one,
    /// parses successfully.
    pub fn from_path(path: impl AsRef<Path>) -> CoverResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            tracing::debug!(path = %path.display(), %err, "stylesheet read failed");
            CoverError::not_found(ResourceKind::Stylesheet, path)
        })?;
        Ok(Self::parse(&text))
    }

    /// Parse stylesheet text into the four recognized rule sets.
    ///
    /// Comments are stripped first and selectors are matched after trimming their
    /// ends only. Blocks with any other selector are ignored.
    pub fn parse(text: &str) -> Self {
        let mut sheet = Self::default();
        let cleaned = strip_comments(text);

        for caps in block_regex().captures_iter(&cleaned) {
            let selector = caps[1].trim();
            let Some(rule) = sheet.rule_for_selector_mut(selector) else {
                tracing::trace!(selector = %selector, "skipping unrecognized selector");
                continue;
            };
            for (name, value) in parse_declarations(&caps[2]) {
                rule.insert(name, value);
            }
        }

        sheet
    }

    /// Rule set for 1-based `line`, or `None` when no override selector exists for it.
    pub fn line(&self, line: usize) -> Option<&StyleRule> {
        line.checked_sub(1).and_then(|idx| self.lines.get(idx))
    }

    /// Cascade `base` with the `line{line_number}` overrides.
    ///
    /// Lines without a dedicated selector (0, 4 and up) get `base` alone.
    pub fn resolve(&self, line_number: usize) -> EffectiveLineStyle {
        let mut props = self.base.clone();
        if let Some(overrides) = self.line(line_number) {
            for (k, v) in overrides {
                props.insert(k.clone(), v.clone());
            }
        }
        EffectiveLineStyle { props }
    }

    /// True when no rule set carries any declaration.
    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.lines.iter().all(BTreeMap::is_empty)
    }

    fn rule_for_selector_mut(&mut self, selector: &str) -> Option<&mut StyleRule> {
        if selector == BASE_SELECTOR {
            return Some(&mut self.base);
        }
        let suffix = selector.strip_prefix(BASE_SELECTOR)?.strip_prefix(".line")?;
        if !suffix.starts_with(|c: char| c.is_ascii_digit() && c != '0') {
            return None;
        }
        let n: usize = suffix.parse().ok()?;
        self.lines.get_mut(n - 1)
    }
}

/// Remove every `/* ... */` span (non-greedy, may span lines).
pub fn strip_comments(text: &str) -> String {
    static COMMENT: OnceLock<Regex> = OnceLock::new();
    let re = COMMENT.get_or_init(|| {
        Regex::new(r"(?s)/\*.*?\*/").expect("comment regex is valid")
    });
    re.replace_all(text, "").into_owned()
}

fn block_regex() -> &'static Regex {
    static BLOCK: OnceLock<Regex> = OnceLock::new();
    BLOCK.get_or_init(|| {
        Regex::new(r"([^{}]+)\{([^}]*)\}").expect("block regex is valid")
    })
}

/// Split a block body into `(name, value)` pairs, in source order.
///
/// Each declaration splits on its first `:`; pairs with an empty side are dropped.
fn parse_declarations(body: &str) -> impl Iterator<Item = (String, String)> + '_ {
    body.split(';').filter_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() || value.is_empty() {
            return None;
        }
        Some((name.to_string(), value.to_string()))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/style/sheet.rs"]
mod tests;
