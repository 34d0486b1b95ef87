//! Export configuration and per-path page rule resolution.

use std::fs;
use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Top-level YAML configuration file.
#[derive(Deserialize, Debug, Clone)]
pub struct ExportConfig {
    pub api_key: String,
    /// Overrides the Dynalist API endpoint.
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub pages: Vec<PageConfig>,
}

impl ExportConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }
}

/// Formatting rule for the documents whose path matches `name`.
///
/// Every setting is optional; `None` means "not specified by this rule",
/// which is distinct from an explicit `false` or `0`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PageConfig {
    pub name: String,
    pub heading_depth: Option<usize>,
    pub ignore: Option<bool>,
    pub include_notes: Option<bool>,
    pub obsidian_internal_links: Option<bool>,
}

impl PageConfig {
    /// Overlays the settings `other` specifies onto `self`.
    pub fn merge(&mut self, other: &PageConfig) {
        self.name.clone_from(&other.name);
        self.heading_depth = other.heading_depth.or(self.heading_depth);
        self.ignore = other.ignore.or(self.ignore);
        self.include_notes = other.include_notes.or(self.include_notes);
        self.obsidian_internal_links = other.obsidian_internal_links.or(self.obsidian_internal_links);
    }

    pub fn is_ignored(&self) -> bool {
        self.ignore.unwrap_or(false)
    }
}

struct PageRule {
    config: PageConfig,
    matcher: GlobMatcher,
}

/// Page rules compiled for matching, kept in declaration order.
pub struct PageRules {
    rules: Vec<PageRule>,
}

impl PageRules {
    pub fn new(configs: Vec<PageConfig>) -> Result<Self> {
        let rules = configs
            .into_iter()
            .map(|config| -> Result<PageRule> {
                // `*` must also match across `/`, like fnmatch.
                let glob = GlobBuilder::new(&fnmatch_glob(&config.name))
                    .literal_separator(false)
                    .backslash_escape(false)
                    .build()
                    .map_err(|e| Error::Config(format!("invalid page pattern '{}': {e}", config.name)))?;
                Ok(PageRule {
                    matcher: glob.compile_matcher(),
                    config,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Merges every rule matching `path`; later rules win field by field.
    ///
    /// Returns `None` when no rule matches at all.
    pub fn resolve(&self, path: &str) -> Option<PageConfig> {
        let mut resolved: Option<PageConfig> = None;
        for rule in self.rules.iter().filter(|r| r.matcher.is_match(path)) {
            debug!("page rule '{}' matches '{}'", rule.config.name, path);
            match resolved.as_mut() {
                Some(acc) => acc.merge(&rule.config),
                None => resolved = Some(rule.config.clone()),
            }
        }
        resolved
    }
}

/// Rewrites an fnmatch pattern for globset: only `*`, `?` and `[...]` are
/// special, so braces outside a class become literal.
fn fnmatch_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len());
    // Characters consumed since the opening `[`; `None` outside a class.
    let mut class_len: Option<usize> = None;
    for c in pattern.chars() {
        match class_len {
            Some(len) => {
                glob.push(c);
                let leading = len == 0 || (len == 1 && glob.ends_with("!]"));
                class_len = if c == ']' && !leading { None } else { Some(len + 1) };
            }
            None => match c {
                '[' => {
                    glob.push(c);
                    class_len = Some(0);
                }
                '{' => glob.push_str("[{]"),
                '}' => glob.push_str("[}]"),
                _ => glob.push(c),
            },
        }
    }
    glob
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> PageConfig {
        PageConfig {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn fields_merge_from_different_rules() {
        let rules = PageRules::new(vec![
            PageConfig {
                heading_depth: Some(2),
                ..rule("*")
            },
            PageConfig {
                ignore: Some(true),
                ..rule("foo/*")
            },
        ])
        .unwrap();

        let config = rules.resolve("foo/bar").unwrap();
        assert_eq!(config.heading_depth, Some(2));
        assert_eq!(config.ignore, Some(true));
        assert_eq!(config.include_notes, None);

        let config = rules.resolve("other").unwrap();
        assert_eq!(config.heading_depth, Some(2));
        assert_eq!(config.ignore, None);
    }

    #[test]
    fn later_rule_wins_per_field() {
        let rules = PageRules::new(vec![
            PageConfig {
                heading_depth: Some(2),
                include_notes: Some(true),
                ..rule("*")
            },
            PageConfig {
                heading_depth: Some(4),
                ..rule("*")
            },
        ])
        .unwrap();

        let config = rules.resolve("anything").unwrap();
        assert_eq!(config.heading_depth, Some(4));
        assert_eq!(config.include_notes, Some(true));
    }

    #[test]
    fn explicit_false_overrides_earlier_true() {
        let rules = PageRules::new(vec![
            PageConfig {
                ignore: Some(true),
                ..rule("*")
            },
            PageConfig {
                ignore: Some(false),
                ..rule("Keep/*")
            },
        ])
        .unwrap();

        assert!(rules.resolve("Drop/x").unwrap().is_ignored());
        assert!(!rules.resolve("Keep/x").unwrap().is_ignored());
    }

    #[test]
    fn no_match_is_distinct_from_empty_config() {
        let rules = PageRules::new(vec![rule("Journal/*")]).unwrap();

        assert_eq!(rules.resolve("Work/plan"), None);
        let matched = rules.resolve("Journal/2024").unwrap();
        assert_eq!(matched.heading_depth, None);
        assert_eq!(matched.ignore, None);
    }

    #[test]
    fn glob_semantics() {
        let rules = PageRules::new(vec![rule("a?c"), rule("[xy]*")]).unwrap();
        assert!(rules.resolve("abc").is_some());
        assert!(rules.resolve("abbc").is_none());
        assert!(rules.resolve("x/deep/path").is_some());
        assert!(rules.resolve("zeta").is_none());

        let braces = PageRules::new(vec![rule("Notes {2024}"), rule("{a,b}")]).unwrap();
        assert!(braces.resolve("Notes {2024}").is_some());
        assert!(braces.resolve("Notes 2024").is_none());
        assert!(braces.resolve("{a,b}").is_some());
        assert!(braces.resolve("a").is_none());

        let backslash = PageRules::new(vec![rule(r"Inbox\*")]).unwrap();
        assert!(backslash.resolve(r"Inbox\today").is_some());
        assert!(backslash.resolve("Inbox*").is_none());

        let classes = PageRules::new(vec![rule("[{]x"), rule("[]]y"), rule("[!a]z")]).unwrap();
        assert!(classes.resolve("{x").is_some());
        assert!(classes.resolve("]y").is_some());
        assert!(classes.resolve("bz").is_some());
        assert!(classes.resolve("az").is_none());

        let star = PageRules::new(vec![rule("*")]).unwrap();
        assert!(star.resolve("").is_some());
        assert!(star.resolve("Folder/Sub/Doc").is_some());
    }

    #[test]
    fn malformed_glob_is_config_error() {
        let err = PageRules::new(vec![rule("[unclosed")]).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn parses_yaml() {
        let config = ExportConfig::from_yaml(
            "api_key: secret\n\
             pages:\n\
             - name: '*'\n\
             \x20 heading_depth: 3\n\
             \x20 include_notes: false\n\
             - name: Archive/*\n\
             \x20 ignore: true\n",
        )
        .unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.api_base, None);
        assert_eq!(config.pages.len(), 2);
        assert_eq!(config.pages[0].heading_depth, Some(3));
        assert_eq!(config.pages[0].include_notes, Some(false));
        assert_eq!(config.pages[0].ignore, None);
        assert_eq!(config.pages[1].ignore, Some(true));
    }

    #[test]
    fn unknown_page_key_is_rejected() {
        let err = ExportConfig::from_yaml("api_key: k\npages:\n- name: '*'\n  headings: 2\n");
        assert!(matches!(err, Err(Error::Yaml(_))));
    }
}
