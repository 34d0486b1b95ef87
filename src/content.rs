use std::borrow::Cow;
use std::io::Write;

use regex::{Captures, Regex};

use crate::config::PageConfig;
use crate::domain::{ContentNode, FileNode};
use crate::error::{Error, Result};
use crate::tree::{NodeIndex, traverse};

pub const DEFAULT_DOCUMENT_BASE: &str = "https://dynalist.io";

/// Rewrites `[text](<base>/d/<id>)` links to known documents as
/// `[[Title]]` / `[[Title|text]]` internal links.
pub struct LinkRewriter<'a> {
    files: &'a NodeIndex<FileNode>,
    markdown_link: Regex,
    document_link: Regex,
}

impl<'a> LinkRewriter<'a> {
    pub fn new(files: &'a NodeIndex<FileNode>, document_base: &str) -> Result<Self> {
        let base = regex::escape(document_base.trim_end_matches('/'));
        Ok(Self {
            files,
            markdown_link: Regex::new(r"\[([^\[]+)\]\(([^\)]+)\)").map_err(config_error)?,
            document_link: Regex::new(&format!("^{base}/d/([^#]+)")).map_err(config_error)?,
        })
    }

    pub fn rewrite_links<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.markdown_link
            .replace_all(text, |caps: &Captures| self.internal_link(caps))
    }

    fn internal_link(&self, caps: &Captures) -> String {
        let document = self
            .document_link
            .captures(&caps[2])
            .and_then(|url| self.files.get(&url[1]));

        match document {
            Some(document) => {
                let text = &caps[1];
                let title = &document.title;
                if text == title {
                    format!("[[{title}]]")
                } else {
                    format!("[[{title}|{text}]]")
                }
            }
            None => caps[0].to_string(),
        }
    }
}

fn config_error(e: regex::Error) -> Error {
    Error::Config(format!("invalid document link pattern: {e}"))
}

/// Renderer settings with baseline values for whatever the page rules
/// left unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub heading_depth: usize,
    pub include_notes: bool,
    pub obsidian_internal_links: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            heading_depth: 1,
            include_notes: false,
            obsidian_internal_links: false,
        }
    }
}

impl From<&PageConfig> for RenderOptions {
    fn from(config: &PageConfig) -> Self {
        let defaults = Self::default();
        Self {
            heading_depth: config.heading_depth.unwrap_or(defaults.heading_depth),
            include_notes: config.include_notes.unwrap_or(defaults.include_notes),
            obsidian_internal_links: config
                .obsidian_internal_links
                .unwrap_or(defaults.obsidian_internal_links),
        }
    }
}

/// Streams the outline under `root_id` to `out` as Markdown.
///
/// Nodes no deeper than `heading_depth` become headings, each preceded by a
/// blank line except the document's first; deeper nodes become tab-indented
/// list items. `links` is required when internal links are enabled.
pub fn render_document<W: Write>(
    nodes: &NodeIndex<ContentNode>,
    root_id: &str,
    options: &RenderOptions,
    links: Option<&LinkRewriter<'_>>,
    out: &mut W,
) -> Result<()> {
    for context in traverse(nodes, root_id) {
        let context = context?;
        let Some(node) = context.last() else {
            continue;
        };
        let depth = context.len();

        let mut content = Cow::Borrowed(node.content.as_str());
        if options.include_notes {
            if let Some(note) = node.note.as_deref().filter(|n| !n.is_empty()) {
                content = Cow::Owned(format!("{content} ({note})"));
            }
        }
        if options.obsidian_internal_links {
            let links = links.ok_or_else(|| {
                Error::Config("internal links enabled without a link rewriter".into())
            })?;
            content = Cow::Owned(links.rewrite_links(&content).into_owned());
        }

        if depth <= options.heading_depth {
            if depth > 1 {
                writeln!(out)?;
            }
            writeln!(out, "{} {content}", "#".repeat(depth))?;
        } else {
            let indent = depth - options.heading_depth - 1;
            writeln!(out, "{}- {content}", "\t".repeat(indent))?;
        }
    }
    Ok(())
}
