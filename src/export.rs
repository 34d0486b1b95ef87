//! Walks the folder tree and renders every non-ignored document.

use std::io::Write;

use tracing::{debug, info};

use crate::config::PageRules;
use crate::content::{DEFAULT_DOCUMENT_BASE, LinkRewriter, RenderOptions, render_document};
use crate::error::{Error, Result};
use crate::fs::OutputSink;
use crate::source::DocumentSource;
use crate::tree::{index_nodes, traverse};

/// Root id of every document's content outline.
pub const DOCUMENT_ROOT_ID: &str = "root";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: usize,
    pub ignored: usize,
}

pub struct Exporter<S, K> {
    source: S,
    sink: K,
    rules: PageRules,
    document_base: String,
}

impl<S: DocumentSource, K: OutputSink> Exporter<S, K> {
    pub fn new(source: S, sink: K, rules: PageRules) -> Self {
        Self {
            source,
            sink,
            rules,
            document_base: DEFAULT_DOCUMENT_BASE.to_string(),
        }
    }

    /// Host whose `/d/<id>` links are treated as internal.
    pub fn with_document_base(mut self, document_base: impl Into<String>) -> Self {
        self.document_base = document_base.into();
        self
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    pub async fn export(&mut self) -> Result<ExportSummary> {
        self.sink.prepare()?;

        let file_list = self.source.file_list().await?;
        let files = index_nodes(file_list.files);
        let links = LinkRewriter::new(&files, &self.document_base)?;
        info!("Exporting {} files", files.len());

        let mut summary = ExportSummary::default();
        for context in traverse(&files, &file_list.root_file_id) {
            let context = context?;
            let Some(file) = context.last() else {
                continue;
            };
            if !file.is_document() {
                continue;
            }

            let path = context[1..]
                .iter()
                .map(|f| f.title.as_str())
                .collect::<Vec<_>>()
                .join("/");
            let config = self
                .rules
                .resolve(&path)
                .ok_or_else(|| Error::NoPageConfig(path.clone()))?;
            if config.is_ignored() {
                debug!("ignoring {}", path);
                summary.ignored += 1;
                continue;
            }

            let document = self.source.document(&file.id).await?;
            let nodes = index_nodes(document.nodes);
            let options = RenderOptions::from(&config);

            let rendered = {
                let mut out = self.sink.open(&path)?;
                render_document(&nodes, DOCUMENT_ROOT_ID, &options, Some(&links), &mut out)
                    .and_then(|()| Ok(out.flush()?))
            };
            if let Err(err) = rendered {
                self.sink.discard(&path)?;
                return Err(err);
            }
            summary.written += 1;
        }

        info!(
            "Exported {} documents ({} ignored)",
            summary.written, summary.ignored
        );
        Ok(summary)
    }
}
