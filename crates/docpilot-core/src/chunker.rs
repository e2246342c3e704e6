//! Heading-aware document chunking.
//!
//! A heading is a line of one to three `#` markers, one space, then text.
//! Each heading owns the text up to the next heading line; text before the
//! first heading is filed under the document's own name. Sections are flat:
//! a `###` under a `#` becomes a sibling chunk, not a child.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::error::Result;
use crate::types::Chunk;

fn heading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^(#{1,3}) (.+)$").expect("static heading pattern"))
}

/// Final path component of `source`, used as the heading for untitled text.
pub fn document_name(source: &str) -> String {
    source.rsplit(|c: char| c == '/' || c == '\\').find(|s| !s.is_empty()).unwrap_or(source).to_string()
}

/// Split one document into chunks, in document order.
pub fn chunk_document(text: &str, source: &str) -> Vec<Chunk> {
    let name = document_name(source);
    let mut sections: Vec<(String, &str)> = Vec::new();

    let headings: Vec<_> = heading_pattern().captures_iter(text).collect();
    match headings.first() {
        None => sections.push((name.clone(), text)),
        Some(first) => {
            let first_start = first.get(0).map_or(0, |m| m.start());
            if first_start > 0 {
                sections.push((name.clone(), &text[..first_start]));
            }
            for (i, caps) in headings.iter().enumerate() {
                let (Some(line), Some(title)) = (caps.get(0), caps.get(2)) else { continue };
                let end = headings
                    .get(i + 1)
                    .and_then(|next| next.get(0))
                    .map_or(text.len(), |m| m.start());
                let title = title.as_str().trim();
                let heading = if title.is_empty() { name.clone() } else { title.to_string() };
                sections.push((heading, &text[line.end()..end]));
            }
        }
    }

    let mut chunks = Vec::with_capacity(sections.len());
    for (heading, body) in sections {
        let body = body.trim();
        if body.is_empty() {
            continue;
        }
        chunks.push(Chunk::new(source, &heading, body, chunks.len()));
    }
    chunks
}

/// Chunks produced from a directory walk plus per-file bookkeeping.
#[derive(Debug, Default)]
pub struct ChunkedCorpus {
    pub files: usize,
    pub skipped: usize,
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// File extensions (without the dot) to pick up. Empty means every file.
    pub extensions: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { extensions: vec!["md".to_string()] }
    }
}

#[derive(Default)]
pub struct Chunker {
    chunking_config: ChunkingConfig,
}

impl Chunker {
    pub fn new() -> Self { Self::default() }

    pub fn with_config(chunking_config: ChunkingConfig) -> Self { Self { chunking_config } }

    pub fn chunk(&self, text: &str, source: &str) -> Vec<Chunk> { chunk_document(text, source) }

    pub fn process_directory(&self, data_dir: &Path) -> Result<ChunkedCorpus> {
        let (files, unreadable) = self.list_doc_files(data_dir);
        self.process_files(files, unreadable)
    }

    pub fn process_directory_limited(&self, data_dir: &Path, limit: usize) -> Result<ChunkedCorpus> {
        let (mut files, unreadable) = self.list_doc_files(data_dir);
        if files.len() > limit {
            files.truncate(limit);
            info!(limit, "limited to first files");
        }
        self.process_files(files, unreadable)
    }

    fn process_files(&self, files: Vec<PathBuf>, unreadable: usize) -> Result<ChunkedCorpus> {
        let mut corpus = ChunkedCorpus { skipped: unreadable, ..ChunkedCorpus::default() };
        if files.is_empty() {
            return Ok(corpus);
        }
        for (file_index, file_path) in files.iter().enumerate() {
            info!("Processing file {}/{}: {}", file_index + 1, files.len(), file_path.display());
            let content = match self.read_file_content(file_path) {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %file_path.display(), error = %e, "skipping unreadable file");
                    corpus.skipped += 1;
                    continue;
                }
            };
            corpus.files += 1;
            if content.trim().is_empty() {
                continue;
            }
            let source = source_id(file_path);
            corpus.chunks.extend(self.chunk(&content, &source));
        }
        info!("Processed {} files into {} chunks", corpus.files, corpus.chunks.len());
        Ok(corpus)
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
        }
    }

    fn wants(&self, path: &Path) -> bool {
        if self.chunking_config.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| self.chunking_config.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Matching files under `root`, sorted, plus the number of paths the walk
    /// could not read.
    fn list_doc_files(&self, root: &Path) -> (Vec<PathBuf>, usize) {
        let mut doc_files = Vec::new();
        let mut unreadable = 0usize;
        for entry in walkdir::WalkDir::new(root) {
            match entry {
                Ok(entry) if entry.file_type().is_file() && self.wants(entry.path()) => {
                    doc_files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "skipping unreadable path");
                    unreadable += 1;
                }
            }
        }
        if unreadable > 0 {
            warn!("{} paths under {} could not be read", unreadable, root.display());
        }
        doc_files.sort();
        (doc_files, unreadable)
    }
}

/// Path of a document as stored in `Chunk::source`, always with `/` separators.
pub fn source_id(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
