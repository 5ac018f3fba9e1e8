//! Presentation contract for answers, uploaded files, and stats.
//!
//! Everything here is a pure function of session data. The views carry
//! display-ready strings; turning the markdown answer into terminal output
//! is left to the caller.

use serde::Serialize;

use crate::models::{AnswerResult, SourceCitation, Stats, UploadedFileRecord};

/// Display-ready answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerView {
    /// e.g. `"86.8%"`.
    pub confidence: String,
    /// Answer text, still markdown.
    pub answer_markdown: String,
    pub source_count: usize,
    /// In server order.
    pub sources: Vec<SourceView>,
}

/// Display-ready citation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceView {
    pub source: String,
    pub relevance: String,
    pub preview: String,
    /// One-based.
    pub chunk_number: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilesView {
    pub count: usize,
    pub entries: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEntry {
    pub name: String,
    /// e.g. `"4 chunks"`.
    pub badge: String,
}

/// Format a `[0, 1]` score as a percentage with one fractional digit.
///
/// Rounds half away from zero: `0.8675` → `"86.8%"`.
pub fn format_percent(score: f64) -> String {
    let tenths = (score * 100.0 * 10.0).round();
    format!("{:.1}%", tenths / 10.0 + 0.0)
}

pub fn answer_view(answer: &AnswerResult) -> AnswerView {
    AnswerView {
        confidence: format_percent(answer.confidence),
        answer_markdown: answer.answer.clone(),
        source_count: answer.sources.len(),
        sources: answer.sources.iter().map(source_view).collect(),
    }
}

fn source_view(source: &SourceCitation) -> SourceView {
    SourceView {
        source: source.source.clone(),
        relevance: format_percent(source.relevance_score),
        preview: source.text_preview.clone(),
        chunk_number: source.chunk_index + 1,
    }
}

pub fn files_view(files: &[UploadedFileRecord]) -> FilesView {
    FilesView {
        count: files.len(),
        entries: files
            .iter()
            .map(|f| FileEntry {
                name: f.name.clone(),
                badge: format!("{} chunks", f.chunks),
            })
            .collect(),
    }
}

pub fn stats_line(stats: &Stats) -> String {
    match &stats.collection_name {
        Some(name) => format!("Total Chunks in DB: {} ({})", stats.total_chunks, name),
        None => format!("Total Chunks in DB: {}", stats.total_chunks),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(source: &str, score: f64, chunk_index: u64) -> SourceCitation {
        SourceCitation {
            source: source.to_string(),
            relevance_score: score,
            text_preview: format!("preview of {}", source),
            chunk_index,
        }
    }

    #[test]
    fn percent_one_fractional_digit() {
        assert_eq!(format_percent(0.8675), "86.8%");
        assert_eq!(format_percent(0.42), "42.0%");
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(1.0), "100.0%");
        assert_eq!(format_percent(0.123), "12.3%");
    }

    #[test]
    fn sources_keep_server_order() {
        let answer = AnswerResult {
            answer: "X is **bold**.".to_string(),
            confidence: 0.42,
            sources: vec![citation("a.pdf", 0.9, 0), citation("b.txt", 0.3, 6)],
        };
        let view = answer_view(&answer);
        assert_eq!(view.confidence, "42.0%");
        assert_eq!(view.source_count, 2);
        let relevance: Vec<&str> = view.sources.iter().map(|s| s.relevance.as_str()).collect();
        assert_eq!(relevance, vec!["90.0%", "30.0%"]);
        assert_eq!(view.sources[0].chunk_number, 1);
        assert_eq!(view.sources[1].chunk_number, 7);
        assert_eq!(view.sources[1].preview, "preview of b.txt");
        assert_eq!(view.answer_markdown, "X is **bold**.");
    }

    #[test]
    fn lower_relevance_first_is_not_resorted() {
        let answer = AnswerResult {
            answer: String::new(),
            confidence: 0.5,
            sources: vec![citation("low.txt", 0.1, 0), citation("high.txt", 0.95, 0)],
        };
        let view = answer_view(&answer);
        assert_eq!(view.sources[0].source, "low.txt");
        assert_eq!(view.sources[1].source, "high.txt");
    }

    #[test]
    fn files_and_stats() {
        let files = vec![UploadedFileRecord {
            name: "a.pdf".to_string(),
            chunks: 4,
            id: "d1".to_string(),
        }];
        let view = files_view(&files);
        assert_eq!(view.count, 1);
        assert_eq!(view.entries[0].badge, "4 chunks");

        let stats = Stats {
            total_chunks: 9,
            collection_name: None,
        };
        assert_eq!(stats_line(&stats), "Total Chunks in DB: 9");
    }
}
