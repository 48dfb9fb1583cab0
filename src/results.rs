use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Separator used when a list field is flattened into one CSV cell
pub const LIST_SEPARATOR: &str = " | ";

/// CSV header, in column order
pub const CSV_COLUMNS: [&str; 10] = [
    "url",
    "title",
    "meta_description",
    "h1_headings",
    "h2_headings",
    "body_text",
    "image_alt_texts",
    "word_count",
    "status",
    "error",
];

/// SEO fields extracted from a successfully rendered page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoFields {
    pub title: String,
    pub meta_description: String,
    pub h1_headings: Vec<String>,
    pub h2_headings: Vec<String>,
    /// Body text, already truncated to the configured budget
    pub body_text: String,
    /// Non-empty `alt` attributes, in document order
    pub image_alt_texts: Vec<String>,
    /// Words in the truncated body text
    pub word_count: usize,
}

/// What happened when a page was fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    Ok(SeoFields),
    Timeout { detail: String },
    Error { detail: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageStatus {
    Ok,
    Timeout,
    Error,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Ok => "OK",
            PageStatus::Timeout => "TIMEOUT",
            PageStatus::Error => "ERROR",
        }
    }
}

/// One row of the dataset: a crawled URL and what was found there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    /// Link distance from the seeds
    pub depth: usize,
    pub outcome: PageOutcome,
}

impl PageRecord {
    pub fn ok(url: impl Into<String>, depth: usize, fields: SeoFields) -> Self {
        Self {
            url: url.into(),
            depth,
            outcome: PageOutcome::Ok(fields),
        }
    }

    pub fn timeout(url: impl Into<String>, depth: usize, detail: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth,
            outcome: PageOutcome::Timeout {
                detail: detail.into(),
            },
        }
    }

    pub fn error(url: impl Into<String>, depth: usize, detail: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth,
            outcome: PageOutcome::Error {
                detail: detail.into(),
            },
        }
    }

    pub fn status(&self) -> PageStatus {
        match self.outcome {
            PageOutcome::Ok(_) => PageStatus::Ok,
            PageOutcome::Timeout { .. } => PageStatus::Timeout,
            PageOutcome::Error { .. } => PageStatus::Error,
        }
    }

    pub fn fields(&self) -> Option<&SeoFields> {
        match &self.outcome {
            PageOutcome::Ok(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn error_detail(&self) -> Option<&str> {
        match &self.outcome {
            PageOutcome::Ok(_) => None,
            PageOutcome::Timeout { detail } | PageOutcome::Error { detail } => Some(detail),
        }
    }

    /// Word count used for ranking; failed pages count as zero
    pub fn word_count(&self) -> usize {
        self.fields().map_or(0, |f| f.word_count)
    }

    /// Cells in `CSV_COLUMNS` order. Failed pages leave the content cells empty.
    pub fn csv_row(&self) -> [String; 10] {
        let status = self.status().as_str().to_string();
        let error = self.error_detail().unwrap_or_default().to_string();

        match self.fields() {
            Some(f) => [
                self.url.clone(),
                f.title.clone(),
                f.meta_description.clone(),
                f.h1_headings.join(LIST_SEPARATOR),
                f.h2_headings.join(LIST_SEPARATOR),
                f.body_text.clone(),
                f.image_alt_texts.join(LIST_SEPARATOR),
                f.word_count.to_string(),
                status,
                error,
            ],
            None => [
                self.url.clone(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                status,
                error,
            ],
        }
    }
}

/// Crawled pages in the order they were dequeued
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<PageRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: PageRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[PageRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, url: &str) -> Option<&PageRecord> {
        self.records.iter().find(|r| r.url == url)
    }

    /// Count of records per status, as (ok, timeout, error)
    pub fn status_counts(&self) -> (usize, usize, usize) {
        self.records
            .iter()
            .fold((0, 0, 0), |(ok, timeout, error), r| match r.status() {
                PageStatus::Ok => (ok + 1, timeout, error),
                PageStatus::Timeout => (ok, timeout + 1, error),
                PageStatus::Error => (ok, timeout, error + 1),
            })
    }

    /// The `n` records with the most words, largest first. Ties keep crawl order.
    pub fn top_by_word_count(&self, n: usize) -> Vec<&PageRecord> {
        let mut ranked: Vec<&PageRecord> = self.records.iter().collect();
        ranked.sort_by(|a, b| b.word_count().cmp(&a.word_count()));
        ranked.truncate(n);
        ranked
    }

    /// Write the whole dataset as CSV with a header row
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        write_csv_rows(writer, self.records.iter())
    }

    /// Write the dataset to a CSV file, replacing any existing file
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(file)
    }
}

impl IntoIterator for Dataset {
    type Item = PageRecord;
    type IntoIter = std::vec::IntoIter<PageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Write any sequence of records as CSV with a header row
pub fn write_csv_rows<'a, W, I>(writer: W, records: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a PageRecord>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_COLUMNS)?;
    for record in records {
        wtr.write_record(record.csv_row())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render records as a CSV string
pub fn csv_string<'a, I>(records: I) -> Result<String>
where
    I: IntoIterator<Item = &'a PageRecord>,
{
    let mut buf = Vec::new();
    write_csv_rows(&mut buf, records)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
