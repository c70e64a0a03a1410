//! Final response returned for one question.

use serde::Serialize;

use crate::{
    knowledge::KnowledgeSnippet,
    query::Query,
    record::{DataSource, QcFlag, Record},
    visualization::VisualizationSpec,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Done,
    Failed,
}

/// Count of records per QC class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QcSummary {
    pub good: usize,
    pub probably_good: usize,
    pub bad: usize,
    pub missing: usize,
}

impl QcSummary {
    pub fn from_records(records: &[Record]) -> Self {
        let mut s = Self::default();
        for r in records {
            match r.qc_flag() {
                QcFlag::Good => s.good += 1,
                QcFlag::ProbablyGood => s.probably_good += 1,
                QcFlag::Bad => s.bad += 1,
                QcFlag::Missing => s.missing += 1,
            }
        }
        s
    }

    pub fn total(&self) -> usize {
        self.good + self.probably_good + self.bad + self.missing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Provenance {
    /// `None` when no provider produced data.
    pub source: Option<DataSource>,
    pub record_count: usize,
    pub qc_summary: QcSummary,
}

impl Provenance {
    pub fn from_records(source: Option<DataSource>, records: &[Record]) -> Self {
        Self {
            source,
            record_count: records.len(),
            qc_summary: QcSummary::from_records(records),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    pub status: RequestStatus,
    pub answer_text: String,
    pub query: Query,
    pub records: Vec<Record>,
    pub visualization: VisualizationSpec,
    pub provenance: Provenance,
    /// Knowledge passages that were fed to the composer.
    pub context: Vec<KnowledgeSnippet>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_csv: Option<String>,
}
