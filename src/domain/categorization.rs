// src/domain/categorization.rs
use crate::domain::error::{DomainError, DomainResult};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Score threshold above which a category counts as "likely".
pub const LIKELY_THRESHOLD: f32 = 0.5;

/// Per-category scores in first-seen order.
///
/// Order matters: the top-category tie-break is "first maximum in mapping
/// order", which is a documented policy here rather than an accident of the
/// underlying map type.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScores {
    entries: Vec<(String, f32)>,
}

impl CategoryScores {
    pub fn new(entries: Vec<(String, f32)>) -> Self {
        Self { entries }
    }

    /// Build from a JSON object, preserving the wire order of the keys.
    pub fn from_json_map(map: &serde_json::Map<String, Value>) -> DomainResult<Self> {
        let mut entries = Vec::with_capacity(map.len());
        for (category, value) in map {
            let score = value.as_f64().ok_or_else(|| {
                DomainError::DeserializationError(format!(
                    "score for category `{}` is not a number: {}",
                    category, value
                ))
            })?;
            entries.push((category.clone(), score as f32));
        }
        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(c, s)| (c.as_str(), *s))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every category scoring at or above [`LIKELY_THRESHOLD`], in order.
    pub fn likely_categories(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, score)| *score >= LIKELY_THRESHOLD)
            .map(|(category, _)| category.clone())
            .collect()
    }

    /// The single highest-scoring category. Ties resolve to the first-seen
    /// maximum: only a strictly greater score displaces the current winner.
    pub fn top_category(&self) -> Option<&str> {
        let mut best: Option<(&str, f32)> = None;
        for (category, score) in &self.entries {
            match best {
                Some((_, best_score)) if *score <= best_score => {}
                _ => best = Some((category.as_str(), *score)),
            }
        }
        best.map(|(category, _)| category)
    }

    /// Ordered JSON object for storage; `serde_json` is built with
    /// `preserve_order` so the first-seen order survives a round trip.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (category, score) in &self.entries {
            map.insert(category.clone(), Value::from(f64::from(*score)));
        }
        Value::Object(map)
    }
}

/// What the classifier gateway returns for one page, regardless of whether
/// the model ran in-process or behind an HTTP endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub scores: CategoryScores,
    pub embeddings: Vec<f32>,
}

/// One categorization attempt for one item. Exactly one of `error` or the
/// html/scores payload is set; the row is replaced wholesale on a re-run.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizationRecord {
    pub item_id: i64,
    pub error: Option<String>,
    pub html: Option<String>,
    pub html_md5: Option<String>,
    pub likely_categories: Option<Vec<String>>,
    pub top_category: Option<String>,
    pub scores: Option<CategoryScores>,
    pub embeddings: Option<Vec<f32>>,
    pub process_time: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub synced: Option<bool>,
}

impl CategorizationRecord {
    pub fn success(
        item_id: i64,
        html: String,
        classification: Classification,
        process_time: f64,
    ) -> Self {
        let html_md5 = format!("{:x}", md5::compute(html.as_bytes()));
        Self {
            item_id,
            error: None,
            html_md5: Some(html_md5),
            html: Some(html),
            likely_categories: Some(classification.scores.likely_categories()),
            top_category: classification.scores.top_category().map(ToString::to_string),
            scores: Some(classification.scores),
            embeddings: Some(classification.embeddings),
            process_time: Some(process_time),
            created_at: Utc::now(),
            synced: Some(false),
        }
    }

    pub fn failure(item_id: i64, error: impl Into<String>) -> Self {
        Self {
            item_id,
            error: Some(error.into()),
            html: None,
            html_md5: None,
            likely_categories: None,
            top_category: None,
            scores: None,
            embeddings: None,
            process_time: None,
            created_at: Utc::now(),
            synced: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
