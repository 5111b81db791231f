// src/infrastructure/repositories/sqlite/model.rs
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable};

use super::error::{SqliteRepositoryError, SqliteResult};
use crate::domain::categorization::{CategorizationRecord, CategoryScores};
use crate::domain::item::{Author, Item, ItemAuthor, ItemStatus};

#[derive(Queryable, Insertable, Identifiable, Debug, Clone)]
#[diesel(table_name = super::schema::items)]
#[diesel(primary_key(item_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbItem {
    pub item_id: i64,
    pub resolved_id: Option<i64>,
    pub given_url: Option<String>,
    pub resolved_url: Option<String>,
    pub given_title: Option<String>,
    pub resolved_title: Option<String>,
    pub excerpt: Option<String>,
    pub favorite: i64,
    pub status: i64,
    pub time_added: Option<i64>,
    pub time_updated: Option<i64>,
    pub time_read: Option<i64>,
    pub time_favorited: Option<i64>,
    pub is_article: i64,
    pub has_video: i64,
    pub has_image: i64,
    pub word_count: Option<i64>,
    pub time_to_read: Option<i64>,
    pub lang: Option<String>,
}

impl DbItem {
    pub fn from_domain(item: &Item) -> Self {
        Self {
            item_id: item.item_id,
            resolved_id: item.resolved_id,
            given_url: item.given_url.clone(),
            resolved_url: item.resolved_url.clone(),
            given_title: item.given_title.clone(),
            resolved_title: item.resolved_title.clone(),
            excerpt: item.excerpt.clone(),
            favorite: item.favorite,
            status: item.status.code(),
            time_added: item.time_added,
            time_updated: item.time_updated,
            time_read: item.time_read,
            time_favorited: item.time_favorited,
            is_article: item.is_article,
            has_video: item.has_video,
            has_image: item.has_image,
            word_count: item.word_count,
            time_to_read: item.time_to_read,
            lang: item.lang.clone(),
        }
    }

    pub fn into_domain(self) -> SqliteResult<Item> {
        let status = ItemStatus::from_code(self.status).map_err(|e| {
            SqliteRepositoryError::ConversionError(format!(
                "item {} has invalid status: {}",
                self.item_id, e
            ))
        })?;
        Ok(Item {
            item_id: self.item_id,
            resolved_id: self.resolved_id,
            given_url: self.given_url,
            resolved_url: self.resolved_url,
            given_title: self.given_title,
            resolved_title: self.resolved_title,
            excerpt: self.excerpt,
            favorite: self.favorite,
            status,
            time_added: self.time_added,
            time_updated: self.time_updated,
            time_read: self.time_read,
            time_favorited: self.time_favorited,
            is_article: self.is_article,
            has_video: self.has_video,
            has_image: self.has_image,
            word_count: self.word_count,
            time_to_read: self.time_to_read,
            lang: self.lang,
        })
    }
}

#[derive(Queryable, Insertable, Identifiable, Debug, Clone)]
#[diesel(table_name = super::schema::authors)]
#[diesel(primary_key(author_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbAuthor {
    pub author_id: i64,
    pub name: String,
    pub url: String,
}

impl DbAuthor {
    pub fn from_domain(author: &Author) -> Self {
        Self {
            author_id: author.author_id,
            name: author.name.clone(),
            url: author.url.clone(),
        }
    }
}

#[derive(Queryable, Insertable, Identifiable, Debug, Clone)]
#[diesel(table_name = super::schema::items_authors)]
#[diesel(primary_key(author_id, item_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbItemAuthor {
    pub author_id: i64,
    pub item_id: i64,
}

impl DbItemAuthor {
    pub fn from_domain(link: &ItemAuthor) -> Self {
        Self {
            author_id: link.author_id,
            item_id: link.item_id,
        }
    }
}

#[derive(Queryable, Insertable, Identifiable, Debug, Clone)]
#[diesel(table_name = super::schema::since)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbSinceRow {
    pub id: i32,
    pub cursor: String,
}

#[derive(Queryable, Insertable, Identifiable, Debug, Clone)]
#[diesel(table_name = super::schema::auto_tags)]
#[diesel(primary_key(item_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbAutoTag {
    pub item_id: i64,
    pub error: Option<String>,
    pub html: Option<String>,
    pub html_md5: Option<String>,
    pub likely_categories: Option<String>,
    pub top_category: Option<String>,
    pub scores: Option<String>,
    pub embeddings: Option<String>,
    pub process_time: Option<f64>,
    pub created_at: NaiveDateTime,
    pub synced: Option<bool>,
}

impl DbAutoTag {
    pub fn from_domain(record: &CategorizationRecord) -> SqliteResult<Self> {
        let likely_categories = record
            .likely_categories
            .as_ref()
            .map(|v| serde_json::to_string(v))
            .transpose()
            .map_err(|e| SqliteRepositoryError::ConversionError(e.to_string()))?;
        let embeddings = record
            .embeddings
            .as_ref()
            .map(|v| serde_json::to_string(v))
            .transpose()
            .map_err(|e| SqliteRepositoryError::ConversionError(e.to_string()))?;
        let scores = record.scores.as_ref().map(|s| s.to_json().to_string());

        Ok(Self {
            item_id: record.item_id,
            error: record.error.clone(),
            html: record.html.clone(),
            html_md5: record.html_md5.clone(),
            likely_categories,
            top_category: record.top_category.clone(),
            scores,
            embeddings,
            process_time: record.process_time,
            created_at: record.created_at.naive_utc(),
            synced: record.synced,
        })
    }

    pub fn into_domain(self) -> SqliteResult<CategorizationRecord> {
        let likely_categories = self
            .likely_categories
            .as_deref()
            .map(serde_json::from_str::<Vec<String>>)
            .transpose()
            .map_err(|e| SqliteRepositoryError::ConversionError(e.to_string()))?;
        let embeddings = self
            .embeddings
            .as_deref()
            .map(serde_json::from_str::<Vec<f32>>)
            .transpose()
            .map_err(|e| SqliteRepositoryError::ConversionError(e.to_string()))?;
        let scores = match self.scores.as_deref() {
            Some(text) => {
                let value: serde_json::Value = serde_json::from_str(text)
                    .map_err(|e| SqliteRepositoryError::ConversionError(e.to_string()))?;
                let map = value.as_object().ok_or_else(|| {
                    SqliteRepositoryError::ConversionError(format!(
                        "scores of item {} is not a JSON object",
                        self.item_id
                    ))
                })?;
                Some(CategoryScores::from_json_map(map).map_err(|e| {
                    SqliteRepositoryError::ConversionError(e.to_string())
                })?)
            }
            None => None,
        };

        Ok(CategorizationRecord {
            item_id: self.item_id,
            error: self.error,
            html: self.html,
            html_md5: self.html_md5,
            likely_categories,
            top_category: self.top_category,
            scores,
            embeddings,
            process_time: self.process_time,
            created_at: DateTime::<Utc>::from_naive_utc_and_offset(self.created_at, Utc),
            synced: self.synced,
        })
    }
}
