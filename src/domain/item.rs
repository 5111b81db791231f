// src/domain/item.rs
use crate::domain::error::{DomainError, DomainResult};
use itertools::Itertools;
use serde_json::Value;

/// Remote lifecycle state of an item. Items are never deleted locally;
/// a remote deletion only flips this status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Normal = 0,
    Archived = 1,
    Deleted = 2,
}

impl ItemStatus {
    pub fn from_code(code: i64) -> DomainResult<Self> {
        match code {
            0 => Ok(ItemStatus::Normal),
            1 => Ok(ItemStatus::Archived),
            2 => Ok(ItemStatus::Deleted),
            other => Err(DomainError::Validation(format!(
                "unknown item status code: {}",
                other
            ))),
        }
    }

    pub fn code(self) -> i64 {
        self as i64
    }
}

/// One bookmarked page, normalized from the raw API payload.
///
/// All integer-ish fields are coerced at the ingestion boundary;
/// `time_read`/`time_favorited` of zero become `None` so that "never
/// happened" is distinguishable from "happened at the epoch".
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub item_id: i64,
    pub resolved_id: Option<i64>,
    pub given_url: Option<String>,
    pub resolved_url: Option<String>,
    pub given_title: Option<String>,
    pub resolved_title: Option<String>,
    pub excerpt: Option<String>,
    pub favorite: i64,
    pub status: ItemStatus,
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

impl Item {
    /// URL to fetch content from: the resolved URL when present, the given
    /// URL otherwise. `None` means the item cannot be categorized.
    pub fn url(&self) -> Option<&str> {
        self.resolved_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or(self.given_url.as_deref().filter(|u| !u.is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub author_id: i64,
    pub name: String,
    pub url: String,
}

/// Join-table row linking an author to an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemAuthor {
    pub author_id: i64,
    pub item_id: i64,
}

/// One raw record normalized into canonical rows: the item itself plus a
/// deduplicated author batch and the item-author associations.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub item: Item,
    pub authors: Vec<Author>,
    pub links: Vec<ItemAuthor>,
}

impl NormalizedRecord {
    /// Validate and coerce one raw API record. Fails loudly on any field
    /// that is present but not coercible to the documented type.
    pub fn from_raw(raw: &Value) -> DomainResult<Self> {
        let map = raw.as_object().ok_or_else(|| {
            DomainError::Validation(format!("raw item is not an object: {}", raw))
        })?;

        let item_id = require_int(map, "item_id")?;
        let status = ItemStatus::from_code(int_field(map, "status")?.unwrap_or(0))?;

        let item = Item {
            item_id,
            resolved_id: int_field(map, "resolved_id")?,
            given_url: text_field(map, "given_url"),
            resolved_url: text_field(map, "resolved_url"),
            given_title: text_field(map, "given_title"),
            resolved_title: text_field(map, "resolved_title"),
            excerpt: text_field(map, "excerpt"),
            favorite: int_field(map, "favorite")?.unwrap_or(0),
            status,
            time_added: int_field(map, "time_added")?,
            time_updated: int_field(map, "time_updated")?,
            // zero means "never happened", stored as absent
            time_read: int_field(map, "time_read")?.filter(|&t| t != 0),
            time_favorited: int_field(map, "time_favorited")?.filter(|&t| t != 0),
            is_article: int_field(map, "is_article")?.unwrap_or(0),
            has_video: int_field(map, "has_video")?.unwrap_or(0),
            has_image: int_field(map, "has_image")?.unwrap_or(0),
            word_count: int_field(map, "word_count")?,
            time_to_read: int_field(map, "time_to_read")?,
            lang: text_field(map, "lang"),
        };

        let (authors, links) = extract_authors(map, item_id)?;

        Ok(NormalizedRecord {
            item,
            authors,
            links,
        })
    }
}

/// Pull the embedded `authors` mapping apart into author rows and
/// item-author associations, deduplicated by author id.
fn extract_authors(
    map: &serde_json::Map<String, Value>,
    item_id: i64,
) -> DomainResult<(Vec<Author>, Vec<ItemAuthor>)> {
    let Some(raw_authors) = map.get("authors").and_then(Value::as_object) else {
        return Ok((Vec::new(), Vec::new()));
    };

    let mut authors = Vec::new();
    let mut links = Vec::new();
    for details in raw_authors.values() {
        let details = details.as_object().ok_or_else(|| {
            DomainError::Validation(format!(
                "author entry of item {} is not an object",
                item_id
            ))
        })?;
        let author_id = require_int(details, "author_id")?;
        authors.push(Author {
            author_id,
            name: text_field(details, "name").unwrap_or_default(),
            url: text_field(details, "url").unwrap_or_default(),
        });
        links.push(ItemAuthor {
            author_id,
            item_id: int_field(details, "item_id")?.unwrap_or(item_id),
        });
    }

    let authors = authors
        .into_iter()
        .unique_by(|a| a.author_id)
        .collect::<Vec<_>>();
    let links = links
        .into_iter()
        .unique_by(|l| (l.author_id, l.item_id))
        .collect::<Vec<_>>();
    Ok((authors, links))
}

/// Coerce a JSON value into an integer. The API serializes most numbers as
/// strings, so both forms are accepted; anything else is a loud failure.
fn coerce_int(value: &Value, field: &str) -> DomainResult<i64> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| {
            DomainError::Validation(format!("field `{}` is not an integer: {}", field, n))
        }),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| {
            DomainError::Validation(format!(
                "field `{}` is not integer-coercible: {:?}",
                field, s
            ))
        }),
        other => Err(DomainError::Validation(format!(
            "field `{}` is not integer-coercible: {}",
            field, other
        ))),
    }
}

fn int_field(
    map: &serde_json::Map<String, Value>,
    field: &str,
) -> DomainResult<Option<i64>> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => coerce_int(value, field).map(Some),
    }
}

fn require_int(map: &serde_json::Map<String, Value>, field: &str) -> DomainResult<i64> {
    int_field(map, field)?.ok_or_else(|| {
        DomainError::Validation(format!("required field `{}` is missing", field))
    })
}

fn text_field(map: &serde_json::Map<String, Value>, field: &str) -> Option<String> {
    map.get(field)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}
