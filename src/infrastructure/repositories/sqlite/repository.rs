// src/infrastructure/repositories/sqlite/repository.rs

use diesel::prelude::*;
use tracing::{debug, instrument};

use super::connection::{init_pool, ConnectionPool, PooledConnection};
use super::error::{SqliteRepositoryError, SqliteResult};
use super::model::{DbAuthor, DbAutoTag, DbItem, DbItemAuthor, DbSinceRow};
use super::schema::{auto_tags, authors, items, items_authors, since};
use crate::domain::categorization::CategorizationRecord;
use crate::domain::error::DomainError;
use crate::domain::item::{Item, NormalizedRecord};
use crate::domain::repositories::library::{CategorizationTarget, LibraryRepository};

/// The cursor table holds exactly one row, always at this id.
const CURSOR_ROW_ID: i32 = 1;

#[derive(Clone)]
pub struct SqliteLibraryRepository {
    pool: ConnectionPool,
}

impl SqliteLibraryRepository {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Open (and migrate) the database at the given path.
    #[instrument(skip_all, level = "debug")]
    pub fn from_url(database_url: &str) -> SqliteResult<Self> {
        let pool = init_pool(database_url)?;
        Ok(Self { pool })
    }

    pub fn get_connection(&self) -> SqliteResult<PooledConnection> {
        self.pool
            .get()
            .map_err(|e| SqliteRepositoryError::ConnectionPoolError(e.to_string()))
    }
}

impl LibraryRepository for SqliteLibraryRepository {
    #[instrument(skip_all, level = "debug", fields(item_id = record.item.item_id))]
    fn upsert_record(&self, record: &NormalizedRecord) -> Result<(), DomainError> {
        let mut conn = self.get_connection()?;

        let db_item = DbItem::from_domain(&record.item);
        let db_authors: Vec<DbAuthor> =
            record.authors.iter().map(DbAuthor::from_domain).collect();
        let db_links: Vec<DbItemAuthor> =
            record.links.iter().map(DbItemAuthor::from_domain).collect();

        conn.transaction::<_, SqliteRepositoryError, _>(|conn| {
            // insert-or-replace by primary key: a re-fetch of the same id
            // fully overwrites the stored row, no field-level merge
            diesel::replace_into(items::table)
                .values(&db_item)
                .execute(conn)?;
            if !db_authors.is_empty() {
                diesel::replace_into(authors::table)
                    .values(&db_authors)
                    .execute(conn)?;
            }
            if !db_links.is_empty() {
                diesel::replace_into(items_authors::table)
                    .values(&db_links)
                    .execute(conn)?;
            }
            Ok(())
        })?;
        Ok(())
    }

    #[instrument(skip_all, level = "debug")]
    fn get_item(&self, item_id: i64) -> Result<Option<Item>, DomainError> {
        let mut conn = self.get_connection()?;
        let result = items::table
            .find(item_id)
            .first::<DbItem>(&mut conn)
            .optional()
            .map_err(SqliteRepositoryError::DatabaseError)?;
        match result {
            Some(db_item) => Ok(Some(db_item.into_domain()?)),
            None => Ok(None),
        }
    }

    fn item_count(&self) -> Result<i64, DomainError> {
        let mut conn = self.get_connection()?;
        let count = items::table
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(SqliteRepositoryError::DatabaseError)?;
        Ok(count)
    }

    fn last_cursor(&self) -> Result<Option<String>, DomainError> {
        let mut conn = self.get_connection()?;
        let row = since::table
            .find(CURSOR_ROW_ID)
            .first::<DbSinceRow>(&mut conn)
            .optional()
            .map_err(SqliteRepositoryError::DatabaseError)?;
        Ok(row.map(|r| r.cursor))
    }

    #[instrument(skip(self), level = "debug")]
    fn record_cursor(&self, cursor: &str) -> Result<(), DomainError> {
        let mut conn = self.get_connection()?;
        diesel::replace_into(since::table)
            .values(&DbSinceRow {
                id: CURSOR_ROW_ID,
                cursor: cursor.to_string(),
            })
            .execute(&mut conn)
            .map_err(SqliteRepositoryError::DatabaseError)?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn items_for_categorization(
        &self,
        target: CategorizationTarget,
    ) -> Result<Vec<Item>, DomainError> {
        let mut conn = self.get_connection()?;

        let normal = items::table
            .filter(items::status.eq(0))
            .order(items::item_id.asc());

        let rows: Vec<DbItem> = match target {
            CategorizationTarget::All => normal
                .load::<DbItem>(&mut conn)
                .map_err(SqliteRepositoryError::DatabaseError)?,
            CategorizationTarget::New => normal
                .filter(items::item_id.ne_all(auto_tags::table.select(auto_tags::item_id)))
                .load::<DbItem>(&mut conn)
                .map_err(SqliteRepositoryError::DatabaseError)?,
            CategorizationTarget::ErrorsOnly => normal
                .filter(
                    items::item_id.eq_any(
                        auto_tags::table
                            .select(auto_tags::item_id)
                            .filter(auto_tags::error.is_not_null()),
                    ),
                )
                .load::<DbItem>(&mut conn)
                .map_err(SqliteRepositoryError::DatabaseError)?,
        };

        debug!(count = rows.len(), ?target, "selected items for categorization");
        rows.into_iter()
            .map(|row| row.into_domain().map_err(DomainError::from))
            .collect()
    }

    #[instrument(skip_all, level = "debug", fields(item_id = record.item_id))]
    fn upsert_categorization(&self, record: &CategorizationRecord) -> Result<(), DomainError> {
        let mut conn = self.get_connection()?;
        let row = DbAutoTag::from_domain(record)?;
        diesel::replace_into(auto_tags::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(SqliteRepositoryError::DatabaseError)?;
        Ok(())
    }

    fn get_categorization(
        &self,
        item_id: i64,
    ) -> Result<Option<CategorizationRecord>, DomainError> {
        let mut conn = self.get_connection()?;
        let row = auto_tags::table
            .find(item_id)
            .first::<DbAutoTag>(&mut conn)
            .optional()
            .map_err(SqliteRepositoryError::DatabaseError)?;
        match row {
            Some(row) => Ok(Some(row.into_domain()?)),
            None => Ok(None),
        }
    }

    fn unsynced_categorizations(&self) -> Result<Vec<CategorizationRecord>, DomainError> {
        let mut conn = self.get_connection()?;
        let rows = auto_tags::table
            .filter(auto_tags::error.is_null())
            .filter(auto_tags::synced.is_null().or(auto_tags::synced.eq(false)))
            .order(auto_tags::item_id.asc())
            .load::<DbAutoTag>(&mut conn)
            .map_err(SqliteRepositoryError::DatabaseError)?;
        rows.into_iter()
            .map(|row| row.into_domain().map_err(DomainError::from))
            .collect()
    }

    #[instrument(skip(self), level = "debug")]
    fn mark_synced(&self, item_id: i64) -> Result<(), DomainError> {
        let mut conn = self.get_connection()?;
        diesel::update(auto_tags::table.find(item_id))
            .set(auto_tags::synced.eq(Some(true)))
            .execute(&mut conn)
            .map_err(SqliteRepositoryError::DatabaseError)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::categorization::{CategoryScores, Classification};
    use crate::util::testing::setup_test_db;
    use serde_json::json;

    fn raw(id: i64, title: &str) -> serde_json::Value {
        json!({
            "item_id": id.to_string(),
            "resolved_url": format!("https://example.com/{}", id),
            "resolved_title": title,
            "favorite": "0",
            "status": "0",
            "time_added": "1348853312",
            "time_updated": "1348853312",
            "time_read": "0",
            "time_favorited": "0",
            "is_article": "1",
            "has_video": "0",
            "has_image": "0",
            "word_count": "100"
        })
    }

    fn upsert_raw(repo: &SqliteLibraryRepository, value: &serde_json::Value) {
        let record = NormalizedRecord::from_raw(value).unwrap();
        repo.upsert_record(&record).unwrap();
    }

    fn success_record(item_id: i64) -> CategorizationRecord {
        CategorizationRecord::success(
            item_id,
            "<html>content</html>".to_string(),
            Classification {
                scores: CategoryScores::new(vec![
                    ("Arts".to_string(), 0.9),
                    ("Sports".to_string(), 0.2),
                ]),
                embeddings: vec![0.5, -0.5],
            },
            0.1,
        )
    }

    #[derive(diesel::QueryableByName)]
    struct CountRow {
        #[diesel(sql_type = diesel::sql_types::BigInt)]
        n: i64,
    }

    fn fts_matches(repo: &SqliteLibraryRepository, term: &str) -> i64 {
        let mut conn = repo.get_connection().unwrap();
        diesel::sql_query(format!(
            "SELECT count(*) AS n FROM items_fts WHERE items_fts MATCH '{}'",
            term
        ))
        .get_result::<CountRow>(&mut conn)
        .unwrap()
        .n
    }

    #[test]
    fn given_same_item_twice_when_upserted_then_single_row_with_second_values() {
        let (repo, _dir) = setup_test_db();
        upsert_raw(&repo, &raw(1, "first title"));
        upsert_raw(&repo, &raw(1, "second title"));

        assert_eq!(repo.item_count().unwrap(), 1);
        let item = repo.get_item(1).unwrap().unwrap();
        assert_eq!(item.resolved_title.as_deref(), Some("second title"));
    }

    #[test]
    fn given_reupserted_item_when_searched_then_fts_index_tracks_new_title() {
        let (repo, _dir) = setup_test_db();
        upsert_raw(&repo, &raw(1, "avocado salad"));
        assert_eq!(fts_matches(&repo, "avocado"), 1);

        upsert_raw(&repo, &raw(1, "banana bread"));

        // the replaced row's terms must drop out of the index, not linger
        assert_eq!(fts_matches(&repo, "avocado"), 0);
        assert_eq!(fts_matches(&repo, "banana"), 1);
    }

    #[test]
    fn given_item_with_authors_when_upserted_then_authors_and_links_stored() {
        let (repo, _dir) = setup_test_db();
        let mut value = raw(5, "with authors");
        value["authors"] = json!({
            "9": {"item_id": "5", "author_id": "9", "name": "A. Writer", "url": "https://a.example"}
        });
        upsert_raw(&repo, &value);

        let mut conn = repo.get_connection().unwrap();
        let author_count: i64 = authors::table.count().get_result(&mut conn).unwrap();
        let link_count: i64 = items_authors::table.count().get_result(&mut conn).unwrap();
        assert_eq!(author_count, 1);
        assert_eq!(link_count, 1);
    }

    #[test]
    fn given_no_cursor_when_read_then_none() {
        let (repo, _dir) = setup_test_db();
        assert_eq!(repo.last_cursor().unwrap(), None);
    }

    #[test]
    fn given_cursor_recorded_twice_then_single_row_overwritten_in_place() {
        let (repo, _dir) = setup_test_db();
        repo.record_cursor("100").unwrap();
        repo.record_cursor("200").unwrap();
        assert_eq!(repo.last_cursor().unwrap().as_deref(), Some("200"));

        let mut conn = repo.get_connection().unwrap();
        let rows: i64 = since::table.count().get_result(&mut conn).unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn given_mixed_records_when_selecting_new_then_only_uncategorized_items() {
        let (repo, _dir) = setup_test_db();
        upsert_raw(&repo, &raw(1, "one"));
        upsert_raw(&repo, &raw(2, "two"));
        upsert_raw(&repo, &raw(3, "three"));
        repo.upsert_categorization(&success_record(1)).unwrap();
        repo.upsert_categorization(&CategorizationRecord::failure(2, "Status 500"))
            .unwrap();

        let selected = repo
            .items_for_categorization(CategorizationTarget::New)
            .unwrap();
        assert_eq!(selected.iter().map(|i| i.item_id).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn given_mixed_records_when_selecting_errors_then_only_error_items() {
        let (repo, _dir) = setup_test_db();
        upsert_raw(&repo, &raw(1, "one"));
        upsert_raw(&repo, &raw(2, "two"));
        repo.upsert_categorization(&success_record(1)).unwrap();
        repo.upsert_categorization(&CategorizationRecord::failure(2, "timed out"))
            .unwrap();

        let selected = repo
            .items_for_categorization(CategorizationTarget::ErrorsOnly)
            .unwrap();
        assert_eq!(selected.iter().map(|i| i.item_id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn given_archived_item_when_selecting_then_excluded() {
        let (repo, _dir) = setup_test_db();
        let mut value = raw(4, "archived");
        value["status"] = json!("1");
        upsert_raw(&repo, &value);

        let selected = repo
            .items_for_categorization(CategorizationTarget::All)
            .unwrap();
        assert!(selected.is_empty());
    }

    #[test]
    fn given_error_record_when_recategorized_then_replaced_wholesale() {
        let (repo, _dir) = setup_test_db();
        upsert_raw(&repo, &raw(1, "one"));
        repo.upsert_categorization(&CategorizationRecord::failure(1, "Status 503"))
            .unwrap();
        repo.upsert_categorization(&success_record(1)).unwrap();

        let stored = repo.get_categorization(1).unwrap().unwrap();
        assert!(!stored.is_error());
        assert_eq!(stored.top_category.as_deref(), Some("Arts"));
        assert_eq!(stored.likely_categories, Some(vec!["Arts".to_string()]));
        assert_eq!(stored.embeddings, Some(vec![0.5, -0.5]));
    }

    #[test]
    fn given_scores_with_tied_maxima_when_round_tripped_then_order_survives() {
        let (repo, _dir) = setup_test_db();
        upsert_raw(&repo, &raw(1, "one"));
        let record = CategorizationRecord::success(
            1,
            "<html/>".to_string(),
            Classification {
                scores: CategoryScores::new(vec![
                    ("News".to_string(), 0.9),
                    ("Arts".to_string(), 0.9),
                ]),
                embeddings: vec![],
            },
            0.0,
        );
        repo.upsert_categorization(&record).unwrap();

        let stored = repo.get_categorization(1).unwrap().unwrap();
        assert_eq!(stored.scores.unwrap().top_category(), Some("News"));
    }

    #[test]
    fn given_synced_and_error_records_when_selecting_unsynced_then_excluded() {
        let (repo, _dir) = setup_test_db();
        for id in 1..=3 {
            upsert_raw(&repo, &raw(id, "item"));
        }
        repo.upsert_categorization(&success_record(1)).unwrap();
        repo.upsert_categorization(&success_record(2)).unwrap();
        repo.upsert_categorization(&CategorizationRecord::failure(3, "boom"))
            .unwrap();
        repo.mark_synced(1).unwrap();

        let pending = repo.unsynced_categorizations().unwrap();
        assert_eq!(pending.iter().map(|r| r.item_id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn given_marked_synced_when_marked_again_then_still_true() {
        let (repo, _dir) = setup_test_db();
        upsert_raw(&repo, &raw(1, "one"));
        repo.upsert_categorization(&success_record(1)).unwrap();
        repo.mark_synced(1).unwrap();
        repo.mark_synced(1).unwrap();

        let stored = repo.get_categorization(1).unwrap().unwrap();
        assert_eq!(stored.synced, Some(true));
    }
}
