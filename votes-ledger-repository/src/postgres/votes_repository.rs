use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;
use votes_ledger_shared::types::{
    CountDelta, CounterField, Target, TargetType, VoteKey, VoteRecord, VoteType, VotesCount,
};

use crate::{CounterUpdater, TransactionProvider, VoteRecordStore, VotesRepositoryError};

const SQLSTATE_CHECK_VIOLATION: &str = "23514";

const TABLES: [&str; 3] = ["votes", "questions", "answers"];

const SELECT_VOTE_COLUMNS: &str =
    "SELECT id, voter_id, target_id, target_type, vote_type, created_at, updated_at FROM votes";

/// PostgreSQL implementation of the votes ledger repository.
///
/// Provides database operations for vote records and vote counters using
/// PostgreSQL with connection pooling and transaction support.
pub struct PostgresVotesRepository {
    pool: sqlx::PgPool,
}

#[derive(sqlx::FromRow)]
struct VoteRow {
    id: Uuid,
    voter_id: String,
    target_id: String,
    target_type: i16,
    vote_type: i16,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<VoteRow> for VoteRecord {
    type Error = VotesRepositoryError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        Ok(VoteRecord {
            id: row.id,
            voter_id: row.voter_id,
            target_id: row.target_id,
            target_type: decode_target_type(row.target_type)?,
            vote_type: decode_vote_type(row.vote_type)?,
            created_at: from_timestamp(row.created_at)?,
            updated_at: from_timestamp(row.updated_at)?,
        })
    }
}

fn encode_target_type(target_type: TargetType) -> i16 {
    match target_type {
        TargetType::Question => 0,
        TargetType::Answer => 1,
    }
}

fn decode_target_type(value: i16) -> Result<TargetType, VotesRepositoryError> {
    match value {
        0 => Ok(TargetType::Question),
        1 => Ok(TargetType::Answer),
        _ => Err(VotesRepositoryError::InvalidTargetType(value)),
    }
}

fn encode_vote_type(vote_type: VoteType) -> i16 {
    match vote_type {
        VoteType::Upvote => 0,
        VoteType::Downvote => 1,
    }
}

fn decode_vote_type(value: i16) -> Result<VoteType, VotesRepositoryError> {
    match value {
        0 => Ok(VoteType::Upvote),
        1 => Ok(VoteType::Downvote),
        _ => Err(VotesRepositoryError::InvalidVoteType(value)),
    }
}

fn to_timestamp(seconds: u64) -> Result<OffsetDateTime, VotesRepositoryError> {
    let seconds = i64::try_from(seconds).map_err(|_| VotesRepositoryError::InvalidTimestamp(i64::MAX))?;
    OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|_| VotesRepositoryError::InvalidTimestamp(seconds))
}

fn from_timestamp(timestamp: OffsetDateTime) -> Result<u64, VotesRepositoryError> {
    let seconds = timestamp.unix_timestamp();
    u64::try_from(seconds).map_err(|_| VotesRepositoryError::InvalidTimestamp(seconds))
}

/// Counter statements per (target type, field). Table and column names never
/// come from caller input.
fn adjust_count_sql(target_type: TargetType, field: CounterField) -> &'static str {
    match (target_type, field) {
        (TargetType::Question, CounterField::Upvotes) => {
            "UPDATE questions SET upvotes = upvotes + $1 WHERE id = $2"
        }
        (TargetType::Question, CounterField::Downvotes) => {
            "UPDATE questions SET downvotes = downvotes + $1 WHERE id = $2"
        }
        (TargetType::Answer, CounterField::Upvotes) => {
            "UPDATE answers SET upvotes = upvotes + $1 WHERE id = $2"
        }
        (TargetType::Answer, CounterField::Downvotes) => {
            "UPDATE answers SET downvotes = downvotes + $1 WHERE id = $2"
        }
    }
}

fn select_counts_sql(target_type: TargetType) -> &'static str {
    match target_type {
        TargetType::Question => "SELECT upvotes, downvotes FROM questions WHERE id = $1",
        TargetType::Answer => "SELECT upvotes, downvotes FROM answers WHERE id = $1",
    }
}

impl PostgresVotesRepository {
    /// Creates a new PostgreSQL repository instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresVotesRepository)` - Ready-to-use repository instance
    /// * `Err(VotesRepositoryError)` - Future validation errors (currently always succeeds)
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, VotesRepositoryError> {
        Ok(Self { pool })
    }

    /// Applies the embedded migrations under `src/postgres/migrations`.
    pub async fn migrate(&self) -> Result<(), VotesRepositoryError> {
        sqlx::migrate!("src/postgres/migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Checks if the tables are created in the database.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If every table the repository writes to exists
    /// * `Ok(false)` - If at least one of them is missing
    pub async fn check_tables_created(&self) -> Result<bool, VotesRepositoryError> {
        for table in TABLES {
            let table_exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await?;
            if !table_exists {
                debug!(table, "Table missing");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl TransactionProvider for PostgresVotesRepository {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx, VotesRepositoryError> {
        Ok(self.pool.begin().await?)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), VotesRepositoryError> {
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), VotesRepositoryError> {
        tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl VoteRecordStore for PostgresVotesRepository {
    /// Locks and returns the ledger row for `key`.
    ///
    /// `FOR UPDATE` makes a second transaction on the same existing row wait
    /// for the first to finish and then read its outcome. When no row exists
    /// nothing is locked; the unique constraint rejects the slower insert.
    async fn find_vote(
        &self,
        tx: &mut Self::Tx,
        key: &VoteKey,
    ) -> Result<Option<VoteRecord>, VotesRepositoryError> {
        let sql = format!(
            "{SELECT_VOTE_COLUMNS} WHERE voter_id = $1 AND target_id = $2 AND target_type = $3 FOR UPDATE"
        );
        let row = sqlx::query_as::<_, VoteRow>(&sql)
            .bind(&key.voter_id)
            .bind(&key.target_id)
            .bind(encode_target_type(key.target_type))
            .fetch_optional(&mut **tx)
            .await?;

        row.map(VoteRecord::try_from).transpose()
    }

    async fn insert_vote(
        &self,
        tx: &mut Self::Tx,
        record: &VoteRecord,
    ) -> Result<(), VotesRepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO votes (id, voter_id, target_id, target_type, vote_type, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(&record.voter_id)
        .bind(&record.target_id)
        .bind(encode_target_type(record.target_type))
        .bind(encode_vote_type(record.vote_type))
        .bind(to_timestamp(record.created_at)?)
        .bind(to_timestamp(record.updated_at)?)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn update_vote_type(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
        vote_type: VoteType,
        updated_at: u64,
    ) -> Result<(), VotesRepositoryError> {
        let result = sqlx::query("UPDATE votes SET vote_type = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(encode_vote_type(vote_type))
            .bind(to_timestamp(updated_at)?)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(VotesRepositoryError::VoteNotFound(id));
        }
        Ok(())
    }

    async fn delete_vote(&self, tx: &mut Self::Tx, id: Uuid) -> Result<(), VotesRepositoryError> {
        let result = sqlx::query("DELETE FROM votes WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(VotesRepositoryError::VoteNotFound(id));
        }
        Ok(())
    }

    async fn get_vote(&self, key: &VoteKey) -> Result<Option<VoteRecord>, VotesRepositoryError> {
        let sql = format!("{SELECT_VOTE_COLUMNS} WHERE voter_id = $1 AND target_id = $2 AND target_type = $3");
        let row = sqlx::query_as::<_, VoteRow>(&sql)
            .bind(&key.voter_id)
            .bind(&key.target_id)
            .bind(encode_target_type(key.target_type))
            .fetch_optional(&self.pool)
            .await?;

        row.map(VoteRecord::try_from).transpose()
    }
}

#[async_trait]
impl CounterUpdater for PostgresVotesRepository {
    async fn adjust_count(
        &self,
        tx: &mut Self::Tx,
        target: &Target,
        field: CounterField,
        delta: CountDelta,
    ) -> Result<(), VotesRepositoryError> {
        let result = sqlx::query(adjust_count_sql(target.target_type, field))
            .bind(delta.as_i64())
            .bind(&target.id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                let check_violation = matches!(
                    &e,
                    sqlx::Error::Database(db_error)
                        if db_error.code().as_deref() == Some(SQLSTATE_CHECK_VIOLATION)
                );
                if check_violation {
                    VotesRepositoryError::NegativeCount(target.clone())
                } else {
                    VotesRepositoryError::from(e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(VotesRepositoryError::TargetNotFound(target.clone()));
        }
        Ok(())
    }

    async fn get_votes_count(
        &self,
        target: &Target,
    ) -> Result<Option<VotesCount>, VotesRepositoryError> {
        let counts: Option<(i64, i64)> = sqlx::query_as(select_counts_sql(target.target_type))
            .bind(&target.id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(counts.map(|(upvotes, downvotes)| VotesCount {
            target_id: target.id.clone(),
            target_type: target.target_type,
            upvotes,
            downvotes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes_round_trip() {
        for target_type in TargetType::ALL {
            assert_eq!(decode_target_type(encode_target_type(target_type)).unwrap(), target_type);
        }
        for vote_type in [VoteType::Upvote, VoteType::Downvote] {
            assert_eq!(decode_vote_type(encode_vote_type(vote_type)).unwrap(), vote_type);
        }
    }

    #[test]
    fn test_unknown_codes_are_rejected() {
        assert!(matches!(decode_target_type(7), Err(VotesRepositoryError::InvalidTargetType(7))));
        assert!(matches!(decode_vote_type(2), Err(VotesRepositoryError::InvalidVoteType(2))));
    }

    #[test]
    fn test_pre_epoch_timestamp_is_rejected() {
        let before_epoch = OffsetDateTime::from_unix_timestamp(-60).unwrap();
        assert!(matches!(
            from_timestamp(before_epoch),
            Err(VotesRepositoryError::InvalidTimestamp(-60))
        ));

        let stored = to_timestamp(1713859200).unwrap();
        assert_eq!(from_timestamp(stored).unwrap(), 1713859200);
    }

    #[test]
    fn test_adjust_count_sql_targets_matching_table() {
        assert!(adjust_count_sql(TargetType::Answer, CounterField::Downvotes)
            .starts_with("UPDATE answers SET downvotes = downvotes + $1"));
        assert!(adjust_count_sql(TargetType::Question, CounterField::Upvotes)
            .starts_with("UPDATE questions SET upvotes = upvotes + $1"));
    }
}
