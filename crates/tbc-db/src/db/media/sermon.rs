use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres};
use tbc_core::media::{AUDIO_FILE, COVER_IMAGE};
use tbc_core::models::{NewRecord, Sermon};
use tbc_core::{AppError, MediaAsset, MediaKind};

use crate::db::record::RecordRepository;
use crate::db::transaction::with_transaction;

#[derive(Debug, FromRow)]
struct SermonRow {
    id: i64,
    user_id: i64,
    theme: String,
    minister: String,
    short_note: String,
    cover_image_url: String,
    cover_image_public_id: String,
    audio_url: String,
    audio_public_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SermonRow> for Sermon {
    fn from(row: SermonRow) -> Self {
        Sermon {
            id: row.id,
            user_id: row.user_id,
            theme: row.theme,
            minister: row.minister,
            short_note: row.short_note,
            cover_image: MediaAsset::from_public_id(
                &row.cover_image_public_id,
                row.cover_image_url,
                MediaKind::Image,
            ),
            audio_file: MediaAsset::from_public_id(
                &row.audio_public_id,
                row.audio_url,
                MediaKind::Audio,
            ),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for sermons
#[derive(Clone)]
pub struct PostgresSermonRepository {
    pool: PgPool,
}

impl PostgresSermonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordRepository<Sermon> for PostgresSermonRepository {
    #[tracing::instrument(skip(self, record), fields(db.table = "sermons", db.operation = "insert", user.id = record.owner_id))]
    async fn insert(&self, record: NewRecord<Sermon>) -> Result<Sermon, AppError> {
        let cover = record.asset(&COVER_IMAGE)?;
        let audio = record.asset(&AUDIO_FILE)?;

        let row = sqlx::query_as::<Postgres, SermonRow>(
            r#"
            INSERT INTO sermons (
                user_id, theme, minister, short_note,
                cover_image_url, cover_image_public_id, audio_url, audio_public_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, theme, minister, short_note,
                      cover_image_url, cover_image_public_id, audio_url, audio_public_id,
                      created_at, updated_at
            "#,
        )
        .bind(record.owner_id)
        .bind(&record.fields.theme)
        .bind(&record.fields.minister)
        .bind(&record.fields.short_note)
        .bind(&cover.remote_url)
        .bind(cover.public_id())
        .bind(&audio.remote_url)
        .bind(audio.public_id())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[tracing::instrument(skip(self), fields(db.table = "sermons", db.operation = "select", db.record_id = id))]
    async fn find_by_id(&self, id: i64) -> Result<Option<Sermon>, AppError> {
        let row = sqlx::query_as::<Postgres, SermonRow>(
            r#"
            SELECT id, user_id, theme, minister, short_note,
                   cover_image_url, cover_image_public_id, audio_url, audio_public_id,
                   created_at, updated_at
            FROM sermons
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Sermon::from))
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "sermons", db.operation = "update", db.record_id = record.id))]
    async fn update(&self, record: &Sermon) -> Result<Sermon, AppError> {
        let record = record.clone();
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let row = sqlx::query_as::<Postgres, SermonRow>(
                    r#"
                    UPDATE sermons
                    SET theme = $2,
                        minister = $3,
                        short_note = $4,
                        cover_image_url = $5,
                        cover_image_public_id = $6,
                        audio_url = $7,
                        audio_public_id = $8,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING id, user_id, theme, minister, short_note,
                              cover_image_url, cover_image_public_id, audio_url, audio_public_id,
                              created_at, updated_at
                    "#,
                )
                .bind(record.id)
                .bind(&record.theme)
                .bind(&record.minister)
                .bind(&record.short_note)
                .bind(&record.cover_image.remote_url)
                .bind(record.cover_image.public_id())
                .bind(&record.audio_file.remote_url)
                .bind(record.audio_file.public_id())
                .fetch_optional(&mut **tx)
                .await?;

                row.map(Sermon::from)
                    .ok_or_else(|| AppError::NotFound(format!("Sermon {} not found", record.id)))
            })
        })
        .await
    }

    #[tracing::instrument(skip(self), fields(db.table = "sermons", db.operation = "delete", db.record_id = id))]
    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sermons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "sermons", db.operation = "select"))]
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Sermon>, AppError> {
        let rows = sqlx::query_as::<Postgres, SermonRow>(
            r#"
            SELECT id, user_id, theme, minister, short_note,
                   cover_image_url, cover_image_public_id, audio_url, audio_public_id,
                   created_at, updated_at
            FROM sermons
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Sermon::from).collect())
    }
}
