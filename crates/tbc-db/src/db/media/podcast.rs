use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres};
use tbc_core::media::{COVER_IMAGE, VIDEO_FILE};
use tbc_core::models::{NewRecord, Podcast};
use tbc_core::{AppError, MediaAsset, MediaKind};

use crate::db::record::RecordRepository;
use crate::db::transaction::with_transaction;

#[derive(Debug, FromRow)]
struct PodcastRow {
    id: i64,
    user_id: i64,
    title: String,
    running_episodes: i32,
    cover_image_url: String,
    cover_image_public_id: String,
    video_url: String,
    video_public_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PodcastRow> for Podcast {
    fn from(row: PodcastRow) -> Self {
        Podcast {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            running_episodes: row.running_episodes,
            cover_image: MediaAsset::from_public_id(
                &row.cover_image_public_id,
                row.cover_image_url,
                MediaKind::Image,
            ),
            video_file: MediaAsset::from_public_id(
                &row.video_public_id,
                row.video_url,
                MediaKind::Video,
            ),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for podcasts
#[derive(Clone)]
pub struct PostgresPodcastRepository {
    pool: PgPool,
}

impl PostgresPodcastRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordRepository<Podcast> for PostgresPodcastRepository {
    #[tracing::instrument(skip(self, record), fields(db.table = "podcasts", db.operation = "insert", user.id = record.owner_id))]
    async fn insert(&self, record: NewRecord<Podcast>) -> Result<Podcast, AppError> {
        let cover = record.asset(&COVER_IMAGE)?;
        let video = record.asset(&VIDEO_FILE)?;

        let row = sqlx::query_as::<Postgres, PodcastRow>(
            r#"
            INSERT INTO podcasts (
                user_id, title, running_episodes,
                cover_image_url, cover_image_public_id, video_url, video_public_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, title, running_episodes,
                      cover_image_url, cover_image_public_id, video_url, video_public_id,
                      created_at, updated_at
            "#,
        )
        .bind(record.owner_id)
        .bind(&record.fields.title)
        .bind(record.fields.running_episodes)
        .bind(&cover.remote_url)
        .bind(cover.public_id())
        .bind(&video.remote_url)
        .bind(video.public_id())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[tracing::instrument(skip(self), fields(db.table = "podcasts", db.operation = "select", db.record_id = id))]
    async fn find_by_id(&self, id: i64) -> Result<Option<Podcast>, AppError> {
        let row = sqlx::query_as::<Postgres, PodcastRow>(
            r#"
            SELECT id, user_id, title, running_episodes,
                   cover_image_url, cover_image_public_id, video_url, video_public_id,
                   created_at, updated_at
            FROM podcasts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Podcast::from))
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "podcasts", db.operation = "update", db.record_id = record.id))]
    async fn update(&self, record: &Podcast) -> Result<Podcast, AppError> {
        let record = record.clone();
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let row = sqlx::query_as::<Postgres, PodcastRow>(
                    r#"
                    UPDATE podcasts
                    SET title = $2,
                        running_episodes = $3,
                        cover_image_url = $4,
                        cover_image_public_id = $5,
                        video_url = $6,
                        video_public_id = $7,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING id, user_id, title, running_episodes,
                              cover_image_url, cover_image_public_id, video_url, video_public_id,
                              created_at, updated_at
                    "#,
                )
                .bind(record.id)
                .bind(&record.title)
                .bind(record.running_episodes)
                .bind(&record.cover_image.remote_url)
                .bind(record.cover_image.public_id())
                .bind(&record.video_file.remote_url)
                .bind(record.video_file.public_id())
                .fetch_optional(&mut **tx)
                .await?;

                row.map(Podcast::from)
                    .ok_or_else(|| AppError::NotFound(format!("Podcast {} not found", record.id)))
            })
        })
        .await
    }

    #[tracing::instrument(skip(self), fields(db.table = "podcasts", db.operation = "delete", db.record_id = id))]
    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM podcasts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "podcasts", db.operation = "select"))]
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Podcast>, AppError> {
        let rows = sqlx::query_as::<Postgres, PodcastRow>(
            r#"
            SELECT id, user_id, title, running_episodes,
                   cover_image_url, cover_image_public_id, video_url, video_public_id,
                   created_at, updated_at
            FROM podcasts
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Podcast::from).collect())
    }
}
