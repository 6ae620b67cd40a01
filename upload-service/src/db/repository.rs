use async_trait::async_trait;
use shared::database::{self, DbPool};
use sqlx::PgPool;
use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::models::{NewUpload, UploadRecord};

const UPLOAD_COLUMNS: &str = "id, artist_name, artist_lyrics, blog_title, blog_description, \
    event_date, about_description_1, about_description_2, about_description_3, \
    artist_image, carousel_image, blog_image, event_image, about_image_1, about_image_2";

/// Insert a new upload record
pub async fn create_upload(pool: &PgPool, upload: NewUpload) -> Result<UploadRecord, sqlx::Error> {
    let id = Uuid::new_v4();

    let sql = format!(
        r#"
        INSERT INTO uploads ({UPLOAD_COLUMNS})
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING {UPLOAD_COLUMNS}
        "#
    );

    let record = sqlx::query_as::<_, UploadRecord>(&sql)
        .bind(id)
        .bind(&upload.artist_name)
        .bind(&upload.artist_lyrics)
        .bind(&upload.blog_title)
        .bind(&upload.blog_description)
        .bind(&upload.event_date)
        .bind(&upload.about_description_1)
        .bind(&upload.about_description_2)
        .bind(&upload.about_description_3)
        .bind(&upload.artist_image)
        .bind(&upload.carousel_image)
        .bind(&upload.blog_image)
        .bind(&upload.event_image)
        .bind(&upload.about_image_1)
        .bind(&upload.about_image_2)
        .fetch_one(pool)
        .await?;

    tracing::info!("Created upload record: id={}", record.id);
    Ok(record)
}

/// All upload records, unordered
pub async fn list_uploads(pool: &PgPool) -> Result<Vec<UploadRecord>, sqlx::Error> {
    let sql = format!("SELECT {UPLOAD_COLUMNS} FROM uploads");

    let records = sqlx::query_as::<_, UploadRecord>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(records)
}

/// Postgres-backed record store
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: DbPool,
}

impl PgRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, upload: NewUpload) -> Result<UploadRecord, StoreError> {
        Ok(create_upload(&self.pool, upload).await?)
    }

    async fn list_all(&self) -> Result<Vec<UploadRecord>, StoreError> {
        Ok(list_uploads(&self.pool).await?)
    }

    async fn ping(&self) -> bool {
        database::health_check(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageField;
    use pretty_assertions::assert_eq;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres server at DATABASE_URL"]
    async fn test_insert_and_list_round_trip(pool: PgPool) {
        let mut upload = NewUpload::default();
        upload.set_text("artist_name", "Jane".to_string());
        upload.set_text("about_description_3", "three".to_string());
        upload.set_image(ImageField::EventImage, "https://cdn.example/e.jpg".to_string());

        let created = create_upload(&pool, upload.clone()).await.unwrap();
        assert_eq!(created.upload, upload);
        assert_eq!(created.upload.blog_title, None);
        assert_eq!(created.upload.artist_image, "");

        let listed = list_uploads(&pool).await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres server at DATABASE_URL"]
    async fn test_store_ping_and_empty_listing(pool: PgPool) {
        let store = PgRecordStore::new(pool);
        assert!(store.ping().await);
        assert!(store.list_all().await.unwrap().is_empty());
    }
}
