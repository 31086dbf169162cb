use super::models::{self as notes, NoteCreate};
use crate::common::errors::BusinessResult;
use crate::{samples, validation_error};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

/// Notes of a sample, oldest first
pub async fn list<C: ConnectionTrait>(db: &C, sample_id: &str) -> BusinessResult<Vec<notes::Model>> {
    samples::services::find_by_sample_id(db, sample_id).await?;
    Ok(notes::Entity::find()
        .filter(notes::Column::SampleId.eq(sample_id))
        .order_by_asc(notes::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Append a note. Notes are never edited or removed individually.
pub async fn append<C: ConnectionTrait>(
    db: &C,
    sample_id: &str,
    data: NoteCreate,
) -> BusinessResult<notes::Model> {
    let text = data.text.trim();
    if text.is_empty() {
        return Err(validation_error!("text", "a note cannot be empty"));
    }
    samples::services::find_by_sample_id(db, sample_id).await?;

    let note = notes::ActiveModel {
        id: Set(Uuid::new_v4()),
        sample_id: Set(sample_id.to_string()),
        author: Set(data.author.filter(|author| !author.trim().is_empty())),
        text: Set(text.to_string()),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await?;

    info!(sample_id, note_id = %note.id, "Added note");
    Ok(note)
}
