//! Pluggable conversation checkpointing keyed by session id.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema, Set,
};
use tourdesk_core::{ChatMessage, CustomerIdentity};
use tracing::info;

use crate::session::ConversationSession;
use tourdesk_entities::sessions;

/// Load/save seam for conversation checkpoints. The core needs only
/// these two operations; the storage engine behind them is opaque.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load(&self, session_id: &str) -> anyhow::Result<Option<ConversationSession>>;
    async fn save(&self, session: &ConversationSession) -> anyhow::Result<()>;
}

fn is_table_already_exists_error(err: &DbErr) -> bool {
    err.to_string().contains("table") && err.to_string().contains("already exists")
}

/// Checkpoint store over the `sessions` table.
pub struct SqlCheckpointStore {
    db: DatabaseConnection,
}

impl SqlCheckpointStore {
    pub async fn new(db: DatabaseConnection) -> anyhow::Result<Self> {
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let stmt = schema.create_table_from_entity(sessions::Entity);
        match db.execute(&stmt).await {
            Ok(_) => {}
            Err(e) if is_table_already_exists_error(&e) => {
                info!("Sessions table already exists, skipping creation");
            }
            Err(e) => return Err(e.into()),
        }

        info!("Checkpoint store initialized");
        Ok(Self { db })
    }

    pub async fn list_sessions(&self) -> anyhow::Result<Vec<String>> {
        let models = sessions::Entity::find().all(&self.db).await?;
        Ok(models.into_iter().map(|m| m.key).collect())
    }

    pub async fn clear_session(&self, session_id: &str) -> anyhow::Result<()> {
        sessions::Entity::delete_by_id(session_id.to_owned())
            .exec(&self.db)
            .await?;
        info!("Cleared session: {session_id}");
        Ok(())
    }
}

#[async_trait]
impl CheckpointStore for SqlCheckpointStore {
    async fn load(&self, session_id: &str) -> anyhow::Result<Option<ConversationSession>> {
        let Some(model) = sessions::Entity::find_by_id(session_id.to_owned())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let messages: Vec<ChatMessage> = serde_json::from_str(&model.messages)?;

        Ok(Some(ConversationSession {
            id: model.key,
            identity: CustomerIdentity {
                name: model.customer_name,
                email: model.customer_email,
                phone: model.customer_mobile,
            },
            messages,
            created_at: model.created_at.and_utc(),
            updated_at: model.updated_at.and_utc(),
        }))
    }

    async fn save(&self, session: &ConversationSession) -> anyhow::Result<()> {
        let messages_json = serde_json::to_string(&session.messages)?;
        let created_at = session.created_at.naive_utc();
        let updated_at = session.updated_at.naive_utc();

        let active = sessions::ActiveModel {
            key: Set(session.id.clone()),
            messages: Set(messages_json),
            customer_name: Set(session.identity.name.clone()),
            customer_email: Set(session.identity.email.clone()),
            customer_mobile: Set(session.identity.phone.clone()),
            created_at: Set(created_at),
            updated_at: Set(updated_at),
        };

        let exists = sessions::Entity::find_by_id(session.id.clone())
            .one(&self.db)
            .await?
            .is_some();

        if exists {
            sessions::Entity::update(active).exec(&self.db).await?;
        } else {
            active.insert(&self.db).await?;
        }

        info!(
            "Checkpointed session {} ({} messages)",
            session.id,
            session.messages.len()
        );
        Ok(())
    }
}
