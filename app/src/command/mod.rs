//! CLI commands and component wiring.

pub mod chat;

use std::sync::Arc;

use sea_orm::Database;
use tourdesk_booking::{SmtpConfirmationSender, SqlBookingStore};
use tourdesk_catalog::DbPackageCatalog;
use tourdesk_config::Config;
use tourdesk_conversation::{ConversationManager, SqlCheckpointStore};
use tourdesk_core::{ChatModel, ChatParams, DialogueEngine, EngineConfig};
use tourdesk_hotels::BookingComGateway;
use tourdesk_providers::OpenAiProvider;
use tourdesk_tools::travel_tool_registry;
use tracing::info;

/// Wire every component into a ready conversation manager.
pub async fn build_manager(config: &Config) -> anyhow::Result<ConversationManager> {
    let mut provider = OpenAiProvider::new(config.providers.openai.api_key.clone())?;
    if let Some(base_url) = &config.providers.openai.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    let model: Arc<dyn ChatModel> = Arc::new(provider);

    let packages_db = Database::connect(&config.database.packages_url).await?;
    let bookings_db = Database::connect(&config.database.bookings_url).await?;
    let sessions_db = Database::connect(&config.database.sessions_url).await?;

    let catalog = Arc::new(DbPackageCatalog::new(packages_db));
    let gateway = Arc::new(BookingComGateway::new(config.hotels.clone())?);

    let mut booking_store = SqlBookingStore::new(bookings_db);
    if let Some(smtp) = &config.smtp {
        booking_store = booking_store.with_sender(Arc::new(SmtpConfirmationSender::new(smtp)?));
        info!("Confirmation emails enabled via {}", smtp.relay);
    } else {
        info!("No SMTP configuration; confirmation emails disabled");
    }

    let registry = travel_tool_registry(catalog, gateway, Arc::new(booking_store))?;

    let engine = DialogueEngine::new(
        model,
        registry,
        EngineConfig {
            params: ChatParams {
                model: config.agent.model.clone(),
                temperature: config.agent.temperature,
                max_tokens: config.agent.max_tokens,
            },
            ..EngineConfig::default()
        },
    );

    let checkpoints = Arc::new(SqlCheckpointStore::new(sessions_db).await?);

    Ok(ConversationManager::new(engine, checkpoints))
}
