use anyhow::Result;
use log::{info, warn};

use studio_backend::{Backend, StudioConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; RUST_LOG overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = StudioConfig::load()?;
    info!(
        "Starting studio backend (data: {:?}, locale: {})",
        config.data_directory,
        config.default_locale.code()
    );

    let backend = Backend::open(config)?;
    backend.start().await;

    match backend.session.current_user().await {
        Some(user) => info!("Signed in as {} ({:?})", user.email, user.role),
        None => info!("No active session"),
    }

    for (day, classes) in backend.catalog.schedule_by_day().await {
        for class in classes {
            let group = backend
                .catalog
                .get_group_by_id(&class.group_id)
                .await
                .map(|group| group.name)
                .unwrap_or_else(|| class.group_id.clone());
            info!(
                "{:<9} {}-{}  {}  {}",
                day.name(),
                class.start_time,
                class.end_time,
                group,
                class.trainer_name.as_deref().unwrap_or("-")
            );
        }
    }

    if let Some(error) = backend.catalog.error().await {
        warn!("Catalog reported: {}", error);
    }

    Ok(())
}
