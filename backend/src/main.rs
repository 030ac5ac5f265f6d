use backend::{build_rocket, config::AppConfig};
use shuttle_runtime::CustomError;
use tracing::{info, warn};

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    info!("🏆 Starting awards ballot server");

    let config = AppConfig::from_lookup(|key| secret_store.get(key));
    if config.access_secret.is_none() {
        warn!("ACCESS_SECRET not found - ballot submission is open to anyone");
    }
    if config.admin_secret.is_none() {
        warn!("ADMIN_SECRET not found - admin operations are disabled");
    }
    info!(
        "📋 {} voters, {} categories, ledger at {}",
        config.roster.voters.len(),
        config.roster.categories.len(),
        config.votes_file.display()
    );

    let rocket = build_rocket(config).map_err(CustomError::new)?;
    Ok(rocket.into())
}
