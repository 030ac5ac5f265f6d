use std::sync::Arc;

use rocket::{State, get, post, put, delete, http::Status, serde::json::Json};
use tracing::{debug, error, info, instrument};
use shared::{models::*, user_info::UserInfo, Roster};
use crate::{
    config::AppConfig,
    error::ApiError,
    guards::{AdminAccess, VoterAccess},
    processor::BallotProcessor,
    rate_limiter::RateLimiter,
    store::{StoreError, VoteStore},
};

pub struct AppState {
    pub store: Arc<VoteStore>,
    pub ballot_limiter: RateLimiter,
    pub config: AppConfig,
}

impl AppState {
    /// Opens (and if needed creates or migrates) the vote store.
    pub fn new(config: AppConfig) -> Result<Self, StoreError> {
        let store = VoteStore::new(config.votes_file.clone());
        store.initialize()?;

        Ok(Self {
            store: Arc::new(store),
            ballot_limiter: RateLimiter::new(config.ballot_rate_limit, config.ballot_rate_window_minutes),
            config,
        })
    }

    /// Runs a store operation on Tokio's blocking pool.
    pub async fn with_store<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&VoteStore) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        rocket::tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| {
                error!("Store task failed: {}", e);
                ApiError::Worker(e.to_string())
            })?
    }
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}

#[get("/roster")]
pub async fn get_roster(state: &State<AppState>) -> Json<Roster> {
    Json(state.config.roster.clone())
}

#[get("/voters/<voter>/status")]
pub async fn voter_status(state: &State<AppState>, voter: &str) -> Result<Json<VoterStatus>, ApiError> {
    let voter = voter.to_string();
    let lookup = voter.clone();
    let has_voted = state.with_store(move |store| Ok(store.has_voted(&lookup)?)).await?;
    Ok(Json(VoterStatus { voter, has_voted }))
}

#[get("/candidates?<category>")]
pub async fn get_candidates(state: &State<AppState>, category: &str) -> Result<Json<Vec<String>>, ApiError> {
    let category = category.to_string();
    let candidates = state.with_store(move |store| Ok(store.get_candidates(&category)?)).await?;
    Ok(Json(candidates))
}

#[instrument(skip(state, ballot, user_info, _access), fields(request_id = %user_info.id))]
#[post("/ballot", format = "json", data = "<ballot>")]
pub async fn cast_ballot(
    state: &State<AppState>,
    _access: VoterAccess,
    user_info: UserInfo,
    ballot: Json<BallotRequest>,
) -> Result<Json<BallotResponse>, ApiError> {
    let rate_limit_key = format!("cast_ballot:{}", user_info.user_fingerprint);
    state.ballot_limiter.check_rate_limit(&rate_limit_key)?;

    debug!(device = user_info.device().label(), "Processing ballot");
    let roster = state.config.roster.clone();
    let ballot = ballot.into_inner();
    let metadata = Some(user_info.metadata());
    state
        .with_store(move |store| Ok(BallotProcessor::submit(store, &roster, &ballot, metadata)?))
        .await
        .map(Json)
}

#[get("/results")]
pub async fn get_results(state: &State<AppState>, admin: Option<AdminAccess>) -> Result<Json<Leaderboard>, ApiError> {
    let categories = state.config.roster.categories.clone();
    let unlocked = admin.is_some();
    let leaderboard = state
        .with_store(move |store| {
            if store.get_settings()?.results_locked && !unlocked {
                return Err(ApiError::ResultsLocked);
            }
            Ok(store.get_leaderboard(&categories)?)
        })
        .await?;
    Ok(Json(leaderboard))
}

#[get("/settings")]
pub async fn get_settings(state: &State<AppState>) -> Result<Json<Settings>, ApiError> {
    let settings = state.with_store(|store| Ok(store.get_settings()?)).await?;
    Ok(Json(settings))
}

#[put("/admin/settings", format = "json", data = "<new_settings>")]
pub async fn update_settings(
    state: &State<AppState>,
    _admin: AdminAccess,
    new_settings: Json<Settings>,
) -> Result<Json<Settings>, ApiError> {
    let new_settings = new_settings.into_inner();
    let saved = state.with_store(move |store| Ok(store.update_settings(new_settings)?)).await?;
    Ok(Json(saved))
}

#[get("/admin/voters")]
pub async fn list_voter_stats(state: &State<AppState>, _admin: AdminAccess) -> Result<Json<Vec<VoterStats>>, ApiError> {
    let stats = state.with_store(|store| Ok(store.get_voter_stats()?)).await?;
    Ok(Json(stats))
}

#[instrument(skip(state, _admin))]
#[delete("/admin/voters/<voter>")]
pub async fn delete_voter(
    state: &State<AppState>,
    _admin: AdminAccess,
    voter: &str,
) -> Result<Json<RemovedResponse>, ApiError> {
    let voter = voter.to_string();
    let removed = state.with_store(move |store| Ok(store.delete_votes_for_voter(&voter)?)).await?;
    Ok(Json(RemovedResponse { removed }))
}

#[instrument(skip(state, _admin))]
#[delete("/admin/votes")]
pub async fn clear_votes(state: &State<AppState>, _admin: AdminAccess) -> Result<Json<RemovedResponse>, ApiError> {
    let removed = state.with_store(|store| Ok(store.clear_all_votes()?)).await?;
    info!("🧹 Ledger reset by admin");
    Ok(Json(RemovedResponse { removed }))
}
