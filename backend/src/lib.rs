pub mod catchers;
pub mod config;
pub mod cors;
pub mod error;
pub mod guards;
pub mod processor;
pub mod rate_limiter;
pub mod routes;
pub mod store;
pub use shared::user_info;
pub use shared::{models::*, user_info::*, Roster};

use rocket::{catchers, routes, Build, Rocket};

use crate::{
    catchers::{bad_request, forbidden, internal_error, not_found, too_many_requests, unauthorized, unprocessable},
    config::AppConfig,
    cors::CORS,
    routes::*,
    store::StoreError,
};

/// Opens the vote store and assembles the API.
pub fn build_rocket(config: AppConfig) -> Result<Rocket<Build>, StoreError> {
    let cors = CORS::new(config.allowed_origin_prefix.clone());
    let app_state = AppState::new(config)?;

    Ok(rocket::build()
        .attach(cors)
        .manage(app_state)
        .mount(
            "/api",
            routes![
                all_options,
                get_roster,
                voter_status,
                get_candidates,
                cast_ballot,
                get_results,
                get_settings,
                update_settings,
                list_voter_stats,
                delete_voter,
                clear_votes
            ],
        )
        .register(
            "/",
            catchers![
                unauthorized,
                forbidden,
                too_many_requests,
                bad_request,
                unprocessable,
                internal_error,
                not_found
            ],
        ))
}
