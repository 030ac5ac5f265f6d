use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use ring::constant_time::verify_slices_are_equal;
use tracing::{debug, warn};

use crate::routes::AppState;

pub const ACCESS_HEADER: &str = "X-Access-Secret";
pub const ADMIN_HEADER: &str = "X-Admin-Secret";

/// Proof that the caller knows the voting passcode. Always granted when no
/// passcode is configured.
#[derive(Debug)]
pub struct VoterAccess;

/// Proof that the caller knows the admin passcode. Never granted when no
/// admin passcode is configured.
#[derive(Debug)]
pub struct AdminAccess;

pub fn secret_matches(given: Option<&str>, expected: &str) -> bool {
    given.map_or(false, |given| {
        verify_slices_are_equal(given.as_bytes(), expected.as_bytes()).is_ok()
    })
}

fn app_state<'r>(req: &'r Request<'_>) -> Option<&'r AppState> {
    req.rocket().state::<AppState>()
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for VoterAccess {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(state) = app_state(req) else {
            return Outcome::Error((Status::InternalServerError, ()));
        };

        match &state.config.access_secret {
            None => Outcome::Success(VoterAccess),
            Some(expected) if secret_matches(req.headers().get_one(ACCESS_HEADER), expected) => {
                Outcome::Success(VoterAccess)
            }
            Some(_) => {
                debug!("Rejected request with missing or wrong voting passcode");
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminAccess {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(state) = app_state(req) else {
            return Outcome::Error((Status::InternalServerError, ()));
        };

        let given = req.headers().get_one(ADMIN_HEADER);
        match &state.config.admin_secret {
            Some(expected) if secret_matches(given, expected) => Outcome::Success(AdminAccess),
            _ => {
                if given.is_some() {
                    warn!("Rejected admin request for {}", req.uri());
                }
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}
