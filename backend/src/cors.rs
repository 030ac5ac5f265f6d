use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Request, Response};
use rocket::http::Header;

use crate::guards::{ACCESS_HEADER, ADMIN_HEADER};

/// Echoes the request origin back when it starts with the configured prefix.
pub struct CORS {
    origin_prefix: String,
}

impl CORS {
    pub fn new(origin_prefix: impl Into<String>) -> Self {
        Self { origin_prefix: origin_prefix.into() }
    }
}

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let Some(origin) = req.headers().get_one("Origin") else { return };

        if origin.starts_with(&self.origin_prefix) {
            res.set_header(Header::new("Access-Control-Allow-Origin", origin.to_string()));
            res.set_header(Header::new("Access-Control-Allow-Methods", "POST, GET, PUT, OPTIONS, DELETE"));
            res.set_header(Header::new(
                "Access-Control-Allow-Headers",
                format!("Content-Type, {ACCESS_HEADER}, {ADMIN_HEADER}"),
            ));
            res.set_header(Header::new("Access-Control-Max-Age", "86400"));
        }
    }
}
