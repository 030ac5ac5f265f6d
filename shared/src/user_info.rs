use serde::{Serialize, Deserialize};
use uuid::Uuid;
use crate::models::VoteMetadata;

/// Who is on the other end of a request. `id` is per request and only used to
/// correlate log lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub user_fingerprint: String,
    pub ip: String,
    pub user_agent: Option<String>,
}

impl UserInfo {
    pub fn device(&self) -> DeviceClass {
        self.user_agent.as_deref().map_or(DeviceClass::Unknown, classify_user_agent)
    }

    pub fn metadata(&self) -> VoteMetadata {
        VoteMetadata {
            ip: self.ip.clone(),
            user_agent: self.device().label().to_string(),
            raw_ua: self.user_agent.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    IPhone,
    AndroidPhone,
    IPad,
    AndroidTablet,
    MacDesktop,
    WindowsDesktop,
    LinuxDesktop,
    Unknown,
}

impl DeviceClass {
    pub const fn label(self) -> &'static str {
        match self {
            DeviceClass::IPhone => "iPhone",
            DeviceClass::AndroidPhone => "Android Phone",
            DeviceClass::IPad => "iPad",
            DeviceClass::AndroidTablet => "Android Tablet",
            DeviceClass::MacDesktop => "Mac Desktop",
            DeviceClass::WindowsDesktop => "Windows Desktop",
            DeviceClass::LinuxDesktop => "Linux Desktop",
            DeviceClass::Unknown => "Unknown",
        }
    }
}

/// Coarse device bucket from a User-Agent header. Order matters: iPad and
/// Android agents also mention desktop platforms.
pub fn classify_user_agent(user_agent: &str) -> DeviceClass {
    let ua = user_agent.to_ascii_lowercase();
    if ua.contains("ipad") {
        DeviceClass::IPad
    } else if ua.contains("iphone") {
        DeviceClass::IPhone
    } else if ua.contains("android") {
        if ua.contains("mobile") { DeviceClass::AndroidPhone } else { DeviceClass::AndroidTablet }
    } else if ua.contains("macintosh") || ua.contains("mac os x") {
        DeviceClass::MacDesktop
    } else if ua.contains("windows") {
        DeviceClass::WindowsDesktop
    } else if ua.contains("linux") || ua.contains("x11") {
        DeviceClass::LinuxDesktop
    } else {
        DeviceClass::Unknown
    }
}

pub fn generate_server_fingerprint(ip: &str, user_agent: Option<&str>) -> String {
    use base64::engine::general_purpose::URL_SAFE;
    use base64::Engine;
    use sha2::{Sha256, Digest};

    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    if let Some(ua) = user_agent {
        hasher.update(ua.as_bytes());
    }
    URL_SAFE.encode(hasher.finalize())
}

#[cfg(feature = "backend")]
mod backend_impl {
    use super::*;
    use rocket::request::{FromRequest, Outcome};
    use rocket::Request;

    #[rocket::async_trait]
    impl<'r> FromRequest<'r> for UserInfo {
        type Error = ();

        async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
            let headers = req.headers();
            let ip = headers.get_one("X-Real-IP")
                .or_else(|| headers.get_one("X-Forwarded-For").and_then(|v| v.split(',').next()))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .or_else(|| req.client_ip().map(|ip| ip.to_string()))
                .unwrap_or_else(|| "0.0.0.0".to_string());

            let user_agent = headers.get_one("User-Agent").map(str::to_string);
            let fingerprint = super::generate_server_fingerprint(&ip, user_agent.as_deref());

            Outcome::Success(UserInfo {
                id: Uuid::new_v4(),
                user_fingerprint: fingerprint,
                ip,
                user_agent,
            })
        }
    }
}
