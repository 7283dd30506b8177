use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub whatsapp_api_url: String,
    pub whatsapp_api_version: String,
    pub whatsapp_access_token: String,
    pub whatsapp_phone_number_id: String,
    pub whatsapp_verify_token: String,
    pub whatsapp_app_secret: String,
    pub admin_api_token: String,
    pub clinic_api_base_url: String,
    pub whatsapp_api_timeout_secs: u64,
    pub clinic_api_timeout_secs: u64,
    pub session_idle_minutes: i64,
    pub session_sweep_secs: u64,
    pub contact_text: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            port: parsed_var("PORT", 8080),
            whatsapp_api_url: env::var("WHATSAPP_API_URL")
                .unwrap_or_else(|_| "https://graph.facebook.com".to_string()),
            whatsapp_api_version: env::var("WHATSAPP_API_VERSION")
                .unwrap_or_else(|_| "v18.0".to_string()),
            whatsapp_access_token: env::var("WHATSAPP_ACCESS_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("WHATSAPP_ACCESS_TOKEN not set, using empty value");
                    String::new()
                }),
            whatsapp_phone_number_id: env::var("WHATSAPP_PHONE_NUMBER_ID")
                .unwrap_or_else(|_| {
                    warn!("WHATSAPP_PHONE_NUMBER_ID not set, using empty value");
                    String::new()
                }),
            whatsapp_verify_token: env::var("WHATSAPP_VERIFY_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("WHATSAPP_VERIFY_TOKEN not set, using empty value");
                    String::new()
                }),
            whatsapp_app_secret: env::var("WHATSAPP_APP_SECRET")
                .unwrap_or_else(|_| {
                    warn!("WHATSAPP_APP_SECRET not set, webhook signatures will not be checked");
                    String::new()
                }),
            admin_api_token: env::var("ADMIN_API_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("ADMIN_API_TOKEN not set, admin endpoints are disabled");
                    String::new()
                }),
            clinic_api_base_url: env::var("CLINIC_API_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_API_BASE_URL not set, using default");
                    "http://localhost:8082".to_string()
                }),
            whatsapp_api_timeout_secs: bounded_var("WHATSAPP_API_TIMEOUT_SECS", 30, 1..=300),
            clinic_api_timeout_secs: bounded_var("CLINIC_API_TIMEOUT_SECS", 15, 1..=300),
            // One week at most
            session_idle_minutes: bounded_var("SESSION_IDLE_MINUTES", 30, 1..=10_080),
            session_sweep_secs: bounded_var("SESSION_SWEEP_SECS", 60, 1..=3_600),
            contact_text: env::var("CONTACT_TEXT")
                .unwrap_or_else(|_| "📞 Contact us at: +91-98765-43210".to_string()),
        };

        if !config.is_whatsapp_configured() {
            warn!("WhatsApp not fully configured - outbound messages will fail");
        }

        config
    }

    pub fn is_whatsapp_configured(&self) -> bool {
        !self.whatsapp_access_token.is_empty()
            && !self.whatsapp_phone_number_id.is_empty()
            && !self.whatsapp_verify_token.is_empty()
    }

    pub fn is_signature_check_enabled(&self) -> bool {
        !self.whatsapp_app_secret.is_empty()
    }

    pub fn is_admin_enabled(&self) -> bool {
        !self.admin_api_token.is_empty()
    }
}

fn parsed_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has an invalid value '{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

fn bounded_var<T>(key: &str, default: T, range: RangeInclusive<T>) -> T
where
    T: FromStr + PartialOrd + Display + Copy,
{
    within_range(key, parsed_var(key, default), default, range)
}

fn within_range<T: PartialOrd + Display>(key: &str, value: T, default: T, range: RangeInclusive<T>) -> T {
    if range.contains(&value) {
        return value;
    }
    warn!(
        "{} = {} is outside {}..={}, using {}",
        key,
        value,
        range.start(),
        range.end(),
        default
    );
    default
}
