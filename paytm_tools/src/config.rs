use std::time::Duration;

use log::*;
use tos_common::Secret;

const DEFAULT_BASE_URL: &str = "https://securegw-stage.paytm.in";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct PaytmConfig {
    pub merchant_id: String,
    pub merchant_key: Secret<String>,
    pub website: String,
    /// Gateway host, e.g. the staging or production endpoint.
    pub base_url: String,
    /// Where the gateway sends the diner after payment. The transaction id is appended as `ORDER_ID`.
    pub callback_url: String,
    pub timeout: Duration,
}

impl Default for PaytmConfig {
    fn default() -> Self {
        Self {
            merchant_id: String::default(),
            merchant_key: Secret::default(),
            website: "WEBSTAGING".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            callback_url: String::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PaytmConfig {
    pub fn new_from_env_or_default() -> Self {
        let merchant_id = std::env::var("TOS_PAYTM_MERCHANT_ID").unwrap_or_else(|_| {
            warn!("🪛️ TOS_PAYTM_MERCHANT_ID not set, using (probably useless) default");
            "MERCHANT000000000000".to_string()
        });
        let merchant_key = Secret::new(std::env::var("TOS_PAYTM_MERCHANT_KEY").unwrap_or_else(|_| {
            warn!("🪛️ TOS_PAYTM_MERCHANT_KEY not set, using (probably useless) default");
            "0000000000000000".to_string()
        }));
        let website = std::env::var("TOS_PAYTM_WEBSITE").unwrap_or_else(|_| {
            info!("🪛️ TOS_PAYTM_WEBSITE not set, using WEBSTAGING");
            "WEBSTAGING".to_string()
        });
        let base_url = std::env::var("TOS_PAYTM_BASE_URL").unwrap_or_else(|_| {
            info!("🪛️ TOS_PAYTM_BASE_URL not set, using the staging gateway {DEFAULT_BASE_URL}");
            DEFAULT_BASE_URL.to_string()
        });
        let callback_url = std::env::var("TOS_PAYTM_CALLBACK_URL").unwrap_or_else(|_| {
            warn!("🪛️ TOS_PAYTM_CALLBACK_URL not set, using the staging callback page");
            format!("{DEFAULT_BASE_URL}/theia/paytmCallback")
        });
        let timeout = std::env::var("TOS_PAYTM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid TOS_PAYTM_TIMEOUT_SECS value '{s}'. {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self { merchant_id, merchant_key, website, base_url, callback_url, timeout }
    }
}
