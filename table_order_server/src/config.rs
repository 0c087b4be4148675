use std::{env, time::Duration as StdDuration};

use chrono::Duration;
use log::*;
use paytm_tools::PaytmConfig;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use tos_common::{helpers::parse_boolean_flag, Secret};

const DEFAULT_TOS_HOST: &str = "127.0.0.1";
const DEFAULT_TOS_PORT: u16 = 8360;
const DEFAULT_GATEWAY_TIMEOUT: StdDuration = StdDuration::from_secs(15);
const DEFAULT_RECONCILE_INTERVAL: StdDuration = StdDuration::from_secs(60);
const DEFAULT_STALE_PAYMENT_AGE: Duration = Duration::minutes(5);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub callback: GatewayCallbackConfig,
    pub proxy: ProxyConfig,
    /// Upper bound on any single call to the payment gateway.
    pub gateway_timeout: StdDuration,
    /// How often the worker sweeps for payments that the gateway has not called back about.
    pub reconcile_interval: StdDuration,
    /// A handed-off payment must have been quiet for this long before the worker queries the gateway about it.
    pub stale_payment_age: Duration,
    pub paytm: PaytmConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_TOS_HOST.to_string(),
            port: DEFAULT_TOS_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            callback: GatewayCallbackConfig::default(),
            proxy: ProxyConfig::default(),
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
            reconcile_interval: DEFAULT_RECONCILE_INTERVAL,
            stale_payment_age: DEFAULT_STALE_PAYMENT_AGE,
            paytm: PaytmConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("TOS_HOST").ok().unwrap_or_else(|| DEFAULT_TOS_HOST.into());
        let port = env::var("TOS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for TOS_PORT. {e} Using the default, {DEFAULT_TOS_PORT}, instead."
                    );
                    DEFAULT_TOS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_TOS_PORT);
        let database_url = env::var("TOS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ TOS_DATABASE_URL is not set. Please set it to the URL for the table order database.");
            String::default()
        });
        let auth = AuthConfig::from_env_or_default();
        let callback = GatewayCallbackConfig::from_env_or_default();
        let proxy = ProxyConfig::from_env_or_default();
        let gateway_timeout = seconds_from_env("TOS_GATEWAY_TIMEOUT_SECS")
            .map(StdDuration::from_secs)
            .unwrap_or(DEFAULT_GATEWAY_TIMEOUT);
        let reconcile_interval = seconds_from_env("TOS_RECONCILE_INTERVAL_SECS")
            .filter(|&s| {
                if s == 0 {
                    warn!("🪛️ TOS_RECONCILE_INTERVAL_SECS must be positive. Using the default instead.");
                }
                s > 0
            })
            .map(StdDuration::from_secs)
            .unwrap_or(DEFAULT_RECONCILE_INTERVAL);
        let stale_payment_age = seconds_from_env("TOS_STALE_PAYMENT_AGE_SECS")
            .and_then(|s| i64::try_from(s).ok())
            .map(Duration::seconds)
            .unwrap_or(DEFAULT_STALE_PAYMENT_AGE);
        info!(
            "🪛️ Gateway calls time out after {}s. Pending payments older than {}s are reconciled every {}s.",
            gateway_timeout.as_secs(),
            stale_payment_age.num_seconds(),
            reconcile_interval.as_secs()
        );
        let paytm = PaytmConfig::new_from_env_or_default();
        Self {
            host,
            port,
            database_url,
            auth,
            callback,
            proxy,
            gateway_timeout,
            reconcile_interval,
            stale_payment_age,
            paytm,
        }
    }
}

fn seconds_from_env(name: &str) -> Option<u64> {
    let value = env::var(name).ok()?;
    value.trim().parse::<u64>().map_err(|e| warn!("🪛️ Invalid configuration value for {name}: '{value}'. {e}")).ok()
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HS256 key that access tokens are signed with. Tokens are issued by the account service, not this server.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. No access token \
             issued elsewhere will be accepted. Set TOS_JWT_SECRET. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(jwt_secret: S) -> Self {
        Self { jwt_secret: Secret::new(jwt_secret.into()) }
    }

    pub fn from_env_or_default() -> Self {
        match env::var("TOS_JWT_SECRET") {
            Ok(s) if !s.is_empty() => Self::new(s),
            _ => Self::default(),
        }
    }
}

//-------------------------------------------------  GatewayCallbackConfig  --------------------------------------------
#[derive(Clone, Debug)]
pub struct GatewayCallbackConfig {
    /// Shared secret for the `X-Gateway-Signature` HMAC on payment callbacks.
    pub hmac_secret: Secret<String>,
    /// If false, callbacks are accepted without checking their signature. **DANGER**
    pub hmac_checks: bool,
}

impl Default for GatewayCallbackConfig {
    fn default() -> Self {
        Self { hmac_secret: Secret::default(), hmac_checks: true }
    }
}

impl GatewayCallbackConfig {
    pub fn from_env_or_default() -> Self {
        let hmac_secret = env::var("TOS_GATEWAY_HMAC_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ TOS_GATEWAY_HMAC_SECRET is not set. Please set it to the secret shared with the payment gateway's \
                 callback relay."
            );
            String::default()
        });
        let hmac_checks = parse_boolean_flag(env::var("TOS_GATEWAY_HMAC_CHECKS").ok(), true);
        if !hmac_checks {
            warn!("🚨️ Gateway callback signatures are NOT being checked. Do not run production like this.");
        }
        Self { hmac_secret: Secret::new(hmac_secret), hmac_checks }
    }
}

//-------------------------------------------------  ProxyConfig  ------------------------------------------------------
/// How to find a caller's address when the server sits behind a reverse proxy. Only used for logging.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProxyConfig {
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the `for=` field of the Forwarded header will be used to determine the client's IP address.
    pub use_forwarded: bool,
}

impl ProxyConfig {
    pub fn from_env_or_default() -> Self {
        let use_x_forwarded_for = parse_boolean_flag(env::var("TOS_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("TOS_USE_FORWARDED").ok(), false);
        Self { use_x_forwarded_for, use_forwarded }
    }
}
