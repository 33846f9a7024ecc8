use std::{env, time::Duration};

use log::*;
use vbg_common::Secret;

const DEFAULT_VBG_HOST: &str = "127.0.0.1";
const DEFAULT_VBG_PORT: u16 = 8360;
const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";
const DEFAULT_PROCESSOR_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONTRACT_STORAGE_DIR: &str = "data/contracts";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Payment processor (Stripe) configuration.
    pub stripe: StripeConfig,
    /// Contract document rendering configuration.
    pub contracts: ContractConfig,
}

#[derive(Clone, Debug, Default)]
pub struct StripeConfig {
    /// The API key used to authenticate outbound calls to the processor.
    pub secret_key: Secret<String>,
    /// The shared secret for verifying webhook signatures. If unset, all webhook deliveries are rejected.
    pub webhook_secret: Secret<String>,
    /// The processor's API base URL. Overridable for tests.
    pub api_url: String,
    /// Upper bound on any single outbound processor call.
    pub timeout: Duration,
}

#[derive(Clone, Debug, Default)]
pub struct ContractConfig {
    /// Directory that rendered contract documents are written to.
    pub storage_dir: String,
    /// Base URL under which the storage directory is publicly served.
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_VBG_HOST.to_string(),
            port: DEFAULT_VBG_PORT,
            database_url: String::default(),
            stripe: StripeConfig::default(),
            contracts: ContractConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("VBG_HOST").ok().unwrap_or_else(|| DEFAULT_VBG_HOST.into());
        let port = env::var("VBG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for VBG_PORT. {e} Using the default, {DEFAULT_VBG_PORT}, instead."
                    );
                    DEFAULT_VBG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_VBG_PORT);
        let database_url = env::var("VBG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ VBG_DATABASE_URL is not set. Please set it to the URL for the bookings database.");
            String::default()
        });
        let stripe = StripeConfig::from_env_or_default();
        let contracts = ContractConfig::from_env_or_default();
        Self { host, port, database_url, stripe, contracts }
    }
}

impl StripeConfig {
    pub fn from_env_or_default() -> Self {
        let secret_key = env::var("VBG_STRIPE_SECRET_KEY").ok().unwrap_or_else(|| {
            error!("🪛️ VBG_STRIPE_SECRET_KEY is not set. Outbound payment processor calls will fail.");
            String::default()
        });
        let webhook_secret = env::var("VBG_STRIPE_WEBHOOK_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ VBG_STRIPE_WEBHOOK_SECRET is not set. All incoming payment webhook notifications will be \
                 rejected."
            );
            String::default()
        });
        let api_url = env::var("VBG_STRIPE_API_URL").ok().unwrap_or_else(|| {
            info!("🪛️ VBG_STRIPE_API_URL is not set. Using the default, {DEFAULT_STRIPE_API_URL}.");
            DEFAULT_STRIPE_API_URL.to_string()
        });
        let timeout = env::var("VBG_PROCESSOR_TIMEOUT_SECS")
            .map_err(|_| {
                info!(
                    "🪛️ VBG_PROCESSOR_TIMEOUT_SECS is not set. Using the default value of \
                     {DEFAULT_PROCESSOR_TIMEOUT_SECS} seconds."
                )
            })
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for VBG_PROCESSOR_TIMEOUT_SECS. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_PROCESSOR_TIMEOUT_SECS);
        Self {
            secret_key: Secret::new(secret_key),
            webhook_secret: Secret::new(webhook_secret),
            api_url,
            timeout: Duration::from_secs(timeout),
        }
    }
}

impl ContractConfig {
    pub fn from_env_or_default() -> Self {
        let storage_dir = env::var("VBG_CONTRACT_STORAGE_DIR").ok().unwrap_or_else(|| {
            info!("🪛️ VBG_CONTRACT_STORAGE_DIR is not set. Using the default, {DEFAULT_CONTRACT_STORAGE_DIR}.");
            DEFAULT_CONTRACT_STORAGE_DIR.to_string()
        });
        let public_base_url = env::var("VBG_PUBLIC_BASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ VBG_PUBLIC_BASE_URL is not set. Contract document URLs will be relative.");
            String::default()
        });
        Self { storage_dir, public_base_url }
    }
}
