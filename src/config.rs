use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::Deserialize;
use url::Url;

const DEFAULT_PLATFORM_BASE_URL: &str = "https://developer.api.autodesk.com";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STATIC_DIR: &str = "www";

#[derive(Debug, Deserialize, Default)]
struct ConfigEnv {
    client_id: Option<String>,
    client_secret: Option<String>,
    platform_base_url: Option<Url>,
    port: Option<u16>,
    static_dir: Option<String>,
}

pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub platform_base_url: Url,
    pub port: u16,
    pub static_dir: String,
}

fn resolve(env: ConfigEnv) -> Result<Config> {
    let client_id = env.client_id.context("CLIENT_ID not set")?;
    let client_secret = env.client_secret.context("CLIENT_SECRET not set")?;

    let platform_base_url = match env.platform_base_url {
        Some(url) => url,
        None => Url::parse(DEFAULT_PLATFORM_BASE_URL)?,
    };

    Ok(Config {
        client_id,
        client_secret,
        platform_base_url,
        port: env.port.unwrap_or(DEFAULT_PORT),
        static_dir: env
            .static_dir
            .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
    })
}

pub fn read_config() -> Result<Config> {
    let _ = dotenv();
    let env_config = envy::from_env::<ConfigEnv>().unwrap_or_default();
    resolve(env_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_applies_defaults() {
        let config = resolve(ConfigEnv {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            ..ConfigEnv::default()
        })
        .unwrap();

        assert_eq!(config.platform_base_url.as_str(), "https://developer.api.autodesk.com/");
        assert_eq!(config.port, 3000);
        assert_eq!(config.static_dir, "www");
    }

    #[test]
    fn resolve_prefers_environment_values() {
        let config = resolve(ConfigEnv {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            platform_base_url: Some(Url::parse("https://staging.example.com").unwrap()),
            port: Some(8080),
            static_dir: Some("assets".to_string()),
        })
        .unwrap();

        assert_eq!(config.platform_base_url.host_str(), Some("staging.example.com"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_dir, "assets");
    }

    #[test]
    fn resolve_requires_credentials() {
        assert!(resolve(ConfigEnv::default()).is_err());
        assert!(
            resolve(ConfigEnv {
                client_id: Some("id".to_string()),
                ..ConfigEnv::default()
            })
            .is_err()
        );
    }
}
