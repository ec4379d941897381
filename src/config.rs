//! Application configuration, layered: a base file, an optional local
//! override, then `APP__`-prefixed env vars.
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    #[serde(default)]
    pub assets: HashMap<String, u32>,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationSettings {
    pub port: u16,
    pub log_level: String,
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        builder.build()?.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        let mut assets = HashMap::new();
        assets.insert(
            "stellar:USDC:GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN".to_string(),
            7,
        );
        assets.insert("iso4217:USD".to_string(), 2);
        Self {
            application: ApplicationSettings {
                port: 8080,
                log_level: "info".to_string(),
            },
            assets,
        }
    }
}
