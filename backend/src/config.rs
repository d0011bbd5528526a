use serde::Deserialize;

pub const DEFAULT_POSTAL_LOOKUP_URL: &str = "https://viacep.com.br/ws";
pub const DEFAULT_DISTANCE_MATRIX_URL: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";
pub const DEFAULT_STORE_ADDRESS: &str =
    "Rua José Duarte Souza, 21, Jardim das Margaridas, Taboão da Serra, SP";
pub const DEFAULT_HOME_CITY: &str = "Taboão da Serra";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    /// bcrypt hash of the admin panel password. Admin login is disabled when unset.
    pub admin_password_hash: Option<String>,
    /// Distance Matrix credential. Without it every estimate uses the fallback heuristic.
    pub google_maps_api_key: Option<String>,
    pub postal_lookup_url: String,
    pub distance_matrix_url: String,
    pub store_address: String,
    pub home_city: String,
    pub catalog_csv_url: Option<String>,
    pub cors_allowed_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("database_url", "sqlite://storefront.db")?
            .set_default("postal_lookup_url", DEFAULT_POSTAL_LOOKUP_URL)?
            .set_default("distance_matrix_url", DEFAULT_DISTANCE_MATRIX_URL)?
            .set_default("store_address", DEFAULT_STORE_ADDRESS)?
            .set_default("home_city", DEFAULT_HOME_CITY)?
            .add_source(config::Environment::default())
            .build()?;

        config.try_deserialize()
    }

    /// The mapping credential, ignoring blank values.
    pub fn maps_api_key(&self) -> Option<&str> {
        self.google_maps_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
