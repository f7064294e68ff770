use std::path::PathBuf;

/// Base endpoint of the Planet Data API.
pub const PLANET_API_URL: &str = "https://api.planet.com/data/v1";

/// Environment variable holding the Planet API key.
pub const PL_API_KEY_ENV: &str = "PL_API_KEY";

/// Page size requested from the quick-search endpoint.
pub const SEARCH_PAGE_SIZE: usize = 250;

/// Asset type downloaded when the caller does not pick one.
pub const DEFAULT_ASSET_TYPE: &str = "analytic";

/// Seconds between two activation status polls.
pub const ACTIVATION_POLL_SECS: u64 = 5;

/// Activation polls before giving up on an asset.
pub const ACTIVATION_MAX_POLLS: u32 = 120;

pub const TEMP_PATH: &str = "./temp";

pub fn get_temp_path() -> PathBuf {
    PathBuf::from(TEMP_PATH)
}
