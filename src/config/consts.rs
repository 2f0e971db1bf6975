// src/config/consts.rs

// Net config
pub const STORE_URL: &str = "https://store.steampowered.com";
pub const API_URL: &str = "https://api.steampowered.com";
pub const APP_LIST_PATH: &str = "/IStoreService/GetAppList/v1/";
pub const APP_DETAILS_PATH: &str = "/api/appdetails";
pub const USER_AGENT: &str = concat!("esrb_scrape/", env!("CARGO_PKG_VERSION"));
pub const HTTP_TIMEOUT_SECS: u64 = 30;

// Environment
pub const API_KEY_VAR: &str = "STEAM_API_KEY";
pub const STORE_URL_VAR: &str = "STEAM_STORE_URL";
pub const API_URL_VAR: &str = "STEAM_API_URL";
pub const TIMEOUT_VAR: &str = "STEAM_HTTP_TIMEOUT_SECS";
pub const DATA_DIR_VAR: &str = "ESRB_DATA_DIR";

// Local store (logs)
pub const STORE_DIR: &str = ".store";
pub const LOG_FILE: &str = "debug.log";
pub const DEFAULT_LOG_FILTER: &str = "esrb_scrape=info";

// Data layout
pub const DEFAULT_DATA_DIR: &str = "data";
pub const PROCESSED_SUBDIR: &str = "processed";
pub const APPS_FILE: &str = "all_apps.csv";
pub const DESCRIPTIONS_FILE: &str = "game_descriptions.csv";
pub const TRAIN_ESRB_FILE: &str = "train_esrb.csv";
pub const TEST_ESRB_FILE: &str = "test_esrb.csv";
pub const GAME_DETAILS_FILE: &str = "steam_app_details.csv";
pub const CLEANED_DETAILS_FILE: &str = "cleaned_steam_app_details.csv";
pub const SCAN_FILE: &str = "steam_games.csv";
pub const DEFAULT_CLEAN_COLUMN: &str = "detailed_description";

// Enumeration
pub const DEFAULT_MAX_RESULTS: u32 = 100_000;
pub const SERVER_MAX_RESULTS: u32 = 50_000;

// Detail fetch
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const RETRY_DELAY_MS: u64 = 1_000;
pub const SCAN_PAUSE_MS: u64 = 200; // be polite
pub const SCAN_TARGET_RATINGS: [&str; 3] = ["m", "e", "t"];
pub const SCAN_PER_RATING: usize = 1;

// Verification
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-9;

// Training
pub const TFIDF_MAX_FEATURES: usize = 1_000;
pub const SELECT_K: usize = 20;
pub const TEST_SIZE: f64 = 0.2;
pub const SPLIT_SEED: u64 = 42;
