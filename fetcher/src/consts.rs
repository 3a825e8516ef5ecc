// Profile shown on the site
pub const DEFAULT_USERNAME: &str = "rizkyilhampra";

// Upstream endpoints
pub const GITHUB_API_BASE: &str = "https://github-contributions-api.jogruber.de/v4";
pub const WAKATIME_API_BASE: &str = "https://wakatime.com/api/v1";
pub const MONKEYTYPE_API_BASE: &str = "https://api.monkeytype.com";
pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
pub const SPOTIFY_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

// Artifact locations, relative to the site root
pub const GITHUB_OUT_DIR: &str = "public/github";
pub const GITHUB_MANIFEST_FILE: &str = "years.json";
pub const WAKATIME_OUT_PATH: &str = "public/wakatime.json";
pub const MONKEYTYPE_OUT_PATH: &str = "public/monkeytype.json";
pub const SPOTIFY_OUT_PATH: &str = "public/spotify.json";
pub const SAMPLE_DIR: &str = "samples";

// HTTP behaviour
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;
pub const MAX_RETRIES: u32 = 1;

// Secret variable names, reported when a source is unavailable
pub const GITHUB_USERNAME_VAR: &str = "GITHUB_USERNAME";
pub const WAKATIME_API_KEY_VAR: &str = "WAKATIME_API_KEY";
pub const MONKEYTYPE_API_KEY_VAR: &str = "MONKEYTYPE_API_KEY";
pub const SPOTIFY_CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
pub const SPOTIFY_CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";
pub const SPOTIFY_REFRESH_TOKEN_VAR: &str = "SPOTIFY_REFRESH_TOKEN";
