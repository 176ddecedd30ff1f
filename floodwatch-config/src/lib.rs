//! Loader for Floodwatch configuration with YAML + environment overlays.
//!
//! Every block carries serde defaults that mirror the original collection
//! script's constants, so a missing `floodwatch.yaml` still yields a fully
//! usable configuration. `${VAR}` placeholders are expanded recursively
//! after the `config` crate merges file and `FLOODWATCH_` env sources.

use config::{Config, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::macros::format_description;
use time::Date;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration load failed: {0}")]
    Load(#[from] config::ConfigError),
    #[error("failed to read credential file {path}: {source}")]
    Credential {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("credential file {path} is empty")]
    EmptyCredential { path: PathBuf },
    #[error("invalid date {value:?} for {field} (expected YYYY-MM-DD)")]
    Date { field: &'static str, value: String },
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FloodwatchConfig {
    pub version: Option<String>,
    pub credentials: CredentialsConfig,
    pub collect: CollectConfig,
    pub search: SearchConfig,
    pub cities: CitiesConfig,
    pub http: HttpConfig,
    /// Directory the CSV corpora are written to.
    pub output_dir: PathBuf,
}

/// Per-deployment HTTP tuning, applied to the API client at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub retries: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            retries: 2,
        }
    }
}

/// Where the Twitter secrets live.
///
/// Either a pre-issued bearer token (typically `${FLOODWATCH_BEARER}` style)
/// or four plain-text files, one secret per file, as the original collection
/// setup used.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub bearer_token: Option<String>,
    pub dir: PathBuf,
    pub consumer_key_file: String,
    pub consumer_secret_file: String,
    pub access_token_file: String,
    pub access_token_secret_file: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            bearer_token: None,
            dir: PathBuf::from("."),
            consumer_key_file: "consumer_key.txt".into(),
            consumer_secret_file: "consumer_secret.txt".into(),
            access_token_file: "access_token.txt".into(),
            access_token_secret_file: "access_token_secret.txt".into(),
        }
    }
}

/// The four OAuth secrets, loaded once at startup and passed to the client.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl CredentialsConfig {
    /// Read all four secret files, whitespace-trimmed.
    pub fn load(&self) -> Result<Credentials, ConfigError> {
        Ok(Credentials {
            consumer_key: read_secret(&self.dir.join(&self.consumer_key_file))?,
            consumer_secret: read_secret(&self.dir.join(&self.consumer_secret_file))?,
            access_token: read_secret(&self.dir.join(&self.access_token_file))?,
            access_token_secret: read_secret(&self.dir.join(&self.access_token_secret_file))?,
        })
    }
}

fn read_secret(path: &Path) -> Result<String, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Credential {
        path: path.to_path_buf(),
        source,
    })?;
    let secret = raw.trim().to_string();
    if secret.is_empty() {
        return Err(ConfigError::EmptyCredential {
            path: path.to_path_buf(),
        });
    }
    Ok(secret)
}

/// The three collection runs, each one loop over its configured accounts.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CollectConfig {
    pub harvey: HistoricalRun,
    pub traffic: HistoricalRun,
    pub non_traffic: TimelineRun,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            harvey: HistoricalRun {
                account: "houstontranstar".into(),
                since: "2017-08-17".into(),
                until: "2017-09-03".into(),
                max_tweets: 9999,
                output: "harvey_tweets.csv".into(),
                tag: None,
            },
            traffic: HistoricalRun {
                account: "TotalTrafficHOU".into(),
                since: "2019-03-01".into(),
                until: "2019-04-16".into(),
                max_tweets: 9999,
                output: "total_recent_traffic_houston.csv".into(),
                tag: Some("traffic".into()),
            },
            non_traffic: TimelineRun::default(),
        }
    }
}

/// One historical (date-windowed) pull from a single account.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalRun {
    pub account: String,
    pub since: String,
    pub until: String,
    #[serde(default = "default_max_tweets")]
    pub max_tweets: u32,
    pub output: String,
    #[serde(default)]
    pub tag: Option<String>,
}

fn default_max_tweets() -> u32 {
    9999
}

impl HistoricalRun {
    /// Parse the configured `since`/`until` into a date window.
    pub fn window(&self) -> Result<(Date, Date), ConfigError> {
        let fmt = format_description!("[year]-[month]-[day]");
        let since = Date::parse(&self.since, fmt).map_err(|_| ConfigError::Date {
            field: "since",
            value: self.since.clone(),
        })?;
        let until = Date::parse(&self.until, fmt).map_err(|_| ConfigError::Date {
            field: "until",
            value: self.until.clone(),
        })?;
        Ok((since, until))
    }
}

/// One recent-timeline pull over a list of accounts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimelineRun {
    pub accounts: Vec<String>,
    /// Requested posts per account; the API caps a single call around 200.
    pub per_account: u32,
    pub output: String,
    pub tag: Option<String>,
}

impl Default for TimelineRun {
    fn default() -> Self {
        Self {
            accounts: DEFAULT_NON_TRAFFIC_ACCOUNTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            per_account: 300,
            output: "recent_non_traffic.csv".into(),
            tag: Some("non-traffic".into()),
        }
    }
}

/// The 21 accounts the non-traffic corpus is drawn from: Houston civic and
/// culture feeds plus Austin music/tech feeds, none of them traffic-related.
pub const DEFAULT_NON_TRAFFIC_ACCOUNTS: &[&str] = &[
    "midtownHOU",
    "HoustonPubMedia",
    "HOUBizJournal",
    "HPStreet",
    "HoustonOEM",
    "DowntownHouston",
    "VisitHouston",
    "LINK_Houston",
    "HoustonRockets",
    "houstonlibrary",
    "fashionxhouston",
    "TwitterFashion",
    "NYTFashion",
    "musicaustin",
    "austinmusic",
    "austinmusicppl",
    "ATXTechEvents",
    "AustinTechAll",
    "AustinTechLive",
    "BuiltInAustin",
    "GirlsinTechATX",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Queried when the CLI is given no accounts: the two main Houston
    /// traffic feeds.
    pub accounts: Vec<String>,
    pub per_account: u32,
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            accounts: vec!["TotalTrafficHOU".into(), "houstontranstar".into()],
            per_account: 300,
            max_results: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CitiesConfig {
    /// Static page whose `<h2>` headings carry the flood-prone city list.
    pub source_url: String,
}

impl Default for CitiesConfig {
    fn default() -> Self {
        Self {
            source_url: "https://www.cheatsheet.com/culture/american-cities-homes-danger-flooding.html/"
                .into(),
        }
    }
}

impl Default for FloodwatchConfig {
    fn default() -> Self {
        Self {
            version: None,
            credentials: CredentialsConfig::default(),
            collect: CollectConfig::default(),
            search: SearchConfig::default(),
            cities: CitiesConfig::default(),
            http: HttpConfig::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct FloodwatchConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for FloodwatchConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl FloodwatchConfigLoader {
    /// Start with the defaults: `FLOODWATCH_` env overrides, nothing else.
    ///
    /// ```
    /// use floodwatch_config::FloodwatchConfigLoader;
    ///
    /// let cfg = FloodwatchConfigLoader::new().load().expect("defaults load");
    /// assert_eq!(cfg.search.max_results, 15);
    /// assert_eq!(cfg.collect.non_traffic.accounts.len(), 21);
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("FLOODWATCH").separator("__"));
        Self { builder }
    }

    /// Attach a config file; the `config` crate infers format by suffix.
    /// With `required = false` a missing file is skipped, so deployments can
    /// run purely on defaults plus environment variables.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P, required: bool) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(required));
        self
    }

    /// Merge an inline YAML snippet (tests and CLI overrides).
    ///
    /// ```
    /// use floodwatch_config::FloodwatchConfigLoader;
    ///
    /// let cfg = FloodwatchConfigLoader::new()
    ///     .with_yaml_str("search:\n  max_results: 5")
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(cfg.search.max_results, 5);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders, and deserialize into
    /// the strongly typed config.
    pub fn load(self) -> Result<FloodwatchConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Convert to serde_json::Value first so env expansion sees every
        // string leaf, then materialise the typed struct.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: FloodwatchConfig = serde_json::from_value(v)
            .map_err(|e| ConfigError::Load(config::ConfigError::Message(e.to_string())))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use temp_env;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FW_FOO", Some("bar"), || {
            let mut v = json!("prefix-${FW_FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("FW_CITY", Some("Houston")), ("FW_STATE", Some("TX"))], || {
            let mut v = json!([
                "hello-$FW_CITY",
                { "loc": "${FW_CITY}-${FW_STATE}" },
                42,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["hello-Houston", { "loc": "Houston-TX" }, 42, true, null])
            );
        });
    }

    #[test]
    fn stops_on_cycles_and_leaves_value_reasonable() {
        temp_env::with_vars([("FW_A", Some("${FW_B}")), ("FW_B", Some("${FW_A}"))], || {
            let mut v = json!("x=${FW_A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${FW_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${FW_DOES_NOT_EXIST}"));
    }

    #[test]
    fn http_tuning_defaults_and_overrides() {
        let cfg = FloodwatchConfig::default();
        assert_eq!(cfg.http.timeout_secs, 15);
        assert_eq!(cfg.http.retries, 2);

        let cfg = FloodwatchConfigLoader::new()
            .with_yaml_str("http:\n  timeout_secs: 40\n  retries: 5")
            .load()
            .unwrap();
        assert_eq!(cfg.http.timeout_secs, 40);
        assert_eq!(cfg.http.retries, 5);
    }

    #[test]
    fn historical_window_parses_dates() {
        let run = CollectConfig::default().harvey;
        let (since, until) = run.window().unwrap();
        assert_eq!(since.to_string(), "2017-08-17");
        assert_eq!(until.to_string(), "2017-09-03");
    }

    #[test]
    fn historical_window_rejects_garbage() {
        let mut run = CollectConfig::default().harvey;
        run.since = "not-a-date".into();
        assert!(matches!(
            run.window(),
            Err(ConfigError::Date { field: "since", .. })
        ));
    }
}
