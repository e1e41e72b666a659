//! Lazily loaded, read-only SUT configuration
//!
//! The snapshot is built from the properties file the first time any accessor
//! is called. A failed load is not cached: the next accessor call reads the
//! file again, so a run fails fast but a later fix of the file is picked up.

use once_cell::sync::{Lazy, OnceCell};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::properties::Properties;
use crate::common::config::Settings;
use crate::common::{paths, Error, Result};

/// Environment variable overriding the properties file location
pub const PROPERTIES_ENV: &str = "SUT_PROPERTIES";

/// Well-known properties file name, looked up in the working directory
pub const DEFAULT_PROPERTIES_FILE: &str = "run.properties";

/// Property keys
pub mod keys {
    pub const HOST: &str = "sut.host";
    pub const SERVER: &str = "sut.server";
    pub const DB_NAME: &str = "sut.dbname";
    pub const DB_PORT: &str = "sut.dbport";
    pub const USER: &str = "sut.user";
    pub const ADMIN: &str = "sut.admin";
    pub const DB_USER: &str = "sut.dbuser";
    pub const DB_USER_PASSWORD: &str = "sut.dbuserpw";
    pub const M2M_USER: &str = "sut.m2muser";
    pub const M2M_PASSWORD: &str = "sut.m2mpassword";
    pub const HEADLESS: &str = "sut.headless";
    pub const INDEXATION: &str = "sut.indexation";
    pub const SIMULATE_SLOW_NETWORK: &str = "sut.simulateSlowNetwork";
    pub const API_CONNECTION_TIMEOUT_SECONDS: &str = "sut.apiconnectiontimeoutseconds";
    pub const DRIVER_FILE: &str = "tas.winChromedriverFile";
}

/// Immutable snapshot of the SUT configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SutConfig {
    pub host: String,
    pub server_name: String,
    pub port: String,
    pub db_name: String,
    pub db_user: String,
    pub db_user_password: String,
    pub m2m_user: String,
    pub m2m_password: String,
    pub user: String,
    pub admin: String,
    /// Driver binary, resolved against the library folder
    pub driver_path: String,
    pub api_connection_timeout_seconds: u64,
    pub headless: String,
    pub simulate_slow_network: String,
    /// Raw `sut.indexation`; absent means enabled
    pub indexation: Option<String>,
}

impl SutConfig {
    /// Build a snapshot, resolving the driver binary against `working_dir`
    pub fn from_properties(props: &Properties, working_dir: &str) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            match props.get(key) {
                Some(value) if !value.is_empty() => Ok(value.to_string()),
                _ => Err(Error::MissingProperty(key.to_string())),
            }
        };

        // Sentinel first: an empty host means nothing was loaded
        let host = required(keys::HOST)?;

        let raw_timeout = required(keys::API_CONNECTION_TIMEOUT_SECONDS)?;
        let api_connection_timeout_seconds = raw_timeout.parse::<u64>().map_err(|e| {
            Error::invalid_number(keys::API_CONNECTION_TIMEOUT_SECONDS, &raw_timeout, e)
        })?;

        let driver_file = required(keys::DRIVER_FILE)?;

        Ok(Self {
            host,
            server_name: required(keys::SERVER)?,
            port: required(keys::DB_PORT)?,
            db_name: required(keys::DB_NAME)?,
            db_user: required(keys::DB_USER)?,
            db_user_password: required(keys::DB_USER_PASSWORD)?,
            m2m_user: required(keys::M2M_USER)?,
            m2m_password: required(keys::M2M_PASSWORD)?,
            user: required(keys::USER)?,
            admin: required(keys::ADMIN)?,
            driver_path: format!("{}{}", paths::lib_folder(working_dir), driver_file),
            api_connection_timeout_seconds,
            headless: required(keys::HEADLESS)?,
            simulate_slow_network: required(keys::SIMULATE_SLOW_NETWORK)?,
            indexation: props.get(keys::INDEXATION).map(str::to_string),
        })
    }

    /// Indexation is on unless explicitly set to something other than `true`
    pub fn is_indexation_enabled(&self) -> bool {
        self.indexation.as_deref().map_or(true, parse_flag)
    }

    /// Key/value view for display, with passwords masked
    pub fn redacted(&self) -> Vec<(&'static str, String)> {
        let mask = |s: &str| "*".repeat(s.chars().count().min(8));
        vec![
            (keys::HOST, self.host.clone()),
            (keys::SERVER, self.server_name.clone()),
            (keys::DB_PORT, self.port.clone()),
            (keys::DB_NAME, self.db_name.clone()),
            (keys::DB_USER, self.db_user.clone()),
            (keys::DB_USER_PASSWORD, mask(&self.db_user_password)),
            (keys::M2M_USER, self.m2m_user.clone()),
            (keys::M2M_PASSWORD, mask(&self.m2m_password)),
            (keys::USER, self.user.clone()),
            (keys::ADMIN, self.admin.clone()),
            (keys::DRIVER_FILE, self.driver_path.clone()),
            (
                keys::API_CONNECTION_TIMEOUT_SECONDS,
                self.api_connection_timeout_seconds.to_string(),
            ),
            (keys::HEADLESS, self.headless.clone()),
            (keys::SIMULATE_SLOW_NETWORK, self.simulate_slow_network.clone()),
            (keys::INDEXATION, self.is_indexation_enabled().to_string()),
        ]
    }
}

/// Permissive boolean: only a case-insensitive `true` is true
pub fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Locate the properties file used by [`ConfigStore::global`]
///
/// Same lookup as [`source_for`], with the settings read from the default
/// harness settings file.
pub fn default_source() -> PathBuf {
    let settings = Settings::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring unreadable harness settings");
        Settings::default()
    });
    source_for(&settings)
}

/// Properties file for the given harness settings
///
/// `$SUT_PROPERTIES`, then `properties.file` from `settings`, then
/// `run.properties` in the working directory.
pub fn source_for(settings: &Settings) -> PathBuf {
    select_source(std::env::var_os(PROPERTIES_ENV).map(PathBuf::from), settings)
}

fn select_source(from_env: Option<PathBuf>, settings: &Settings) -> PathBuf {
    from_env
        .or_else(|| settings.properties.file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROPERTIES_FILE))
}

static GLOBAL: Lazy<ConfigStore> = Lazy::new(|| ConfigStore::new(default_source()));

/// Read-only SUT configuration, loaded on first access
#[derive(Debug)]
pub struct ConfigStore {
    source: PathBuf,
    snapshot: OnceCell<SutConfig>,
    loads: AtomicUsize,
}

impl ConfigStore {
    /// Create a store reading from `source`; nothing is read until first access
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            snapshot: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    /// Process-wide store
    pub fn global() -> &'static ConfigStore {
        &GLOBAL
    }

    /// Properties file this store reads
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Whether a snapshot has been loaded
    pub fn is_loaded(&self) -> bool {
        self.snapshot.get().is_some()
    }

    /// Number of load attempts made so far, successful or not
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Load the snapshot if it isn't loaded yet
    ///
    /// Concurrent first callers block on a single load; none of them can
    /// observe a partially built snapshot.
    pub fn ensure_loaded(&self) -> Result<&SutConfig> {
        self.snapshot.get_or_try_init(|| self.load())
    }

    fn load(&self) -> Result<SutConfig> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(source = %self.source.display(), "Loading SUT properties");

        let props = Properties::load(&self.source)?;
        let cwd = std::env::current_dir()?;
        let config = SutConfig::from_properties(&props, &cwd.to_string_lossy())?;

        tracing::info!(
            source = %self.source.display(),
            host = %config.host,
            driver = %config.driver_path,
            "Loaded SUT properties"
        );
        Ok(config)
    }

    /// The whole snapshot
    pub fn snapshot(&self) -> Result<&SutConfig> {
        self.ensure_loaded()
    }

    /// Host name of the system under test
    pub fn host(&self) -> Result<&str> {
        Ok(&self.ensure_loaded()?.host)
    }

    /// Database server name
    pub fn server_name(&self) -> Result<&str> {
        Ok(&self.ensure_loaded()?.server_name)
    }

    /// Database port
    pub fn port(&self) -> Result<&str> {
        Ok(&self.ensure_loaded()?.port)
    }

    /// Database name
    pub fn db_name(&self) -> Result<&str> {
        Ok(&self.ensure_loaded()?.db_name)
    }

    /// Database login
    pub fn db_user(&self) -> Result<&str> {
        Ok(&self.ensure_loaded()?.db_user)
    }

    /// Password for [`Self::db_user`]
    pub fn db_user_password(&self) -> Result<&str> {
        Ok(&self.ensure_loaded()?.db_user_password)
    }

    /// Machine-to-machine API user
    pub fn m2m_user(&self) -> Result<&str> {
        Ok(&self.ensure_loaded()?.m2m_user)
    }

    /// Password for [`Self::m2m_user`]
    pub fn m2m_password(&self) -> Result<&str> {
        Ok(&self.ensure_loaded()?.m2m_password)
    }

    /// Regular application user
    pub fn user(&self) -> Result<&str> {
        Ok(&self.ensure_loaded()?.user)
    }

    /// Administrative application user
    pub fn admin(&self) -> Result<&str> {
        Ok(&self.ensure_loaded()?.admin)
    }

    /// Path to the browser driver binary, including the binary name
    pub fn driver_path(&self) -> Result<&str> {
        Ok(&self.ensure_loaded()?.driver_path)
    }

    /// Connection timeout for API calls, in seconds
    pub fn api_connection_timeout_seconds(&self) -> Result<u64> {
        Ok(self.ensure_loaded()?.api_connection_timeout_seconds)
    }

    /// Connection timeout for API calls
    pub fn api_connection_timeout(&self) -> Result<Duration> {
        self.api_connection_timeout_seconds().map(Duration::from_secs)
    }

    /// Raw headless flag; `true` means GUI tests run without a visible browser
    pub fn headless_mode_status(&self) -> Result<&str> {
        Ok(&self.ensure_loaded()?.headless)
    }

    /// Raw slow network flag; `true` means GUI tests run on a throttled network
    pub fn simulate_slow_network_status(&self) -> Result<&str> {
        Ok(&self.ensure_loaded()?.simulate_slow_network)
    }

    pub fn is_headless(&self) -> Result<bool> {
        self.headless_mode_status().map(parse_flag)
    }

    pub fn is_slow_network_simulated(&self) -> Result<bool> {
        self.simulate_slow_network_status().map(parse_flag)
    }

    /// Whether indexation is enabled; `true` when `sut.indexation` is not set
    pub fn is_indexation_enabled(&self) -> Result<bool> {
        Ok(self.ensure_loaded()?.is_indexation_enabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const COMPLETE: &str = "\
sut.host=sut.example.org
sut.server=db01
sut.dbname=travel
sut.dbport=1433
sut.user=tester
sut.admin=admin
sut.dbuser=dbo
sut.dbuserpw=secret
sut.m2muser=m2m
sut.m2mpassword=m2m-secret
sut.headless=true
sut.simulateSlowNetwork=false
sut.apiconnectiontimeoutseconds=30
tas.winChromedriverFile=chromedriver.exe
";

    fn write_properties(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    fn props_with(extra: &str) -> Properties {
        Properties::parse(&format!("{}{}", COMPLETE, extra))
    }

    #[test]
    fn test_accessors_read_snapshot() {
        let file = write_properties(COMPLETE);
        let store = ConfigStore::new(file.path());

        assert!(!store.is_loaded());
        assert_eq!(store.host().unwrap(), "sut.example.org");
        assert_eq!(store.server_name().unwrap(), "db01");
        assert_eq!(store.port().unwrap(), "1433");
        assert_eq!(store.db_name().unwrap(), "travel");
        assert_eq!(store.db_user().unwrap(), "dbo");
        assert_eq!(store.db_user_password().unwrap(), "secret");
        assert_eq!(store.m2m_user().unwrap(), "m2m");
        assert_eq!(store.m2m_password().unwrap(), "m2m-secret");
        assert_eq!(store.user().unwrap(), "tester");
        assert_eq!(store.admin().unwrap(), "admin");
        assert_eq!(store.api_connection_timeout_seconds().unwrap(), 30);
        assert_eq!(store.api_connection_timeout().unwrap(), Duration::from_secs(30));
        assert_eq!(store.headless_mode_status().unwrap(), "true");
        assert!(store.is_headless().unwrap());
        assert!(!store.is_slow_network_simulated().unwrap());
        assert!(store.driver_path().unwrap().ends_with("lib/chromedriver.exe"));
        assert!(store.is_loaded());
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn test_driver_path_resolved_against_working_dir() {
        let config = SutConfig::from_properties(&props_with(""), "/home/dev/travelnew/common").unwrap();
        assert_eq!(config.driver_path, "/home/dev/lib/chromedriver.exe");

        let config = SutConfig::from_properties(
            &props_with(""),
            "/builds/_travelnew_pipeline/x/travelnew/common",
        )
        .unwrap();
        assert_eq!(
            config.driver_path,
            "/builds/_travelnew_pipeline/x/travelnew/lib/chromedriver.exe"
        );
    }

    #[test]
    fn test_indexation_defaults_to_enabled() {
        let config = SutConfig::from_properties(&props_with(""), "/w").unwrap();
        assert!(config.is_indexation_enabled());
    }

    #[test]
    fn test_indexation_permissive_parsing() {
        let cases = [
            ("false", false),
            ("yes", false),
            ("", false),
            ("true", true),
            ("TRUE", true),
            ("True", true),
        ];
        for (value, expected) in cases {
            let extra = format!("sut.indexation={}\n", value);
            let config = SutConfig::from_properties(&props_with(&extra), "/w").unwrap();
            assert_eq!(config.is_indexation_enabled(), expected, "value {:?}", value);
        }
    }

    #[test]
    fn test_non_numeric_timeout_is_fatal() {
        let props = props_with("sut.apiconnectiontimeoutseconds=thirty\n");
        let err = SutConfig::from_properties(&props, "/w").unwrap_err();
        match err {
            Error::InvalidNumber { key, value, .. } => {
                assert_eq!(key, keys::API_CONNECTION_TIMEOUT_SECONDS);
                assert_eq!(value, "thirty");
            }
            other => panic!("Expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn test_indexation_value_is_not_trimmed() {
        // Trailing whitespace survives the properties format
        let config = SutConfig::from_properties(&props_with("sut.indexation=true \n"), "/w").unwrap();
        assert_eq!(config.indexation.as_deref(), Some("true "));
        assert!(!config.is_indexation_enabled());

        assert!(!parse_flag(" true"));
        assert!(!parse_flag("true\t"));
        assert!(parse_flag("tRuE"));
    }

    #[test]
    fn test_timeout_with_trailing_whitespace_is_rejected() {
        let props = props_with("sut.apiconnectiontimeoutseconds=30 \n");
        match SutConfig::from_properties(&props, "/w").unwrap_err() {
            Error::InvalidNumber { value, .. } => assert_eq!(value, "30 "),
            other => panic!("Expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_timeout_is_rejected() {
        let props = props_with("sut.apiconnectiontimeoutseconds=-1\n");
        assert!(matches!(
            SutConfig::from_properties(&props, "/w"),
            Err(Error::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_invalid_timeout_fails_every_accessor() {
        let file = write_properties(&format!("{}sut.apiconnectiontimeoutseconds=x\n", COMPLETE));
        let store = ConfigStore::new(file.path());
        assert!(matches!(store.host(), Err(Error::InvalidNumber { .. })));
        assert!(matches!(store.is_indexation_enabled(), Err(Error::InvalidNumber { .. })));
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_missing_required_key() {
        let props = Properties::parse(&COMPLETE.replace("sut.m2muser=m2m\n", ""));
        let err = SutConfig::from_properties(&props, "/w").unwrap_err();
        assert!(matches!(err, Error::MissingProperty(key) if key == keys::M2M_USER));
    }

    #[test]
    fn test_empty_host_is_not_loaded() {
        let props = Properties::parse(&COMPLETE.replace("sut.host=sut.example.org", "sut.host="));
        let err = SutConfig::from_properties(&props, "/w").unwrap_err();
        assert!(matches!(err, Error::MissingProperty(key) if key == keys::HOST));
    }

    #[test]
    fn test_missing_source_propagates_to_accessors() {
        let store = ConfigStore::new("/nonexistent/run.properties");
        assert!(matches!(store.host(), Err(Error::PropertiesRead { .. })));
        assert!(matches!(store.admin(), Err(Error::PropertiesRead { .. })));
        assert_eq!(store.load_count(), 2);
    }

    #[test]
    fn test_failed_load_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.properties");
        let store = ConfigStore::new(&path);

        assert!(store.host().is_err());

        std::fs::write(&path, COMPLETE).unwrap();
        assert_eq!(store.host().unwrap(), "sut.example.org");
        assert_eq!(store.load_count(), 2);

        // Loaded snapshot is kept even if the file changes afterwards
        std::fs::write(&path, COMPLETE.replace("sut.example.org", "other")).unwrap();
        assert_eq!(store.host().unwrap(), "sut.example.org");
        assert_eq!(store.load_count(), 2);
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let file = write_properties(COMPLETE);
        let store = ConfigStore::new(file.path());

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let store = &store;
                    s.spawn(move || {
                        if i % 2 == 0 {
                            store.host().unwrap().to_string()
                        } else {
                            store.snapshot().unwrap().host.clone()
                        }
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), "sut.example.org");
            }
        });

        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn test_source_precedence() {
        let configured = Settings::parse("[properties]\nfile = \"/etc/sut/run.properties\"").unwrap();
        let unset = Settings::default();

        assert_eq!(
            select_source(Some(PathBuf::from("/env/run.properties")), &configured),
            PathBuf::from("/env/run.properties")
        );
        assert_eq!(
            select_source(None, &configured),
            PathBuf::from("/etc/sut/run.properties")
        );
        assert_eq!(
            select_source(None, &unset),
            PathBuf::from(DEFAULT_PROPERTIES_FILE)
        );
    }

    #[test]
    fn test_redacted_masks_passwords() {
        let config = SutConfig::from_properties(&props_with(""), "/w").unwrap();
        let view = config.redacted();
        let get = |key: &str| view.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone());
        assert_eq!(get(keys::DB_USER_PASSWORD).as_deref(), Some("******"));
        assert_eq!(get(keys::HOST).as_deref(), Some("sut.example.org"));
        assert!(!view.iter().any(|(_, v)| v.contains("secret")));
    }
}
