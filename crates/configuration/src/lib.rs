use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use logging::init_logging;
pub use settings::{Config, DataPaths, LoggingSettings, ReportSettings, TopCutPolicy};

/// Prefix for environment overrides, e.g. `SALES_REPORTS__TOP_CUT=rank`.
const ENV_PREFIX: &str = "SALES";

/// Loads the application configuration from a TOML file.
///
/// Values from `SALES_`-prefixed environment variables override the file, with
/// `__` separating nested keys. `SALES_REPORTS__ENABLED` takes a comma-separated
/// list of report ids. The result is validated before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = load_layered(config::File::from(path), environment())?;
    tracing::debug!(path = %path.display(), "Configuration loaded.");
    Ok(config)
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("reports.enabled")
}

fn load_layered<F>(file: F, env: config::Environment) -> Result<Config, ConfigError>
where
    F: config::Source + Send + Sync + 'static,
{
    let builder = config::Config::builder()
        .add_source(file)
        .add_source(env)
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;
    Ok(config)
}

/// Parses configuration from TOML text, without environment overrides.
pub fn load_config_from_str(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let paths = [
        ("data.items", &config.data.items),
        ("data.daily_sales", &config.data.daily_sales),
        ("data.wholesale_prices", &config.data.wholesale_prices),
        ("data.item_loss", &config.data.item_loss),
    ];
    for (key, path) in paths {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(format!("'{}' must not be empty", key)));
        }
    }
    if let Some(enabled) = &config.reports.enabled {
        if enabled.is_empty() {
            return Err(ConfigError::ValidationError(
                "'reports.enabled' must list at least one report; omit it to run all".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[data]
items = "data/Items.csv"
daily_sales = "data/Daily_Sales.csv"
wholesale_prices = "data/Daily_Wholesaleprice.csv"
item_loss = "data/Item_Loss.csv"
"#;

    #[test]
    fn defaults_apply_when_sections_are_missing() {
        let config = load_config_from_str(MINIMAL).unwrap();
        assert_eq!(config.reports.top_cut, TopCutPolicy::Rows);
        assert!(config.reports.parallel);
        assert!(config.reports.enabled.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn reads_report_settings() {
        let toml = format!(
            "{}\n[reports]\ntop_cut = \"rank\"\nparallel = false\nenabled = [\"monthly-revenue\"]\n",
            MINIMAL
        );
        let config = load_config_from_str(&toml).unwrap();
        assert_eq!(config.reports.top_cut, TopCutPolicy::Rank);
        assert!(!config.reports.parallel);
        assert_eq!(config.reports.enabled, Some(vec!["monthly-revenue".to_string()]));
    }

    fn with_env(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<config::Map<String, String>>();
        load_layered(
            config::File::from_str(MINIMAL, config::FileFormat::Toml),
            environment().source(Some(vars)),
        )
    }

    #[test]
    fn environment_overrides_the_file() {
        let config = with_env(&[
            ("SALES_REPORTS__TOP_CUT", "rank"),
            ("SALES_REPORTS__PARALLEL", "false"),
            ("SALES_REPORTS__ENABLED", "monthly-revenue,item-totals"),
            ("SALES_LOGGING__LEVEL", "debug"),
        ])
        .unwrap();
        assert_eq!(config.reports.top_cut, TopCutPolicy::Rank);
        assert!(!config.reports.parallel);
        assert_eq!(
            config.reports.enabled,
            Some(vec!["monthly-revenue".to_string(), "item-totals".to_string()])
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn single_enabled_report_from_environment() {
        let config = with_env(&[("SALES_REPORTS__ENABLED", "monthly-revenue")]).unwrap();
        assert_eq!(config.reports.enabled, Some(vec!["monthly-revenue".to_string()]));
    }

    #[test]
    fn unprefixed_variables_are_ignored() {
        let config = with_env(&[("REPORTS__TOP_CUT", "rank")]).unwrap();
        assert_eq!(config.reports.top_cut, TopCutPolicy::Rows);
    }

    #[test]
    fn rejects_empty_path() {
        let toml = MINIMAL.replace("data/Items.csv", "");
        assert!(matches!(
            load_config_from_str(&toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn rejects_unknown_policy() {
        let toml = format!("{}\n[reports]\ntop_cut = \"fuzzy\"\n", MINIMAL);
        assert!(matches!(load_config_from_str(&toml), Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn missing_data_section_fails() {
        assert!(load_config_from_str("[reports]\nparallel = true\n").is_err());
    }
}
