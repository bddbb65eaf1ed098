use crate::settings::Settings;
use std::path::PathBuf;

pub const VACCINATION_URL: &str =
    "https://raw.githubusercontent.com/CITF-Malaysia/citf-public/main/vaccination/vax_state.csv";
pub const POPULATION_URL: &str =
    "https://raw.githubusercontent.com/CITF-Malaysia/citf-public/main/static/population.csv";
pub const LOCATIONS_PATH: &str = "MY_Geo.csv";
pub const BORDERS_PATH: &str = "data/MYS_adm1.shp";
pub const OUTPUT_PATH: &str = "TimeSliderChoropleth.html";

/// Resolved inputs and output for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub vaccination_url: String,
    pub population_url: String,
    pub locations: PathBuf,
    pub borders: PathBuf,
    pub output: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            vaccination_url: VACCINATION_URL.to_string(),
            population_url: POPULATION_URL.to_string(),
            locations: PathBuf::from(LOCATIONS_PATH),
            borders: PathBuf::from(BORDERS_PATH),
            output: PathBuf::from(OUTPUT_PATH),
        }
    }
}

/// Command-line values; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub vaccination_url: Option<String>,
    pub population_url: Option<String>,
    pub locations: Option<PathBuf>,
    pub borders: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl RunConfig {
    /// Command line beats settings file beats built-in default.
    pub fn resolve(settings: &Settings, overrides: Overrides) -> Self {
        let defaults = Self::default();
        let sources = &settings.sources;
        Self {
            vaccination_url: overrides
                .vaccination_url
                .or_else(|| sources.vaccination_url.clone())
                .unwrap_or(defaults.vaccination_url),
            population_url: overrides
                .population_url
                .or_else(|| sources.population_url.clone())
                .unwrap_or(defaults.population_url),
            locations: overrides
                .locations
                .or_else(|| sources.locations.clone())
                .unwrap_or(defaults.locations),
            borders: overrides
                .borders
                .or_else(|| sources.borders.clone())
                .unwrap_or(defaults.borders),
            output: overrides
                .output
                .or_else(|| settings.output.path.clone())
                .unwrap_or(defaults.output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_given_means_built_in_defaults() {
        let config = RunConfig::resolve(&Settings::default(), Overrides::default());
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.output, PathBuf::from("TimeSliderChoropleth.html"));
        assert_eq!(config.borders, PathBuf::from("data/MYS_adm1.shp"));
    }

    #[test]
    fn cli_beats_settings_beats_default() {
        let mut settings = Settings::default();
        settings.sources.locations = Some(PathBuf::from("geo/cities.csv"));
        settings.output.path = Some(PathBuf::from("from-settings.html"));
        let overrides = Overrides {
            output: Some(PathBuf::from("from-cli.html")),
            ..Overrides::default()
        };

        let config = RunConfig::resolve(&settings, overrides);
        assert_eq!(config.output, PathBuf::from("from-cli.html"));
        assert_eq!(config.locations, PathBuf::from("geo/cities.csv"));
        assert_eq!(config.vaccination_url, VACCINATION_URL);
    }
}
