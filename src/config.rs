use anyhow::{anyhow, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub lookup: LookupConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub f_hz: f64,
    pub sn_mva: f64,
    /// Convert the geodata tables into geometry tables
    pub geometries: bool,
    pub geo_crs: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "example_simple".to_string(),
            f_hz: 50.0,
            sn_mva: 1.0,
            geometries: true,
            geo_crs: Some("epsg:4326".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupConfig {
    pub fuse_closed_bus_switches: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            fuse_closed_bus_switches: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub filter: String,
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info,gridnet=debug".to_string(),
            json: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file("config/default.toml"))
                .merge(Env::prefixed("GRIDNET__").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract()?;
        cfg.validate().map_err(|e| anyhow!("invalid configuration: {e}"))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.network.name.trim().is_empty() {
            return Err("network.name must not be empty".to_string());
        }
        if !(self.network.f_hz > 0.0) {
            return Err(format!("network.f_hz must be positive, got {}", self.network.f_hz));
        }
        if !(self.network.sn_mva > 0.0) {
            return Err(format!("network.sn_mva must be positive, got {}", self.network.sn_mva));
        }
        if self.network.geo_crs.as_deref().is_some_and(|crs| crs.trim().is_empty()) {
            return Err("network.geo_crs must not be empty when set".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let figment = Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(
            r#"
            [network]
            name = "mv_ring"
            f_hz = 60.0

            [lookup]
            fuse_closed_bus_switches = false
            "#,
        ));
        let cfg = Config::from_figment(figment).unwrap();

        assert_eq!(cfg.network.name, "mv_ring");
        assert_eq!(cfg.network.f_hz, 60.0);
        assert_eq!(cfg.network.sn_mva, 1.0);
        assert!(!cfg.lookup.fuse_closed_bus_switches);
        assert_eq!(cfg.telemetry, TelemetryConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut cfg = Config::default();
        cfg.network.f_hz = 0.0;
        assert!(cfg.validate().unwrap_err().contains("f_hz"));

        let mut cfg = Config::default();
        cfg.network.name = " ".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.network.geo_crs = Some(String::new());
        assert!(cfg.validate().is_err());

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string("[network]\nsn_mva = -1.0"));
        assert!(Config::from_figment(figment).is_err());
    }
}
