//
// Copyright (c) The confd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Configuration loading, matching `holo-daemon::config::Config`'s
//! TOML-with-defaults pattern. Field names mirror spec.md §6's
//! "Configuration options consumed" table so a deployed config file reads
//! the same as the options it enumerates.

use confd_datastore::FileFormat;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// `XMLDB_FORMAT`.
    pub xmldb_format: XmldbFormat,
    /// `XMLDB_MODSTATE`: whether module-state is written/diffed on load.
    pub xmldb_modstate: bool,
    /// `NACM_DISABLED_ON_EMPTY`.
    pub nacm_disabled_on_empty: bool,
    /// `NETCONF_MONITORING_LOCATION`: advertised schema location directory.
    pub netconf_monitoring_location: String,
    /// `CLI_BUF_START` / `CLI_BUF_THRESHOLD`: request buffer pool sizing.
    pub cli_buf_start: usize,
    pub cli_buf_threshold: usize,
    /// Directory holding the per-datastore files (`<name>_db.{xml,json}`).
    pub datastore_dir: String,
    /// Directory containing the YANG modules to load at startup.
    pub yang_modules_dir: String,
    pub logging: Logging,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum XmldbFormat {
    Xml,
    Json,
}

impl From<XmldbFormat> for FileFormat {
    fn from(value: XmldbFormat) -> Self {
        match value {
            XmldbFormat::Xml => FileFormat::Xml,
            XmldbFormat::Json => FileFormat::Json,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Logging {
    pub stdout: LoggingStdout,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingStdout {
    pub enabled: bool,
    pub style: LoggingFmtStyle,
    pub show_source: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFmtStyle {
    Compact,
    Full,
    Json,
    Pretty,
}

// ===== impl Config =====

impl Config {
    const DFLT_FILEPATH: &'static str = "/etc/confd.toml";

    pub fn load(config_file: Option<&str>) -> Config {
        let config_file = config_file.unwrap_or(Config::DFLT_FILEPATH);

        match std::fs::read_to_string(config_file) {
            Ok(config_str) => match toml::from_str(&config_str) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("failed to parse configuration file: {err}");
                    eprintln!("falling back to default configuration...");
                    Config::default()
                }
            },
            Err(err) => {
                eprintln!("failed to load configuration file: {err}");
                eprintln!("falling back to default configuration...");
                Config::default()
            }
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            xmldb_format: XmldbFormat::Xml,
            xmldb_modstate: true,
            nacm_disabled_on_empty: false,
            netconf_monitoring_location: "/var/lib/confd/yang".to_owned(),
            cli_buf_start: 1024,
            cli_buf_threshold: 16384,
            datastore_dir: "/var/lib/confd/db".to_owned(),
            yang_modules_dir: "/var/lib/confd/yang".to_owned(),
            logging: Default::default(),
        }
    }
}

impl Default for Logging {
    fn default() -> Logging {
        Logging { stdout: Default::default() }
    }
}

impl Default for LoggingStdout {
    fn default() -> LoggingStdout {
        LoggingStdout { enabled: true, style: LoggingFmtStyle::Full, show_source: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_xml_format_and_enables_modstate() {
        let config = Config::default();
        assert_eq!(config.xmldb_format, XmldbFormat::Xml);
        assert!(config.xmldb_modstate);
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let config = Config::load(Some("/nonexistent/confd.toml"));
        assert_eq!(config.cli_buf_start, 1024);
    }

    #[test]
    fn toml_round_trips_into_typed_fields() {
        let raw = r#"
            xmldb_format = "json"
            datastore_dir = "/tmp/confd-test-db"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.xmldb_format, XmldbFormat::Json);
        assert_eq!(config.datastore_dir, "/tmp/confd-test-db");
        assert_eq!(config.cli_buf_threshold, 16384);
    }
}
