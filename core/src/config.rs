/*
 * config.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Bugwire, a Bugzilla client library.
 *
 * Bugwire is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Bugwire is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Bugwire.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Connector configuration: load/save ~/.bugwire/config.xml, then apply BUGWIRE_* environment
//! overrides. All XML read/write uses the quick_xml parser/writer.
//!
//! ```xml
//! <bugwire>
//!   <host>https://bugzilla.example.org/</host>
//!   <http-user>proxy</http-user>
//!   <http-password>secret</http-password>
//!   <connect-timeout>30</connect-timeout>
//!   <user-agent>my-tool/1.0</user-agent>
//! </bugwire>
//! ```

use std::fs;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use thiserror::Error;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use crate::protocol::http::DEFAULT_CONNECT_TIMEOUT;
use crate::protocol::xmlrpc::DEFAULT_USER_AGENT;

pub const ENV_HOST: &str = "BUGWIRE_HOST";
pub const ENV_HTTP_USER: &str = "BUGWIRE_HTTP_USER";
pub const ENV_HTTP_PASSWORD: &str = "BUGWIRE_HTTP_PASSWORD";
pub const ENV_CONNECT_TIMEOUT: &str = "BUGWIRE_CONNECT_TIMEOUT";
pub const ENV_USER_AGENT: &str = "BUGWIRE_USER_AGENT";

const ROOT: &str = "bugwire";
const HOST: &str = "host";
const HTTP_USER: &str = "http-user";
const HTTP_PASSWORD: &str = "http-password";
const CONNECT_TIMEOUT: &str = "connect-timeout";
const USER_AGENT: &str = "user-agent";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("XML parse error: {0}")]
    Xml(String),
    #[error("invalid {field}: {value}")]
    Invalid { field: &'static str, value: String },
}

/// Everything needed to connect. `host` is required before connecting.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    pub host: Option<String>,
    pub http_user: Option<String>,
    pub http_password: Option<String>,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            host: None,
            http_user: None,
            http_password: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl std::fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("host", &self.host)
            .field("http_user", &self.http_user)
            .field("http_password", &self.http_password.as_ref().map(|_| "***"))
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Default config directory: ~/.bugwire.
pub fn default_config_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from).map(|h| h.join(".bugwire"))
}

/// Default config path: ~/.bugwire/config.xml.
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|d| d.join("config.xml"))
}

impl ConnectorConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::default()
        }
    }

    /// Read a config file. Elements not present keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_xml(&content)
    }

    /// Default file (if it exists) overlaid with the environment.
    pub fn load_default() -> Result<Self, ConfigError> {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => Self::load(&path)?,
            _ => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_xml(content: &str) -> Result<Self, ConfigError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);
        let mut config = Self::default();
        let mut element: Option<String> = None;
        let mut depth = 0usize;

        loop {
            match reader.read_event() {
                Err(e) => return Err(ConfigError::Xml(e.to_string())),
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => {
                    depth += 1;
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if depth == 1 && name != ROOT {
                        return Err(ConfigError::Xml(format!("unexpected root element <{}>", name)));
                    }
                    element = if depth == 2 { Some(name) } else { None };
                }
                Ok(Event::Text(e)) => {
                    let Some(name) = element.as_deref() else {
                        continue;
                    };
                    let text = e
                        .unescape()
                        .map_err(|e| ConfigError::Xml(e.to_string()))?
                        .trim()
                        .to_string();
                    config.set(name, text)?;
                }
                Ok(Event::End(_)) => {
                    depth = depth.saturating_sub(1);
                    element = None;
                }
                _ => {}
            }
        }
        Ok(config)
    }

    fn set(&mut self, name: &str, value: String) -> Result<(), ConfigError> {
        match name {
            HOST => self.host = Some(value),
            HTTP_USER => self.http_user = Some(value),
            HTTP_PASSWORD => self.http_password = Some(value),
            CONNECT_TIMEOUT => self.connect_timeout = parse_timeout(CONNECT_TIMEOUT, &value)?,
            USER_AGENT => self.user_agent = value,
            other => tracing::debug!(element = other, "ignoring unknown config element"),
        }
        Ok(())
    }

    /// Apply BUGWIRE_* variables from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup. Empty values are ignored.
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(v) = get(ENV_HOST) {
            self.host = Some(v);
        }
        if let Some(v) = get(ENV_HTTP_USER) {
            self.http_user = Some(v);
        }
        if let Some(v) = get(ENV_HTTP_PASSWORD) {
            self.http_password = Some(v);
        }
        if let Some(v) = get(ENV_CONNECT_TIMEOUT) {
            self.connect_timeout = parse_timeout(ENV_CONNECT_TIMEOUT, &v)?;
        }
        if let Some(v) = get(ENV_USER_AGENT) {
            self.user_agent = v;
        }
        Ok(())
    }

    /// Write the config as XML. On Unix the file is created with mode 0o600 since it may hold a password.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = self.to_xml_bytes()?;
        let mut f = open_config_file_for_write(path)?;
        f.write_all(&bytes)?;
        f.flush()?;
        Ok(())
    }

    pub fn to_xml_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        let mut out = Vec::new();
        let mut writer = Writer::new_with_indent(&mut out, b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_err)?;
        writer
            .write_event(Event::Start(BytesStart::new(ROOT)))
            .map_err(xml_err)?;
        let timeout = self.connect_timeout.as_secs().to_string();
        let fields = [
            (HOST, self.host.as_deref()),
            (HTTP_USER, self.http_user.as_deref()),
            (HTTP_PASSWORD, self.http_password.as_deref()),
            (CONNECT_TIMEOUT, Some(timeout.as_str())),
            (USER_AGENT, Some(self.user_agent.as_str())),
        ];
        for (name, value) in fields {
            let Some(value) = value else { continue };
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(xml_err)?;
            writer
                .write_event(Event::Text(BytesText::new(value)))
                .map_err(xml_err)?;
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(xml_err)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(ROOT)))
            .map_err(xml_err)?;
        Ok(out)
    }
}

fn xml_err(e: impl std::fmt::Display) -> ConfigError {
    ConfigError::Xml(e.to_string())
}

fn parse_timeout(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::Invalid {
            field,
            value: value.to_string(),
        })
}

/// Open the config file for writing. On Unix, creates it with mode 0o600 (owner read/write only).
fn open_config_file_for_write(path: &Path) -> Result<File, io::Error> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .mode(0o600)
            .open(path)
    }
    #[cfg(not(unix))]
    {
        fs::File::create(path)
    }
}
