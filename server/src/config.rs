use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::Path,
};

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("file not found")]
    NotFound,

    #[error("io error")]
    Io(#[from] std::io::Error),

    #[error("deserialization error")]
    DeserializationError(#[from] toml::de::Error),

    #[error("serialization error")]
    SerializationError(#[from] toml::ser::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: Server,
    pub minecraft: Minecraft,
}

impl Config {
    /// Writes this configuration to `path`, creating missing parent
    /// directories. Never overwrites an existing file.
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let out = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create_new(true).write(true).open(path)?;
        file.write_all(out.as_bytes())?;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub host: String,
    pub port: u16,
    pub log_level: LevelFilter,
    pub messages: Messages,
}

impl Default for Server {
    fn default() -> Server {
        Server {
            host: "0.0.0.0".to_string(),
            port: 25565,
            log_level: LevelFilter::Info,
            messages: Messages::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub kick_message: String,
    pub motd: Motd,
}

impl Default for Messages {
    fn default() -> Messages {
        Messages {
            kick_message: "§cThe server is currently §lCLOSED.".to_string(),
            motd: Motd::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Motd {
    pub line_1: String,
    pub line_2: String,

    /// One flag character per line, `'1'` centers that line.
    pub centered: String,
}

impl Motd {
    /// Centering flags for both lines. Anything but `'1'`, including a
    /// missing character, leaves the line as is.
    pub fn centered(&self) -> [bool; 2] {
        let mut flags = self.centered.chars().map(|flag| flag == '1');
        [
            flags.next().unwrap_or(false),
            flags.next().unwrap_or(false),
        ]
    }
}

impl Default for Motd {
    fn default() -> Motd {
        Motd {
            line_1: "This server is offline.".to_string(),
            line_2: String::new(),
            centered: "00".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Minecraft {
    /// Version name shown next to the ping bars.
    pub version: String,
    pub protocol_version: i32,
}

impl Default for Minecraft {
    fn default() -> Minecraft {
        Minecraft {
            version: "Offline".to_string(),
            protocol_version: 47,
        }
    }
}

pub fn read(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let contents = fs::read_to_string(path)?;
    let config = toml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_full_file() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 25566
            log_level = "debug"

            [server.messages]
            kick_message = "Closed"

            [server.messages.motd]
            line_1 = "Hello"
            line_2 = "World"
            centered = "10"

            [minecraft]
            version = "Maintenance"
            protocol_version = 340
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 25566);
        assert_eq!(config.server.log_level, LevelFilter::Debug);
        assert_eq!(config.server.messages.kick_message, "Closed");
        assert_eq!(config.server.messages.motd.line_1, "Hello");
        assert_eq!(config.server.messages.motd.line_2, "World");
        assert_eq!(config.server.messages.motd.centered(), [true, false]);
        assert_eq!(config.minecraft.version, "Maintenance");
        assert_eq!(config.minecraft.protocol_version, 340);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server.messages.motd]
            line_2 = "Back soon"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 25565);
        assert_eq!(config.server.messages.motd.line_1, "This server is offline.");
        assert_eq!(config.server.messages.motd.line_2, "Back soon");
        assert_eq!(
            config.server.messages.kick_message,
            "§cThe server is currently §lCLOSED."
        );
        assert_eq!(config.minecraft.protocol_version, 47);
    }

    #[test]
    fn centering_flags_are_permissive() {
        let motd = |centered: &str| Motd {
            centered: centered.to_string(),
            ..Motd::default()
        };

        assert_eq!(motd("11").centered(), [true, true]);
        assert_eq!(motd("01").centered(), [false, true]);
        assert_eq!(motd("x1").centered(), [false, true]);
        assert_eq!(motd("1").centered(), [true, false]);
        assert_eq!(motd("").centered(), [false, false]);
        assert_eq!(motd("yes").centered(), [false, false]);
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = read(&dir.path().join("config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server\nport = ").unwrap();

        let err = read(&path).unwrap_err();
        assert!(matches!(err, ConfigError::DeserializationError(_)));
    }

    #[test]
    fn written_default_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("config.toml");

        Config::default().write(&path).unwrap();
        let config = read(&path).unwrap();
        assert_eq!(config.server.port, 25565);
        assert_eq!(config.minecraft.version, "Offline");
        assert_eq!(config.server.messages.motd.centered, "00");

        // an existing file is left alone
        assert!(matches!(
            Config::default().write(&path),
            Err(ConfigError::Io(_))
        ));
    }
}
