use std::fmt;

use super::ConfigError;

/// A scalar read from a configuration layer.
///
/// Environment variables always arrive as [`ConfigValue::String`]; typed
/// reads parse them on demand.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Bool(bool),
    Null,
}

impl ConfigValue {
    pub(crate) fn from_yaml(scalar: &serde_yaml::Value) -> Self {
        use serde_yaml::Value as Yaml;

        match scalar {
            Yaml::Null => ConfigValue::Null,
            Yaml::Bool(b) => ConfigValue::Bool(*b),
            Yaml::Number(n) => n
                .as_i64()
                .map(ConfigValue::Integer)
                .unwrap_or_else(|| ConfigValue::String(n.to_string())),
            Yaml::String(s) => ConfigValue::String(s.clone()),
            Yaml::Tagged(tagged) => ConfigValue::from_yaml(&tagged.value),
            // Containers never reach a leaf; the loader walks into them.
            Yaml::Sequence(_) | Yaml::Mapping(_) => ConfigValue::Null,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::String(s) => f.write_str(s),
            ConfigValue::Integer(i) => write!(f, "{i}"),
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Null => f.write_str("~"),
        }
    }
}

/// Conversion from a [`ConfigValue`] into a typed setting.
pub trait FromConfigValue: Sized {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError>;
}

fn mismatch(key: &str, expected: &'static str) -> ConfigError {
    ConfigError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

impl FromConfigValue for String {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        match value {
            ConfigValue::Null => Err(mismatch(key, "String")),
            other => Ok(other.to_string()),
        }
    }
}

impl FromConfigValue for bool {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        let parsed = match value {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            },
            ConfigValue::Integer(0) => Some(false),
            ConfigValue::Integer(1) => Some(true),
            _ => None,
        };
        parsed.ok_or_else(|| mismatch(key, "bool"))
    }
}

fn integer<T: TryFrom<i64>>(value: &ConfigValue, key: &str, name: &'static str) -> Result<T, ConfigError> {
    let wide = match value {
        ConfigValue::Integer(i) => Some(*i),
        ConfigValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    wide.and_then(|i| T::try_from(i).ok())
        .ok_or_else(|| mismatch(key, name))
}

impl FromConfigValue for i64 {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        integer(value, key, "i64")
    }
}

impl FromConfigValue for u64 {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        integer(value, key, "u64")
    }
}

impl FromConfigValue for u32 {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        integer(value, key, "u32")
    }
}

impl FromConfigValue for u16 {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        integer(value, key, "u16")
    }
}

/// `Null` reads as `None`; anything else must convert.
impl<T: FromConfigValue> FromConfigValue for Option<T> {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        if *value == ConfigValue::Null {
            return Ok(None);
        }
        T::from_config_value(value, key).map(Some)
    }
}
