use std::collections::HashMap;
use std::path::Path;

use serde_yaml::Value as Yaml;

use super::value::ConfigValue;
use super::ConfigError;

/// Accumulates configuration layers; later layers overwrite earlier keys.
#[derive(Debug, Default)]
pub(crate) struct Layers {
    pub(crate) values: HashMap<String, ConfigValue>,
}

impl Layers {
    /// Merge a YAML file. A missing file contributes nothing.
    pub(crate) fn yaml_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(ConfigError::Load(format!("{}: {e}", path.display()))),
        };
        self.yaml_str(&text)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))
    }

    pub(crate) fn yaml_str(&mut self, text: &str) -> Result<(), ConfigError> {
        let doc: Yaml = serde_yaml::from_str(text).map_err(|e| ConfigError::Load(e.to_string()))?;
        self.merge_tree(doc);
        Ok(())
    }

    /// Overlay process environment variables (`SECURITY_JWT_AUDIENCE` sets
    /// `security.jwt.audience`).
    pub(crate) fn environment(&mut self) {
        for (name, value) in std::env::vars() {
            self.values.insert(env_key(&name), ConfigValue::String(value));
        }
    }

    /// Walk a YAML tree, storing each scalar under its dotted path.
    /// Sequence items are addressed by index (`cors.origins.0`).
    fn merge_tree(&mut self, root: Yaml) {
        let mut pending = vec![(String::new(), root)];
        while let Some((path, node)) = pending.pop() {
            match node {
                Yaml::Mapping(map) => {
                    for (k, v) in map {
                        let segment = match k {
                            Yaml::String(s) => s,
                            other => ConfigValue::from_yaml(&other).to_string(),
                        };
                        pending.push((join(&path, &segment), v));
                    }
                }
                Yaml::Sequence(items) => {
                    for (i, v) in items.into_iter().enumerate() {
                        pending.push((join(&path, &i.to_string()), v));
                    }
                }
                scalar if !path.is_empty() => {
                    self.values.insert(path, ConfigValue::from_yaml(&scalar));
                }
                _ => {}
            }
        }
    }
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

pub(crate) fn env_key(name: &str) -> String {
    name.to_ascii_lowercase().replace('_', ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_names_become_dotted_keys() {
        assert_eq!(env_key("SECURITY_JWT_KEYS_PRIVATEFILE"), "security.jwt.keys.privatefile");
        assert_eq!(env_key("HOME"), "home");
    }

    #[test]
    fn sequence_items_are_indexed() {
        let mut layers = Layers::default();
        layers.yaml_str("demo:\n  admins:\n    - root\n    - ops\n").unwrap();
        assert_eq!(layers.values.get("demo.admins.1"), Some(&ConfigValue::String("ops".into())));
        assert!(!layers.values.contains_key("demo.admins"));
    }

    #[test]
    fn later_layers_win() {
        let mut layers = Layers::default();
        layers.yaml_str("a:\n  b: 1\n  c: 2\n").unwrap();
        layers.yaml_str("a:\n  b: 3\n").unwrap();
        assert_eq!(layers.values.get("a.b"), Some(&ConfigValue::Integer(3)));
        assert_eq!(layers.values.get("a.c"), Some(&ConfigValue::Integer(2)));
    }
}
