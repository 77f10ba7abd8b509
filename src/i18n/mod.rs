//! Internationalization (i18n) support
//!
//! Labels ship built in for `pt-BR` and `en`. YAML files in the site's
//! language directory (`languages/pt-BR.yml`, ...) override individual keys.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const PT_BR: &str = r#"
listing:
  load_more: Carregar mais posts
post:
  loading: Carregando...
  title: Título
  author: Autor
  date: Data de publicação
  reading_time: "%d min"
  reading_time_unavailable: Tempo de leitura
  edited_at: "* editado em %s"
  prev: Post anterior
  next: Próximo post
preview:
  exit: Sair do modo Preview
"#;

const EN: &str = r#"
listing:
  load_more: Load more posts
post:
  loading: Loading...
  title: Title
  author: Author
  date: Publication date
  reading_time: "%d min"
  reading_time_unavailable: Reading time unavailable
  edited_at: "* edited at %s"
  prev: Previous post
  next: Next post
preview:
  exit: Exit preview mode
"#;

/// Internationalization handler
pub struct I18n {
    /// Current language
    language: String,
    /// Language data: lang -> key -> translation
    translations: HashMap<String, HashMap<String, serde_yaml::Value>>,
}

impl I18n {
    /// Create a handler with the built-in label sets
    pub fn new(language: &str) -> Self {
        let mut translations = HashMap::new();
        for (lang, source) in [("pt-BR", PT_BR), ("en", EN)] {
            match serde_yaml::from_str(source) {
                Ok(data) => {
                    translations.insert(lang.to_string(), data);
                }
                Err(e) => tracing::error!("Built-in {} labels are invalid: {}", lang, e),
            }
        }

        Self {
            language: language.to_string(),
            translations,
        }
    }

    /// Load language files from a directory, overriding built-in keys
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str());
            if !matches!(ext, Some("yml") | Some("yaml")) {
                continue;
            }

            let Some(lang) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let content = fs::read_to_string(&path)?;
            match serde_yaml::from_str::<HashMap<String, serde_yaml::Value>>(&content) {
                Ok(data) => {
                    let target = self.translations.entry(lang.to_string()).or_default();
                    merge(target, data);
                    tracing::debug!("Loaded language file: {:?}", path);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse language file {:?}: {}", path, e);
                }
            }
        }

        Ok(())
    }

    /// Get a translation by key; keys can be nested like "post.loading"
    pub fn get(&self, key: &str) -> String {
        if let Some(value) = self
            .translations
            .get(&self.language)
            .and_then(|data| get_nested_value(data, key))
        {
            return yaml_value_to_string(value);
        }

        // Fallback to English
        if let Some(value) = self
            .translations
            .get("en")
            .and_then(|data| get_nested_value(data, key))
        {
            return yaml_value_to_string(value);
        }

        // Return key as fallback
        key.to_string()
    }

    /// Translation with `%d` replaced by a number
    pub fn get_count(&self, key: &str, count: u32) -> String {
        self.get(key).replace("%d", &count.to_string())
    }

    /// Translation with `%s` replaced by a value
    pub fn get_with(&self, key: &str, value: &str) -> String {
        self.get(key).replace("%s", value)
    }

    /// Get all translations for the current language as a flat HashMap
    /// using dot-notation keys, with English filling the gaps
    pub fn get_all_translations(&self) -> HashMap<String, String> {
        let mut result = HashMap::new();

        if let Some(lang_data) = self.translations.get(&self.language) {
            flatten_translations(lang_data, "", &mut result);
        }

        if self.language != "en" {
            if let Some(en_data) = self.translations.get("en") {
                let mut en_result = HashMap::new();
                flatten_translations(en_data, "", &mut en_result);
                for (k, v) in en_result {
                    result.entry(k).or_insert(v);
                }
            }
        }

        result
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("en")
    }
}

/// Merge `overrides` into `target`, descending into nested mappings
fn merge(target: &mut HashMap<String, serde_yaml::Value>, overrides: HashMap<String, serde_yaml::Value>) {
    for (key, value) in overrides {
        match (target.get_mut(&key), value) {
            (Some(serde_yaml::Value::Mapping(existing)), serde_yaml::Value::Mapping(incoming)) => {
                for (k, v) in incoming {
                    existing.insert(k, v);
                }
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

/// Get a nested value from a YAML map using dot notation
fn get_nested_value<'a>(
    data: &'a HashMap<String, serde_yaml::Value>,
    key: &str,
) -> Option<&'a serde_yaml::Value> {
    let mut parts = key.split('.');
    let mut current = data.get(parts.next()?);

    for part in parts {
        match current {
            Some(serde_yaml::Value::Mapping(map)) => {
                current = map.get(serde_yaml::Value::String(part.to_string()));
            }
            _ => return None,
        }
    }

    current
}

/// Convert a YAML value to a string
fn yaml_value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => String::new(),
        _ => format!("{:?}", value),
    }
}

/// Flatten translations into a HashMap with dot-notation keys
fn flatten_translations(
    data: &HashMap<String, serde_yaml::Value>,
    prefix: &str,
    result: &mut HashMap<String, String>,
) {
    for (key, value) in data {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            serde_yaml::Value::Mapping(map) => {
                let nested: HashMap<String, serde_yaml::Value> = map
                    .iter()
                    .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), v.clone())))
                    .collect();
                flatten_translations(&nested, &full_key, result);
            }
            serde_yaml::Value::Sequence(_) | serde_yaml::Value::Tagged(_) => {}
            value => {
                result.insert(full_key, yaml_value_to_string(value));
            }
        }
    }
}
