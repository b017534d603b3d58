//! Algorithm parameters: a JSON object of named inputs.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::path::Path;

/// Parameter error
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    /// Required parameter absent
    #[error("missing parameter {name:?}")]
    Missing {
        /// Parameter name
        name: String,
    },
    /// Parameter present with the wrong shape
    #[error("parameter {name:?} should be {expected}")]
    WrongType {
        /// Parameter name
        name: String,
        /// Expected shape
        expected: &'static str,
    },
    /// `--set` argument without `=`
    #[error("malformed assignment {pair:?}, expected key=value")]
    Malformed {
        /// The offending argument
        pair: String,
    },
    /// Parameter document is not an object
    #[error("parameters should be a JSON object")]
    NotAnObject,
    /// Parameter file unreadable
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// Parameter file is not valid JSON
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

/// Named algorithm inputs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: IndexMap<String, JsonValue>,
}

impl Params {
    /// Create from a JSON document, which must be an object
    ///
    /// # Errors
    ///
    /// Returns `NotAnObject` for any other JSON value
    pub fn from_json(document: JsonValue) -> Result<Self, ParamError> {
        match document {
            JsonValue::Object(map) => Ok(Self {
                values: map.into_iter().collect(),
            }),
            _ => Err(ParamError::NotAnObject),
        }
    }

    /// Load a JSON parameter file
    ///
    /// # Errors
    ///
    /// Returns `Io`, `Json` or `NotAnObject`
    pub fn load(path: &Path) -> Result<Self, ParamError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ParamError::Io {
            path: display.clone(),
            source,
        })?;
        let document = serde_json::from_str(&text).map_err(|source| ParamError::Json {
            path: display,
            source,
        })?;
        Self::from_json(document)
    }

    /// Apply `key=value` assignments. Values parse as JSON when they can,
    /// and are taken as plain strings otherwise.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` for an argument without `=`
    pub fn apply_assignments(&mut self, pairs: &[String]) -> Result<(), ParamError> {
        for pair in pairs {
            let (key, raw) = pair.split_once('=').ok_or_else(|| ParamError::Malformed {
                pair: pair.clone(),
            })?;
            if key.trim().is_empty() {
                return Err(ParamError::Malformed { pair: pair.clone() });
            }
            let value = serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::from(raw));
            self.values.insert(key.trim().to_string(), value);
        }
        Ok(())
    }

    /// Whether no parameter was given
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn require(&self, name: &str) -> Result<&JsonValue, ParamError> {
        self.values.get(name).ok_or_else(|| ParamError::Missing {
            name: name.to_string(),
        })
    }

    fn wrong(name: &str, expected: &'static str) -> ParamError {
        ParamError::WrongType {
            name: name.to_string(),
            expected,
        }
    }

    /// Integer parameter
    ///
    /// # Errors
    ///
    /// Returns `Missing` or `WrongType`
    pub fn int(&self, name: &str) -> Result<i64, ParamError> {
        self.require(name)?
            .as_i64()
            .ok_or_else(|| Self::wrong(name, "an integer"))
    }

    /// String parameter
    ///
    /// # Errors
    ///
    /// Returns `Missing` or `WrongType`
    pub fn string(&self, name: &str) -> Result<String, ParamError> {
        self.require(name)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Self::wrong(name, "a string"))
    }

    /// Integer array parameter
    ///
    /// # Errors
    ///
    /// Returns `Missing` or `WrongType`
    pub fn int_list(&self, name: &str) -> Result<Vec<i64>, ParamError> {
        self.require(name)?
            .as_array()
            .and_then(|items| items.iter().map(JsonValue::as_i64).collect())
            .ok_or_else(|| Self::wrong(name, "an array of integers"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_assignments_parse_json_or_string() {
        let mut params = Params::default();
        params
            .apply_assignments(&["array=[3,1,2]".to_string(), "expression=a+b*c".to_string()])
            .unwrap();
        assert_eq!(params.int_list("array").unwrap(), vec![3, 1, 2]);
        assert_eq!(params.string("expression").unwrap(), "a+b*c");
    }

    #[test]
    fn test_malformed_assignment() {
        let mut params = Params::default();
        let result = params.apply_assignments(&["novalue".to_string()]);
        assert!(matches!(result, Err(ParamError::Malformed { .. })));
    }

    #[test]
    fn test_missing_and_wrong_type() {
        let params = Params::from_json(json!({"n": "ten"})).unwrap();
        assert!(matches!(params.int("n"), Err(ParamError::WrongType { .. })));
        assert!(matches!(params.int("m"), Err(ParamError::Missing { .. })));
    }

    #[test]
    fn test_not_an_object() {
        assert!(matches!(
            Params::from_json(json!([1, 2])),
            Err(ParamError::NotAnObject)
        ));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"n": 7}}"#).unwrap();
        let params = Params::load(file.path()).unwrap();
        assert_eq!(params.int("n").unwrap(), 7);
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(Params::load(file.path()), Err(ParamError::Json { .. })));
    }
}
