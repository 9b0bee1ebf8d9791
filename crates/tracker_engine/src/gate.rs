use std::sync::RwLock;

use serde_json::{Map, Value};

/// Credentials and calculation settings attached to every request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSet {
    pub api_key: Option<String>,
    /// Calculation configuration forwarded on full requests.
    pub config: Map<String, Value>,
    /// False while the parameter form reports errors.
    pub valid: bool,
}

impl ParameterSet {
    pub fn new(api_key: Option<String>, config: Map<String, Value>, valid: bool) -> Self {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        Self {
            api_key,
            config,
            valid,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Source of the current parameters. Read once per request or cycle.
pub trait ParameterGate: Send + Sync {
    fn snapshot(&self) -> ParameterSet;
}

/// Parameters pushed in by the host whenever the form changes.
#[derive(Debug, Default)]
pub struct SharedParameters {
    current: RwLock<ParameterSet>,
}

impl SharedParameters {
    pub fn new(initial: ParameterSet) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// Stores new form values; any reported error makes the set invalid.
    pub fn update(&self, api_key: Option<String>, config: Map<String, Value>, errors: &[String]) {
        let next = ParameterSet::new(api_key, config, errors.is_empty());
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

impl ParameterGate for SharedParameters {
    fn snapshot(&self) -> ParameterSet {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ParameterGate for ParameterSet {
    fn snapshot(&self) -> ParameterSet {
        self.clone()
    }
}

/// Builds the request body sent over the wire.
///
/// The body's own fields are kept as given. `apiKey` is always added when
/// known; the calculation config only when `api_key_only` is false.
pub fn augment(body: Option<Value>, params: &ParameterSet, api_key_only: bool) -> Value {
    let mut merged = match body {
        Some(Value::Object(map)) => map,
        Some(Value::Null) | None => Map::new(),
        Some(other) => {
            let mut map = Map::new();
            map.insert("body".to_string(), other);
            map
        }
    };

    if let Some(key) = &params.api_key {
        merged.insert("apiKey".to_string(), Value::String(key.clone()));
    }

    if !api_key_only {
        for (name, value) in &params.config {
            merged.entry(name.clone()).or_insert_with(|| value.clone());
        }
    }

    Value::Object(merged)
}
