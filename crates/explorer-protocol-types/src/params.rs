use serde::{Deserialize, Serialize};

/// Arguments shared by the `targets`, `attributes` and `providers` queries.
///
/// Accepted on the wire either as an object or as the positional array
/// `[target, host, mode]`, with trailing entries optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryArgs {
    /// Target identifier or pattern, opaque to the bridge.
    pub target: String,
    /// Host platform identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Build mode identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl QueryArgs {
    pub fn new(target: &str, host: Option<&str>, mode: Option<&str>) -> Self {
        Self {
            target: target.to_string(),
            host: host.map(str::to_string),
            mode: mode.map(str::to_string),
        }
    }

    pub fn to_params(&self) -> serde_json::Value {
        serde_json::json!(self)
    }

    pub fn from_params(params: Option<&serde_json::Value>) -> Result<Self, serde_json::Error> {
        match params {
            Some(value) => serde_json::from_value(value.clone()),
            None => serde_json::from_value(serde_json::Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_object_form() {
        let params = serde_json::json!({"target": "//app:bin", "mode": "@mode/opt"});
        let args = QueryArgs::from_params(Some(&params)).unwrap();

        assert_eq!(args, QueryArgs::new("//app:bin", None, Some("@mode/opt")));
    }

    #[test]
    fn accepts_positional_form() {
        let params = serde_json::json!(["//app:bin", "linux", null]);
        let args = QueryArgs::from_params(Some(&params)).unwrap();

        assert_eq!(args, QueryArgs::new("//app:bin", Some("linux"), None));
    }

    #[test]
    fn positional_form_allows_trailing_omissions() {
        let params = serde_json::json!(["//app/..."]);
        let args = QueryArgs::from_params(Some(&params)).unwrap();

        assert_eq!(args.target, "//app/...");
        assert!(args.host.is_none());
        assert!(args.mode.is_none());
    }

    #[test]
    fn missing_params_is_an_error() {
        assert!(QueryArgs::from_params(None).is_err());
        assert!(QueryArgs::from_params(Some(&serde_json::json!({}))).is_err());
    }

    #[test]
    fn to_params_skips_absent_options() {
        let value = QueryArgs::new("//a:b", None, None).to_params();
        assert_eq!(value, serde_json::json!({"target": "//a:b"}));
    }
}
