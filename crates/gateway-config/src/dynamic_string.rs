use std::{fmt, ops::Deref, str::FromStr, sync::OnceLock};

use regex::{Captures, Regex};
use serde_with::DeserializeFromStr;

/// A string read from the configuration file, in which `{{ env.NAME }}` placeholders are
/// replaced with the value of the environment variable `NAME` when deserializing.
#[derive(Clone, Debug, Default, PartialEq, Eq, DeserializeFromStr)]
pub struct DynamicString(String);

impl DynamicString {
    pub fn into_inner(self) -> String {
        self.0
    }
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([[:alnum:]_.]+)\s*\}\}").expect("must be valid"))
}

impl FromStr for DynamicString {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut error = None;

        let expanded = placeholder().replace_all(input, |captures: &Captures<'_>| {
            let key = &captures[1];

            let result = match key.split_once('.') {
                Some(("env", name)) if !name.contains('.') => {
                    std::env::var(name).map_err(|err| format!("{err}: `{name}`"))
                }
                _ => Err(format!(
                    "right now only variables scoped with 'env.' are supported: `{key}`"
                )),
            };

            result.unwrap_or_else(|err| {
                if error.is_none() {
                    error = Some(err);
                }
                String::new()
            })
        });

        match error {
            Some(error) => Err(error),
            None => Ok(DynamicString(expanded.into_owned())),
        }
    }
}

impl From<String> for DynamicString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DynamicString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for DynamicString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for DynamicString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for DynamicString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::DynamicString;

    #[test]
    fn static_string() {
        let result: DynamicString = "https://localhost:8081/".parse().unwrap();
        assert_eq!("https://localhost:8081/", result.as_ref());
    }

    #[test]
    fn env_var_not_set() {
        temp_env::with_var_unset("COSMOS_TEST_UNSET", || {
            let error = "{{ env.COSMOS_TEST_UNSET }}".parse::<DynamicString>().unwrap_err();
            insta::assert_snapshot!(&error, @"environment variable not found: `COSMOS_TEST_UNSET`");
        });
    }

    #[test]
    fn env_var_set() {
        temp_env::with_var("CosmosKey", Some("c2VjcmV0"), || {
            let result: DynamicString = "{{ env.CosmosKey }}".parse().unwrap();
            assert_eq!("c2VjcmV0", result.as_ref());
        });
    }

    #[test]
    fn env_vars_mixed_with_static_content() {
        let vars = [("COSMOS_ACCOUNT", Some("acme")), ("COSMOS_PORT", Some("443"))];

        temp_env::with_vars(vars, || {
            let result: DynamicString = "https://{{ env.COSMOS_ACCOUNT }}.documents.azure.com:{{env.COSMOS_PORT}}/"
                .parse()
                .unwrap();

            assert_eq!("https://acme.documents.azure.com:443/", result.as_ref());
        });
    }

    #[test]
    fn non_env_scope() {
        let error = "{{ secrets.KEY }}".parse::<DynamicString>().unwrap_err();

        insta::assert_snapshot!(&error, @"right now only variables scoped with 'env.' are supported: `secrets.KEY`");
    }
}
