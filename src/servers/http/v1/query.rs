//! The `Query` struct used to parse and store the URL query parameters.
//!
//! ```text
//! URI = scheme ":" ["//" authority] path ["?" query] ["#" fragment]
//! ```
use std::str::FromStr;

use multimap::MultiMap;

type ParamName = String;
type ParamValue = String;

/// It represents a URL query component.
///
/// ```text
/// URI = scheme ":" ["//" authority] path ["?" query] ["#" fragment]
/// ```
#[derive(Debug, Default)]
pub struct Query {
    params: MultiMap<ParamName, NameValuePair>,
}

impl Query {
    /// It returns `Some(value)` for a URL query param if the param with the
    /// input `name` exists. For example:
    ///
    /// ```rust
    /// use transfer_bench::servers::http::v1::query::Query;
    ///
    /// let raw_query = "param1=value1&param2=value2";
    ///
    /// let query = raw_query.parse::<Query>().unwrap();
    ///
    /// assert_eq!(query.get_param("param1").unwrap(), "value1");
    /// assert_eq!(query.get_param("param2").unwrap(), "value2");
    /// ```
    ///
    /// It returns only the first param value even if it has multiple values:
    ///
    /// ```rust
    /// use transfer_bench::servers::http::v1::query::Query;
    ///
    /// let raw_query = "param1=value1&param1=value2";
    ///
    /// let query = raw_query.parse::<Query>().unwrap();
    ///
    /// assert_eq!(query.get_param("param1").unwrap(), "value1");
    /// ```
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<String> {
        self.params.get(name).map(|pair| pair.value.clone())
    }
}

/// Infallible: tracker protocols are permissive, so a malformed pair is
/// dropped instead of failing the whole query. Raw values are *not* percent
/// decoded here; binary params decode lossily at the request layer.
impl FromStr for Query {
    type Err = std::convert::Infallible;

    fn from_str(raw_query: &str) -> Result<Self, Self::Err> {
        let mut params: MultiMap<ParamName, NameValuePair> = MultiMap::new();

        for raw_param in raw_query.trim().trim_start_matches('?').split('&') {
            if let Some((name, value)) = raw_param.split_once('=') {
                params.insert(
                    name.to_owned(),
                    NameValuePair {
                        name: name.to_owned(),
                        value: value.to_owned(),
                    },
                );
            }
        }

        Ok(Self { params })
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
struct NameValuePair {
    name: ParamName,
    value: ParamValue,
}
