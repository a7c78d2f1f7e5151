//! Read-only logs route
//!
//! Framework-neutral handling of `GET /logs`: parses the query parameters,
//! requires the master credential and forwards to the bound backend. Any HTTP
//! server can deserialize [`LogsParams`] from the query string and serve the
//! returned JSON body.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::adapter::LoggerAdapter;
use crate::entry::Severity;
use crate::error::{Error, Result};
use crate::query::{QueryOptions, SortOrder};

/// HTTP method served by the route
pub const LOGS_METHOD: &str = "GET";

/// Path served by the route
pub const LOGS_PATH: &str = "/logs";

/// Credentials attached to a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Auth {
    pub is_master: bool,
}

impl Auth {
    pub fn master() -> Self {
        Self { is_master: true }
    }
}

/// Query parameters for logs requests, as raw strings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsParams {
    /// Start time, epoch milliseconds or RFC 3339 (default: 7 days before `until`)
    pub from: Option<String>,
    /// End time, epoch milliseconds or RFC 3339 (default: now)
    pub until: Option<String>,
    /// Maximum number of entries (default: 10)
    pub size: Option<String>,
    /// `asc` or `desc` (default: `desc`)
    pub order: Option<String>,
    /// `info` or `error` (default: `info`)
    pub level: Option<String>,
}

impl LogsParams {
    /// Collect parameters from decoded query-string pairs; unknown keys are ignored
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "from" => &mut params.from,
                "until" => &mut params.until,
                "size" => &mut params.size,
                "order" => &mut params.order,
                "level" => &mut params.level,
                _ => continue,
            };
            *slot = Some(value.into());
        }
        params
    }

    /// Convert to query options
    ///
    /// Unparseable times and sizes fall back to the defaults; an unknown order or
    /// level is rejected.
    pub fn to_options(&self) -> Result<QueryOptions> {
        let mut options = QueryOptions::new();

        options.from = self.from.as_deref().and_then(|raw| parse_time(raw).ok());
        options.until = self.until.as_deref().and_then(|raw| parse_time(raw).ok());
        options.size = self
            .size
            .as_deref()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|size| *size > 0);

        if let Some(order) = self.order.as_deref() {
            options.order = Some(order.parse::<SortOrder>()?);
        }
        if let Some(level) = self.level.as_deref() {
            options.level = Some(level.parse::<Severity>()?);
        }

        Ok(options)
    }
}

/// Parse epoch milliseconds or an RFC 3339 timestamp
pub fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(millis) = raw.parse::<i64>() {
        return Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| Error::invalid_timestamp(format!("out of range: {}", raw)));
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::invalid_timestamp(format!("{}: {}", raw, e)))
}

/// Reject callers without the master credential
pub fn enforce_security(auth: Option<&Auth>) -> Result<()> {
    match auth {
        Some(auth) if auth.is_master => Ok(()),
        _ => Err(Error::forbidden(
            "Clients aren't allowed to perform the get operation on logs.",
        )),
    }
}

/// Handle `GET /logs`, returning `{"response": [raw entries...]}`
pub fn handle_get(auth: Option<&Auth>, params: &LogsParams, adapter: &dyn LoggerAdapter) -> Result<Value> {
    enforce_security(auth)?;

    let options = params.to_options()?;
    let lines = adapter.query(&options)?;

    Ok(json!({ "response": lines }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::config::StoreConfig;
    use crate::entry::LogEntry;
    use crate::store::FileLogStore;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_parse_time() {
        let expected = Utc.with_ymd_and_hms(2016, 2, 4, 5, 59, 27).unwrap();
        assert_eq!(parse_time("1454565567000").unwrap(), expected);
        assert_eq!(parse_time("2016-02-04T05:59:27Z").unwrap(), expected);
        assert_eq!(parse_time("2016-02-04T06:59:27+01:00").unwrap(), expected);
        assert!(matches!(parse_time("last week"), Err(Error::InvalidTimestamp(_))));
    }

    #[test]
    fn test_params_defaults_and_fallbacks() -> Result<()> {
        let options = LogsParams::default().to_options()?;
        assert_eq!(options, QueryOptions::new());

        let params = LogsParams::from_query_pairs([
            ("from", "garbage"),
            ("size", "0"),
            ("order", "ASC"),
            ("level", "Error"),
            ("ignored", "x"),
        ]);
        let options = params.to_options()?;
        assert_eq!(options.from, None);
        assert_eq!(options.size, None);
        assert_eq!(options.order, Some(SortOrder::Ascending));
        assert_eq!(options.level, Some(Severity::Error));

        let options = LogsParams::from_query_pairs([("size", "25"), ("until", "1454565567000")]).to_options()?;
        assert_eq!(options.size, Some(25));
        assert_eq!(options.until, Some(Utc.with_ymd_and_hms(2016, 2, 4, 5, 59, 27).unwrap()));
        Ok(())
    }

    #[test]
    fn test_params_reject_unknown_level_and_order() {
        let params = LogsParams::from_query_pairs([("level", "debug")]);
        assert!(matches!(params.to_options(), Err(Error::InvalidLevel(_))));

        let params = LogsParams::from_query_pairs([("order", "random")]);
        assert!(matches!(params.to_options(), Err(Error::InvalidOrder(_))));
    }

    #[test]
    fn test_params_deserialize() {
        let params: LogsParams = serde_json::from_str(r#"{"size":"5","level":"info"}"#).unwrap();
        assert_eq!(params.size.as_deref(), Some("5"));
        assert_eq!(params.level.as_deref(), Some("info"));
    }

    #[test]
    fn test_enforce_security() {
        assert!(enforce_security(Some(&Auth::master())).is_ok());

        let err = enforce_security(None).unwrap_err();
        assert!(err.is_forbidden());
        assert!(err.to_string().contains("Clients aren't allowed"));

        assert!(enforce_security(Some(&Auth::default())).unwrap_err().is_forbidden());
    }

    #[test]
    fn test_handle_get() -> Result<()> {
        let dir = tempdir()?;
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let clock = Arc::new(MockClock::with_time(now));
        let store = FileLogStore::with_clock(StoreConfig::new().with_directory(dir.path()), clock)?;
        store.info("visible")?;
        store.write(Severity::Error, &LogEntry::new(Severity::Error, "failure", now))?;

        let params = LogsParams::from_query_pairs([("level", "error"), ("size", "5")]);

        let forbidden = handle_get(None, &params, &store).unwrap_err();
        assert!(forbidden.is_forbidden());

        let body = handle_get(Some(&Auth::master()), &params, &store)?;
        let response = body["response"].as_array().unwrap();
        assert_eq!(response.len(), 1);
        let entry = LogEntry::from_line(response[0].as_str().unwrap())?;
        assert_eq!(entry.message, "failure");
        Ok(())
    }

    fn store_with_history(now: DateTime<Utc>) -> Result<(tempfile::TempDir, FileLogStore)> {
        let dir = tempdir()?;
        let clock = Arc::new(MockClock::with_time(now - chrono::Duration::days(30)));
        let store = FileLogStore::with_clock(StoreConfig::new().with_directory(dir.path()), clock.clone())?;
        store.info("thirty days ago")?;
        clock.set_time(now);
        store.info("today")?;
        Ok((dir, store))
    }

    fn response_len(body: &Value) -> usize {
        body["response"].as_array().map(Vec::len).unwrap_or_default()
    }

    #[test]
    fn test_handle_get_single_bound_defaults() -> Result<()> {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let (_dir, store) = store_with_history(now)?;
        let master = Auth::master();

        let until = (now - chrono::Duration::days(29)).timestamp_millis().to_string();
        let body = handle_get(Some(&master), &LogsParams::from_query_pairs([("until", until)]), &store)?;
        assert_eq!(response_len(&body), 0);

        let from = (now - chrono::Duration::days(31)).to_rfc3339();
        let body = handle_get(Some(&master), &LogsParams::from_query_pairs([("from", from)]), &store)?;
        assert_eq!(response_len(&body), 2);
        Ok(())
    }

    #[test]
    fn test_handle_get_extreme_times() -> Result<()> {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let (_dir, store) = store_with_history(now)?;
        let master = Auth::master();
        let earliest = DateTime::<Utc>::MIN_UTC.timestamp_millis().to_string();

        let params = LogsParams::from_query_pairs([("until", earliest.as_str())]);
        assert_eq!(response_len(&handle_get(Some(&master), &params, &store)?), 0);

        let params = LogsParams::from_query_pairs([("from", earliest.as_str())]);
        assert_eq!(response_len(&handle_get(Some(&master), &params, &store)?), 2);
        Ok(())
    }

    #[test]
    fn test_route_constants() {
        assert_eq!(LOGS_METHOD, "GET");
        assert_eq!(LOGS_PATH, "/logs");
    }

    #[test]
    fn test_security_checked_before_parsing() {
        let dir = tempdir().unwrap();
        let store = FileLogStore::new(dir.path()).unwrap();
        let params = LogsParams::from_query_pairs([("level", "bogus")]);

        let err = handle_get(Some(&Auth::default()), &params, &store).unwrap_err();
        assert!(err.is_forbidden());
    }
}
