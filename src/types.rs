use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Roles the upstream gate may assign to a principal that reaches the reporting endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Funcionario,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Funcionario => "funcionario",
            UserRole::Admin => "admin",
        }
    }
}

/// Inclusive timestamp range where either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateBounds {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateBounds {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    /// An absent bound imposes no constraint on its side.
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| *ts >= from) && self.to.map_or(true, |to| *ts <= to)
    }
}

/// Canonical RFC 3339 text for bound parameters. Stored values may carry a
/// different precision, so queries compare them through `strftime` in this
/// same shape.
pub fn to_db_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// SQL expression that renders a stored timestamp column in the same shape as
/// [`to_db_timestamp`], whatever precision or offset it was written with.
pub fn db_timestamp_column(column: &str) -> String {
    format!("strftime('%Y-%m-%dT%H:%M:%fZ', {})", column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_user_role_labels() {
        assert_eq!(UserRole::Funcionario.as_str(), "funcionario");
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(serde_json::to_value(UserRole::Funcionario).unwrap(), "funcionario");
    }

    #[test]
    fn test_date_bounds_open_sides() {
        let jan = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let mar = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        assert!(DateBounds::default().contains(&jan));
        assert!(DateBounds::new(Some(jan), None).contains(&mar));
        assert!(!DateBounds::new(Some(mar), None).contains(&jan));
        assert!(DateBounds::new(None, Some(jan)).contains(&jan));
        assert!(!DateBounds::new(None, Some(jan)).contains(&mar));
    }

    #[test]
    fn test_db_timestamp_is_fixed_width() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap();
        assert_eq!(to_db_timestamp(&ts), "2024-05-02T08:30:00.000Z");
        assert_eq!(
            db_timestamp_column("p.created_at"),
            "strftime('%Y-%m-%dT%H:%M:%fZ', p.created_at)"
        );
    }
}
