use chrono::{DateTime, Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

pub type CompetitionId = u64;
pub type EditionId = u64;
pub type UserId = u64;

/// Slug shape accepted throughout the directory: lowercase kebab, no leading
/// or trailing dash, no consecutive dashes.
static SLUG_RE: Lazy<Regex> = Lazy::new(|| {
	Regex::new("^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug regex is valid")
});

/// Check a slug against the directory slug shape and a length bound.
pub fn is_valid_slug(slug: &str, max_len: usize) -> bool {
	!slug.is_empty() && slug.len() <= max_len && SLUG_RE.is_match(slug)
}

/// Lifecycle of a yearly edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditionStatus {
	#[default]
	Upcoming,
	Ongoing,
	Finished,
	Cancelled,
}

impl EditionStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			EditionStatus::Upcoming => "UPCOMING",
			EditionStatus::Ongoing => "ONGOING",
			EditionStatus::Finished => "FINISHED",
			EditionStatus::Cancelled => "CANCELLED",
		}
	}
}

/// Registration window state of a yearly edition, independent of lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
	Open,
	Closed,
	Full,
	#[default]
	ComingSoon,
}

impl RegistrationStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			RegistrationStatus::Open => "OPEN",
			RegistrationStatus::Closed => "CLOSED",
			RegistrationStatus::Full => "FULL",
			RegistrationStatus::ComingSoon => "COMING_SOON",
		}
	}
}

/// A competition: the long-lived template an organizer owns (e.g. "UTMB").
///
/// The `base_*` fields are defaults for all of the competition's editions.
/// Each edition may override them individually; an absent (`None`) edition
/// field inherits the base value at read time (see [`crate::editions`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competition {
	pub id: CompetitionId,
	pub slug: String,
	pub name: String,
	/// Owner. Delegated managers are tracked separately in
	/// [`crate::managers::ManagerGrant`].
	pub organizer_id: UserId,
	pub website: Option<Url>,
	/// Default course length in kilometers. Positive when present.
	pub base_distance_km: Option<f64>,
	/// Default cumulative elevation gain in meters. Zero is a legitimate
	/// value (flat race), distinct from absent.
	pub base_elevation_m: Option<f64>,
	/// Default participant cap. Positive when present.
	pub base_max_participants: Option<u32>,
	/// Default host city.
	pub base_city: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// One yearly instance of a competition (e.g. "UTMB 2025").
///
/// The four override fields mirror the competition's `base_*` fields.
/// `None` means "inherit from the competition"; `Some(0.0)` elevation or an
/// empty city string are present values, never absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edition {
	pub id: EditionId,
	pub competition_id: CompetitionId,
	pub slug: String,
	/// 4-digit calendar year, unique within the competition.
	pub year: i32,
	pub status: EditionStatus,
	pub registration_status: RegistrationStatus,
	pub start_date: Option<NaiveDate>,
	pub distance_km: Option<f64>,
	pub elevation_m: Option<f64>,
	pub max_participants: Option<u32>,
	pub city: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Edition {
	/// Whether this edition belongs to the calendar year of `today`.
	///
	/// The caller supplies the date so the domain layer never reads the wall
	/// clock; used by list views to highlight the current edition.
	pub fn is_current(&self, today: NaiveDate) -> bool {
		self.year == today.year()
	}
}

#[cfg(test)]
#[cfg(feature = "unit-tests")]
mod tests {
	use chrono::NaiveDate;

	use super::*;

	#[test]
	fn test_slug_shape() {
		assert!(is_valid_slug("utmb", 64));
		assert!(is_valid_slug("ultra-trail-du-mont-blanc", 64));
		assert!(is_valid_slug("utmb-2025", 64));

		assert!(!is_valid_slug("", 64));
		assert!(!is_valid_slug("UTMB", 64));
		assert!(!is_valid_slug("-utmb", 64));
		assert!(!is_valid_slug("utmb-", 64));
		assert!(!is_valid_slug("ultra--trail", 64));
		assert!(!is_valid_slug("ultra trail", 64));
		assert!(!is_valid_slug("utmb", 3));
	}

	#[test]
	fn test_status_wire_format() {
		// The surrounding API exposes statuses as upper snake strings; the
		// serde representation must match.
		assert_eq!(
			serde_json::to_string(&EditionStatus::Upcoming).unwrap(),
			"\"UPCOMING\""
		);
		assert_eq!(
			serde_json::to_string(&RegistrationStatus::ComingSoon).unwrap(),
			"\"COMING_SOON\""
		);
		let parsed: RegistrationStatus = serde_json::from_str("\"FULL\"").unwrap();
		assert_eq!(parsed, RegistrationStatus::Full);
	}

	#[test]
	fn test_is_current_uses_caller_date() {
		let edition = Edition {
			id: 1,
			competition_id: 1,
			slug: "utmb-2025".to_string(),
			year: 2025,
			status: EditionStatus::Upcoming,
			registration_status: RegistrationStatus::Open,
			start_date: None,
			distance_km: None,
			elevation_m: None,
			max_participants: None,
			city: None,
			created_at: chrono::Utc::now(),
			updated_at: chrono::Utc::now(),
		};

		assert!(edition.is_current(NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()));
		assert!(!edition.is_current(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
	}
}
