use serde::{Deserialize, Serialize};

use crate::model::{Competition, Edition};

/// The four edition fields that fall back to the competition's `base_*`
/// value when the edition does not carry its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InheritableField {
	Distance,
	Elevation,
	MaxParticipants,
	City,
}

impl InheritableField {
	pub const ALL: [InheritableField; 4] = [
		InheritableField::Distance,
		InheritableField::Elevation,
		InheritableField::MaxParticipants,
		InheritableField::City,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			InheritableField::Distance => "distance",
			InheritableField::Elevation => "elevation",
			InheritableField::MaxParticipants => "max_participants",
			InheritableField::City => "city",
		}
	}
}

/// An edition with its effective field values applied.
///
/// This is a read-time projection: it is never persisted and is recomputed on
/// every read. It is a distinct type, produced only by [`resolve`], so
/// consumers branch on the type rather than probing a record for
/// `resolved_*` keys. A `resolved_*` field is `None` only when both the
/// edition's own value and the competition's base value are absent; renderers
/// must handle that case explicitly (e.g. omit the stat card).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEdition {
	#[serde(flatten)]
	pub edition: Edition,
	pub resolved_distance_km: Option<f64>,
	pub resolved_elevation_m: Option<f64>,
	pub resolved_max_participants: Option<u32>,
	pub resolved_city: Option<String>,
}

/// Compute the effective values of an edition against its competition.
///
/// Per field, independently: the edition's own value when present, else the
/// competition's base value, else absent. Presence is `Some`; zero and the
/// empty string are present values. Pure and total: no I/O, no mutation of
/// either input, no error cases.
///
/// Pairing is the caller's contract: `competition` must be the competition
/// `edition.competition_id` refers to. [`crate::catalog::Catalog`] always
/// loads the pair that way before resolving.
pub fn resolve(edition: &Edition, competition: &Competition) -> ResolvedEdition {
	ResolvedEdition {
		resolved_distance_km: edition.distance_km.or(competition.base_distance_km),
		resolved_elevation_m: edition.elevation_m.or(competition.base_elevation_m),
		resolved_max_participants: edition
			.max_participants
			.or(competition.base_max_participants),
		resolved_city: edition
			.city
			.clone()
			.or_else(|| competition.base_city.clone()),
		edition: edition.clone(),
	}
}

/// Whether the resolved value for `field` comes from the competition's base
/// rather than the edition itself.
///
/// True iff the edition's own value is absent and the base value is present;
/// when both are absent there is nothing to inherit and this returns false.
/// Used for the "* inherited" annotation next to stat cards.
pub fn is_inherited(edition: &Edition, competition: &Competition, field: InheritableField) -> bool {
	match field {
		InheritableField::Distance => {
			edition.distance_km.is_none() && competition.base_distance_km.is_some()
		}
		InheritableField::Elevation => {
			edition.elevation_m.is_none() && competition.base_elevation_m.is_some()
		}
		InheritableField::MaxParticipants => {
			edition.max_participants.is_none() && competition.base_max_participants.is_some()
		}
		InheritableField::City => edition.city.is_none() && competition.base_city.is_some(),
	}
}

/// All fields whose resolved value is inherited, in declaration order.
pub fn inherited_fields(edition: &Edition, competition: &Competition) -> Vec<InheritableField> {
	InheritableField::ALL
		.into_iter()
		.filter(|field| is_inherited(edition, competition, *field))
		.collect()
}

#[cfg(feature = "unit-tests")]
mod tests {
	use chrono::{TimeZone, Utc};

	use super::*;
	use crate::model::{Competition, Edition, EditionStatus, RegistrationStatus};

	fn competition() -> Competition {
		let at = Utc.with_ymd_and_hms(2024, 11, 2, 9, 0, 0).unwrap();
		Competition {
			id: 7,
			slug: "ultra-trail-du-mont-blanc".to_string(),
			name: "Ultra-Trail du Mont-Blanc".to_string(),
			organizer_id: 42,
			website: None,
			base_distance_km: Some(42.0),
			base_elevation_m: Some(2000.0),
			base_max_participants: Some(300),
			base_city: Some("Chamonix".to_string()),
			created_at: at,
			updated_at: at,
		}
	}

	fn edition() -> Edition {
		let at = Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap();
		Edition {
			id: 70,
			competition_id: 7,
			slug: "ultra-trail-du-mont-blanc-2025".to_string(),
			year: 2025,
			status: EditionStatus::Upcoming,
			registration_status: RegistrationStatus::Open,
			start_date: None,
			distance_km: None,
			elevation_m: None,
			max_participants: None,
			city: None,
			created_at: at,
			updated_at: at,
		}
	}

	#[test]
	fn test_override_takes_precedence() {
		let mut e = edition();
		e.distance_km = Some(55.5);
		let resolved = resolve(&e, &competition());
		assert_eq!(resolved.resolved_distance_km, Some(55.5));
	}

	#[test]
	fn test_absent_field_falls_back_to_base() {
		let resolved = resolve(&edition(), &competition());
		assert_eq!(resolved.resolved_distance_km, Some(42.0));
		assert_eq!(resolved.resolved_elevation_m, Some(2000.0));
		assert_eq!(resolved.resolved_max_participants, Some(300));
		assert_eq!(resolved.resolved_city.as_deref(), Some("Chamonix"));
	}

	#[test]
	fn test_zero_elevation_is_a_value_not_absence() {
		// A flat race legitimately overrides a 2000m base with 0m.
		let mut e = edition();
		e.elevation_m = Some(0.0);
		let c = competition();

		let resolved = resolve(&e, &c);
		assert_eq!(resolved.resolved_elevation_m, Some(0.0));
		assert!(!is_inherited(&e, &c, InheritableField::Elevation));
	}

	#[test]
	fn test_empty_city_is_a_value_not_absence() {
		let mut e = edition();
		e.city = Some(String::new());
		let resolved = resolve(&e, &competition());
		assert_eq!(resolved.resolved_city.as_deref(), Some(""));
	}

	#[test]
	fn test_both_absent_resolves_to_absent() {
		let e = edition();
		let mut c = competition();
		c.base_distance_km = None;

		let resolved = resolve(&e, &c);
		assert_eq!(resolved.resolved_distance_km, None);
		// Nothing to inherit from either.
		assert!(!is_inherited(&e, &c, InheritableField::Distance));
	}

	#[test]
	fn test_inputs_are_not_mutated_and_calls_are_deterministic() {
		let e = edition();
		let c = competition();
		let e_before = e.clone();
		let c_before = c.clone();

		let first = resolve(&e, &c);
		let second = resolve(&e, &c);

		assert_eq!(first, second);
		assert_eq!(e, e_before);
		assert_eq!(c, c_before);
		// The projection carries the edition's original fields unchanged.
		assert_eq!(first.edition, e_before);
	}

	#[test]
	fn test_is_inherited_matches_resolved_source() {
		let mut e = edition();
		e.elevation_m = Some(1800.0);
		let c = competition();

		for field in InheritableField::ALL {
			if is_inherited(&e, &c, field) {
				// An inherited value must equal the base value.
				let resolved = resolve(&e, &c);
				match field {
					InheritableField::Distance => {
						assert_eq!(resolved.resolved_distance_km, c.base_distance_km)
					}
					InheritableField::Elevation => {
						assert_eq!(resolved.resolved_elevation_m, c.base_elevation_m)
					}
					InheritableField::MaxParticipants => {
						assert_eq!(resolved.resolved_max_participants, c.base_max_participants)
					}
					InheritableField::City => {
						assert_eq!(resolved.resolved_city, c.base_city)
					}
				}
			}
		}
		assert_eq!(
			inherited_fields(&e, &c),
			vec![
				InheritableField::Distance,
				InheritableField::MaxParticipants,
				InheritableField::City
			]
		);
	}

	#[test]
	fn test_partial_override_mix() {
		// Edition overrides elevation only; everything else inherits.
		let mut e = edition();
		e.elevation_m = Some(1800.0);
		let c = competition();

		let resolved = resolve(&e, &c);
		assert_eq!(resolved.resolved_distance_km, Some(42.0));
		assert_eq!(resolved.resolved_elevation_m, Some(1800.0));
		assert_eq!(resolved.resolved_max_participants, Some(300));
		assert_eq!(resolved.resolved_city.as_deref(), Some("Chamonix"));

		assert!(is_inherited(&e, &c, InheritableField::Distance));
		assert!(!is_inherited(&e, &c, InheritableField::Elevation));
	}

	#[test]
	fn test_full_override_ignores_base_entirely() {
		let mut e = edition();
		e.distance_km = Some(100.0);
		e.elevation_m = Some(6000.0);
		e.max_participants = Some(2500);
		e.city = Some("Courmayeur".to_string());
		let c = competition();

		let resolved = resolve(&e, &c);
		assert_eq!(resolved.resolved_distance_km, Some(100.0));
		assert_eq!(resolved.resolved_elevation_m, Some(6000.0));
		assert_eq!(resolved.resolved_max_participants, Some(2500));
		assert_eq!(resolved.resolved_city.as_deref(), Some("Courmayeur"));
		assert!(inherited_fields(&e, &c).is_empty());
	}

	#[test]
	fn test_resolved_projection_wire_shape() {
		// The projection flattens the edition and appends the four resolved
		// fields; the surrounding API serves it as-is.
		let resolved = resolve(&edition(), &competition());
		let value = serde_json::to_value(&resolved).unwrap();

		assert_eq!(value["year"], 2025);
		assert_eq!(value["status"], "UPCOMING");
		assert_eq!(value["distance_km"], serde_json::Value::Null);
		assert_eq!(value["resolved_distance_km"], 42.0);
		assert_eq!(value["resolved_city"], "Chamonix");
	}
}
