use chrono::{TimeZone, Utc};
use wwtrail::editions::{inherited_fields, is_inherited, resolve, InheritableField};
use wwtrail::model::{Competition, Edition, EditionStatus, RegistrationStatus};

#[cfg(feature = "integration-tests")]
mod integration_tests {
	use super::*;

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

	/// The edition supplies elevation only; the three other stats come from
	/// the competition template.
	#[test]
	fn test_single_override_against_full_template() {
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

	/// Both sides absent: the resolved value is explicitly absent and
	/// nothing counts as inherited.
	#[test]
	fn test_absent_on_both_sides() {
		let e = edition();
		let mut c = competition();
		c.base_distance_km = None;
		c.base_elevation_m = None;
		c.base_max_participants = None;
		c.base_city = None;

		let resolved = resolve(&e, &c);
		assert_eq!(resolved.resolved_distance_km, None);
		assert_eq!(resolved.resolved_elevation_m, None);
		assert_eq!(resolved.resolved_max_participants, None);
		assert_eq!(resolved.resolved_city, None);
		assert!(inherited_fields(&e, &c).is_empty());
	}

	/// The edition overrides everything; the template is fully ignored.
	#[test]
	fn test_full_override() {
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

	/// Override precedence holds for every field regardless of what the
	/// template carries.
	#[test]
	fn test_override_wins_for_each_field_independently() {
		let c = competition();
		for field in InheritableField::ALL {
			let mut e = edition();
			match field {
				InheritableField::Distance => e.distance_km = Some(13.0),
				InheritableField::Elevation => e.elevation_m = Some(0.0),
				InheritableField::MaxParticipants => e.max_participants = Some(50),
				InheritableField::City => e.city = Some("Zegama".to_string()),
			}

			let resolved = resolve(&e, &c);
			assert!(!is_inherited(&e, &c, field));
			match field {
				InheritableField::Distance => {
					assert_eq!(resolved.resolved_distance_km, Some(13.0))
				}
				InheritableField::Elevation => {
					assert_eq!(resolved.resolved_elevation_m, Some(0.0))
				}
				InheritableField::MaxParticipants => {
					assert_eq!(resolved.resolved_max_participants, Some(50))
				}
				InheritableField::City => {
					assert_eq!(resolved.resolved_city.as_deref(), Some("Zegama"))
				}
			}
		}
	}
}
