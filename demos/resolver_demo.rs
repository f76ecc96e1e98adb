/// Example demonstrating edition field-inheritance resolution.
///
/// This example shows how a yearly edition inherits distance, elevation,
/// participant cap and city from its competition unless it overrides them.
///
/// Run with: cargo run --example resolver_demo
use chrono::{TimeZone, Utc};
use wwtrail::editions::{inherited_fields, is_inherited, resolve, InheritableField};
use wwtrail::model::{Competition, Edition, EditionStatus, RegistrationStatus};

fn main() {
	println!("=== WWTRAIL Edition Resolver Demo ===\n");

	println!("Example 1: Inheriting the competition template");
	println!("----------------------------------------------");
	demo_inherit();
	println!();

	println!("Example 2: Partial override");
	println!("---------------------------");
	demo_partial_override();
	println!();

	println!("Example 3: Absence when neither side has a value");
	println!("------------------------------------------------");
	demo_both_absent();
	println!();

	println!("=== Demo Complete ===");
}

fn competition() -> Competition {
	let at = Utc.with_ymd_and_hms(2024, 11, 2, 9, 0, 0).unwrap();
	Competition {
		id: 1,
		slug: "ultra-trail-du-mont-blanc".to_string(),
		name: "Ultra-Trail du Mont-Blanc".to_string(),
		organizer_id: 42,
		website: None,
		base_distance_km: Some(171.0),
		base_elevation_m: Some(10_000.0),
		base_max_participants: Some(2300),
		base_city: Some("Chamonix".to_string()),
		created_at: at,
		updated_at: at,
	}
}

fn edition(year: i32) -> Edition {
	let at = Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap();
	Edition {
		id: 10,
		competition_id: 1,
		slug: format!("ultra-trail-du-mont-blanc-{year}"),
		year,
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

fn demo_inherit() {
	let c = competition();
	let e = edition(2025);

	println!("Competition template:");
	println!("  base_distance_km: {:?}", c.base_distance_km);
	println!("  base_city: {:?}", c.base_city);
	println!("Edition 2025 carries no values of its own.");

	let resolved = resolve(&e, &c);
	println!("\nResolved edition:");
	println!("  resolved_distance_km: {:?}", resolved.resolved_distance_km);
	println!("  resolved_city: {:?}", resolved.resolved_city);
	println!("  inherited fields: {:?}", inherited_fields(&e, &c));
	println!("  → Every stat comes from the template");
}

fn demo_partial_override() {
	let c = competition();
	let mut e = edition(2026);
	// The 2026 course is rerouted and flat sections removed.
	e.distance_km = Some(174.5);
	e.elevation_m = Some(10_300.0);

	println!("Edition 2026 overrides:");
	println!("  distance_km: {:?}", e.distance_km);
	println!("  elevation_m: {:?}", e.elevation_m);

	let resolved = resolve(&e, &c);
	println!("\nResolved edition:");
	println!("  resolved_distance_km: {:?}", resolved.resolved_distance_km);
	println!("  resolved_elevation_m: {:?}", resolved.resolved_elevation_m);
	println!("  resolved_city: {:?}", resolved.resolved_city);
	println!(
		"  distance inherited: {}",
		is_inherited(&e, &c, InheritableField::Distance)
	);
	println!(
		"  city inherited: {}",
		is_inherited(&e, &c, InheritableField::City)
	);
	println!("  → Own values win, the rest falls back to the template");
}

fn demo_both_absent() {
	let mut c = competition();
	c.base_max_participants = None;
	let e = edition(2027);

	let resolved = resolve(&e, &c);
	println!("Neither the edition nor the template caps participants.");
	println!(
		"  resolved_max_participants: {:?}",
		resolved.resolved_max_participants
	);
	println!(
		"  max_participants inherited: {}",
		is_inherited(&e, &c, InheritableField::MaxParticipants)
	);
	println!("  → Absent stays absent; the UI omits the stat card");
}
