/// Common test utilities and helpers for integration tests.
use std::sync::Arc;

use wwtrail::catalog::{Catalog, NewCompetition, NewEdition};
use wwtrail::config::Settings;
use wwtrail::favorites::Favorites;
use wwtrail::managers::{AccountRole, Actor, Managers};
use wwtrail::model::{CompetitionId, EditionStatus, RegistrationStatus};
use wwtrail::store::{CatalogStore, MemoryStore};

/// A fresh in-memory directory with all three services sharing one store.
#[allow(dead_code)]
pub fn directory() -> (Catalog, Favorites, Managers) {
	let store: Arc<dyn CatalogStore> = Arc::new(MemoryStore::new());
	let settings = Settings::default();
	(
		Catalog::new(store.clone(), settings.clone()),
		Favorites::new(store.clone(), settings),
		Managers::new(store),
	)
}

#[allow(dead_code)]
pub fn organizer(user_id: u64) -> Actor {
	Actor::new(user_id, AccountRole::Organizer)
}

#[allow(dead_code)]
pub fn admin(user_id: u64) -> Actor {
	Actor::new(user_id, AccountRole::Admin)
}

#[allow(dead_code)]
pub fn runner(user_id: u64) -> Actor {
	Actor::new(user_id, AccountRole::Runner)
}

/// A competition draft with the Chamonix template values used across the
/// integration suites.
#[allow(dead_code)]
pub fn chamonix_competition(slug: &str) -> NewCompetition {
	NewCompetition {
		slug: slug.to_string(),
		name: "Ultra-Trail du Mont-Blanc".to_string(),
		website: None,
		base_distance_km: Some(42.0),
		base_elevation_m: Some(2000.0),
		base_max_participants: Some(300),
		base_city: Some("Chamonix".to_string()),
	}
}

/// An edition draft with no overrides (inherits everything).
#[allow(dead_code)]
pub fn bare_edition(competition_id: CompetitionId, year: i32) -> NewEdition {
	NewEdition {
		competition_id,
		slug: None,
		year,
		status: EditionStatus::Upcoming,
		registration_status: RegistrationStatus::ComingSoon,
		start_date: None,
		distance_km: None,
		elevation_m: None,
		max_participants: None,
		city: None,
	}
}
