use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use log::info;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::Settings;
use crate::editions::{resolve, ResolvedEdition};
use crate::managers::{can_edit_competition, can_manage_editions, Actor};
use crate::model::{
	is_valid_slug, Competition, CompetitionId, Edition, EditionId, EditionStatus,
	RegistrationStatus,
};
use crate::store::{CatalogStore, StoreError};

#[derive(Debug, Error)]
pub enum CatalogError {
	#[error("competition not found")]
	CompetitionNotFound,
	#[error("edition not found")]
	EditionNotFound,
	#[error("not allowed: {0}")]
	Forbidden(&'static str),
	#[error("invalid slug: {0:?}")]
	InvalidSlug(String),
	#[error("invalid year {0}: editions use a 4-digit calendar year")]
	InvalidYear(i32),
	#[error("invalid value for {field}: {reason}")]
	InvalidField {
		field: &'static str,
		reason: &'static str,
	},
	#[error("an edition for {year} already exists on this competition")]
	DuplicateYear { year: i32 },
	#[error("slug already in use: {0}")]
	DuplicateSlug(String),
	#[error(transparent)]
	Store(StoreError),
}

impl From<StoreError> for CatalogError {
	fn from(e: StoreError) -> Self {
		match e {
			StoreError::CompetitionNotFound => CatalogError::CompetitionNotFound,
			StoreError::EditionNotFound => CatalogError::EditionNotFound,
			StoreError::DuplicateSlug(slug) => CatalogError::DuplicateSlug(slug),
			StoreError::DuplicateYear { year, .. } => CatalogError::DuplicateYear { year },
			other => CatalogError::Store(other),
		}
	}
}

/// Listing window. `limit` falls back to the configured default page size
/// and is clamped to the configured maximum.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Page {
	#[serde(default)]
	pub offset: usize,
	#[serde(default)]
	pub limit: Option<usize>,
}

/// Input for creating a competition. The actor becomes the organizer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCompetition {
	pub slug: String,
	pub name: String,
	#[serde(default)]
	pub website: Option<Url>,
	#[serde(default)]
	pub base_distance_km: Option<f64>,
	#[serde(default)]
	pub base_elevation_m: Option<f64>,
	#[serde(default)]
	pub base_max_participants: Option<u32>,
	#[serde(default)]
	pub base_city: Option<String>,
}

/// Partial competition update. The outer `Option` is "touch this field at
/// all"; the inner one distinguishes setting a value from clearing it. The
/// slug is fixed at creation (it is the public URL identity).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompetitionUpdate {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub website: Option<Option<Url>>,
	#[serde(default)]
	pub base_distance_km: Option<Option<f64>>,
	#[serde(default)]
	pub base_elevation_m: Option<Option<f64>>,
	#[serde(default)]
	pub base_max_participants: Option<Option<u32>>,
	#[serde(default)]
	pub base_city: Option<Option<String>>,
}

/// Input for creating a yearly edition.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEdition {
	pub competition_id: CompetitionId,
	/// Defaults to `<competition-slug>-<year>` when absent.
	#[serde(default)]
	pub slug: Option<String>,
	pub year: i32,
	#[serde(default)]
	pub status: EditionStatus,
	#[serde(default)]
	pub registration_status: RegistrationStatus,
	#[serde(default)]
	pub start_date: Option<NaiveDate>,
	#[serde(default)]
	pub distance_km: Option<f64>,
	#[serde(default)]
	pub elevation_m: Option<f64>,
	#[serde(default)]
	pub max_participants: Option<u32>,
	#[serde(default)]
	pub city: Option<String>,
}

/// Partial edition update. Clearing an override (`Some(None)`) reverts the
/// field to inheriting the competition's base value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditionUpdate {
	#[serde(default)]
	pub status: Option<EditionStatus>,
	#[serde(default)]
	pub registration_status: Option<RegistrationStatus>,
	#[serde(default)]
	pub start_date: Option<Option<NaiveDate>>,
	#[serde(default)]
	pub distance_km: Option<Option<f64>>,
	#[serde(default)]
	pub elevation_m: Option<Option<f64>>,
	#[serde(default)]
	pub max_participants: Option<Option<u32>>,
	#[serde(default)]
	pub city: Option<Option<String>>,
}

fn validate_distance(value: Option<f64>) -> Result<(), CatalogError> {
	match value {
		Some(v) if !v.is_finite() || v <= 0.0 => Err(CatalogError::InvalidField {
			field: "distance_km",
			reason: "must be a positive number of kilometers",
		}),
		_ => Ok(()),
	}
}

fn validate_elevation(value: Option<f64>) -> Result<(), CatalogError> {
	match value {
		// Zero is a legitimate elevation (flat race); negatives are not.
		Some(v) if !v.is_finite() || v < 0.0 => Err(CatalogError::InvalidField {
			field: "elevation_m",
			reason: "must be zero or a positive number of meters",
		}),
		_ => Ok(()),
	}
}

fn validate_max_participants(value: Option<u32>) -> Result<(), CatalogError> {
	match value {
		Some(0) => Err(CatalogError::InvalidField {
			field: "max_participants",
			reason: "a participant cap must be positive; omit it to inherit",
		}),
		_ => Ok(()),
	}
}

fn validate_year(year: i32) -> Result<(), CatalogError> {
	if (1000..=9999).contains(&year) {
		Ok(())
	} else {
		Err(CatalogError::InvalidYear(year))
	}
}

/// CRUD service for competitions and editions.
///
/// Mutations are gated through the [`crate::managers`] policy; every edition
/// read goes through [`resolve`], so callers only ever see a
/// [`ResolvedEdition`] and never re-implement the inheritance rule.
pub struct Catalog {
	store: Arc<dyn CatalogStore>,
	settings: Settings,
}

impl Catalog {
	pub fn new(store: Arc<dyn CatalogStore>, settings: Settings) -> Self {
		Self { store, settings }
	}

	/// Readiness of the backing store, for the host's health endpoint.
	pub async fn ping(&self) -> Result<(), CatalogError> {
		Ok(self.store.ping().await?)
	}

	fn validate_slug(&self, slug: &str) -> Result<(), CatalogError> {
		if is_valid_slug(slug, self.settings.slug_max_len as usize) {
			Ok(())
		} else {
			Err(CatalogError::InvalidSlug(slug.to_string()))
		}
	}

	fn window(&self, page: Page) -> (usize, usize) {
		let limit = page
			.limit
			.unwrap_or(self.settings.default_page_size as usize)
			.min(self.settings.max_page_size as usize);
		(page.offset, limit)
	}

	async fn authorize_competition_edit(
		&self,
		actor: &Actor,
		competition: &Competition,
	) -> Result<(), CatalogError> {
		let grants = self
			.store
			.grants_for_competition(competition.id)
			.await?;
		if can_edit_competition(actor, competition, &grants) {
			Ok(())
		} else {
			Err(CatalogError::Forbidden(
				"competition edits require the organizer, an editor grant or an admin",
			))
		}
	}

	async fn authorize_edition_management(
		&self,
		actor: &Actor,
		competition: &Competition,
	) -> Result<(), CatalogError> {
		let grants = self
			.store
			.grants_for_competition(competition.id)
			.await?;
		if can_manage_editions(actor, competition, &grants) {
			Ok(())
		} else {
			Err(CatalogError::Forbidden(
				"edition changes require the organizer, a manager grant or an admin",
			))
		}
	}

	/// Create a competition owned by the actor. Runners cannot create
	/// competitions; the back office upgrades their account first.
	pub async fn create_competition(
		&self,
		actor: &Actor,
		new: NewCompetition,
	) -> Result<Competition, CatalogError> {
		if matches!(actor.role, crate::managers::AccountRole::Runner) {
			return Err(CatalogError::Forbidden(
				"only organizer or admin accounts can create competitions",
			));
		}
		self.validate_slug(&new.slug)?;
		validate_distance(new.base_distance_km)?;
		validate_elevation(new.base_elevation_m)?;
		validate_max_participants(new.base_max_participants)?;

		let now = Utc::now();
		let competition = Competition {
			id: 0,
			slug: new.slug,
			name: new.name,
			organizer_id: actor.user_id,
			website: new.website,
			base_distance_km: new.base_distance_km,
			base_elevation_m: new.base_elevation_m,
			base_max_participants: new.base_max_participants,
			base_city: new.base_city,
			created_at: now,
			updated_at: now,
		};
		let competition = self.store.insert_competition(competition).await?;
		info!(
			"created competition {} (slug={}, organizer={})",
			competition.id, competition.slug, competition.organizer_id
		);
		Ok(competition)
	}

	/// Apply a partial update to a competition.
	pub async fn update_competition(
		&self,
		actor: &Actor,
		id: CompetitionId,
		update: CompetitionUpdate,
	) -> Result<Competition, CatalogError> {
		let mut competition = self
			.store
			.competition(id)
			.await?
			.ok_or(CatalogError::CompetitionNotFound)?;
		self.authorize_competition_edit(actor, &competition).await?;

		if let Some(name) = update.name {
			competition.name = name;
		}
		if let Some(website) = update.website {
			competition.website = website;
		}
		if let Some(distance) = update.base_distance_km {
			validate_distance(distance)?;
			competition.base_distance_km = distance;
		}
		if let Some(elevation) = update.base_elevation_m {
			validate_elevation(elevation)?;
			competition.base_elevation_m = elevation;
		}
		if let Some(cap) = update.base_max_participants {
			validate_max_participants(cap)?;
			competition.base_max_participants = cap;
		}
		if let Some(city) = update.base_city {
			competition.base_city = city;
		}
		competition.updated_at = Utc::now();

		let competition = self.store.update_competition(competition).await?;
		info!("updated competition {} (by user {})", id, actor.user_id);
		Ok(competition)
	}

	/// Delete a competition and everything hanging off it. Owner/admin only;
	/// delegated managers cannot destroy the competition they manage.
	pub async fn delete_competition(
		&self,
		actor: &Actor,
		id: CompetitionId,
	) -> Result<(), CatalogError> {
		let competition = self
			.store
			.competition(id)
			.await?
			.ok_or(CatalogError::CompetitionNotFound)?;
		if !actor.is_admin() && competition.organizer_id != actor.user_id {
			return Err(CatalogError::Forbidden(
				"only the organizer or an admin can delete a competition",
			));
		}
		self.store.delete_competition(id).await?;
		info!("deleted competition {} (by user {})", id, actor.user_id);
		Ok(())
	}

	pub async fn competition(&self, id: CompetitionId) -> Result<Competition, CatalogError> {
		self.store
			.competition(id)
			.await?
			.ok_or(CatalogError::CompetitionNotFound)
	}

	pub async fn competition_by_slug(&self, slug: &str) -> Result<Competition, CatalogError> {
		self.store
			.competition_by_slug(slug)
			.await?
			.ok_or(CatalogError::CompetitionNotFound)
	}

	pub async fn list_competitions(&self, page: Page) -> Result<Vec<Competition>, CatalogError> {
		let (offset, limit) = self.window(page);
		Ok(self.store.list_competitions(offset, limit).await?)
	}

	/// Create a yearly edition on a competition.
	pub async fn create_edition(
		&self,
		actor: &Actor,
		new: NewEdition,
	) -> Result<ResolvedEdition, CatalogError> {
		let competition = self
			.store
			.competition(new.competition_id)
			.await?
			.ok_or(CatalogError::CompetitionNotFound)?;
		self.authorize_edition_management(actor, &competition).await?;

		validate_year(new.year)?;
		validate_distance(new.distance_km)?;
		validate_elevation(new.elevation_m)?;
		validate_max_participants(new.max_participants)?;

		let slug = new
			.slug
			.unwrap_or_else(|| format!("{}-{}", competition.slug, new.year));
		self.validate_slug(&slug)?;

		let now = Utc::now();
		let edition = Edition {
			id: 0,
			competition_id: competition.id,
			slug,
			year: new.year,
			status: new.status,
			registration_status: new.registration_status,
			start_date: new.start_date,
			distance_km: new.distance_km,
			elevation_m: new.elevation_m,
			max_participants: new.max_participants,
			city: new.city,
			created_at: now,
			updated_at: now,
		};
		let edition = self.store.insert_edition(edition).await?;
		info!(
			"created edition {} ({} {}, by user {})",
			edition.id, competition.slug, edition.year, actor.user_id
		);
		Ok(resolve(&edition, &competition))
	}

	/// Apply a partial update to an edition.
	pub async fn update_edition(
		&self,
		actor: &Actor,
		id: EditionId,
		update: EditionUpdate,
	) -> Result<ResolvedEdition, CatalogError> {
		let mut edition = self
			.store
			.edition(id)
			.await?
			.ok_or(CatalogError::EditionNotFound)?;
		let competition = self
			.store
			.competition(edition.competition_id)
			.await?
			.ok_or(CatalogError::CompetitionNotFound)?;
		self.authorize_edition_management(actor, &competition).await?;

		if let Some(status) = update.status {
			edition.status = status;
		}
		if let Some(registration_status) = update.registration_status {
			edition.registration_status = registration_status;
		}
		if let Some(start_date) = update.start_date {
			edition.start_date = start_date;
		}
		if let Some(distance) = update.distance_km {
			validate_distance(distance)?;
			edition.distance_km = distance;
		}
		if let Some(elevation) = update.elevation_m {
			validate_elevation(elevation)?;
			edition.elevation_m = elevation;
		}
		if let Some(cap) = update.max_participants {
			validate_max_participants(cap)?;
			edition.max_participants = cap;
		}
		if let Some(city) = update.city {
			edition.city = city;
		}
		edition.updated_at = Utc::now();

		let edition = self.store.update_edition(edition).await?;
		info!("updated edition {} (by user {})", id, actor.user_id);
		Ok(resolve(&edition, &competition))
	}

	pub async fn delete_edition(&self, actor: &Actor, id: EditionId) -> Result<(), CatalogError> {
		let edition = self
			.store
			.edition(id)
			.await?
			.ok_or(CatalogError::EditionNotFound)?;
		let competition = self
			.store
			.competition(edition.competition_id)
			.await?
			.ok_or(CatalogError::CompetitionNotFound)?;
		self.authorize_edition_management(actor, &competition).await?;

		self.store.delete_edition(id).await?;
		info!("deleted edition {} (by user {})", id, actor.user_id);
		Ok(())
	}

	/// An edition with its effective values, recomputed on every read.
	pub async fn resolved_edition(&self, id: EditionId) -> Result<ResolvedEdition, CatalogError> {
		let edition = self
			.store
			.edition(id)
			.await?
			.ok_or(CatalogError::EditionNotFound)?;
		let competition = self
			.store
			.competition(edition.competition_id)
			.await?
			.ok_or(CatalogError::CompetitionNotFound)?;
		Ok(resolve(&edition, &competition))
	}

	pub async fn resolved_edition_by_year(
		&self,
		competition_id: CompetitionId,
		year: i32,
	) -> Result<ResolvedEdition, CatalogError> {
		let competition = self
			.store
			.competition(competition_id)
			.await?
			.ok_or(CatalogError::CompetitionNotFound)?;
		let edition = self
			.store
			.edition_by_year(competition_id, year)
			.await?
			.ok_or(CatalogError::EditionNotFound)?;
		Ok(resolve(&edition, &competition))
	}

	/// All editions of a competition, newest year first, each resolved.
	pub async fn list_resolved_editions(
		&self,
		competition_id: CompetitionId,
	) -> Result<Vec<ResolvedEdition>, CatalogError> {
		let competition = self
			.store
			.competition(competition_id)
			.await?
			.ok_or(CatalogError::CompetitionNotFound)?;
		let editions = self.store.editions_for_competition(competition_id).await?;
		Ok(editions
			.iter()
			.map(|edition| resolve(edition, &competition))
			.collect())
	}
}

#[cfg(feature = "unit-tests")]
mod tests {
	use super::*;
	use crate::managers::AccountRole;
	use crate::store::MemoryStore;

	fn catalog() -> Catalog {
		Catalog::new(Arc::new(MemoryStore::new()), Settings::default())
	}

	fn organizer() -> Actor {
		Actor::new(1, AccountRole::Organizer)
	}

	fn new_competition(slug: &str) -> NewCompetition {
		NewCompetition {
			slug: slug.to_string(),
			name: "Test Trail".to_string(),
			website: None,
			base_distance_km: Some(42.0),
			base_elevation_m: Some(2000.0),
			base_max_participants: Some(300),
			base_city: Some("Chamonix".to_string()),
		}
	}

	fn new_edition(competition_id: CompetitionId, year: i32) -> NewEdition {
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

	#[tokio::test]
	async fn test_create_and_resolve_edition() {
		let catalog = catalog();
		let actor = organizer();
		let competition = catalog
			.create_competition(&actor, new_competition("test-trail"))
			.await
			.unwrap();

		let mut new = new_edition(competition.id, 2025);
		new.elevation_m = Some(1800.0);
		let resolved = catalog.create_edition(&actor, new).await.unwrap();

		assert_eq!(resolved.edition.slug, "test-trail-2025");
		assert_eq!(resolved.resolved_distance_km, Some(42.0));
		assert_eq!(resolved.resolved_elevation_m, Some(1800.0));
		assert_eq!(resolved.resolved_city.as_deref(), Some("Chamonix"));
	}

	#[tokio::test]
	async fn test_runner_cannot_create_competition() {
		let catalog = catalog();
		let runner = Actor::new(9, AccountRole::Runner);
		let err = catalog
			.create_competition(&runner, new_competition("nope"))
			.await
			.unwrap_err();
		assert!(matches!(err, CatalogError::Forbidden(_)));
	}

	#[tokio::test]
	async fn test_rejects_bad_slug_year_and_values() {
		let catalog = catalog();
		let actor = organizer();

		let mut bad_slug = new_competition("Bad Slug");
		bad_slug.base_distance_km = None;
		assert!(matches!(
			catalog.create_competition(&actor, bad_slug).await,
			Err(CatalogError::InvalidSlug(_))
		));

		let mut negative = new_competition("neg-trail");
		negative.base_elevation_m = Some(-10.0);
		assert!(matches!(
			catalog.create_competition(&actor, negative).await,
			Err(CatalogError::InvalidField { field: "elevation_m", .. })
		));

		let mut zero_cap = new_competition("zero-cap");
		zero_cap.base_max_participants = Some(0);
		assert!(matches!(
			catalog.create_competition(&actor, zero_cap).await,
			Err(CatalogError::InvalidField { field: "max_participants", .. })
		));

		let competition = catalog
			.create_competition(&actor, new_competition("ok-trail"))
			.await
			.unwrap();
		assert!(matches!(
			catalog.create_edition(&actor, new_edition(competition.id, 25)).await,
			Err(CatalogError::InvalidYear(25))
		));
	}

	#[tokio::test]
	async fn test_duplicate_year_is_rejected() {
		let catalog = catalog();
		let actor = organizer();
		let competition = catalog
			.create_competition(&actor, new_competition("dup-trail"))
			.await
			.unwrap();

		catalog
			.create_edition(&actor, new_edition(competition.id, 2025))
			.await
			.unwrap();
		let mut second = new_edition(competition.id, 2025);
		second.slug = Some("dup-trail-2025-bis".to_string());
		assert!(matches!(
			catalog.create_edition(&actor, second).await,
			Err(CatalogError::DuplicateYear { year: 2025 })
		));
	}

	#[tokio::test]
	async fn test_clearing_override_reverts_to_inheritance() {
		let catalog = catalog();
		let actor = organizer();
		let competition = catalog
			.create_competition(&actor, new_competition("revert-trail"))
			.await
			.unwrap();

		let mut new = new_edition(competition.id, 2025);
		new.distance_km = Some(55.0);
		let created = catalog.create_edition(&actor, new).await.unwrap();
		assert_eq!(created.resolved_distance_km, Some(55.0));

		let update = EditionUpdate {
			distance_km: Some(None),
			..EditionUpdate::default()
		};
		let updated = catalog
			.update_edition(&actor, created.edition.id, update)
			.await
			.unwrap();
		assert_eq!(updated.edition.distance_km, None);
		assert_eq!(updated.resolved_distance_km, Some(42.0));
	}

	#[tokio::test]
	async fn test_stranger_cannot_touch_editions() {
		let catalog = catalog();
		let actor = organizer();
		let competition = catalog
			.create_competition(&actor, new_competition("gated-trail"))
			.await
			.unwrap();
		let created = catalog
			.create_edition(&actor, new_edition(competition.id, 2025))
			.await
			.unwrap();

		let stranger = Actor::new(77, AccountRole::Organizer);
		assert!(matches!(
			catalog
				.update_edition(&stranger, created.edition.id, EditionUpdate::default())
				.await,
			Err(CatalogError::Forbidden(_))
		));
		assert!(matches!(
			catalog.delete_edition(&stranger, created.edition.id).await,
			Err(CatalogError::Forbidden(_))
		));
	}

	#[tokio::test]
	async fn test_base_update_changes_inherited_values_on_next_read() {
		let catalog = catalog();
		let actor = organizer();
		let competition = catalog
			.create_competition(&actor, new_competition("live-trail"))
			.await
			.unwrap();
		let created = catalog
			.create_edition(&actor, new_edition(competition.id, 2025))
			.await
			.unwrap();
		assert_eq!(created.resolved_distance_km, Some(42.0));

		// Resolution is recomputed per read: a base change shows up
		// immediately on editions that inherit the field.
		let update = CompetitionUpdate {
			base_distance_km: Some(Some(45.0)),
			..CompetitionUpdate::default()
		};
		catalog
			.update_competition(&actor, competition.id, update)
			.await
			.unwrap();

		let reread = catalog.resolved_edition(created.edition.id).await.unwrap();
		assert_eq!(reread.resolved_distance_km, Some(45.0));
	}
}
