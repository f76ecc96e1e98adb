use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::favorites::{CompetitionFollow, FollowStatus};
use crate::managers::ManagerGrant;
use crate::model::{Competition, CompetitionId, Edition, EditionId, UserId};
use crate::store::{CatalogStore, StoreError, StoreResult};

/// In-memory [`CatalogStore`] used by tests and local development.
///
/// Uniqueness checks and cascading deletes run under a single write lock, so
/// concurrent callers cannot observe a half-applied mutation.
pub struct MemoryStore {
	inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
	next_competition_id: CompetitionId,
	next_edition_id: EditionId,
	competitions: HashMap<CompetitionId, Competition>,
	editions: HashMap<EditionId, Edition>,
	follows: HashMap<(UserId, CompetitionId), CompetitionFollow>,
	grants: HashMap<(CompetitionId, UserId), ManagerGrant>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self {
			inner: RwLock::new(Inner::default()),
		}
	}
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

impl Inner {
	fn competition_slug_taken(&self, slug: &str, except: CompetitionId) -> bool {
		self.competitions
			.values()
			.any(|c| c.slug == slug && c.id != except)
	}

	fn edition_slug_taken(&self, slug: &str, except: EditionId) -> bool {
		self.editions
			.values()
			.any(|e| e.slug == slug && e.id != except)
	}

	fn edition_year_taken(
		&self,
		competition_id: CompetitionId,
		year: i32,
		except: EditionId,
	) -> bool {
		self.editions
			.values()
			.any(|e| e.competition_id == competition_id && e.year == year && e.id != except)
	}
}

#[async_trait]
impl CatalogStore for MemoryStore {
	async fn ping(&self) -> StoreResult<()> {
		let _ = self.inner.read().await;
		Ok(())
	}

	async fn insert_competition(&self, mut competition: Competition) -> StoreResult<Competition> {
		let mut inner = self.inner.write().await;
		if inner.competition_slug_taken(&competition.slug, 0) {
			return Err(StoreError::DuplicateSlug(competition.slug));
		}
		inner.next_competition_id += 1;
		competition.id = inner.next_competition_id;
		inner.competitions.insert(competition.id, competition.clone());
		Ok(competition)
	}

	async fn competition(&self, id: CompetitionId) -> StoreResult<Option<Competition>> {
		Ok(self.inner.read().await.competitions.get(&id).cloned())
	}

	async fn competition_by_slug(&self, slug: &str) -> StoreResult<Option<Competition>> {
		Ok(self
			.inner
			.read()
			.await
			.competitions
			.values()
			.find(|c| c.slug == slug)
			.cloned())
	}

	async fn update_competition(&self, competition: Competition) -> StoreResult<Competition> {
		let mut inner = self.inner.write().await;
		if !inner.competitions.contains_key(&competition.id) {
			return Err(StoreError::CompetitionNotFound);
		}
		if inner.competition_slug_taken(&competition.slug, competition.id) {
			return Err(StoreError::DuplicateSlug(competition.slug));
		}
		inner.competitions.insert(competition.id, competition.clone());
		Ok(competition)
	}

	async fn delete_competition(&self, id: CompetitionId) -> StoreResult<()> {
		let mut inner = self.inner.write().await;
		if inner.competitions.remove(&id).is_none() {
			return Err(StoreError::CompetitionNotFound);
		}
		inner.editions.retain(|_, e| e.competition_id != id);
		inner.follows.retain(|_, f| f.competition_id != id);
		inner.grants.retain(|_, g| g.competition_id != id);
		Ok(())
	}

	async fn list_competitions(
		&self,
		offset: usize,
		limit: usize,
	) -> StoreResult<Vec<Competition>> {
		let inner = self.inner.read().await;
		let mut all: Vec<Competition> = inner.competitions.values().cloned().collect();
		all.sort_by_key(|c| c.id);
		Ok(all.into_iter().skip(offset).take(limit).collect())
	}

	async fn insert_edition(&self, mut edition: Edition) -> StoreResult<Edition> {
		let mut inner = self.inner.write().await;
		if !inner.competitions.contains_key(&edition.competition_id) {
			return Err(StoreError::CompetitionNotFound);
		}
		if inner.edition_year_taken(edition.competition_id, edition.year, 0) {
			return Err(StoreError::DuplicateYear {
				competition_id: edition.competition_id,
				year: edition.year,
			});
		}
		if inner.edition_slug_taken(&edition.slug, 0) {
			return Err(StoreError::DuplicateSlug(edition.slug));
		}
		inner.next_edition_id += 1;
		edition.id = inner.next_edition_id;
		inner.editions.insert(edition.id, edition.clone());
		Ok(edition)
	}

	async fn edition(&self, id: EditionId) -> StoreResult<Option<Edition>> {
		Ok(self.inner.read().await.editions.get(&id).cloned())
	}

	async fn edition_by_year(
		&self,
		competition_id: CompetitionId,
		year: i32,
	) -> StoreResult<Option<Edition>> {
		Ok(self
			.inner
			.read()
			.await
			.editions
			.values()
			.find(|e| e.competition_id == competition_id && e.year == year)
			.cloned())
	}

	async fn update_edition(&self, edition: Edition) -> StoreResult<Edition> {
		let mut inner = self.inner.write().await;
		if !inner.editions.contains_key(&edition.id) {
			return Err(StoreError::EditionNotFound);
		}
		if inner.edition_year_taken(edition.competition_id, edition.year, edition.id) {
			return Err(StoreError::DuplicateYear {
				competition_id: edition.competition_id,
				year: edition.year,
			});
		}
		if inner.edition_slug_taken(&edition.slug, edition.id) {
			return Err(StoreError::DuplicateSlug(edition.slug));
		}
		inner.editions.insert(edition.id, edition.clone());
		Ok(edition)
	}

	async fn delete_edition(&self, id: EditionId) -> StoreResult<()> {
		let mut inner = self.inner.write().await;
		if inner.editions.remove(&id).is_none() {
			return Err(StoreError::EditionNotFound);
		}
		Ok(())
	}

	async fn editions_for_competition(
		&self,
		competition_id: CompetitionId,
	) -> StoreResult<Vec<Edition>> {
		let inner = self.inner.read().await;
		let mut editions: Vec<Edition> = inner
			.editions
			.values()
			.filter(|e| e.competition_id == competition_id)
			.cloned()
			.collect();
		editions.sort_by(|a, b| b.year.cmp(&a.year));
		Ok(editions)
	}

	async fn upsert_follow(&self, follow: CompetitionFollow) -> StoreResult<CompetitionFollow> {
		let mut inner = self.inner.write().await;
		if !inner.competitions.contains_key(&follow.competition_id) {
			return Err(StoreError::CompetitionNotFound);
		}
		inner
			.follows
			.insert((follow.user_id, follow.competition_id), follow.clone());
		Ok(follow)
	}

	async fn delete_follow(
		&self,
		user_id: UserId,
		competition_id: CompetitionId,
	) -> StoreResult<()> {
		let mut inner = self.inner.write().await;
		if inner.follows.remove(&(user_id, competition_id)).is_none() {
			return Err(StoreError::FollowNotFound);
		}
		Ok(())
	}

	async fn follow(
		&self,
		user_id: UserId,
		competition_id: CompetitionId,
	) -> StoreResult<Option<CompetitionFollow>> {
		Ok(self
			.inner
			.read()
			.await
			.follows
			.get(&(user_id, competition_id))
			.cloned())
	}

	async fn follows_for_user(
		&self,
		user_id: UserId,
		offset: usize,
		limit: usize,
	) -> StoreResult<Vec<CompetitionFollow>> {
		let inner = self.inner.read().await;
		let mut follows: Vec<CompetitionFollow> = inner
			.follows
			.values()
			.filter(|f| f.user_id == user_id)
			.cloned()
			.collect();
		// Newest first; competition id as a deterministic tie-break.
		follows.sort_by(|a, b| {
			b.updated_at
				.cmp(&a.updated_at)
				.then(a.competition_id.cmp(&b.competition_id))
		});
		Ok(follows.into_iter().skip(offset).take(limit).collect())
	}

	async fn count_follows(
		&self,
		competition_id: CompetitionId,
		status: Option<FollowStatus>,
	) -> StoreResult<u64> {
		let inner = self.inner.read().await;
		let count = inner
			.follows
			.values()
			.filter(|f| f.competition_id == competition_id)
			.filter(|f| status.map(|s| f.status == s).unwrap_or(true))
			.count();
		Ok(count as u64)
	}

	async fn upsert_grant(&self, grant: ManagerGrant) -> StoreResult<ManagerGrant> {
		let mut inner = self.inner.write().await;
		if !inner.competitions.contains_key(&grant.competition_id) {
			return Err(StoreError::CompetitionNotFound);
		}
		inner
			.grants
			.insert((grant.competition_id, grant.user_id), grant.clone());
		Ok(grant)
	}

	async fn delete_grant(
		&self,
		competition_id: CompetitionId,
		user_id: UserId,
	) -> StoreResult<()> {
		let mut inner = self.inner.write().await;
		if inner.grants.remove(&(competition_id, user_id)).is_none() {
			return Err(StoreError::GrantNotFound);
		}
		Ok(())
	}

	async fn grant(
		&self,
		competition_id: CompetitionId,
		user_id: UserId,
	) -> StoreResult<Option<ManagerGrant>> {
		Ok(self
			.inner
			.read()
			.await
			.grants
			.get(&(competition_id, user_id))
			.cloned())
	}

	async fn grants_for_competition(
		&self,
		competition_id: CompetitionId,
	) -> StoreResult<Vec<ManagerGrant>> {
		let inner = self.inner.read().await;
		let mut grants: Vec<ManagerGrant> = inner
			.grants
			.values()
			.filter(|g| g.competition_id == competition_id)
			.cloned()
			.collect();
		grants.sort_by_key(|g| g.user_id);
		Ok(grants)
	}
}

#[cfg(feature = "unit-tests")]
mod tests {
	use chrono::Utc;

	use super::*;
	use crate::model::{EditionStatus, RegistrationStatus};

	fn competition(slug: &str) -> Competition {
		let at = Utc::now();
		Competition {
			id: 0,
			slug: slug.to_string(),
			name: slug.to_string(),
			organizer_id: 1,
			website: None,
			base_distance_km: Some(21.0),
			base_elevation_m: None,
			base_max_participants: None,
			base_city: None,
			created_at: at,
			updated_at: at,
		}
	}

	fn edition(competition_id: CompetitionId, slug: &str, year: i32) -> Edition {
		let at = Utc::now();
		Edition {
			id: 0,
			competition_id,
			slug: slug.to_string(),
			year,
			status: EditionStatus::Upcoming,
			registration_status: RegistrationStatus::ComingSoon,
			start_date: None,
			distance_km: None,
			elevation_m: None,
			max_participants: None,
			city: None,
			created_at: at,
			updated_at: at,
		}
	}

	#[tokio::test]
	async fn test_insert_assigns_sequential_ids() {
		let store = MemoryStore::new();
		let a = store.insert_competition(competition("a")).await.unwrap();
		let b = store.insert_competition(competition("b")).await.unwrap();
		assert_eq!(a.id, 1);
		assert_eq!(b.id, 2);
	}

	#[tokio::test]
	async fn test_competition_slug_is_unique() {
		let store = MemoryStore::new();
		store.insert_competition(competition("dup")).await.unwrap();
		let err = store
			.insert_competition(competition("dup"))
			.await
			.unwrap_err();
		assert!(matches!(err, StoreError::DuplicateSlug(_)));
	}

	#[tokio::test]
	async fn test_one_edition_per_competition_and_year() {
		let store = MemoryStore::new();
		let c = store.insert_competition(competition("c")).await.unwrap();
		store
			.insert_edition(edition(c.id, "c-2025", 2025))
			.await
			.unwrap();

		let err = store
			.insert_edition(edition(c.id, "c-2025-bis", 2025))
			.await
			.unwrap_err();
		assert!(matches!(err, StoreError::DuplicateYear { year: 2025, .. }));

		// Same year on another competition is fine.
		let other = store.insert_competition(competition("other")).await.unwrap();
		store
			.insert_edition(edition(other.id, "other-2025", 2025))
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn test_editions_listed_newest_year_first() {
		let store = MemoryStore::new();
		let c = store.insert_competition(competition("c")).await.unwrap();
		for year in [2023, 2025, 2024] {
			store
				.insert_edition(edition(c.id, &format!("c-{year}"), year))
				.await
				.unwrap();
		}

		let years: Vec<i32> = store
			.editions_for_competition(c.id)
			.await
			.unwrap()
			.iter()
			.map(|e| e.year)
			.collect();
		assert_eq!(years, vec![2025, 2024, 2023]);
	}

	#[tokio::test]
	async fn test_delete_competition_cascades() {
		let store = MemoryStore::new();
		let c = store.insert_competition(competition("c")).await.unwrap();
		let e = store
			.insert_edition(edition(c.id, "c-2025", 2025))
			.await
			.unwrap();
		store
			.upsert_follow(CompetitionFollow {
				user_id: 5,
				competition_id: c.id,
				status: FollowStatus::Favorite,
				updated_at: Utc::now(),
			})
			.await
			.unwrap();

		store.delete_competition(c.id).await.unwrap();

		assert!(store.edition(e.id).await.unwrap().is_none());
		assert!(store.follow(5, c.id).await.unwrap().is_none());
		assert_eq!(store.count_follows(c.id, None).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_update_edition_recheck_year_conflict() {
		let store = MemoryStore::new();
		let c = store.insert_competition(competition("c")).await.unwrap();
		store
			.insert_edition(edition(c.id, "c-2024", 2024))
			.await
			.unwrap();
		let mut e = store
			.insert_edition(edition(c.id, "c-2025", 2025))
			.await
			.unwrap();

		e.year = 2024;
		let err = store.update_edition(e).await.unwrap_err();
		assert!(matches!(err, StoreError::DuplicateYear { year: 2024, .. }));
	}
}
