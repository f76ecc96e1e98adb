use async_trait::async_trait;
use thiserror::Error;

use crate::favorites::{CompetitionFollow, FollowStatus};
use crate::managers::ManagerGrant;
use crate::model::{Competition, CompetitionId, Edition, EditionId, UserId};

pub mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("competition not found")]
	CompetitionNotFound,
	#[error("edition not found")]
	EditionNotFound,
	#[error("follow entry not found")]
	FollowNotFound,
	#[error("manager grant not found")]
	GrantNotFound,
	#[error("slug already in use: {0}")]
	DuplicateSlug(String),
	#[error("year {year} already registered for competition {competition_id}")]
	DuplicateYear {
		competition_id: CompetitionId,
		year: i32,
	},
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage abstraction for the directory so the surrounding application can
/// plug in its real database and tests can substitute the in-memory
/// implementation. Implemented by [`MemoryStore`].
///
/// Insert methods assign identities: any `id` on the way in is ignored and
/// the stored record is returned. Uniqueness (competition slug, edition
/// slug, one edition per competition and year, one follow entry per user and
/// competition, one grant per competition and user) is enforced atomically
/// by the implementation.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
	/// Lightweight readiness check.
	async fn ping(&self) -> StoreResult<()>;

	async fn insert_competition(&self, competition: Competition) -> StoreResult<Competition>;
	async fn competition(&self, id: CompetitionId) -> StoreResult<Option<Competition>>;
	async fn competition_by_slug(&self, slug: &str) -> StoreResult<Option<Competition>>;
	/// Whole-record write keyed by `competition.id`.
	async fn update_competition(&self, competition: Competition) -> StoreResult<Competition>;
	/// Deletes the competition and cascades to its editions, follow entries
	/// and manager grants.
	async fn delete_competition(&self, id: CompetitionId) -> StoreResult<()>;
	/// Competitions ordered by id, windowed by `offset`/`limit`.
	async fn list_competitions(&self, offset: usize, limit: usize)
		-> StoreResult<Vec<Competition>>;

	async fn insert_edition(&self, edition: Edition) -> StoreResult<Edition>;
	async fn edition(&self, id: EditionId) -> StoreResult<Option<Edition>>;
	async fn edition_by_year(
		&self,
		competition_id: CompetitionId,
		year: i32,
	) -> StoreResult<Option<Edition>>;
	/// Whole-record write keyed by `edition.id`; re-checks year and slug
	/// uniqueness when those change.
	async fn update_edition(&self, edition: Edition) -> StoreResult<Edition>;
	async fn delete_edition(&self, id: EditionId) -> StoreResult<()>;
	/// All editions of a competition, newest year first.
	async fn editions_for_competition(
		&self,
		competition_id: CompetitionId,
	) -> StoreResult<Vec<Edition>>;

	async fn upsert_follow(&self, follow: CompetitionFollow) -> StoreResult<CompetitionFollow>;
	async fn delete_follow(
		&self,
		user_id: UserId,
		competition_id: CompetitionId,
	) -> StoreResult<()>;
	async fn follow(
		&self,
		user_id: UserId,
		competition_id: CompetitionId,
	) -> StoreResult<Option<CompetitionFollow>>;
	/// A user's follow entries, most recently updated first.
	async fn follows_for_user(
		&self,
		user_id: UserId,
		offset: usize,
		limit: usize,
	) -> StoreResult<Vec<CompetitionFollow>>;
	async fn count_follows(
		&self,
		competition_id: CompetitionId,
		status: Option<FollowStatus>,
	) -> StoreResult<u64>;

	async fn upsert_grant(&self, grant: ManagerGrant) -> StoreResult<ManagerGrant>;
	async fn delete_grant(
		&self,
		competition_id: CompetitionId,
		user_id: UserId,
	) -> StoreResult<()>;
	async fn grant(
		&self,
		competition_id: CompetitionId,
		user_id: UserId,
	) -> StoreResult<Option<ManagerGrant>>;
	async fn grants_for_competition(
		&self,
		competition_id: CompetitionId,
	) -> StoreResult<Vec<ManagerGrant>>;
}
