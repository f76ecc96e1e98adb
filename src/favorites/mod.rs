use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Settings;
use crate::managers::Actor;
use crate::model::{CompetitionId, UserId};
use crate::store::{CatalogStore, StoreError};

/// A user's relationship to a competition, as shown on cards and on the
/// personal dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FollowStatus {
	Favorite,
	Interested,
	Registered,
	Completed,
}

impl FollowStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			FollowStatus::Favorite => "FAVORITE",
			FollowStatus::Interested => "INTERESTED",
			FollowStatus::Registered => "REGISTERED",
			FollowStatus::Completed => "COMPLETED",
		}
	}
}

/// One user-competition tracking entry. A user has at most one entry per
/// competition; setting a new status replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionFollow {
	pub user_id: UserId,
	pub competition_id: CompetitionId,
	pub status: FollowStatus,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum FavoritesError {
	#[error("competition not found")]
	CompetitionNotFound,
	#[error("no tracking entry for that competition")]
	NotFollowing,
	#[error("not allowed: {0}")]
	Forbidden(&'static str),
	#[error(transparent)]
	Store(StoreError),
}

impl From<StoreError> for FavoritesError {
	fn from(e: StoreError) -> Self {
		match e {
			StoreError::CompetitionNotFound => FavoritesError::CompetitionNotFound,
			StoreError::FollowNotFound => FavoritesError::NotFollowing,
			other => FavoritesError::Store(other),
		}
	}
}

/// User-competition status tracking over the shared store.
pub struct Favorites {
	store: Arc<dyn CatalogStore>,
	settings: Settings,
}

impl Favorites {
	pub fn new(store: Arc<dyn CatalogStore>, settings: Settings) -> Self {
		Self { store, settings }
	}

	/// Set (or replace) the actor's own status on a competition.
	pub async fn set_status(
		&self,
		actor: &Actor,
		competition_id: CompetitionId,
		status: FollowStatus,
	) -> Result<CompetitionFollow, FavoritesError> {
		if self.store.competition(competition_id).await?.is_none() {
			return Err(FavoritesError::CompetitionNotFound);
		}

		let entry = CompetitionFollow {
			user_id: actor.user_id,
			competition_id,
			status,
			updated_at: Utc::now(),
		};
		let entry = self.store.upsert_follow(entry).await?;
		info!(
			"user {} marked competition {} as {}",
			actor.user_id,
			competition_id,
			status.as_str()
		);
		Ok(entry)
	}

	/// Remove a tracking entry. Users clear their own; admins may clear
	/// anyone's.
	pub async fn clear(
		&self,
		actor: &Actor,
		user_id: UserId,
		competition_id: CompetitionId,
	) -> Result<(), FavoritesError> {
		if actor.user_id != user_id && !actor.is_admin() {
			return Err(FavoritesError::Forbidden(
				"tracking entries can only be cleared by their owner or an admin",
			));
		}
		self.store.delete_follow(user_id, competition_id).await?;
		Ok(())
	}

	/// The user's status on a competition, if any.
	pub async fn status_of(
		&self,
		user_id: UserId,
		competition_id: CompetitionId,
	) -> Result<Option<FollowStatus>, FavoritesError> {
		Ok(self
			.store
			.follow(user_id, competition_id)
			.await?
			.map(|f| f.status))
	}

	/// The user's tracking entries, most recently updated first.
	pub async fn list_for_user(
		&self,
		user_id: UserId,
		offset: usize,
		limit: Option<usize>,
	) -> Result<Vec<CompetitionFollow>, FavoritesError> {
		let limit = limit
			.unwrap_or(self.settings.default_page_size as usize)
			.min(self.settings.max_page_size as usize);
		Ok(self.store.follows_for_user(user_id, offset, limit).await?)
	}

	/// How many users track a competition, optionally filtered by status
	/// (e.g. the favorite count on a competition card).
	pub async fn count_for_competition(
		&self,
		competition_id: CompetitionId,
		status: Option<FollowStatus>,
	) -> Result<u64, FavoritesError> {
		if self.store.competition(competition_id).await?.is_none() {
			return Err(FavoritesError::CompetitionNotFound);
		}
		Ok(self.store.count_follows(competition_id, status).await?)
	}
}
