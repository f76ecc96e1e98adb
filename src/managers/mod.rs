use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Competition, CompetitionId, UserId};
use crate::store::{CatalogStore, StoreError};

/// Account-level role, assigned by the surrounding auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRole {
	Admin,
	Organizer,
	Runner,
}

/// The identity performing an operation.
///
/// Passed explicitly into every gated call; there is no ambient current-user
/// state anywhere in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
	pub user_id: UserId,
	pub role: AccountRole,
}

impl Actor {
	pub fn new(user_id: UserId, role: AccountRole) -> Self {
		Self { user_id, role }
	}

	pub fn is_admin(&self) -> bool {
		self.role == AccountRole::Admin
	}
}

/// What a delegated manager may do on a competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManagerRole {
	/// May edit the competition itself and manage its editions.
	Editor,
	/// May manage editions only.
	Delegate,
}

/// A delegation from a competition owner to another user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerGrant {
	pub competition_id: CompetitionId,
	pub user_id: UserId,
	pub role: ManagerRole,
	pub granted_by: UserId,
	pub granted_at: DateTime<Utc>,
}

fn grant_for<'a>(
	grants: &'a [ManagerGrant],
	competition: &Competition,
	actor: &Actor,
) -> Option<&'a ManagerGrant> {
	grants
		.iter()
		.find(|g| g.competition_id == competition.id && g.user_id == actor.user_id)
}

/// May the actor edit the competition record (name, website, base fields)?
pub fn can_edit_competition(
	actor: &Actor,
	competition: &Competition,
	grants: &[ManagerGrant],
) -> bool {
	actor.is_admin()
		|| competition.organizer_id == actor.user_id
		|| grant_for(grants, competition, actor)
			.map(|g| g.role == ManagerRole::Editor)
			.unwrap_or(false)
}

/// May the actor create, edit or delete editions of the competition?
pub fn can_manage_editions(
	actor: &Actor,
	competition: &Competition,
	grants: &[ManagerGrant],
) -> bool {
	actor.is_admin()
		|| competition.organizer_id == actor.user_id
		|| grant_for(grants, competition, actor).is_some()
}

/// May the actor grant or revoke manager delegations? Owner and admin only;
/// delegation is not transitive.
pub fn can_grant(actor: &Actor, competition: &Competition) -> bool {
	actor.is_admin() || competition.organizer_id == actor.user_id
}

#[derive(Debug, Error)]
pub enum ManagerError {
	#[error("competition not found")]
	CompetitionNotFound,
	#[error("not allowed: {0}")]
	Forbidden(&'static str),
	#[error("the organizer already owns the competition")]
	GrantToOwner,
	#[error("no manager grant for that user")]
	GrantNotFound,
	#[error(transparent)]
	Store(StoreError),
}

impl From<StoreError> for ManagerError {
	fn from(e: StoreError) -> Self {
		match e {
			StoreError::CompetitionNotFound => ManagerError::CompetitionNotFound,
			StoreError::GrantNotFound => ManagerError::GrantNotFound,
			other => ManagerError::Store(other),
		}
	}
}

/// Delegation service: grant, revoke and list manager roles per competition.
pub struct Managers {
	store: Arc<dyn CatalogStore>,
}

impl Managers {
	pub fn new(store: Arc<dyn CatalogStore>) -> Self {
		Self { store }
	}

	/// Grant `role` on a competition to `user_id`. Owner/admin only.
	/// Re-granting replaces the existing role.
	pub async fn grant(
		&self,
		actor: &Actor,
		competition_id: CompetitionId,
		user_id: UserId,
		role: ManagerRole,
	) -> Result<ManagerGrant, ManagerError> {
		let competition = self
			.store
			.competition(competition_id)
			.await?
			.ok_or(ManagerError::CompetitionNotFound)?;

		if !can_grant(actor, &competition) {
			return Err(ManagerError::Forbidden(
				"only the organizer or an admin can delegate managers",
			));
		}
		if user_id == competition.organizer_id {
			return Err(ManagerError::GrantToOwner);
		}

		let grant = ManagerGrant {
			competition_id,
			user_id,
			role,
			granted_by: actor.user_id,
			granted_at: Utc::now(),
		};
		let grant = self.store.upsert_grant(grant).await?;
		info!(
			"granted {:?} on competition {} to user {} (by {})",
			grant.role, competition_id, user_id, actor.user_id
		);
		Ok(grant)
	}

	/// Revoke a manager delegation. Owner/admin only.
	pub async fn revoke(
		&self,
		actor: &Actor,
		competition_id: CompetitionId,
		user_id: UserId,
	) -> Result<(), ManagerError> {
		let competition = self
			.store
			.competition(competition_id)
			.await?
			.ok_or(ManagerError::CompetitionNotFound)?;

		if !can_grant(actor, &competition) {
			return Err(ManagerError::Forbidden(
				"only the organizer or an admin can revoke managers",
			));
		}

		self.store.delete_grant(competition_id, user_id).await?;
		info!(
			"revoked manager grant on competition {} from user {} (by {})",
			competition_id, user_id, actor.user_id
		);
		Ok(())
	}

	/// All grants on a competition.
	pub async fn list_for_competition(
		&self,
		competition_id: CompetitionId,
	) -> Result<Vec<ManagerGrant>, ManagerError> {
		if self.store.competition(competition_id).await?.is_none() {
			return Err(ManagerError::CompetitionNotFound);
		}
		Ok(self.store.grants_for_competition(competition_id).await?)
	}
}

#[cfg(feature = "unit-tests")]
mod tests {
	use chrono::{TimeZone, Utc};

	use super::*;

	fn competition(organizer_id: UserId) -> Competition {
		let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
		Competition {
			id: 1,
			slug: "gran-trail".to_string(),
			name: "Gran Trail".to_string(),
			organizer_id,
			website: None,
			base_distance_km: None,
			base_elevation_m: None,
			base_max_participants: None,
			base_city: None,
			created_at: at,
			updated_at: at,
		}
	}

	fn grant(user_id: UserId, role: ManagerRole) -> ManagerGrant {
		ManagerGrant {
			competition_id: 1,
			user_id,
			role,
			granted_by: 10,
			granted_at: Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap(),
		}
	}

	#[test]
	fn test_owner_and_admin_can_do_everything() {
		let c = competition(10);
		let owner = Actor::new(10, AccountRole::Organizer);
		let admin = Actor::new(99, AccountRole::Admin);

		for actor in [&owner, &admin] {
			assert!(can_edit_competition(actor, &c, &[]));
			assert!(can_manage_editions(actor, &c, &[]));
			assert!(can_grant(actor, &c));
		}
	}

	#[test]
	fn test_editor_grant_allows_competition_edits_but_not_granting() {
		let c = competition(10);
		let editor = Actor::new(20, AccountRole::Runner);
		let grants = [grant(20, ManagerRole::Editor)];

		assert!(can_edit_competition(&editor, &c, &grants));
		assert!(can_manage_editions(&editor, &c, &grants));
		assert!(!can_grant(&editor, &c));
	}

	#[test]
	fn test_delegate_grant_is_editions_only() {
		let c = competition(10);
		let delegate = Actor::new(21, AccountRole::Organizer);
		let grants = [grant(21, ManagerRole::Delegate)];

		assert!(!can_edit_competition(&delegate, &c, &grants));
		assert!(can_manage_editions(&delegate, &c, &grants));
	}

	#[test]
	fn test_unrelated_user_has_no_access() {
		let c = competition(10);
		let stranger = Actor::new(30, AccountRole::Organizer);
		let grants = [grant(20, ManagerRole::Editor)];

		assert!(!can_edit_competition(&stranger, &c, &grants));
		assert!(!can_manage_editions(&stranger, &c, &grants));
		assert!(!can_grant(&stranger, &c));
	}

	#[test]
	fn test_grant_for_other_competition_does_not_apply() {
		let c = competition(10);
		let mut g = grant(20, ManagerRole::Editor);
		g.competition_id = 2;
		let actor = Actor::new(20, AccountRole::Runner);

		assert!(!can_manage_editions(&actor, &c, &[g]));
	}
}
