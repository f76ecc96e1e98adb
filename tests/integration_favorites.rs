mod common;

use wwtrail::favorites::{FavoritesError, FollowStatus};

#[cfg(feature = "integration-tests")]
mod integration_tests {
	use super::*;
	use crate::common::{admin, chamonix_competition, directory, organizer, runner};

	/// A runner tracks a competition through the statuses a profile page
	/// walks: interested, then registered, then completed.
	#[tokio::test]
	async fn test_follow_lifecycle() {
		let (catalog, favorites, _managers) = directory();
		let owner = organizer(1);
		let fan = runner(7);

		let competition = catalog
			.create_competition(&owner, chamonix_competition("utmb"))
			.await
			.unwrap();

		favorites
			.set_status(&fan, competition.id, FollowStatus::Interested)
			.await
			.unwrap();
		favorites
			.set_status(&fan, competition.id, FollowStatus::Registered)
			.await
			.unwrap();

		// One entry per user and competition: the status is replaced.
		assert_eq!(
			favorites.status_of(fan.user_id, competition.id).await.unwrap(),
			Some(FollowStatus::Registered)
		);
		let entries = favorites
			.list_for_user(fan.user_id, 0, None)
			.await
			.unwrap();
		assert_eq!(entries.len(), 1);

		favorites
			.set_status(&fan, competition.id, FollowStatus::Completed)
			.await
			.unwrap();
		favorites
			.clear(&fan, fan.user_id, competition.id)
			.await
			.unwrap();
		assert_eq!(
			favorites.status_of(fan.user_id, competition.id).await.unwrap(),
			None
		);
	}

	/// Card counts: favorites are counted per competition and by status.
	#[tokio::test]
	async fn test_counts_per_competition_and_status() {
		let (catalog, favorites, _managers) = directory();
		let owner = organizer(1);
		let competition = catalog
			.create_competition(&owner, chamonix_competition("zegama"))
			.await
			.unwrap();

		for user_id in 10..15 {
			favorites
				.set_status(&runner(user_id), competition.id, FollowStatus::Favorite)
				.await
				.unwrap();
		}
		favorites
			.set_status(&runner(20), competition.id, FollowStatus::Registered)
			.await
			.unwrap();

		assert_eq!(
			favorites.count_for_competition(competition.id, None).await.unwrap(),
			6
		);
		assert_eq!(
			favorites
				.count_for_competition(competition.id, Some(FollowStatus::Favorite))
				.await
				.unwrap(),
			5
		);
	}

	/// Users cannot clear each other's entries; admins can.
	#[tokio::test]
	async fn test_clear_is_owner_or_admin_only() {
		let (catalog, favorites, _managers) = directory();
		let owner = organizer(1);
		let fan = runner(7);
		let other = runner(8);

		let competition = catalog
			.create_competition(&owner, chamonix_competition("diagonale"))
			.await
			.unwrap();
		favorites
			.set_status(&fan, competition.id, FollowStatus::Favorite)
			.await
			.unwrap();

		assert!(matches!(
			favorites.clear(&other, fan.user_id, competition.id).await,
			Err(FavoritesError::Forbidden(_))
		));
		favorites
			.clear(&admin(100), fan.user_id, competition.id)
			.await
			.unwrap();
	}

	/// Tracking an unknown competition is rejected up front.
	#[tokio::test]
	async fn test_unknown_competition_is_rejected() {
		let (_catalog, favorites, _managers) = directory();
		let fan = runner(7);

		assert!(matches!(
			favorites.set_status(&fan, 999, FollowStatus::Favorite).await,
			Err(FavoritesError::CompetitionNotFound)
		));
	}
}
