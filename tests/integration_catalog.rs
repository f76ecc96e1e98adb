mod common;

use wwtrail::catalog::{CatalogError, CompetitionUpdate, EditionUpdate, Page};
use wwtrail::managers::ManagerRole;

#[cfg(feature = "integration-tests")]
mod integration_tests {
	use super::*;
	use crate::common::{admin, bare_edition, chamonix_competition, directory, organizer, runner};

	/// Full organizer flow: create a competition, add editions over several
	/// years, read them back resolved and newest-first.
	#[tokio::test]
	async fn test_competition_lifecycle_with_inheriting_editions() {
		let (catalog, _favorites, _managers) = directory();
		let owner = organizer(1);

		let competition = catalog
			.create_competition(&owner, chamonix_competition("utmb"))
			.await
			.unwrap();

		for year in [2023, 2024, 2025] {
			catalog
				.create_edition(&owner, bare_edition(competition.id, year))
				.await
				.unwrap();
		}

		let editions = catalog.list_resolved_editions(competition.id).await.unwrap();
		let years: Vec<i32> = editions.iter().map(|e| e.edition.year).collect();
		assert_eq!(years, vec![2025, 2024, 2023]);
		for resolved in &editions {
			assert_eq!(resolved.resolved_distance_km, Some(42.0));
			assert_eq!(resolved.resolved_city.as_deref(), Some("Chamonix"));
		}

		// Slug defaulting makes each edition addressable.
		assert_eq!(editions[0].edition.slug, "utmb-2025");
		let by_slug = catalog.competition_by_slug("utmb").await.unwrap();
		assert_eq!(by_slug.id, competition.id);
		let by_year = catalog
			.resolved_edition_by_year(competition.id, 2024)
			.await
			.unwrap();
		assert_eq!(by_year.edition.slug, "utmb-2024");
	}

	/// A template edit is visible on the very next resolved read of every
	/// edition that inherits the field, while overrides are untouched.
	#[tokio::test]
	async fn test_template_edits_propagate_to_inheriting_editions_only() {
		let (catalog, _favorites, _managers) = directory();
		let owner = organizer(1);
		let competition = catalog
			.create_competition(&owner, chamonix_competition("gran-trail"))
			.await
			.unwrap();

		let inheriting = catalog
			.create_edition(&owner, bare_edition(competition.id, 2024))
			.await
			.unwrap();
		let mut overriding_draft = bare_edition(competition.id, 2025);
		overriding_draft.distance_km = Some(55.0);
		let overriding = catalog
			.create_edition(&owner, overriding_draft)
			.await
			.unwrap();

		catalog
			.update_competition(
				&owner,
				competition.id,
				CompetitionUpdate {
					base_distance_km: Some(Some(45.0)),
					..CompetitionUpdate::default()
				},
			)
			.await
			.unwrap();

		let inheriting = catalog
			.resolved_edition(inheriting.edition.id)
			.await
			.unwrap();
		let overriding = catalog
			.resolved_edition(overriding.edition.id)
			.await
			.unwrap();
		assert_eq!(inheriting.resolved_distance_km, Some(45.0));
		assert_eq!(overriding.resolved_distance_km, Some(55.0));
	}

	/// Delegation: a delegate may manage editions but not edit the
	/// competition; an editor may do both; revocation closes the door.
	#[tokio::test]
	async fn test_manager_delegation_gates_operations() {
		let (catalog, _favorites, managers) = directory();
		let owner = organizer(1);
		let helper = runner(2);

		let competition = catalog
			.create_competition(&owner, chamonix_competition("zegama-aizkorri"))
			.await
			.unwrap();

		// Before any grant the helper can touch nothing.
		assert!(matches!(
			catalog
				.create_edition(&helper, bare_edition(competition.id, 2025))
				.await,
			Err(CatalogError::Forbidden(_))
		));

		managers
			.grant(&owner, competition.id, helper.user_id, ManagerRole::Delegate)
			.await
			.unwrap();
		let created = catalog
			.create_edition(&helper, bare_edition(competition.id, 2025))
			.await
			.unwrap();
		assert!(matches!(
			catalog
				.update_competition(&helper, competition.id, CompetitionUpdate::default())
				.await,
			Err(CatalogError::Forbidden(_))
		));

		// Upgrading the grant to editor unlocks competition edits too.
		managers
			.grant(&owner, competition.id, helper.user_id, ManagerRole::Editor)
			.await
			.unwrap();
		catalog
			.update_competition(&helper, competition.id, CompetitionUpdate::default())
			.await
			.unwrap();

		// But never deletion of the competition itself.
		assert!(matches!(
			catalog.delete_competition(&helper, competition.id).await,
			Err(CatalogError::Forbidden(_))
		));

		managers
			.revoke(&owner, competition.id, helper.user_id)
			.await
			.unwrap();
		assert!(matches!(
			catalog
				.update_edition(&helper, created.edition.id, EditionUpdate::default())
				.await,
			Err(CatalogError::Forbidden(_))
		));
	}

	/// Admins bypass ownership everywhere.
	#[tokio::test]
	async fn test_admin_bypasses_ownership() {
		let (catalog, _favorites, _managers) = directory();
		let owner = organizer(1);
		let back_office = admin(100);

		let competition = catalog
			.create_competition(&owner, chamonix_competition("transvulcania"))
			.await
			.unwrap();
		catalog
			.update_competition(&back_office, competition.id, CompetitionUpdate::default())
			.await
			.unwrap();
		catalog
			.create_edition(&back_office, bare_edition(competition.id, 2025))
			.await
			.unwrap();
		catalog
			.delete_competition(&back_office, competition.id)
			.await
			.unwrap();

		assert!(matches!(
			catalog.competition(competition.id).await,
			Err(CatalogError::CompetitionNotFound)
		));
		assert!(catalog
			.list_resolved_editions(competition.id)
			.await
			.is_err());
	}

	/// Listing respects the configured page window.
	#[tokio::test]
	async fn test_competition_listing_pagination() {
		let (catalog, _favorites, _managers) = directory();
		let owner = organizer(1);

		for i in 0..5 {
			catalog
				.create_competition(&owner, chamonix_competition(&format!("race-{i}")))
				.await
				.unwrap();
		}

		let first_two = catalog
			.list_competitions(Page {
				offset: 0,
				limit: Some(2),
			})
			.await
			.unwrap();
		assert_eq!(first_two.len(), 2);

		let rest = catalog
			.list_competitions(Page {
				offset: 2,
				limit: None,
			})
			.await
			.unwrap();
		assert_eq!(rest.len(), 3);
	}
}
