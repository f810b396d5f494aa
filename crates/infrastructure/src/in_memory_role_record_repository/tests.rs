use chrono::{Duration, TimeZone, Utc};
use rolegate_application::RoleRecordRepository;
use rolegate_core::AppError;
use rolegate_domain::{AssumePermission, ProviderRole, SessionLiveness};

use super::InMemoryRoleRecordRepository;

fn provider_role(role_arn: &str, role_name: &str, max_session_duration: u32) -> ProviderRole {
    ProviderRole {
        role_name: role_name.to_owned(),
        role_arn: role_arn.to_owned(),
        create_date: Utc
            .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .single()
            .unwrap_or_default(),
        max_session_duration,
        principal: vec!["arn:aws:iam:::user/alice".to_owned()],
    }
}

#[tokio::test]
async fn upsert_and_list_roles_sorted_by_name() {
    let repository = InMemoryRoleRecordRepository::new();

    let zeta = repository
        .upsert_provider_role(provider_role("arn:aws:iam:::role/z", "zeta", 3_600))
        .await;
    assert!(zeta.is_ok());
    let alpha = repository
        .upsert_provider_role(provider_role("arn:aws:iam:::role/a", "alpha", 3_600))
        .await;
    assert!(alpha.is_ok());

    let listed = repository.list_roles().await.unwrap_or_default();
    let names: Vec<&str> = listed.iter().map(|record| record.role_name()).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
}

#[tokio::test]
async fn upsert_refreshes_provider_fields_but_keeps_tracking() {
    let repository = InMemoryRoleRecordRepository::new();
    let role_arn = "arn:aws:iam:::role/ops";
    let original = provider_role(role_arn, "ops", 3_600);
    let created_at = original.create_date;

    assert!(repository.upsert_provider_role(original).await.is_ok());
    assert!(
        repository
            .set_permission(role_arn, "arn:aws:iam:::user/alice", AssumePermission::Permit)
            .await
            .is_ok()
    );

    let mut refreshed = provider_role(role_arn, "operations", 7_200);
    refreshed.create_date = created_at + Duration::days(30);
    let updated = repository.upsert_provider_role(refreshed).await;

    let Ok(updated) = updated else {
        panic!("refresh should succeed");
    };
    assert_eq!(updated.role_name(), "operations");
    assert_eq!(updated.max_session_duration(), 7_200);
    assert_eq!(updated.create_date(), created_at);
    assert_eq!(
        updated
            .tracking()
            .permission_for("arn:aws:iam:::user/alice"),
        AssumePermission::Permit
    );
}

#[tokio::test]
async fn upsert_rejects_invalid_provider_role() {
    let repository = InMemoryRoleRecordRepository::new();

    let result = repository
        .upsert_provider_role(provider_role("arn:aws:iam:::role/empty", "  ", 3_600))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(repository.list_roles().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn reservation_consumes_permit_and_tracks_user() {
    let repository = InMemoryRoleRecordRepository::new();
    let role_arn = "arn:aws:iam:::role/ops";
    let principal = "arn:aws:iam:::user/alice";
    assert!(
        repository
            .upsert_provider_role(provider_role(role_arn, "ops", 3_600))
            .await
            .is_ok()
    );
    assert!(
        repository
            .set_permission(role_arn, principal, AssumePermission::Permit)
            .await
            .is_ok()
    );

    let issued_at = Utc
        .with_ymd_and_hms(2025, 3, 1, 8, 0, 0)
        .single()
        .unwrap_or_default();
    let session = repository
        .reserve_issuance(role_arn, principal, issued_at, 900)
        .await;
    let Ok(session) = session else {
        panic!("permitted principal should reserve");
    };

    let stored = repository.find_role(role_arn).await;
    let Ok(Some(stored)) = stored else {
        panic!("role should be stored");
    };
    assert_eq!(stored.tracking().assume_history().len(), 1);
    assert!(stored.tracking().assumed_users().contains(principal));
    let check = stored.check_issuance(principal, issued_at + Duration::seconds(60));
    assert_eq!(check.liveness, SessionLiveness::Active);
    assert!(!check.permitted);

    let second = repository
        .reserve_issuance(role_arn, principal, issued_at + Duration::seconds(60), 900)
        .await;
    assert!(matches!(second, Err(AppError::Forbidden(_))));

    assert!(repository.release_issuance(role_arn, &session).await.is_ok());
    let Ok(Some(released)) = repository.find_role(role_arn).await else {
        panic!("role should be stored");
    };
    assert!(released.tracking().assume_history().is_empty());
    assert_eq!(
        released.tracking().permission_for(principal),
        AssumePermission::Permit
    );
}

#[tokio::test]
async fn upsert_with_padded_arn_refreshes_existing_record() {
    let repository = InMemoryRoleRecordRepository::new();
    let role_arn = "arn:aws:iam:::role/ops";
    let principal = "arn:aws:iam:::user/alice";
    assert!(
        repository
            .upsert_provider_role(provider_role(role_arn, "ops", 3_600))
            .await
            .is_ok()
    );
    assert!(
        repository
            .set_permission(role_arn, principal, AssumePermission::Permit)
            .await
            .is_ok()
    );

    let padded = provider_role(" arn:aws:iam:::role/ops ", "ops", 7_200);
    let updated = repository.upsert_provider_role(padded).await;

    let Ok(updated) = updated else {
        panic!("refresh should succeed");
    };
    assert_eq!(updated.role_arn(), role_arn);
    assert_eq!(updated.max_session_duration(), 7_200);
    assert_eq!(
        updated.tracking().permission_for(principal),
        AssumePermission::Permit
    );
    assert_eq!(repository.list_roles().await.unwrap_or_default().len(), 1);
}

#[tokio::test]
async fn mutations_on_unknown_role_are_not_found() {
    let repository = InMemoryRoleRecordRepository::new();

    let recorded = repository
        .reserve_issuance("arn:aws:iam:::role/missing", "p", Utc::now(), 60)
        .await;
    let permitted = repository
        .set_permission("arn:aws:iam:::role/missing", "p", AssumePermission::Permit)
        .await;

    assert!(matches!(recorded, Err(AppError::NotFound(_))));
    assert!(matches!(permitted, Err(AppError::NotFound(_))));
}
