use std::sync::Arc;

use rolegate_core::AppError;
use rolegate_domain::{AssumePermission, SessionLiveness};

use crate::AuthorizationTracker;
use crate::test_support::{
    FakeClock, FakeIdentityProvider, FakeRoleRecordRepository, client, provider_role,
};

use super::{AssumeRoleService, DEFAULT_SESSION_NAME};

struct Harness {
    service: AssumeRoleService,
    repository: Arc<FakeRoleRecordRepository>,
    identity_provider: Arc<FakeIdentityProvider>,
    clock: Arc<FakeClock>,
}

async fn harness(identity_provider: FakeIdentityProvider) -> Harness {
    let repository = Arc::new(FakeRoleRecordRepository::default());
    repository
        .seed(
            provider_role("R1", &["P1", "P2"]),
            &[("P1", AssumePermission::Permit)],
        )
        .await;
    repository.seed(provider_role("R2", &["P2"]), &[]).await;

    let clock = Arc::new(FakeClock::default());
    let identity_provider = Arc::new(identity_provider);
    let tracker = AuthorizationTracker::new(repository.clone(), clock.clone());
    let service = AssumeRoleService::new(
        tracker,
        repository.clone(),
        identity_provider.clone(),
        DEFAULT_SESSION_NAME,
    );

    Harness {
        service,
        repository,
        identity_provider,
        clock,
    }
}

fn default_provider() -> FakeIdentityProvider {
    FakeIdentityProvider::new(&[("AK1", "P1"), ("AK2", "P2")], Vec::new())
}

#[tokio::test]
async fn issue_session_records_and_consumes_permit() {
    let harness = harness(default_provider()).await;

    let issued = harness
        .service
        .issue_session(&client("AK1"), "R1", Some(60))
        .await;

    let Ok(issued) = issued else {
        panic!("issuance should succeed");
    };
    assert_eq!(issued.principal_arn, "P1");
    assert_eq!(issued.session.principal(), "P1");
    assert_eq!(issued.credentials.session_token, "token-temp-session");
    assert_eq!(
        (issued.session.expires_at() - issued.session.issued_at()).num_seconds(),
        60
    );

    let Some(record) = harness.repository.snapshot("R1").await else {
        panic!("role exists");
    };
    assert_eq!(
        record.tracking().permission_for("P1"),
        AssumePermission::Consumed
    );
    assert!(record.tracking().assumed_users().contains("P1"));
}

#[tokio::test]
async fn second_request_reports_active_session() {
    let harness = harness(default_provider()).await;
    let client = client("AK1");

    assert!(
        harness
            .service
            .issue_session(&client, "R1", Some(60))
            .await
            .is_ok()
    );
    assert!(
        harness
            .service
            .update_permission("R1", "P1", AssumePermission::Consumed)
            .await
            .is_ok()
    );

    let second = harness.service.issue_session(&client, "R1", Some(60)).await;

    assert!(matches!(
        second,
        Err(AppError::Forbidden(message)) if message == "session still active"
    ));
}

#[tokio::test]
async fn expired_session_without_permit_is_not_permitted() {
    let harness = harness(default_provider()).await;
    let client = client("AK1");
    assert!(
        harness
            .service
            .issue_session(&client, "R1", Some(60))
            .await
            .is_ok()
    );

    harness.clock.advance(61);
    let retry = harness.service.issue_session(&client, "R1", Some(60)).await;

    assert!(matches!(
        retry,
        Err(AppError::Forbidden(message)) if message == "not permitted"
    ));
    assert_eq!(harness.identity_provider.issued_count(), 1);
}

#[tokio::test]
async fn admin_permit_unblocks_live_session() {
    let harness = harness(default_provider()).await;
    let client = client("AK1");
    assert!(
        harness
            .service
            .issue_session(&client, "R1", Some(600))
            .await
            .is_ok()
    );

    assert!(
        harness
            .service
            .update_permission("R1", "P1", AssumePermission::Permit)
            .await
            .is_ok()
    );
    let reissued = harness.service.issue_session(&client, "R1", Some(600)).await;

    assert!(reissued.is_ok());
    assert_eq!(harness.identity_provider.issued_count(), 2);
}

#[tokio::test]
async fn concurrent_requests_issue_exactly_one_session() {
    let harness = harness(default_provider()).await;
    let first_client = client("AK1");
    let second_client = client("AK1");

    let (first, second) = tokio::join!(
        harness.service.issue_session(&first_client, "R1", Some(300)),
        harness.service.issue_session(&second_client, "R1", Some(300)),
    );

    assert_eq!(
        usize::from(first.is_ok()) + usize::from(second.is_ok()),
        1
    );
    assert_eq!(harness.identity_provider.issued_count(), 1);
    let Some(record) = harness.repository.snapshot("R1").await else {
        panic!("role exists");
    };
    assert_eq!(record.tracking().assume_history().len(), 1);
}

#[tokio::test]
async fn services_sharing_one_store_issue_exactly_one_session() {
    let harness = harness(default_provider()).await;
    let tracker = AuthorizationTracker::new(harness.repository.clone(), harness.clock.clone());
    let replica = AssumeRoleService::new(
        tracker,
        harness.repository.clone(),
        harness.identity_provider.clone(),
        DEFAULT_SESSION_NAME,
    );
    let first_client = client("AK1");
    let second_client = client("AK1");

    let (first, second) = tokio::join!(
        harness.service.issue_session(&first_client, "R1", Some(300)),
        replica.issue_session(&second_client, "R1", Some(300)),
    );

    assert_eq!(
        usize::from(first.is_ok()) + usize::from(second.is_ok()),
        1
    );
    assert!(
        [first, second]
            .into_iter()
            .filter_map(Result::err)
            .all(|error| matches!(
                error,
                AppError::Forbidden(message) if message == "session still active"
            ))
    );
    assert_eq!(harness.identity_provider.issued_count(), 1);
    let Some(record) = harness.repository.snapshot("R1").await else {
        panic!("role exists");
    };
    assert_eq!(record.tracking().assume_history().len(), 1);
}

#[tokio::test]
async fn provider_failure_leaves_permit_untouched() {
    let harness = harness(default_provider().failing_assume()).await;

    let result = harness
        .service
        .issue_session(&client("AK1"), "R1", None)
        .await;

    assert!(matches!(result, Err(AppError::IdentityProvider(_))));
    let Some(record) = harness.repository.snapshot("R1").await else {
        panic!("role exists");
    };
    assert!(record.tracking().assume_history().is_empty());
    assert!(record.tracking().assumed_users().is_empty());
    let check = harness.service.check_issuance("R1", "P1").await;
    assert!(matches!(
        check,
        Ok(check) if check.liveness == SessionLiveness::NoHistory && check.permitted
    ));
}

#[tokio::test]
async fn unknown_credentials_surface_provider_error() {
    let harness = harness(default_provider()).await;

    let result = harness
        .service
        .issue_session(&client("AK-unknown"), "R1", None)
        .await;

    assert!(matches!(result, Err(AppError::IdentityProvider(_))));
}

#[tokio::test]
async fn unknown_role_is_not_found() {
    let harness = harness(default_provider()).await;

    let result = harness
        .service
        .issue_session(&client("AK1"), "R404", None)
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn requested_duration_is_clamped_to_role_bound() {
    let harness = harness(default_provider()).await;

    let issued = harness
        .service
        .issue_session(&client("AK1"), "R1", Some(86_400))
        .await;

    let Ok(issued) = issued else {
        panic!("issuance should succeed");
    };
    assert_eq!(
        (issued.session.expires_at() - issued.session.issued_at()).num_seconds(),
        3_600
    );
}

#[tokio::test]
async fn roles_for_principal_filters_by_trust_policy() {
    let harness = harness(default_provider()).await;

    let roles = harness.service.roles_for_principal("P1").await;
    let Ok(roles) = roles else {
        panic!("listing should succeed");
    };
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].record.role_arn(), "R1");
    assert!(roles[0].check.permitted);

    let via_client = harness.service.roles_for_client(&client("AK2")).await;
    let Ok((principal_arn, roles)) = via_client else {
        panic!("listing should succeed");
    };
    assert_eq!(principal_arn, "P2");
    assert_eq!(roles.len(), 2);
}

#[tokio::test]
async fn permission_overview_lists_only_flagged_roles() {
    let harness = harness(default_provider()).await;

    let overview = harness.service.permission_overview().await;

    let Ok(overview) = overview else {
        panic!("overview should succeed");
    };
    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0].role_arn, "R1");
    assert_eq!(overview[0].principals.len(), 1);
    assert_eq!(overview[0].principals[0].principal_arn, "P1");
    assert_eq!(
        overview[0].principals[0].permission,
        AssumePermission::Permit
    );
}

#[tokio::test]
async fn sync_roles_refreshes_provider_fields_and_keeps_tracking() {
    let mut refreshed = provider_role("R1", &["P1", "P3"]);
    refreshed.max_session_duration = 7_200;
    let mut invalid = provider_role("R9", &[]);
    invalid.max_session_duration = 0;
    let provider = FakeIdentityProvider::new(
        &[("AK1", "P1")],
        vec![refreshed, provider_role("R3", &["P3"]), invalid],
    );
    let harness = harness(provider).await;

    let summary = harness.service.sync_roles(&client("AK1")).await;

    let Ok(summary) = summary else {
        panic!("sync should succeed");
    };
    assert_eq!(summary.synchronized, 2);
    assert_eq!(summary.skipped, 1);

    let Some(record) = harness.repository.snapshot("R1").await else {
        panic!("role exists");
    };
    assert_eq!(record.max_session_duration(), 7_200);
    assert!(record.trusts("P3"));
    assert_eq!(
        record.tracking().permission_for("P1"),
        AssumePermission::Permit
    );
    assert!(harness.repository.snapshot("R3").await.is_some());
    assert!(harness.repository.snapshot("R9").await.is_none());
}
