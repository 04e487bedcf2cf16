// tests/consent_lifecycle_tests.rs
use chrono::{Duration, Utc};
use consent_backend::domain::consent_model::{ConsentDurationType, ConsentStatus};
use consent_backend::domain::consent_scope::ConsentScope;
use consent_backend::error::AppError;
use std::collections::HashSet;
use uuid::Uuid;

mod common;

#[tokio::test]
async fn test_create_consent_persists_active_consent_with_grant_entry() {
    let harness = common::build_harness();
    let owner_id = Uuid::new_v4();

    let consent = harness
        .consent_service
        .create_consent(common::create_command(
            owner_id,
            vec![ConsentScope::Documents],
        ))
        .await
        .unwrap();

    // 検証
    assert_eq!(consent.status, ConsentStatus::Active.as_str());
    assert_eq!(consent.owner_id, owner_id);
    assert_eq!(consent.share_token.len(), 32);
    assert!(consent.expires_at > consent.created_at);
    // 24時間の固定期間
    assert_eq!(consent.expires_at - consent.created_at, Duration::hours(24));

    // grant エントリーが同時に残っていること
    let trail = harness
        .consent_service
        .get_audit_trail(owner_id, consent.id)
        .await
        .unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].action, "grant");
    assert_eq!(trail[0].actor_type, "user");
    assert_eq!(trail[0].actor_id, Some(owner_id.to_string()));
}

#[tokio::test]
async fn test_create_consent_with_seven_day_duration() {
    let harness = common::build_harness();
    let owner_id = Uuid::new_v4();

    let mut command = common::create_command(owner_id, vec![ConsentScope::Insights]);
    command.duration_type = ConsentDurationType::SevenDays;

    let consent = harness
        .consent_service
        .create_consent(command)
        .await
        .unwrap();

    assert_eq!(consent.expires_at - consent.created_at, Duration::days(7));
    assert_eq!(consent.duration_type, "7d");
}

#[tokio::test]
async fn test_create_consent_rejects_empty_scopes() {
    let harness = common::build_harness();
    let owner_id = Uuid::new_v4();

    let result = harness
        .consent_service
        .create_consent(common::create_command(owner_id, vec![]))
        .await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));

    // 同意もgrantエントリーも残っていないこと
    let consents = harness
        .consent_service
        .list_consents(owner_id, None)
        .await
        .unwrap();
    assert!(consents.is_empty());
}

#[tokio::test]
async fn test_create_consent_with_custom_expiry_requires_future_date() {
    let harness = common::build_harness();
    let owner_id = Uuid::new_v4();

    // 過去の日時は拒否
    let mut command = common::create_command(owner_id, vec![ConsentScope::Documents]);
    command.duration_type = ConsentDurationType::Custom;
    command.custom_expiry_date = Some(Utc::now() - Duration::hours(1));
    let result = harness.consent_service.create_consent(command).await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));

    // 日時未指定も拒否
    let mut command = common::create_command(owner_id, vec![ConsentScope::Documents]);
    command.duration_type = ConsentDurationType::Custom;
    command.custom_expiry_date = None;
    let result = harness.consent_service.create_consent(command).await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));

    // どちらの失敗でも何も永続化されない
    let consents = harness
        .consent_service
        .list_consents(owner_id, None)
        .await
        .unwrap();
    assert!(consents.is_empty());
}

#[tokio::test]
async fn test_custom_expiry_sets_exact_deadline() {
    let harness = common::build_harness();
    let owner_id = Uuid::new_v4();
    let deadline = Utc::now() + Duration::days(3);

    let mut command = common::create_command(owner_id, vec![ConsentScope::Emergency]);
    command.duration_type = ConsentDurationType::Custom;
    command.custom_expiry_date = Some(deadline);

    let consent = harness
        .consent_service
        .create_consent(command)
        .await
        .unwrap();

    assert_eq!(consent.expires_at, deadline);
    assert_eq!(consent.custom_expiry_date, Some(deadline));
}

#[tokio::test]
async fn test_share_tokens_are_unique_across_creates() {
    let harness = common::build_harness();
    let owner_id = Uuid::new_v4();

    let mut tokens = HashSet::new();
    let mut ids = Vec::new();
    for _ in 0..20 {
        let consent = harness
            .consent_service
            .create_consent(common::create_command(
                owner_id,
                vec![ConsentScope::Documents],
            ))
            .await
            .unwrap();
        tokens.insert(consent.share_token.clone());
        ids.push((consent.id, consent.share_token));
    }
    assert_eq!(tokens.len(), 20);

    // 各トークンは発行された同意そのものに解決される
    for (id, token) in ids {
        let resolved = harness
            .consent_service
            .read_fresh_by_token(&token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.id, id);
    }
}

#[tokio::test]
async fn test_read_past_expiry_persists_expired_status() {
    let harness = common::build_harness();
    let owner_id = Uuid::new_v4();
    let seeded = common::seed_expired_consent(
        &harness,
        owner_id,
        "expired-token-000000000000000000000",
        vec![ConsentScope::Documents],
    );

    // 読み取り時に expired へ遷移する
    let consent = harness
        .consent_service
        .read_fresh(seeded.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(consent.status, ConsentStatus::Expired.as_str());

    // 遷移は永続化されており、以後の読み取りも expired を返す
    let again = harness
        .consent_service
        .read_fresh(seeded.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.status, ConsentStatus::Expired.as_str());
}

#[tokio::test]
async fn test_concurrent_reads_converge_on_expired() {
    let harness = common::build_harness();
    let owner_id = Uuid::new_v4();
    let seeded = common::seed_expired_consent(
        &harness,
        owner_id,
        "racing-token-0000000000000000000000",
        vec![ConsentScope::Documents],
    );

    // 期限超過後の並行読み取りは全て expired を観測する
    let (first, second) = tokio::join!(
        harness.consent_service.read_fresh(seeded.id),
        harness.consent_service.read_fresh(seeded.id),
    );
    assert_eq!(
        first.unwrap().unwrap().status,
        ConsentStatus::Expired.as_str()
    );
    assert_eq!(
        second.unwrap().unwrap().status,
        ConsentStatus::Expired.as_str()
    );
}

#[tokio::test]
async fn test_revoke_transitions_active_to_revoked() {
    let harness = common::build_harness();
    let owner_id = Uuid::new_v4();

    let consent = harness
        .consent_service
        .create_consent(common::create_command(
            owner_id,
            vec![ConsentScope::Documents],
        ))
        .await
        .unwrap();

    let revoked = harness
        .consent_service
        .revoke_consent(owner_id, consent.id)
        .await
        .unwrap();

    assert_eq!(revoked.status, ConsentStatus::Revoked.as_str());
    assert!(revoked.revoked_at.is_some());

    // revoke エントリーが残る
    let trail = harness
        .consent_service
        .get_audit_trail(owner_id, consent.id)
        .await
        .unwrap();
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[0].action, "revoke");
    assert_eq!(trail[0].actor_type, "user");
}

#[tokio::test]
async fn test_double_revoke_is_idempotent() {
    let harness = common::build_harness();
    let owner_id = Uuid::new_v4();

    let consent = harness
        .consent_service
        .create_consent(common::create_command(
            owner_id,
            vec![ConsentScope::Documents],
        ))
        .await
        .unwrap();

    let first = harness
        .consent_service
        .revoke_consent(owner_id, consent.id)
        .await
        .unwrap();
    let second = harness
        .consent_service
        .revoke_consent(owner_id, consent.id)
        .await
        .unwrap();

    // 2回目はエラーではなく同じ終端状態を返す
    assert_eq!(second.status, ConsentStatus::Revoked.as_str());
    assert_eq!(second.revoked_at, first.revoked_at);

    // revoke エントリーは増えない
    let trail = harness
        .consent_service
        .get_audit_trail(owner_id, consent.id)
        .await
        .unwrap();
    assert_eq!(trail.len(), 2);
}

#[tokio::test]
async fn test_revoke_after_expiry_is_noop() {
    let harness = common::build_harness();
    let owner_id = Uuid::new_v4();
    let seeded = common::seed_expired_consent(
        &harness,
        owner_id,
        "expired-revoke-000000000000000000000",
        vec![ConsentScope::Documents],
    );

    let result = harness
        .consent_service
        .revoke_consent(owner_id, seeded.id)
        .await
        .unwrap();

    // expired を revoked に上書きしない
    assert_eq!(result.status, ConsentStatus::Expired.as_str());
    assert!(result.revoked_at.is_none());

    // 遷移が起きていないので revoke エントリーも残らない
    let trail = harness
        .consent_service
        .get_audit_trail(owner_id, seeded.id)
        .await
        .unwrap();
    assert!(trail.iter().all(|entry| entry.action != "revoke"));
}

#[tokio::test]
async fn test_ownership_mismatch_is_forbidden() {
    let harness = common::build_harness();
    let owner_a = Uuid::new_v4();
    let owner_b = Uuid::new_v4();

    let consent = harness
        .consent_service
        .create_consent(common::create_command(
            owner_a,
            vec![ConsentScope::Documents],
        ))
        .await
        .unwrap();

    // get / revoke / audit のいずれも Forbidden（NotFound ではない）
    let get_result = harness.consent_service.get_consent(owner_b, consent.id).await;
    assert!(matches!(get_result, Err(AppError::Forbidden(_))));

    let revoke_result = harness
        .consent_service
        .revoke_consent(owner_b, consent.id)
        .await;
    assert!(matches!(revoke_result, Err(AppError::Forbidden(_))));

    let audit_result = harness
        .consent_service
        .get_audit_trail(owner_b, consent.id)
        .await;
    assert!(matches!(audit_result, Err(AppError::Forbidden(_))));

    // 他人からの失効は状態を変えない
    let unchanged = harness
        .consent_service
        .get_consent(owner_a, consent.id)
        .await
        .unwrap();
    assert_eq!(unchanged.status, ConsentStatus::Active.as_str());
}

#[tokio::test]
async fn test_unknown_consent_is_not_found() {
    let harness = common::build_harness();

    let result = harness
        .consent_service
        .get_consent(Uuid::new_v4(), Uuid::new_v4())
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_list_consents_newest_first_with_status_filter() {
    let harness = common::build_harness();
    let owner_id = Uuid::new_v4();

    common::seed_expired_consent(
        &harness,
        owner_id,
        "listing-expired-00000000000000000000",
        vec![ConsentScope::Documents],
    );
    let first = harness
        .consent_service
        .create_consent(common::create_command(
            owner_id,
            vec![ConsentScope::Documents],
        ))
        .await
        .unwrap();
    let second = harness
        .consent_service
        .create_consent(common::create_command(
            owner_id,
            vec![ConsentScope::Emergency],
        ))
        .await
        .unwrap();

    // 新しい順で全件（期限切れ行は一覧時に遅延遷移済み）
    let all = harness
        .consent_service
        .list_consents(owner_id, None)
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert!(all[0].created_at >= all[1].created_at);
    assert!(all[1].created_at >= all[2].created_at);
    assert_eq!(all[2].status, ConsentStatus::Expired.as_str());

    // ステータス絞り込み
    let active = harness
        .consent_service
        .list_consents(owner_id, Some(ConsentStatus::Active))
        .await
        .unwrap();
    assert_eq!(active.len(), 2);
    assert!(active.iter().any(|c| c.id == first.id));
    assert!(active.iter().any(|c| c.id == second.id));

    let expired = harness
        .consent_service
        .list_consents(owner_id, Some(ConsentStatus::Expired))
        .await
        .unwrap();
    assert_eq!(expired.len(), 1);
}

#[tokio::test]
async fn test_build_share_link_returns_url_and_qr() {
    let harness = common::build_harness();
    let owner_id = Uuid::new_v4();

    let consent = harness
        .consent_service
        .create_consent(common::create_command(
            owner_id,
            vec![ConsentScope::Documents],
        ))
        .await
        .unwrap();

    let parts = harness
        .consent_service
        .build_share_link(owner_id, consent.id)
        .await
        .unwrap();

    assert_eq!(
        parts.shareable_url,
        format!("{}/share/{}", common::SHARE_BASE_URL, consent.share_token)
    );
    assert!(parts.qr_code.starts_with("data:image/png;base64,"));

    // 所有権チェックは共有リンク構築にも適用される
    let foreign = harness
        .consent_service
        .build_share_link(Uuid::new_v4(), consent.id)
        .await;
    assert!(matches!(foreign, Err(AppError::Forbidden(_))));
}
