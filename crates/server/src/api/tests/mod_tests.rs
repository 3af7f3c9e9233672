use super::*;
use shared::error::ErrorCode;

fn valid(name: &str) -> ActionFields {
    ActionFields {
        name: name.to_string(),
        username: "deploy".into(),
        host: "web1.internal".into(),
        command: "./release.sh".into(),
        ..ActionFields::default()
    }
}

#[tokio::test]
async fn create_rejects_missing_required_fields() {
    let ctx = ApiContext::default();
    let response = create_action(&ctx, ProjectId(1), ActionFields::default()).await;

    assert!(!response.form_saved);
    let fields: Vec<&str> = response.error_lines().into_iter().map(|(f, _)| f).collect();
    assert_eq!(fields, vec!["command", "host", "name", "username"]);
    assert!(ctx.store.list(ProjectId(1)).await.is_empty());
}

#[tokio::test]
async fn create_reports_overlong_values() {
    let ctx = ApiContext::default();
    let mut fields = valid("deploy");
    fields.username = "u".repeat(65);

    let response = create_action(&ctx, ProjectId(1), fields).await;

    assert_eq!(
        response.error_lines(),
        vec![(
            "username",
            "Ensure this value has at most 64 characters (it has 65)."
        )]
    );
}

#[tokio::test]
async fn create_returns_authoritative_record() {
    let ctx = ApiContext::default();
    create_action(&ctx, ProjectId(1), valid("first")).await;

    let response = create_action(&ctx, ProjectId(1), valid("second")).await;

    let data = response.data.expect("data");
    assert_eq!(data.index, Some(1));
    assert_eq!(data.project, Some(ProjectId(1)));
    assert!(data.id.is_some());
    assert_eq!(
        data.authorized_keys_entry,
        "# second\ncommand=\"./release.sh\",no-agent-forwarding,no-port-forwarding,no-pty,no-X11-forwarding"
    );
}

#[tokio::test]
async fn update_of_unknown_action_is_not_found() {
    let ctx = ApiContext::default();
    let err = update_action(&ctx, ProjectId(1), ActionId(9), valid("x"))
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn update_keeps_stored_values_when_invalid() {
    let ctx = ApiContext::default();
    let id = create_action(&ctx, ProjectId(1), valid("deploy"))
        .await
        .data
        .and_then(|data| data.id)
        .expect("id");
    let mut fields = valid("deploy");
    fields.host.clear();

    let response = update_action(&ctx, ProjectId(1), id, fields)
        .await
        .expect("update");

    assert!(!response.form_saved);
    let stored = ctx.store.get(ProjectId(1), id).await.expect("stored");
    assert_eq!(stored.fields.host, "web1.internal");
}

#[tokio::test]
async fn order_rewrites_indices_and_rejects_foreign_ids() {
    let ctx = ApiContext::default();
    let mut ids = Vec::new();
    for name in ["a", "b", "c"] {
        let data = create_action(&ctx, ProjectId(1), valid(name))
            .await
            .data
            .expect("data");
        ids.push(data.id.expect("id"));
    }

    set_action_order(&ctx, ProjectId(1), &[ids[2], ids[0], ids[1]])
        .await
        .expect("order");
    let names: Vec<String> = list_actions(&ctx, ProjectId(1))
        .await
        .into_iter()
        .map(|record| record.fields.name)
        .collect();
    assert_eq!(names, vec!["c", "a", "b"]);

    let err = set_action_order(&ctx, ProjectId(2), &[ids[0]])
        .await
        .expect_err("foreign");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[test]
fn keys_entry_for_actions_with_outputs_lists_locations() {
    let mut fields = valid("tests");
    fields.output_ux = "/tmp/unit.xml".into();
    fields.output_ch = "/tmp/coverage.xml".into();

    assert_eq!(
        authorized_keys_entry(&fields),
        "# tests and for fetching output /tmp/unit.xml,/tmp/coverage.xml\nno-agent-forwarding,no-port-forwarding,no-pty,no-X11-forwarding"
    );
}
