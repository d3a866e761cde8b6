use chrono::Duration;
use pretty_assertions::assert_eq;
use rollcall_api::services::checkin::{build_view, UNASSIGNED_GROUP_NAME};
use rollcall_core::{
    errors::AttendanceError,
    models::checkin::CheckinView,
    permissions::{MemberStatus, Role},
};
use rollcall_db::store::{AttendanceStore, RosterDirectory};

use crate::test_utils::{chicago_wednesday, TestContext};

/// Two active groups, one inactive group and one unassigned person.
fn seed_roster(tc: &TestContext) -> (uuid::Uuid, uuid::Uuid) {
    let g = tc.store.add_group(tc.org, "Guppies", &["gail"]);
    let h = tc.store.add_group(tc.org, "Herons", &["hank"]);
    let retired = tc.store.add_inactive_group(tc.org, "Retired", &["rita"]);
    tc.store.add_person(tc.org, "Gina", Some(g.id));
    tc.store.add_person(tc.org, "Gus", Some(g.id));
    tc.store.add_person(tc.org, "Hal", Some(h.id));
    tc.store.add_person(tc.org, "Rory", Some(retired.id));
    tc.store.add_person(tc.org, "Uma", None);
    (g.id, h.id)
}

fn names(view: &CheckinView) -> Vec<(String, Vec<String>)> {
    view.groups
        .iter()
        .map(|g| (g.name.clone(), g.entries.iter().map(|e| e.name.clone()).collect()))
        .collect()
}

#[tokio::test]
async fn test_leader_sees_only_their_group() {
    let tc = TestContext::new();
    let (g, _) = seed_roster(&tc);
    tc.open_event(chicago_wednesday(19, 0)).await;

    let view = build_view(&tc.ctx(), &tc.leader("gail"), chicago_wednesday(19, 30))
        .await
        .unwrap();

    assert_eq!(view.groups.len(), 1);
    assert_eq!(view.groups[0].group_id, Some(g));
    assert_eq!(
        names(&view),
        vec![("Guppies".to_string(), vec!["Gina".to_string(), "Gus".to_string()])]
    );
}

#[tokio::test]
async fn test_admin_sees_every_active_group() {
    let tc = TestContext::new();
    seed_roster(&tc);
    tc.open_event(chicago_wednesday(19, 0)).await;

    let view = build_view(&tc.ctx(), &tc.admin(), chicago_wednesday(19, 30))
        .await
        .unwrap();

    assert_eq!(
        names(&view),
        vec![
            ("Guppies".to_string(), vec!["Gina".to_string(), "Gus".to_string()]),
            ("Herons".to_string(), vec!["Hal".to_string()]),
            (UNASSIGNED_GROUP_NAME.to_string(), vec!["Uma".to_string()]),
        ]
    );
}

#[tokio::test]
async fn test_existing_records_are_merged() {
    let tc = TestContext::new();
    seed_roster(&tc);
    let event = tc.open_event(chicago_wednesday(19, 0)).await;
    let gina = tc
        .store
        .list_members(tc.org, None)
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.name == "Gina")
        .unwrap();
    tc.store
        .upsert_record(event.id, gina.id, true, Some("brought a friend"), "gail", chicago_wednesday(19, 10))
        .await
        .unwrap();

    let view = build_view(&tc.ctx(), &tc.leader("gail"), chicago_wednesday(19, 30))
        .await
        .unwrap();

    let entries = &view.groups[0].entries;
    assert_eq!(entries[0].present, Some(true));
    assert_eq!(entries[0].note, "brought a friend");
    assert_eq!(entries[1].present, None);
    assert_eq!(entries[1].note, "");
}

#[tokio::test]
async fn test_no_event_gives_empty_view() {
    let tc = TestContext::new();
    seed_roster(&tc);

    let view = build_view(&tc.ctx(), &tc.admin(), chicago_wednesday(19, 30))
        .await
        .unwrap();

    assert_eq!(view, CheckinView::empty());
}

#[tokio::test]
async fn test_leader_without_groups_still_gets_event() {
    let tc = TestContext::new();
    seed_roster(&tc);
    let event = tc.open_event(chicago_wednesday(19, 0)).await;

    let view = build_view(&tc.ctx(), &tc.leader("nobody"), chicago_wednesday(19, 30))
        .await
        .unwrap();

    assert_eq!(view.event, Some(event));
    assert!(view.groups.is_empty());
}

#[tokio::test]
async fn test_recent_closed_event_is_current() {
    let tc = TestContext::new();
    let now = chicago_wednesday(19, 0);
    let recent = tc.closed_event(now - Duration::hours(30));
    tc.closed_event(now - Duration::hours(100));

    let view = build_view(&tc.ctx(), &tc.admin(), now).await.unwrap();

    assert_eq!(view.event.map(|e| e.id), Some(recent.id));
}

#[tokio::test]
async fn test_old_closed_event_is_not_current() {
    let tc = TestContext::new();
    let now = chicago_wednesday(19, 0);
    tc.closed_event(now - Duration::hours(49));

    let view = build_view(&tc.ctx(), &tc.admin(), now).await.unwrap();

    assert_eq!(view.event, None);
}

#[tokio::test]
async fn test_open_event_preferred_over_newer_closed_one() {
    let tc = TestContext::new();
    let now = chicago_wednesday(19, 0);
    let open = tc.open_event(now - Duration::days(7)).await;
    tc.closed_event(now - Duration::hours(1));

    let view = build_view(&tc.ctx(), &tc.admin(), now).await.unwrap();

    assert_eq!(view.event.map(|e| e.id), Some(open.id));
}

#[tokio::test]
async fn test_suspended_member_cannot_view() {
    let tc = TestContext::new();
    let mut caller = tc.caller("sam", Role::Leader);
    caller.status = MemberStatus::Suspended;

    let result = build_view(&tc.ctx(), &caller, chicago_wednesday(19, 0)).await;

    assert!(matches!(result, Err(AttendanceError::Authorization(_))));
}
