mod common;

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveTime;
use common::{date, fixture, next_date};
use mat_allocation_database::models::NewRegistration;
use mat_allocation_database::Store;
use mat_allocation_engine::{AllocationError, GuestAssignment};

fn bad_request<T: std::fmt::Debug>(result: Result<T, AllocationError>) -> String {
    match result {
        Err(AllocationError::BadRequest(message)) => message,
        other => panic!("expected bad request, got {other:?}"),
    }
}

fn not_found<T: std::fmt::Debug>(result: Result<T, AllocationError>) -> String {
    match result {
        Err(AllocationError::NotFound(message)) => message,
        other => panic!("expected not found, got {other:?}"),
    }
}

fn paid(guest_id: i32) -> GuestAssignment {
    GuestAssignment {
        comments: Some("late arrival".to_owned()),
        payment_amount: Some(BigDecimal::from_str("5.00").unwrap()),
        payment_type: Some("$$".to_owned()),
        shower_time: NaiveTime::from_hms_opt(4, 30, 0),
        wakeup_time: NaiveTime::from_hms_opt(4, 0, 0),
        ..GuestAssignment::new(guest_id)
    }
}

#[tokio::test]
async fn generate_creates_one_unassigned_row_per_mat() {
    let fixture = fixture().await;
    let template = fixture.template("1-3", Some("2"), Some("3"), None).await;

    let created = fixture.engine.generate(template.id, date()).await.unwrap();

    assert_eq!(created.len(), 3);
    let features: Vec<(i32, Option<&str>)> = created
        .iter()
        .map(|row| (row.mat_number, row.features.as_deref()))
        .collect();
    assert_eq!(features, vec![(1, None), (2, Some("H")), (3, Some("S"))]);
    for row in &created {
        assert_eq!(row.facility_id, fixture.facility.id);
        assert_eq!(row.registration_date, date());
        assert!(!row.is_assigned());
    }
}

#[tokio::test]
async fn generate_combines_flags_in_fixed_order() {
    let fixture = fixture().await;
    let template = fixture
        .template("1-6,9,12-15", Some("1-2"), Some("2,9"), Some("2,12"))
        .await;

    let created = fixture.engine.generate(template.id, date()).await.unwrap();

    assert_eq!(created.len(), 11);
    let mat = |number: i32| {
        created
            .iter()
            .find(|row| row.mat_number == number)
            .and_then(|row| row.features.clone())
    };
    assert_eq!(mat(1).as_deref(), Some("H"));
    assert_eq!(mat(2).as_deref(), Some("HSW"));
    assert_eq!(mat(9).as_deref(), Some("S"));
    assert_eq!(mat(12).as_deref(), Some("W"));
    assert_eq!(mat(13), None);
}

#[tokio::test]
async fn generate_refuses_a_day_with_registrations() {
    let fixture = fixture().await;
    let template = fixture.template("1-4", None, None, None).await;
    fixture.engine.generate(template.id, date()).await.unwrap();

    let message = bad_request(fixture.engine.generate(template.id, date()).await);
    assert!(message.contains("4 already exist"), "{message}");
    assert_eq!(fixture.engine.store().registration_count(), 4);

    // another day is fine
    let created = fixture.engine.generate(template.id, next_date()).await.unwrap();
    assert_eq!(created.len(), 4);
}

#[tokio::test]
async fn generate_with_missing_template() {
    let fixture = fixture().await;
    assert_eq!(
        not_found(fixture.engine.generate(9999, date()).await),
        "templateId: Missing Template 9999"
    );
}

#[tokio::test]
async fn assign_binds_guest_and_fields() {
    let fixture = fixture().await;
    let template = fixture.template("1-3", None, None, None).await;
    let rows = fixture.engine.generate(template.id, date()).await.unwrap();

    let assigned = fixture
        .engine
        .assign(rows[0].id, paid(fixture.fred.id))
        .await
        .unwrap();

    assert_eq!(assigned.guest_id, Some(fixture.fred.id));
    assert_eq!(assigned.payment_type.as_deref(), Some("$$"));
    assert_eq!(assigned.comments.as_deref(), Some("late arrival"));
    assert_eq!(assigned.mat_number, rows[0].mat_number);
}

#[tokio::test]
async fn assign_same_guest_again_replaces_fields() {
    let fixture = fixture().await;
    let template = fixture.template("1-3", None, None, None).await;
    let rows = fixture.engine.generate(template.id, date()).await.unwrap();
    fixture
        .engine
        .assign(rows[0].id, paid(fixture.fred.id))
        .await
        .unwrap();

    let refreshed = fixture
        .engine
        .assign(rows[0].id, GuestAssignment::new(fixture.fred.id))
        .await
        .unwrap();

    assert_eq!(refreshed.guest_id, Some(fixture.fred.id));
    assert_eq!(refreshed.comments, None);
    assert_eq!(refreshed.payment_amount, None);
    assert_eq!(refreshed.shower_time, None);
}

#[tokio::test]
async fn assign_rejects_taken_registration() {
    let fixture = fixture().await;
    let template = fixture.template("1-3", None, None, None).await;
    let rows = fixture.engine.generate(template.id, date()).await.unwrap();
    fixture
        .engine
        .assign(rows[0].id, GuestAssignment::new(fixture.fred.id))
        .await
        .unwrap();

    let message = bad_request(
        fixture
            .engine
            .assign(rows[0].id, GuestAssignment::new(fixture.barney.id))
            .await,
    );
    assert!(message.contains("already assigned to someone else"), "{message}");
}

#[tokio::test]
async fn assign_rejects_second_mat_for_same_guest_and_date() {
    let fixture = fixture().await;
    let template = fixture.template("1-3", None, None, None).await;
    let rows = fixture.engine.generate(template.id, date()).await.unwrap();
    fixture
        .engine
        .assign(rows[0].id, GuestAssignment::new(fixture.fred.id))
        .await
        .unwrap();

    let message = bad_request(
        fixture
            .engine
            .assign(rows[1].id, GuestAssignment::new(fixture.fred.id))
            .await,
    );
    assert!(message.contains("already assigned to mat 1"), "{message}");
}

#[tokio::test]
async fn assign_allows_same_guest_on_another_date() {
    let fixture = fixture().await;
    let template = fixture.template("1-2", None, None, None).await;
    let today = fixture.engine.generate(template.id, date()).await.unwrap();
    let tomorrow = fixture.engine.generate(template.id, next_date()).await.unwrap();

    fixture
        .engine
        .assign(today[0].id, GuestAssignment::new(fixture.fred.id))
        .await
        .unwrap();
    let assigned = fixture
        .engine
        .assign(tomorrow[0].id, GuestAssignment::new(fixture.fred.id))
        .await
        .unwrap();
    assert_eq!(assigned.guest_id, Some(fixture.fred.id));
}

#[tokio::test]
async fn assign_rejects_guest_of_another_facility() {
    let fixture = fixture().await;
    let template = fixture.template("1", None, None, None).await;
    let rows = fixture.engine.generate(template.id, date()).await.unwrap();

    let message = bad_request(
        fixture
            .engine
            .assign(rows[0].id, GuestAssignment::new(fixture.stranger.id))
            .await,
    );
    assert!(message.contains("does not belong to facility"), "{message}");
}

#[tokio::test]
async fn assign_with_missing_ids() {
    let fixture = fixture().await;
    let template = fixture.template("1", None, None, None).await;
    let rows = fixture.engine.generate(template.id, date()).await.unwrap();

    assert_eq!(
        not_found(
            fixture
                .engine
                .assign(9999, GuestAssignment::new(fixture.fred.id))
                .await
        ),
        "id: Missing Registration 9999"
    );
    assert_eq!(
        not_found(
            fixture
                .engine
                .assign(rows[0].id, GuestAssignment::new(9999))
                .await
        ),
        "guestId: Missing Guest 9999"
    );
}

#[tokio::test]
async fn deassign_clears_assignment_only() {
    let fixture = fixture().await;
    let template = fixture.template("1-2", Some("2"), None, None).await;
    let rows = fixture.engine.generate(template.id, date()).await.unwrap();
    fixture
        .engine
        .assign(rows[1].id, paid(fixture.fred.id))
        .await
        .unwrap();

    let cleared = fixture.engine.deassign(rows[1].id).await.unwrap();

    assert_eq!(cleared.guest_id, None);
    assert_eq!(cleared.comments, None);
    assert_eq!(cleared.payment_amount, None);
    assert_eq!(cleared.payment_type, None);
    assert_eq!(cleared.shower_time, None);
    assert_eq!(cleared.wakeup_time, None);
    assert_eq!(cleared.facility_id, rows[1].facility_id);
    assert_eq!(cleared.mat_number, rows[1].mat_number);
    assert_eq!(cleared.registration_date, rows[1].registration_date);
    assert_eq!(cleared.features.as_deref(), Some("H"));
}

#[tokio::test]
async fn deassign_requires_assignment() {
    let fixture = fixture().await;
    let template = fixture.template("1", None, None, None).await;
    let rows = fixture.engine.generate(template.id, date()).await.unwrap();

    let message = bad_request(fixture.engine.deassign(rows[0].id).await);
    assert!(message.contains("is not currently assigned"), "{message}");
    not_found(fixture.engine.deassign(9999).await);
}

#[tokio::test]
async fn deassigned_guest_can_take_another_mat() {
    let fixture = fixture().await;
    let template = fixture.template("1-2", None, None, None).await;
    let rows = fixture.engine.generate(template.id, date()).await.unwrap();
    fixture
        .engine
        .assign(rows[0].id, GuestAssignment::new(fixture.fred.id))
        .await
        .unwrap();
    fixture.engine.deassign(rows[0].id).await.unwrap();

    fixture
        .engine
        .assign(rows[1].id, GuestAssignment::new(fixture.fred.id))
        .await
        .unwrap();
}

#[tokio::test]
async fn reassign_moves_all_fields() {
    let fixture = fixture().await;
    let template = fixture.template("1-3", None, None, None).await;
    let rows = fixture.engine.generate(template.id, date()).await.unwrap();
    let before = fixture
        .engine
        .assign(rows[0].id, paid(fixture.fred.id))
        .await
        .unwrap();

    let moved = fixture.engine.reassign(rows[0].id, rows[2].id).await.unwrap();

    assert_eq!(moved.id, rows[2].id);
    assert_eq!(moved.mat_number, 3);
    assert_eq!(moved.assignment(), before.assignment());
    let from = fixture
        .engine
        .find_registration(rows[0].id)
        .await
        .unwrap()
        .registration;
    assert!(!from.is_assigned());
    assert_eq!(from.comments, None);
    assert_eq!(from.payment_amount, None);
    assert_eq!(from.wakeup_time, None);
}

#[tokio::test]
async fn reassign_to_itself_is_rejected() {
    let fixture = fixture().await;
    let template = fixture.template("1", None, None, None).await;
    let rows = fixture.engine.generate(template.id, date()).await.unwrap();
    fixture
        .engine
        .assign(rows[0].id, GuestAssignment::new(fixture.fred.id))
        .await
        .unwrap();

    let message = bad_request(fixture.engine.reassign(rows[0].id, rows[0].id).await);
    assert!(message.contains("to itself"), "{message}");
}

#[tokio::test]
async fn reassign_preconditions() {
    let fixture = fixture().await;
    let template = fixture.template("1-3", None, None, None).await;
    let rows = fixture.engine.generate(template.id, date()).await.unwrap();
    fixture
        .engine
        .assign(rows[0].id, GuestAssignment::new(fixture.fred.id))
        .await
        .unwrap();
    fixture
        .engine
        .assign(rows[1].id, GuestAssignment::new(fixture.barney.id))
        .await
        .unwrap();

    let message = bad_request(fixture.engine.reassign(rows[2].id, rows[0].id).await);
    assert!(message.contains("is not currently assigned"), "{message}");

    let message = bad_request(fixture.engine.reassign(rows[0].id, rows[1].id).await);
    assert!(message.contains("is already assigned"), "{message}");

    not_found(fixture.engine.reassign(9999, rows[2].id).await);
    not_found(fixture.engine.reassign(rows[0].id, 9999).await);

    // nothing moved
    let row = fixture.engine.find_registration(rows[0].id).await.unwrap();
    assert_eq!(row.registration.guest_id, Some(fixture.fred.id));
    assert_eq!(row.guest.as_ref(), Some(&fixture.fred));
}

#[tokio::test]
async fn reassign_rejects_another_facility() {
    let fixture = fixture().await;
    let template = fixture.template("1", None, None, None).await;
    let rows = fixture.engine.generate(template.id, date()).await.unwrap();
    fixture
        .engine
        .assign(rows[0].id, GuestAssignment::new(fixture.fred.id))
        .await
        .unwrap();
    let elsewhere = fixture
        .engine
        .insert_registration(NewRegistration::unassigned(
            fixture.other_facility.id,
            date(),
            1,
            None,
        ))
        .await
        .unwrap();

    let message = bad_request(fixture.engine.reassign(rows[0].id, elsewhere.id).await);
    assert!(message.contains("another facility"), "{message}");
}

#[tokio::test]
async fn reassign_to_another_date_checks_that_date() {
    let fixture = fixture().await;
    let template = fixture.template("1-2", None, None, None).await;
    let today = fixture.engine.generate(template.id, date()).await.unwrap();
    let tomorrow = fixture.engine.generate(template.id, next_date()).await.unwrap();
    fixture
        .engine
        .assign(today[0].id, GuestAssignment::new(fixture.fred.id))
        .await
        .unwrap();
    fixture
        .engine
        .assign(tomorrow[0].id, GuestAssignment::new(fixture.fred.id))
        .await
        .unwrap();

    let message = bad_request(fixture.engine.reassign(today[0].id, tomorrow[1].id).await);
    assert!(message.contains("already assigned to mat 1"), "{message}");

    fixture.engine.deassign(tomorrow[0].id).await.unwrap();
    let moved = fixture
        .engine
        .reassign(today[0].id, tomorrow[1].id)
        .await
        .unwrap();
    assert_eq!(moved.guest_id, Some(fixture.fred.id));
    assert_eq!(moved.registration_date, next_date());
}

#[tokio::test]
async fn racing_assignments_of_one_guest_leave_one_winner() {
    let fixture = fixture().await;
    let template = fixture.template("1-2", None, None, None).await;
    let rows = fixture.engine.generate(template.id, date()).await.unwrap();
    let engine = fixture.yielding_engine();

    // both pass the guest-per-date check before either writes
    let (first, second) = tokio::join!(
        engine.assign(rows[0].id, GuestAssignment::new(fixture.fred.id)),
        engine.assign(rows[1].id, GuestAssignment::new(fixture.fred.id)),
    );

    assert!(first.is_ok() ^ second.is_ok());
    let loser = bad_request(if first.is_ok() { second } else { first });
    assert!(loser.ends_with("within this facility"), "{loser}");
    let held = engine
        .store()
        .find_registrations_by_guest(fixture.fred.id)
        .await
        .unwrap();
    assert_eq!(held.len(), 1);
}

#[tokio::test]
async fn racing_assignments_of_one_mat_keep_the_first_guest() {
    let fixture = fixture().await;
    let template = fixture.template("1", None, None, None).await;
    let rows = fixture.engine.generate(template.id, date()).await.unwrap();
    let engine = fixture.yielding_engine();

    let (fred, barney) = tokio::join!(
        engine.assign(rows[0].id, GuestAssignment::new(fixture.fred.id)),
        engine.assign(rows[0].id, GuestAssignment::new(fixture.barney.id)),
    );

    assert!(fred.is_ok() ^ barney.is_ok());
    let (winner, loser) = match fred {
        Ok(row) => (row, barney),
        Err(err) => (barney.unwrap(), Err(err)),
    };
    assert_eq!(
        bad_request(loser),
        format!("id: Registration {} is already assigned to someone else", rows[0].id)
    );
    let row = engine.find_registration(rows[0].id).await.unwrap();
    assert_eq!(row.registration, winner);
}

#[tokio::test]
async fn reassign_racing_an_assignment_of_the_target() {
    let fixture = fixture().await;
    let template = fixture.template("1-2", None, None, None).await;
    let rows = fixture.engine.generate(template.id, date()).await.unwrap();
    fixture
        .engine
        .assign(rows[0].id, GuestAssignment::new(fixture.fred.id))
        .await
        .unwrap();
    let engine = fixture.yielding_engine();

    let (moved, assigned) = tokio::join!(
        engine.reassign(rows[0].id, rows[1].id),
        engine.assign(rows[1].id, GuestAssignment::new(fixture.barney.id)),
    );

    assert!(moved.is_ok() ^ assigned.is_ok());
    let from = engine.find_registration(rows[0].id).await.unwrap().registration;
    let to = engine.find_registration(rows[1].id).await.unwrap().registration;
    if moved.is_ok() {
        assert_eq!(from.guest_id, None);
        assert_eq!(to.guest_id, Some(fixture.fred.id));
    } else {
        // the failed move left the source untouched
        assert_eq!(from.guest_id, Some(fixture.fred.id));
        assert_eq!(to.guest_id, Some(fixture.barney.id));
    }
}
