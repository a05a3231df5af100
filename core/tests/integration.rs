//! End-to-end tests against the live mock backend.
//!
//! # Design
//! Each test starts the mock server on a random port and drives the public
//! façades over real HTTP through `UreqTransport`, so request building,
//! transport and response classification are exercised together. Tests that
//! need server-side switches keep a handle to the shared database.

use std::sync::Arc;

use mock_server::{Db, SharedDb, SEED_PASSWORD, STUDENT_EMAIL, TEACHER_EMAIL, TEACHER_ID};
use tutor_core::endpoints;
use tutor_core::services::DELETE_CONFIRMATION;
use tutor_core::types::{
    Checkout, Credentials, FileAttachment, LessonUpdate, LessonUpload, MobileMoneyPayment, NewConversation,
    NewLesson, NewRating, NewSupportTicket, PasswordChange, PurchaseStatus, UserRole,
};
use tutor_core::{
    ApiClient, ApiError, Filter, HttpMethod, NotificationPanel, PanelState, Payload, Session, Transport, UreqTransport,
};

/// Serve `db` on a random port from a background thread and return the base URL.
fn spawn_server(db: SharedDb) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with_state(listener, db).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Session::anonymous(), UreqTransport::new())
}

fn signed_in(base_url: &str, email: &str) -> ApiClient {
    let client = client(base_url);
    client
        .auth()
        .login(&Credentials {
            email: email.to_string(),
            password: SEED_PASSWORD.to_string(),
        })
        .unwrap();
    client
}

#[test]
fn login_failure_surfaces_backend_message() {
    let base = spawn_server(Db::seeded().shared());
    let client = client(&base);

    let err = client
        .auth()
        .login(&Credentials {
            email: STUDENT_EMAIL.to_string(),
            password: "wrong".to_string(),
        })
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(!client.session().is_authenticated());
}

#[test]
fn session_lifecycle() {
    let base = spawn_server(Db::seeded().shared());
    let client = client(&base);

    // Step 1: anonymous calls to protected routes are rejected.
    let err = client.auth().profile().unwrap_err();
    assert!(err.is_unauthorized());

    // Step 2: login stores the token and later calls carry it.
    let session = client
        .auth()
        .login(&Credentials {
            email: STUDENT_EMAIL.to_string(),
            password: SEED_PASSWORD.to_string(),
        })
        .unwrap();
    assert_eq!(session.user.role, UserRole::Student);
    assert_eq!(client.session().token().as_deref(), Some(session.token.as_str()));

    let profile = client.auth().profile().unwrap();
    assert_eq!(profile.email, STUDENT_EMAIL);

    // Step 3: logout answers 204 and forgets the token.
    client.auth().logout().unwrap();
    assert!(!client.session().is_authenticated());
    assert!(client.auth().profile().unwrap_err().is_unauthorized());
}

#[test]
fn cookie_session_follows_with_credentials() {
    let base = spawn_server(Db::seeded().shared());
    let transport = Arc::new(UreqTransport::new());
    let client = ApiClient::new(&base, Session::anonymous(), transport.clone());

    // Step 1: login leaves a session cookie in the shared jar.
    client
        .auth()
        .login(&Credentials {
            email: STUDENT_EMAIL.to_string(),
            password: SEED_PASSWORD.to_string(),
        })
        .unwrap();
    client.session().clear().unwrap();

    // Step 2: without a bearer token the cookie alone authenticates.
    assert_eq!(client.auth().profile().unwrap().email, STUDENT_EMAIL);

    // Step 3: the same request without credentials carries no cookie.
    let mut request = client
        .build_request(HttpMethod::Get, endpoints::AUTH_PROFILE, Payload::Empty)
        .unwrap();
    assert!(request.header("authorization").is_none());
    request.with_credentials = false;
    let response = transport.execute(request).unwrap();
    assert_eq!(response.status, 401);

    // Step 4: the shared jar is unaffected.
    assert_eq!(client.auth().profile().unwrap().email, STUDENT_EMAIL);
}

#[test]
fn notification_panel_against_backend() {
    let db = Db::seeded().shared();
    let base = spawn_server(db.clone());
    let client = signed_in(&base, STUDENT_EMAIL);
    let api = client.notifications();

    // Step 1: load the seeded inbox.
    let mut panel = NotificationPanel::new();
    panel.load(&api);
    assert_eq!(panel.notifications().len(), 3);
    assert_eq!(panel.unread_count(), 2);

    panel.set_filter(Filter::Unread);
    let unread: Vec<&str> = panel.visible().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(unread, ["n1", "n3"]);

    // Step 2: mark one read; the backend agrees.
    panel.mark_as_read(&api, "n1").unwrap();
    assert_eq!(panel.unread_count(), 1);
    assert_eq!(api.unread_count().unwrap(), 1);

    // Step 3: with writes failing, a single mark keeps its local change.
    db.blocking_write().faults.notification_writes = true;
    let err = panel.mark_as_read(&api, "n3").unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(panel.unread_count(), 0);
    assert_eq!(panel.action_error(), Some("Notification service unavailable"));
    assert_eq!(api.unread_count().unwrap(), 1);

    // Step 4: reload, then a failing bulk mark rolls back.
    panel.load(&api);
    assert_eq!(panel.unread_count(), 1);
    let before = panel.state().clone();
    panel.mark_all_as_read(&api).unwrap_err();
    assert_eq!(panel.state(), &before);
    assert!(panel.action_error().is_some());

    // Step 5: writes recover; the bulk mark sticks and the error clears.
    db.blocking_write().faults.notification_writes = false;
    panel.mark_all_as_read(&api).unwrap();
    assert_eq!(panel.unread_count(), 0);
    assert_eq!(panel.action_error(), None);
    assert_eq!(api.unread_count().unwrap(), 0);
}

#[test]
fn notification_panel_shows_load_error() {
    let base = spawn_server(Db::seeded().shared());
    let client = client(&base);

    let mut panel = NotificationPanel::new();
    panel.load(&client.notifications());
    assert_eq!(
        panel.state(),
        &PanelState::Error("Authentication required".to_string())
    );
}

#[test]
fn teacher_publishes_and_manages_lesson() {
    let base = spawn_server(Db::seeded().shared());
    let teacher = signed_in(&base, TEACHER_EMAIL);

    // Step 1: upload a lesson with its video as multipart.
    let upload = LessonUpload {
        lesson: NewLesson {
            title: "Fractions".to_string(),
            description: "Halves, thirds and quarters".to_string(),
            subject: "math".to_string(),
            level: "beginner".to_string(),
            price: 9.5,
            duration_minutes: 30,
        },
        video: FileAttachment::new("fractions.mp4", "video/mp4", b"not really a video".to_vec()),
        thumbnail: Some(FileAttachment::new("fractions.png", "image/png", vec![137, 80, 78, 71])),
    };
    let lesson = teacher.lessons().create(&upload).unwrap();
    assert_eq!(lesson.title, "Fractions");
    assert_eq!(lesson.price, 9.5);
    assert_eq!(lesson.duration_minutes, 30);
    assert_eq!(lesson.teacher_id, TEACHER_ID);
    assert!(lesson.video_url.as_deref().unwrap().ends_with("fractions.mp4"));
    assert!(lesson.thumbnail_url.is_some());

    // Step 2: it shows up publicly and on the dashboard.
    assert_eq!(client(&base).lessons().list().unwrap().len(), 3);
    assert_eq!(teacher.teacher().lessons().unwrap().len(), 3);
    assert_eq!(teacher.teacher().stats().unwrap().total_lessons, 3);

    // Step 3: partial update touches only the title.
    let updated = teacher
        .lessons()
        .update(
            &lesson.id,
            &LessonUpdate {
                title: Some("Fractions 101".to_string()),
                ..LessonUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(updated.title, "Fractions 101");
    assert_eq!(updated.price, 9.5);

    // Step 4: delete answers 204; the lesson is gone.
    teacher.lessons().delete(&lesson.id).unwrap();
    let err = teacher.lessons().get(&lesson.id).unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.user_message(), "Lesson not found");
}

#[test]
fn student_buys_rates_and_pays() {
    let base = spawn_server(Db::seeded().shared());
    let student = signed_in(&base, STUDENT_EMAIL);

    // Step 1: rating before buying is refused by the backend.
    let err = student
        .ratings()
        .create("l1", &NewRating { score: 5, comment: None })
        .unwrap_err();
    assert_eq!(err.status(), Some(403));

    // Step 2: checkout completes the purchase.
    let result = student
        .purchases()
        .checkout(&Checkout {
            lesson_ids: vec!["l1".to_string()],
            payment_method: "mobile_money".to_string(),
        })
        .unwrap();
    assert_eq!(result.total_amount, 15.0);
    assert_eq!(result.purchases[0].status, PurchaseStatus::Completed);
    assert_eq!(student.student().lessons().unwrap().len(), 2);

    // Step 3: now the rating is accepted and aggregated.
    let rating = student
        .ratings()
        .create(
            "l1",
            &NewRating {
                score: 4,
                comment: Some("Clear and well paced".to_string()),
            },
        )
        .unwrap();
    assert_eq!(rating.score, 4);
    assert_eq!(student.ratings().list("l1").unwrap().len(), 1);
    assert_eq!(student.lessons().get("l1").unwrap().average_rating, Some(4.0));

    // Step 4: initiate a mobile money payment for the seeded purchase.
    let payment = student
        .payments()
        .initiate_mobile_money(&MobileMoneyPayment {
            purchase_id: "p0".to_string(),
            amount: 20.0,
            currency: "USD".to_string(),
            phone_number: "+233200000000".to_string(),
            provider: "MTN".to_string(),
        })
        .unwrap();
    assert_eq!(payment.reference, "MM-p0");
    assert_eq!(payment.status, "pending");
}

#[test]
fn account_settings_round_trip() {
    let base = spawn_server(Db::seeded().shared());
    let student = signed_in(&base, STUDENT_EMAIL);
    let users = student.users();

    let avatar = users
        .upload_avatar(&FileAttachment::new("me.png", "image/png", vec![137, 80, 78, 71]))
        .unwrap();
    assert!(avatar.avatar_url.ends_with("me.png"));
    assert_eq!(student.auth().profile().unwrap().avatar_url, Some(avatar.avatar_url));

    let mut prefs = users.notification_preferences().unwrap();
    prefs.marketing = true;
    assert!(users.update_notification_preferences(&prefs).unwrap().marketing);
    assert!(users.notification_preferences().unwrap().marketing);

    // Mismatch never reaches the backend; a wrong current password does.
    let mismatch = users
        .change_password(&PasswordChange {
            current_password: SEED_PASSWORD.to_string(),
            new_password: "newpassword1".to_string(),
            confirm_password: "newpassword2".to_string(),
        })
        .unwrap_err();
    assert_eq!(mismatch, ApiError::Validation("New passwords do not match".to_string()));

    let wrong = users
        .change_password(&PasswordChange {
            current_password: "nope".to_string(),
            new_password: "newpassword1".to_string(),
            confirm_password: "newpassword1".to_string(),
        })
        .unwrap_err();
    assert_eq!(wrong.status(), Some(400));
    assert_eq!(wrong.user_message(), "Current password is incorrect");

    let export = users.data_export().unwrap();
    assert_eq!(export["user"]["email"], STUDENT_EMAIL);
}

#[test]
fn delete_account_ends_session() {
    let base = spawn_server(Db::seeded().shared());
    let student = signed_in(&base, STUDENT_EMAIL);

    let refused = student.users().delete_account("delete").unwrap_err();
    assert!(matches!(refused, ApiError::Validation(_)));
    assert!(student.session().is_authenticated());

    student.users().delete_account(DELETE_CONFIRMATION).unwrap();
    assert!(!student.session().is_authenticated());

    let err = client(&base)
        .auth()
        .login(&Credentials {
            email: STUDENT_EMAIL.to_string(),
            password: SEED_PASSWORD.to_string(),
        })
        .unwrap_err();
    assert!(err.is_unauthorized());
}

#[test]
fn support_and_chat() {
    let base = spawn_server(Db::seeded().shared());
    let student = signed_in(&base, STUDENT_EMAIL);
    let teacher = signed_in(&base, TEACHER_EMAIL);

    let ticket = student
        .support()
        .create_ticket(&NewSupportTicket {
            subject: "Video will not play".to_string(),
            message: "Lesson l2 stops after a minute".to_string(),
            category: Some("technical".to_string()),
        })
        .unwrap();
    assert_eq!(ticket.status, "open");

    let conversation = student
        .chat()
        .start_conversation(&NewConversation {
            participant_id: TEACHER_ID.to_string(),
            lesson_id: Some("l2".to_string()),
        })
        .unwrap();
    student.chat().send_message(&conversation.id, "Hello!").unwrap();

    let inbox = teacher.chat().conversations().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].last_message.as_ref().map(|m| m.content.as_str()), Some("Hello!"));
    let messages = teacher.chat().messages(&conversation.id).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(teacher.notifications().unread_count().unwrap(), 1);

    assert!(matches!(
        student.chat().send_message(&conversation.id, "   "),
        Err(ApiError::Validation(_))
    ));
}
