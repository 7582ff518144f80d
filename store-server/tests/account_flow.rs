//! Account lifecycle and access guard
//!
//! Passwords are stored hashed only, login failures stay indistinguishable
//! between unknown email and wrong password, and every privileged path is
//! gated through the guard.

mod common;

use common::*;
use store_server::db::models::UserUpdate;
use store_server::users::RegisterInput;
use store_server::utils::AppError;

fn register(name: &str, email: &str, password: &str) -> RegisterInput {
    RegisterInput {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn register_login_and_token_round_trip() {
    let state = test_state().await;

    let session = state
        .users
        .register(register("Jane Doe", "jane@example.com", "hunter2x"))
        .await
        .expect("registration should succeed");
    assert_eq!(session.user.email, "jane@example.com");
    assert!(!session.user.is_admin);
    assert!(!session.user.hash_pass.is_empty());
    assert_ne!(session.user.hash_pass, "hunter2x");

    // The issued token resolves through the guard into the same identity
    let identity = state
        .guard
        .resolve(&format!("Bearer {}", session.token))
        .expect("token should resolve");
    assert_eq!(
        identity.user_id,
        session.user.id.as_ref().unwrap().to_string()
    );
    assert_eq!(identity.name, "Jane Doe");
    assert!(!identity.is_admin);

    let login = state
        .users
        .login("jane@example.com", "hunter2x")
        .await
        .expect("login should succeed");
    assert_eq!(login.user.email, "jane@example.com");

    // Wrong password and unknown email fail identically
    let err = state
        .users
        .login("jane@example.com", "wrong-pass")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
    let err = state
        .users
        .login("nobody@example.com", "hunter2x")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
}

#[tokio::test]
async fn garbage_credentials_are_unauthenticated() {
    let state = test_state().await;
    assert!(matches!(
        state.guard.resolve("Bearer not.a.token"),
        Err(AppError::InvalidToken)
    ));
    assert!(matches!(
        state.guard.resolve(""),
        Err(AppError::Unauthorized)
    ));
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let state = test_state().await;
    state
        .users
        .register(register("Jane", "jane@example.com", "hunter2x"))
        .await
        .unwrap();

    let err = state
        .users
        .register(register("Other Jane", "jane@example.com", "different1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Emails are case-insensitive
    let err = state
        .users
        .register(register("Shouty Jane", "JANE@EXAMPLE.COM", "different1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn register_input_is_validated() {
    let state = test_state().await;

    let err = state
        .users
        .register(register("Jane", "not-an-email", "hunter2x"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = state
        .users
        .register(register("Jane", "jane@example.com", "short"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = state
        .users
        .register(register("", "jane@example.com", "hunter2x"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn profile_is_self_or_admin() {
    let state = test_state().await;
    let session = state
        .users
        .register(register("Jane", "jane@example.com", "hunter2x"))
        .await
        .unwrap();
    let jane_id = session.user.id.as_ref().unwrap().to_string();
    let jane = state.guard.resolve(&session.token).unwrap();

    assert!(state.users.get_profile(&jane, &jane_id).await.is_ok());
    assert!(
        state
            .users
            .get_profile(&admin_identity(), &jane_id)
            .await
            .is_ok()
    );

    let stranger = customer("u9", "Stranger");
    let err = state
        .users
        .get_profile(&stranger, &jane_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn profile_update_changes_password() {
    let state = test_state().await;
    let session = state
        .users
        .register(register("Jane", "jane@example.com", "hunter2x"))
        .await
        .unwrap();
    let jane_id = session.user.id.as_ref().unwrap().to_string();
    let jane = state.guard.resolve(&session.token).unwrap();

    let updated = state
        .users
        .update_profile(
            &jane,
            &jane_id,
            UserUpdate {
                name: Some("Jane Q. Doe".to_string()),
                email: None,
                password: Some("new-secret-9".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Jane Q. Doe");

    assert!(
        state
            .users
            .login("jane@example.com", "new-secret-9")
            .await
            .is_ok()
    );
    assert!(matches!(
        state.users.login("jane@example.com", "hunter2x").await,
        Err(AppError::Unauthorized)
    ));
}

#[tokio::test]
async fn profile_update_rejects_taken_email_and_bad_input() {
    let state = test_state().await;
    state
        .users
        .register(register("Ben", "ben@example.com", "hunter2x"))
        .await
        .unwrap();
    let session = state
        .users
        .register(register("Jane", "jane@example.com", "hunter2x"))
        .await
        .unwrap();
    let jane_id = session.user.id.as_ref().unwrap().to_string();
    let jane = state.guard.resolve(&session.token).unwrap();

    let err = state
        .users
        .update_profile(
            &jane,
            &jane_id,
            UserUpdate {
                email: Some("ben@example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = state
        .users
        .update_profile(
            &jane,
            &jane_id,
            UserUpdate {
                email: Some("not-an-email".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = state
        .users
        .update_profile(
            &jane,
            &jane_id,
            UserUpdate {
                password: Some("tiny".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn admin_user_management_is_gated() {
    let state = test_state().await;
    let session = state
        .users
        .register(register("Jane", "jane@example.com", "hunter2x"))
        .await
        .unwrap();
    let jane_id = session.user.id.as_ref().unwrap().to_string();
    let jane = state.guard.resolve(&session.token).unwrap();
    let admin = admin_identity();

    let err = state.users.list_users(&jane).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(state.users.list_users(&admin).await.unwrap().len(), 1);

    let err = state.users.delete_user(&jane, &jane_id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Admin cannot delete their own account
    let err = state
        .users
        .delete_user(&admin, &admin.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    state.users.delete_user(&admin, &jane_id).await.unwrap();
    assert!(state.users.list_users(&admin).await.unwrap().is_empty());
    let err = state
        .users
        .get_profile(&admin, &jane_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
