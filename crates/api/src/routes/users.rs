//! Route definitions for the `/users` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{notifications, users};
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /                            -> list_users
/// PUT    /                            -> update_profile (auth)
/// POST   /signup                      -> signup
/// GET    /activate/{token}            -> activate
/// POST   /login                       -> login
/// POST   /signout                     -> signout (auth)
/// GET    /me                          -> me (auth)
/// POST   /reset-password              -> reset_password
/// PUT    /change-password             -> change_password (?reset_token=)
///
/// GET    /notifications               -> list_notifications (auth)
/// PUT    /notifications/email         -> toggle_email_notify (auth)
/// PUT    /notifications/in-app        -> toggle_in_app_notify (auth)
/// PUT    /notifications/{id}          -> mark_seen (auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).put(users::update_profile))
        .route("/signup", post(users::signup))
        .route("/activate/{token}", get(users::activate))
        .route("/login", post(users::login))
        .route("/signout", post(users::signout))
        .route("/me", get(users::me))
        .route("/reset-password", post(users::reset_password))
        .route("/change-password", put(users::change_password))
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/email", put(users::toggle_email_notify))
        .route("/notifications/in-app", put(users::toggle_in_app_notify))
        .route("/notifications/{id}", put(notifications::mark_seen))
}
