//! Email/password identity endpoints.
//!
//! Failures are surfaced as human-readable `error` strings the login form
//! renders inline — no retry policy, no lockout. Signup signs the new
//! account in immediately, so both signup and login answer with a bearer
//! token.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::models::User;
use crate::AppState;

const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Deserialize)]
struct CredentialsRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct UserInfo {
    email: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    user: UserInfo,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            email: user.email.clone(),
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim_start_matches("Bearer ").to_string())
}

/// Create an account and sign it in
async fn sign_up(
    data: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> impl Responder {
    let email = body.email.trim().to_lowercase();

    if email.is_empty() || !email.contains('@') {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Please enter a valid email address"
        }));
    }
    if body.password.chars().count() < MIN_PASSWORD_CHARS {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Password must be at least {} characters", MIN_PASSWORD_CHARS)
        }));
    }

    match data.db.get_user_by_email(&email) {
        Ok(Some(_)) => {
            return HttpResponse::Conflict().json(serde_json::json!({
                "error": "An account with this email already exists"
            }));
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("Failed to check for existing account: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    }

    let user = match data.db.create_user(&email, &body.password) {
        Ok(user) => user,
        Err(e) => {
            log::error!("Failed to create account: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create account"
            }));
        }
    };

    match data.db.create_session(user.id) {
        Ok(session) => HttpResponse::Created().json(AuthResponse {
            token: session.token,
            user: UserInfo::from(&user),
        }),
        Err(e) => {
            log::error!("Failed to create session after signup: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

/// Check credentials and open a session
async fn sign_in(
    data: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> impl Responder {
    let email = body.email.trim().to_lowercase();

    let user = match data.db.verify_user_password(&email, &body.password) {
        Ok(Some(user)) => user,
        Ok(None) => {
            // Deliberately the same message for unknown email and bad password
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid email or password"
            }));
        }
        Err(e) => {
            log::error!("Failed to verify credentials: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    match data.db.create_session(user.id) {
        Ok(session) => HttpResponse::Ok().json(AuthResponse {
            token: session.token,
            user: UserInfo::from(&user),
        }),
        Err(e) => {
            log::error!("Failed to create session: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

/// Tear down the current session
async fn sign_out(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let Some(token) = bearer_token(&req) else {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "No authorization token provided"
        }));
    };

    match data.db.delete_session(&token) {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => {
            log::error!("Failed to delete session: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

/// Resolve the current session to its user — the route guard's
/// `user`/`loading` pair polls this on page load.
async fn current_user(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let Some(token) = bearer_token(&req) else {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "No authorization token provided"
        }));
    };

    let session = match data.db.validate_session(&token) {
        Ok(Some(session)) => session,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid or expired session"
            }));
        }
        Err(e) => {
            log::error!("Session validation error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    match data.db.get_user_by_id(session.user_id) {
        Ok(Some(user)) => HttpResponse::Ok().json(serde_json::json!({
            "user": UserInfo::from(&user)
        })),
        Ok(None) => HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid or expired session"
        })),
        Err(e) => {
            log::error!("Failed to load session user: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/signup", web::post().to(sign_up))
            .route("/login", web::post().to(sign_in))
            .route("/logout", web::post().to(sign_out))
            .route("/me", web::get().to(current_user)),
    );
}
