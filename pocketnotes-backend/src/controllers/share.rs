//! Share endpoint — read-only single-note view, NOT auth-gated.
//!
//! The "share" link reads the same local store; there is no access control
//! on it by design, only the unguessable note id.

use actix_web::{web, HttpResponse, Responder};

use crate::AppState;

async fn get_shared_note(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match data.store.get(&path.into_inner()) {
        Some(note) => HttpResponse::Ok().json(note),
        None => HttpResponse::NotFound().json(serde_json::json!({
            "error": "The note you're looking for doesn't exist or has been deleted"
        })),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/share").route("/{id}", web::get().to(get_shared_note)));
}
