//! Notes REST API — the auth-gated CRUD surface over the note store.
//!
//! Create and update accept a multipart form (`title`, `content`, optional
//! `image` file part) so the client can attach an image straight from the
//! native file picker; the image is embedded as a data URL before the note
//! is constructed.

use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use futures_util::TryStreamExt;
use serde::Serialize;

use crate::notes::{images, Note, NoteDraft};
use crate::AppState;

/// Validate the Bearer session token from a request
fn validate_session_from_request(
    state: &web::Data<AppState>,
    req: &HttpRequest,
) -> Result<(), HttpResponse> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim_start_matches("Bearer ").to_string());

    let token = match token {
        Some(t) => t,
        None => {
            return Err(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "No authorization token provided"
            })));
        }
    };

    match state.db.validate_session(&token) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid or expired session"
        }))),
        Err(e) => {
            log::error!("Session validation error: {}", e);
            Err(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })))
        }
    }
}

// --- Multipart form parsing ---

/// One uploaded file part, collected into memory
struct ImagePart {
    bytes: Vec<u8>,
    content_type: Option<String>,
    filename: Option<String>,
}

#[derive(Default)]
struct NoteForm {
    title: String,
    content: String,
    image: Option<ImagePart>,
}

/// Collect the `title`, `content`, and optional `image` parts of a note
/// form. Unknown parts are drained and ignored. The image part is bounded
/// while streaming so an oversized upload fails before it is buffered
/// whole.
async fn parse_note_form(mut payload: Multipart) -> Result<NoteForm, String> {
    let mut form = NoteForm::default();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| format!("Malformed multipart request: {}", e))?
    {
        let name = field.name().to_string();

        match name.as_str() {
            "title" | "content" => {
                let mut data = Vec::new();
                while let Some(chunk) = field
                    .try_next()
                    .await
                    .map_err(|e| format!("Failed to read '{}' field: {}", name, e))?
                {
                    data.extend_from_slice(&chunk);
                }
                let text = String::from_utf8_lossy(&data).to_string();
                if name == "title" {
                    form.title = text;
                } else {
                    form.content = text;
                }
            }
            "image" => {
                let content_type = field.content_type().map(|m| m.to_string());
                let filename = field
                    .content_disposition()
                    .get_filename()
                    .map(|f| f.to_string());

                let mut data = Vec::new();
                while let Some(chunk) = field
                    .try_next()
                    .await
                    .map_err(|e| format!("Failed to read image upload: {}", e))?
                {
                    data.extend_from_slice(&chunk);
                    if data.len() > images::MAX_IMAGE_BYTES {
                        return Err(format!(
                            "Image is too large (limit is {} bytes)",
                            images::MAX_IMAGE_BYTES
                        ));
                    }
                }

                // An image input left empty submits a zero-length part
                if !data.is_empty() {
                    form.image = Some(ImagePart {
                        bytes: data,
                        content_type,
                        filename,
                    });
                }
            }
            _ => {
                // Drain and drop unknown parts
                while field.try_next().await.ok().flatten().is_some() {}
            }
        }
    }

    Ok(form)
}

/// Turn a parsed form into a store draft, encoding the image if present
fn draft_from_form(form: NoteForm) -> Result<NoteDraft, String> {
    let image_url = match form.image {
        Some(part) => Some(images::encode_data_url(
            &part.bytes,
            part.content_type.as_deref(),
            part.filename.as_deref(),
        )?),
        None => None,
    };

    Ok(NoteDraft {
        title: form.title,
        content: form.content,
        image_url,
    })
}

// --- Handlers ---

#[derive(Debug, Serialize)]
struct ListNotesResponse {
    success: bool,
    notes: Vec<Note>,
}

/// List all notes, newest-created-first
async fn list_notes(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = validate_session_from_request(&data, &req) {
        return resp;
    }

    HttpResponse::Ok().json(ListNotesResponse {
        success: true,
        notes: data.store.list(),
    })
}

/// Get a single note by id
async fn get_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = validate_session_from_request(&data, &req) {
        return resp;
    }

    match data.store.get(&path.into_inner()) {
        Some(note) => HttpResponse::Ok().json(note),
        None => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Note not found"
        })),
    }
}

/// Create a note from a multipart form
async fn create_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
) -> impl Responder {
    if let Err(resp) = validate_session_from_request(&data, &req) {
        return resp;
    }

    let form = match parse_note_form(payload).await {
        Ok(form) => form,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e }));
        }
    };

    let draft = match draft_from_form(form) {
        Ok(draft) => draft,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e }));
        }
    };

    match data.store.create(draft) {
        Ok(note) => HttpResponse::Created().json(note),
        Err(e) => {
            log::error!("Failed to persist new note: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to save note"
            }))
        }
    }
}

/// Update an existing note from a multipart form.
/// An absent image part keeps the note's previous image.
async fn update_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    payload: Multipart,
) -> impl Responder {
    if let Err(resp) = validate_session_from_request(&data, &req) {
        return resp;
    }

    let form = match parse_note_form(payload).await {
        Ok(form) => form,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e }));
        }
    };

    let draft = match draft_from_form(form) {
        Ok(draft) => draft,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e }));
        }
    };

    match data.store.update(&path.into_inner(), draft) {
        Ok(Some(note)) => HttpResponse::Ok().json(note),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Note not found"
        })),
        Err(e) => {
            log::error!("Failed to persist note update: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to save note"
            }))
        }
    }
}

/// Delete a note by id
async fn delete_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = validate_session_from_request(&data, &req) {
        return resp;
    }

    match data.store.delete(&path.into_inner()) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Note not found"
        })),
        Err(e) => {
            log::error!("Failed to persist note deletion: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to save note"
            }))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/notes")
            .route("", web::get().to(list_notes))
            .route("", web::post().to(create_note))
            .route("/{id}", web::get().to(get_note))
            .route("/{id}", web::put().to(update_note))
            .route("/{id}", web::delete().to(delete_note)),
    );
}
