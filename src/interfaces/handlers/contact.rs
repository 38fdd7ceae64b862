use actix_web::{
    http::{header, Method},
    web, HttpRequest, HttpResponse, ResponseError,
};

use crate::{
    constants::MAX_CONTACT_BODY_BYTES,
    entities::contact::ContactForm,
    errors::ContactError,
    utils::get_client_ip::get_client_ip,
    AppState,
};

/// `/api/contact`: preflight, method check, body decode, then the pipeline.
/// Every response carries the CORS headers.
pub async fn contact(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> HttpResponse {
    let method = req.method();
    let response = if method == Method::OPTIONS {
        HttpResponse::NoContent().finish()
    } else if method == Method::POST {
        submit(&req, payload, &state).await
    } else {
        reject(ContactError::MethodNotAllowed)
    };

    state.cors.apply(&req, response)
}

async fn submit(req: &HttpRequest, payload: web::Payload, state: &AppState) -> HttpResponse {
    // Oversized or broken bodies are rejected here so they still get CORS
    // headers and the JSON error shape.
    let body = match payload.to_bytes_limited(MAX_CONTACT_BODY_BYTES).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            tracing::warn!("Contact body unreadable: {}", e);
            return reject(ContactError::BadRequestBody);
        }
        Err(_) => {
            tracing::warn!("Contact body exceeds {} bytes", MAX_CONTACT_BODY_BYTES);
            return reject(ContactError::BadRequestBody);
        }
    };

    let form = match ContactForm::from_slice(&body) {
        Ok(form) => form,
        Err(e) => return reject(e),
    };

    let remote_ip = get_client_ip(req, state.trust_x_forwarded_for);

    match state.contact_handler.submit(form, &remote_ip).await {
        Ok(response) => HttpResponse::Ok()
            .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
            .insert_header((header::REFERRER_POLICY, "strict-origin-when-cross-origin"))
            .insert_header(("Permissions-Policy", "camera=(), microphone=(), geolocation=()"))
            .json(response),
        Err(e) => reject(e),
    }
}

fn reject(err: ContactError) -> HttpResponse {
    tracing::info!(status = err.status_code().as_u16(), "Contact request rejected: {}", err);
    err.error_response()
}
