pub mod formation_requests;
pub mod inquiries;
pub mod lifelines;
pub mod tickets;
pub mod users;

use std::collections::HashMap;

use actix_web::web;
use serde::Serialize;

/// Standard list envelope for API v1 endpoints.
#[derive(Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

/// Parse page/per_page query params with the API-wide defaults.
pub(crate) fn paging(query: &HashMap<String, String>) -> (i64, i64) {
    let page = query
        .get("page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(1)
        .max(1);
    let per_page = query
        .get("per_page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(25)
        .clamp(1, 100);
    (page, per_page)
}

/// Configure API v1 routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/formation-requests")
            .route("", web::get().to(formation_requests::list))
            .route("", web::post().to(formation_requests::create))
            // /sweep BEFORE /{id} to avoid routing conflict
            .route("/sweep", web::post().to(formation_requests::sweep))
            .route("/{id}", web::get().to(formation_requests::detail))
            .route("/{id}/votes", web::post().to(formation_requests::cast_vote))
            .route(
                "/{id}/comments",
                web::post().to(formation_requests::add_comment),
            )
            .route(
                "/{id}/decision",
                web::get().to(formation_requests::decision),
            )
            .route("/{id}/approve", web::post().to(formation_requests::approve))
            .route("/{id}/reject", web::post().to(formation_requests::reject))
            .route("/{id}/archive", web::post().to(formation_requests::archive)),
    );
    cfg.service(
        web::scope("/lifelines")
            .route("", web::get().to(lifelines::list))
            .route("", web::post().to(lifelines::create))
            .route("/{id}", web::get().to(lifelines::detail))
            .route("/{id}", web::put().to(lifelines::update))
            .route("/{id}/publish", web::post().to(lifelines::publish))
            .route("/{id}/archive", web::post().to(lifelines::archive)),
    );
    cfg.service(
        web::scope("/inquiries")
            .route("", web::get().to(inquiries::list))
            .route("", web::post().to(inquiries::create))
            .route("/{id}/status", web::post().to(inquiries::update_status)),
    );
    cfg.service(
        web::scope("/tickets")
            .route("", web::get().to(tickets::list))
            .route("", web::post().to(tickets::create))
            .route("/{id}", web::get().to(tickets::detail))
            .route("/{id}/status", web::post().to(tickets::update_status)),
    );
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(users::list))
            .route("", web::post().to(users::create))
            .route("/{id}", web::get().to(users::detail))
            .route("/{id}/role", web::post().to(users::update_role))
            .route("/{id}/active", web::post().to(users::set_active)),
    );
}
