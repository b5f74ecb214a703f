// routes.rs - router assembly
use std::any::Any;

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{HeaderName, HeaderValue},
    middleware::{from_fn, from_fn_with_state, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::database::models::Role;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{
    jwt_auth_middleware, rate_limit, report_faults, require_roles, ADMIN_ONLY, ANY_ROLE, BOOKING_READERS,
    CONTENT_EDITORS, STAFF,
};
use crate::state::AppState;
use crate::supervisor::RestartHandle;

/// The whole HTTP surface: `/health`, the legacy login, `/api/*`, and the
/// upload directory as static files.
pub fn app(state: AppState) -> Router {
    let uploads = ServeDir::new(state.uploads.dir());
    let upload_path = state.uploads.url_path().to_string();

    let api = Router::new()
        .merge(public_routes())
        .merge(staff_routes(&state))
        .merge(booking_reader_routes(&state))
        .merge(content_editor_routes(&state))
        .merge(admin_routes(&state))
        .merge(account_routes(&state))
        .layer(from_fn_with_state(state.clone(), rate_limit));

    let router = Router::new()
        .route("/health", get(public::health::health_get))
        // Older admin builds post here
        .route("/auth/login", post(public::auth::login_post))
        .nest("/api", api)
        .nest_service(&upload_path, uploads)
        .fallback(not_found);

    // Global middleware, innermost first
    with_fault_reporting(router, &state.restart)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("cross-origin"),
        ))
        .layer(DefaultBodyLimit::max(state.config.server.max_json_bytes))
        .layer(cors_layer(&state.config.server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any 500 or panic below this point arms a restart; panics answer 500.
fn with_fault_reporting<S>(router: Router<S>, restart: &RestartHandle) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(from_fn_with_state(restart.clone(), report_faults))
        .layer(CatchPanicLayer::custom(panic_responder(restart.clone())))
}

/// JWT first, then the role allow-list, for every route in `router`.
fn guarded(router: Router<AppState>, state: &AppState, roles: &'static [Role]) -> Router<AppState> {
    router
        .route_layer(from_fn(move |req: Request, next: Next| require_roles(roles, req, next)))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(public::auth::login_post))
        .route("/bookings", post(public::bookings::submit_post))
        .route("/bookings/export/excel", get(public::bookings::export_excel))
        .route("/shifts", get(public::shifts::list))
        .route("/team", get(public::team::list))
        .route("/gallery", get(public::gallery::list))
        .route("/gallery/:id", get(public::gallery::show))
        .route("/content/contacts", get(public::content::contacts_get))
        .route("/content/:slug", get(public::content::show))
        .route("/config/public", get(public::config::public_get))
}

/// Admin and manager: booking edits, export and all media-bearing records.
fn staff_routes(state: &AppState) -> Router<AppState> {
    use protected::{bookings, gallery, shifts, team};

    let records = Router::new()
        .route("/bookings/:id", put(bookings::update))
        .route("/bookings/:id/archive", patch(bookings::archive))
        .route("/bookings/:id/restore", patch(bookings::restore))
        .route("/bookings/export", get(bookings::export))
        .route("/shifts/:id", axum::routing::delete(shifts::delete))
        .route("/team/:id", axum::routing::delete(team::delete))
        .route("/gallery/:id", axum::routing::delete(gallery::delete))
        .route("/gallery/:id/photos", axum::routing::delete(gallery::remove_photo));

    // Multipart bodies are streamed to disk without a size cap.
    let uploads = Router::new()
        .route("/shifts", post(shifts::create))
        .route("/shifts/:id", patch(shifts::update))
        .route("/shifts/:id/image", post(shifts::upload_image))
        .route("/team", post(team::create))
        .route("/team/:id", put(team::update).patch(team::update))
        .route("/gallery", post(gallery::create))
        .route("/gallery/:id", patch(gallery::update))
        .route("/gallery/:id/photos", post(gallery::add_photos))
        .route_layer(DefaultBodyLimit::disable());

    guarded(records.merge(uploads), state, STAFF)
}

fn booking_reader_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new().route("/bookings", get(protected::bookings::list));
    guarded(router, state, BOOKING_READERS)
}

fn content_editor_routes(state: &AppState) -> Router<AppState> {
    use protected::content;

    let router = Router::new()
        .route("/content/contacts", put(content::contacts_put))
        .route("/content/:slug", put(content::update));
    guarded(router, state, CONTENT_EDITORS)
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    use protected::users;

    let router = Router::new()
        .route("/users", get(users::list).post(users::create))
        .route("/users/:id/role", patch(users::update_role))
        .route("/users/:id", axum::routing::delete(users::delete));
    guarded(router, state, ADMIN_ONLY)
}

/// Any signed-in role; the handler narrows to admin-or-self.
fn account_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new().route("/users/:id/reset-password", post(protected::users::reset_password));
    guarded(router, state, ANY_ROLE)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// A panicking handler answers 500 and arms a restart.
fn panic_responder(restart: RestartHandle) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone {
    move |err| {
        let detail = if let Some(s) = err.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = err.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "unknown panic payload".to_string()
        };
        restart.schedule(&format!("Handler panicked: {}", detail));
        ApiError::internal_server_error("Internal server error").into_response()
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("API route not found")
}
