pub mod application;
pub mod config;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod spreadsheet;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::catalog_service::CatalogService;
use application::order_entry::OrderEntryService;
use application::report_service::ReportService;
use domain::ports::{ItemRepository, OrderRepository};
use handlers::ApiDoc;
use spreadsheet::order_sheet::ExportOptions;

/// The three services every request handler works with.
pub struct AppState {
    pub catalog: CatalogService,
    pub order_entry: OrderEntryService,
    pub reports: ReportService,
    /// Business time zone; decides what "today" is for new orders.
    pub utc_offset: FixedOffset,
}

impl AppState {
    pub fn new(
        items: Arc<dyn ItemRepository>,
        orders: Arc<dyn OrderRepository>,
        suggestion_limit: usize,
        export: ExportOptions,
    ) -> Self {
        Self {
            catalog: CatalogService::new(items.clone()),
            order_entry: OrderEntryService::new(items, orders.clone(), suggestion_limit),
            reports: ReportService::new(orders, export),
            utc_offset: export.utc_offset,
        }
    }

    pub fn today(&self) -> NaiveDate {
        local_date(Utc::now(), self.utc_offset)
    }
}

/// Calendar date of `now` at `offset`.
pub fn local_date(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: web::Data<AppState>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = ApiDoc::openapi();
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
