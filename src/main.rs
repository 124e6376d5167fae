use std::sync::Arc;

use actix_web::web;
use dotenvy::dotenv;
use order_desk::config::Config;
use order_desk::infrastructure::item_repo::RestItemRepository;
use order_desk::infrastructure::order_repo::RestOrderRepository;
use order_desk::infrastructure::rest_client::RestClient;
use order_desk::spreadsheet::order_sheet::ExportOptions;
use order_desk::{build_server, AppState};

fn startup_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let client =
        RestClient::new(&config.supabase_url, &config.supabase_key).map_err(startup_error)?;
    let export = ExportOptions::new(config.export_item_columns, config.report_utc_offset_hours)
        .map_err(startup_error)?;

    let state = web::Data::new(AppState::new(
        Arc::new(RestItemRepository::new(client.clone())),
        Arc::new(RestOrderRepository::new(client)),
        config.suggestion_limit,
        export,
    ));

    log::info!("Using backend at {}", config.supabase_url);
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
