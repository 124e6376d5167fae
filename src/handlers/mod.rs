pub mod items;
pub mod order_form;
pub mod orders;

use std::str::FromStr;

use actix_web::http::header::{
    Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use utoipa::OpenApi;

use crate::errors::AppError;
use crate::spreadsheet::{SpreadsheetFile, XLSX_CONTENT_TYPE};

/// Upper bound for uploaded catalog workbooks.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        items::list_items,
        items::create_item,
        items::update_item,
        items::set_active,
        items::delete_item,
        items::export_items,
        items::import_items,
        order_form::catalog,
        order_form::suggestions,
        orders::create_order,
        orders::list_orders,
        orders::export_orders,
        orders::export_order,
        orders::complete_order,
    ),
    tags(
        (name = "items", description = "Item catalog"),
        (name = "order-form", description = "Order entry lookups"),
        (name = "orders", description = "Order entry and reports"),
    )
)]
pub struct ApiDoc;

/// Registers every route. Literal segments come before `{id}` captures.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
        .service(
            web::scope("/items")
                .route("", web::get().to(items::list_items))
                .route("", web::post().to(items::create_item))
                .route("/export", web::get().to(items::export_items))
                .route("/import", web::post().to(items::import_items))
                .route("/{id}", web::patch().to(items::update_item))
                .route("/{id}", web::delete().to(items::delete_item))
                .route("/{id}/active", web::put().to(items::set_active)),
        )
        .service(
            web::scope("/order-form")
                .route("/catalog", web::get().to(order_form::catalog))
                .route("/suggestions", web::get().to(order_form::suggestions)),
        )
        .service(
            web::scope("/orders")
                .route("", web::post().to(orders::create_order))
                .route("", web::get().to(orders::list_orders))
                .route("/export", web::get().to(orders::export_orders))
                .route("/{id}/export", web::get().to(orders::export_order))
                .route("/{id}/complete", web::post().to(orders::complete_order)),
        );
}

pub(crate) fn parse_decimal(field: &str, value: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(value.trim())
        .map_err(|_| AppError::BadRequest(format!("{field} must be a decimal number, got '{value}'")))
}

/// Sends a workbook as a download, keeping non-ASCII file names intact.
pub(crate) fn xlsx_download(file: SpreadsheetFile) -> HttpResponse {
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext("UTF-8".to_string()),
            language_tag: None,
            value: file.filename.into_bytes(),
        })],
    };
    HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header(disposition)
        .body(file.bytes)
}
