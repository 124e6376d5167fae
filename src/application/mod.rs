pub mod catalog_service;
pub mod order_entry;
pub mod order_form;
pub mod report_service;
