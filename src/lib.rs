pub mod api;
pub mod app;
pub mod cv;
pub mod form;
pub mod ui;
pub mod utils;
