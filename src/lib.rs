#![forbid(unsafe_code)]

pub mod app;
pub mod check;
pub mod cli;
pub mod cover;
pub mod export;
pub mod formats;
pub mod html;
pub mod library;
pub mod logging;
pub mod preview;
pub mod rating;
pub mod recommend;
pub mod share;
pub mod store;
pub mod views;
