//! Backend for a body-angle tracking app: accounts, session tokens,
//! per-user angle measurements, goals and progress-photo uploads.

pub mod angles;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod goal;
pub mod images;
pub mod state;
pub mod storage;
