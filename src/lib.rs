//! 用户账户后端库
//! 注册、凭证验证与刷新令牌轮换的会话续期

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod storage;
pub mod telemetry;
