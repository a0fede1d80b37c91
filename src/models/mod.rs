//! 数据模型模块
//! 用户账户、认证 DTO 与观看历史的投影模型

pub mod auth;
pub mod user;
pub mod video;
