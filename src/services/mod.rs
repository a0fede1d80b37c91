//! 业务服务层

pub mod session_service;

pub use session_service::SessionService;
