// 错误处理模块
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("验证错误: {0}")]
    ValidationError(String),

    #[error("未找到: {0}")]
    NotFound(String),

    #[error("业务错误: {0}")]
    BusinessError(String),

    #[error("内部服务器错误: {0}")]
    InternalServerError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn database_error(msg: impl Into<String>) -> Self {
        AppError::DatabaseError(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AppError::ConfigError(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn business(msg: impl Into<String>) -> Self {
        AppError::BusinessError(msg.into())
    }

    pub fn unknown(msg: impl Into<String>) -> Self {
        AppError::InternalServerError(msg.into())
    }

    /// 错误对应的业务码（与 R 响应中的 code 一致）
    pub fn code(&self) -> u16 {
        match self {
            AppError::ValidationError(_) => 400,
            AppError::NotFound(_) => 404,
            AppError::BusinessError(_) => 500,
            AppError::DatabaseError(_)
            | AppError::ConfigError(_)
            | AppError::InternalServerError(_) => 500,
        }
    }
}

// 从 rbatis 错误转换 (rbatis::Error 包含了 rbdc::Error)
impl From<rbatis::Error> for AppError {
    fn from(err: rbatis::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

// 统一错误响应格式, 与 response::R 保持一致
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = serde_json::json!({
            "code": self.code(),
            "msg": self.to_string(),
        });
        HttpResponse::build(self.status_code()).json(body)
    }
}
