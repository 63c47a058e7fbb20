//! # Error 模块
//!
//! 定义 tween-runtime 中使用的错误类型。

use thiserror::Error;

use crate::actions::{ControllerAction, HostMode};
use crate::traits::ObjectId;
use crate::tween::TweenId;

/// tween-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TweenError {
    /// 对象未注册
    #[error("对象 {object_id} 未注册")]
    ObjectNotRegistered { object_id: ObjectId },

    /// 对象类型不匹配
    #[error("对象 {object_id} 类型不匹配：期望 {expected}，实际 {actual}")]
    TypeMismatch {
        object_id: ObjectId,
        expected: &'static str,
        actual: &'static str,
    },

    /// 属性不存在
    #[error("对象 {object_id} 上不存在属性 '{property}'")]
    PropertyNotFound {
        object_id: ObjectId,
        property: String,
    },

    /// 没有任何轨道的 Tween
    #[error("Tween 至少需要一条属性轨道")]
    EmptyTween,

    /// 工厂返回了已结束的 Tween（复用了已释放的句柄）
    #[error("工厂返回的 Tween {id} 已结束，每次调用必须创建新的 Tween")]
    StaleTween { id: TweenId },

    /// 工厂创建 Tween 失败
    #[error("创建 Tween 失败: {message}")]
    Factory { message: String },

    /// 当前宿主模式不允许触发操作
    #[error("当前模式 {mode:?} 下无法触发 {action}")]
    ActionsDisabled {
        mode: HostMode,
        action: ControllerAction,
    },

    /// 操作面板中没有该目标
    #[error("操作面板中没有名为 '{name}' 的控制器")]
    UnknownTarget { name: String },

    /// 后台播放需要 tokio LocalSet
    #[error("play 必须在 tokio LocalSet 中调用")]
    NoLocalContext,
}

impl TweenError {
    /// 从任意错误信息构造工厂错误
    pub fn factory(message: impl Into<String>) -> Self {
        Self::Factory {
            message: message.into(),
        }
    }
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),

    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}

/// Result 类型别名
pub type TweenResult<T> = Result<T, TweenError>;
