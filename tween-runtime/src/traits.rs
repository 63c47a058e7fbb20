//! # Traits 模块
//!
//! Tween 引擎与被动画对象之间的接口。
//!
//! ## 核心概念
//!
//! - `ObjectId`: 由 TweenEngine 分配的唯一对象标识符
//! - `Animatable`: 可动画对象接口

/// 对象唯一标识符
///
/// 由 `TweenEngine` 在对象注册时分配，保证在同一引擎内唯一。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    /// 创建新的对象 ID（仅供 TweenEngine 内部使用）
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

/// 可动画对象接口
///
/// 对象通过实现此 trait 声明自己有哪些 f32 属性可以被 Tween 驱动。
/// 写入通过 `&self` 完成，对象自己负责内部可变性（通常是 `Cell` / `RefCell`）。
///
/// ## 实现示例
///
/// ```rust,ignore
/// struct Panel {
///     alpha: Cell<f32>,
/// }
///
/// impl Animatable for Panel {
///     fn get_property(&self, property_id: &str) -> Option<f32> {
///         match property_id {
///             "alpha" => Some(self.alpha.get()),
///             _ => None,
///         }
///     }
///
///     fn set_property(&self, property_id: &str, value: f32) -> bool {
///         match property_id {
///             "alpha" => { self.alpha.set(value); true }
///             _ => false,
///         }
///     }
///
///     fn property_list(&self) -> &'static [&'static str] {
///         &["alpha"]
///     }
/// }
/// ```
pub trait Animatable: 'static {
    /// 获取属性的当前值，属性不存在时返回 `None`
    fn get_property(&self, property_id: &str) -> Option<f32>;

    /// 设置属性的新值
    ///
    /// # 返回
    /// - `true`: 设置成功
    /// - `false`: 属性不存在或设置失败
    fn set_property(&self, property_id: &str, value: f32) -> bool;

    /// 获取所有可动画属性的列表
    ///
    /// 用于调试和验证。
    fn property_list(&self) -> &'static [&'static str];
}
