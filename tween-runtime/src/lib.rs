//! # Tween Runtime
//!
//! 单个 Tween 演出的生命周期管理：准备、异步播放、强制完成。
//!
//! ## 架构概述
//!
//! ```text
//!  宿主工具 ──► ActionPanel ──► TweenController ──► TweenFactory::play_core()
//!                                    │                     │
//!                                    │ wait / cancel       ▼
//!                 Owner ──token──►   │                TweenEngine ──update(dt)──► Animatable
//!                                    ▼
//!                                  Tween
//! ```
//!
//! - 具体演出实现 [`TweenFactory`]，描述一次完整的动画
//! - [`TweenController`] 保证同一时间只持有一个 Tween，播放结束后自动复位
//! - [`TweenEngine`] 由宿主每帧调用 `update(dt)` 推进所有 Tween
//! - [`Owner`] 销毁时，正在等待的播放以 [`PlayOutcome::Cancelled`] 结束
//!
//! ## 使用示例
//!
//! ```ignore
//! struct FadeIn { panel: ObjectId }
//!
//! impl TweenFactory for FadeIn {
//!     fn play_core(&self, engine: &TweenEngine) -> TweenResult<Tween> {
//!         engine.to::<Panel>(self.panel, "alpha", 0.0, 1.0, 0.3)
//!     }
//! }
//!
//! let controller = TweenController::new(FadeIn { panel }, engine.clone(), owner.token());
//! controller.ready()?;
//! let outcome = controller.play_async().await?;
//! ```
//!
//! ## 模块结构
//!
//! - [`controller`]：生命周期控制器与工厂 trait
//! - [`tween`]：Tween 句柄、状态与取消行为
//! - [`engine`]：对象注册、Tween 构建与帧更新
//! - [`track`]：单属性轨道
//! - [`easing`]：缓动函数
//! - [`lifetime`]：宿主对象与取消令牌
//! - [`actions`]：宿主工具触发入口
//! - [`config`]：配置
//! - [`error`]：错误类型

pub mod actions;
pub mod config;
pub mod controller;
pub mod easing;
pub mod engine;
pub mod error;
pub mod lifetime;
pub mod track;
pub mod traits;
pub mod tween;

// 重导出核心类型
pub use actions::{ActionPanel, ControllerAction, HostMode, Triggerable};
pub use config::{DemoConfig, TweenConfig};
pub use controller::{ControllerPhase, TweenController, TweenFactory};
pub use easing::EasingFunction;
pub use engine::{TweenBuilder, TweenEngine, TweenEvent};
pub use error::{ConfigError, TweenError, TweenResult};
pub use lifetime::{Owner, OwnerToken};
pub use track::Track;
pub use traits::{Animatable, ObjectId};
pub use tween::{CancelBehaviour, PlayOutcome, Tween, TweenId, TweenState};
