//! # Actions 模块
//!
//! 面向宿主工具的手动触发入口（Ready / Play / Complete）。
//!
//! 只在宿主处于运行模式时可用，编辑模式下触发会返回
//! `TweenError::ActionsDisabled`。这一层只做转发，不参与控制器本身的状态管理。

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::controller::{TweenController, TweenFactory};
use crate::error::{TweenError, TweenResult};

/// 可手动触发的控制器操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerAction {
    Ready,
    Play,
    Complete,
}

impl ControllerAction {
    /// 所有操作（按面板显示顺序）
    pub const ALL: [ControllerAction; 3] = [Self::Ready, Self::Play, Self::Complete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Play => "play",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for ControllerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControllerAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ready" => Ok(Self::Ready),
            "play" => Ok(Self::Play),
            "complete" => Ok(Self::Complete),
            other => Err(format!("未知操作 '{other}'，可选值: ready, play, complete")),
        }
    }
}

/// 宿主模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostMode {
    /// 编辑中（操作不可用）
    #[default]
    Editing,
    /// 运行中
    Running,
}

/// 可被面板触发的目标
pub trait Triggerable {
    fn trigger(&self, action: ControllerAction) -> TweenResult<()>;
}

impl<F: TweenFactory> Triggerable for TweenController<F> {
    fn trigger(&self, action: ControllerAction) -> TweenResult<()> {
        match action {
            ControllerAction::Ready => self.ready(),
            ControllerAction::Play => {
                // 播放结果由后台任务记录
                self.try_play().map(|_| ())
            }
            ControllerAction::Complete => self.complete(),
        }
    }
}

/// 操作面板
///
/// 按名称登记控制器，宿主工具通过名称 + 操作触发。
#[derive(Default)]
pub struct ActionPanel {
    mode: HostMode,
    targets: Vec<(String, Rc<dyn Triggerable>)>,
}

impl fmt::Debug for ActionPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionPanel")
            .field("mode", &self.mode)
            .field("targets", &self.targets().collect::<Vec<_>>())
            .finish()
    }
}

impl ActionPanel {
    pub fn new(mode: HostMode) -> Self {
        Self {
            mode,
            targets: Vec::new(),
        }
    }

    /// 登记目标，同名目标会被替换
    pub fn register(&mut self, name: impl Into<String>, target: Rc<dyn Triggerable>) {
        let name = name.into();
        match self.targets.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = target,
            None => self.targets.push((name, target)),
        }
    }

    /// 当前宿主模式
    pub fn mode(&self) -> HostMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: HostMode) {
        self.mode = mode;
    }

    /// 操作当前是否可用
    pub fn is_enabled(&self) -> bool {
        self.mode == HostMode::Running
    }

    /// 已登记的目标名称
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|(name, _)| name.as_str())
    }

    /// 触发指定目标的操作
    pub fn invoke(&self, name: &str, action: ControllerAction) -> TweenResult<()> {
        if !self.is_enabled() {
            return Err(TweenError::ActionsDisabled {
                mode: self.mode,
                action,
            });
        }

        let (_, target) = self
            .targets
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| TweenError::UnknownTarget {
                name: name.to_string(),
            })?;

        debug!(controller = name, action = %action, "触发控制器操作");
        target.trigger(action)
    }
}
