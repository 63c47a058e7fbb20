//! # Config 模块
//!
//! Tween 引擎与演示程序的配置。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (tween.json)
//! 3. 默认值（最低）

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::easing::EasingFunction;
use crate::error::ConfigError;

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweenConfig {
    /// 时间缩放（1.0 为正常速度）
    #[serde(default = "default_time_scale")]
    pub time_scale: f32,

    /// 构建轨道时的默认缓动函数
    #[serde(default)]
    pub default_easing: EasingFunction,

    /// 演示程序配置
    #[serde(default)]
    pub demo: DemoConfig,
}

/// 演示程序配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// 模拟帧率
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    /// 单次播放最多模拟的帧数
    #[serde(default = "default_max_frames")]
    pub max_frames: u32,

    /// 演示 Tween 的时长（秒）
    #[serde(default = "default_tween_duration")]
    pub tween_duration: f32,
}

fn default_time_scale() -> f32 {
    1.0
}

fn default_frame_rate() -> u32 {
    60
}

fn default_max_frames() -> u32 {
    600
}

fn default_tween_duration() -> f32 {
    0.5
}

impl Default for TweenConfig {
    fn default() -> Self {
        Self {
            time_scale: default_time_scale(),
            default_easing: EasingFunction::default(),
            demo: DemoConfig::default(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            max_frames: default_max_frames(),
            tween_duration: default_tween_duration(),
        }
    }
}

impl DemoConfig {
    /// 每帧时长（秒）
    pub fn frame_step(&self) -> f32 {
        1.0 / self.frame_rate.max(1) as f32
    }
}

impl TweenConfig {
    /// 加载配置文件
    ///
    /// 文件不存在、读取或解析失败时返回默认配置并输出警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = ?path, "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = ?path, "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(path = ?path, error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = ?path, error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(ConfigError::ValidationFailed(format!(
                "time_scale 必须是非负有限数，实际为 {}",
                self.time_scale
            )));
        }

        if self.demo.frame_rate == 0 {
            return Err(ConfigError::ValidationFailed(
                "demo.frame_rate 必须大于 0".to_string(),
            ));
        }

        if !self.demo.tween_duration.is_finite() || self.demo.tween_duration < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "demo.tween_duration 必须是非负有限数".to_string(),
            ));
        }

        Ok(())
    }
}
