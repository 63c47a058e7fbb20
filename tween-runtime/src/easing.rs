//! # Easing 模块
//!
//! 缓动曲线，把线性时间进度映射为插值进度。

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// 缓动函数类型
///
/// 配置文件里使用 snake_case 名称，例如 `"ease_out_quad"`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// 线性（匀速）
    Linear,
    /// 缓入（三次）
    EaseIn,
    /// 缓出（三次）
    EaseOut,
    /// 缓入缓出（三次）
    #[default]
    EaseInOut,
    /// 二次缓入
    EaseInQuad,
    /// 二次缓出
    EaseOutQuad,
    /// 二次缓入缓出
    EaseInOutQuad,
    /// 正弦缓入
    EaseInSine,
    /// 正弦缓出
    EaseOutSine,
    /// 正弦缓入缓出
    EaseInOutSine,
    /// 回拉缓出（略微越过终点再回来）
    EaseOutBack,
    /// 弹性缓出
    EaseOutElastic,
    /// 弹跳缓出
    EaseOutBounce,
}

impl EasingFunction {
    /// 计算缓动值
    ///
    /// 输入会被限制在 `[0.0, 1.0]`，`apply(0.0) == 0.0`，`apply(1.0) == 1.0`。
    /// 中间值允许越界（Back / Elastic）。
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseIn => power_in(t, 3),
            Self::EaseOut => power_out(t, 3),
            Self::EaseInOut => power_in_out(t, 3),
            Self::EaseInQuad => power_in(t, 2),
            Self::EaseOutQuad => power_out(t, 2),
            Self::EaseInOutQuad => power_in_out(t, 2),
            Self::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            Self::EaseOutSine => (t * PI / 2.0).sin(),
            Self::EaseInOutSine => (1.0 - (PI * t).cos()) / 2.0,
            Self::EaseOutBack => back_out(t),
            Self::EaseOutElastic => elastic_out(t),
            Self::EaseOutBounce => bounce_out(t),
        }
    }
}

fn power_in(t: f32, exp: i32) -> f32 {
    t.powi(exp)
}

fn power_out(t: f32, exp: i32) -> f32 {
    1.0 - (1.0 - t).powi(exp)
}

fn power_in_out(t: f32, exp: i32) -> f32 {
    if t < 0.5 {
        2f32.powi(exp - 1) * t.powi(exp)
    } else {
        1.0 - (2.0 - 2.0 * t).powi(exp) / 2.0
    }
}

fn back_out(t: f32) -> f32 {
    const OVERSHOOT: f32 = 1.70158;
    let u = t - 1.0;
    1.0 + (OVERSHOOT + 1.0) * u.powi(3) + OVERSHOOT * u.powi(2)
}

fn elastic_out(t: f32) -> f32 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    let period = (2.0 * PI) / 3.0;
    2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * period).sin() + 1.0
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;

    // (段起点偏移, 段顶点高度)
    let (offset, floor) = if t < 1.0 / D {
        return N * t * t;
    } else if t < 2.0 / D {
        (1.5, 0.75)
    } else if t < 2.5 / D {
        (2.25, 0.9375)
    } else {
        (2.625, 0.984375)
    };
    let t = t - offset / D;
    N * t * t + floor
}
