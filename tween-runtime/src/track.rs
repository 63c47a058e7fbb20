//! # Track 模块
//!
//! 单条属性轨道：把一个对象的一个 f32 属性在时间轴上从 `from` 变化到 `to`。
//!
//! 轨道本身不保存播放状态，时间由所属的 `Tween` 统一推进。

use std::fmt;
use std::rc::Rc;

use crate::easing::EasingFunction;
use crate::traits::{Animatable, ObjectId};

/// 属性轨道
#[derive(Clone)]
pub struct Track {
    /// 目标对象 ID
    pub object_id: ObjectId,
    /// 属性名称
    pub property_id: &'static str,
    /// 起始值
    pub from: f32,
    /// 目标值
    pub to: f32,
    /// 时长（秒）
    pub duration: f32,
    /// 相对 Tween 开始的延迟（秒）
    pub delay: f32,
    /// 缓动函数
    pub easing: EasingFunction,
    target: Rc<dyn Animatable>,
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("object_id", &self.object_id)
            .field("property_id", &self.property_id)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("easing", &self.easing)
            .finish()
    }
}

impl Track {
    pub(crate) fn new(
        target: Rc<dyn Animatable>,
        object_id: ObjectId,
        property_id: &'static str,
        from: f32,
        to: f32,
        duration: f32,
    ) -> Self {
        Self {
            object_id,
            property_id,
            from,
            to,
            duration: duration.max(0.0),
            delay: 0.0,
            easing: EasingFunction::default(),
            target,
        }
    }

    /// 轨道结束的时间点（延迟 + 时长）
    pub fn end_time(&self) -> f32 {
        self.delay + self.duration
    }

    /// 在 Tween 时间 `elapsed` 处的属性值
    ///
    /// 延迟期间保持 `from`；时长为 0 的轨道在延迟结束后直接跳到 `to`。
    pub fn sample(&self, elapsed: f32) -> f32 {
        let local = elapsed - self.delay;
        if local < 0.0 {
            return self.from;
        }
        if self.duration <= 0.0 || local >= self.duration {
            return self.to;
        }
        let progress = self.easing.apply(local / self.duration);
        self.from + (self.to - self.from) * progress
    }

    /// 把 `elapsed` 处的值写入目标对象
    pub(crate) fn apply(&self, elapsed: f32) {
        self.target.set_property(self.property_id, self.sample(elapsed));
    }

    /// 写入起始值
    pub(crate) fn apply_start(&self) {
        self.target.set_property(self.property_id, self.from);
    }

    /// 写入最终值
    pub(crate) fn apply_end(&self) {
        self.target.set_property(self.property_id, self.to);
    }
}
