//! # Engine 模块
//!
//! Tween 引擎：注册可动画对象、创建 Tween、逐帧推进。
//!
//! ```rust,ignore
//! let engine = TweenEngine::new();
//! let panel_id = engine.register(panel.clone());
//!
//! let tween = engine
//!     .tween()
//!     .property::<Panel>(panel_id, "alpha", 0.0, 1.0, 0.3)?
//!     .property::<Panel>(panel_id, "offset_y", 40.0, 0.0, 0.3)?
//!     .easing(EasingFunction::EaseOutQuad)
//!     .start()?;
//!
//! // 每帧
//! for event in engine.update(dt) { /* ... */ }
//! ```
//!
//! 引擎句柄可以廉价克隆，所有克隆共享同一份状态。

use std::any::{TypeId, type_name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::config::TweenConfig;
use crate::easing::EasingFunction;
use crate::error::{TweenError, TweenResult};
use crate::track::Track;
use crate::traits::{Animatable, ObjectId};
use crate::tween::{Tween, TweenId, TweenState};

/// Tween 事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenEvent {
    /// Tween 开始
    Started(TweenId),
    /// Tween 到达终点（自然结束或被 complete）
    Completed(TweenId),
    /// Tween 被终止
    Killed(TweenId),
}

/// 已注册的可动画对象
struct RegisteredObject {
    object: Rc<dyn Animatable>,
    type_id: TypeId,
    type_name: &'static str,
}

struct EngineInner {
    objects: HashMap<ObjectId, RegisteredObject>,
    tweens: Vec<Tween>,
    events: Vec<TweenEvent>,
    next_tween_id: u64,
    next_object_id: u64,
    time_scale: f32,
    default_easing: EasingFunction,
}

/// Tween 引擎
#[derive(Clone)]
pub struct TweenEngine {
    inner: Rc<RefCell<EngineInner>>,
}

impl Default for TweenEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TweenEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TweenEngine")
            .field("objects", &inner.objects.len())
            .field("tweens", &inner.tweens.len())
            .field("time_scale", &inner.time_scale)
            .finish()
    }
}

impl TweenEngine {
    /// 使用默认配置创建引擎
    pub fn new() -> Self {
        Self::with_config(&TweenConfig::default())
    }

    /// 使用指定配置创建引擎
    pub fn with_config(config: &TweenConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EngineInner {
                objects: HashMap::new(),
                tweens: Vec::new(),
                events: Vec::new(),
                next_tween_id: 1,
                next_object_id: 1,
                time_scale: config.time_scale,
                default_easing: config.default_easing,
            })),
        }
    }

    // ========== 对象管理 ==========

    /// 注册可动画对象，返回引擎分配的唯一 `ObjectId`
    pub fn register<T: Animatable>(&self, object: Rc<T>) -> ObjectId {
        let mut inner = self.inner.borrow_mut();
        let id = ObjectId::new(inner.next_object_id);
        inner.next_object_id += 1;
        inner.objects.insert(
            id,
            RegisteredObject {
                object: object as Rc<dyn Animatable>,
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
            },
        );
        id
    }

    /// 注销对象，并终止所有作用于它的 Tween
    pub fn unregister(&self, object_id: ObjectId) {
        let tweens = {
            let mut inner = self.inner.borrow_mut();
            inner.objects.remove(&object_id);
            inner.tweens.clone()
        };
        for tween in tweens.iter().filter(|t| t.targets_object(object_id)) {
            tween.kill();
        }
    }

    /// 检查对象是否已注册
    pub fn is_registered(&self, object_id: ObjectId) -> bool {
        self.inner.borrow().objects.contains_key(&object_id)
    }

    /// 已注册对象数量
    pub fn registered_count(&self) -> usize {
        self.inner.borrow().objects.len()
    }

    /// 查找对象并校验类型与属性
    fn resolve<T: 'static>(
        &self,
        object_id: ObjectId,
        property_id: &str,
    ) -> TweenResult<Rc<dyn Animatable>> {
        let inner = self.inner.borrow();
        let registered = inner
            .objects
            .get(&object_id)
            .ok_or(TweenError::ObjectNotRegistered { object_id })?;

        if registered.type_id != TypeId::of::<T>() {
            return Err(TweenError::TypeMismatch {
                object_id,
                expected: type_name::<T>(),
                actual: registered.type_name,
            });
        }

        if registered.object.get_property(property_id).is_none() {
            return Err(TweenError::PropertyNotFound {
                object_id,
                property: property_id.to_string(),
            });
        }

        Ok(registered.object.clone())
    }

    // ========== Tween 创建 ==========

    /// 开始构建一个多轨道 Tween
    pub fn tween(&self) -> TweenBuilder {
        TweenBuilder {
            engine: self.clone(),
            tracks: Vec::new(),
        }
    }

    /// 创建并启动单属性 Tween
    pub fn to<T: 'static>(
        &self,
        object_id: ObjectId,
        property_id: &'static str,
        from: f32,
        to: f32,
        duration: f32,
    ) -> TweenResult<Tween> {
        self.tween()
            .property::<T>(object_id, property_id, from, to, duration)?
            .start()
    }

    fn spawn(&self, tracks: Vec<Track>) -> Tween {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = TweenId(inner.next_tween_id);
            inner.next_tween_id += 1;
            id
        };

        // 写入起始值时不持有引擎借用
        let tween = Tween::start(id, tracks);
        debug!(tween = %id, duration = tween.duration(), "Tween 开始");

        let mut inner = self.inner.borrow_mut();
        inner.tweens.push(tween.clone());
        inner.events.push(TweenEvent::Started(id));
        tween
    }

    // ========== 帧更新 ==========

    /// 推进所有播放中的 Tween
    ///
    /// `dt` 会乘以 `time_scale`。绑定宿主已销毁的 Tween 会被终止。
    ///
    /// # 返回
    /// 自上次更新以来产生的事件
    pub fn update(&self, dt: f32) -> Vec<TweenEvent> {
        let (tweens, scaled_dt) = {
            let inner = self.inner.borrow();
            (inner.tweens.clone(), dt * inner.time_scale)
        };

        for tween in &tweens {
            if tween.link_cancelled() {
                debug!(tween = %tween.id(), "宿主已销毁，终止 Tween");
                tween.kill();
                continue;
            }
            tween.advance(scaled_dt);
        }

        let mut inner = self.inner.borrow_mut();
        let mut events = std::mem::take(&mut inner.events);
        inner.tweens.retain(|tween| match tween.state() {
            TweenState::Completed => {
                events.push(TweenEvent::Completed(tween.id()));
                false
            }
            TweenState::Killed => {
                events.push(TweenEvent::Killed(tween.id()));
                false
            }
            TweenState::Playing | TweenState::Paused => true,
        });
        events
    }

    /// 立即完成所有活跃的 Tween
    pub fn complete_all(&self) {
        for tween in self.snapshot() {
            tween.complete();
        }
    }

    /// 立即终止所有活跃的 Tween
    pub fn kill_all(&self) {
        for tween in self.snapshot() {
            tween.kill();
        }
    }

    fn snapshot(&self) -> Vec<Tween> {
        self.inner.borrow().tweens.clone()
    }

    // ========== 查询方法 ==========

    /// 是否有活跃（播放或暂停）的 Tween
    pub fn has_active_tweens(&self) -> bool {
        self.inner.borrow().tweens.iter().any(Tween::is_active)
    }

    /// 是否有作用于指定对象的活跃 Tween
    pub fn has_object_tweens(&self, object_id: ObjectId) -> bool {
        self.inner
            .borrow()
            .tweens
            .iter()
            .any(|t| t.is_active() && t.targets_object(object_id))
    }

    /// 活跃 Tween 数量
    pub fn active_count(&self) -> usize {
        self.inner
            .borrow()
            .tweens
            .iter()
            .filter(|t| t.is_active())
            .count()
    }

    /// 获取对象属性的当前值
    pub fn get_object_property<T: 'static>(
        &self,
        object_id: ObjectId,
        property_id: &str,
    ) -> Option<f32> {
        let inner = self.inner.borrow();
        let registered = inner.objects.get(&object_id)?;
        if registered.type_id != TypeId::of::<T>() {
            return None;
        }
        registered.object.get_property(property_id)
    }

    /// 时间缩放
    pub fn time_scale(&self) -> f32 {
        self.inner.borrow().time_scale
    }

    /// 设置时间缩放（负数按 0 处理）
    pub fn set_time_scale(&self, time_scale: f32) {
        self.inner.borrow_mut().time_scale = time_scale.max(0.0);
    }

    /// 终止并丢弃所有 Tween 与未读取的事件
    ///
    /// 已注册的对象保留。
    pub fn clear(&self) {
        self.kill_all();
        let mut inner = self.inner.borrow_mut();
        inner.tweens.clear();
        inner.events.clear();
    }
}

/// 多轨道 Tween 构建器
///
/// `easing` / `delay` 作用于最近添加的轨道。
#[must_use = "TweenBuilder 需要调用 start() 才会创建 Tween"]
pub struct TweenBuilder {
    engine: TweenEngine,
    tracks: Vec<Track>,
}

impl TweenBuilder {
    /// 添加一条属性轨道
    pub fn property<T: 'static>(
        mut self,
        object_id: ObjectId,
        property_id: &'static str,
        from: f32,
        to: f32,
        duration: f32,
    ) -> TweenResult<Self> {
        let target = self.engine.resolve::<T>(object_id, property_id)?;
        let mut track = Track::new(target, object_id, property_id, from, to, duration);
        track.easing = self.engine.inner.borrow().default_easing;
        self.tracks.push(track);
        Ok(self)
    }

    /// 设置最近一条轨道的缓动函数
    pub fn easing(mut self, easing: EasingFunction) -> Self {
        if let Some(track) = self.tracks.last_mut() {
            track.easing = easing;
        }
        self
    }

    /// 设置最近一条轨道的延迟
    pub fn delay(mut self, delay: f32) -> Self {
        if let Some(track) = self.tracks.last_mut() {
            track.delay = delay.max(0.0);
        }
        self
    }

    /// 创建并启动 Tween，立即写入所有轨道的起始值
    pub fn start(self) -> TweenResult<Tween> {
        if self.tracks.is_empty() {
            return Err(TweenError::EmptyTween);
        }
        Ok(self.engine.spawn(self.tracks))
    }
}
