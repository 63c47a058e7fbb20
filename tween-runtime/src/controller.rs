//! # Controller 模块
//!
//! 管理单个 Tween 的准备、播放与完成。
//!
//! ## 生命周期
//!
//! ```text
//!          ready()              play() / play_async()
//!   Idle ──────────► Prepared ─────────────────────► Playing
//!    ▲  │                │                              │
//!    │  └─ complete() ───┴───────── complete() ─────────┤
//!    │                                                  │
//!    └──────────── 播放结束 / 宿主销毁（Cancelled） ◄───┘
//! ```
//!
//! 控制器同一时间最多持有一个 Tween。一轮播放结束后引用会被清空，
//! 下一次 `play_async()` 从干净的 Idle 状态开始。
//!
//! 所有操作运行在单线程协作式调度上：`Tween` 基于 `Rc`，
//! `play()` 使用 `spawn_local`，必须在 `tokio::task::LocalSet` 中调用。
//! 同一个控制器上并发的两次 `play_async()` 不受支持，调用方需要串行化。

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::engine::TweenEngine;
use crate::error::{TweenError, TweenResult};
use crate::lifetime::OwnerToken;
use crate::tween::{CancelBehaviour, PlayOutcome, Tween, TweenState};

/// Tween 工厂
///
/// 由具体的演出组件实现，描述一次完整的动画。
pub trait TweenFactory: 'static {
    /// 创建一个新的、已启动但尚未推进的 Tween
    ///
    /// 每次调用都必须返回新的 Tween，控制器会在多轮播放中反复调用。
    fn play_core(&self, engine: &TweenEngine) -> TweenResult<Tween>;
}

/// 控制器当前所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    /// 未持有 Tween
    Idle,
    /// 持有已暂停在起始状态的 Tween
    Prepared,
    /// 持有播放中的 Tween
    Playing,
}

/// Tween 生命周期控制器
///
/// 克隆得到的控制器共享同一个 Tween 槽位。
pub struct TweenController<F: TweenFactory> {
    factory: Rc<F>,
    engine: TweenEngine,
    owner: OwnerToken,
    current: Rc<RefCell<Option<Tween>>>,
}

impl<F: TweenFactory> Clone for TweenController<F> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            engine: self.engine.clone(),
            owner: self.owner.clone(),
            current: self.current.clone(),
        }
    }
}

impl<F: TweenFactory> std::fmt::Debug for TweenController<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenController")
            .field("phase", &self.phase())
            .field("current", &self.current.borrow().as_ref().map(Tween::id))
            .finish()
    }
}

impl<F: TweenFactory> TweenController<F> {
    /// 创建控制器
    ///
    /// # 参数
    /// - `factory`: 描述动画的工厂
    /// - `engine`: 驱动 Tween 的引擎
    /// - `owner`: 宿主对象的生命周期令牌
    pub fn new(factory: F, engine: TweenEngine, owner: OwnerToken) -> Self {
        Self {
            factory: Rc::new(factory),
            engine,
            owner,
            current: Rc::new(RefCell::new(None)),
        }
    }

    /// 工厂
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// 宿主生命周期令牌
    pub fn owner(&self) -> &OwnerToken {
        &self.owner
    }

    /// 当前持有的 Tween
    pub fn current(&self) -> Option<Tween> {
        self.current.borrow().clone()
    }

    /// 当前阶段
    pub fn phase(&self) -> ControllerPhase {
        match self.current.borrow().as_ref().map(Tween::state) {
            Some(TweenState::Paused) => ControllerPhase::Prepared,
            Some(TweenState::Playing) => ControllerPhase::Playing,
            Some(TweenState::Completed | TweenState::Killed) | None => ControllerPhase::Idle,
        }
    }

    /// 准备
    ///
    /// 已有 Tween 时先强制完成并丢弃，然后创建新的 Tween 并立即暂停，
    /// 让 Tween 开始前的状态生效且不推进时间。
    pub fn ready(&self) -> TweenResult<()> {
        let previous = self.current.borrow_mut().take();
        if let Some(previous) = previous {
            debug!(tween = %previous.id(), "ready: 完成上一个 Tween");
            previous.complete();
        }

        let tween = self.create()?;
        tween.pause();
        debug!(tween = %tween.id(), "ready: Tween 已暂停在起始状态");
        *self.current.borrow_mut() = Some(tween);
        Ok(())
    }

    /// 播放（不等待结果）
    ///
    /// 在当前 `LocalSet` 上启动 `play_async()`，结果只记录日志。
    /// 返回的 `JoinHandle` 可以直接丢弃。
    ///
    /// # Panics
    /// 不在 `LocalSet` 中调用时 panic，见 [`Self::try_play`]。
    pub fn play(&self) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::task::spawn_local(async move {
            match controller.play_async().await {
                Ok(outcome) => debug!(outcome = ?outcome, "play: 播放结束"),
                Err(e) => error!(error = %e, "play: 播放失败"),
            }
        })
    }

    /// 播放（不等待结果），不在 `LocalSet` 中时返回错误
    ///
    /// tokio 没有公开查询当前 `LocalSet` 的接口，只能捕获 `spawn_local` 的 panic。
    /// 捕获前 panic 信息仍会经过全局 panic hook。
    pub fn try_play(&self) -> TweenResult<JoinHandle<()>> {
        panic::catch_unwind(AssertUnwindSafe(|| self.play())).map_err(|_| {
            error!("play: 当前不在 LocalSet 中");
            TweenError::NoLocalContext
        })
    }

    /// 播放并等待结束
    ///
    /// `ready()` 过且仍然活跃的 Tween 从暂停处恢复，否则新建一个 Tween 直接开始。
    /// 宿主在播放中被销毁时，Tween 被终止，结果为 `PlayOutcome::Cancelled`。
    /// 无论结果如何，结束后都会清空持有的 Tween。
    pub async fn play_async(&self) -> TweenResult<PlayOutcome> {
        // 槽位里已结束的 Tween（如宿主销毁后被引擎终止）视同没有
        let prepared = self.current.borrow().clone().filter(Tween::is_active);
        let tween = match prepared {
            Some(tween) => {
                debug!(tween = %tween.id(), "play: 恢复已准备的 Tween");
                tween.play();
                tween
            }
            None => {
                let tween = self.create()?;
                debug!(tween = %tween.id(), "play: 创建并开始 Tween");
                *self.current.borrow_mut() = Some(tween.clone());
                tween
            }
        };

        let outcome = tween
            .wait_with_cancellation(&self.owner, CancelBehaviour::KillAndCancelAwait)
            .await;

        // 等待期间 ready() 可能已经换上了新的 Tween，只清掉自己等待的那个
        let mut current = self.current.borrow_mut();
        if current.as_ref().is_some_and(|t| t.id() == tween.id()) {
            *current = None;
        }
        debug!(tween = %tween.id(), outcome = ?outcome, "play: 等待结束");
        Ok(outcome)
    }

    /// 完成
    ///
    /// 没有活跃的 Tween 时先创建一个，然后立即跳到终点并清空引用。
    pub fn complete(&self) -> TweenResult<()> {
        let existing = self.current.borrow_mut().take().filter(Tween::is_active);
        let tween = match existing {
            Some(tween) => tween,
            None => self.create()?,
        };
        tween.complete();
        debug!(tween = %tween.id(), "complete: Tween 已跳到终点");
        Ok(())
    }

    /// 通过工厂创建 Tween，并绑定到宿主生命周期
    fn create(&self) -> TweenResult<Tween> {
        let tween = self.factory.play_core(&self.engine)?;
        if tween.is_finished() {
            return Err(TweenError::StaleTween { id: tween.id() });
        }
        tween.set_link(&self.owner);
        Ok(tween)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TweenConfig;
    use crate::easing::EasingFunction;
    use crate::lifetime::Owner;
    use crate::traits::{Animatable, ObjectId};
    use std::cell::Cell;

    struct Banner {
        alpha: Cell<f32>,
    }

    impl Animatable for Banner {
        fn get_property(&self, property_id: &str) -> Option<f32> {
            (property_id == "alpha").then(|| self.alpha.get())
        }

        fn set_property(&self, property_id: &str, value: f32) -> bool {
            if property_id != "alpha" {
                return false;
            }
            self.alpha.set(value);
            true
        }

        fn property_list(&self) -> &'static [&'static str] {
            &["alpha"]
        }
    }

    struct FadeIn {
        banner: ObjectId,
        created: Cell<u32>,
    }

    impl TweenFactory for FadeIn {
        fn play_core(&self, engine: &TweenEngine) -> TweenResult<Tween> {
            self.created.set(self.created.get() + 1);
            engine.to::<Banner>(self.banner, "alpha", 0.0, 1.0, 1.0)
        }
    }

    struct Fixture {
        engine: TweenEngine,
        banner: Rc<Banner>,
        owner: Owner,
        controller: TweenController<FadeIn>,
    }

    fn fixture() -> Fixture {
        let engine = TweenEngine::with_config(&TweenConfig {
            default_easing: EasingFunction::Linear,
            ..TweenConfig::default()
        });
        let banner = Rc::new(Banner {
            alpha: Cell::new(0.5),
        });
        let banner_id = engine.register(banner.clone());
        let owner = Owner::new("banner");
        let controller = TweenController::new(
            FadeIn {
                banner: banner_id,
                created: Cell::new(0),
            },
            engine.clone(),
            owner.token(),
        );
        Fixture {
            engine,
            banner,
            owner,
            controller,
        }
    }

    async fn drive(engine: &TweenEngine, frames: usize, dt: f32) {
        for _ in 0..frames {
            tokio::task::yield_now().await;
            engine.update(dt);
        }
    }

    #[test]
    fn test_ready_pauses_at_start() {
        let f = fixture();
        f.controller.ready().unwrap();

        assert_eq!(f.controller.phase(), ControllerPhase::Prepared);
        assert_eq!(f.banner.alpha.get(), 0.0);

        f.engine.update(0.5);
        assert_eq!(f.banner.alpha.get(), 0.0);
    }

    #[test]
    fn test_ready_twice_completes_previous() {
        let f = fixture();
        f.controller.ready().unwrap();
        let first = f.controller.current().unwrap();

        f.controller.ready().unwrap();
        let second = f.controller.current().unwrap();

        assert_eq!(first.state(), TweenState::Completed);
        assert_ne!(first.id(), second.id());
        assert_eq!(second.state(), TweenState::Paused);
        assert_eq!(f.banner.alpha.get(), 0.0);
        assert_eq!(f.controller.factory().created.get(), 2);
    }

    #[test]
    fn test_complete_without_tween_creates_one() {
        let f = fixture();
        f.controller.complete().unwrap();

        assert_eq!(f.banner.alpha.get(), 1.0);
        assert!(f.controller.current().is_none());
        assert_eq!(f.controller.phase(), ControllerPhase::Idle);
        assert_eq!(f.controller.factory().created.get(), 1);
    }

    #[test]
    fn test_complete_after_ready_reuses_prepared_tween() {
        let f = fixture();
        f.controller.ready().unwrap();
        let prepared = f.controller.current().unwrap();

        f.controller.complete().unwrap();
        assert_eq!(prepared.state(), TweenState::Completed);
        assert_eq!(f.banner.alpha.get(), 1.0);
        assert_eq!(f.controller.factory().created.get(), 1);
    }

    #[tokio::test]
    async fn test_play_async_resumes_prepared_tween() {
        let f = fixture();
        f.controller.ready().unwrap();
        let prepared = f.controller.current().unwrap();

        let (outcome, _) = tokio::join!(f.controller.play_async(), drive(&f.engine, 12, 0.1));

        assert_eq!(outcome.unwrap(), PlayOutcome::Completed);
        assert_eq!(prepared.state(), TweenState::Completed);
        assert_eq!(f.banner.alpha.get(), 1.0);
        assert!(f.controller.current().is_none());
        assert_eq!(f.controller.factory().created.get(), 1);
    }

    #[tokio::test]
    async fn test_owner_destroyed_during_play() {
        let f = fixture();

        let (outcome, _) = tokio::join!(f.controller.play_async(), async {
            drive(&f.engine, 3, 0.1).await;
            f.owner.destroy();
            drive(&f.engine, 2, 0.1).await;
        });

        assert_eq!(outcome.unwrap(), PlayOutcome::Cancelled);
        assert!(f.controller.current().is_none());
        assert!(f.banner.alpha.get() < 1.0);
        assert!(!f.engine.has_active_tweens());
    }

    #[tokio::test]
    async fn test_ready_during_play_keeps_new_tween() {
        let f = fixture();

        let (outcome, _) = tokio::join!(f.controller.play_async(), async {
            drive(&f.engine, 2, 0.1).await;
            f.controller.ready().unwrap();
        });

        // 被 ready 打断的播放以完成状态结束，新准备的 Tween 保留
        assert_eq!(outcome.unwrap(), PlayOutcome::Completed);
        assert_eq!(f.controller.phase(), ControllerPhase::Prepared);
        assert_eq!(f.banner.alpha.get(), 0.0);
    }

    #[tokio::test]
    async fn test_play_async_replaces_finished_prepared_tween() {
        let f = fixture();
        f.controller.ready().unwrap();
        let prepared = f.controller.current().unwrap();
        prepared.kill();

        let (outcome, _) = tokio::join!(f.controller.play_async(), drive(&f.engine, 12, 0.1));

        assert_eq!(outcome.unwrap(), PlayOutcome::Completed);
        assert_eq!(prepared.state(), TweenState::Killed);
        assert_eq!(f.banner.alpha.get(), 1.0);
        assert_eq!(f.controller.factory().created.get(), 2);
    }

    #[test]
    fn test_complete_replaces_finished_prepared_tween() {
        let f = fixture();
        f.controller.ready().unwrap();
        f.controller.current().unwrap().kill();

        f.controller.complete().unwrap();
        assert_eq!(f.banner.alpha.get(), 1.0);
        assert!(f.controller.current().is_none());
        assert_eq!(f.controller.factory().created.get(), 2);
    }

    #[test]
    fn test_try_play_without_runtime() {
        let f = fixture();
        f.controller.ready().unwrap();

        assert_eq!(
            f.controller.try_play().unwrap_err(),
            TweenError::NoLocalContext
        );
        assert_eq!(f.controller.phase(), ControllerPhase::Prepared);
    }

    #[tokio::test]
    async fn test_try_play_outside_local_set() {
        let f = fixture();

        assert_eq!(
            f.controller.try_play().unwrap_err(),
            TweenError::NoLocalContext
        );
        assert_eq!(f.controller.phase(), ControllerPhase::Idle);
        assert_eq!(f.controller.factory().created.get(), 0);

        // 在 LocalSet 中正常启动
        tokio::task::LocalSet::new()
            .run_until(async {
                let handle = f.controller.try_play().unwrap();
                drive(&f.engine, 12, 0.1).await;
                handle.await.unwrap();
            })
            .await;
        assert_eq!(f.banner.alpha.get(), 1.0);
    }

    struct Broken;

    impl TweenFactory for Broken {
        fn play_core(&self, _engine: &TweenEngine) -> TweenResult<Tween> {
            Err(TweenError::factory("no target"))
        }
    }

    #[tokio::test]
    async fn test_factory_errors_propagate() {
        let owner = Owner::new("broken");
        let controller = TweenController::new(Broken, TweenEngine::new(), owner.token());

        assert!(controller.ready().is_err());
        assert!(controller.complete().is_err());
        assert_eq!(
            controller.play_async().await.unwrap_err(),
            TweenError::factory("no target")
        );
        assert_eq!(controller.phase(), ControllerPhase::Idle);
    }

    struct Reused {
        tween: Tween,
    }

    impl TweenFactory for Reused {
        fn play_core(&self, _engine: &TweenEngine) -> TweenResult<Tween> {
            Ok(self.tween.clone())
        }
    }

    #[test]
    fn test_reused_tween_is_rejected() {
        let f = fixture();
        let banner_id = f.controller.factory().banner;
        let tween = f.engine.to::<Banner>(banner_id, "alpha", 0.0, 1.0, 1.0).unwrap();
        let controller = TweenController::new(
            Reused {
                tween: tween.clone(),
            },
            f.engine.clone(),
            f.owner.token(),
        );

        controller.complete().unwrap();
        assert_eq!(
            controller.complete().unwrap_err(),
            TweenError::StaleTween { id: tween.id() }
        );
    }
}
