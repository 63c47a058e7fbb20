//! # Tween 模块
//!
//! 运行中的 Tween 句柄。
//!
//! 一个 `Tween` 由若干属性轨道组成，由 `TweenEngine` 逐帧推进。句柄可以廉价克隆，
//! 所有克隆共享同一份播放状态：
//!
//! ```text
//! Playing ⇄ Paused
//!    │        │
//!    ├────────┴──► Completed   (自然结束 / complete())
//!    └───────────► Killed      (kill() / 宿主销毁)
//! ```
//!
//! 状态通过 `tokio::sync::watch` 广播，`wait()` / `wait_with_cancellation()`
//! 把句柄接入 async/await。

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tokio::sync::watch;

use crate::lifetime::OwnerToken;
use crate::track::Track;
use crate::traits::ObjectId;

/// Tween ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenId(pub u64);

impl fmt::Display for TweenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tween({})", self.0)
    }
}

/// Tween 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TweenState {
    /// 正在播放
    #[default]
    Playing,
    /// 已暂停
    Paused,
    /// 已完成（终值已写入）
    Completed,
    /// 已终止（停在当前值）
    Killed,
}

impl TweenState {
    /// 是否仍持有资源（播放中或暂停中）
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Killed)
    }
}

/// 一次等待的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Tween 到达终点
    Completed,
    /// Tween 被终止，等待者仍然收到了结果
    Killed,
    /// 等待被宿主销毁取消
    Cancelled,
}

impl From<TweenState> for PlayOutcome {
    fn from(state: TweenState) -> Self {
        match state {
            TweenState::Completed => PlayOutcome::Completed,
            _ => PlayOutcome::Killed,
        }
    }
}

/// 宿主销毁时对 Tween 与等待者的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelBehaviour {
    /// 终止 Tween，等待者收到 `Killed`
    Kill,
    /// 终止 Tween，等待者收到 `Cancelled`
    #[default]
    KillAndCancelAwait,
    /// 完成 Tween，等待者收到 `Completed`
    Complete,
    /// 完成 Tween，等待者收到 `Cancelled`
    CompleteAndCancelAwait,
    /// 不动 Tween，只取消等待
    CancelAwait,
}

struct TweenInner {
    tracks: Vec<Track>,
    duration: f32,
    elapsed: f32,
    link: Option<OwnerToken>,
}

struct TweenShared {
    id: TweenId,
    inner: RefCell<TweenInner>,
    status: watch::Sender<TweenState>,
}

/// Tween 句柄
#[derive(Clone)]
pub struct Tween {
    shared: Rc<TweenShared>,
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.inner.borrow();
        f.debug_struct("Tween")
            .field("id", &self.shared.id)
            .field("state", &self.state())
            .field("elapsed", &inner.elapsed)
            .field("duration", &inner.duration)
            .field("tracks", &inner.tracks.len())
            .finish()
    }
}

impl Tween {
    /// 创建播放中的 Tween 并写入所有轨道的起始值
    pub(crate) fn start(id: TweenId, tracks: Vec<Track>) -> Self {
        let duration = tracks.iter().map(Track::end_time).fold(0.0, f32::max);
        for track in &tracks {
            track.apply_start();
        }
        let (status, _) = watch::channel(TweenState::Playing);
        Self {
            shared: Rc::new(TweenShared {
                id,
                inner: RefCell::new(TweenInner {
                    tracks,
                    duration,
                    elapsed: 0.0,
                    link: None,
                }),
                status,
            }),
        }
    }

    /// Tween ID
    pub fn id(&self) -> TweenId {
        self.shared.id
    }

    /// 当前状态
    pub fn state(&self) -> TweenState {
        *self.shared.status.borrow()
    }

    /// 是否播放中或暂停中
    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        self.state().is_finished()
    }

    /// 是否正在播放
    pub fn is_playing(&self) -> bool {
        self.state() == TweenState::Playing
    }

    /// 总时长（秒，所有轨道中最晚的结束点）
    pub fn duration(&self) -> f32 {
        self.shared.inner.borrow().duration
    }

    /// 已播放时间（秒）
    pub fn elapsed(&self) -> f32 {
        self.shared.inner.borrow().elapsed
    }

    /// 线性时间进度（0.0 - 1.0）
    pub fn progress(&self) -> f32 {
        if self.state() == TweenState::Completed {
            return 1.0;
        }
        let inner = self.shared.inner.borrow();
        if inner.duration <= 0.0 {
            return 0.0;
        }
        (inner.elapsed / inner.duration).min(1.0)
    }

    /// 是否有轨道作用于指定对象
    pub fn targets_object(&self, object_id: ObjectId) -> bool {
        self.shared
            .inner
            .borrow()
            .tracks
            .iter()
            .any(|track| track.object_id == object_id)
    }

    /// 暂停，仅对播放中的 Tween 生效
    pub fn pause(&self) -> &Self {
        if self.state() == TweenState::Playing {
            self.set_state(TweenState::Paused);
        }
        self
    }

    /// 开始 / 恢复播放，仅对暂停中的 Tween 生效
    pub fn play(&self) -> &Self {
        if self.state() == TweenState::Paused {
            self.set_state(TweenState::Playing);
        }
        self
    }

    /// 跳到终点：写入所有轨道的最终值并结束
    ///
    /// 已结束的 Tween 不受影响。
    pub fn complete(&self) {
        if !self.is_active() {
            return;
        }
        {
            let mut inner = self.shared.inner.borrow_mut();
            inner.elapsed = inner.duration;
            for track in &inner.tracks {
                track.apply_end();
            }
            inner.link = None;
        }
        self.set_state(TweenState::Completed);
    }

    /// 立即终止，属性停留在当前值
    pub fn kill(&self) {
        if !self.is_active() {
            return;
        }
        self.shared.inner.borrow_mut().link = None;
        self.set_state(TweenState::Killed);
    }

    /// 绑定宿主生命周期：宿主销毁后，引擎在下一帧终止该 Tween
    pub fn set_link(&self, owner: &OwnerToken) -> &Self {
        if self.is_active() {
            self.shared.inner.borrow_mut().link = Some(owner.clone());
        }
        self
    }

    /// 绑定的宿主是否已销毁
    pub(crate) fn link_cancelled(&self) -> bool {
        self.shared
            .inner
            .borrow()
            .link
            .as_ref()
            .is_some_and(OwnerToken::is_cancelled)
    }

    /// 推进时间并写入属性值
    ///
    /// # 返回
    /// - `true`: Tween 仍然活跃
    /// - `false`: Tween 已结束
    pub(crate) fn advance(&self, dt: f32) -> bool {
        match self.state() {
            TweenState::Playing => {}
            TweenState::Paused => return true,
            TweenState::Completed | TweenState::Killed => return false,
        }

        let reached_end = {
            let mut inner = self.shared.inner.borrow_mut();
            inner.elapsed = (inner.elapsed + dt.max(0.0)).min(inner.duration);
            for track in &inner.tracks {
                track.apply(inner.elapsed);
            }
            inner.elapsed >= inner.duration
        };

        if reached_end {
            self.complete();
            return false;
        }
        true
    }

    /// 等待 Tween 结束，返回最终状态
    pub async fn wait(&self) -> TweenState {
        let mut status = self.shared.status.subscribe();
        // 发送端不会先于句柄释放，Err 只作兜底
        status
            .wait_for(TweenState::is_finished)
            .await
            .map(|state| *state)
            .unwrap_or(TweenState::Killed)
    }

    /// 等待 Tween 结束，宿主销毁时按 `behaviour` 处理
    pub async fn wait_with_cancellation(
        &self,
        owner: &OwnerToken,
        behaviour: CancelBehaviour,
    ) -> PlayOutcome {
        if owner.is_cancelled() {
            return self.on_owner_cancelled(behaviour);
        }

        tokio::select! {
            biased;
            _ = owner.cancelled() => self.on_owner_cancelled(behaviour),
            state = self.wait() => PlayOutcome::from(state),
        }
    }

    fn on_owner_cancelled(&self, behaviour: CancelBehaviour) -> PlayOutcome {
        // 宿主销毁前已经自然结束的 Tween 按实际结果返回
        if self.state() == TweenState::Completed {
            return PlayOutcome::Completed;
        }
        match behaviour {
            CancelBehaviour::Kill => {
                self.kill();
                PlayOutcome::from(self.state())
            }
            CancelBehaviour::KillAndCancelAwait => {
                self.kill();
                PlayOutcome::Cancelled
            }
            CancelBehaviour::Complete => {
                self.complete();
                PlayOutcome::from(self.state())
            }
            CancelBehaviour::CompleteAndCancelAwait => {
                self.complete();
                PlayOutcome::Cancelled
            }
            CancelBehaviour::CancelAwait => PlayOutcome::Cancelled,
        }
    }

    fn set_state(&self, state: TweenState) {
        self.shared.status.send_replace(state);
    }
}
