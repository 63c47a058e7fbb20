//! # Lifetime 模块
//!
//! 宿主对象（场景中的物体）的生命周期与取消信号。
//!
//! `Owner` 被销毁（显式 `destroy()` 或被 drop）时，所有由它派生的
//! `OwnerToken` 都会进入取消状态。Tween 与控制器通过令牌感知宿主销毁，
//! 无需手动注销订阅。

use tokio::sync::watch;
use tracing::info;

/// 拥有 Tween 的宿主对象
#[derive(Debug)]
pub struct Owner {
    name: String,
    destroyed: watch::Sender<bool>,
}

impl Owner {
    /// 创建一个存活的宿主对象
    pub fn new(name: impl Into<String>) -> Self {
        let (destroyed, _) = watch::channel(false);
        Self {
            name: name.into(),
            destroyed,
        }
    }

    /// 宿主名称（用于日志）
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 派生一个绑定到本对象生命周期的取消令牌
    pub fn token(&self) -> OwnerToken {
        OwnerToken {
            destroyed: self.destroyed.subscribe(),
        }
    }

    /// 销毁宿主对象
    ///
    /// 重复调用无副作用。
    pub fn destroy(&self) {
        if self.is_destroyed() {
            return;
        }
        info!(owner = %self.name, "宿主对象已销毁");
        self.destroyed.send_replace(true);
    }

    /// 是否已销毁
    pub fn is_destroyed(&self) -> bool {
        *self.destroyed.borrow()
    }
}

impl Drop for Owner {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// 宿主生命周期取消令牌
///
/// 可以廉价克隆；通道关闭同样视为已销毁。
#[derive(Debug, Clone)]
pub struct OwnerToken {
    destroyed: watch::Receiver<bool>,
}

impl OwnerToken {
    /// 宿主是否已销毁
    pub fn is_cancelled(&self) -> bool {
        *self.destroyed.borrow() || self.destroyed.has_changed().is_err()
    }

    /// 等待宿主销毁
    ///
    /// 宿主已销毁时立即返回。可以在 `select!` 中安全丢弃。
    pub async fn cancelled(&self) {
        let mut destroyed = self.destroyed.clone();
        // 发送端关闭时 wait_for 返回 Err，同样视为销毁
        let _ = destroyed.wait_for(|destroyed| *destroyed).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_follows_owner() {
        let owner = Owner::new("panel");
        let token = owner.token();
        assert!(!token.is_cancelled());
        assert!(!owner.is_destroyed());

        owner.destroy();
        assert!(owner.is_destroyed());
        assert!(token.is_cancelled());

        // 重复销毁无副作用
        owner.destroy();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_drop_cancels_token() {
        let owner = Owner::new("dropped");
        let token = owner.token();
        let clone = token.clone();
        drop(owner);
        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_after_destroy() {
        let owner = Owner::new("async");
        let token = owner.token();

        let (_, _) = tokio::join!(token.cancelled(), async {
            tokio::task::yield_now().await;
            owner.destroy();
        });
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_immediately_when_already_destroyed() {
        let owner = Owner::new("gone");
        let token = owner.token();
        drop(owner);
        token.cancelled().await;
    }
}
