use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};

use remass_common::{RemassError, RemassResult};

use crate::session::RemoteSession;

/// 持有唯一的远程会话。
///
/// 会话本身不能并发使用：后台线程执行导出或模板同步时，前台的状态查询
/// 必须等待。每次使用会话前先 [`acquire`](Self::acquire)，已被占用时立即返回
/// [`RemassError::SessionBusy`] 而不是阻塞。
#[derive(Debug)]
pub struct TabletConnection<S> {
    session: S,
    busy: AtomicBool,
}

impl<S: RemoteSession> TabletConnection<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn acquire(&self) -> RemassResult<SessionGuard<'_, S>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RemassError::SessionBusy)?;
        Ok(SessionGuard { connection: self })
    }
}

/// 独占会话期间持有；Drop 时清除忙标志
pub struct SessionGuard<'a, S> {
    connection: &'a TabletConnection<S>,
}

impl<S> Deref for SessionGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.connection.session
    }
}

impl<S> Drop for SessionGuard<'_, S> {
    fn drop(&mut self) {
        self.connection.busy.store(false, Ordering::Release);
    }
}
