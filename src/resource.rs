use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use tracing::trace;

use crate::actor::ActorId;
use crate::error::ReleaseError;
use crate::observer::{Event, Observer, Phase, Role};

// トポロジ構築時に振られる通し番号。取得順序の全順序はこの値だけで決まる
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceId(pub usize);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// 隣り合う 2 人の Actor で共有される排他資源 (箸)
pub struct Resource {
    id: ResourceId,
    holder: Mutex<Option<ActorId>>, // Some なら保持中
    cond: Condvar,                  // 解放待ちのスレッドを起こす
    acquires: AtomicUsize,
    releases: AtomicUsize,
}

impl Resource {
    pub fn new(id: ResourceId) -> Self {
        Resource {
            id,
            holder: Mutex::new(None),
            cond: Condvar::new(),
            acquires: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn holder(&self) -> Option<ActorId> {
        *self.holder.lock()
    }

    pub fn is_held(&self) -> bool {
        self.holder.lock().is_some()
    }

    pub fn acquires(&self) -> usize {
        self.acquires.load(Ordering::Acquire)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::Acquire)
    }

    // 空くまでブロックし、空いたら requester を保持者として記録する
    // 通知は holder のロック中に出すので、この資源に関するイベントの順序は実際の順序と一致する
    pub fn acquire(&self, requester: ActorId, role: Role, observer: &dyn Observer) {
        let mut holder = self.holder.lock();

        if *holder == Some(requester) {
            panic!("{requester} tried to re-acquire {} it already holds", self.id);
        }

        if holder.is_some() {
            observer.notify(Event::with_resource(requester, self.id, role, Phase::Waiting));
            // spurious wakeup があるので while で待つ
            while let Some(current) = *holder {
                trace!(resource = %self.id, %requester, %current, "blocked");
                self.cond.wait(&mut holder);
            }
        }

        *holder = Some(requester);
        self.acquires.fetch_add(1, Ordering::AcqRel);
        observer.notify(Event::with_resource(requester, self.id, role, Phase::Acquired));
    }

    // 保持者以外からの release はプログラムのバグなので panic させる
    pub fn release(&self, releaser: ActorId, role: Role, observer: &dyn Observer) {
        if let Err(e) = self.try_release(releaser, role, observer) {
            panic!("{e}");
        }
    }

    // release と同じだが、前提条件違反なら状態を変えずにエラーを返す
    pub fn try_release(
        &self,
        releaser: ActorId,
        role: Role,
        observer: &dyn Observer,
    ) -> Result<(), ReleaseError> {
        let mut holder = self.holder.lock();

        match *holder {
            Some(current) if current == releaser => {}
            Some(current) => {
                return Err(ReleaseError::NotHolder {
                    releaser,
                    resource: self.id,
                    holder: current,
                })
            }
            None => {
                return Err(ReleaseError::Free {
                    releaser,
                    resource: self.id,
                })
            }
        }

        *holder = None;
        self.releases.fetch_add(1, Ordering::AcqRel);
        // 誰が待っているか分からないので全員起こす
        self.cond.notify_all();
        observer.notify(Event::with_resource(releaser, self.id, role, Phase::Releasing));
        Ok(())
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("id", &self.id)
            .field("holder", &self.holder())
            .field("acquires", &self.acquires())
            .field("releases", &self.releases())
            .finish()
    }
}
