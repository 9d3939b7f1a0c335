use std::thread;

use tracing::error;

use crate::actor::ActorId;
use crate::observer::{Observer, Role};
use crate::resource::Resource;

// 取得済みの資源 1 つ分。drop されると release する
// 2 つ目を取る前に panic しても 1 つ目が握りっぱなしにならない
pub struct Held<'t, 'o> {
    resource: &'t Resource,
    actor: ActorId,
    role: Role,
    observer: &'o dyn Observer,
}

impl<'t, 'o> Held<'t, 'o> {
    pub fn take(
        resource: &'t Resource,
        actor: ActorId,
        role: Role,
        observer: &'o dyn Observer,
    ) -> Self {
        resource.acquire(actor, role, observer);
        Held {
            resource,
            actor,
            role,
            observer,
        }
    }

    pub fn resource(&self) -> &'t Resource {
        self.resource
    }
}

impl Drop for Held<'_, '_> {
    fn drop(&mut self) {
        // unwind 中にもう一度 panic すると abort してしまうので、エラーはログだけ残す
        if thread::panicking() {
            if let Err(e) = self.resource.try_release(self.actor, self.role, self.observer) {
                error!(error = %e, "release skipped while unwinding");
            }
            return;
        }
        self.resource.release(self.actor, self.role, self.observer);
    }
}

// 両方の資源を持っている状態
// フィールドは宣言順に drop されるので second → first の順 (LIFO) で解放される
pub struct PairGuard<'t, 'o> {
    second: Held<'t, 'o>,
    first: Held<'t, 'o>,
}

impl<'t, 'o> PairGuard<'t, 'o> {
    pub fn new(first: Held<'t, 'o>, second: Held<'t, 'o>) -> Self {
        debug_assert!(first.resource().id() < second.resource().id());
        PairGuard { second, first }
    }

    pub fn first(&self) -> &'t Resource {
        self.first.resource()
    }

    pub fn second(&self) -> &'t Resource {
        self.second.resource()
    }

    // 解放の直前に step(role) を呼ぶ。状態遷移を記録したいとき用
    pub fn release(self, mut step: impl FnMut(Role)) {
        let PairGuard { second, first } = self;
        step(Role::Second);
        drop(second);
        step(Role::First);
        drop(first);
    }
}
