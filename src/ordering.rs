//! 取得順序のポリシー
//!
//! すべての Actor が同じ全順序 (Resource の通し番号) に従って小さい方から取れば、
//! 「次の人が持っている資源を待つ」輪は作れないので循環待ちが起きない。
//! left / right というラベルやアドレスの大小で決めてはいけない。

use crate::observer::Role;
use crate::resource::Resource;

// 先に取る資源と後に取る資源の組。Actor 生成時に一度だけ計算して使い回す
#[derive(Debug, Clone, Copy)]
pub struct AcquisitionPlan<'t> {
    pub first: &'t Resource,
    pub second: &'t Resource,
}

impl<'t> AcquisitionPlan<'t> {
    pub fn new(a: &'t Resource, b: &'t Resource) -> Self {
        let (first, second) = order_pair(a, b);
        AcquisitionPlan { first, second }
    }

    pub fn get(&self, role: Role) -> &'t Resource {
        match role {
            Role::First => self.first,
            Role::Second => self.second,
        }
    }
}

/// 通し番号の小さい方を first として返す。同じ資源を 2 つ渡すのは前提条件違反
pub fn order_pair<'t>(a: &'t Resource, b: &'t Resource) -> (&'t Resource, &'t Resource) {
    assert_ne!(
        a.id(),
        b.id(),
        "an actor must use two distinct resources"
    );

    if a.id() < b.id() {
        (a, b)
    } else {
        (b, a)
    }
}
