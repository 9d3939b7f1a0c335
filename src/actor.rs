use std::fmt;
use std::thread;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::guard::{Held, PairGuard};
use crate::observer::{Event, Observer, Phase, Role};
use crate::ordering::AcquisitionPlan;
use crate::resource::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ActorId(pub usize);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// Idle -> AcquiringFirst -> AcquiringSecond -> Eating -> ReleasingSecond -> ReleasingFirst -> Idle
// サイクルを使い切ったら Idle から Terminal へ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActorState {
    Idle,
    AcquiringFirst,
    AcquiringSecond,
    Eating,
    ReleasingSecond,
    ReleasingFirst,
    Terminal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorSummary {
    pub id: ActorId,
    pub name: Option<String>,
    pub meals: usize,
    #[serde(skip)]
    pub state: ActorState,
}

/// 2 つの資源を借りて食事を繰り返す参加者 (哲学者)
pub struct Actor<'t> {
    id: ActorId,
    name: Option<String>,
    left: &'t Resource,
    right: &'t Resource,
    plan: AcquisitionPlan<'t>, // 生成時に固定。以後計算し直さない
    remaining_cycles: usize,
    meals: usize,
    state: ActorState,
    eating: Duration,
    idle: Duration,
    jitter: Duration,
}

impl<'t> Actor<'t> {
    pub fn new(id: ActorId, left: &'t Resource, right: &'t Resource, cycles: usize) -> Self {
        Actor {
            id,
            name: None,
            left,
            right,
            plan: AcquisitionPlan::new(left, right),
            remaining_cycles: cycles,
            meals: 0,
            state: ActorState::Idle,
            eating: Duration::ZERO,
            idle: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    // eating: 食事時間, idle: 食後に他の人へ譲る時間, jitter: 食事時間に足す乱数の上限
    pub fn with_timing(mut self, eating: Duration, idle: Duration, jitter: Duration) -> Self {
        self.eating = eating;
        self.idle = idle;
        self.jitter = jitter;
        self
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn left(&self) -> &'t Resource {
        self.left
    }

    pub fn right(&self) -> &'t Resource {
        self.right
    }

    pub fn plan(&self) -> AcquisitionPlan<'t> {
        self.plan
    }

    pub fn state(&self) -> ActorState {
        self.state
    }

    pub fn meals(&self) -> usize {
        self.meals
    }

    pub fn remaining_cycles(&self) -> usize {
        self.remaining_cycles
    }

    fn enter(&mut self, next: ActorState) {
        debug!(actor = %self.id, from = ?self.state, to = ?next, "transition");
        self.state = next;
    }

    fn eating_time(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.eating;
        }
        let extra = rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64);
        self.eating + Duration::from_millis(extra)
    }

    // Terminal になるまで食べ続ける
    pub fn run(mut self, observer: &dyn Observer) -> ActorSummary {
        while self.dine_once(observer) {}

        ActorSummary {
            id: self.id,
            name: self.name,
            meals: self.meals,
            state: self.state,
        }
    }

    // 1 サイクル分進める。もう食べられない (Terminal になった) なら false
    pub fn dine_once(&mut self, observer: &dyn Observer) -> bool {
        match self.state {
            ActorState::Terminal => return false,
            ActorState::Idle => {}
            state => unreachable!("{} resumed in {state:?}", self.id),
        }

        if self.remaining_cycles == 0 {
            self.enter(ActorState::Terminal);
            observer.notify(Event::actor_only(self.id, Phase::Done));
            return false;
        }

        let plan = self.plan;

        // 必ず番号の小さい方から取る
        self.enter(ActorState::AcquiringFirst);
        let first = Held::take(plan.first, self.id, Role::First, observer);
        self.enter(ActorState::AcquiringSecond);
        let second = Held::take(plan.second, self.id, Role::Second, observer);
        let pair = PairGuard::new(first, second);

        self.enter(ActorState::Eating);
        self.meals += 1;
        observer.notify(Event::actor_only(self.id, Phase::Eating));

        let eating = self.eating_time();
        if !eating.is_zero() {
            thread::sleep(eating);
        }

        pair.release(|role| {
            let next = match role {
                Role::Second => ActorState::ReleasingSecond,
                Role::First => ActorState::ReleasingFirst,
            };
            self.enter(next);
        });

        self.remaining_cycles -= 1;
        self.enter(ActorState::Idle);
        debug!(actor = %self.id, meals = self.meals, missing = self.remaining_cycles, "done eating");

        // 他の人が取れるように少し待つ
        if self.remaining_cycles > 0 && !self.idle.is_zero() {
            thread::sleep(self.idle);
        }

        true
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::observer::{Recorder, Silent};
    use crate::resource::ResourceId;

    #[test]
    fn test_cycle_accounting() {
        let r0 = Resource::new(ResourceId(0));
        let r1 = Resource::new(ResourceId(1));

        let summary = Actor::new(ActorId(0), &r0, &r1, 3).run(&Silent);

        assert_eq!(summary.meals, 3);
        assert_eq!(summary.state, ActorState::Terminal);
        assert_eq!(r0.acquires(), 3);
        assert_eq!(r1.releases(), 3);
        assert!(!r0.is_held() && !r1.is_held());
    }

    #[test]
    fn test_zero_cycles() {
        let r0 = Resource::new(ResourceId(0));
        let r1 = Resource::new(ResourceId(1));
        let recorder = Recorder::new();

        let summary = Actor::new(ActorId(0), &r0, &r1, 0).run(&recorder);

        assert_eq!(summary.meals, 0);
        assert_eq!(r0.acquires(), 0);
        assert_eq!(recorder.events(), vec![Event::actor_only(ActorId(0), Phase::Done)]);
    }

    // right の方が番号が小さいなら right から取る
    #[test]
    fn test_event_order_in_one_cycle() {
        let r2 = Resource::new(ResourceId(2));
        let r5 = Resource::new(ResourceId(5));
        let recorder = Recorder::new();
        let id = ActorId(4);

        let actor = Actor::new(id, &r5, &r2, 1);
        assert_eq!(actor.left().id(), ResourceId(5));
        assert_eq!(actor.plan().first.id(), ResourceId(2));
        actor.run(&recorder);

        assert_eq!(
            recorder.events(),
            vec![
                Event::with_resource(id, ResourceId(2), Role::First, Phase::Acquired),
                Event::with_resource(id, ResourceId(5), Role::Second, Phase::Acquired),
                Event::actor_only(id, Phase::Eating),
                Event::with_resource(id, ResourceId(5), Role::Second, Phase::Releasing),
                Event::with_resource(id, ResourceId(2), Role::First, Phase::Releasing),
                Event::actor_only(id, Phase::Done),
            ]
        );
    }

    #[test]
    fn test_states_between_cycles() {
        let r0 = Resource::new(ResourceId(0));
        let r1 = Resource::new(ResourceId(1));
        let mut actor = Actor::new(ActorId(0), &r0, &r1, 2)
            .with_name("Chopin")
            .with_timing(Duration::from_millis(1), Duration::ZERO, Duration::from_millis(2));

        assert_eq!(actor.state(), ActorState::Idle);
        assert!(actor.dine_once(&Silent));
        assert_eq!(actor.state(), ActorState::Idle);
        assert_eq!(actor.remaining_cycles(), 1);
        assert!(actor.dine_once(&Silent));
        assert!(!actor.dine_once(&Silent));
        assert_eq!(actor.state(), ActorState::Terminal);
        assert_eq!(actor.meals(), 2);
        // Terminal のあとは何もしない
        assert!(!actor.dine_once(&Silent));
        assert_eq!(r0.acquires(), 2);
    }

    #[test]
    #[should_panic(expected = "distinct")]
    fn test_same_left_and_right() {
        let r0 = Resource::new(ResourceId(0));
        Actor::new(ActorId(0), &r0, &r0, 1);
    }
}
