//! Actor の状態通知を受け取る外部の観測者
//!
//! 複数スレッドから同時に notify されるので、各シンクは Mutex で 1 レコードずつ直列化する

use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

use crate::actor::ActorId;
use crate::resource::ResourceId;

// 先に取るか後に取るか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    First,
    Second,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::First => write!(f, "first"),
            Role::Second => write!(f, "second"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Waiting,
    Acquired,
    Eating,
    Releasing,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Event {
    pub actor: ActorId,
    pub resource: Option<ResourceId>,
    pub role: Option<Role>,
    pub phase: Phase,
}

impl Event {
    pub fn with_resource(actor: ActorId, resource: ResourceId, role: Role, phase: Phase) -> Self {
        Event {
            actor,
            resource: Some(resource),
            role: Some(role),
            phase,
        }
    }

    // Eating / Done のように資源と関係ないもの
    pub fn actor_only(actor: ActorId, phase: Phase) -> Self {
        Event {
            actor,
            resource: None,
            role: None,
            phase,
        }
    }
}

pub trait Observer: Send + Sync {
    fn notify(&self, event: Event);
}

/// 何もしない
pub struct Silent;

impl Observer for Silent {
    fn notify(&self, _event: Event) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Record {
    pub seq: u64,
    #[serde(flatten)]
    pub event: Event,
}

/// すべてのイベントを到着順に保存する。seq はロック中に振るので抜けも重複もない
#[derive(Default)]
pub struct Recorder {
    records: Mutex<Vec<Record>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.records.lock().iter().map(|r| r.event).collect()
    }

    pub fn count(&self, phase: Phase) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| r.event.phase == phase)
            .count()
    }
}

impl Observer for Recorder {
    fn notify(&self, event: Event) {
        let mut records = self.records.lock();
        let seq = records.len() as u64;
        records.push(Record { seq, event });
    }
}

/// tracing に実況を流す。名前が設定されていればそれを使う
pub struct LogObserver {
    names: HashMap<ActorId, String>,
    cycles: usize,
    narration: Mutex<Narration>, // 出力の排他も兼ねる
}

#[derive(Default)]
struct Narration {
    seq: u64,
    meals: HashMap<ActorId, usize>,
}

impl LogObserver {
    pub fn new(names: &[String], cycles: usize) -> Self {
        LogObserver {
            names: names
                .iter()
                .enumerate()
                .map(|(i, n)| (ActorId(i), n.clone()))
                .collect(),
            cycles,
            narration: Mutex::new(Narration::default()),
        }
    }

    fn name(&self, actor: ActorId) -> String {
        match self.names.get(&actor) {
            Some(n) => n.clone(),
            None => actor.to_string(),
        }
    }
}

impl Observer for LogObserver {
    fn notify(&self, event: Event) {
        let name = self.name(event.actor);
        let role = event.role.map(|r| r.to_string()).unwrap_or_default();

        let mut narration = self.narration.lock();
        narration.seq += 1;
        let seq = narration.seq;
        match event.phase {
            Phase::Waiting => info!(seq, "{name} is waiting for {role} fork"),
            Phase::Acquired => info!(seq, "{name} is taking {role} fork"),
            Phase::Eating => {
                info!(seq, "{name} started eating");
                *narration.meals.entry(event.actor).or_default() += 1;
            }
            Phase::Releasing => {
                // 2 本目を置く時点で 1 回分の食事が終わっている
                if event.role == Some(Role::Second) {
                    let meals = narration.meals.get(&event.actor).copied().unwrap_or(0);
                    let missing = self.cycles.saturating_sub(meals);
                    info!(seq, "{name} done eating: {missing}/{} missing", self.cycles);
                }
                info!(seq, "{name} is releasing {role} fork");
            }
            Phase::Done => info!(seq, "{name} finished eating"),
        }
    }
}

#[cfg(test)]
mod test {
    use std::thread;

    use super::*;

    #[test]
    fn test_recorder_seq_is_dense() {
        let recorder = Recorder::new();

        thread::scope(|s| {
            for i in 0..4 {
                let recorder = &recorder;
                s.spawn(move || {
                    for _ in 0..100 {
                        recorder.notify(Event::actor_only(ActorId(i), Phase::Eating));
                    }
                });
            }
        });

        let records = recorder.records();
        assert_eq!(records.len(), 400);
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.seq, i as u64);
        }
        assert_eq!(recorder.count(Phase::Eating), 400);
    }

    #[test]
    fn test_log_observer_names() {
        let log = LogObserver::new(&["Mozart".to_string()], 3);
        assert_eq!(log.name(ActorId(0)), "Mozart");
        assert_eq!(log.name(ActorId(1)), "#1");

        log.notify(Event::actor_only(ActorId(0), Phase::Eating));
        log.notify(Event::actor_only(ActorId(0), Phase::Eating));
        log.notify(Event::actor_only(ActorId(1), Phase::Done));

        let narration = log.narration.lock();
        assert_eq!(narration.seq, 3);
        assert_eq!(narration.meals.get(&ActorId(0)), Some(&2));
        assert_eq!(narration.meals.get(&ActorId(1)), None);
    }

    #[test]
    fn test_record_json() {
        let r = Record {
            seq: 7,
            event: Event::with_resource(ActorId(2), ResourceId(3), Role::Second, Phase::Acquired),
        };
        let v = serde_json::to_value(r).unwrap();
        assert_eq!(v["seq"], 7);
        assert_eq!(v["actor"], 2);
        assert_eq!(v["resource"], 3);
        assert_eq!(v["role"], "second");
        assert_eq!(v["phase"], "acquired");
    }
}
