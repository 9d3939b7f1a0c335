use std::any::Any;
use std::thread;
use std::time::Instant;

use tracing::{error, info};

use crate::actor::{Actor, ActorId};
use crate::config::Config;
use crate::error::{ConfigError, RunError};
use crate::observer::Observer;
use crate::report::RunReport;
use crate::resource::{Resource, ResourceId};

/// 食卓。資源はすべてここが所有し、Actor は実行中だけ借りる
///
/// 席 i の Actor は left = Resource[i], right = Resource[(i + 1) % N] を使うので、
/// Resource[i] は Actor[i - 1] と Actor[i] に共有される
#[derive(Debug)]
pub struct Coordinator {
    config: Config,
    resources: Vec<Resource>,
}

impl Coordinator {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        // 通し番号はここで一度だけ振る
        let resources = (0..config.actors)
            .map(|i| Resource::new(ResourceId(i)))
            .collect();

        Ok(Coordinator { config, resources })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn seat(&self, i: usize) -> (&Resource, &Resource) {
        let n = self.resources.len();
        (&self.resources[i % n], &self.resources[(i + 1) % n])
    }

    fn actors(&self) -> Vec<Actor<'_>> {
        (0..self.config.actors)
            .map(|i| {
                let (left, right) = self.seat(i);
                let actor = Actor::new(ActorId(i), left, right, self.config.cycles).with_timing(
                    self.config.eating,
                    self.config.idle,
                    self.config.jitter,
                );
                match self.config.name(i) {
                    Some(name) => actor.with_name(name),
                    None => actor,
                }
            })
            .collect()
    }

    /// 1 Actor 1 スレッドで全員を走らせ、全員が Terminal になるまで待つ
    ///
    /// どこかのスレッドが前提条件違反で panic しても他は最後まで join してからエラーを返す
    pub fn run(&self, observer: &dyn Observer) -> Result<RunReport, RunError> {
        let started = Instant::now();
        info!(
            actors = self.config.actors,
            cycles = self.config.cycles,
            "dinner started"
        );

        let actors = self.actors();
        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = actors
                .into_iter()
                .map(|actor| {
                    let id = actor.id();
                    (id, s.spawn(move || actor.run(observer)))
                })
                .collect();

            // join は無条件。途中で諦める経路はない
            handles
                .into_iter()
                .map(|(id, h)| (id, h.join()))
                .collect()
        });

        let mut summaries = Vec::with_capacity(results.len());
        let mut failure = None;
        for (id, result) in results {
            match result {
                Ok(summary) => summaries.push(summary),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!(actor = %id, %message, "actor aborted");
                    failure.get_or_insert(RunError::ActorPanicked { actor: id, message });
                }
            }
        }

        if let Some(e) = failure {
            return Err(e);
        }

        let report = RunReport::new(started.elapsed(), summaries, &self.resources);
        info!(
            meals = report.total_meals(),
            elapsed_ms = report.elapsed_ms,
            "they all finished eating"
        );
        Ok(report)
    }
}

/// 設定の検査から全員の join までを一度に行う
pub fn dine(config: Config, observer: &dyn Observer) -> Result<RunReport, RunError> {
    Coordinator::new(config)?.run(observer)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
