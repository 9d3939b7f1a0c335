use std::time::Duration;

use serde::Serialize;

use crate::actor::ActorSummary;
use crate::resource::{Resource, ResourceId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceReport {
    pub id: ResourceId,
    pub acquires: usize,
    pub releases: usize,
    pub held: bool,
}

impl From<&Resource> for ResourceReport {
    fn from(r: &Resource) -> Self {
        ResourceReport {
            id: r.id(),
            acquires: r.acquires(),
            releases: r.releases(),
            held: r.is_held(),
        }
    }
}

/// 全員が食べ終わったあとの集計
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub elapsed_ms: u64,
    pub actors: Vec<ActorSummary>,
    pub resources: Vec<ResourceReport>,
}

impl RunReport {
    pub fn new(elapsed: Duration, actors: Vec<ActorSummary>, resources: &[Resource]) -> Self {
        RunReport {
            elapsed_ms: elapsed.as_millis() as u64,
            actors,
            resources: resources.iter().map(ResourceReport::from).collect(),
        }
    }

    pub fn total_meals(&self) -> usize {
        self.actors.iter().map(|a| a.meals).sum()
    }

    // 全部空いていて、取った回数と返した回数が一致している
    pub fn all_free(&self) -> bool {
        self.resources
            .iter()
            .all(|r| !r.held && r.acquires == r.releases)
    }
}
