use crate::actor::ActorId;
use crate::resource::ResourceId;

// 設定の不備。スレッドを起動する前に弾く
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("at least 2 actors are required to form a ring, got {actors}")]
    TooFewActors { actors: usize },

    #[error("expected {expected} actor names, got {got}")]
    NameCountMismatch { expected: usize, got: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    // 前提条件違反 (保持していない Resource の release など) で panic したスレッド
    #[error("actor {actor} aborted: {message}")]
    ActorPanicked { actor: ActorId, message: String },
}

// 保持していない Resource を返そうとした
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReleaseError {
    #[error("{releaser} tried to release {resource} held by {holder}")]
    NotHolder {
        releaser: ActorId,
        resource: ResourceId,
        holder: ActorId,
    },

    #[error("{releaser} tried to release {resource} which is free")]
    Free {
        releaser: ActorId,
        resource: ResourceId,
    },
}
