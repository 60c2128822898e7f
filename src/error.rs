use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),
    /// A period snapshot for a required entity type has no rows. Ranking and
    /// rebalancing are undefined on zero entities, so the period aborts.
    #[error("empty {entity} snapshot for week {week}")]
    EmptySnapshot { entity: &'static str, week: u32 },
    #[error("no historical weeks available")]
    NoHistory,
    #[error("data error: {0}")]
    Data(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
