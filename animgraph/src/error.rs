use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{pool} pool exhausted (capacity {capacity})")]
    PoolExhausted { pool: &'static str, capacity: usize },

    #[error("invalid or stale {kind} handle")]
    InvalidHandle { kind: &'static str },

    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    #[error("unknown joint with name hash {name_hash:#010x}")]
    UnknownJoint { name_hash: u32 },

    #[error("state {state} does not belong to state machine {machine}")]
    ForeignState { machine: String, state: String },
}
