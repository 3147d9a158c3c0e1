pub mod block;
pub mod candle;
pub mod connection;
pub mod error;
pub mod param;
pub mod port;
pub mod signal;
pub mod strategy;

pub use block::{BlockCategory, BlockId, BlockInstance, BlockTemplate, Placement};
pub use candle::{Candle, PriceSource};
pub use connection::{Connection, ConnectionId};
pub use error::DocumentError;
pub use param::{ParamKind, ParamSpec, ParamValue};
pub use port::{InputPort, PortId, PortSpec, ValueKind};
pub use signal::{ExecutionSignal, SignalKind};
pub use strategy::{Strategy, StrategyId};
