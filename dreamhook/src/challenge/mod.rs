mod dns;
mod dreamhost;
mod manager;
mod propagation;

pub use dns::{Provider, Resolver, SystemResolver};
pub use dreamhost::Provider as DreamhostProvider;
pub use manager::{Manager, Timings};
pub use propagation::{observe, Observation, Watch, DEFAULT_CONFIRMATIONS};
