pub mod engine;
pub mod registry;
pub mod topic;

pub use engine::Broker;
pub use registry::TopicRegistry;
