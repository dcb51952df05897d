pub mod elastic;

pub use elastic::{ElasticAction, ElasticCommand};
