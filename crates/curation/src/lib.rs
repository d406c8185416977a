pub mod schema;
pub mod payload;
pub mod validator;
pub mod storage;
pub mod store;
pub mod service;
pub mod stats;

pub use schema::*;
pub use payload::*;
pub use validator::*;
pub use storage::*;
pub use store::*;
pub use service::*;
pub use stats::*;
