pub mod fixtures;
pub mod mocks;

pub use fixtures::Wire;
pub use mocks::{EndOfInput, MockConnector, MockTransport, WriteLog};
