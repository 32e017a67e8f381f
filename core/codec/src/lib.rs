pub mod helpers;
pub mod master;
pub mod slave;

pub use master::{Master, Transport};
pub use slave::{Addressing, Outcome, SlaveContext};
