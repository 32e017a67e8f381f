pub mod framer;
pub mod master;
pub mod port;
pub mod slave;

pub use framer::RtuFramer;
pub use master::SerialMaster;
pub use slave::RtuSlave;
