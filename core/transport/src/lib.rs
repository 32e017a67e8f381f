pub mod rtu;
pub mod settings;

pub use settings::{PortSettings, Settings};
