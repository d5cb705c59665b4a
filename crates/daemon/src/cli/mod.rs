pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Daemon, Fetch, Health, Init, List, Login, Upload, Version, Whoami};
