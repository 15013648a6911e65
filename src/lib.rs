pub mod build_info;
pub mod convergence;
pub mod distributed;
pub mod driver;
pub mod error;
pub mod grid;
pub mod image;
pub mod init;
pub mod io;
pub mod parameters;
pub mod partition;
pub mod shared;
pub mod timing;
