pub mod fees;
pub mod transfers;

pub use fees::*;
pub use transfers::*;
