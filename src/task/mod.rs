mod poll;
mod submit;

pub use poll::*;
pub use submit::*;
