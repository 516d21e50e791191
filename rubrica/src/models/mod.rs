mod generation;
mod notification;
mod rubric;

pub use generation::*;
pub use notification::*;
pub use rubric::*;
