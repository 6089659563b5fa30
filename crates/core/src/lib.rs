#![forbid(unsafe_code)]

pub mod answer_key;
pub mod model;
pub mod selection;
pub mod time;

pub use answer_key::{AnswerKey, resolve};
pub use selection::SelectionSet;
pub use time::Clock;
