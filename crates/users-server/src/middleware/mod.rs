mod cors;

pub use cors::{answer_options, cors_layer};
