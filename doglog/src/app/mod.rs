mod resolver;

pub use resolver::*;
