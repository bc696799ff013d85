mod measure;

pub use measure::*;
