pub mod interview;
pub mod matching;
pub mod profile;
