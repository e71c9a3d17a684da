pub mod base;
pub mod configs;
pub mod logging;
pub mod openai;

#[cfg(test)]
pub mod mock;
