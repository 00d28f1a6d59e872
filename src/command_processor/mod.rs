pub mod command_processor;

pub use command_processor::CommandProcessor;
