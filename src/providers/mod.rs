//! Provider implementations

pub mod dashscope;
