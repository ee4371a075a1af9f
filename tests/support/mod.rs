#![allow(dead_code)]

pub mod endpoint;
pub mod kge_env;
pub mod logs;
