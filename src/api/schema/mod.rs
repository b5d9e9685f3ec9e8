// API 数据传输对象模块
// 包含所有与前端交互的数据结构

pub mod common;
pub mod tweet;
pub mod user;

pub use common::*;
pub use tweet::*;
pub use user::*;
