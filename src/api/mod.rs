// API 模块
// handlers 解析请求并组装响应，operations 承载业务规则，schema 定义请求/响应结构

pub mod handlers;
pub mod operations;
pub mod schema;
