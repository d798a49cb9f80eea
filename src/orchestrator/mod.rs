//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 校验配置、加载证件目录、创建外部服务客户端
//! - 为每个会话创建配置器
//!
//! ### `order_runner` - 订单回放
//! - 按用户操作顺序驱动配置器完成一次申请
//!
//! ## 层次关系
//!
//! ```text
//! app (加载目录，管理会话)
//!     ↓
//! order_runner (回放一份订单)
//!     ↓
//! workflow::Configurator (状态机)
//!     ↓
//! services (能力层：pricing / scheduling / checkout / receipt)
//!     ↓
//! clients (外部服务：HTTP / TOML)
//! ```

pub mod app;
pub mod order_runner;

pub use app::App;
pub use order_runner::play_order;
