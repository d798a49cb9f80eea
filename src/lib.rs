//! # Document Request
//!
//! 证件申请配置器：勾选证件、填写用途和补充问题、计价、预约取件时段、提交并出具收据
//!
//! ## 架构设计
//!
//! ### ① 外部服务层（Clients）
//! - `clients/` - 证件目录、预约时段、订单提交、收据展示的窄接口及 HTTP 实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不持有流程状态
//! - `PricingEngine` - 总价与办理天数
//! - `SchedulingResolver` - 获取预约时段
//! - `CheckoutSubmitter` - 生成快照和参考号并提交
//! - `ReceiptWriter` - 写收据
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 配置器状态机与选择集
//! - `Configurator` - 每个用户动作一个方法，被拒绝的动作不改状态
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 初始化与会话管理
//! - `orchestrator/order_runner` - 回放订单脚本
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    Catalog, CheckoutPayload, DocumentType, DocumentTypeId, FulfillmentSlot, Identity,
    IdentityContext, Money, PaymentMethod,
};
pub use orchestrator::App;
pub use services::{LeadTime, PricingEngine};
pub use workflow::{
    Collaborators, Completion, Configurator, ConfiguratorState, ExitAction, FlowError,
    ValidationError,
};
