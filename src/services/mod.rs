//! 业务能力层
//!
//! 每个服务只做一件事，不持有流程状态

pub mod checkout;
pub mod pricing;
pub mod receipt;
pub mod scheduling;

pub use checkout::CheckoutSubmitter;
pub use pricing::{LeadTime, OrderSummary, PricingEngine, SummaryLine, DEFAULT_CUTOFF_HOUR};
pub use receipt::{Receipt, ReceiptLine, ReceiptWriter};
pub use scheduling::SchedulingResolver;
