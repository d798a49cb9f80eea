//! 流程层（Workflow）
//!
//! 状态机、选择集以及流程中的错误类型

pub mod configurator;
pub mod error;
pub mod selection;
pub mod state;

pub use configurator::{
    CheckoutTicket, Collaborators, Completion, Configurator, ExitAction, ScheduleTicket,
};
pub use error::{FlowError, Operation, ValidationError};
pub use selection::{SelectionEntry, SelectionSet, MAX_COPIES};
pub use state::ConfiguratorState;
