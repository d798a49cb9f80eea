pub mod catalog;
pub mod checkout;
pub mod document_type;
pub mod identity;
pub mod loaders;
pub mod money;
pub mod order_plan;
pub mod payment;
pub mod slot;

pub use catalog::Catalog;
pub use checkout::{CheckoutPayload, PayloadEntry, ReferenceId};
pub use document_type::{DocumentType, DocumentTypeId, InputKind, PurposeOption, SupplementaryQuestion};
pub use identity::{Identity, IdentityContext};
pub use loaders::{load_catalog_from_toml, load_order_plan};
pub use money::Money;
pub use order_plan::{OrderPlan, PlannedItem};
pub use payment::PaymentMethod;
pub use slot::FulfillmentSlot;
