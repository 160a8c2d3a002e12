mod account;
mod id;
mod purchase;
mod transaction;
mod transfer;
mod wire;

pub use account::Account;
pub use id::{AccountId, ACCOUNT_ID_LEN};
pub use purchase::RawPurchase;
pub use transaction::{
    TransactionKind, TransactionStatus, UnifiedTransaction, DEFAULT_DESCRIPTION,
};
pub use transfer::RawTransfer;
