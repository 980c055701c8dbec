// Entity Models
//
// ParsedMerchant lives only while one name is being parsed;
// BlockRecord is what gets stored and joined.

pub mod block;
pub mod merchant;

pub use block::BlockRecord;
pub use merchant::{MerchantType, ParsedMerchant};
