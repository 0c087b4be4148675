mod fixed_point;
mod money;

pub mod op;
mod secret;
mod tax_rate;

pub mod helpers;

pub use money::{Money, MoneyConversionError, DEFAULT_CURRENCY_CODE};
pub use secret::Secret;
pub use tax_rate::TaxRate;
