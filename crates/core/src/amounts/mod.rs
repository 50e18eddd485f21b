//! Amounts module - fixed-precision monetary amount validation.

mod amounts_validator;


pub use amounts_validator::{
    exceeds_max_amount, max_amount_string, validate_amount, validate_signed_amount, AmountError,
};
