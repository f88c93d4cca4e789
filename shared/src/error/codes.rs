//! Numeric error codes
//!
//! Codes travel as plain numbers in API responses. The leading digit
//! names the area (see [`ErrorCategory`](super::ErrorCategory)).

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! error_codes {
    ($($(#[$doc:meta])* $name:ident = $value:literal => $message:literal,)+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "u16", try_from = "u16")]
        #[repr(u16)]
        pub enum ErrorCode {
            $($(#[$doc])* $name = $value,)+
        }

        impl ErrorCode {
            /// Every known code, in declaration order
            pub const ALL: &'static [ErrorCode] = &[$(ErrorCode::$name,)+];

            /// Default message; cart and catalog messages are shown to shoppers
            pub const fn message(&self) -> &'static str {
                match self {
                    $(ErrorCode::$name => $message,)+
                }
            }
        }

        impl TryFrom<u16> for ErrorCode {
            type Error = InvalidErrorCode;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(ErrorCode::$name),)+
                    other => Err(InvalidErrorCode(other)),
                }
            }
        }
    };
}

error_codes! {
    Success = 0 => "OK",
    Unknown = 1 => "Something went wrong",
    ValidationFailed = 2 => "Validation failed",
    InvalidRequest = 5 => "Invalid request",

    /// Request carries no user identity
    NotAuthenticated = 1001 => "Sign in to continue",

    PermissionDenied = 2001 => "Permission denied",
    /// Data-entry facets need an admin or sales role
    DataEntryRoleRequired = 2002 => "This form is only available to data-entry roles",

    /// Product read failed; the listing renders empty with a banner
    CatalogQueryFailed = 3001 => "We couldn't load devices right now",
    /// "Custom" chosen without override text
    CustomValueRequired = 3002 => "Enter a value for the custom option",
    /// Closed-sale read failed
    ReportQueryFailed = 3003 => "The win report could not be loaded",

    /// Uniqueness conflict on (user, product)
    CartItemExists = 4001 => "This device is already in your cart",
    /// Referential-integrity conflict on the product
    CartProductMissing = 4002 => "This device no longer exists",
    CartUpdateFailed = 4003 => "Your cart could not be updated",
    CartInvalidQuantity = 4004 => "Quantity must be a whole number from 1 to 2147483647",
    CartLoadFailed = 4005 => "Your cart could not be loaded",

    InternalError = 9001 => "Internal server error",
    DatabaseError = 9002 => "Database error",
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A number outside the known code table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown error code {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}
