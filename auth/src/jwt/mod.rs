pub mod claims;
pub mod codec;
pub mod errors;
pub mod issuer;
pub mod validator;

pub use claims::AccessClaims;
pub use claims::Expiring;
pub use claims::Identity;
pub use claims::RefreshClaims;
pub use claims::Role;
pub use codec::TokenCodec;
pub use errors::JwtError;
pub use issuer::TokenIssuer;
pub use issuer::TokenLifetimes;
pub use issuer::TokenPair;
pub use validator::TokenValidator;
