//! Bearer token handling. Tokens are issued by an external identity
//! provider; this service only validates them.

pub mod jwt;
