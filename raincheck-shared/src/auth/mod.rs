/// Authentication utilities
///
/// - `jwt`: HS256 access/refresh token creation and validation
/// - `password`: Argon2id password hashing and verification
/// - `middleware`: request auth context and bearer-token extraction

pub mod jwt;
pub mod middleware;
pub mod password;
