//! # Servorder Security
//! 
//! Security utilities: JWT issuing/validation and password hashing.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtError, JwtService, TokenPair, TokenSubject, TokenType};
pub use password::{PasswordError, PasswordService};
