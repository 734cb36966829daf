mod macros;

pub mod config;
pub mod crypto;
pub mod identity;
pub mod protocol;
pub mod recovery;
pub mod serializer;
pub mod state;
pub mod time;
pub mod token;
pub mod transfer;
pub mod two_auth;
