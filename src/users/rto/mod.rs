pub mod auth_payload_rto;
pub mod user_rto;
