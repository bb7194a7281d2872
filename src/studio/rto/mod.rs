pub mod service_rto;
