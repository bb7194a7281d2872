pub mod booking_rto;
