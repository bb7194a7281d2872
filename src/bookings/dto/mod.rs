pub mod book_appointment_dto;
pub mod update_booking_dto;
