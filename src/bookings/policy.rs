use crate::auth::Identity;
use crate::bookings::model::booking::Booking;

/// Admins may change any booking; everyone else only their own.
pub fn can_modify(identity: &Identity, booking: &Booking) -> bool {
  identity.is_admin() || identity.user_id == booking.owner_user_id
}
