pub mod account;
pub mod booking;
pub mod commission;
pub mod seat_slot;
pub mod tour_date;
pub mod withdrawal;

pub use account::AccountRole;
pub use booking::BookingStatus;
pub use seat_slot::SeatStatus;
pub use withdrawal::WithdrawalStatus;
