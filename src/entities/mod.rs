pub mod booking_reservations;
pub mod draw_records;
pub mod prizes;

pub use booking_reservations as booking_reservation_entity;
pub use draw_records as draw_record_entity;
pub use prizes as prize_entity;
