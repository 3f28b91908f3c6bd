pub mod reservation;

pub use reservation::SeatReservationService;
