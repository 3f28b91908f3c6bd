pub mod cinema;

pub use cinema::{Cinema, CinemaId, CinemaRecord, CorruptRecord, SeatCount};
