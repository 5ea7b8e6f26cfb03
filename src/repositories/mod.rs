pub mod events;
pub mod tickets;

pub use events::{EventRepository, PgEventRepository};
pub use tickets::{LoggingTicketLedger, PgTicketLedger, TicketLedger};
