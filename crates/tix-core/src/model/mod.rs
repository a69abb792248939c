pub mod ticket;
pub mod ticket_id;

pub use ticket::{Contact, HistoryAction, HistoryEntry, NewTicket, Status, Ticket, ValueSnapshot};
pub use ticket_id::TicketId;
