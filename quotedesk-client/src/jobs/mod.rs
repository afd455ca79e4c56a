pub mod poller;

pub use poller::TicketPoller;
