//! UI Components
//!
//! Leptos components for the ticket page.

mod delete_confirm_button;
mod selectors;
mod filter_bar;
mod ticket_table;
mod ticket_row;
mod ticket_tooltip;
mod new_ticket_form;
mod edit_ticket_panel;
mod ticket_graph;
mod log_panel;

pub use delete_confirm_button::DeleteConfirmButton;
pub use selectors::{NameKind, NameSelector, ParentSelector};
pub use filter_bar::FilterBar;
pub use ticket_table::TicketTable;
pub use ticket_row::TicketRow;
pub use ticket_tooltip::TicketTooltip;
pub use new_ticket_form::NewTicketForm;
pub use edit_ticket_panel::EditTicketPanel;
pub use ticket_graph::TicketGraph;
pub use log_panel::LogPanel;
