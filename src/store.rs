//! UI State Store
//!
//! View state of the page (panels, forms, hover, filters) in a
//! reactive_stores `Store` for field-level reactivity. The tickets
//! themselves live in `TicketStore` behind their own signal.

use reactive_stores::Store;

use crate::config::UiConfig;
use crate::filter::{SortKey, TicketFilter};
use crate::models::{NewTicket, Ticket, TicketKey, TicketPatch};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LeftPanel {
    #[default]
    None,
    Create,
    Edit,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RightPanel {
    #[default]
    None,
    Graph,
    Log,
}

/// Hover card over a ticket row
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tooltip {
    pub key: Option<TicketKey>,
    /// Client coordinates of the pointer
    pub position: (i32, i32),
}

impl Tooltip {
    /// Pointer moved over a ticket row
    pub fn hover(&mut self, key: TicketKey, x: i32, y: i32) {
        if self.key != Some(key) {
            self.key = Some(key);
        }
        self.position = (x, y);
    }

    pub fn hide(&mut self) {
        self.key = None;
    }
}

/// Fields shared by the create and edit forms
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TicketForm {
    pub title: String,
    pub description: String,
    pub parent: Option<TicketKey>,
    pub ticket_type: i32,
    pub status: i32,
    pub priority: i32,
}

impl TicketForm {
    pub fn from_ticket(ticket: &Ticket) -> Self {
        Self {
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            parent: ticket.parent,
            ticket_type: ticket.ticket_type,
            status: ticket.status,
            priority: ticket.priority,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn to_new(&self) -> NewTicket {
        NewTicket {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            parent: self.parent,
            priority: self.priority,
            ticket_type: self.ticket_type,
            status: self.status,
        }
    }

    /// Patch holding only the fields that differ from `ticket`
    pub fn diff(&self, ticket: &Ticket) -> TicketPatch {
        fn changed<T: Clone + PartialEq>(form: &T, current: &T) -> Option<T> {
            (form != current).then(|| form.clone())
        }
        let title = self.title.trim().to_string();
        TicketPatch {
            title: changed(&title, &ticket.title),
            description: changed(&self.description, &ticket.description),
            parent: changed(&self.parent, &ticket.parent),
            ticket_type: changed(&self.ticket_type, &ticket.ticket_type),
            status: changed(&self.status, &ticket.status),
            priority: changed(&self.priority, &ticket.priority),
            order: None,
        }
    }
}

/// Page state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct UiState {
    pub filter: TicketFilter,
    pub sort: Vec<SortKey>,
    pub left_panel: LeftPanel,
    pub right_panel: RightPanel,
    /// Row shown as selected (the one being edited)
    pub highlight_key: Option<TicketKey>,
    pub tooltip: Tooltip,
    pub new_ticket: TicketForm,
    /// Ticket open in the edit panel
    pub edit_key: Option<TicketKey>,
    pub edit_form: TicketForm,
    /// Center of the graph, None = all roots
    pub graph_focus: Option<TicketKey>,
}

impl UiState {
    pub fn from_config(config: &UiConfig) -> Self {
        Self {
            filter: config.filter.clone(),
            sort: config.sort.clone(),
            ..Default::default()
        }
    }

    /// Open the create form, optionally pre-filled as a child of `parent`
    pub fn start_create(&mut self, parent: Option<TicketKey>) {
        self.stop_edit_ticket();
        self.new_ticket.parent = parent;
        self.left_panel = LeftPanel::Create;
    }

    /// Copy the ticket into the edit form, open the panel, highlight the row
    pub fn edit_ticket(&mut self, ticket: &Ticket) {
        self.edit_key = Some(ticket.key);
        self.edit_form = TicketForm::from_ticket(ticket);
        self.left_panel = LeftPanel::Edit;
        self.highlight_key = Some(ticket.key);
    }

    pub fn stop_edit_ticket(&mut self) {
        if self.left_panel == LeftPanel::Edit {
            self.left_panel = LeftPanel::None;
        }
        self.edit_key = None;
        self.highlight_key = None;
    }

    /// Close anything that shows `key` after it was deleted
    pub fn forget_ticket(&mut self, key: TicketKey) {
        if self.edit_key == Some(key) {
            self.stop_edit_ticket();
        }
        if self.tooltip.key == Some(key) {
            self.tooltip.key = None;
        }
        if self.graph_focus == Some(key) {
            self.graph_focus = None;
        }
        if self.new_ticket.parent == Some(key) {
            self.new_ticket.parent = None;
        }
    }

    pub fn toggle_right_panel(&mut self, panel: RightPanel) {
        self.right_panel = if self.right_panel == panel { RightPanel::None } else { panel };
    }
}

/// Type alias for the store
pub type UiStore = Store<UiState>;
