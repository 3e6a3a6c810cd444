// Complaint list client: query state, sequenced store, search form and page view.
pub mod query;
pub mod search;
pub mod store;
pub mod view;
