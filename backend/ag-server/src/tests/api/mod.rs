mod client_origin;
mod error;
mod page_query;
