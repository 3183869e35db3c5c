mod policies;
mod refresh_token;
mod role;
mod security_event_kind;
