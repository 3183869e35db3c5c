mod authorization;
mod secret;
