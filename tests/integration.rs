#[path = "integration/support.rs"]
mod support;

#[path = "integration/cli.rs"]
mod cli;
#[path = "integration/gating.rs"]
mod gating;
#[path = "integration/nested_lookup.rs"]
mod nested_lookup;
#[path = "integration/store.rs"]
mod store;
