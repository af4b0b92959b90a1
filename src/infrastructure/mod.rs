// Infrastructure layer: document IO, OS adapters, eventing
pub mod event_ndjson;
pub mod locations;
pub mod process_sysinfo;
pub mod terminal_prompter;
pub mod xml_document;
