pub mod logging;
pub mod credentials;

// REST API client: models, errors, endpoint wrappers
pub mod api;

// Dataset search: filter state, pagination controller, visibility trigger
pub mod search;

// Chunked file preview: window accumulation + loader state machine
pub mod preview;
