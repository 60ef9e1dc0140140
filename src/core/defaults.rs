/// Bundled default responses, compiled into the library.

use std::sync::OnceLock;

use crate::schema::responses::{Responses, ResponsesError};

const DEFAULT_RESPONSES: &str = include_str!("../../responses/default.ron");

impl Responses {
    /// Parse the bundled default responses.
    pub fn bundled() -> Result<Responses, ResponsesError> {
        Responses::parse_ron(DEFAULT_RESPONSES)
    }
}

/// The bundled default responses, parsed on first use and shared for the
/// life of the process.
pub fn default_responses() -> &'static Responses {
    static DEFAULTS: OnceLock<Responses> = OnceLock::new();
    DEFAULTS.get_or_init(|| {
        Responses::bundled().unwrap_or_else(|e| panic!("bundled responses are invalid: {e}"))
    })
}
