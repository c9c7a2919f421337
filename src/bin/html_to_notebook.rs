use std::path::Path;

use page_notebook::config::{DEFAULT_NOTEBOOK_INPUT, DEFAULT_NOTEBOOK_OUTPUT};
use page_notebook::{create_notebook_from_html, ConvertConfig, ConvertError};

fn main() -> Result<(), ConvertError> {
    page_notebook::init_tracing();

    let result = create_notebook_from_html(
        Path::new(DEFAULT_NOTEBOOK_INPUT),
        Path::new(DEFAULT_NOTEBOOK_OUTPUT),
        &ConvertConfig::default(),
    );
    match result {
        Ok(_) | Err(ConvertError::MissingBody) => Ok(()),
        Err(e) => Err(e),
    }
}
