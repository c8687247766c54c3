use std::path::Path;

use pagedit_core::SessionConfig;

use crate::commands::common::{open_session, write_store};
use crate::error::CliError;

pub fn run_discard(page_path: &Path, config: SessionConfig) -> Result<(), CliError> {
    let session = open_session(page_path, config)?;
    session.cancel()?;
    write_store(page_path, session.store())?;
    println!("{}", session.page_info().id);
    Ok(())
}
