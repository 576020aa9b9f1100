//! Print the OpenAPI document as JSON.

use std::io::Write;

use color_eyre::eyre::Result;
use skillswap::doc::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    color_eyre::install()?;
    let json = ApiDoc::openapi().to_pretty_json()?;
    writeln!(std::io::stdout().lock(), "{json}")?;
    Ok(())
}
